use std::path::{Component, Path, PathBuf};

use engine_logging::{engine_debug, engine_warn};
use url::Url;
use webmd_core::{pick_best_from_srcset, ImageNamer};

use crate::dom::ArticleDocument;
use crate::persist::{normalize_path, OutputDir, PersistError};
use crate::transport::Transport;
use crate::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub source_url: String,
    pub path: PathBuf,
    /// `src` written into the document, relative to the Markdown directory.
    pub markdown_src: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedImage {
    pub source_url: String,
    pub error: FetchError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizeReport {
    pub saved: Vec<SavedImage>,
    pub failed: Vec<FailedImage>,
}

/// Downloads every `<img>` of `doc` into `images_dir`, one at a time in
/// document order, and points each element at its local copy.
///
/// A failed download leaves that element untouched. Only filesystem errors
/// abort.
pub async fn localize_images(
    doc: &mut ArticleDocument,
    base_url: &Url,
    images_dir: &Path,
    markdown_dir: &Path,
    transport: &Transport,
) -> Result<LocalizeReport, PersistError> {
    let images = OutputDir::prepare(images_dir)?;
    let mut namer = ImageNamer::new();
    let mut report = LocalizeReport::default();

    for id in doc.elements_by_tag("img") {
        let Some(src) = doc.element(id).and_then(image_source) else {
            continue;
        };
        let Ok(absolute) = base_url.join(&src) else {
            continue;
        };
        if absolute.scheme() == "data" {
            continue;
        }

        let base = namer.base_name(&absolute);
        let fetched = match transport.fetch_bytes(absolute.as_str()).await {
            Ok(fetched) => fetched,
            Err(error) => {
                engine_warn!("Failed to download image: {absolute} ({error})");
                report.failed.push(FailedImage {
                    source_url: absolute.to_string(),
                    error,
                });
                continue;
            }
        };

        let filename = namer.assign(&base, fetched.content_type.as_deref());
        let path = images.write(&filename, &fetched.bytes)?;
        let markdown_src = relative_src(markdown_dir, &path);
        doc.set_attr(id, "src", markdown_src.clone());
        doc.remove_attr(id, "srcset");
        engine_debug!(
            "Saved image: {} -> markdown src: {markdown_src}",
            path.display()
        );

        report.saved.push(SavedImage {
            source_url: absolute.to_string(),
            path,
            markdown_src,
        });
    }

    Ok(report)
}

/// `src`, else the best `srcset` candidate, else `data-src`. Empty values count as missing.
fn image_source(img: &crate::dom::ElementData) -> Option<String> {
    let present = |name: &str| img.attr(name).filter(|v| !v.is_empty());
    present("src")
        .map(str::to_string)
        .or_else(|| present("srcset").and_then(pick_best_from_srcset))
        .or_else(|| present("data-src").map(str::to_string))
}

/// Path of `target` relative to `from_dir`, always `/`-separated.
///
/// Both paths are expected to be absolute; `.` and `..` are resolved
/// before comparing.
pub fn relative_src(from_dir: &Path, target: &Path) -> String {
    let from_dir = normalize_path(from_dir);
    let target = normalize_path(target);
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = target.components().collect();
    let shared = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in shared..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[shared..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::{image_source, relative_src};
    use crate::dom::ElementData;
    use std::path::Path;

    fn img(attrs: &[(&str, &str)]) -> ElementData {
        ElementData::new(
            "img",
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn src_beats_srcset_and_data_src() {
        let el = img(&[("data-src", "lazy.png"), ("srcset", "big.png 2x"), ("src", "a.png")]);
        assert_eq!(image_source(&el).as_deref(), Some("a.png"));
    }

    #[test]
    fn srcset_beats_data_src() {
        let el = img(&[("data-src", "lazy.png"), ("srcset", "s.png 1x, big.png 2x")]);
        assert_eq!(image_source(&el).as_deref(), Some("big.png"));
    }

    #[test]
    fn data_src_is_last_resort() {
        let el = img(&[("src", ""), ("data-src", "lazy.png")]);
        assert_eq!(image_source(&el).as_deref(), Some("lazy.png"));
        assert_eq!(image_source(&img(&[("alt", "x")])), None);
    }

    #[test]
    fn relative_src_walks_up_and_down() {
        assert_eq!(
            relative_src(Path::new("/work/docs"), Path::new("/work/images/guide/a.png")),
            "../images/guide/a.png"
        );
        assert_eq!(
            relative_src(Path::new("/work"), Path::new("/work/images/a.png")),
            "images/a.png"
        );
    }

    #[test]
    fn relative_src_resolves_parent_components_first() {
        assert_eq!(
            relative_src(
                Path::new("/tmp/work/../notes"),
                Path::new("/tmp/work/images/guide/a.png")
            ),
            "../work/images/guide/a.png"
        );
    }
}
