use std::collections::HashSet;

use url::Url;

use crate::slug::slugify;

/// Extensions kept as-is when an image URL already carries one.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".gif", ".svg", ".avif"];
pub const FALLBACK_EXTENSION: &str = ".bin";

pub fn has_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
}

/// Maps an image MIME type (parameters ignored) to a file extension.
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/webp" => Some(".webp"),
        "image/gif" => Some(".gif"),
        "image/svg+xml" => Some(".svg"),
        "image/avif" => Some(".avif"),
        _ => None,
    }
}

/// Name derived from the last URL path segment, before slugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseName {
    pub stem: String,
    /// Includes the leading dot; empty when the segment has none.
    pub extension: String,
}

/// Hands out collision-free image filenames for one run.
///
/// A single counter feeds both synthesized `image-<n>` names and `-<n>`
/// collision suffixes, so names depend only on document order.
#[derive(Debug)]
pub struct ImageNamer {
    used: HashSet<String>,
    counter: u32,
}

impl Default for ImageNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageNamer {
    pub fn new() -> Self {
        Self {
            used: HashSet::new(),
            counter: 1,
        }
    }

    fn next_counter(&mut self) -> u32 {
        let value = self.counter;
        self.counter += 1;
        value
    }

    pub fn base_name(&mut self, url: &Url) -> BaseName {
        let path = url.path().trim_end_matches('/');
        let segment = path.rsplit('/').next().unwrap_or_default();
        let mut name = if segment.is_empty() || segment.starts_with('?') {
            format!("image-{}", self.next_counter())
        } else {
            segment.to_string()
        };
        if let Some(cut) = name.find(&['?', '#'][..]) {
            name.truncate(cut);
        }
        match name.rfind('.') {
            Some(dot) if dot > 0 => BaseName {
                stem: name[..dot].to_string(),
                extension: name[dot..].to_string(),
            },
            _ => BaseName {
                stem: name,
                extension: String::new(),
            },
        }
    }

    /// Picks the final filename for a downloaded image and records it as used.
    pub fn assign(&mut self, base: &BaseName, content_type: Option<&str>) -> String {
        let extension = if has_image_extension(&base.extension) {
            base.extension.clone()
        } else {
            content_type
                .and_then(extension_from_content_type)
                .unwrap_or(FALLBACK_EXTENSION)
                .to_string()
        };

        let mut stem = slugify(&base.stem);
        if stem.is_empty() {
            stem = format!("image-{}", self.next_counter());
        }

        let mut candidate = format!("{stem}{extension}");
        while self.used.contains(&candidate) {
            candidate = format!("{stem}-{}{extension}", self.next_counter());
        }
        self.used.insert(candidate.clone());
        candidate
    }

    pub fn is_used(&self, filename: &str) -> bool {
        self.used.contains(filename)
    }
}
