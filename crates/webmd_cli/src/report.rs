use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use webmd_engine::{Clock, ConversionSummary};

/// Confirmation lines printed after a successful run.
pub fn summary_lines(summary: &ConversionSummary) -> Vec<String> {
    let mut lines = vec![
        format!("✓ Wrote Markdown: {}", summary.out_file.display()),
        format!("✓ Images saved to: {}", summary.images_dir.display()),
    ];
    if let Some(title) = summary.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("Title: {title}"));
    }
    lines
}

/// Wall clock for `retrieved_at`, e.g. `2024-05-06T07:08:09.123Z`.
pub fn retrieved_at_clock() -> Clock {
    Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    fn summary(title: Option<&str>) -> ConversionSummary {
        ConversionSummary {
            out_file: PathBuf::from("/work/guide.md"),
            images_dir: PathBuf::from("/work/images/guide"),
            title: title.map(str::to_string),
            images_saved: 2,
            images_failed: 0,
        }
    }

    #[test]
    fn title_line_only_when_known() {
        assert_eq!(
            summary_lines(&summary(Some("Guide"))),
            vec![
                "✓ Wrote Markdown: /work/guide.md",
                "✓ Images saved to: /work/images/guide",
                "Title: Guide",
            ]
        );
        assert_eq!(summary_lines(&summary(Some(""))).len(), 2);
        assert_eq!(summary_lines(&summary(None)).len(), 2);
    }

    #[test]
    fn clock_is_utc_with_millis() {
        let stamp = retrieved_at_clock()();
        assert!(stamp.ends_with('Z'), "{stamp}");
        assert_eq!(stamp.len(), "2024-05-06T07:08:09.123Z".len());
    }
}
