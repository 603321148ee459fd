use std::sync::LazyLock;

use regex::Regex;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\x{2000}-\x{206F}\x{2E00}-\x{2E7F}\\/'"“”‘’()\[\]{}:;.,!?`~@#$%^&*+=<>|]"#)
        .expect("punctuation pattern is valid")
});
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("hyphen pattern is valid"));

/// Anchor-safe slug: lowercased, punctuation and symbols dropped, whitespace
/// runs turned into single hyphens, no leading or trailing hyphen.
///
/// Letters outside ASCII survive, so `"Überblick"` becomes `"überblick"`.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE_RUN.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn punctuation_and_case_are_normalized() {
        assert_eq!(slugify("Hello, World! 2024"), "hello-world-2024");
    }

    #[test]
    fn typographic_quotes_and_dashes_are_dropped() {
        assert_eq!(slugify("“Quoted” — part"), "quoted-part");
    }

    #[test]
    fn hyphen_runs_collapse_and_edges_trim() {
        assert_eq!(slugify("--a -- b--"), "a-b");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn underscores_and_unicode_letters_are_kept() {
        assert_eq!(slugify("snake_case Überblick"), "snake_case-überblick");
    }
}
