use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Removes anything that looks like an HTML tag.
pub fn strip_tags(raw: &str) -> String {
    tag_pattern().replace_all(raw, "").into_owned()
}

/// Trim + strip tags: the normal form every free-text field is stored in.
pub fn sanitize_text(raw: &str) -> String {
    strip_tags(raw).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_removes_markup_but_keeps_text() {
        assert_eq!(strip_tags("<p>Hola <em>mundo</em></p>"), "Hola mundo");
        assert_eq!(strip_tags("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn strip_tags_leaves_plain_comparisons_alone() {
        assert_eq!(strip_tags("riesgo > medio"), "riesgo > medio");
    }

    #[test]
    fn sanitize_text_trims_after_stripping() {
        assert_eq!(sanitize_text("  <b> Juan </b>  "), "Juan");
        assert_eq!(sanitize_text("\t\n"), "");
    }
}
