//! Vector-image minification.
//!
//! A fixed textual transform: comments, the XML prolog, doctype, editor
//! metadata and whitespace between tags are removed; whitespace inside a
//! tag is collapsed outside quoted values.

use std::sync::LazyLock;

use regex::Regex;

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));
static PROLOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\?xml.*?\?>|<!DOCTYPE[^>]*>").expect("valid prolog pattern")
});
static METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<metadata\b.*?</metadata>|<title\b.*?</title>|<desc\b.*?</desc>")
        .expect("valid metadata pattern")
});
static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid whitespace pattern"));
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("valid tag pattern"));

pub fn minify_svg(source: &str) -> String {
    let text = COMMENTS.replace_all(source, "");
    let text = PROLOG.replace_all(&text, "");
    let text = METADATA.replace_all(&text, "");
    let text = BETWEEN_TAGS.replace_all(&text, "><");
    let text = TAGS.replace_all(&text, |caps: &regex::Captures<'_>| collapse_tag(&caps[0]));
    text.trim().to_string()
}

/// Collapse whitespace runs inside a tag, leaving quoted values alone.
fn collapse_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote = None;
    let mut pending_space = false;
    for c in tag.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => pending_space = true,
            None => {
                if pending_space && c != '>' {
                    out.push(' ');
                }
                pending_space = false;
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_svg() {
        let svg = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: editor -->
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16">
    <title>close</title>
    <metadata><rdf:RDF/></metadata>
    <path   d="M0 0h16v16H0z"/>
</svg>
"#;
        assert_eq!(
            minify_svg(svg),
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><path d="M0 0h16v16H0z"/></svg>"#
        );
    }

    #[test]
    fn test_attribute_values_and_text_keep_whitespace() {
        let svg = "<svg>\n  <text   x=\"1\"   font-family=\"Segoe  UI\">a  b</text>\n</svg>";
        assert_eq!(
            minify_svg(svg),
            "<svg><text x=\"1\" font-family=\"Segoe  UI\">a  b</text></svg>"
        );
    }

    #[test]
    fn test_already_minimal() {
        let svg = "<svg><g/></svg>";
        assert_eq!(minify_svg(svg), svg);
    }
}
