//! Allow-list HTML sanitizer for untrusted card content.
//!
//! Policy: scripting-capable elements are removed together with their
//! content; event handler attributes and javascript: links are stripped;
//! MathML presentation tags pass through so typeset output survives.
//! Unknown tags are dropped but their text content is kept.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Elements removed entirely, including their children.
const FORBIDDEN_TAGS: [&str; 6] = ["script", "style", "iframe", "object", "embed", "base"];

static ALLOWED_TAGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Math markup, matching the typesetter's output.
        "math", "mrow", "mi", "mo", "mn", "msup", "msub", "mfrac", "msqrt", "mroot",
        // Plain formatting commonly found in card fields.
        "a", "b", "i", "u", "em", "strong", "s", "small", "sub", "sup", "p", "div", "span",
        "br", "hr", "ul", "ol", "li", "table", "thead", "tbody", "tr", "td", "th", "img",
        "pre", "code", "blockquote",
    ]
    .into_iter()
    .collect()
});

static ALLOWED_ATTRS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["display", "mathvariant", "mathsize", "mathcolor", "href", "src", "alt", "title"]
        .into_iter()
        .collect()
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Per forbidden tag: the paired form (with content) and any dangling
/// open/close leftovers.
static FORBIDDEN_RES: LazyLock<Vec<(Regex, Regex)>> = LazyLock::new(|| {
    FORBIDDEN_TAGS
        .iter()
        .map(|tag| {
            (
                Regex::new(&format!(r"(?is)<\s*{tag}\b[^>]*>.*?</\s*{tag}\s*>")).unwrap(),
                Regex::new(&format!(r"(?is)</?\s*{tag}\b[^>]*/?>")).unwrap(),
            )
        })
        .collect()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<\s*(/?)\s*([a-z][a-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9:-]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s/>]+))?"#).unwrap()
});

/// Sanitize an HTML fragment. Pure string transform, deterministic; the
/// worst malformed input degrades to text, never to an error.
pub fn sanitize(html: &str) -> String {
    let mut text = COMMENT_RE.replace_all(html, "").into_owned();

    // Forbidden elements go first, content and all. The second pattern
    // catches unclosed leftovers.
    for (paired, dangling) in FORBIDDEN_RES.iter() {
        text = paired.replace_all(&text, "").into_owned();
        text = dangling.replace_all(&text, "").into_owned();
    }

    TAG_RE
        .replace_all(&text, |caps: &regex::Captures| {
            let closing = !caps[1].is_empty();
            let name = caps[2].to_ascii_lowercase();
            if !ALLOWED_TAGS.contains(name.as_str()) {
                return String::new();
            }
            if closing {
                return format!("</{name}>");
            }
            let attrs = filter_attrs(&caps[3]);
            let self_close = if caps[3].trim_end().ends_with('/') { " /" } else { "" };
            format!("<{name}{attrs}{self_close}>")
        })
        .into_owned()
}

fn filter_attrs(raw: &str) -> String {
    let mut out = String::new();
    for caps in ATTR_RE.captures_iter(raw) {
        let name = caps[1].to_ascii_lowercase();
        if name.starts_with("on") || !ALLOWED_ATTRS.contains(name.as_str()) {
            continue;
        }
        match caps.get(2) {
            Some(value) => {
                let trimmed = value.as_str().trim_matches(|c| c == '"' || c == '\'');
                if (name == "href" || name == "src") && is_scripting_url(trimmed) {
                    continue;
                }
                out.push(' ');
                out.push_str(&name);
                out.push_str("=\"");
                out.push_str(&trimmed.replace('"', "&quot;"));
                out.push('"');
            }
            None => {
                out.push(' ');
                out.push_str(&name);
            }
        }
    }
    out
}

fn is_scripting_url(url: &str) -> bool {
    let compact: String =
        url.chars().filter(|c| !c.is_whitespace() && !c.is_control()).collect();
    let lower = compact.to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("data:text/html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_removed_with_their_content() {
        let out = sanitize("before<script>alert('x')</script>after");
        assert_eq!(out, "beforeafter");
        let out = sanitize("a<style>body { color: red }</style>b<iframe src=\"x\"></iframe>c");
        assert_eq!(out, "abc");
    }

    #[test]
    fn unclosed_forbidden_tags_are_stripped() {
        let out = sanitize("x<base href=\"http://evil\">y");
        assert_eq!(out, "xy");
        let out = sanitize("x<embed src=\"a.swf\"/>y");
        assert_eq!(out, "xy");
    }

    #[test]
    fn event_handler_attributes_are_stripped() {
        let out = sanitize(r#"<div onclick="boom()" title="ok">hi</div>"#);
        assert_eq!(out, r#"<div title="ok">hi</div>"#);
        let out = sanitize(r#"<img src="a.png" onerror="boom()">"#);
        assert_eq!(out, r#"<img src="a.png">"#);
    }

    #[test]
    fn math_markup_survives() {
        let input = r#"<math display="block"><mfrac><mi mathvariant="italic">x</mi><mn>2</mn></mfrac></math>"#;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn unknown_tags_drop_but_keep_content() {
        let out = sanitize("<blink>important</blink> <custom-el>text</custom-el>");
        assert_eq!(out, "important text");
    }

    #[test]
    fn javascript_urls_are_dropped() {
        let out = sanitize(r#"<a href="java script:alert(1)">x</a>"#);
        assert_eq!(out, "<a>x</a>");
        let out = sanitize(r#"<a href="https://example.com/page">x</a>"#);
        assert_eq!(out, r#"<a href="https://example.com/page">x</a>"#);
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(sanitize("a<!-- <script>boom</script> -->b"), "ab");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize("2 < 3 and plain text"), "2 < 3 and plain text");
        assert_eq!(sanitize(""), "");
    }
}
