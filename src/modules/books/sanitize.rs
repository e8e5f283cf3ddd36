//! Input sanitization rules for book fields.
//!
//! Pure functions, no dependencies. `text_field` and `key` normalize plain
//! values; `rich_text` filters HTML down to a safe allowlisted subset;
//! `url` validates externally supplied image URLs.

/// Tags allowed to survive [`rich_text`].
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "code", "del", "div", "em", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "li", "ol", "p", "pre", "q",
    "s", "span", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

/// Attributes allowed on tags kept by [`rich_text`].
const ALLOWED_ATTRS: &[&str] = &["alt", "class", "height", "href", "id", "src", "title", "width"];

/// Normalize a single-line text value: strip tags and control characters,
/// collapse whitespace runs, trim.
pub fn text_field(input: &str) -> String {
    let without_tags = strip_tags(input);
    let without_ctl: String = without_tags
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    without_ctl.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Filter rich text down to allowlisted HTML.
///
/// Disallowed tags are removed but their contents are kept, except for
/// `script` and `style` whose contents are dropped entirely. Event-handler
/// attributes and `javascript:` URLs never survive.
pub fn rich_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        rest = &rest[lt..];

        let Some(gt) = rest.find('>') else {
            // Unterminated tag: keep the remainder as text.
            out.push_str(rest);
            return out;
        };

        let inner = &rest[1..gt];
        let closing = inner.starts_with('/');
        let stripped = inner.trim_start_matches('/');
        let name: String = stripped
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if name.is_empty() {
            // Not a tag, e.g. "a < b"; keep the bracket literally.
            out.push('<');
            rest = &rest[1..];
            continue;
        }

        let self_closing = inner.trim_end().ends_with('/');
        rest = &rest[gt + 1..];

        if name == "script" || name == "style" {
            if !closing && !self_closing {
                // Drop the element together with its contents.
                let close = format!("</{name}");
                match rest.to_ascii_lowercase().find(&close) {
                    Some(pos) => {
                        let after = &rest[pos..];
                        rest = match after.find('>') {
                            Some(end) => &after[end + 1..],
                            None => "",
                        };
                    }
                    None => rest = "",
                }
            }
            continue;
        }

        if !ALLOWED_TAGS.contains(&name.as_str()) {
            continue;
        }

        if closing {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
            continue;
        }

        out.push('<');
        out.push_str(&name);
        for (attr, value) in parse_attrs(&stripped[name.len()..]) {
            if !ALLOWED_ATTRS.contains(&attr.as_str()) {
                continue;
            }
            if (attr == "href" || attr == "src")
                && value.trim().to_ascii_lowercase().starts_with("javascript:")
            {
                continue;
            }
            out.push(' ');
            out.push_str(&attr);
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
        if self_closing {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }

    out.push_str(rest);
    out
}

/// Normalize an identifier-like value: lowercase `[a-z0-9_-]` only.
pub fn key(input: &str) -> String {
    input
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Validate an externally supplied URL. Only http(s) URLs without embedded
/// whitespace or markup pass; anything else is treated as absent.
pub fn url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return None;
    }

    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"'))
    {
        return None;
    }

    Some(trimmed.to_string())
}

/// Remove `<...>` tag spans; text between tags is kept.
fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        rest = &rest[lt..];

        let looks_like_tag = rest[1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
            .unwrap_or(false);
        if !looks_like_tag {
            out.push('<');
            rest = &rest[1..];
            continue;
        }

        match rest.find('>') {
            Some(gt) => rest = &rest[gt + 1..],
            // Unterminated tag swallows the remainder.
            None => return out,
        }
    }

    out.push_str(rest);
    out
}

/// Parse `name="value"` pairs from a tag body. Lenient on quoting.
fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' {
            i += 1;
        }
        if start == i {
            break;
        }
        let name: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < chars.len() && chars[i] == '=' {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let quote = chars[i];
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    value.push(chars[i]);
                    i += 1;
                }
                i += 1;
            } else {
                while i < chars.len() && !chars[i].is_whitespace() {
                    value.push(chars[i]);
                    i += 1;
                }
            }
        }

        attrs.push((name, value));
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_strips_tags_and_collapses_whitespace() {
        assert_eq!(text_field("  The <b>Great</b>\n\n Gatsby  "), "The Great Gatsby");
    }

    #[test]
    fn text_field_removes_control_characters() {
        assert_eq!(text_field("Ti\x07tle"), "Title");
    }

    #[test]
    fn text_field_of_whitespace_only_is_empty() {
        assert_eq!(text_field("   \n\t "), "");
    }

    #[test]
    fn rich_text_keeps_allowed_tags() {
        assert_eq!(
            rich_text("<p>A <strong>bold</strong> claim</p>"),
            "<p>A <strong>bold</strong> claim</p>"
        );
    }

    #[test]
    fn rich_text_drops_script_with_contents() {
        assert_eq!(
            rich_text("before<script>alert(1)</script>after"),
            "beforeafter"
        );
    }

    #[test]
    fn rich_text_unwraps_disallowed_tags() {
        assert_eq!(
            rich_text("<iframe src=\"x\">inner</iframe> text"),
            "inner text"
        );
    }

    #[test]
    fn rich_text_filters_event_handlers_and_javascript_urls() {
        assert_eq!(
            rich_text("<a href=\"javascript:alert(1)\" onclick=\"x()\">link</a>"),
            "<a>link</a>"
        );
        assert_eq!(
            rich_text("<a href=\"https://example.com\">link</a>"),
            "<a href=\"https://example.com\">link</a>"
        );
    }

    #[test]
    fn rich_text_keeps_literal_angle_brackets() {
        assert_eq!(rich_text("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn rich_text_keeps_self_closing_images() {
        assert_eq!(
            rich_text("<img src=\"https://example.com/x.png\" alt=\"x\" />"),
            "<img src=\"https://example.com/x.png\" alt=\"x\" />"
        );
    }

    #[test]
    fn key_lowercases_and_strips() {
        assert_eq!(key("Publish!"), "publish");
        assert_eq!(key("My Status-2"), "mystatus-2");
    }

    #[test]
    fn url_accepts_http_and_https_only() {
        assert_eq!(
            url(" https://example.com/cover.jpg "),
            Some("https://example.com/cover.jpg".to_string())
        );
        assert_eq!(url("ftp://example.com/cover.jpg"), None);
        assert_eq!(url("javascript:alert(1)"), None);
        assert_eq!(url(""), None);
    }

    #[test]
    fn url_rejects_embedded_markup() {
        assert_eq!(url("https://example.com/<script>"), None);
        assert_eq!(url("https://exa mple.com/x.jpg"), None);
    }
}
