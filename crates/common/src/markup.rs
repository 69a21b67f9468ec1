//! Message markup.
//!
//! Message text and titles carry a tiny markup: plain text, `<a href="…">`
//! anchors, and `<ref id="…" type="entity">` mentions. The gateway parses
//! incoming text to validate it and to derive plain-text summaries, and
//! composes titles (e.g. a visit title that anchors to its deep link).

use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("unclosed tag <{0}>")]
    UnclosedTag(String),

    #[error("unsupported tag <{0}>")]
    UnsupportedTag(String),

    #[error("missing required attribute {attr} on <{tag}>")]
    MissingAttribute { tag: String, attr: String },

    #[error("malformed markup near byte {0}")]
    Malformed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Anchor { href: String, text: String },
    Ref { id: String, kind: String, text: String },
}

/// A parsed markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(pub Vec<Segment>);

impl Markup {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self(vec![Segment::Text(s.into())])
    }

    #[must_use]
    pub fn anchor(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self(vec![Segment::Anchor {
            href: href.into(),
            text: text.into(),
        }])
    }

    pub fn push(&mut self, seg: Segment) {
        self.0.push(seg);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strip all tags, yielding display text.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for seg in &self.0 {
            match seg {
                Segment::Text(t) => out.push_str(t),
                Segment::Anchor { text, .. } | Segment::Ref { text, .. } => out.push_str(text),
            }
        }
        out
    }

    /// Serialize back to markup form.
    #[must_use]
    pub fn format(&self) -> String {
        let mut out = String::new();
        for seg in &self.0 {
            match seg {
                Segment::Text(t) => out.push_str(&escape(t)),
                Segment::Anchor { href, text } => {
                    let _ = write!(out, "<a href=\"{}\">{}</a>", escape(href), escape(text));
                },
                Segment::Ref { id, kind, text } => {
                    let _ = write!(
                        out,
                        "<ref id=\"{}\" type=\"{}\">{}</ref>",
                        escape(id),
                        escape(kind),
                        escape(text)
                    );
                },
            }
        }
        out
    }
}

/// Escape text for safe inclusion in markup.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Parse markup, validating tags and attributes.
pub fn parse(input: &str) -> Result<Markup, MarkupError> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut rest = input;
    let mut offset = 0usize;

    while let Some(open) = rest.find('<') {
        text.push_str(&unescape(&rest[..open]));
        let tag_start = &rest[open..];
        let close = tag_start
            .find('>')
            .ok_or(MarkupError::Malformed(offset + open))?;
        let tag_body = &tag_start[1..close];
        let (tag_name, attrs) = tag_body
            .split_once(char::is_whitespace)
            .unwrap_or((tag_body, ""));

        match tag_name {
            "a" => {
                let href = attribute(attrs, "href").ok_or_else(|| MarkupError::MissingAttribute {
                    tag: "a".into(),
                    attr: "href".into(),
                })?;
                let (inner, consumed) = inner_text(&tag_start[close + 1..], "a")?;
                flush_text(&mut segments, &mut text);
                segments.push(Segment::Anchor {
                    href: unescape(&href),
                    text: unescape(inner),
                });
                offset += open + close + 1 + consumed;
                rest = &tag_start[close + 1 + consumed..];
            },
            "ref" => {
                let id = attribute(attrs, "id").ok_or_else(|| MarkupError::MissingAttribute {
                    tag: "ref".into(),
                    attr: "id".into(),
                })?;
                let kind = attribute(attrs, "type").ok_or_else(|| MarkupError::MissingAttribute {
                    tag: "ref".into(),
                    attr: "type".into(),
                })?;
                let (inner, consumed) = inner_text(&tag_start[close + 1..], "ref")?;
                flush_text(&mut segments, &mut text);
                segments.push(Segment::Ref {
                    id: unescape(&id),
                    kind: unescape(&kind),
                    text: unescape(inner),
                });
                offset += open + close + 1 + consumed;
                rest = &tag_start[close + 1 + consumed..];
            },
            other => return Err(MarkupError::UnsupportedTag(other.to_string())),
        }
    }
    text.push_str(&unescape(rest));
    flush_text(&mut segments, &mut text);
    Ok(Markup(segments))
}

fn flush_text(segments: &mut Vec<Segment>, text: &mut String) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

fn inner_text<'a>(rest: &'a str, tag: &str) -> Result<(&'a str, usize), MarkupError> {
    let closing = format!("</{tag}>");
    let end = rest
        .find(&closing)
        .ok_or_else(|| MarkupError::UnclosedTag(tag.to_string()))?;
    Ok((&rest[..end], end + closing.len()))
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let start = attrs.find(&needle)? + needle.len();
    let end = attrs[start..].find('"')?;
    Some(attrs[start..start + end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let m = parse("hello world").unwrap_or_default();
        assert_eq!(m.plain_text(), "hello world");
        assert_eq!(m.format(), "hello world");
    }

    #[test]
    fn anchors_round_trip() {
        let m = parse(r#"see <a href="https://example.com/v/1">the visit</a> now"#)
            .unwrap_or_default();
        assert_eq!(m.plain_text(), "see the visit now");
        assert_eq!(
            m.format(),
            r#"see <a href="https://example.com/v/1">the visit</a> now"#
        );
    }

    #[test]
    fn entity_refs_parse() {
        let m = parse(r#"ping <ref id="entity_1" type="entity">Joba</ref>"#).unwrap_or_default();
        assert_eq!(m.plain_text(), "ping Joba");
        assert!(matches!(&m.0[1], Segment::Ref { id, .. } if id == "entity_1"));
    }

    #[test]
    fn escaped_entities_unescape_in_plain_text() {
        let m = parse("2 &lt; 3 &amp; 4 &gt; 1").unwrap_or_default();
        assert_eq!(m.plain_text(), "2 < 3 & 4 > 1");
    }

    #[test]
    fn unsupported_tags_are_rejected() {
        assert_eq!(
            parse("<script>x</script>"),
            Err(MarkupError::UnsupportedTag("script".to_string()))
        );
    }

    #[test]
    fn unclosed_anchor_is_rejected() {
        assert_eq!(
            parse(r#"<a href="x">dangling"#),
            Err(MarkupError::UnclosedTag("a".to_string()))
        );
    }

    #[test]
    fn anchor_requires_href() {
        assert!(matches!(
            parse("<a>text</a>"),
            Err(MarkupError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn escape_round_trips_through_parse() {
        let raw = r#"a < b & "c""#;
        let m = parse(&escape(raw)).unwrap_or_default();
        assert_eq!(m.plain_text(), raw);
    }
}
