//! Raw HTML fragments embedded in Markdown.
//!
//! Authors often write `<img src="..">` or `<a href="..">..</a>` directly in
//! their documents. These fragments are split so the image and link tags can
//! be lifted into tree nodes and go through the same resource rewriting as
//! their Markdown counterparts. Anything else is kept verbatim.

use crate::tree::Image;
use regex::Regex;
use std::sync::OnceLock;

static RESOURCE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();

fn resource_tag_regex() -> &'static Regex {
    RESOURCE_TAG_REGEX
        .get_or_init(|| Regex::new(r"(?i)<img\b[^>]*>|<a\b[^>]*>|</a\s*>").unwrap())
}

fn attribute_regex() -> &'static Regex {
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(
            r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
        )
        .unwrap()
    })
}

fn entity_regex() -> &'static Regex {
    ENTITY_REGEX
        .get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").unwrap())
}

/// A piece of a raw HTML fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPiece<'a> {
    /// Untouched markup.
    Html(&'a str),
    Image(Image),
    /// `<a>` start tag with an `href`; `tag` keeps the original text in case
    /// the link never closes.
    OpenLink {
        tag: &'a str,
        target: String,
        title: Option<String>,
    },
    CloseLink(&'a str),
}

/// Split a raw fragment around `<img>`, `<a href>` and `</a>` tags.
pub fn split_raw_html(fragment: &str) -> Vec<RawPiece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for found in resource_tag_regex().find_iter(fragment) {
        let tag = found.as_str();
        let Some(piece) = classify_tag(tag) else {
            continue;
        };

        if found.start() > last {
            pieces.push(RawPiece::Html(&fragment[last..found.start()]));
        }
        pieces.push(piece);
        last = found.end();
    }

    if last < fragment.len() {
        pieces.push(RawPiece::Html(&fragment[last..]));
    }

    pieces
}

fn classify_tag(tag: &str) -> Option<RawPiece<'_>> {
    if tag.starts_with("</") {
        return Some(RawPiece::CloseLink(tag));
    }

    let attributes = parse_attributes(tag);
    let lookup = |name: &str| {
        attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    };

    let is_image = tag.get(1..4).is_some_and(|name| name.eq_ignore_ascii_case("img"));
    if is_image {
        let target = lookup("src")?;
        Some(RawPiece::Image(Image {
            target,
            alt: lookup("alt"),
            title: lookup("title"),
        }))
    } else {
        let target = lookup("href")?;
        Some(RawPiece::OpenLink {
            tag,
            target,
            title: lookup("title"),
        })
    }
}

/// Attributes of a single start tag, values entity-decoded.
///
/// Attributes without a value map to an empty string.
pub fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    let inner = tag
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/');
    // Skip the element name
    let Some(name_end) = inner.find(|c: char| c.is_whitespace()) else {
        return Vec::new();
    };

    attribute_regex()
        .captures_iter(&inner[name_end..])
        .map(|caps| {
            let key = caps[1].to_string();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (key, value)
        })
        .collect()
}

/// Decode the named and numeric character references used in attributes.
///
/// Unknown named references are left as written.
pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    entity_regex()
        .replace_all(value, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };

            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
