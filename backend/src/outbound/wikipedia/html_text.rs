//! Conversion of article HTML fragments into narration-ready plain text.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_OR_STYLE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").ok()
});
static COMMENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").ok());
static BLOCK_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|br|li|ul|ol|dl|dt|dd|h[1-6]|tr|table|section|blockquote|figure|figcaption)\b[^>]*>",
    )
    .ok()
});
static ANY_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").ok());
static ENTITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z]{2,8});").ok());

fn replace(pattern: &LazyLock<Option<Regex>>, text: &str, with: &str) -> String {
    match pattern.as_ref() {
        Some(regex) => regex.replace_all(text, with).into_owned(),
        None => text.to_owned(),
    }
}

/// Strip markup from `html`.
///
/// Script and style blocks are dropped, block-level tags become line breaks,
/// character entities are decoded, and runs of blank lines collapse to one.
/// Applying the function to its own output returns it unchanged.
///
/// # Examples
/// ```
/// use backend::outbound::wikipedia::html_to_text;
///
/// let text = html_to_text("<p>Tour &amp; jardin</p><script>x()</script><p>Ouverte</p>");
/// assert_eq!(text, "Tour & jardin\n\nOuverte");
/// ```
pub fn html_to_text(html: &str) -> String {
    let mut text = strip_once(html);
    // Decoded entities can spell out new markup or entities; every change
    // shortens the text, so this terminates.
    loop {
        let next = strip_once(&text);
        if next == text {
            break;
        }
        text = next;
    }
    collapse_whitespace(&text)
}

fn strip_once(html: &str) -> String {
    let text = replace(&SCRIPT_OR_STYLE, html, "");
    let text = replace(&COMMENT, &text, "");
    let text = replace(&BLOCK_TAG, &text, "\n");
    let text = replace(&ANY_TAG, &text, "");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    let Some(regex) = ENTITY.as_ref() else {
        return text.to_owned();
    };
    regex
        .replace_all(text, |captures: &regex::Captures<'_>| {
            let name = &captures[1];
            decode_entity(name).unwrap_or_else(|| captures[0].to_owned())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(decimal) = name.strip_prefix('#') {
        return decimal
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "–",
        "mdash" => "—",
        "hellip" => "…",
        "laquo" => "«",
        "raquo" => "»",
        "rsquo" => "’",
        "lsquo" => "‘",
        _ => return None,
    };
    Some(decoded.to_owned())
}

fn collapse_whitespace(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs.join("\n\n")
}
