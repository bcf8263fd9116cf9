//! Small helpers shared by export and import

use regex::Regex;
use std::sync::OnceLock;
use usdm_model::Study;

const XHTML_OPEN: &str = r#"<div xmlns="http://www.w3.org/1999/xhtml">"#;
const XHTML_CLOSE: &str = "</div>";

/// Lower-case slug: non-alphanumerics become `-`, runs collapse, ends trimmed
pub fn fix_id(value: &str) -> String {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Canonical base url for a study's SoA definitions
pub fn study_url(study: &Study) -> String {
    format!("http://d4k.dk/fhir/vulcan-soa/{}", fix_id(&study.name))
}

/// Wrap section body text in the XHTML narrative div
pub fn to_xhtml(text: &str) -> String {
    format!("{}{}{}", XHTML_OPEN, text, XHTML_CLOSE)
}

/// Strip the XHTML narrative div, if present
pub fn from_xhtml(div: &str) -> String {
    let trimmed = div.trim();
    match trimmed
        .strip_prefix(XHTML_OPEN)
        .and_then(|inner| inner.strip_suffix(XHTML_CLOSE))
    {
        Some(inner) => inner.to_string(),
        None => trimmed.to_string(),
    }
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex must compile"))
}

/// Visible text of an HTML fragment: tags removed, entities decoded
pub fn plain_text(html: &str) -> String {
    let stripped = tag_pattern().replace_all(html, " ");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// True when the fragment has visible content once tags and non-breaking
/// spaces are removed
pub fn has_content(html: &str) -> bool {
    plain_text(&html.replace("&nbsp;", " ").replace("&nbsp", " "))
        .chars()
        .any(|c| !c.is_whitespace() && c != '\u{a0}')
}
