//! Markdown noise removal applied before a chapter is chunked.
//!
//! Converters leave pandoc cross-reference artifacts and dangling labels
//! behind regardless of the source format; they carry no content and only
//! inflate token estimates.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref XREF_LINK: Regex =
        Regex::new(r"\[\\?\[.+?\\?\]\]\(#[^)]*\)(?:\{[^}]*\})?").unwrap();
    static ref REFERENCE_LINK: Regex = Regex::new(
        r#"\[[^\]]*?\]\(#[^)]*\)\{reference-type="[^"]*"\s+reference="[^"]*"\}"#
    )
    .unwrap();
    static ref REFERENCE_ATTRS: Regex =
        Regex::new(r#"\{reference-type="[^"]*"\s+reference="[^"]*"\}"#).unwrap();
    static ref DANGLING_LABEL: Regex = Regex::new(
        r"\[(?:ch|thm|prob|exer|def|sec|ex|lem|cor|rem|prop|fig|tab|eq):[\w_-]+\\?\]"
    )
    .unwrap();
    static ref CITATION: Regex = Regex::new(r"\[@ref:[^\]]+\]").unwrap();
    static ref EMPTY_HEADER: Regex = Regex::new(r"(?m)^#{2,4}\s*$").unwrap();
    static ref SPACE_RUN: Regex = Regex::new(r"  +").unwrap();
    static ref DUPLICATE_TITLE: Regex = Regex::new(r"(?m)^(# .+)\n\n# .+$").unwrap();
    static ref LEADING_TITLE: Regex = Regex::new(r"\A#\s+.+\n*").unwrap();
}

/// Remove cross-reference artifacts and other noise from chapter markdown.
pub fn preclean(text: &str) -> String {
    let text = XREF_LINK.replace_all(text, "");
    let text = REFERENCE_LINK.replace_all(&text, "");
    let text = REFERENCE_ATTRS.replace_all(&text, "");
    let text = DANGLING_LABEL.replace_all(&text, "");
    let text = CITATION.replace_all(&text, "");
    let text = EMPTY_HEADER.replace_all(&text, "");
    let text = SPACE_RUN.replace_all(&text, " ");
    DUPLICATE_TITLE.replacen(&text, 1, "$1").into_owned()
}

/// Drop the leading `# ` title line and return the trimmed chapter body.
///
/// Only a title on the very first line is removed; chapter metadata comes
/// from the catalog, not from this header.
pub fn strip_title(text: &str) -> &str {
    match LEADING_TITLE.find(text) {
        Some(m) => text[m.end()..].trim(),
        None => text.trim(),
    }
}
