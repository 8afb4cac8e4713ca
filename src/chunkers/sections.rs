//! Section parsing by markdown headers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Header lines of level 2 to 4. Level 1 is the chapter title and is
    /// stripped before parsing; deeper levels are treated as body text.
    static ref HEADER: Regex = Regex::new(r"(?m)^(#{2,4})[ \t]+(.+)$").unwrap();
}

/// A section of a chapter defined by a header.
///
/// The chapter preamble (text before the first header) is a section with
/// no header and level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// Trimmed header text
    pub header: Option<&'a str>,
    /// Number of leading `#` characters, 0 for the preamble
    pub level: usize,
    /// Trimmed text between this header line and the next one
    pub body: &'a str,
}

impl<'a> Section<'a> {
    /// Section label used on chunks: the header, or empty for the preamble.
    pub fn label(&self) -> &'a str {
        self.header.unwrap_or("")
    }
}

/// Split a chapter body into sections at `##`-`####` header lines.
///
/// The preamble is always emitted first, even when empty, so a chapter
/// without headers yields exactly one section. Every header opens a new
/// section, including headers immediately followed by another header.
pub fn parse_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut header = None;
    let mut level = 0;
    let mut body_start = 0;

    for caps in HEADER.captures_iter(text) {
        let (Some(line), Some(hashes), Some(title)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        sections.push(Section {
            header,
            level,
            body: text[body_start..line.start()].trim(),
        });

        header = Some(title.as_str().trim());
        level = hashes.as_str().len();
        body_start = line.end();
    }

    sections.push(Section {
        header,
        level,
        body: text[body_start..].trim(),
    });

    sections
}
