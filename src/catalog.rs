//! Book catalog and chapter metadata resolution.
//!
//! The catalog is built once from configuration and passed by reference to
//! whatever needs chapter metadata; there is no process-wide cache.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::ChapterMeta;

lazy_static! {
    static ref NUMERIC_PREFIX: Regex = Regex::new(r"^\d+_").unwrap();
}

/// A named part of a book and the chapter titles it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<String>,
}

/// Catalog entry for one book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    /// Short key, also the book's directory name under the chapters root
    pub key: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Subject tag
    #[serde(default)]
    pub subject: String,

    /// Level tag
    #[serde(default)]
    pub level: String,

    /// Parts, each listing its chapter titles
    #[serde(default)]
    pub parts: Vec<PartInfo>,
}

impl BookInfo {
    /// Fallback entry for a key missing from the catalog.
    pub fn unknown(key: &str) -> Self {
        Self {
            key: key.to_string(),
            name: key.to_string(),
            ..Default::default()
        }
    }

    /// Name of the part containing the chapter with this title.
    pub fn part_for(&self, chapter: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.chapters.iter().any(|c| c == chapter))
            .map(|p| p.name.as_str())
    }
}

/// Ordered collection of known books.
#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    books: Vec<BookInfo>,
}

impl BookCatalog {
    /// Create a catalog from entries in processing order.
    pub fn new(books: Vec<BookInfo>) -> Self {
        Self { books }
    }

    /// Look up a book by key.
    pub fn get(&self, key: &str) -> Option<&BookInfo> {
        self.books.iter().find(|b| b.key == key)
    }

    /// Book keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.books.iter().map(|b| b.key.as_str())
    }

    /// Number of books in the catalog.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Resolve the metadata record for one chapter file.
    ///
    /// The chapter title comes from the markdown's leading `# ` header, or
    /// failing that from the file stem with its numeric prefix removed.
    pub fn resolve_chapter_meta(&self, book_key: &str, filename: &str, markdown: &str) -> ChapterMeta {
        let fallback;
        let book = match self.get(book_key) {
            Some(book) => book,
            None => {
                fallback = BookInfo::unknown(book_key);
                &fallback
            }
        };

        let chapter = title_from_markdown(markdown)
            .map(String::from)
            .unwrap_or_else(|| title_from_filename(filename));
        let part = book.part_for(&chapter).unwrap_or_default().to_string();

        ChapterMeta {
            book: book.name.clone(),
            book_key: book_key.to_string(),
            subject: book.subject.clone(),
            level: book.level.clone(),
            part,
            chapter,
            source_file: filename.to_string(),
        }
    }
}

/// Strip a `NN_` ordering prefix from a file stem.
pub fn strip_numeric_prefix(stem: &str) -> &str {
    match NUMERIC_PREFIX.find(stem) {
        Some(m) => &stem[m.end()..],
        None => stem,
    }
}

/// Title of a leading `# ` header line, if present and non-empty.
pub fn title_from_markdown(markdown: &str) -> Option<&str> {
    let first_line = markdown.lines().next()?.trim();
    let title = first_line.strip_prefix("# ")?.trim();
    (!title.is_empty()).then_some(title)
}

/// Readable title derived from a chapter file name, e.g.
/// `05_grp-intro.md` becomes `Grp Intro`.
pub fn title_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    title_case(&strip_numeric_prefix(stem).replace('-', " "))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> BookCatalog {
        BookCatalog::new(vec![BookInfo {
            key: "aata".to_string(),
            name: "Abstract Algebra: Theory and Applications".to_string(),
            subject: "abstract-algebra".to_string(),
            level: "intro".to_string(),
            parts: vec![
                PartInfo {
                    name: "Foundations".to_string(),
                    chapters: vec!["Preliminaries".to_string(), "The Integers".to_string()],
                },
                PartInfo {
                    name: "Group Theory".to_string(),
                    chapters: vec!["Groups".to_string(), "Cyclic Groups".to_string()],
                },
            ],
        }])
    }

    #[test]
    fn test_strip_numeric_prefix() {
        assert_eq!(strip_numeric_prefix("05_grp-intro"), "grp-intro");
        assert_eq!(strip_numeric_prefix("grp-intro"), "grp-intro");
        assert_eq!(strip_numeric_prefix("2021-notes"), "2021-notes");
    }

    #[test]
    fn test_title_from_markdown() {
        assert_eq!(title_from_markdown("# Cyclic Groups\n\nBody"), Some("Cyclic Groups"));
        assert_eq!(title_from_markdown("## Not a title\n"), None);
        assert_eq!(title_from_markdown("# \nBody"), None);
        assert_eq!(title_from_markdown(""), None);
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("05_grp-intro.md"), "Grp Intro");
        assert_eq!(title_from_filename("quadratic-RECIPROCITY.md"), "Quadratic Reciprocity");
    }

    #[test]
    fn test_resolve_known_book() {
        let meta = catalog().resolve_chapter_meta("aata", "04_cyclic.md", "# Cyclic Groups\n\nText");
        assert_eq!(
            meta,
            ChapterMeta {
                book: "Abstract Algebra: Theory and Applications".to_string(),
                book_key: "aata".to_string(),
                subject: "abstract-algebra".to_string(),
                level: "intro".to_string(),
                part: "Group Theory".to_string(),
                chapter: "Cyclic Groups".to_string(),
                source_file: "04_cyclic.md".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_unknown_book_and_untitled_chapter() {
        let meta = catalog().resolve_chapter_meta("napkin", "12_grp-intro.md", "No header here.");
        assert_eq!(meta.book, "napkin");
        assert_eq!(meta.subject, "");
        assert_eq!(meta.part, "");
        assert_eq!(meta.chapter, "Grp Intro");
    }

    #[test]
    fn test_catalog_order() {
        let catalog = catalog();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["aata"]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("missing").is_none());
    }
}
