//! Segmentation of a section body into prose, environment and proof blocks.
//!
//! Markers are located by two independent scans, merged into one list
//! sorted by offset, and turned into blocks in a single linear pass. An
//! environment or proof block runs from its marker to the next marker of
//! any kind, so a theorem statement never ends up split from the text that
//! belongs to it.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENVIRONMENT: Regex = Regex::new(
        r"(?m)^\*\*(Theorem|Lemma|Proposition|Corollary|Definition|Example|Remark|Conjecture|Axiom|Principle|Convention|Exercise|Investigation|Activity|Exploration|Objectives|Worksheet|Assemblage)(?:\s*\(.*?\))?\.?\*\*"
    )
    .unwrap();
    static ref PROOF: Regex = Regex::new(r"(?m)^\*Proof\.\*").unwrap();
}

/// Theorem-like environments recognized at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentKind {
    Theorem,
    Lemma,
    Proposition,
    Corollary,
    Definition,
    Example,
    Remark,
    Conjecture,
    Axiom,
    Principle,
    Convention,
    Exercise,
    Investigation,
    Activity,
    Exploration,
    Objectives,
    Worksheet,
    Assemblage,
}

impl EnvironmentKind {
    /// Parse the keyword exactly as it appears in the bold marker.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "Theorem" => Self::Theorem,
            "Lemma" => Self::Lemma,
            "Proposition" => Self::Proposition,
            "Corollary" => Self::Corollary,
            "Definition" => Self::Definition,
            "Example" => Self::Example,
            "Remark" => Self::Remark,
            "Conjecture" => Self::Conjecture,
            "Axiom" => Self::Axiom,
            "Principle" => Self::Principle,
            "Convention" => Self::Convention,
            "Exercise" => Self::Exercise,
            "Investigation" => Self::Investigation,
            "Activity" => Self::Activity,
            "Exploration" => Self::Exploration,
            "Objectives" => Self::Objectives,
            "Worksheet" => Self::Worksheet,
            "Assemblage" => Self::Assemblage,
            _ => return None,
        };
        Some(kind)
    }

    /// The marker keyword, used as the block label.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Theorem => "Theorem",
            Self::Lemma => "Lemma",
            Self::Proposition => "Proposition",
            Self::Corollary => "Corollary",
            Self::Definition => "Definition",
            Self::Example => "Example",
            Self::Remark => "Remark",
            Self::Conjecture => "Conjecture",
            Self::Axiom => "Axiom",
            Self::Principle => "Principle",
            Self::Convention => "Convention",
            Self::Exercise => "Exercise",
            Self::Investigation => "Investigation",
            Self::Activity => "Activity",
            Self::Exploration => "Exploration",
            Self::Objectives => "Objectives",
            Self::Worksheet => "Worksheet",
            Self::Assemblage => "Assemblage",
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Free text outside any marker
    Prose,
    /// A theorem-like environment
    Environment(EnvironmentKind),
    /// A proof
    Proof,
}

/// A typed, trimmed span of a section body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    pub text: &'a str,
}

impl<'a> Block<'a> {
    /// Label of the block: the environment keyword, `Proof`, or nothing
    /// for prose.
    pub fn label(&self) -> Option<&'static str> {
        match self.kind {
            BlockKind::Prose => None,
            BlockKind::Environment(kind) => Some(kind.keyword()),
            BlockKind::Proof => Some("Proof"),
        }
    }
}

/// A marker position found by one of the scans.
#[derive(Debug, Clone, Copy)]
struct Marker {
    start: usize,
    kind: BlockKind,
}

fn scan_markers(text: &str) -> Vec<Marker> {
    let mut markers: Vec<Marker> = ENVIRONMENT
        .captures_iter(text)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let kind = EnvironmentKind::from_keyword(caps.get(1)?.as_str())?;
            Some(Marker {
                start,
                kind: BlockKind::Environment(kind),
            })
        })
        .collect();

    markers.extend(PROOF.find_iter(text).map(|m| Marker {
        start: m.start(),
        kind: BlockKind::Proof,
    }));

    markers.sort_by_key(|m| m.start);
    markers
}

/// Split a section body into blocks in source order.
///
/// Text before the first marker becomes a prose block; every marker opens a
/// block that extends to the next marker or the end of the body. Blocks are
/// trimmed and empty ones are dropped.
pub fn split_into_blocks(text: &str) -> Vec<Block<'_>> {
    let body = text.trim();
    if body.is_empty() {
        return Vec::new();
    }

    let markers = scan_markers(text);
    if markers.is_empty() {
        return vec![Block {
            kind: BlockKind::Prose,
            text: body,
        }];
    }

    let mut blocks = Vec::with_capacity(markers.len() + 1);
    let mut pos = 0;

    for (i, marker) in markers.iter().enumerate() {
        if marker.start > pos {
            let prose = text[pos..marker.start].trim();
            if !prose.is_empty() {
                blocks.push(Block {
                    kind: BlockKind::Prose,
                    text: prose,
                });
            }
        }

        let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
        let span = text[marker.start..end].trim();
        if !span.is_empty() {
            blocks.push(Block {
                kind: marker.kind,
                text: span,
            });
        }
        pos = end;
    }

    blocks
}
