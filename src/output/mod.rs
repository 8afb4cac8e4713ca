//! Output sinks for chunk records.

mod jsonl;

pub use jsonl::{combine_jsonl, read_jsonl, write_jsonl};
