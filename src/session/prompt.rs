use crate::catalog::Entry;
use crate::engine::display::{HintPart, Resolved};

/// The entry currently on screen with its resolved text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub entry: Entry,
    pub primary: String,
    pub hint: String,
    pub parts: Vec<HintPart>,
    /// Random bit the text was resolved with; held until the next draw.
    pub bit: bool,
}

impl Prompt {
    pub fn new(entry: Entry, resolved: Resolved, bit: bool) -> Self {
        Self {
            entry,
            primary: resolved.primary,
            hint: resolved.hint,
            parts: resolved.parts,
            bit,
        }
    }
}
