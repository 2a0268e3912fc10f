use crate::caret::Caret;
use crate::merger::Merge;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Whether the block array was mutated
    pub blocks_changed: bool,
    /// Phrases collapsed by the reconcile pass
    pub merges: Vec<Merge>,
    pub caret: Caret,
    pub version: u64,
    /// Whether work is queued for the next settled layout
    pub deferred: bool,
}
