pub mod block;
pub mod caret;
pub mod dictionary;
pub mod editing;
pub mod error;
pub mod layout;
pub mod lines;
pub mod merger;
pub mod selection;
pub mod style;
pub mod tokenizer;

// Re-export key types for easier usage
pub use block::{Block, Category, IndexAllocator, LINE_BREAK};
pub use caret::Caret;
pub use dictionary::{CategoryEntry, Dictionary};
pub use editing::{Cmd, DropTarget, Editor, Patch};
pub use error::EngineError;
pub use layout::{LayoutOracle, MonospaceLayout, Rect};
pub use lines::split_lines;
pub use merger::Merger;
pub use selection::Selection;
pub use style::{BlockStyle, StyleMap, StyleResolver};
pub use tokenizer::{join_to_text, tokenize};
