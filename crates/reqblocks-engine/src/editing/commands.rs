use crate::block::Category;

/// Where dragged blocks are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// At the end of logical line `n`
    Line(usize),
    /// Next to the block with this identity, on the side the drag came from
    Block(u64),
}

/// Commands that can be applied to the editor
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Replace the pending input text
    Input {
        text: String,
    },
    Space,
    Backspace {
        modifier: bool,
    },
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Paste {
        text: String,
    },
    /// Prefab insertion; `None` classifies `content` through the dictionary
    InsertBlock {
        content: String,
        category: Option<Category>,
    },
    ClickBlock {
        index: u64,
        shift: bool,
    },
    /// Click on the free space of logical line `line` at `(x, y)`
    ClickLine {
        line: usize,
        x: f32,
        y: f32,
    },
    ClickOutside,
    DragMove {
        block: u64,
        target: DropTarget,
    },
    DeleteSelection,
    ClearSelection,
}
