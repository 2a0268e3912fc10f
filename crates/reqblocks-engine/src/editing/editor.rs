use std::collections::VecDeque;

use crate::block::{Block, Category, IndexAllocator};
use crate::caret::Caret;
use crate::dictionary::Dictionary;
use crate::editing::{Cmd, DropTarget, Patch};
use crate::layout::{LayoutOracle, Vertical, move_vertical, resolve_click};
use crate::lines::{locate, split_lines};
use crate::merger::Merger;
use crate::selection::Selection;
use crate::tokenizer::{join_to_text, tokenize};

/// Work that has to wait for the next settled layout.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Deferred {
    Vertical(Vertical),
    Click { line: usize, x: f32, y: f32 },
}

/// One open document: the block array and everything layered on it.
///
/// The block array is the single source of truth. Lines are re-derived from
/// it on demand and never stored. Every mutating command runs through the
/// same pipeline:
///
/// 1. mutate the flat block array
/// 2. run the merge pass, carrying the caret's flat index through it
/// 3. re-derive lines and place the caret
/// 4. bump the version and mark the layout stale
///
/// Commands that read rendered geometry (`ArrowUp`, `ArrowDown`,
/// `ClickLine`) are queued by [`Editor::apply`] and run by
/// [`Editor::after_layout`] once the front end has painted the new state.
#[derive(Debug, Clone)]
pub struct Editor {
    blocks: Vec<Block>,
    ids: IndexAllocator,
    caret: Caret,
    pending: String,
    selection: Selection,
    dictionary: Dictionary,
    merger: Merger,
    version: u64,
    layout_stale: bool,
    /// Height of one unwrapped row, captured from the first settled layout
    base_row_height: Option<f32>,
    deferred: VecDeque<Deferred>,
}

impl Editor {
    pub fn new(dictionary: Dictionary) -> Self {
        Self::from_text("", dictionary)
    }

    /// Open a document from plain text; the caret starts at the end.
    pub fn from_text(text: &str, dictionary: Dictionary) -> Self {
        let merger = Merger::new(&dictionary);
        let mut blocks = tokenize(text, 0, &dictionary);
        let ids = IndexAllocator::starting_at(blocks.len() as u64);
        if let Some(outcome) = merger.merge_pass(&blocks, 0) {
            blocks = outcome.blocks;
        }
        let caret = Caret::end_of(&split_lines(&blocks));

        Self {
            blocks,
            ids,
            caret,
            pending: String::new(),
            selection: Selection::new(),
            dictionary,
            merger,
            version: 0,
            layout_stale: true,
            base_row_height: None,
            deferred: VecDeque::new(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn lines(&self) -> Vec<&[Block]> {
        split_lines(&self.blocks)
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_layout_stale(&self) -> bool {
        self.layout_stale
    }

    pub fn base_row_height(&self) -> Option<f32> {
        self.base_row_height
    }

    /// Plain-text export.
    pub fn text(&self) -> String {
        join_to_text(&self.blocks)
    }

    /// Text of the current selection, empty when nothing is selected.
    pub fn copy(&self) -> String {
        self.selection.copy_text(&self.blocks)
    }

    /// Apply command to the document
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        log::trace!("apply {cmd:?}");
        self.layout_stale = true;

        match cmd {
            Cmd::Input { text } => {
                self.selection.clear();
                self.pending = text;
                self.unchanged()
            }
            Cmd::Space => {
                let committed = self.commit_pending();
                self.or_unchanged(committed)
            }
            Cmd::Backspace { modifier } => self.backspace(modifier),
            Cmd::ArrowLeft => self.step(|caret, _| caret.left()),
            Cmd::ArrowRight => self.step(|caret, lines| caret.right(lines)),
            Cmd::ArrowUp => self.defer(Deferred::Vertical(Vertical::Up)),
            Cmd::ArrowDown => self.defer(Deferred::Vertical(Vertical::Down)),
            Cmd::Enter => self.enter(),
            Cmd::Paste { text } => self.paste(&text),
            Cmd::InsertBlock { content, category } => self.insert_block(&content, category),
            Cmd::ClickBlock { index, shift } => self.click_block(index, shift),
            Cmd::ClickLine { line, x, y } => {
                self.selection.clear();
                let committed = self.commit_pending();
                self.deferred.push_back(Deferred::Click { line, x, y });
                self.or_unchanged(committed)
            }
            Cmd::ClickOutside => self.click_outside(),
            Cmd::DragMove { block, target } => self.drag_move(block, target),
            Cmd::DeleteSelection => self.delete_selection(),
            Cmd::ClearSelection => {
                self.selection.clear();
                self.unchanged()
            }
        }
    }

    /// Run queued geometry-dependent work against a settled layout.
    ///
    /// The first call records the base row height, the height of one
    /// visual row as reported by the oracle. Work stops as soon as
    /// the caret moves, since that invalidates the layout just read; the
    /// rest runs after the next paint.
    pub fn after_layout(&mut self, oracle: &dyn LayoutOracle) -> Patch {
        self.layout_stale = false;
        if self.base_row_height.is_none() {
            self.base_row_height = oracle.row_height();
        }
        let Some(base) = self.base_row_height else {
            log::warn!("no row height yet; keeping queued caret moves");
            return self.unchanged();
        };

        while !self.layout_stale {
            let Some(work) = self.deferred.pop_front() else {
                break;
            };
            let lines = split_lines(&self.blocks);
            let target = match work {
                Deferred::Vertical(direction) => move_vertical(
                    &lines,
                    self.caret,
                    direction,
                    self.pending.is_empty(),
                    base,
                    oracle,
                ),
                Deferred::Click { line, .. } if line >= lines.len() => Some(Caret::end_of(&lines)),
                Deferred::Click { line, x, y } => {
                    resolve_click(&lines, line, x, y, base, oracle).map(|i| Caret::new(line, i))
                }
            };

            match target.map(|caret| caret.clamp(&lines)) {
                Some(caret) if caret != self.caret => {
                    self.caret = caret;
                    self.layout_stale = true;
                }
                Some(_) => {}
                None => log::warn!("no geometry for {work:?}; caret stays at {:?}", self.caret),
            }
        }

        self.unchanged()
    }

    fn unchanged(&self) -> Patch {
        Patch {
            blocks_changed: false,
            merges: Vec::new(),
            caret: self.caret,
            version: self.version,
            deferred: !self.deferred.is_empty(),
        }
    }

    /// The patch of an earlier commit in this command, updated to the
    /// current caret, or an empty patch.
    fn or_unchanged(&self, committed: Option<Patch>) -> Patch {
        match committed {
            Some(patch) => Patch {
                caret: self.caret,
                deferred: !self.deferred.is_empty(),
                ..patch
            },
            None => self.unchanged(),
        }
    }

    fn defer(&mut self, work: Deferred) -> Patch {
        self.deferred.push_back(work);
        self.unchanged()
    }

    /// Horizontal caret movement, only while nothing is being typed.
    fn step(&mut self, movement: impl Fn(Caret, &[&[Block]]) -> Caret) -> Patch {
        if self.pending.is_empty() {
            let lines = split_lines(&self.blocks);
            self.caret = movement(self.caret, &lines);
        }
        self.unchanged()
    }

    /// Tokenize `text` into blocks carrying fresh identities.
    fn fresh_blocks(&mut self, text: &str) -> Vec<Block> {
        let blocks = tokenize(text, self.ids.peek(), &self.dictionary);
        self.ids.reserve(blocks.len());
        blocks
    }

    fn splice_at_caret(&mut self, inserted: Vec<Block>) -> Patch {
        let at = self.caret.flat_index(&split_lines(&self.blocks));
        let end = at + inserted.len();
        self.blocks.splice(at..at, inserted);
        self.commit(end)
    }

    /// Reconcile after a mutation and put the caret at flat index
    /// `caret_flat` of the mutated array.
    fn commit(&mut self, caret_flat: usize) -> Patch {
        let mut merges = Vec::new();
        let mut flat = caret_flat;
        if let Some(outcome) = self.merger.merge_pass(&self.blocks, caret_flat) {
            self.blocks = outcome.blocks;
            merges = outcome.merges;
            flat = outcome.caret;
        }

        if !self.selection.is_empty() {
            let members = self.selection.members().to_vec();
            self.selection.select(&self.blocks, &members);
        }

        let lines = split_lines(&self.blocks);
        self.caret = Caret::from_flat(&lines, flat).clamp(&lines);
        self.version += 1;
        self.layout_stale = true;

        Patch {
            blocks_changed: true,
            merges,
            caret: self.caret,
            version: self.version,
            deferred: !self.deferred.is_empty(),
        }
    }

    /// Turn pending text into blocks at the caret.
    fn commit_pending(&mut self) -> Option<Patch> {
        if self.pending.trim().is_empty() {
            self.pending.clear();
            return None;
        }
        let pending = std::mem::take(&mut self.pending);
        let inserted = self.fresh_blocks(&pending);
        Some(self.splice_at_caret(inserted))
    }

    fn enter(&mut self) -> Patch {
        self.selection.clear();
        let pending = std::mem::take(&mut self.pending);
        let mut inserted = self.fresh_blocks(&pending);
        inserted.push(Block::line_break(self.ids.allocate()));
        self.splice_at_caret(inserted)
    }

    fn paste(&mut self, text: &str) -> Patch {
        if text.trim().is_empty() {
            return self.unchanged();
        }
        self.selection.clear();
        let pending = std::mem::take(&mut self.pending);
        let mut inserted = self.fresh_blocks(&pending);
        inserted.extend(self.fresh_blocks(text));
        self.splice_at_caret(inserted)
    }

    fn insert_block(&mut self, content: &str, category: Option<Category>) -> Patch {
        let content = content.trim();
        if content.is_empty() {
            return self.unchanged();
        }
        self.selection.clear();
        let pending = std::mem::take(&mut self.pending);
        let mut inserted = self.fresh_blocks(&pending);
        let category = category.unwrap_or_else(|| self.dictionary.classify(content));
        inserted.push(Block::new(self.ids.allocate(), content, category));
        self.splice_at_caret(inserted)
    }

    fn backspace(&mut self, modifier: bool) -> Patch {
        if !self.selection.is_empty() {
            return self.delete_selection();
        }
        if !self.pending.is_empty() {
            if modifier {
                self.pending.clear();
            } else {
                self.pending.pop();
            }
            return self.unchanged();
        }

        let at = self.caret.flat_index(&split_lines(&self.blocks));
        if at == 0 {
            return self.unchanged();
        }

        // at line start the block before the caret is the previous line's break
        let removed = self.blocks.remove(at - 1);
        if !modifier && !removed.is_line_break() {
            self.pending = removed.content;
        }
        self.commit(at - 1)
    }

    fn delete_selection(&mut self) -> Patch {
        if self.selection.is_empty() {
            return self.unchanged();
        }
        let restore = self.selection.restore().unwrap_or(self.caret);
        let removed = self.selection.delete_from(&mut self.blocks);
        self.selection.clear();
        if removed == 0 {
            return self.unchanged();
        }

        let lines = split_lines(&self.blocks);
        let flat = restore.clamp(&lines).flat_index(&lines);
        self.commit(flat)
    }

    fn click_block(&mut self, index: u64, shift: bool) -> Patch {
        if shift {
            self.selection.shift_click(&self.blocks, index);
            return self.unchanged();
        }
        if !self.selection.contains(index) {
            self.selection.clear();
        }

        let committed = self.commit_pending();
        if let Some(position) = self.blocks.iter().position(|block| block.index == index)
            && let Some((line, index_on_line)) = locate(&self.blocks, position)
        {
            self.caret = Caret::new(line, index_on_line + 1);
        }
        self.or_unchanged(committed)
    }

    fn click_outside(&mut self) -> Patch {
        self.selection.clear();
        let committed = self.commit_pending();
        self.caret = Caret::end_of(&split_lines(&self.blocks));
        self.or_unchanged(committed)
    }

    /// Move `block`, or every non-break selected block when `block` is
    /// part of a multi-block selection, to `target`.
    fn drag_move(&mut self, block: u64, target: DropTarget) -> Patch {
        let committed = self.commit_pending();

        let multi = self.selection.len() > 1 && self.selection.contains(block);
        let moving: Vec<u64> = if multi {
            self.selection
                .selected(&self.blocks)
                .filter(|selected| !selected.is_line_break())
                .map(|selected| selected.index)
                .collect()
        } else {
            vec![block]
        };

        let Some(source) = position_of(&self.blocks, block) else {
            return self.or_unchanged(committed);
        };

        let (moved, mut remaining): (Vec<Block>, Vec<Block>) = self
            .blocks
            .iter()
            .cloned()
            .partition(|b| moving.contains(&b.index));

        let at = match target {
            DropTarget::Block(target) => {
                if moving.contains(&target) {
                    return self.or_unchanged(committed);
                }
                let (Some(original), Some(position)) = (
                    position_of(&self.blocks, target),
                    position_of(&remaining, target),
                ) else {
                    return self.or_unchanged(committed);
                };
                if source < original { position + 1 } else { position }
            }
            DropTarget::Line(line) => remaining
                .iter()
                .enumerate()
                .filter(|(_, b)| b.is_line_break())
                .nth(line)
                .map_or(remaining.len(), |(position, _)| position),
        };

        let end = at + moved.len();
        remaining.splice(at..at, moved);
        if remaining == self.blocks {
            return self.or_unchanged(committed);
        }
        self.blocks = remaining;
        if multi {
            // breaks left behind are no longer part of the selection
            self.selection.select(&self.blocks, &moving);
        }
        self.commit(end)
    }
}

fn position_of(blocks: &[Block], index: u64) -> Option<usize> {
    blocks.iter().position(|block| block.index == index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceLayout;
    use pretty_assertions::assert_eq;

    fn contents(editor: &Editor) -> Vec<&str> {
        editor.blocks().iter().map(|b| b.content.as_str()).collect()
    }

    fn type_word(editor: &mut Editor, word: &str) -> Patch {
        editor.apply(Cmd::Input {
            text: word.to_string(),
        });
        editor.apply(Cmd::Space)
    }

    fn settle(editor: &mut Editor, width: usize) -> Patch {
        let layout = MonospaceLayout::compute(&editor.lines(), width, editor.caret(), editor.pending());
        editor.after_layout(&layout)
    }

    #[test]
    fn opens_with_caret_at_end_and_phrases_merged() {
        let editor = Editor::from_text("while aircraft speed\nis", Dictionary::ears());

        assert_eq!(contents(&editor), vec!["while", "aircraft speed", "\n", "is"]);
        assert_eq!(editor.caret(), Caret::new(1, 1));
        assert_eq!(editor.version(), 0);
    }

    #[test]
    fn space_without_pending_text_does_nothing() {
        let mut editor = Editor::from_text("a", Dictionary::default());
        let patch = editor.apply(Cmd::Space);

        assert!(!patch.blocks_changed);
        assert_eq!(contents(&editor), vec!["a"]);
    }

    #[test]
    fn committed_blocks_get_fresh_indices() {
        let mut editor = Editor::from_text("a b", Dictionary::default());
        type_word(&mut editor, "c");

        assert_eq!(
            editor.blocks().iter().map(|b| b.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        editor.apply(Cmd::Backspace { modifier: true });
        type_word(&mut editor, "d");
        assert_eq!(editor.blocks()[2].index, 3);
    }

    #[test]
    fn plain_backspace_trims_pending_text() {
        let mut editor = Editor::new(Dictionary::default());
        editor.apply(Cmd::Input {
            text: "cat".to_string(),
        });
        editor.apply(Cmd::Backspace { modifier: false });
        assert_eq!(editor.pending(), "ca");

        editor.apply(Cmd::Backspace { modifier: true });
        assert_eq!(editor.pending(), "");
        assert!(editor.blocks().is_empty());
    }

    #[test]
    fn backspace_at_document_start_is_noop() {
        let mut editor = Editor::from_text("a", Dictionary::default());
        editor.apply(Cmd::ArrowLeft);
        let patch = editor.apply(Cmd::Backspace { modifier: false });

        assert!(!patch.blocks_changed);
        assert_eq!(editor.caret(), Caret::new(0, 0));
        assert_eq!(contents(&editor), vec!["a"]);
    }

    #[test]
    fn arrows_wait_for_pending_text() {
        let mut editor = Editor::from_text("a b", Dictionary::default());
        editor.apply(Cmd::Input {
            text: "x".to_string(),
        });
        editor.apply(Cmd::ArrowLeft);
        assert_eq!(editor.caret(), Caret::new(0, 2));

        editor.apply(Cmd::Input {
            text: String::new(),
        });
        editor.apply(Cmd::ArrowLeft);
        assert_eq!(editor.caret(), Caret::new(0, 1));
    }

    #[test]
    fn prefab_insertion_keeps_given_category() {
        let mut editor = Editor::from_text("while", Dictionary::ears());
        let patch = editor.apply(Cmd::InsertBlock {
            content: "left gear state".to_string(),
            category: Some(Category::Object),
        });

        assert!(patch.blocks_changed);
        assert_eq!(contents(&editor), vec!["while", "left gear state"]);
        assert_eq!(editor.blocks()[1].category, Category::Object);
        assert_eq!(editor.caret(), Caret::new(0, 2));
    }

    #[test]
    fn custom_prefab_is_classified() {
        let mut editor = Editor::new(Dictionary::ears());
        editor.apply(Cmd::InsertBlock {
            content: "shall".to_string(),
            category: None,
        });
        assert_eq!(editor.blocks()[0].category, Category::Keyword);
    }

    #[test]
    fn vertical_moves_wait_for_layout() {
        let mut editor = Editor::from_text("aaa bbb\nccc", Dictionary::default());
        let patch = editor.apply(Cmd::ArrowUp);

        assert!(patch.deferred);
        assert_eq!(editor.caret(), Caret::new(1, 1));

        let patch = settle(&mut editor, 80);
        assert!(!patch.deferred);
        assert_eq!(editor.base_row_height(), Some(1.0));
        assert_eq!(editor.caret(), Caret::new(0, 1));
        assert!(editor.is_layout_stale());
    }

    #[test]
    fn missing_geometry_keeps_caret() {
        struct Blank;
        impl LayoutOracle for Blank {
            fn line_height(&self, _line: usize) -> Option<f32> {
                Some(1.0)
            }
            fn block_rects(&self, _line: usize) -> Option<Vec<crate::layout::Rect>> {
                None
            }
        }

        let mut editor = Editor::from_text("a\nb", Dictionary::default());
        editor.apply(Cmd::ArrowUp);
        let patch = editor.after_layout(&Blank);

        assert!(!patch.deferred);
        assert_eq!(editor.caret(), Caret::new(1, 1));
    }

    #[test]
    fn geometry_with_extra_boxes_keeps_caret_on_the_line() {
        use crate::layout::Rect;

        // reports five boxes on every line, more than the document has
        struct Crowded;
        impl LayoutOracle for Crowded {
            fn line_height(&self, _line: usize) -> Option<f32> {
                Some(1.0)
            }
            fn block_rects(&self, _line: usize) -> Option<Vec<Rect>> {
                Some((0..5).map(|i| Rect::new(i as f32 * 10.0, 0.0, 8.0, 1.0)).collect())
            }
            fn caret_rect(&self) -> Option<Rect> {
                Some(Rect::new(45.0, 0.0, 1.0, 1.0))
            }
        }

        let mut editor = Editor::from_text("a\nb", Dictionary::default());
        editor.apply(Cmd::ArrowUp);
        editor.after_layout(&Crowded);
        assert_eq!(editor.caret(), Caret::new(0, 1));

        editor.apply(Cmd::ClickLine {
            line: 1,
            x: 100.0,
            y: 0.0,
        });
        editor.after_layout(&Crowded);
        assert_eq!(editor.caret(), Caret::new(1, 1));
    }

    #[test]
    fn click_line_commits_pending_before_resolving() {
        let mut editor = Editor::from_text("aaa bbb ccc", Dictionary::default());
        editor.apply(Cmd::Input {
            text: "x".to_string(),
        });
        let patch = editor.apply(Cmd::ClickLine {
            line: 0,
            x: 0.0,
            y: 0.0,
        });

        assert!(patch.blocks_changed);
        assert!(patch.deferred);
        assert_eq!(contents(&editor), vec!["aaa", "bbb", "ccc", "x"]);

        settle(&mut editor, 80);
        assert_eq!(editor.caret(), Caret::new(0, 0));
    }

    #[test]
    fn click_outside_goes_to_end() {
        let mut editor = Editor::from_text("a b\nc", Dictionary::default());
        editor.apply(Cmd::ClickBlock {
            index: 0,
            shift: false,
        });
        assert_eq!(editor.caret(), Caret::new(0, 1));

        editor.apply(Cmd::ClickOutside);
        assert_eq!(editor.caret(), Caret::new(1, 1));
    }
}
