use crate::block::Block;
use crate::caret::Caret;
use crate::lines::locate;
use crate::tokenizer::join_to_text;

/// Blocks picked by identity, kept in array order, plus the caret position
/// to fall back to once they are deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    members: Vec<u64>,
    restore: Option<Caret>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, index: u64) -> bool {
        self.members.contains(&index)
    }

    pub fn members(&self) -> &[u64] {
        &self.members
    }

    /// Where the caret goes when the selection is deleted: the position the
    /// first selected block had when it was selected.
    pub fn restore(&self) -> Option<Caret> {
        self.restore
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.restore = None;
    }

    /// Select exactly the blocks with the given identities, in array order.
    /// Unknown identities are dropped.
    pub fn select(&mut self, blocks: &[Block], indices: &[u64]) {
        self.members = blocks
            .iter()
            .filter(|block| indices.contains(&block.index))
            .map(|block| block.index)
            .collect();
        self.restore = blocks
            .iter()
            .position(|block| self.members.first() == Some(&block.index))
            .and_then(|position| locate(blocks, position))
            .map(|(line, index_on_line)| Caret::new(line, index_on_line));
    }

    /// Select every block between `from` and `to` inclusive, whichever
    /// comes first in the array.
    pub fn select_range(&mut self, blocks: &[Block], from: u64, to: u64) {
        let position_of = |index| blocks.iter().position(|block| block.index == index);
        let (Some(a), Some(b)) = (position_of(from), position_of(to)) else {
            return;
        };
        let range: Vec<u64> = blocks[a.min(b)..=a.max(b)]
            .iter()
            .map(|block| block.index)
            .collect();
        self.select(blocks, &range);
    }

    /// Shift+click on block `clicked`.
    ///
    /// Starts a selection, extends a single-block selection to the range
    /// ending at `clicked`, or toggles the single selected block off. With
    /// several blocks selected the click starts over from `clicked`.
    pub fn shift_click(&mut self, blocks: &[Block], clicked: u64) {
        if !blocks.iter().any(|block| block.index == clicked) {
            return;
        }

        let single = match self.members.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        match single {
            Some(only) if only == clicked => self.clear(),
            Some(only) if blocks.iter().any(|block| block.index == only) => {
                self.select_range(blocks, only, clicked)
            }
            _ => self.select(blocks, &[clicked]),
        }
    }

    /// Selected blocks still present in `blocks`, in array order.
    pub fn selected<'a>(&'a self, blocks: &'a [Block]) -> impl Iterator<Item = &'a Block> + 'a {
        blocks.iter().filter(|block| self.contains(block.index))
    }

    /// Text of the selection, lines preserved.
    pub fn copy_text(&self, blocks: &[Block]) -> String {
        join_to_text(self.selected(blocks))
    }

    /// Remove every selected block from `blocks`; stale identities match
    /// nothing. Returns how many blocks were removed.
    pub fn delete_from(&self, blocks: &mut Vec<Block>) -> usize {
        let before = blocks.len();
        blocks.retain(|block| !self.contains(block.index));
        before - blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn blocks(text: &str) -> Vec<Block> {
        tokenize(text, 0, &Dictionary::default())
    }

    #[test]
    fn shift_click_starts_extends_and_restarts() {
        // indices: a0 b1 c2 \n3 d4 e5
        let blocks = blocks("a b c\nd e");
        let mut selection = Selection::new();

        selection.shift_click(&blocks, 4);
        assert_eq!(selection.members(), &[4]);
        assert_eq!(selection.restore(), Some(Caret::new(1, 0)));

        selection.shift_click(&blocks, 1);
        assert_eq!(selection.members(), &[1, 2, 3, 4]);
        assert_eq!(selection.restore(), Some(Caret::new(0, 1)));

        selection.shift_click(&blocks, 5);
        assert_eq!(selection.members(), &[5]);
    }

    #[test]
    fn shift_click_on_the_only_selected_block_clears() {
        let blocks = blocks("a b");
        let mut selection = Selection::new();

        selection.shift_click(&blocks, 0);
        selection.shift_click(&blocks, 0);
        assert!(selection.is_empty());
        assert_eq!(selection.restore(), None);
    }

    #[test]
    fn unknown_block_is_ignored() {
        let blocks = blocks("a b");
        let mut selection = Selection::new();

        selection.shift_click(&blocks, 99);
        assert!(selection.is_empty());
    }

    #[test]
    fn copy_joins_in_array_order() {
        let blocks = blocks("a b c\nd e");
        let mut selection = Selection::new();
        selection.select(&blocks, &[4, 2, 3]);

        assert_eq!(selection.members(), &[2, 3, 4]);
        assert_eq!(selection.copy_text(&blocks), "c\nd");
    }

    #[test]
    fn delete_ignores_stale_identities() {
        let mut blocks = blocks("a b c");
        let mut selection = Selection::new();
        selection.select(&blocks, &[0, 2]);

        blocks.retain(|block| block.index != 2);
        assert_eq!(selection.delete_from(&mut blocks), 1);
        assert_eq!(
            blocks.iter().map(|b| b.content.as_str()).collect::<Vec<_>>(),
            vec!["b"]
        );
        assert_eq!(selection.delete_from(&mut blocks), 0);
        assert_eq!(selection.len(), 2);
    }
}
