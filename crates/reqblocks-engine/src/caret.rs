use serde::{Deserialize, Serialize};

use crate::block::Block;

/// Logical insertion point: before the block at `index_on_line` on `line`,
/// or at the end of the line when `index_on_line == line.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Caret {
    pub line: usize,
    pub index_on_line: usize,
}

impl Caret {
    pub fn new(line: usize, index_on_line: usize) -> Self {
        Self {
            line,
            index_on_line,
        }
    }

    /// End of the last line.
    pub fn end_of(lines: &[&[Block]]) -> Self {
        let line = lines.len().saturating_sub(1);
        Self::new(line, lines.get(line).map_or(0, |l| l.len()))
    }

    /// Position in the whole block array where text typed here is inserted.
    ///
    /// Every line before the caret's contributes its blocks plus its break.
    pub fn flat_index(&self, lines: &[&[Block]]) -> usize {
        let before: usize = lines
            .iter()
            .take(self.line)
            .map(|line| line.len() + 1)
            .sum();
        before + self.index_on_line
    }

    /// Inverse of [`Caret::flat_index`]. A flat position that lands on a
    /// line break resolves to the end of the line the break closes.
    pub fn from_flat(lines: &[&[Block]], flat: usize) -> Self {
        let mut start = 0;
        for (line, blocks) in lines.iter().enumerate() {
            if flat <= start + blocks.len() {
                return Self::new(line, flat - start);
            }
            start += blocks.len() + 1;
        }
        Self::end_of(lines)
    }

    pub fn is_valid(&self, lines: &[&[Block]]) -> bool {
        lines
            .get(self.line)
            .is_some_and(|line| self.index_on_line <= line.len())
    }

    /// Nearest valid position.
    pub fn clamp(self, lines: &[&[Block]]) -> Self {
        if self.is_valid(lines) {
            return self;
        }
        if lines.is_empty() {
            return Self::default();
        }
        let line = self.line.min(lines.len() - 1);
        Self::new(line, self.index_on_line.min(lines[line].len()))
    }

    pub fn at_line_start(&self) -> bool {
        self.index_on_line == 0
    }

    pub fn at_line_end(&self, lines: &[&[Block]]) -> bool {
        lines
            .get(self.line)
            .is_some_and(|line| self.index_on_line == line.len())
    }

    /// One block left, never crossing into the previous line.
    pub fn left(self) -> Self {
        if self.at_line_start() {
            self
        } else {
            Self::new(self.line, self.index_on_line - 1)
        }
    }

    /// One block right, never crossing into the next line.
    pub fn right(self, lines: &[&[Block]]) -> Self {
        if self.at_line_end(lines) {
            self
        } else {
            Self::new(self.line, self.index_on_line + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::lines::split_lines;
    use crate::tokenizer::tokenize;
    use rstest::rstest;

    fn blocks(text: &str) -> Vec<Block> {
        tokenize(text, 0, &Dictionary::default())
    }

    #[rstest]
    #[case(Caret::new(0, 0), 0)]
    #[case(Caret::new(0, 2), 2)]
    #[case(Caret::new(1, 0), 3)]
    #[case(Caret::new(1, 1), 4)]
    #[case(Caret::new(2, 0), 5)]
    #[case(Caret::new(3, 2), 8)]
    fn flat_index_counts_breaks(#[case] caret: Caret, #[case] flat: usize) {
        let blocks = blocks("a b\nc\n\nd e");
        let lines = split_lines(&blocks);
        assert_eq!(caret.flat_index(&lines), flat);
        assert_eq!(Caret::from_flat(&lines, flat), caret);
    }

    #[test]
    fn from_flat_past_the_end_is_end_of_document() {
        let blocks = blocks("a b\nc");
        let lines = split_lines(&blocks);
        assert_eq!(Caret::from_flat(&lines, 99), Caret::new(1, 1));
        assert_eq!(Caret::end_of(&lines), Caret::new(1, 1));
    }

    #[test]
    fn empty_document_caret() {
        let lines = split_lines(&[]);
        assert_eq!(Caret::end_of(&lines), Caret::new(0, 0));
        assert_eq!(Caret::new(0, 0).flat_index(&lines), 0);
        assert!(Caret::new(0, 0).is_valid(&lines));
        assert!(!Caret::new(0, 1).is_valid(&lines));
    }

    #[test]
    fn clamp_pulls_into_range() {
        let blocks = blocks("a b\nc");
        let lines = split_lines(&blocks);
        assert_eq!(Caret::new(5, 5).clamp(&lines), Caret::new(1, 1));
        assert_eq!(Caret::new(0, 9).clamp(&lines), Caret::new(0, 2));
        assert_eq!(Caret::new(1, 0).clamp(&lines), Caret::new(1, 0));
    }

    #[test]
    fn left_and_right_stay_on_line() {
        let blocks = blocks("a b\nc");
        let lines = split_lines(&blocks);

        assert_eq!(Caret::new(1, 0).left(), Caret::new(1, 0));
        assert_eq!(Caret::new(0, 1).left(), Caret::new(0, 0));
        assert_eq!(Caret::new(0, 2).right(&lines), Caret::new(0, 2));
        assert_eq!(Caret::new(0, 1).right(&lines), Caret::new(0, 2));
        assert!(Caret::new(1, 1).at_line_end(&lines));
        assert!(Caret::new(1, 0).at_line_start());
    }
}
