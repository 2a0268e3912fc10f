//! Conversion between plain text and block sequences.
//!
//! [`tokenize`] is the import boundary and [`join_to_text`] its inverse.
//! Text without merge-eligible phrases and with single spaces between
//! words survives `join_to_text(&tokenize(text, ..))` unchanged.

use crate::block::{Block, LINE_BREAK};
use crate::dictionary::Dictionary;

/// Split `text` into blocks, numbering them from `base`.
///
/// Every maximal run of non-whitespace becomes one block and every hard
/// line break becomes one line-break block, so blank lines survive as
/// consecutive breaks. Whitespace around the whole text is dropped.
pub fn tokenize(text: &str, base: u64, dictionary: &Dictionary) -> Vec<Block> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut blocks: Vec<Block> = Vec::new();
    let next_index = |blocks: &Vec<Block>| base + blocks.len() as u64;

    for (line_number, line) in text.split('\n').enumerate() {
        if line_number > 0 {
            blocks.push(Block::line_break(next_index(&blocks)));
        }
        for word in line.split_whitespace() {
            let category = dictionary.classify(word);
            blocks.push(Block::new(next_index(&blocks), word, category));
        }
    }

    blocks
}

/// Render blocks back to text: single spaces between blocks on a line,
/// one `\n` per line-break block.
pub fn join_to_text<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> String {
    let mut result = String::new();
    let mut previous_was_break = false;

    for block in blocks {
        let is_break = block.is_line_break();
        if !is_break && !result.is_empty() && !previous_was_break {
            result.push(' ');
        }
        result.push_str(if is_break {
            LINE_BREAK
        } else {
            block.content.as_str()
        });
        previous_was_break = is_break;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Category;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn contents(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.content.as_str()).collect()
    }

    #[test]
    fn words_become_blocks_with_offset_indices() {
        let blocks = tokenize("the cat sat", 10, &Dictionary::ears());

        assert_eq!(contents(&blocks), vec!["the", "cat", "sat"]);
        assert_eq!(
            blocks.iter().map(|b| b.index).collect::<Vec<_>>(),
            vec![10, 11, 12]
        );
        assert_eq!(blocks[0].category, Category::Other);
        assert_eq!(blocks[1].category, Category::Unset);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\n  \t\n")]
    fn blank_input_produces_no_blocks(#[case] text: &str) {
        assert!(tokenize(text, 0, &Dictionary::ears()).is_empty());
    }

    #[test]
    fn word_followed_by_newline_keeps_one_break() {
        let blocks = tokenize("if\nthen", 0, &Dictionary::ears());
        assert_eq!(contents(&blocks), vec!["if", "\n", "then"]);
        assert!(blocks[1].is_line_break());
    }

    #[test]
    fn blank_lines_are_preserved() {
        let blocks = tokenize("a\n\nb\n   \n\nc", 0, &Dictionary::ears());
        assert_eq!(
            contents(&blocks),
            vec!["a", "\n", "\n", "b", "\n", "\n", "\n", "c"]
        );
    }

    #[test]
    fn surrounding_whitespace_is_dropped() {
        let blocks = tokenize("  \n while   x \n", 0, &Dictionary::ears());
        assert_eq!(contents(&blocks), vec!["while", "x"]);
    }

    #[test]
    fn carriage_returns_are_whitespace() {
        let blocks = tokenize("a b\r\nc", 0, &Dictionary::ears());
        assert_eq!(contents(&blocks), vec!["a", "b", "\n", "c"]);
    }

    #[rstest]
    #[case("the cat sat")]
    #[case("if x\nthen y")]
    #[case("first\n\nsecond line\n\n\nthird")]
    #[case("single")]
    fn join_inverts_tokenize(#[case] text: &str) {
        let blocks = tokenize(text, 0, &Dictionary::ears());
        assert_eq!(join_to_text(&blocks), text);
    }

    #[test]
    fn join_normalizes_whitespace() {
        let blocks = tokenize("a    b \t c", 0, &Dictionary::ears());
        assert_eq!(join_to_text(&blocks), "a b c");
    }

    #[test]
    fn join_keeps_merged_phrases_verbatim() {
        let blocks = vec![
            Block::new(0, "left gear state", Category::Object),
            Block::new(1, "is", Category::RelationalOperator),
            Block::line_break(2),
            Block::new(3, "on", Category::State),
        ];
        assert_eq!(join_to_text(&blocks), "left gear state is\non");
    }
}
