use std::collections::HashMap;

use crate::block::{Block, Category};
use crate::dictionary::{Dictionary, Phrase, is_numeric, sanitize};

/// One collapse performed by the merge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    /// Flat position of the run at the time it was merged
    pub start: usize,
    /// Number of blocks the run contained
    pub len: usize,
    /// Identity of the resulting block (the last index of the run)
    pub index: u64,
    pub category: Category,
}

/// Result of a merge pass that changed something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub blocks: Vec<Block>,
    pub merges: Vec<Merge>,
    /// The caller's flat caret index, moved so it stays after the same word
    pub caret: usize,
}

/// Collapses runs of single-word blocks into multi-word phrase blocks.
#[derive(Debug, Clone)]
pub struct Merger {
    phrases: Vec<Phrase>,
    /// First word -> phrase positions, in dictionary order
    candidates: HashMap<String, Vec<usize>>,
    /// Sanitized like the words it is compared with
    requirement_token: String,
}

impl Merger {
    pub fn new(dictionary: &Dictionary) -> Self {
        let phrases = dictionary.phrases();
        let mut candidates: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, phrase) in phrases.iter().enumerate() {
            if let Some(first) = phrase.words.first() {
                candidates.entry(first.clone()).or_default().push(position);
            }
        }

        Self {
            phrases,
            candidates,
            requirement_token: sanitize(&dictionary.requirement_token).into_owned(),
        }
    }

    /// Scan `blocks` left to right and collapse every eligible run.
    ///
    /// Overlapping candidates sharing a first word are resolved by taking the
    /// first one that matches in dictionary order. Returns `None` when the
    /// pass finds nothing to merge; a second pass over the output always does.
    pub fn merge_pass(&self, blocks: &[Block], caret: usize) -> Option<MergeOutcome> {
        let mut blocks = blocks.to_vec();
        let mut caret = caret;
        let mut merges = Vec::new();

        let mut start = 0;
        while start < blocks.len() {
            let block = &blocks[start];
            if block.is_line_break() || block.content.contains(' ') {
                start += 1;
                continue;
            }

            let word = sanitize(&block.content).into_owned();
            let matched = if word == self.requirement_token {
                self.requirement_run(&blocks, start)
            } else {
                self.phrase_run(&blocks, start, &word)
            };

            if let Some((len, category)) = matched {
                let merge = collapse(&mut blocks, start, len, category);
                caret = caret_after_merge(caret, &merge);
                log::debug!(
                    "merged {} blocks at {} into {:?}",
                    merge.len,
                    merge.start,
                    blocks[start].content
                );
                merges.push(merge);
            }
            start += 1;
        }

        if merges.is_empty() {
            None
        } else {
            Some(MergeOutcome {
                blocks,
                merges,
                caret,
            })
        }
    }

    fn requirement_run(&self, blocks: &[Block], start: usize) -> Option<(usize, Category)> {
        let next = blocks.get(start + 1)?;
        (!next.is_line_break() && is_numeric(&next.content)).then_some((2, Category::Requirement))
    }

    fn phrase_run(&self, blocks: &[Block], start: usize, word: &str) -> Option<(usize, Category)> {
        let candidates = self.candidates.get(word)?;

        candidates
            .iter()
            .map(|&position| &self.phrases[position])
            .find(|phrase| {
                let end = start + phrase.words.len();
                end <= blocks.len()
                    && blocks[start..end]
                        .iter()
                        .zip(&phrase.words)
                        .all(|(block, expected)| {
                            !block.is_line_break() && sanitize(&block.content) == expected.as_str()
                        })
            })
            .map(|phrase| (phrase.words.len(), phrase.category))
    }
}

/// Replace `blocks[start..start + len]` with one block carrying the last index.
fn collapse(blocks: &mut Vec<Block>, start: usize, len: usize, category: Category) -> Merge {
    let run = &blocks[start..start + len];
    let content = run
        .iter()
        .map(|block| block.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let index = run[len - 1].index;

    blocks.splice(start..start + len, [Block::new(index, content, category)]);

    Merge {
        start,
        len,
        index,
        category,
    }
}

/// Keep a flat caret index pointing at the same gap after a merge.
fn caret_after_merge(caret: usize, merge: &Merge) -> usize {
    let end = merge.start + merge.len;
    if caret >= end {
        caret - (merge.len - 1)
    } else if caret > merge.start {
        merge.start + 1
    } else {
        caret
    }
}
