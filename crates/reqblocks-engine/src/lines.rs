use crate::block::Block;

/// Derive the logical lines of a block sequence.
///
/// Each line is the slice of blocks between two line-break sentinels (the
/// sentinels themselves excluded). There is always at least one line, and
/// `lines.len() == breaks + 1`. Lines are borrowed from the block array and
/// must be re-derived after every mutation.
pub fn split_lines(blocks: &[Block]) -> Vec<&[Block]> {
    let mut lines = Vec::with_capacity(1);
    let mut start = 0;

    for (position, block) in blocks.iter().enumerate() {
        if block.is_line_break() {
            lines.push(&blocks[start..position]);
            start = position + 1;
        }
    }
    lines.push(&blocks[start..]);

    lines
}

/// Line index and position-on-line of the block at flat position `position`.
///
/// Returns `None` for line-break blocks and out-of-range positions.
pub fn locate(blocks: &[Block], position: usize) -> Option<(usize, usize)> {
    let block = blocks.get(position)?;
    if block.is_line_break() {
        return None;
    }

    let before = &blocks[..position];
    let line = before.iter().filter(|b| b.is_line_break()).count();
    let line_start = before
        .iter()
        .rposition(Block::is_line_break)
        .map_or(0, |p| p + 1);
    Some((line, position - line_start))
}
