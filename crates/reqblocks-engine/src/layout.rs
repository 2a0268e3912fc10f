//! Geometry-aware caret placement.
//!
//! Rendered geometry comes from a [`LayoutOracle`] supplied by the front
//! end. Everything here is pure over that oracle: a line that has not been
//! laid out yet yields `None` and the caller keeps the caret where it is.

use crate::block::Block;
use crate::caret::Caret;

/// Axis-aligned box in whatever unit the front end measures (pixels, cells).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Read access to the geometry of the last settled layout.
pub trait LayoutOracle {
    /// Rendered height of logical line `line`.
    fn line_height(&self, line: usize) -> Option<f32>;

    /// Boxes of the blocks of logical line `line`, in line order.
    fn block_rects(&self, line: usize) -> Option<Vec<Rect>>;

    /// Height of a single visual row.
    ///
    /// Defaults to the shortest block on line 0, or the height of line 0
    /// when it has no blocks. Never the height of a whole wrapped line.
    fn row_height(&self) -> Option<f32> {
        self.block_rects(0)
            .and_then(|rects| rects.iter().map(|rect| rect.height).reduce(f32::min))
            .or_else(|| self.line_height(0))
    }

    /// Box of the caret (the pending input) in the same layout, when the
    /// front end draws one.
    fn caret_rect(&self) -> Option<Rect> {
        None
    }
}

/// One visual fragment of a soft-wrapped logical line.
#[derive(Debug, Clone, PartialEq)]
pub struct SubRow {
    /// Position on the line of the row's first block
    pub start: usize,
    pub top: f32,
    pub lefts: Vec<f32>,
    pub bottom: f32,
}

impl SubRow {
    pub fn len(&self) -> usize {
        self.lefts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lefts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Up,
    Down,
}

/// Index of the value nearest to `x`.
///
/// Ties go to the first minimal difference. An `x` beyond the last value
/// snaps to one past the end.
pub fn find_closest_index(values: &[f32], x: f32) -> usize {
    let Some(&last) = values.last() else {
        return 0;
    };
    if x > last {
        return values.len();
    }

    let mut closest = 0;
    let mut best = f32::INFINITY;
    for (index, value) in values.iter().enumerate() {
        let difference = (value - x).abs();
        if difference < best {
            best = difference;
            closest = index;
        }
    }
    closest
}

/// Split a line's blocks into visual rows; a new row starts whenever a
/// block sits lower than its predecessor.
pub fn partition_rows(rects: &[Rect]) -> Vec<SubRow> {
    let mut rows: Vec<SubRow> = Vec::new();
    let mut previous_top = f32::NEG_INFINITY;

    for (position, rect) in rects.iter().enumerate() {
        if rect.top > previous_top {
            rows.push(SubRow {
                start: position,
                top: rect.top,
                lefts: vec![rect.left],
                bottom: rect.bottom(),
            });
        } else if let Some(row) = rows.last_mut() {
            row.lefts.push(rect.left);
            row.bottom = row.bottom.max(rect.bottom());
        }
        previous_top = rect.top;
    }

    rows
}

/// Visual rows of `line`; an unwrapped line is a single row.
fn rows_of(oracle: &dyn LayoutOracle, line: usize, base_row_height: f32) -> Option<Vec<SubRow>> {
    let rects = oracle.block_rects(line)?;
    if is_wrapped(oracle, line, base_row_height)? {
        return Some(partition_rows(&rects));
    }

    let top = rects.iter().map(|rect| rect.top).fold(f32::INFINITY, f32::min);
    let bottom = rects.iter().map(Rect::bottom).fold(0.0, f32::max);
    Some(vec![SubRow {
        start: 0,
        top,
        lefts: rects.iter().map(|rect| rect.left).collect(),
        bottom,
    }])
}

pub fn is_wrapped(oracle: &dyn LayoutOracle, line: usize, base_row_height: f32) -> Option<bool> {
    oracle
        .line_height(line)
        .map(|height| height > base_row_height)
}

/// Row holding the caret and the caret's horizontal offset on it.
///
/// The caret's own box wins when the oracle has one: the input may sit at
/// the end of a row while the block after it wraps. A caret below every
/// row of blocks reports `rows.len()`.
fn caret_position(
    rects: &[Rect],
    rows: &[SubRow],
    index_on_line: usize,
    caret_rect: Option<Rect>,
) -> (usize, f32) {
    if let Some(caret) = caret_rect {
        let row = if rows.last().is_some_and(|last| caret.top >= last.bottom) {
            rows.len()
        } else {
            rows.iter()
                .rposition(|row| row.top <= caret.top)
                .unwrap_or(0)
        };
        return (row, caret.left);
    }

    let row = rows
        .iter()
        .rposition(|row| row.start <= index_on_line)
        .unwrap_or(0);
    let x = match rects.get(index_on_line) {
        Some(rect) => rect.left,
        None => rects.last().map_or(0.0, Rect::right),
    };
    (row, x)
}

/// Move the caret one visual row up or down.
///
/// Crossing into another logical line only happens while `pending_empty`;
/// moving between rows of the same wrapped line always does. Returns
/// `None` when a line involved has no geometry yet.
pub fn move_vertical(
    lines: &[&[Block]],
    caret: Caret,
    direction: Vertical,
    pending_empty: bool,
    base_row_height: f32,
    oracle: &dyn LayoutOracle,
) -> Option<Caret> {
    let rects = if lines[caret.line].is_empty() {
        Vec::new()
    } else {
        oracle.block_rects(caret.line)?
    };
    let rows = if rects.is_empty() {
        Vec::new()
    } else {
        rows_of(oracle, caret.line, base_row_height)?
    };
    let (row, x) = caret_position(&rects, &rows, caret.index_on_line, oracle.caret_rect());

    let target_line = match direction {
        Vertical::Up => {
            if row > 0 {
                let target = &rows[row - 1];
                return Some(Caret::new(
                    caret.line,
                    target.start + find_closest_index(&target.lefts, x),
                ));
            }
            if caret.line == 0 || !pending_empty {
                return Some(caret);
            }
            caret.line - 1
        }
        Vertical::Down => {
            if row + 1 < rows.len() {
                let target = &rows[row + 1];
                return Some(Caret::new(
                    caret.line,
                    target.start + find_closest_index(&target.lefts, x),
                ));
            }
            if caret.line + 1 >= lines.len() || !pending_empty {
                return Some(caret);
            }
            caret.line + 1
        }
    };

    if lines[target_line].is_empty() {
        return Some(Caret::new(target_line, 0));
    }

    let target_rows = rows_of(oracle, target_line, base_row_height)?;
    let target = match direction {
        Vertical::Up => target_rows.last(),
        Vertical::Down => target_rows.first(),
    }?;
    Some(Caret::new(
        target_line,
        target.start + find_closest_index(&target.lefts, x),
    ))
}

/// Insertion slot on `line` nearest to the point `(x, y)`.
///
/// On a wrapped line the click picks the first row whose bottom lies
/// below `y`; every block on skipped rows counts towards the result. A
/// click below all rows lands at the end of the line.
pub fn resolve_click(
    lines: &[&[Block]],
    line: usize,
    x: f32,
    y: f32,
    base_row_height: f32,
    oracle: &dyn LayoutOracle,
) -> Option<usize> {
    if lines[line].is_empty() {
        return Some(0);
    }

    let rows = rows_of(oracle, line, base_row_height)?;
    if rows.len() == 1 {
        return Some(find_closest_index(&rows[0].lefts, x));
    }

    Some(match rows.iter().find(|row| y < row.bottom) {
        Some(row) => row.start + find_closest_index(&row.lefts, x),
        None => lines[line].len(),
    })
}

/// Terminal-style layout: every block is a `[content]` cell on a fixed
/// row grid, wrapped at `width` columns.
///
/// The pending input occupies a cell of its own at the caret so the
/// blocks after it move exactly as they do on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonospaceLayout {
    lines: Vec<LineLayout>,
    input: Option<Rect>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct LineLayout {
    rects: Vec<Rect>,
    top: f32,
    height: f32,
}

/// Placement state while flowing cells onto the grid.
struct Pen {
    width: usize,
    column: usize,
    row: usize,
}

impl Pen {
    fn place(&mut self, cells: usize) -> Rect {
        if self.column > 0 && self.column + cells > self.width {
            self.column = 0;
            self.row += 1;
        }
        let rect = Rect::new(self.column as f32, self.row as f32, cells as f32, 1.0);
        self.column += cells + 1;
        rect
    }

    fn new_line(&mut self) {
        self.column = 0;
        self.row += 1;
    }
}

/// Columns taken by a block cell, brackets included.
pub fn cell_width(content: &str) -> usize {
    content.chars().count() + 2
}

impl MonospaceLayout {
    pub fn compute(lines: &[&[Block]], width: usize, caret: Caret, pending: &str) -> Self {
        let mut layout = Self::default();
        let mut pen = Pen {
            width: width.max(1),
            column: 0,
            row: 0,
        };
        let input_cells = pending.chars().count() + 1;

        for (line_index, blocks) in lines.iter().enumerate() {
            let line_top = pen.row;
            let mut rects = Vec::with_capacity(blocks.len());

            for (position, block) in blocks.iter().enumerate() {
                if line_index == caret.line && position == caret.index_on_line {
                    layout.input = Some(pen.place(input_cells));
                }
                rects.push(pen.place(cell_width(&block.content)));
            }
            if line_index == caret.line && caret.index_on_line >= blocks.len() {
                layout.input = Some(pen.place(input_cells));
            }

            pen.new_line();
            layout.lines.push(LineLayout {
                rects,
                top: line_top as f32,
                height: (pen.row - line_top) as f32,
            });
        }

        layout
    }

    /// Where the pending input is drawn.
    pub fn input_rect(&self) -> Option<Rect> {
        self.input
    }

    /// Total rows used by the document.
    pub fn height(&self) -> f32 {
        self.lines
            .last()
            .map_or(0.0, |layout| layout.top + layout.height)
    }

    /// Logical line covering row `y`.
    pub fn line_at(&self, y: f32) -> Option<usize> {
        self.lines
            .iter()
            .position(|layout| y >= layout.top && y < layout.top + layout.height)
    }

    /// Position on `line` of the block drawn at `(x, y)`.
    pub fn block_at(&self, line: usize, x: f32, y: f32) -> Option<usize> {
        self.lines.get(line)?.rects.iter().position(|rect| {
            x >= rect.left && x < rect.right() && y >= rect.top && y < rect.bottom()
        })
    }
}

impl LayoutOracle for MonospaceLayout {
    fn line_height(&self, line: usize) -> Option<f32> {
        self.lines.get(line).map(|layout| layout.height)
    }

    fn block_rects(&self, line: usize) -> Option<Vec<Rect>> {
        self.lines.get(line).map(|layout| layout.rects.clone())
    }

    fn row_height(&self) -> Option<f32> {
        (!self.lines.is_empty()).then_some(1.0)
    }

    fn caret_rect(&self) -> Option<Rect> {
        self.input
    }
}
