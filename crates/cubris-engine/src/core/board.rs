use std::fmt;

use super::piece::{ActivePiece, PieceKind};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Settled (or falling) block of a specific kind.
    Piece(PieceKind),
}

impl Block {
    /// Integer code used by renderers: the color id, or `-1` for empty.
    pub const EMPTY_CODE: i32 = -1;

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Block::Empty => None,
            Block::Piece(kind) => Some(kind),
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        self.kind()
            .map_or(Self::EMPTY_CODE, |kind| i32::from(kind.color_id()))
    }
}

/// Grid of settled blocks.
///
/// # Layout
///
/// - Row `0` is the bottom row; rows grow upward
/// - Rows `0..height` are the visible playfield
/// - Rows `height..height + spawn_rows` are a hidden spawn buffer where new
///   pieces appear; they take part in collision and line clears like any
///   other row
/// - Cells are stored row-major in a single allocation
///
/// Every accessor taking `(row, col)` panics when the cell lies outside
/// `[0, total_height) × [0, width)`.
///
/// # Example
///
/// ```
/// use cubris_engine::{Block, Board, PieceKind};
///
/// let mut board = Board::new(10, 20, 4);
/// assert_eq!(board.total_height(), 24);
///
/// for col in 0..10 {
///     board.set(0, col, Block::Piece(PieceKind::I));
/// }
/// assert!(board.is_row_full(0));
/// assert_eq!(board.clear_full_rows(), 1);
/// assert!(!board.is_occupied(0, 0));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    spawn_rows: usize,
    cells: Vec<Block>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize, spawn_rows: usize) -> Self {
        assert!(width > 0 && height + spawn_rows > 0, "board must have cells");
        Self {
            width,
            height,
            spawn_rows,
            cells: vec![Block::Empty; width * (height + spawn_rows)],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of visible rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of hidden rows above the visible playfield.
    #[must_use]
    pub fn spawn_rows(&self) -> usize {
        self.spawn_rows
    }

    /// Visible rows plus the spawn buffer.
    #[must_use]
    pub fn total_height(&self) -> usize {
        self.height + self.spawn_rows
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.total_height() && col < self.width,
            "cell ({row}, {col}) is outside the {}x{} board",
            self.total_height(),
            self.width
        );
        row * self.width + col
    }

    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = self.index(row, 0);
        start..start + self.width
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Block {
        self.cells[self.index(row, col)]
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        !self.get(row, col).is_empty()
    }

    pub fn set(&mut self, row: usize, col: usize, block: Block) {
        let idx = self.index(row, col);
        self.cells[idx] = block;
    }

    pub fn clear(&mut self, row: usize, col: usize) {
        self.set(row, col, Block::Empty);
    }

    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[self.row_range(row)].iter().all(|b| !b.is_empty())
    }

    /// Empties every cell of `row` without moving other rows.
    pub fn clear_row(&mut self, row: usize) {
        let range = self.row_range(row);
        self.cells[range].fill(Block::Empty);
    }

    /// Moves every row above `row` down by one, overwriting `row` and leaving
    /// an empty top row. Rows below `row` are untouched.
    pub fn shift_rows_down(&mut self, row: usize) {
        let range = self.row_range(row);
        let top = self.row_range(self.total_height() - 1);
        self.cells.copy_within(range.end.., range.start);
        self.cells[top].fill(Block::Empty);
    }

    /// Removes `row`, shifting everything above it down by one.
    pub fn remove_row(&mut self, row: usize) {
        self.clear_row(row);
        self.shift_rows_down(row);
    }

    /// Indices of all full rows, highest first.
    #[must_use]
    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.total_height())
            .rev()
            .filter(|&row| self.is_row_full(row))
            .collect()
    }

    /// Removes all full rows and returns how many were removed.
    ///
    /// Full rows are collected before any is removed, then removed from the
    /// highest index down so that pending indices stay valid.
    pub fn clear_full_rows(&mut self) -> usize {
        let rows = self.full_rows();
        for &row in &rows {
            self.remove_row(row);
        }
        rows.len()
    }

    /// Sets every cell to empty.
    pub fn reset(&mut self) {
        self.cells.fill(Block::Empty);
    }

    fn contains(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.total_height() && col < self.width).then_some((row, col))
    }

    /// Returns true if every cell of `piece` is inside the board and empty.
    #[must_use]
    pub fn fits(&self, piece: &ActivePiece) -> bool {
        piece.cells().iter().all(|&(row, col)| {
            self.contains(row, col)
                .is_some_and(|(row, col)| !self.is_occupied(row, col))
        })
    }

    /// Writes the piece's cells into the board.
    ///
    /// The caller must have checked [`Self::fits`].
    pub fn fill_piece(&mut self, piece: &ActivePiece) {
        for (row, col) in piece.cells() {
            let (row, col) = self
                .contains(row, col)
                .expect("locked piece must lie inside the board");
            self.set(row, col, Block::Piece(piece.kind()));
        }
    }

    /// Rows from top to bottom, for rendering.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[Block]> {
        self.cells.chunks_exact(self.width).rev()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {}x{} (+{} hidden)", self.width, self.height, self.spawn_rows)?;
        for row in self.rows_top_down() {
            for block in row {
                let c = block.kind().map_or('.', PieceKind::as_char);
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::Anchor;

    const I: Block = Block::Piece(PieceKind::I);
    const T: Block = Block::Piece(PieceKind::T);

    fn fill_row(board: &mut Board, row: usize, block: Block) {
        for col in 0..board.width() {
            board.set(row, col, block);
        }
    }

    #[test]
    fn test_initial_board_is_empty() {
        let board = Board::new(10, 20, 4);
        assert_eq!(board.total_height(), 24);
        for row in 0..24 {
            for col in 0..10 {
                assert_eq!(board.get(row, col), Block::Empty, "({row}, {col})");
            }
        }
    }

    #[test]
    fn test_set_and_clear_cell() {
        let mut board = Board::new(10, 20, 4);
        board.set(23, 9, T);
        assert!(board.is_occupied(23, 9));
        assert_eq!(board.get(23, 9).code(), i32::from(PieceKind::T.color_id()));
        board.clear(23, 9);
        assert_eq!(board.get(23, 9).code(), Block::EMPTY_CODE);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_get_row_out_of_range_panics() {
        let board = Board::new(10, 20, 4);
        let _ = board.get(24, 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_get_col_out_of_range_panics() {
        let board = Board::new(10, 20, 4);
        let _ = board.get(0, 10);
    }

    #[test]
    fn test_is_row_full() {
        let mut board = Board::new(10, 20, 4);
        for col in 0..9 {
            board.set(3, col, I);
        }
        assert!(!board.is_row_full(3));
        board.set(3, 9, T);
        assert!(board.is_row_full(3));
    }

    #[test]
    fn test_remove_row_shifts_rows_above_only() {
        let mut board = Board::new(4, 6, 2);
        board.set(0, 0, T); // below, must stay
        fill_row(&mut board, 1, I); // removed
        board.set(2, 1, T);
        board.set(7, 3, T); // top row

        board.remove_row(1);

        assert_eq!(board.get(0, 0), T);
        assert_eq!(board.get(1, 1), T);
        assert!(!board.is_occupied(2, 1));
        assert_eq!(board.get(6, 3), T);
        for col in 0..4 {
            assert!(!board.is_occupied(7, col));
        }
    }

    #[test]
    fn test_clear_full_rows_non_adjacent() {
        let mut board = Board::new(4, 6, 2);
        fill_row(&mut board, 0, I);
        board.set(1, 2, T);
        fill_row(&mut board, 2, I);
        board.set(3, 0, T);

        assert_eq!(board.full_rows(), vec![2, 0]);
        assert_eq!(board.clear_full_rows(), 2);

        assert_eq!(board.get(0, 2), T);
        assert_eq!(board.get(1, 0), T);
        assert_eq!(board.cells.iter().filter(|b| !b.is_empty()).count(), 2);
    }

    #[test]
    fn test_clear_full_rows_includes_spawn_buffer() {
        let mut board = Board::new(4, 2, 2);
        fill_row(&mut board, 3, I);
        assert_eq!(board.clear_full_rows(), 1);
        assert!(board.cells.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn test_reset_empties_board() {
        let mut board = Board::new(10, 20, 4);
        fill_row(&mut board, 5, T);
        board.reset();
        assert_eq!(board, Board::new(10, 20, 4));
    }

    #[test]
    fn test_fits_checks_bounds_and_occupancy() {
        let mut board = Board::new(10, 20, 4);
        let piece = ActivePiece::new(PieceKind::O, Anchor::new(1, 0));
        assert!(board.fits(&piece));
        assert!(!board.fits(&piece.down()));
        assert!(!board.fits(&piece.left().left()));
        assert!(!board.fits(&ActivePiece::new(PieceKind::O, Anchor::new(24, 0))));

        board.set(0, 1, T);
        assert!(!board.fits(&piece));
    }

    #[test]
    fn test_fill_piece_writes_kind() {
        let mut board = Board::new(10, 20, 4);
        let piece = ActivePiece::new(PieceKind::S, Anchor::new(1, 0));
        board.fill_piece(&piece);
        for (row, col) in piece.cells() {
            let (row, col) = (usize::try_from(row).unwrap(), usize::try_from(col).unwrap());
            assert_eq!(board.get(row, col), Block::Piece(PieceKind::S));
        }
    }

    #[test]
    fn test_debug_renders_top_row_first() {
        let mut board = Board::new(4, 1, 1);
        board.set(0, 0, I);
        let rendered = format!("{board:?}");
        assert_eq!(rendered, "Board 4x1 (+1 hidden)\n....\nI...\n");
    }
}
