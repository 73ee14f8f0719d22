use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::board::Board;

/// A falling tetromino: kind, orientation and anchor.
///
/// Pieces are immutable values. Movement and rotation return new `ActivePiece`
/// instances, and [`Board::fits`] decides whether the result is legal.
///
/// # Coordinate System
///
/// - The anchor is the top-left cell of the piece's 4×4 bounding box
/// - Board rows grow upward (row 0 is the bottom row), columns grow rightward
/// - A table offset `(dx, dy)` lands on `(anchor.row - dy, anchor.col + dx)`
///
/// # Example
///
/// ```
/// use cubris_engine::{ActivePiece, Anchor, PieceKind};
///
/// let piece = ActivePiece::new(PieceKind::T, Anchor::new(23, 3));
/// let moved = piece.left().rotated_cw();
/// assert_eq!(moved.anchor(), Anchor::new(23, 2));
/// assert_eq!(moved.orientation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    kind: PieceKind,
    orientation: Orientation,
    anchor: Anchor,
}

impl ActivePiece {
    /// Creates a piece in its spawn orientation.
    #[must_use]
    pub const fn new(kind: PieceKind, anchor: Anchor) -> Self {
        Self {
            kind,
            orientation: Orientation::SPAWN,
            anchor,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Absolute `(row, col)` of each of the four occupied cells.
    ///
    /// Cells may lie outside the board; use [`Board::fits`] to check.
    #[must_use]
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.kind
            .offsets(self.orientation)
            .map(|(dx, dy)| (self.anchor.row - i32::from(dy), self.anchor.col + i32::from(dx)))
    }

    /// Returns true if one of the piece's cells is at `(row, col)`.
    #[must_use]
    pub fn covers(&self, row: usize, col: usize) -> bool {
        let (Ok(row), Ok(col)) = (i32::try_from(row), i32::try_from(col)) else {
            return false;
        };
        self.cells().contains(&(row, col))
    }

    #[must_use]
    pub const fn left(&self) -> Self {
        self.shifted(0, -1)
    }

    #[must_use]
    pub const fn right(&self) -> Self {
        self.shifted(0, 1)
    }

    #[must_use]
    pub const fn up(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub const fn down(&self) -> Self {
        self.shifted(-1, 0)
    }

    const fn shifted(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            kind: self.kind,
            orientation: self.orientation,
            anchor: Anchor::new(self.anchor.row + d_row, self.anchor.col + d_col),
        }
    }

    #[must_use]
    pub const fn rotated_cw(&self) -> Self {
        Self {
            kind: self.kind,
            orientation: self.orientation.rotated_cw(),
            anchor: self.anchor,
        }
    }

    #[must_use]
    pub const fn rotated_ccw(&self) -> Self {
        Self {
            kind: self.kind,
            orientation: self.orientation.rotated_ccw(),
            anchor: self.anchor,
        }
    }

    /// Rotates the piece on `board`, returning `None` if every candidate
    /// placement allowed by `system` collides.
    #[must_use]
    pub fn rotated_on(
        &self,
        board: &Board,
        direction: RotationDirection,
        system: RotationSystem,
    ) -> Option<Self> {
        let rotated = match direction {
            RotationDirection::Clockwise => self.rotated_cw(),
            RotationDirection::CounterClockwise => self.rotated_ccw(),
        };
        system
            .candidates(rotated)
            .into_iter()
            .find(|piece| board.fits(piece))
    }

    /// The lowest position reachable by moving straight down from here.
    #[must_use]
    pub fn dropped_on(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while board.fits(&dropped.down()) {
            dropped = dropped.down();
        }
        dropped
    }
}

/// Board position of a piece's bounding-box corner.
///
/// Coordinates are signed because the bounding box of a piece standing
/// against a wall extends past the board edge even though its cells do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    row: i32,
    col: i32,
}

impl Anchor {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> i32 {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }
}

/// Orientation index of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation wraps modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    pub const SPAWN: Self = Self(0);
    pub const COUNT: usize = 4;

    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_ccw(self) -> Self {
        Self((self.0 + 3) % 4)
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("orientation must be 0-3, got {value}"))
    }
}

impl From<Orientation> for u8 {
    fn from(value: Orientation) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// How a rotation reacts when the rotated footprint collides.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationSystem {
    /// Rotate in place or not at all.
    #[default]
    Fixed,
    /// After an in-place collision, try the anchor shifted one cell up,
    /// right, down and left, in that order.
    ///
    /// This is not SRS: there are no per-piece or per-orientation kick tables.
    SimpleKick,
}

impl RotationSystem {
    fn candidates(self, rotated: ActivePiece) -> ArrayVec<ActivePiece, 5> {
        let mut candidates = ArrayVec::new();
        candidates.push(rotated);
        if self == RotationSystem::SimpleKick {
            candidates.extend([rotated.up(), rotated.right(), rotated.down(), rotated.left()]);
        }
        candidates
    }
}

/// The seven tetromino kinds.
///
/// The kind doubles as the abstract color id of a settled block; mapping it
/// to actual colors is left to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Color id in `0..7`.
    #[must_use]
    pub const fn color_id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_color_id(id: u8) -> Option<Self> {
        if (id as usize) < Self::LEN {
            Some(Self::ALL[id as usize])
        } else {
            None
        }
    }

    /// Cell offsets `(dx, dy)` of this kind in `orientation`, `dy` growing downward.
    #[must_use]
    pub const fn offsets(self, orientation: Orientation) -> [(i8, i8); 4] {
        SHAPES[self as usize][orientation.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use cubris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Occupied cells per kind and orientation, inside a 4×4 box.
///
/// Indexed by `PieceKind as usize`, then orientation. Each entry is `(dx, dy)`
/// with `dx` to the right and `dy` downward from the box's top-left corner.
const SHAPES: [[[(i8, i8); 4]; Orientation::COUNT]; PieceKind::LEN] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
];

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn all_orientations() -> impl Iterator<Item = Orientation> {
        (0..4).map(|i| Orientation::new(i).unwrap())
    }

    fn is_connected(cells: &[(i8, i8); 4]) -> bool {
        let mut seen = vec![cells[0]];
        let mut stack = vec![cells[0]];
        while let Some((x, y)) = stack.pop() {
            for next in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                if cells.contains(&next) && !seen.contains(&next) {
                    seen.push(next);
                    stack.push(next);
                }
            }
        }
        seen.len() == 4
    }

    #[test]
    fn test_every_orientation_has_four_distinct_connected_cells() {
        for kind in PieceKind::ALL {
            for orientation in all_orientations() {
                let cells = kind.offsets(orientation);
                let distinct: BTreeSet<_> = cells.iter().collect();
                assert_eq!(distinct.len(), 4, "{kind:?} {orientation:?}");
                assert!(is_connected(&cells), "{kind:?} {orientation:?} not connected");
                assert!(
                    cells.iter().all(|&(dx, dy)| (0..4).contains(&dx) && (0..4).contains(&dy)),
                    "{kind:?} {orientation:?} leaves its bounding box"
                );
            }
        }
    }

    #[test]
    fn test_clockwise_entries_are_quarter_turns() {
        // Quarter turn inside an n×n box: (x, y) -> (n - 1 - y, x)
        let box_size = |kind| match kind {
            PieceKind::I => 4,
            _ => 3,
        };
        for kind in PieceKind::ALL.into_iter().filter(|k| *k != PieceKind::O) {
            let n = box_size(kind);
            for orientation in all_orientations() {
                let turned: BTreeSet<_> = kind
                    .offsets(orientation)
                    .iter()
                    .map(|&(x, y)| (n - 1 - y, x))
                    .collect();
                let expected: BTreeSet<_> =
                    kind.offsets(orientation.rotated_cw()).into_iter().collect();
                assert_eq!(turned, expected, "{kind:?} {orientation:?}");
            }
        }
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let spawn = PieceKind::O.offsets(Orientation::SPAWN);
        for orientation in all_orientations() {
            assert_eq!(PieceKind::O.offsets(orientation), spawn);
        }
    }

    #[test]
    fn test_orientation_wraps() {
        let o = Orientation::SPAWN;
        assert_eq!(o.rotated_ccw().index(), 3);
        assert_eq!(o.rotated_cw().rotated_cw().rotated_cw().rotated_cw(), o);
        assert_eq!(o.rotated_cw().rotated_ccw(), o);
        assert!(Orientation::new(4).is_none());
    }

    #[test]
    fn test_cells_map_offsets_to_board_rows() {
        let piece = ActivePiece::new(PieceKind::I, Anchor::new(10, 3));
        // Spawn-orientation I sits one row below the anchor row
        assert_eq!(piece.cells(), [(9, 3), (9, 4), (9, 5), (9, 6)]);
        assert!(piece.covers(9, 6));
        assert!(!piece.covers(10, 3));
    }

    #[test]
    fn test_moves_shift_anchor() {
        let piece = ActivePiece::new(PieceKind::T, Anchor::new(5, 5));
        assert_eq!(piece.left().anchor(), Anchor::new(5, 4));
        assert_eq!(piece.right().anchor(), Anchor::new(5, 6));
        assert_eq!(piece.down().anchor(), Anchor::new(4, 5));
        assert_eq!(piece.up().anchor(), Anchor::new(6, 5));
        assert_eq!(piece.left().right(), piece);
    }

    #[test]
    fn test_fixed_rotation_rejects_collision() {
        // Vertical I against the left wall cannot turn horizontal in place
        let board = Board::new(10, 20, 4);
        let vertical = ActivePiece::new(PieceKind::I, Anchor::new(10, -1)).rotated_cw();
        assert_eq!(vertical.cells()[0], (10, 1));
        let west = ActivePiece::new(PieceKind::I, Anchor::new(10, -1)).rotated_ccw();
        assert!(board.fits(&west));
        assert!(
            west.rotated_on(&board, RotationDirection::Clockwise, RotationSystem::Fixed)
                .is_none()
        );
    }

    #[test]
    fn test_simple_kick_shifts_rotated_piece() {
        let board = Board::new(10, 20, 4);
        let west = ActivePiece::new(PieceKind::I, Anchor::new(10, -1)).rotated_ccw();
        let kicked = west
            .rotated_on(&board, RotationDirection::Clockwise, RotationSystem::SimpleKick)
            .unwrap();
        assert_eq!(kicked.orientation(), Orientation::SPAWN);
        assert_eq!(kicked.anchor(), Anchor::new(10, 0));
        assert!(board.fits(&kicked));
    }

    #[test]
    fn test_dropped_on_reaches_floor() {
        let board = Board::new(10, 20, 4);
        let piece = ActivePiece::new(PieceKind::O, Anchor::new(23, 3));
        let dropped = piece.dropped_on(&board);
        assert_eq!(dropped.anchor(), Anchor::new(1, 3));
        assert!(!board.fits(&dropped.down()));
    }

    #[test]
    fn test_piece_kind_char_and_color_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(PieceKind::from_color_id(kind.color_id()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_color_id(7), None);
    }

    #[test]
    fn test_orientation_serialization_rejects_out_of_range() {
        assert_eq!(serde_json::to_string(&Orientation(2)).unwrap(), "2");
        assert!(serde_json::from_str::<Orientation>("4").is_err());
    }
}
