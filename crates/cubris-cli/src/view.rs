//! Plain-text dump of the composite grid.

use std::fmt::Write as _;

use cubris_engine::{Game, PieceKind};

/// Renders the board top row first, one character per cell: the piece letter
/// or `.` for an empty cell. Hidden spawn rows are included when
/// `show_hidden` is set and separated from the playfield by a rule.
#[must_use]
pub fn render(game: &Game, show_hidden: bool) -> String {
    let board = game.board();
    let top = if show_hidden {
        board.total_height()
    } else {
        board.height()
    };
    let mut out = String::new();
    for row in (0..top).rev() {
        if show_hidden && row + 1 == board.height() {
            out.push_str(&"-".repeat(board.width()));
            out.push('\n');
        }
        for col in 0..board.width() {
            let c = game.get(row, col).kind().map_or('.', PieceKind::as_char);
            out.push(c);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "score {}  lines {}  level {}  next {}",
        game.score(),
        game.lines_cleared(),
        game.level(),
        game.next_piece().as_char()
    );
    out
}
