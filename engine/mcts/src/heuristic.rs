//! Positional heuristic for child selection.
//!
//! Scores the cell a move is played on by looking at every line window that
//! passes through that cell. The result is added to the UCT score so
//! tactically urgent moves (making or stopping a line) are tried first,
//! independent of their rollout statistics.

use games_gomoku::{Action, Board, EMPTY};

/// Completes a line or leaves one empty cell to complete it.
pub const WINNING_THREAT: f64 = 100.0;

/// Fills the last gap of an opponent line that is one stone short.
pub const BLOCK: f64 = 50.0;

/// Leaves two empty cells to complete a line.
pub const OPEN_THREE: f64 = 2.0;

/// Horizontal, vertical and both diagonals.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Stone counts inside one window, relative to the mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Segment {
    own: usize,
    opponent: usize,
    empty: usize,
}

/// Score placing `mark` on `cell` of `board` (the board before the move).
///
/// Along each axis every `run_length` window containing `cell` is
/// classified, with `cell` itself counted as the mover's stone:
///
/// | window                                    | score |
/// |-------------------------------------------|-------|
/// | mover holds all, or all but one empty     | 100   |
/// | opponent holds every other cell           | 50    |
/// | mover is two short with both cells empty  | 2     |
/// | anything else, or window leaves the board | 0     |
///
/// Each axis contributes its best window; the four axis scores are summed.
pub fn heuristic_score(board: &Board, cell: Action, mark: i8, run_length: usize) -> f64 {
    AXES.iter()
        .map(|&axis| axis_score(board, cell, axis, mark, run_length))
        .sum()
}

fn axis_score(
    board: &Board,
    cell: Action,
    axis: (isize, isize),
    mark: i8,
    run_length: usize,
) -> f64 {
    (0..run_length as isize)
        .filter_map(|back| window(board, cell, axis, back, mark, run_length))
        .map(|segment| classify(segment, run_length))
        .fold(0.0, f64::max)
}

/// Count the stones in the window that starts `back` steps behind `cell`.
/// `None` when the window does not fit on the board.
fn window(
    board: &Board,
    cell: Action,
    (d_row, d_col): (isize, isize),
    back: isize,
    mark: i8,
    run_length: usize,
) -> Option<Segment> {
    let mut counts = Segment::default();

    for step in -back..run_length as isize - back {
        if step == 0 {
            counts.own += 1;
            continue;
        }
        let row = cell.row as isize + d_row * step;
        let col = cell.col as isize + d_col * step;
        match board.get_signed(row, col)? {
            EMPTY => counts.empty += 1,
            m if m == mark => counts.own += 1,
            _ => counts.opponent += 1,
        }
    }

    Some(counts)
}

fn classify(segment: Segment, run_length: usize) -> f64 {
    if segment.opponent == 0 && segment.own + 1 >= run_length {
        WINNING_THREAT
    } else if run_length > 1 && segment.opponent == run_length - 1 {
        BLOCK
    } else if run_length >= 3 && segment.own + 2 == run_length && segment.empty == 2 {
        OPEN_THREE
    } else {
        0.0
    }
}
