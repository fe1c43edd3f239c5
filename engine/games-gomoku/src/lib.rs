//! Gomoku (five in a row) game state for the MCTS engine
//!
//! Two players take turns placing stones on a square grid. The first player
//! to line up `win_length` stones horizontally, vertically or diagonally wins;
//! a full board without such a line is a draw.
//!
//! # Board Layout
//!
//! Cells are stored in row-major order. Each cell holds a mark:
//! `0` = empty, `+1` = Black, `-1` = White.
//! ```text
//!          col 0  1  2  ...  8
//! Row 0:     [ 0][ 1][ 2] .. [ 8]
//! Row 1:     [ 9][10][11] .. [17]
//!   ...
//! Row 8:     [72][73][74] .. [80]
//! ```
//!
//! # Perspective
//!
//! A [`GameState`] carries a fixed acting [`Colour`] and a turn flag. When the
//! flag is set the next stone is the acting colour's, otherwise it is the
//! opponent's. Applying a move flips the flag but keeps the colour, so a whole
//! playout is scored from the perspective of the colour that started it.
//!
//! # Usage
//!
//! ```rust
//! use games_gomoku::{Action, Colour, GameState, Rules};
//!
//! let state = GameState::new(Rules::default(), Colour::Black);
//! assert_eq!(state.legal_actions().len(), 81);
//!
//! let next = state.apply(Action::new(4, 4)).unwrap();
//! assert_eq!(next.board().get(4, 4), Some(1));
//! assert!(!next.is_terminal());
//! ```

use std::fmt;

use once_cell::unsync::OnceCell;
use thiserror::Error;

/// Default board edge length
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Default number of stones in a row needed to win
pub const DEFAULT_WIN_LENGTH: usize = 5;

/// Mark stored in an empty cell
pub const EMPTY: i8 = 0;

/// Errors raised by board construction and move application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid action {action}: {reason}")]
    InvalidAction {
        action: Action,
        reason: &'static str,
    },

    #[error("Invalid rules: win length {win_length} on a {board_size}x{board_size} board")]
    InvalidRules {
        board_size: usize,
        win_length: usize,
    },

    #[error("Board size mismatch: rules expect {expected}, board is {actual}")]
    BoardSizeMismatch { expected: usize, actual: usize },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Board geometry and win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    board_size: usize,
    win_length: usize,
}

impl Rules {
    /// Create a rule set, rejecting win lengths that cannot fit on the board.
    pub fn new(board_size: usize, win_length: usize) -> Result<Self, GameError> {
        if win_length == 0 || win_length > board_size {
            return Err(GameError::InvalidRules {
                board_size,
                win_length,
            });
        }
        Ok(Self {
            board_size,
            win_length,
        })
    }

    #[inline]
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    #[inline]
    pub fn win_length(&self) -> usize {
        self.win_length
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            win_length: DEFAULT_WIN_LENGTH,
        }
    }
}

/// Player colour. Black is `+1`, White is `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Black,
    White,
}

impl Colour {
    /// The mark this colour leaves on the board.
    #[inline]
    pub fn mark(self) -> i8 {
        match self {
            Colour::Black => 1,
            Colour::White => -1,
        }
    }

    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Colour::Black => Colour::White,
            Colour::White => Colour::Black,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::Black => write!(f, "Black"),
            Colour::White => write!(f, "White"),
        }
    }
}

/// Place a stone at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub row: usize,
    pub col: usize,
}

impl Action {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Final verdict of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won(Colour),
    Draw,
}

impl Outcome {
    /// Winner as a mark: `+1`, `-1`, or `0` for a draw.
    pub fn mark(self) -> i8 {
        match self {
            Outcome::Won(colour) => colour.mark(),
            Outcome::Draw => 0,
        }
    }
}

/// Outcome of a finished game seen from one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win,
    Draw,
    Loss,
}

impl GameResult {
    /// `+1` for a win, `0` for a draw, `-1` for a loss.
    #[inline]
    pub fn value(self) -> i8 {
        match self {
            GameResult::Win => 1,
            GameResult::Draw => 0,
            GameResult::Loss => -1,
        }
    }

    /// The same result seen by the other player.
    pub fn flipped(self) -> Self {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Draw => GameResult::Draw,
            GameResult::Loss => GameResult::Win,
        }
    }
}

/// Square grid of marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<i8>,
}

impl Board {
    /// Create an empty board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![EMPTY; size * size],
        }
    }

    /// Parse a board from text rows: `X` = Black, `O` = White, `.` = empty.
    /// Whitespace inside a row is ignored.
    pub fn parse(rows: &[&str]) -> Result<Self, GameError> {
        let size = rows.len();
        let mut board = Board::new(size);

        for (row, line) in rows.iter().enumerate() {
            let marks: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if marks.len() != size {
                return Err(GameError::Parse(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    marks.len(),
                    size
                )));
            }

            for (col, ch) in marks.into_iter().enumerate() {
                let mark = match ch {
                    'X' | 'x' => 1,
                    'O' | 'o' => -1,
                    '.' => EMPTY,
                    other => {
                        return Err(GameError::Parse(format!(
                            "unexpected character '{}' at ({}, {})",
                            other, row, col
                        )))
                    }
                };
                board.set(row, col, mark);
            }
        }

        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn pos(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Mark at `(row, col)`, or `None` when off the board.
    pub fn get(&self, row: usize, col: usize) -> Option<i8> {
        if row < self.size && col < self.size {
            Some(self.cells[self.pos(row, col)])
        } else {
            None
        }
    }

    /// Mark at a signed coordinate, `None` when off the board.
    pub fn get_signed(&self, row: isize, col: isize) -> Option<i8> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }

    /// Mark at an in-bounds cell. Callers guarantee the bounds.
    #[inline]
    fn cell(&self, row: usize, col: usize) -> i8 {
        self.cells[self.pos(row, col)]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, mark: i8) {
        let pos = self.pos(row, col);
        self.cells[pos] = mark;
    }

    /// Whether `(row, col)` is on the board and empty.
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(EMPTY)
    }

    pub fn has_empty_cell(&self) -> bool {
        self.cells.contains(&EMPTY)
    }

    /// Number of stones on the board.
    pub fn count_marks(&self) -> usize {
        self.cells.iter().filter(|&&m| m != EMPTY).count()
    }

    /// Raw cells in row-major order.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            let line: String = (0..self.size)
                .map(|col| match self.cell(row, col) {
                    1 => 'X',
                    -1 => 'O',
                    _ => '.',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// One immutable position plus whose perspective it is evaluated from.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    /// Perspective colour, fixed for every successor of this state
    colour: Colour,
    /// Set when the next stone belongs to `colour`
    turn: bool,
    rules: Rules,
    /// Lazily computed verdict: `Some(None)` once scanned and still open
    winner: OnceCell<Option<Outcome>>,
}

impl GameState {
    /// Empty board with `colour` to move.
    pub fn new(rules: Rules, colour: Colour) -> Self {
        Self {
            board: Board::new(rules.board_size()),
            colour,
            turn: true,
            rules,
            winner: OnceCell::new(),
        }
    }

    /// Wrap an existing board.
    pub fn from_board(
        board: Board,
        rules: Rules,
        colour: Colour,
        turn: bool,
    ) -> Result<Self, GameError> {
        if board.size() != rules.board_size() {
            return Err(GameError::BoardSizeMismatch {
                expected: rules.board_size(),
                actual: board.size(),
            });
        }
        Ok(Self {
            board,
            colour,
            turn,
            rules,
            winner: OnceCell::new(),
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn colour(&self) -> Colour {
        self.colour
    }

    #[inline]
    pub fn turn(&self) -> bool {
        self.turn
    }

    #[inline]
    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Mark that the next `apply` will place.
    #[inline]
    pub fn next_mark(&self) -> i8 {
        if self.turn {
            self.colour.mark()
        } else {
            -self.colour.mark()
        }
    }

    pub fn moves_played(&self) -> usize {
        self.board.count_marks()
    }

    /// Every empty cell, in row-major order.
    pub fn legal_actions(&self) -> Vec<Action> {
        let size = self.board.size();
        let mut actions = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                if self.board.cell(row, col) == EMPTY {
                    actions.push(Action::new(row, col));
                }
            }
        }
        actions
    }

    /// Whether the game is over. Caches the verdict on first call.
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    /// The cached verdict, computing it if this state was never checked.
    pub fn winner(&self) -> Option<Outcome> {
        *self.winner.get_or_init(|| self.scan())
    }

    /// Result of the finished game from `colour`'s side.
    /// `None` while the game is still open.
    pub fn outcome_for(&self, colour: Colour) -> Option<GameResult> {
        self.winner().map(|outcome| match outcome {
            Outcome::Draw => GameResult::Draw,
            Outcome::Won(winner) if winner == colour => GameResult::Win,
            Outcome::Won(_) => GameResult::Loss,
        })
    }

    /// Place the next stone at `action` and return the successor.
    pub fn apply(&self, action: Action) -> Result<GameState, GameError> {
        match self.board.get(action.row, action.col) {
            None => Err(GameError::InvalidAction {
                action,
                reason: "cell is off the board",
            }),
            Some(EMPTY) => {
                let mut board = self.board.clone();
                board.set(action.row, action.col, self.next_mark());
                Ok(GameState {
                    board,
                    colour: self.colour,
                    turn: !self.turn,
                    rules: self.rules,
                    winner: OnceCell::new(),
                })
            }
            Some(_) => Err(GameError::InvalidAction {
                action,
                reason: "cell is already occupied",
            }),
        }
    }

    /// Scan every `win_length` square window for a complete line, then check
    /// for a full board.
    fn scan(&self) -> Option<Outcome> {
        let n = self.rules.win_length();
        let last_origin = self.board.size() - n;

        for row in 0..=last_origin {
            for col in 0..=last_origin {
                if let Some(colour) = self.window_winner(row, col) {
                    return Some(Outcome::Won(colour));
                }
            }
        }

        if self.board.has_empty_cell() {
            None
        } else {
            Some(Outcome::Draw)
        }
    }

    /// Winner inside the window whose top-left corner is `(row0, col0)`.
    /// Black lines are checked before White ones.
    fn window_winner(&self, row0: usize, col0: usize) -> Option<Colour> {
        let n = self.rules.win_length();
        let board = &self.board;

        let row_sum = |i: usize| -> i32 {
            (0..n)
                .map(|j| board.cell(row0 + i, col0 + j) as i32)
                .sum()
        };
        let col_sum = |j: usize| -> i32 {
            (0..n)
                .map(|i| board.cell(row0 + i, col0 + j) as i32)
                .sum()
        };
        let diagonal: i32 = (0..n).map(|i| board.cell(row0 + i, col0 + i) as i32).sum();
        let anti_diagonal: i32 = (0..n)
            .map(|i| board.cell(row0 + n - 1 - i, col0 + i) as i32)
            .sum();

        for colour in [Colour::Black, Colour::White] {
            let target = n as i32 * colour.mark() as i32;
            let line_hit = (0..n).any(|i| row_sum(i) == target || col_sum(i) == target);
            if line_hit || diagonal == target || anti_diagonal == target {
                return Some(colour);
            }
        }

        None
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.colour == other.colour
            && self.turn == other.turn
            && self.rules == other.rules
    }
}

impl Eq for GameState {}

#[cfg(test)]
mod tests;
