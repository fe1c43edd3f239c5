use super::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn state_from(rows: &[&str], colour: Colour) -> GameState {
    let board = Board::parse(rows).unwrap();
    let rules = Rules::new(board.size(), DEFAULT_WIN_LENGTH).unwrap();
    GameState::from_board(board, rules, colour, true).unwrap()
}

/// Full 9x9 board with no line longer than two: columns alternate and rows
/// repeat in pairs.
fn drawn_board() -> Board {
    let mut board = Board::new(DEFAULT_BOARD_SIZE);
    for row in 0..DEFAULT_BOARD_SIZE {
        for col in 0..DEFAULT_BOARD_SIZE {
            let mark = if (col + row / 2) % 2 == 0 { 1 } else { -1 };
            board.set(row, col, mark);
        }
    }
    board
}

#[test]
fn test_initial_state() {
    let state = GameState::new(Rules::default(), Colour::Black);
    assert_eq!(state.board().size(), 9);
    assert_eq!(state.board().cells(), &[0; 81][..]);
    assert_eq!(state.colour(), Colour::Black);
    assert!(state.turn());
    assert_eq!(state.moves_played(), 0);
    assert!(!state.is_terminal());
    assert_eq!(state.winner(), None);
    assert_eq!(state.outcome_for(Colour::Black), None);
}

#[test]
fn test_legal_actions_empty_board() {
    let state = GameState::new(Rules::default(), Colour::Black);
    let legal = state.legal_actions();

    assert_eq!(legal.len(), 81);
    assert_eq!(legal[0], Action::new(0, 0));
    assert_eq!(legal[1], Action::new(0, 1));
    assert_eq!(legal[9], Action::new(1, 0));
    assert_eq!(legal[80], Action::new(8, 8));
}

#[test]
fn test_legal_actions_are_exactly_the_empty_cells() {
    let state = state_from(
        &[
            "X........",
            ".O.......",
            "..X......",
            ".........",
            "....O....",
            ".........",
            ".........",
            ".........",
            "........X",
        ],
        Colour::White,
    );

    let legal = state.legal_actions();
    assert_eq!(legal.len(), 81 - 5);
    assert!(!legal.contains(&Action::new(0, 0)));
    assert!(!legal.contains(&Action::new(1, 1)));
    assert!(!legal.contains(&Action::new(8, 8)));
    assert!(legal.contains(&Action::new(0, 1)));

    for action in &legal {
        assert!(state.board().is_empty_at(action.row, action.col));
        assert!(state.apply(*action).is_ok());
    }

    let mut deduped = legal.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), legal.len());
}

#[test]
fn test_apply_alternates_marks() {
    let state = GameState::new(Rules::default(), Colour::Black);

    let s1 = state.apply(Action::new(4, 4)).unwrap();
    assert_eq!(s1.board().get(4, 4), Some(1));
    assert!(!s1.turn());
    assert_eq!(s1.colour(), Colour::Black);

    let s2 = s1.apply(Action::new(4, 5)).unwrap();
    assert_eq!(s2.board().get(4, 5), Some(-1));
    assert!(s2.turn());
    assert_eq!(s2.moves_played(), 2);

    // Parent untouched
    assert_eq!(state.board().get(4, 4), Some(0));
    assert_eq!(s1.board().get(4, 5), Some(0));
}

#[test]
fn test_apply_white_perspective() {
    let state = GameState::new(Rules::default(), Colour::White);
    assert_eq!(state.next_mark(), -1);

    let next = state.apply(Action::new(0, 0)).unwrap();
    assert_eq!(next.board().get(0, 0), Some(-1));
    assert_eq!(next.next_mark(), 1);
}

#[test]
fn test_apply_occupied_cell_rejected() {
    let state = GameState::new(Rules::default(), Colour::Black)
        .apply(Action::new(2, 3))
        .unwrap();

    let err = state.apply(Action::new(2, 3)).unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidAction {
            action: Action::new(2, 3),
            reason: "cell is already occupied",
        }
    );
    assert!(err.to_string().contains("(2, 3)"));
}

#[test]
fn test_apply_out_of_bounds_rejected() {
    let state = GameState::new(Rules::default(), Colour::Black);

    assert!(matches!(
        state.apply(Action::new(9, 0)),
        Err(GameError::InvalidAction { .. })
    ));
    assert!(matches!(
        state.apply(Action::new(0, 42)),
        Err(GameError::InvalidAction { .. })
    ));
}

#[test]
fn test_horizontal_win() {
    let state = state_from(
        &[
            ".........",
            ".........",
            "..XXXXX..",
            ".........",
            "..OOOO...",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Colour::Black,
    );

    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Outcome::Won(Colour::Black)));
}

#[test]
fn test_vertical_win_for_white() {
    let state = state_from(
        &[
            ".........",
            "......O..",
            "......O..",
            "..X...O..",
            "..X...O..",
            "..X...O..",
            "..X......",
            ".........",
            ".........",
        ],
        Colour::Black,
    );

    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Outcome::Won(Colour::White)));
    assert_eq!(state.outcome_for(Colour::White), Some(GameResult::Win));
    assert_eq!(state.outcome_for(Colour::Black), Some(GameResult::Loss));
}

#[test]
fn test_diagonal_win() {
    let state = state_from(
        &[
            ".........",
            ".X.......",
            "..X......",
            "...X.....",
            "....X....",
            ".....X...",
            ".........",
            ".........",
            ".........",
        ],
        Colour::White,
    );

    assert_eq!(state.winner(), Some(Outcome::Won(Colour::Black)));
    assert_eq!(state.outcome_for(state.colour()), Some(GameResult::Loss));
}

#[test]
fn test_anti_diagonal_win() {
    let state = state_from(
        &[
            ".........",
            ".........",
            ".........",
            ".........",
            "........O",
            ".......O.",
            "......O..",
            ".....O...",
            "....O....",
        ],
        Colour::White,
    );

    assert_eq!(state.winner(), Some(Outcome::Won(Colour::White)));
}

#[test]
fn test_win_in_last_rows_is_found() {
    // The line only fits in windows whose origin is on the last window row
    let state = state_from(
        &[
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            "....XXXXX",
        ],
        Colour::Black,
    );

    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Outcome::Won(Colour::Black)));
}

#[test]
fn test_four_in_a_row_is_not_terminal() {
    let state = state_from(
        &[
            ".........",
            ".........",
            ".........",
            ".XXXX.X..",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Colour::Black,
    );

    assert!(!state.is_terminal());
    assert_eq!(state.outcome_for(Colour::Black), None);
}

#[test]
fn test_full_board_without_line_is_draw() {
    let board = drawn_board();
    assert!(!board.has_empty_cell());

    let state = GameState::from_board(board, Rules::default(), Colour::Black, true).unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.winner(), Some(Outcome::Draw));
    assert_eq!(state.outcome_for(Colour::Black), Some(GameResult::Draw));
    assert_eq!(state.outcome_for(Colour::White), Some(GameResult::Draw));
    assert!(state.legal_actions().is_empty());
}

#[test]
fn test_terminal_check_is_idempotent() {
    let state = state_from(
        &[
            "XXXXX....",
            "OOOO.....",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Colour::White,
    );

    let first = state.winner();
    assert!(state.is_terminal());
    assert!(state.is_terminal());
    assert_eq!(state.winner(), first);
    assert_eq!(first, Some(Outcome::Won(Colour::Black)));
}

#[test]
fn test_outcome_antisymmetry() {
    let won = state_from(
        &[
            "X........",
            "X........",
            "X........",
            "X........",
            "X........",
            ".........",
            ".........",
            ".........",
            ".........",
        ],
        Colour::Black,
    );
    let drawn =
        GameState::from_board(drawn_board(), Rules::default(), Colour::Black, true).unwrap();

    for state in [won, drawn] {
        let black = state.outcome_for(Colour::Black).unwrap();
        let white = state.outcome_for(Colour::White).unwrap();
        assert_eq!(black.value(), -white.value());
        assert_eq!(black.flipped(), white);
    }
}

#[test]
fn test_rules_validation() {
    assert!(Rules::new(9, 5).is_ok());
    assert!(Rules::new(3, 3).is_ok());
    assert_eq!(
        Rules::new(4, 5),
        Err(GameError::InvalidRules {
            board_size: 4,
            win_length: 5
        })
    );
    assert!(Rules::new(9, 0).is_err());
}

#[test]
fn test_from_board_size_mismatch() {
    let board = Board::new(7);
    let err = GameState::from_board(board, Rules::default(), Colour::Black, true).unwrap_err();
    assert_eq!(
        err,
        GameError::BoardSizeMismatch {
            expected: 9,
            actual: 7
        }
    );
}

#[test]
fn test_small_rules_three_in_a_row() {
    let rules = Rules::new(3, 3).unwrap();
    let mut state = GameState::new(rules, Colour::Black);

    // X O O
    // . X .
    // . . X
    for action in [(0, 0), (0, 1), (1, 1), (0, 2), (2, 2)] {
        assert!(!state.is_terminal());
        state = state.apply(Action::new(action.0, action.1)).unwrap();
    }

    assert_eq!(state.winner(), Some(Outcome::Won(Colour::Black)));
}

#[test]
fn test_board_parse_and_display() {
    let rows = ["X.O", ".X.", "O.."];
    let board = Board::parse(&rows).unwrap();

    assert_eq!(board.get(0, 0), Some(1));
    assert_eq!(board.get(0, 2), Some(-1));
    assert_eq!(board.get(3, 0), None);
    assert_eq!(board.get_signed(-1, 0), None);
    assert_eq!(board.count_marks(), 4);
    assert_eq!(board.to_string(), "X.O\n.X.\nO..\n");
}

#[test]
fn test_board_parse_errors() {
    assert!(matches!(
        Board::parse(&["X..", ".."]),
        Err(GameError::Parse(_))
    ));
    assert!(matches!(
        Board::parse(&["X.?", "...", "..."]),
        Err(GameError::Parse(_))
    ));
}

#[test]
fn test_random_games_invariants() {
    for seed in 0..20 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = GameState::new(Rules::default(), Colour::Black);
        let mut move_count = 0;

        while !state.is_terminal() {
            let legal = state.legal_actions();
            assert!(
                !legal.is_empty(),
                "Open game must have legal moves (seed={}, moves={})",
                seed,
                move_count
            );
            assert_eq!(legal.len(), 81 - move_count);

            let action = legal[rng.gen_range(0..legal.len())];
            state = state.apply(action).unwrap();
            move_count += 1;

            assert_eq!(
                state.moves_played(),
                move_count,
                "Stones on board must equal moves played (seed={})",
                seed
            );
        }

        assert!(move_count <= 81, "Game overran the board (seed={})", seed);
        let black = state.outcome_for(Colour::Black).unwrap();
        let white = state.outcome_for(Colour::White).unwrap();
        assert_eq!(black.value(), -white.value(), "seed={}", seed);
    }
}
