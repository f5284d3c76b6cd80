use super::Board;
use crate::core::*;

/******************************************\
|==========================================|
|               Game Status                |
|==========================================|
\******************************************/

/// The state of the game in the current position.
///
/// Exactly one status applies. Mate and stalemate take precedence over
/// the draw rules, so a checkmate delivered on the hundredth quiet ply
/// is still a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// The game goes on and the side to move is not in check.
    Ongoing,
    /// The side to move is in check but has a legal move.
    Check,
    /// The side to move is in check and has no legal move.
    Checkmate,
    /// The side to move is not in check and has no legal move.
    Stalemate,
    /// One hundred plies have passed without a capture or pawn move.
    DrawFiftyMove,
    /// The position has occurred three or more times.
    DrawRepetition,
    /// Neither side has enough material to ever deliver mate.
    DrawInsufficientMaterial,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawFiftyMove => "draw by fifty-move rule",
            GameStatus::DrawRepetition => "draw by threefold repetition",
            GameStatus::DrawInsufficientMaterial => "draw by insufficient material",
        };
        write!(f, "{}", s)
    }
}

/******************************************\
|==========================================|
|            Status Evaluation             |
|==========================================|
\******************************************/

impl Board {
    /// Evaluates the game status of the current position.
    pub fn status(&self) -> GameStatus {
        if self.legal_moves().is_empty() {
            return match self.in_check() {
                true => GameStatus::Checkmate,
                false => GameStatus::Stalemate,
            };
        }

        if self.state.fifty_move >= 100 {
            return GameStatus::DrawFiftyMove;
        }

        if self.repetition_count() >= 3 {
            return GameStatus::DrawRepetition;
        }

        if self.is_insufficient_material() {
            return GameStatus::DrawInsufficientMaterial;
        }

        match self.in_check() {
            true => GameStatus::Check,
            false => GameStatus::Ongoing,
        }
    }

    /// How many times the current position has occurred, counting itself.
    ///
    /// Only positions since the last irreversible move can repeat, so
    /// the scan is bounded by the fifty-move clock, and only states
    /// with the same side to move are compared (every second ply back).
    fn repetition_count(&self) -> usize {
        let roll_back = self.state.fifty_move as usize;

        1 + self
            .history
            .iter()
            .rev()
            .take(roll_back)
            .skip(1)
            .step_by(2)
            .filter(|state| state.key == self.state.key)
            .count()
    }

    /// Whether no sequence of legal moves can lead to a checkmate.
    ///
    /// True when neither side has a pawn, rook or queen, and each side
    /// has at most one minor piece.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.piecetype_bb(PieceType::Pawn)
            | self.piecetype_bb(PieceType::Rook)
            | self.piecetype_bb(PieceType::Queen);
        if heavy.is_occupied() {
            return false;
        }

        let minors = self.piecetype_bb(PieceType::Knight) | self.piecetype_bb(PieceType::Bishop);

        (minors & self.occupied_bb(Colour::White)).count_bits() <= 1
            && (minors & self.occupied_bb(Colour::Black)).count_bits() <= 1
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen::START_FEN;

    fn status_of(fen: &str) -> GameStatus {
        Board::from_fen(fen)
            .unwrap_or_else(|e| panic!("Test FEN failed to parse: {}: {}", fen, e))
            .status()
    }

    fn play(board: &mut Board, moves: &[&str]) {
        for mv in moves {
            let parsed = board
                .parse_move(mv)
                .unwrap_or_else(|e| panic!("Move '{}' failed: {}", mv, e));
            board.make_move(parsed);
        }
    }

    #[test]
    fn test_startpos_is_ongoing() {
        assert_eq!(Board::default().status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_check_status() {
        assert_eq!(
            status_of("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1"),
            GameStatus::Check
        );
    }

    #[test]
    fn test_fools_mate() {
        let mut board = Board::default();
        play(&mut board, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert!(board.in_check());
        assert!(board.legal_moves().is_empty());
        assert_eq!(board.status(), GameStatus::Checkmate);
    }

    #[test]
    fn test_scholars_mate_attempt_is_not_mate() {
        // The queen eyes f7 but the threat is parryable
        let mut board = Board::default();
        play(&mut board, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5"]);

        assert_ne!(board.status(), GameStatus::Checkmate);
        assert!(!board.legal_moves().is_empty());
    }

    #[test]
    fn test_back_rank_mate() {
        assert_eq!(
            status_of("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1"),
            GameStatus::Ongoing
        );
        assert_eq!(
            status_of("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1"),
            GameStatus::Checkmate
        );
    }

    #[test]
    fn test_stalemate() {
        // Black king in the corner with no moves and no check
        assert_eq!(
            status_of("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"),
            GameStatus::Stalemate
        );
    }

    #[test]
    fn test_fifty_move_draw_at_exactly_one_hundred_plies() {
        // One quiet move away from the boundary
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        assert_eq!(board.status(), GameStatus::Ongoing);

        play(&mut board, &["a1a2"]);
        assert_eq!(board.fifty_move(), 100);
        assert_eq!(board.status(), GameStatus::DrawFiftyMove);
    }

    #[test]
    fn test_fifty_move_not_drawn_at_ninety_nine() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 98 80").unwrap();
        play(&mut board, &["a1a2"]);
        assert_eq!(board.fifty_move(), 99);
        assert_ne!(board.status(), GameStatus::DrawFiftyMove);
    }

    #[test]
    fn test_pawn_move_resets_fifty_move_draw() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/R3K3 w - - 99 80").unwrap();
        play(&mut board, &["e2e3"]);
        assert_eq!(board.fifty_move(), 0);
        assert_eq!(board.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_checkmate_beats_fifty_move_draw() {
        // The hundredth quiet ply delivers mate, which wins
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 99 80").unwrap();
        play(&mut board, &["a1a8"]);
        assert_eq!(board.fifty_move(), 100);
        assert_eq!(board.status(), GameStatus::Checkmate);
    }

    #[test]
    fn test_threefold_repetition() {
        let mut board = Board::default();

        // Both knights shuttle back and forth
        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_ne!(board.status(), GameStatus::DrawRepetition);

        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(board.status(), GameStatus::DrawRepetition);
    }

    #[test]
    fn test_repetition_counts_first_occurrence_with_stale_ep_target() {
        // After 1. e4 e5 neither double push could have been met by a
        // pawn capture, so that position repeats like any other
        let mut board = Board::default();
        play(&mut board, &["e2e4", "e7e5"]);

        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_ne!(board.status(), GameStatus::DrawRepetition);

        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(board.status(), GameStatus::DrawRepetition);
    }

    #[test]
    fn test_repetition_window_ends_at_irreversible_move() {
        let mut board = Board::default();

        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        // A pawn push makes the earlier positions unreachable
        play(&mut board, &["e2e4", "e7e5"]);
        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_ne!(board.status(), GameStatus::DrawRepetition);

        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(board.status(), GameStatus::DrawRepetition);
    }

    #[test]
    fn test_insufficient_material_positions() {
        // King vs king
        assert_eq!(
            status_of("4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            GameStatus::DrawInsufficientMaterial
        );
        // King and bishop vs king
        assert_eq!(
            status_of("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1"),
            GameStatus::DrawInsufficientMaterial
        );
        // King and knight vs king
        assert_eq!(
            status_of("4k3/8/8/8/8/8/8/2N1K3 w - - 0 1"),
            GameStatus::DrawInsufficientMaterial
        );
        // King and bishop each
        assert_eq!(
            status_of("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1"),
            GameStatus::DrawInsufficientMaterial
        );
    }

    #[test]
    fn test_insufficient_material_ignores_history() {
        // The draw applies whatever the clocks say
        assert_eq!(
            status_of("2b1k3/8/8/8/8/8/8/2B1K3 w - - 42 90"),
            GameStatus::DrawInsufficientMaterial
        );
    }

    #[test]
    fn test_sufficient_material_positions() {
        // A single rook can mate
        assert_eq!(
            status_of("4k3/8/8/8/8/8/8/R3K3 w - - 0 1"),
            GameStatus::Ongoing
        );
        // So can a lone pawn, eventually
        assert_ne!(
            status_of("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"),
            GameStatus::DrawInsufficientMaterial
        );
        // Two minors on one side are enough
        assert_ne!(
            status_of("4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1"),
            GameStatus::DrawInsufficientMaterial
        );
    }

    #[test]
    fn test_status_after_capture_to_insufficient() {
        // Bishop takes the last rook, leaving king and bishop vs king
        let mut board = Board::from_fen("4k3/8/8/4b3/8/8/8/R3K3 b - - 0 1").unwrap();
        assert_eq!(board.status(), GameStatus::Ongoing);

        play(&mut board, &["e5a1"]);
        assert_eq!(board.status(), GameStatus::DrawInsufficientMaterial);
    }

    #[test]
    fn test_full_game_remains_consistent() {
        let mut board = Board::from_fen(START_FEN).unwrap();
        play(&mut board, &["e2e4", "c7c5", "g1f3", "d7d6"]);
        assert_eq!(board.status(), GameStatus::Ongoing);
        assert_eq!(board.key(), board.calc_key());
    }
}
