//! Game coordination: one real board, two player seats, turn gating.
//!
//! `Game` owns the `Board` and a `Searcher` and drives the turn cycle:
//! humans place through `play`, AI seats move themselves whenever the
//! turn passes to them. Resignation short-circuits the game with a
//! winner; otherwise the game ends when the side to move has no
//! candidate cells left.

use std::fmt;

use log::info;

use crate::board::{Board, Color, PlayError, Score, SharedObserver};
use crate::search::Searcher;
use crate::topology::Point;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The game already has a winner or no playable cells remain
    Finished,
    /// `play` was called while an AI seat is to move
    NotHumanTurn,
    /// The board rejected the placement
    Play(PlayError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Finished => write!(f, "the game is over"),
            GameError::NotHumanTurn => write!(f, "an AI player is to move"),
            GameError::Play(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for GameError {}

impl From<PlayError> for GameError {
    fn from(err: PlayError) -> Self {
        GameError::Play(err)
    }
}

pub struct Game {
    board: Board,
    searcher: Searcher,
    players: [PlayerKind; 2],
    winner: Option<Color>,
}

impl Game {
    pub fn new(black: PlayerKind, white: PlayerKind) -> Self {
        Game {
            board: Board::new(),
            searcher: Searcher::new(),
            players: [black, white],
            winner: None,
        }
    }

    /// Game with a deterministic searcher.
    pub fn with_seed(black: PlayerKind, white: PlayerKind, seed: u64) -> Self {
        Game {
            board: Board::new(),
            searcher: Searcher::with_seed(seed),
            players: [black, white],
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn player(&self, side: Color) -> PlayerKind {
        self.players[side.index()]
    }

    pub fn register_observer(&mut self, observer: SharedObserver) {
        self.board.register_observer(observer);
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some() || self.board.is_game_over()
    }

    /// Final score of the position on the board.
    pub fn result(&self) -> Score {
        self.board.score()
    }

    /// Reset the board and, if black is an AI seat, let the machine open.
    pub fn start(&mut self) {
        info!("starting game: black {:?}, white {:?}", self.players[0], self.players[1]);
        self.board.reset();
        self.winner = None;
        self.run_ai_turns();
    }

    /// Place a stone for the human side to move, then hand the turn
    /// over; any AI turns that follow are played out before returning.
    pub fn play(&mut self, point: Point) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        let side = self.board.current_player();
        if self.player(side) != PlayerKind::Human {
            return Err(GameError::NotHumanTurn);
        }
        self.board.play(point, side)?;
        info!("{side} played at {point}");
        self.board.switch_player();
        self.run_ai_turns();
        Ok(())
    }

    /// `side` concedes; the opponent wins immediately.
    pub fn resign(&mut self, side: Color) {
        info!("{side} resigns");
        self.winner = Some(side.opponent());
    }

    /// Let AI seats move until the turn reaches a human seat or the
    /// game ends. A move rejected as suicide on the real board teaches
    /// the board's suicide set, so the retry cannot pick it again.
    fn run_ai_turns(&mut self) {
        while !self.is_finished() {
            let side = self.board.current_player();
            if self.player(side) != PlayerKind::Ai {
                break;
            }
            let Some(point) = self.searcher.select_move(&self.board) else {
                break;
            };
            match self.board.play(point, side) {
                Ok(()) => {
                    info!("{side} (ai) played at {point}");
                    self.board.switch_player();
                }
                Err(PlayError::SuicideNotAllowed) => continue,
                Err(err) => {
                    debug_assert!(false, "searcher proposed an illegal move: {err}");
                    break;
                }
            }
        }
    }
}
