//! Move selection by randomized depth-limited simulation.
//!
//! The searcher works on an observer-free snapshot of the real board.
//! For every candidate cell it plays the stone, scores the resulting
//! position, samples a few random opponent replies recursively down to
//! the horizon, and undoes everything exactly. Candidates are ranked by
//! area ratio plus a weighted capture gain; ties go to the candidate
//! with the lower placement potential.

use log::debug;

use crate::board::{Board, Color, PlayError};
use crate::constants::{BOARD_CELLS, CAPTURE_WEIGHT, RIVAL_SAMPLES, SEARCH_HORIZON};
use crate::topology::{Point, topology};

pub struct Searcher {
    rng: fastrand::Rng,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    pub fn new() -> Self {
        Searcher {
            rng: fastrand::Rng::new(),
        }
    }

    /// Deterministic searcher for reproducible games and tests.
    pub fn with_seed(seed: u64) -> Self {
        Searcher {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Pick a move for the side to play on `board`, or `None` when that
    /// side has no candidate cells left. The board itself is never
    /// touched; all simulation happens on a snapshot.
    pub fn select_move(&mut self, board: &Board) -> Option<Point> {
        let mut sim = board.snapshot();
        let player = sim.current_player();

        let mut best_move = None;
        let mut best_value = f64::NEG_INFINITY;
        let mut best_potential = f64::INFINITY;

        for point in sim.get_empties(player) {
            let (area, gain) = match self.simulate(&mut sim, 0, point, player) {
                Ok(outcome) => outcome,
                // A freshly discovered suicide just disqualifies the
                // candidate; the clone's suicide set now remembers it.
                Err(PlayError::SuicideNotAllowed) => continue,
                Err(err) => {
                    debug_assert!(false, "unexpected simulated-play failure: {err}");
                    continue;
                }
            };
            let value = area + CAPTURE_WEIGHT * gain;
            if value > best_value {
                best_value = value;
                best_potential = potential(&sim, point);
                best_move = Some(point);
            } else if value == best_value {
                let pot = potential(&sim, point);
                if pot < best_potential {
                    best_potential = pot;
                    best_move = Some(point);
                }
            }
        }

        if let Some(point) = best_move {
            debug!(
                "{player} selects {point} ({:?}), value {best_value:.4}",
                topology().label(point)
            );
        }
        best_move
    }

    /// Score a tentative play of `color` at `point` and undo it.
    ///
    /// Returns `(area, gain)`: the mover's area ratio minus the mean of
    /// the sampled replies' area ratios, and the capture gain (captured
    /// stones over board size) minus the mean reply gain. Replies that
    /// turn out suicidal are dropped from the sample; the mover's own
    /// suicide propagates to the caller.
    fn simulate(
        &mut self,
        board: &mut Board,
        depth: usize,
        point: Point,
        color: Color,
    ) -> Result<(f64, f64), PlayError> {
        if depth >= SEARCH_HORIZON {
            return Ok((0.0, 0.0));
        }

        board.play_with(point, color, false)?;
        let area = board.score().of(color);

        let rival = color.opponent();
        let mut replies = board.get_empties(rival);
        let mut rival_area = 0.0;
        let mut rival_gain = 0.0;
        let mut sampled = 0usize;
        // Up to RIVAL_SAMPLES draws without replacement.
        for _ in 0..RIVAL_SAMPLES {
            if replies.is_empty() {
                break;
            }
            let reply = replies.swap_remove(self.rng.usize(..replies.len()));
            match self.simulate(board, depth + 1, reply, rival) {
                Ok((a, g)) => {
                    rival_area += a;
                    rival_gain += g;
                    sampled += 1;
                }
                Err(PlayError::SuicideNotAllowed) => {}
                Err(err) => {
                    debug_assert!(false, "unexpected simulated-reply failure: {err}");
                }
            }
        }
        if sampled > 0 {
            rival_area /= sampled as f64;
            rival_gain /= sampled as f64;
        }

        let captured = board.undo_play(point, color);
        let gain = captured as f64 / BOARD_CELLS as f64;
        Ok((area - rival_area, gain - rival_gain))
    }
}

/// Placement potential of `point`: the sum over occupied cells of a
/// move-counter damping factor divided by chord distance. The damping,
/// `tanh(0.5 - counter/302)`, is positive early in the game (so lower
/// potential prefers cells far from all stones) and negative later (so
/// lower potential prefers crowded areas).
pub fn potential(board: &Board, point: Point) -> f64 {
    let topo = topology();
    let damping = (0.5 - board.counter() as f64 / BOARD_CELLS as f64).tanh();
    let mut sum = 0.0;
    for cell in 0..BOARD_CELLS {
        if board.stone(cell).is_some() {
            let distance = topo.distance(point, cell);
            if distance > 0.0 {
                sum += damping / distance;
            }
        }
    }
    sum
}
