//! Sphergo: a Go-like capture game on a spherical board.
//!
//! This crate implements the rules engine and move-search AI for
//! two-player territorial capture on the 302-cell cell complex of a
//! snub dodecahedron: every vertex, edge midpoint and face center of
//! the solid is a playable cell, adjacency follows the solid's
//! incidence structure, and territory is measured as fractional area
//! over the faces' scoring quads.
//!
//! ## Modules
//!
//! - [`constants`] - Board layout counts and search parameters
//! - [`topology`] - Adjacency, scoring quads and the label codec,
//!   derived from the embedded board asset
//! - [`board`] - Board state, rule enforcement, scoring, observers
//! - [`search`] - Randomized depth-limited move selection
//! - [`game`] - Turn coordination for human and AI seats
//!
//! ## Example
//!
//! ```
//! use sphergo::board::Color;
//! use sphergo::game::{Game, PlayerKind};
//!
//! // A human opening against the machine.
//! let mut game = Game::with_seed(PlayerKind::Human, PlayerKind::Ai, 42);
//! game.start();
//!
//! // Black takes a vertex; white replies by itself.
//! game.play(0).unwrap();
//! assert_eq!(game.board().current_player(), Color::Black);
//! assert_eq!(game.board().counter(), 2);
//! ```

pub mod board;
pub mod constants;
pub mod game;
pub mod search;
pub mod topology;
