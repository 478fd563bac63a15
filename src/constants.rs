//! Constants for the spherical board layout and the move search.
//!
//! The board is the cell complex of a snub dodecahedron: every vertex,
//! edge midpoint and face center of the solid is an addressable cell.
//! Cells are indexed by category in fixed, contiguous ranges; the ranges
//! matter only for the topology tables and for area weighting during
//! scoring, never for move legality.

// =============================================================================
// Board Layout
// =============================================================================

/// Total number of addressable cells.
pub const BOARD_CELLS: usize = 302;

/// Snub dodecahedron vertices.
pub const VERTEX_CELLS: usize = 60;

/// Edge midpoints.
pub const EDGE_CELLS: usize = 150;

/// Triangle face centers.
pub const TRIANGLE_CELLS: usize = 80;

/// Pentagon face centers.
pub const PENTAGON_CELLS: usize = 12;

/// First edge-midpoint index (vertices occupy `0..EDGE_BASE`).
pub const EDGE_BASE: usize = VERTEX_CELLS;

/// First triangle-center index.
pub const TRIANGLE_BASE: usize = EDGE_BASE + EDGE_CELLS;

/// First pentagon-center index.
pub const PENTAGON_BASE: usize = TRIANGLE_BASE + TRIANGLE_CELLS;

/// Scoring quads from subdivided triangles (3 per triangle).
pub const SMALL_QUADS: usize = 3 * TRIANGLE_CELLS;

/// Scoring quads from subdivided pentagons (5 per pentagon).
pub const LARGE_QUADS: usize = 5 * PENTAGON_CELLS;

// =============================================================================
// Move Search Parameters
// =============================================================================

/// Recursion horizon for simulated play-outs. The search evaluates a
/// candidate and samples opponent replies down to this depth.
pub const SEARCH_HORIZON: usize = 1;

/// Number of opponent replies sampled per simulated node.
pub const RIVAL_SAMPLES: usize = 2;

/// Weight of the capture gain relative to the area delta when ranking
/// candidate moves.
pub const CAPTURE_WEIGHT: f64 = 2.0;
