//! The board topology asset: adjacency, scoring quads, and move labels.
//!
//! The geometry itself is precomputed and shipped as `assets/board.json`:
//! 302 unit-sphere coordinates plus the raw combinatorics of the snub
//! dodecahedron (150 edges as vertex pairs, 80 triangles, 12 pentagons in
//! ring order) and the two scalar area weights. This module derives
//! everything the engine needs from that raw data and validates its shape
//! on load; it never mutates the tables afterwards.
//!
//! Cell indexing: `0..60` vertices, `60..210` edge midpoints, `210..290`
//! triangle centers, `290..302` pentagon centers.

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;

use crate::constants::{
    BOARD_CELLS, EDGE_BASE, EDGE_CELLS, LARGE_QUADS, PENTAGON_BASE, PENTAGON_CELLS, SMALL_QUADS,
    TRIANGLE_BASE, TRIANGLE_CELLS, VERTEX_CELLS,
};

/// A cell on the board, as an index in `[0, BOARD_CELLS)`.
pub type Point = usize;

/// Canonical move label: the sorted ids of the underlying solid vertices
/// identifying a cell (1 for a vertex, 2 for an edge midpoint, 3 for a
/// triangle center, 5 for a pentagon center). Labels are what external
/// layers exchange, so that independently built boards agree on moves.
pub type Label = Vec<u16>;

const BOARD_ASSET: &str = include_str!("../assets/board.json");

#[derive(Deserialize)]
struct RawAsset {
    cities: Vec<[f64; 3]>,
    edges: Vec<[u16; 2]>,
    triangles: Vec<[u16; 3]>,
    pentagons: Vec<[u16; 5]>,
    small_area: f64,
    large_area: f64,
}

/// One scoring quad: four member cells sharing a fixed area weight.
pub struct Quad {
    pub members: [Point; 4],
    pub area: f64,
}

/// Immutable topology tables, loaded once per process.
pub struct Topology {
    neighbors: Vec<Vec<Point>>,
    cities: Vec<[f64; 3]>,
    quads: Vec<Quad>,
    labels: Vec<Label>,
    decoder: HashMap<Label, Point>,
    total_area: f64,
}

static TOPOLOGY: OnceLock<Topology> = OnceLock::new();

/// The process-wide topology, built from the embedded asset.
pub fn topology() -> &'static Topology {
    TOPOLOGY.get_or_init(|| {
        Topology::from_json(BOARD_ASSET).expect("embedded board asset is well-formed")
    })
}

impl Topology {
    /// Parse and validate a board asset.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawAsset = serde_json::from_str(text).context("parsing board asset")?;
        Self::build(raw)
    }

    fn build(raw: RawAsset) -> Result<Self> {
        ensure!(
            raw.cities.len() == BOARD_CELLS,
            "asset has {} cities, expected {BOARD_CELLS}",
            raw.cities.len()
        );
        ensure!(raw.edges.len() == EDGE_CELLS, "asset edge count");
        ensure!(raw.triangles.len() == TRIANGLE_CELLS, "asset triangle count");
        ensure!(raw.pentagons.len() == PENTAGON_CELLS, "asset pentagon count");
        ensure!(
            raw.small_area > 0.0 && raw.large_area > 0.0,
            "area weights must be positive"
        );

        // Edge midpoints are addressed by their (sorted) endpoint pair.
        let mut edge_index: HashMap<(u16, u16), Point> = HashMap::new();
        for (i, &[u, v]) in raw.edges.iter().enumerate() {
            ensure!((u as usize) < VERTEX_CELLS && (v as usize) < VERTEX_CELLS && u != v,
                "edge {i} endpoints out of range");
            let key = (u.min(v), u.max(v));
            ensure!(
                edge_index.insert(key, EDGE_BASE + i).is_none(),
                "duplicate edge {u}-{v}"
            );
        }
        let edge_mid = |a: u16, b: u16| -> Result<Point> {
            match edge_index.get(&(a.min(b), a.max(b))) {
                Some(&p) => Ok(p),
                None => bail!("face side {a}-{b} is not an edge of the solid"),
            }
        };

        let mut neighbors: Vec<Vec<Point>> = vec![Vec::new(); BOARD_CELLS];
        fn link(neighbors: &mut [Vec<Point>], a: Point, b: Point) {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }

        // Vertices connect to the midpoints of their incident edges.
        for (i, &[u, v]) in raw.edges.iter().enumerate() {
            let mid = EDGE_BASE + i;
            link(&mut neighbors, u as Point, mid);
            link(&mut neighbors, v as Point, mid);
        }

        let mut quads = Vec::with_capacity(SMALL_QUADS + LARGE_QUADS);

        // Each triangle center connects to its three edge midpoints and
        // splits the triangle into three scoring quads.
        for (i, &[a, b, c]) in raw.triangles.iter().enumerate() {
            let center = TRIANGLE_BASE + i;
            let eab = edge_mid(a, b)?;
            let ebc = edge_mid(b, c)?;
            let eca = edge_mid(c, a)?;
            for mid in [eab, ebc, eca] {
                link(&mut neighbors, center, mid);
            }
            for (m0, corner, m1) in [(eab, b, ebc), (ebc, c, eca), (eca, a, eab)] {
                quads.push(Quad {
                    members: [center, m0, corner as Point, m1],
                    area: raw.small_area,
                });
            }
        }

        // Pentagon centers likewise, with five quads around the ring.
        for (i, ring) in raw.pentagons.iter().enumerate() {
            let center = PENTAGON_BASE + i;
            for k in 0..5 {
                let v0 = ring[k];
                let v1 = ring[(k + 1) % 5];
                let v2 = ring[(k + 2) % 5];
                let m0 = edge_mid(v0, v1)?;
                let m1 = edge_mid(v1, v2)?;
                link(&mut neighbors, center, m0);
                quads.push(Quad {
                    members: [center, m0, v1 as Point, m1],
                    area: raw.large_area,
                });
            }
        }
        ensure!(quads.len() == SMALL_QUADS + LARGE_QUADS, "quad count");

        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        // Labels: sorted vertex-id tuples, bijective with cells.
        let mut labels: Vec<Label> = Vec::with_capacity(BOARD_CELLS);
        for v in 0..VERTEX_CELLS as u16 {
            labels.push(vec![v]);
        }
        for &[u, v] in &raw.edges {
            labels.push(sorted(&[u, v]));
        }
        for &t in &raw.triangles {
            labels.push(sorted(&t));
        }
        for &p in &raw.pentagons {
            labels.push(sorted(&p));
        }
        let mut decoder = HashMap::with_capacity(BOARD_CELLS);
        for (point, label) in labels.iter().enumerate() {
            ensure!(
                decoder.insert(label.clone(), point).is_none(),
                "label {label:?} is ambiguous"
            );
        }

        let total_area =
            SMALL_QUADS as f64 * raw.small_area + LARGE_QUADS as f64 * raw.large_area;

        let topo = Topology {
            neighbors,
            cities: raw.cities,
            quads,
            labels,
            decoder,
            total_area,
        };
        topo.validate()?;
        Ok(topo)
    }

    /// Shape checks on the derived tables: symmetry, non-empty neighbor
    /// sets, and the fixed per-category degrees of the cell complex.
    fn validate(&self) -> Result<()> {
        for (p, list) in self.neighbors.iter().enumerate() {
            ensure!(!list.is_empty(), "cell {p} has no neighbors");
            for &n in list {
                ensure!(n < BOARD_CELLS, "cell {p} has out-of-range neighbor {n}");
                ensure!(
                    self.neighbors[n].contains(&p),
                    "adjacency not symmetric between {p} and {n}"
                );
            }
            let expected = match p {
                _ if p < EDGE_BASE => 5,     // vertex: incident edges
                _ if p < TRIANGLE_BASE => 4, // edge midpoint: 2 endpoints + 2 face centers
                _ if p < PENTAGON_BASE => 3, // triangle center: its midpoints
                _ => 5,                      // pentagon center: its midpoints
            };
            ensure!(
                list.len() == expected,
                "cell {p} has degree {}, expected {expected}",
                list.len()
            );
        }
        for (i, city) in self.cities.iter().enumerate() {
            let norm = city.iter().map(|x| x * x).sum::<f64>().sqrt();
            ensure!(
                (0.5..1.5).contains(&norm),
                "city {i} is far from the unit sphere"
            );
        }
        Ok(())
    }

    /// Neighboring cells of `point`.
    pub fn neighbors(&self, point: Point) -> &[Point] {
        &self.neighbors[point]
    }

    /// The scoring quads (small first, then large).
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Sum of all quad areas; scoring fractions are normalized by this.
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Canonical label of a cell.
    pub fn label(&self, point: Point) -> &Label {
        &self.labels[point]
    }

    /// Resolve a label back to its cell. The input is canonicalized by
    /// sorting, so reversed edges and any cyclic rotation of a face ring
    /// resolve to the same cell.
    pub fn decode(&self, label: &[u16]) -> Option<Point> {
        self.decoder.get(&sorted(label)).copied()
    }

    /// Euclidean distance between two cells' geometric coordinates.
    pub fn distance(&self, a: Point, b: Point) -> f64 {
        let pa = self.cities[a];
        let pb = self.cities[b];
        pa.iter()
            .zip(pb.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}

fn sorted(ids: &[u16]) -> Label {
    let mut v = ids.to_vec();
    v.sort_unstable();
    v
}
