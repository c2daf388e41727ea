//! Node lattice coordinate system.
//!
//! Tiles and vertices share a single integer lattice. Every lattice point is
//! either a tile centre or a vertex (a tile corner), decided by the parity
//! of `(x + y) mod 3`:
//! - `0` → tile
//! - `1` → vertex with orientation `+1`
//! - `2` → vertex with orientation `-1`
//!
//! All adjacency on the board is derived from small fixed offsets on this
//! lattice, so the generator never needs pixel geometry.

use serde::{Deserialize, Serialize};

/// Offsets from a tile to its six neighbouring tiles.
pub const TILE_NEIGHBOR_OFFSETS: [(i32, i32); 6] =
    [(1, -1), (2, 1), (1, 2), (-1, 1), (-2, -1), (-1, -2)];

/// What occupies a lattice point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatticeKind {
    Tile,
    Vertex,
}

/// A point on the node lattice.
///
/// `x` is the column in the expanded node grid (three node columns per tile
/// column), `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct LatticePoint {
    pub x: i32,
    pub y: i32,
}

impl LatticePoint {
    /// Create a new lattice point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by an offset
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether this point holds a tile or a vertex
    pub fn kind(&self) -> LatticeKind {
        if (self.x + self.y).rem_euclid(3) == 0 {
            LatticeKind::Tile
        } else {
            LatticeKind::Vertex
        }
    }

    /// Lattice point of the tile at (column, row) of a rectangular tile map.
    pub fn for_tile(column: i32, row: i32) -> Self {
        Self::new(3 * column + (-row).rem_euclid(3), row)
    }

    /// Vertex orientation `a = 1 - 2 * ((x + y + 2) mod 3)`.
    ///
    /// Only meaningful for vertex points; evaluates to `+1` or `-1` there.
    pub fn orientation(&self) -> i32 {
        1 - 2 * (self.x + self.y + 2).rem_euclid(3)
    }

    /// The (up to) three tile points touching this vertex
    pub fn vertex_tile_points(&self) -> [LatticePoint; 3] {
        let a = self.orientation();
        [
            self.offset(-a, 0),
            self.offset(0, -a),
            self.offset(a, a),
        ]
    }

    /// The (up to) three vertex points joined to this vertex by an edge
    pub fn vertex_neighbor_points(&self) -> [LatticePoint; 3] {
        let a = self.orientation();
        [
            self.offset(a, 0),
            self.offset(0, a),
            self.offset(-a, -a),
        ]
    }

    /// The six tile points surrounding this tile
    pub fn tile_neighbor_points(&self) -> [LatticePoint; 6] {
        TILE_NEIGHBOR_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// The six corner (vertex) points of this tile
    pub fn tile_corner_points(&self) -> [LatticePoint; 6] {
        [
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, -1),
            self.offset(-1, 0),
            self.offset(0, -1),
            self.offset(1, 1),
        ]
    }

    /// Axial hex coordinates of a tile point.
    ///
    /// The lattice basis is `e1 = (1, -1)` and `e2 = (1, 2)`, so
    /// `x = q + r` and `y = 2r - q`.
    pub fn to_axial(&self) -> (i32, i32) {
        let r = (self.x + self.y).div_euclid(3);
        let q = self.x - r;
        (q, r)
    }

    /// Hex distance between two tile points (in tile steps)
    pub fn tile_distance(&self, other: &LatticePoint) -> u32 {
        let (q1, r1) = self.to_axial();
        let (q2, r2) = other.to_axial();
        let dq = q1 - q2;
        let dr = r1 - r2;
        ((dq.abs() + dr.abs() + (dq - dr).abs()) / 2) as u32
    }
}

impl std::fmt::Display for LatticePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N_{}_{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tile_points_have_tile_parity() {
        for row in 0..7 {
            for column in 0..5 {
                let p = LatticePoint::for_tile(column, row);
                assert_eq!(p.kind(), LatticeKind::Tile, "{p} should be a tile");
            }
        }
    }

    #[test]
    fn test_tile_neighbors_are_tiles_at_distance_one() {
        let center = LatticePoint::for_tile(3, 5);
        let neighbors = center.tile_neighbor_points();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(neighbor.kind(), LatticeKind::Tile);
            assert_eq!(center.tile_distance(neighbor), 1);
        }
    }

    #[test]
    fn test_vertex_orientation_is_unit() {
        let a = LatticePoint::new(1, 0);
        let b = LatticePoint::new(2, 0);
        assert_eq!(a.kind(), LatticeKind::Vertex);
        assert_eq!(b.kind(), LatticeKind::Vertex);
        assert_eq!(a.orientation(), 1);
        assert_eq!(b.orientation(), -1);
    }

    #[test]
    fn test_vertex_touches_three_tiles() {
        let v = LatticePoint::new(7, 3);
        assert_eq!(v.kind(), LatticeKind::Vertex);
        for t in v.vertex_tile_points() {
            assert_eq!(t.kind(), LatticeKind::Tile);
        }
    }

    #[test]
    fn test_vertex_adjacency_is_symmetric() {
        let v = LatticePoint::new(7, 3);
        for n in v.vertex_neighbor_points() {
            assert_eq!(n.kind(), LatticeKind::Vertex);
            assert!(
                n.vertex_neighbor_points().contains(&v),
                "{n} should list {v} as a neighbour"
            );
        }
    }

    #[test]
    fn test_tile_corners_are_inverse_of_vertex_tiles() {
        let tile = LatticePoint::for_tile(2, 4);
        for corner in tile.tile_corner_points() {
            assert_eq!(corner.kind(), LatticeKind::Vertex);
            assert!(corner.vertex_tile_points().contains(&tile));
        }
    }

    #[test]
    fn test_tile_distance() {
        let a = LatticePoint::for_tile(3, 6);
        let b = a.offset(2, 1).offset(2, 1);
        assert_eq!(a.tile_distance(&b), 2);
        let c = a.offset(1, -1).offset(-1, -2);
        assert_eq!(a.tile_distance(&c), 2);
        assert_eq!(a.tile_distance(&a), 0);
    }
}
