//! Static board geometry: tiles, vertices, edges and ports.
//!
//! This module contains:
//! - Resource and tile kinds
//! - Port (harbor) kinds
//! - Typed ids for tiles, vertices and edges
//! - `BoardGeometry`, the immutable graph produced by the generator
//! - Per-site dynamic state (`VertexState`, `EdgeState`)
//!
//! Geometry never changes after generation. Everything that changes during
//! play lives on `GameState` instead.

use crate::hex::LatticePoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier (index into the turn order)
pub type PlayerId = u8;

/// The five producing resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];

    /// Lower-case display name
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Ore => "ore",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces a resource when its token is rolled
    Resource(Resource),
    /// No production; the robber starts here
    Desert,
    /// Not part of the playable land
    Sea,
}

impl TileKind {
    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileKind::Resource(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_sea(&self) -> bool {
        matches!(self, TileKind::Sea)
    }

    pub fn is_desert(&self) -> bool {
        matches!(self, TileKind::Desert)
    }
}

/// Port kinds for bank trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl Port {
    /// The exchange rate for this port
    pub fn rate(&self) -> u32 {
        match self {
            Port::Generic => 3,
            Port::Specific(_) => 2,
        }
    }
}

macro_rules! board_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u16);

        impl $name {
            /// Position of this id in the owning board vector
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

board_id!(
    /// Identifies a tile
    TileId,
    "T"
);
board_id!(
    /// Identifies a vertex (settlement/city site)
    VertexId,
    "V"
);
board_id!(
    /// Identifies an edge (road site)
    EdgeId,
    "E"
);

/// What a lattice point holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Tile(TileId),
    Vertex(VertexId),
}

/// A point of the lattice, tagged with the site it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub point: LatticePoint,
    pub kind: NodeKind,
}

/// A hexagonal cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub point: LatticePoint,
    pub kind: TileKind,
    /// Dice token (2-12), `None` for desert and sea
    pub token: Option<u8>,
    pub adjacent_vertices: Vec<VertexId>,
}

impl Tile {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.kind.resource()
    }

    pub fn is_land(&self) -> bool {
        !self.kind.is_sea()
    }
}

/// A settlement/city site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub point: LatticePoint,
    pub adjacent_tiles: Vec<TileId>,
    pub adjacent_vertices: Vec<VertexId>,
}

/// A road site between two vertices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: [VertexId; 2],
    /// Tiles touching both endpoints (0, 1 or 2)
    pub adjacent_tiles: Vec<TileId>,
    pub port: Option<Port>,
}

impl Edge {
    /// Whether `vertex` is one of this edge's endpoints
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }
}

/// The immutable board graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardGeometry {
    /// Lattice width in nodes
    pub width: i32,
    /// Lattice height in nodes
    pub height: i32,
    /// Row-major node grid (`y * width + x`)
    pub nodes: Vec<Node>,
    pub tiles: Vec<Tile>,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    /// Edges incident to each vertex, indexed by vertex id
    pub vertex_edges: Vec<Vec<EdgeId>>,
}

impl BoardGeometry {
    // ==================== Query Methods ====================

    /// Get a tile by id
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    /// Get a vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// Get an edge by id
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Get the node at a lattice point, if it is inside the grid
    pub fn node_at(&self, point: LatticePoint) -> Option<&Node> {
        if point.x < 0 || point.y < 0 || point.x >= self.width || point.y >= self.height {
            return None;
        }
        self.nodes.get((point.y * self.width + point.x) as usize)
    }

    /// Get the tile at a lattice point
    pub fn tile_at(&self, point: LatticePoint) -> Option<&Tile> {
        match self.node_at(point)?.kind {
            NodeKind::Tile(id) => self.tile(id),
            NodeKind::Vertex(_) => None,
        }
    }

    /// Get all land tiles (non-sea)
    pub fn land_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.is_land())
    }

    /// Tiles sharing a side with `tile`
    pub fn tile_neighbors(&self, tile: TileId) -> Vec<TileId> {
        let Some(t) = self.tile(tile) else {
            return Vec::new();
        };
        t.point
            .tile_neighbor_points()
            .into_iter()
            .filter_map(|p| self.tile_at(p).map(|n| n.id))
            .collect()
    }

    /// Edges touching a vertex
    pub fn edges_at_vertex(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertex_edges
            .get(vertex.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The edge joining two vertices, if they are adjacent
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges_at_vertex(a)
            .iter()
            .copied()
            .find(|e| self.edge(*e).is_some_and(|edge| edge.touches(b)))
    }

    /// All edges carrying a port
    pub fn ports(&self) -> impl Iterator<Item = (&Edge, Port)> {
        self.edges.iter().filter_map(|e| e.port.map(|p| (e, p)))
    }
}

/// What's built on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Building {
    #[default]
    None,
    Settlement,
    City,
}

impl Building {
    /// Cards produced per matching roll
    pub fn payout(&self) -> u32 {
        match self {
            Building::None => 0,
            Building::Settlement => 1,
            Building::City => 2,
        }
    }
}

/// Dynamic ownership of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VertexState {
    pub building: Building,
    pub owner: Option<PlayerId>,
}

impl VertexState {
    pub fn is_empty(&self) -> bool {
        self.building == Building::None
    }
}

/// Dynamic ownership of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EdgeState {
    pub owner: Option<PlayerId>,
}
