//! Board generation.
//!
//! Builds a `BoardGeometry` from a land/sea tile map in seven ordered steps:
//! 1. Place tile and vertex nodes on the lattice (land starts as desert)
//! 2. Link vertex→tile and vertex→vertex adjacency
//! 3. Derive tile→vertex adjacency
//! 4. Assign resources, keeping `max(1, T / 15)` deserts
//! 5. Assign dice tokens, spreading out 6s and 8s
//! 6. Create one edge per adjacent vertex pair
//! 7. Place 2:1 and 3:1 ports along the coast
//!
//! Every random draw comes from the `Rng` passed to [`generate`], so the same
//! seed always produces the same board. Small or odd maps get fewer ports
//! or a relaxed 6/8 rule instead of an error.

use crate::board::{
    BoardGeometry, Edge, EdgeId, Node, NodeKind, Port, Resource, Tile, TileId, TileKind, Vertex,
    VertexId,
};
use crate::game::SetupError;
use crate::hex::{LatticeKind, LatticePoint};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Resources in the order they are handed out before shuffling
const RESOURCE_PRIORITY: [Resource; 5] = [
    Resource::Wheat,
    Resource::Wood,
    Resource::Sheep,
    Resource::Ore,
    Resource::Brick,
];

/// Dice tokens, most frequent roll first
const TOKEN_PRIORITY: [u8; 10] = [6, 8, 5, 9, 4, 10, 3, 11, 2, 12];

/// Tokens that may not sit next to each other
const HOT_TOKENS: [u8; 2] = [6, 8];

/// Largest lattice (tiles plus vertices) a map may span. Board ids are 16-bit
/// and a lattice never has more edges than nodes.
pub const MAX_LATTICE_NODES: usize = u16::MAX as usize;

/// Order in which 2:1 ports are placed
const PORT_RESOURCES: [Resource; 5] = [
    Resource::Wood,
    Resource::Brick,
    Resource::Sheep,
    Resource::Wheat,
    Resource::Ore,
];

/// Which cells of a rectangular tile grid are land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    /// `rows[row][column]`, `true` for land
    pub rows: Vec<Vec<bool>>,
}

impl TileMap {
    /// Build a map from explicit rows. Rejects empty and ragged grids.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, SetupError> {
        let map = Self { rows };
        map.validate()?;
        Ok(map)
    }

    /// Check the grid is non-empty, rectangular and small enough for board ids
    pub fn validate(&self) -> Result<(), SetupError> {
        let width = self.width();
        if width == 0 {
            return Err(SetupError::InvalidTileMap("tile map is empty".into()));
        }
        if let Some(row) = self.rows.iter().position(|r| r.len() != width) {
            return Err(SetupError::InvalidTileMap(format!(
                "row {} has {} columns, expected {}",
                row,
                self.rows[row].len(),
                width
            )));
        }
        let nodes = self.lattice_size();
        if nodes > MAX_LATTICE_NODES {
            return Err(SetupError::InvalidTileMap(format!(
                "lattice has {} nodes, at most {} are supported",
                nodes, MAX_LATTICE_NODES
            )));
        }
        Ok(())
    }

    /// Hexagonal island of the given radius, ringed by sea.
    pub fn hexagon(radius: u32) -> Self {
        let d = radius as i32 + 1;
        let height = 4 * d + 3;
        let width = 2 * d + 3;
        let center = LatticePoint::for_tile(d + 1, 2 * d + 1);

        let rows = (0..height)
            .map(|row| {
                (0..width)
                    .map(|column| {
                        LatticePoint::for_tile(column, row).tile_distance(&center) <= radius
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// The classic 19-tile board
    pub fn standard() -> Self {
        Self::hexagon(2)
    }

    /// Number of tile rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of tile columns
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of lattice points (tiles and vertices) the map spans
    pub fn lattice_size(&self) -> usize {
        self.width()
            .saturating_mul(self.height())
            .saturating_mul(3)
    }

    /// Number of land cells
    pub fn land_count(&self) -> usize {
        self.rows.iter().flatten().filter(|land| **land).count()
    }

    fn is_land(&self, column: i32, row: i32) -> bool {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(column as usize))
            .copied()
            .unwrap_or(false)
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Generate a complete board from a tile map.
///
/// Only a map that fails [`TileMap::validate`] is an error; everything else
/// degrades to fewer ports or a relaxed token rule.
pub fn generate<R: Rng>(map: &TileMap, rng: &mut R) -> Result<BoardGeometry, SetupError> {
    let mut board = place_nodes(map)?;
    link_adjacency(&mut board);
    assign_resources(&mut board, rng);
    assign_tokens(&mut board, rng);
    synthesize_edges(&mut board)?;
    assign_ports(&mut board, rng);
    Ok(board)
}

/// Id for the next element of a board vector
fn next_id(len: usize, what: &str) -> Result<u16, SetupError> {
    u16::try_from(len)
        .map_err(|_| SetupError::InvalidTileMap(format!("more than {} {}", u16::MAX, what)))
}

// ==================== Step 1: Nodes ====================

/// Lay out every lattice point. Land tiles start as desert, the rest as sea.
pub fn place_nodes(map: &TileMap) -> Result<BoardGeometry, SetupError> {
    map.validate()?;
    let height = map.height() as i32;
    let width = 3 * map.width() as i32;

    let mut nodes = Vec::with_capacity((width * height).max(0) as usize);
    let mut tiles = Vec::new();
    let mut vertices = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let point = LatticePoint::new(x, y);
            let kind = match point.kind() {
                LatticeKind::Tile => {
                    let id = TileId(next_id(tiles.len(), "tiles")?);
                    let column = (x - (-y).rem_euclid(3)) / 3;
                    let kind = if map.is_land(column, y) {
                        TileKind::Desert
                    } else {
                        TileKind::Sea
                    };
                    tiles.push(Tile {
                        id,
                        point,
                        kind,
                        token: None,
                        adjacent_vertices: Vec::new(),
                    });
                    NodeKind::Tile(id)
                }
                LatticeKind::Vertex => {
                    let id = VertexId(next_id(vertices.len(), "vertices")?);
                    vertices.push(Vertex {
                        id,
                        point,
                        adjacent_tiles: Vec::new(),
                        adjacent_vertices: Vec::new(),
                    });
                    NodeKind::Vertex(id)
                }
            };
            nodes.push(Node { point, kind });
        }
    }

    Ok(BoardGeometry {
        width,
        height,
        nodes,
        tiles,
        vertices,
        edges: Vec::new(),
        vertex_edges: Vec::new(),
    })
}

// ==================== Steps 2-3: Adjacency ====================

/// Fill vertex→tile, vertex→vertex and tile→vertex adjacency.
pub fn link_adjacency(board: &mut BoardGeometry) {
    let mut tile_vertices: Vec<Vec<VertexId>> = vec![Vec::new(); board.tiles.len()];
    let mut links = Vec::with_capacity(board.vertices.len());

    for vertex in &board.vertices {
        let tiles: Vec<TileId> = vertex
            .point
            .vertex_tile_points()
            .into_iter()
            .filter_map(|p| match board.node_at(p)?.kind {
                NodeKind::Tile(id) => Some(id),
                NodeKind::Vertex(_) => None,
            })
            .collect();
        let neighbors: Vec<VertexId> = vertex
            .point
            .vertex_neighbor_points()
            .into_iter()
            .filter_map(|p| match board.node_at(p)?.kind {
                NodeKind::Vertex(id) => Some(id),
                NodeKind::Tile(_) => None,
            })
            .collect();

        for tile in &tiles {
            tile_vertices[tile.index()].push(vertex.id);
        }
        links.push((tiles, neighbors));
    }

    for (vertex, (tiles, neighbors)) in board.vertices.iter_mut().zip(links) {
        vertex.adjacent_tiles = tiles;
        vertex.adjacent_vertices = neighbors;
    }
    for (tile, vertices) in board.tiles.iter_mut().zip(tile_vertices) {
        tile.adjacent_vertices = vertices;
    }
}

// ==================== Step 4: Resources ====================

/// Keep `max(1, T / 15)` deserts and share the rest of the land evenly
/// between the five resources.
pub fn assign_resources<R: Rng>(board: &mut BoardGeometry, rng: &mut R) {
    let land: Vec<TileId> = board.land_tiles().map(|t| t.id).collect();
    let desert_target = (land.len() / 15).max(1);

    let mut deserts = land.clone();
    let mut assignable = Vec::new();
    while deserts.len() > desert_target {
        let idx = rng.gen_range(0..deserts.len());
        assignable.push(deserts.swap_remove(idx));
    }
    // Keep tile order stable so the shuffle alone decides the layout
    assignable.sort();

    let mut pool: Vec<Resource> = RESOURCE_PRIORITY
        .iter()
        .copied()
        .cycle()
        .take(assignable.len())
        .collect();
    pool.shuffle(rng);

    for (tile, resource) in assignable.into_iter().zip(pool) {
        board.tiles[tile.index()].kind = TileKind::Resource(resource);
    }
}

// ==================== Step 5: Tokens ====================

/// How many of each token a board with `tokenable` producing tiles gets.
pub fn token_counts(tokenable: usize) -> Vec<(u8, usize)> {
    let base = tokenable / TOKEN_PRIORITY.len();
    let remainder = tokenable % TOKEN_PRIORITY.len();
    TOKEN_PRIORITY
        .iter()
        .enumerate()
        .map(|(i, &token)| (token, base + usize::from(i < remainder)))
        .collect()
}

/// Put a dice token on every producing tile.
///
/// 6s and 8s go first, each on a tile no other 6 or 8 touches. When every
/// remaining tile is already blocked the rule is dropped for that token.
pub fn assign_tokens<R: Rng>(board: &mut BoardGeometry, rng: &mut R) {
    let mut remaining: Vec<TileId> = board
        .tiles
        .iter()
        .filter(|t| t.resource().is_some())
        .map(|t| t.id)
        .collect();
    let counts = token_counts(remaining.len());
    let mut blocked = vec![false; board.tiles.len()];

    for (token, count) in counts.iter().filter(|(t, _)| HOT_TOKENS.contains(t)) {
        for _ in 0..*count {
            let open: Vec<TileId> = remaining
                .iter()
                .copied()
                .filter(|t| !blocked[t.index()])
                .collect();
            let candidates = if open.is_empty() {
                debug!(token, "no unblocked tile left, relaxing 6/8 spacing");
                &remaining
            } else {
                &open
            };
            let Some(&chosen) = candidates.choose(rng) else {
                break;
            };

            board.tiles[chosen.index()].token = Some(*token);
            remaining.retain(|t| *t != chosen);
            for neighbor in board.tile_neighbors(chosen) {
                if board.tiles[neighbor.index()].resource().is_some() {
                    blocked[neighbor.index()] = true;
                }
            }
        }
    }

    let mut rest: Vec<u8> = counts
        .iter()
        .filter(|(t, _)| !HOT_TOKENS.contains(t))
        .flat_map(|&(token, count)| std::iter::repeat(token).take(count))
        .collect();
    rest.shuffle(rng);

    for (tile, token) in remaining.into_iter().zip(rest) {
        board.tiles[tile.index()].token = Some(token);
    }
}

// ==================== Step 6: Edges ====================

/// Create one edge for every pair of adjacent vertices.
pub fn synthesize_edges(board: &mut BoardGeometry) -> Result<(), SetupError> {
    let mut edges = Vec::new();
    let mut vertex_edges = vec![Vec::new(); board.vertices.len()];

    for vertex in &board.vertices {
        for &other in &vertex.adjacent_vertices {
            if other <= vertex.id {
                continue;
            }
            let other_tiles = &board.vertices[other.index()].adjacent_tiles;
            let adjacent_tiles = vertex
                .adjacent_tiles
                .iter()
                .copied()
                .filter(|t| other_tiles.contains(t))
                .collect();

            let id = EdgeId(next_id(edges.len(), "edges")?);
            vertex_edges[vertex.id.index()].push(id);
            vertex_edges[other.index()].push(id);
            edges.push(Edge {
                id,
                vertices: [vertex.id, other],
                adjacent_tiles,
                port: None,
            });
        }
    }

    board.edges = edges;
    board.vertex_edges = vertex_edges;
    Ok(())
}

// ==================== Step 7: Ports ====================

/// The sea tile of a coastal edge: exactly two adjacent tiles, one of them sea.
fn coastal_sea_tile(board: &BoardGeometry, edge: &Edge) -> Option<TileId> {
    if edge.adjacent_tiles.len() != 2 {
        return None;
    }
    let mut sea = edge
        .adjacent_tiles
        .iter()
        .copied()
        .filter(|t| board.tiles[t.index()].kind.is_sea());
    match (sea.next(), sea.next()) {
        (Some(tile), None) => Some(tile),
        _ => None,
    }
}

fn coastal_land_tile(board: &BoardGeometry, edge: &Edge) -> Option<TileId> {
    edge.adjacent_tiles
        .iter()
        .copied()
        .find(|t| board.tiles[t.index()].is_land())
}

/// Tracks which vertices and sea tiles already carry a port
#[derive(Default)]
struct PortPlacer {
    used_vertices: HashSet<VertexId>,
    used_sea: HashSet<TileId>,
}

impl PortPlacer {
    fn is_free(&self, board: &BoardGeometry, edge: &Edge) -> bool {
        let Some(sea) = coastal_sea_tile(board, edge) else {
            return false;
        };
        !self.used_sea.contains(&sea) && !edge.vertices.iter().any(|v| self.used_vertices.contains(v))
    }

    /// Greedily place up to `count` ports on shuffled candidates.
    fn place<R: Rng>(
        &mut self,
        board: &mut BoardGeometry,
        mut candidates: Vec<EdgeId>,
        port: Port,
        count: usize,
        rng: &mut R,
    ) -> usize {
        candidates.shuffle(rng);
        let mut placed = 0;
        for id in candidates {
            if placed == count {
                break;
            }
            let edge = &board.edges[id.index()];
            if !self.is_free(board, edge) {
                continue;
            }
            if let Some(sea) = coastal_sea_tile(board, edge) {
                self.used_sea.insert(sea);
            }
            self.used_vertices.extend(edge.vertices);
            board.edges[id.index()].port = Some(port);
            placed += 1;
        }
        placed
    }
}

/// Annotate coastal edges with ports.
///
/// Targets scale with the land count `T`: `round(0.86 * sqrt(T))` generic
/// ports and `round(1.05 * sqrt(T))` 2:1 ports shared across resources.
/// No two ports share a vertex or a sea tile, and a 2:1 port never faces
/// land of its own resource.
pub fn assign_ports<R: Rng>(board: &mut BoardGeometry, rng: &mut R) {
    let land = board.land_tiles().count() as f64;
    let generic_target = (0.86 * land.sqrt()).round() as usize;
    let specific_target = (1.05 * land.sqrt()).round() as usize;

    let mut per_resource = [specific_target / PORT_RESOURCES.len(); 5];
    for _ in 0..specific_target % PORT_RESOURCES.len() {
        per_resource[rng.gen_range(0..PORT_RESOURCES.len())] += 1;
    }

    let coastal: Vec<EdgeId> = board
        .edges
        .iter()
        .filter(|e| coastal_sea_tile(board, e).is_some())
        .map(|e| e.id)
        .collect();

    let mut placer = PortPlacer::default();

    for (resource, &wanted) in PORT_RESOURCES.iter().zip(per_resource.iter()) {
        if wanted == 0 {
            continue;
        }
        let candidates: Vec<EdgeId> = coastal
            .iter()
            .copied()
            .filter(|id| {
                let edge = &board.edges[id.index()];
                placer.is_free(board, edge)
                    && coastal_land_tile(board, edge)
                        .is_some_and(|t| board.tiles[t.index()].resource() != Some(*resource))
            })
            .collect();
        let placed = placer.place(board, candidates, Port::Specific(*resource), wanted, rng);
        if placed < wanted {
            warn!(%resource, placed, wanted, "not enough coast for 2:1 ports");
        }
    }

    let placed = placer.place(board, coastal, Port::Generic, generic_target, rng);
    if placed < generic_target {
        warn!(placed, wanted = generic_target, "not enough coast for 3:1 ports");
    }
}
