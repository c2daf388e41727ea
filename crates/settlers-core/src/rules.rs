//! Placement rules.
//!
//! Pure legality checks over the board geometry and the current ownership
//! of vertices and edges. Nothing here mutates state except
//! [`grant_ports_for_vertex`], which only ever sets port flags.

use crate::board::{
    BoardGeometry, Building, EdgeId, EdgeState, PlayerId, VertexId, VertexState,
};
use crate::player::PortAccess;

/// Read-only view of the board plus who owns what
#[derive(Debug, Clone, Copy)]
pub struct Occupancy<'a> {
    pub board: &'a BoardGeometry,
    pub vertices: &'a [VertexState],
    pub edges: &'a [EdgeState],
}

impl<'a> Occupancy<'a> {
    fn vertex_state(&self, vertex: VertexId) -> VertexState {
        self.vertices.get(vertex.index()).copied().unwrap_or_default()
    }

    fn edge_owner(&self, edge: EdgeId) -> Option<PlayerId> {
        self.edges.get(edge.index()).and_then(|e| e.owner)
    }
}

// ==================== Land ====================

/// A vertex is buildable when at least one adjacent tile is land.
pub fn is_buildable_land_vertex(board: &BoardGeometry, vertex: VertexId) -> bool {
    board.vertex(vertex).is_some_and(|v| {
        v.adjacent_tiles
            .iter()
            .any(|t| board.tile(*t).is_some_and(|tile| tile.is_land()))
    })
}

/// An edge is buildable when at least one adjacent tile is land.
pub fn is_buildable_land_edge(board: &BoardGeometry, edge: EdgeId) -> bool {
    board.edge(edge).is_some_and(|e| {
        e.adjacent_tiles
            .iter()
            .any(|t| board.tile(*t).is_some_and(|tile| tile.is_land()))
    })
}

// ==================== Distance and network ====================

/// No building may stand on a vertex next to this one.
pub fn satisfies_distance_rule(occ: &Occupancy, vertex: VertexId) -> bool {
    occ.board.vertex(vertex).is_some_and(|v| {
        v.adjacent_vertices
            .iter()
            .all(|n| occ.vertex_state(*n).is_empty())
    })
}

/// The player owns a road ending at `vertex`
pub fn has_road_at(occ: &Occupancy, player: PlayerId, vertex: VertexId) -> bool {
    occ.board
        .edges_at_vertex(vertex)
        .iter()
        .any(|e| occ.edge_owner(*e) == Some(player))
}

/// One end of `edge` holds the player's building or one of their roads.
pub fn touches_road_network(occ: &Occupancy, player: PlayerId, edge: EdgeId) -> bool {
    let Some(e) = occ.board.edge(edge) else {
        return false;
    };
    e.vertices.iter().any(|v| {
        occ.vertex_state(*v).owner == Some(player) || has_road_at(occ, player, *v)
    })
}

/// Add every port on an edge touching `vertex` to the player's flags.
pub fn grant_ports_for_vertex(board: &BoardGeometry, vertex: VertexId, ports: &mut PortAccess) {
    for edge in board.edges_at_vertex(vertex) {
        if let Some(port) = board.edge(*edge).and_then(|e| e.port) {
            ports.grant(port);
        }
    }
}

// ==================== Setup placement ====================

/// Empty land vertex that respects the distance rule
pub fn can_place_setup_settlement(occ: &Occupancy, vertex: VertexId) -> bool {
    is_buildable_land_vertex(occ.board, vertex)
        && occ.vertex_state(vertex).is_empty()
        && satisfies_distance_rule(occ, vertex)
}

/// Free land edge touching the settlement just placed
pub fn can_place_setup_road(occ: &Occupancy, edge: EdgeId, settlement: VertexId) -> bool {
    is_buildable_land_edge(occ.board, edge)
        && occ.edge_owner(edge).is_none()
        && occ.board.edge(edge).is_some_and(|e| e.touches(settlement))
}

// ==================== Regular building ====================

/// Empty land vertex, distance rule, and one of the player's roads ends here.
pub fn can_build_settlement(occ: &Occupancy, player: PlayerId, vertex: VertexId) -> bool {
    can_place_setup_settlement(occ, vertex) && has_road_at(occ, player, vertex)
}

/// The player's own settlement
pub fn can_build_city(occ: &Occupancy, player: PlayerId, vertex: VertexId) -> bool {
    let state = occ.vertex_state(vertex);
    state.building == Building::Settlement && state.owner == Some(player)
}

/// Free land edge connected to the player's network
pub fn can_build_road(occ: &Occupancy, player: PlayerId, edge: EdgeId) -> bool {
    is_buildable_land_edge(occ.board, edge)
        && occ.edge_owner(edge).is_none()
        && touches_road_network(occ, player, edge)
}

// ==================== Enumeration ====================

fn all_vertices(board: &BoardGeometry) -> impl Iterator<Item = VertexId> + '_ {
    board.vertices.iter().map(|v| v.id)
}

fn all_edges(board: &BoardGeometry) -> impl Iterator<Item = EdgeId> + '_ {
    board.edges.iter().map(|e| e.id)
}

pub fn legal_setup_settlement_sites(occ: &Occupancy) -> Vec<VertexId> {
    all_vertices(occ.board)
        .filter(|v| can_place_setup_settlement(occ, *v))
        .collect()
}

pub fn legal_setup_road_sites(occ: &Occupancy, settlement: VertexId) -> Vec<EdgeId> {
    occ.board
        .edges_at_vertex(settlement)
        .iter()
        .copied()
        .filter(|e| can_place_setup_road(occ, *e, settlement))
        .collect()
}

pub fn legal_settlement_sites(occ: &Occupancy, player: PlayerId) -> Vec<VertexId> {
    all_vertices(occ.board)
        .filter(|v| can_build_settlement(occ, player, *v))
        .collect()
}

pub fn legal_city_sites(occ: &Occupancy, player: PlayerId) -> Vec<VertexId> {
    all_vertices(occ.board)
        .filter(|v| can_build_city(occ, player, *v))
        .collect()
}

pub fn legal_road_sites(occ: &Occupancy, player: PlayerId) -> Vec<EdgeId> {
    all_edges(occ.board)
        .filter(|e| can_build_road(occ, player, *e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Port;
    use crate::generator::{generate, TileMap};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        board: BoardGeometry,
        vertices: Vec<VertexState>,
        edges: Vec<EdgeState>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut rng = StdRng::seed_from_u64(11);
            let board = generate(&TileMap::standard(), &mut rng).unwrap();
            let vertices = vec![VertexState::default(); board.vertices.len()];
            let edges = vec![EdgeState::default(); board.edges.len()];
            Self {
                board,
                vertices,
                edges,
            }
        }

        fn occ(&self) -> Occupancy<'_> {
            Occupancy {
                board: &self.board,
                vertices: &self.vertices,
                edges: &self.edges,
            }
        }

        /// A land vertex whose three neighbours are all land vertices
        fn inland_vertex(&self) -> VertexId {
            self.board
                .vertices
                .iter()
                .find(|v| {
                    v.adjacent_tiles.len() == 3
                        && v.adjacent_tiles
                            .iter()
                            .all(|t| self.board.tiles[t.index()].is_land())
                })
                .map(|v| v.id)
                .unwrap()
        }

        fn settle(&mut self, vertex: VertexId, player: PlayerId) {
            self.vertices[vertex.index()] = VertexState {
                building: Building::Settlement,
                owner: Some(player),
            };
        }
    }

    #[test]
    fn test_sea_only_sites_are_not_buildable() {
        let fx = Fixture::new();
        let sea_vertex = fx
            .board
            .vertices
            .iter()
            .find(|v| {
                v.adjacent_tiles
                    .iter()
                    .all(|t| fx.board.tiles[t.index()].kind.is_sea())
            })
            .unwrap();
        assert!(!is_buildable_land_vertex(&fx.board, sea_vertex.id));
        assert!(is_buildable_land_vertex(&fx.board, fx.inland_vertex()));
        assert_eq!(legal_setup_settlement_sites(&fx.occ()).len(), 54);
    }

    #[test]
    fn test_distance_rule() {
        let mut fx = Fixture::new();
        let v = fx.inland_vertex();
        fx.settle(v, 0);

        for n in fx.board.vertices[v.index()].adjacent_vertices.clone() {
            assert!(!satisfies_distance_rule(&fx.occ(), n));
            assert!(!can_place_setup_settlement(&fx.occ(), n));
        }
        assert!(!can_place_setup_settlement(&fx.occ(), v));
    }

    #[test]
    fn test_road_network_rule() {
        let mut fx = Fixture::new();
        let v = fx.inland_vertex();
        fx.settle(v, 0);

        let first = fx.board.edges_at_vertex(v)[0];
        assert!(can_build_road(&fx.occ(), 0, first));
        assert!(!can_build_road(&fx.occ(), 1, first));

        fx.edges[first.index()].owner = Some(0);
        let far_end = fx.board.edges[first.index()]
            .vertices
            .into_iter()
            .find(|x| *x != v)
            .unwrap();
        let extension = fx
            .board
            .edges_at_vertex(far_end)
            .iter()
            .copied()
            .find(|e| *e != first)
            .unwrap();
        assert!(touches_road_network(&fx.occ(), 0, extension));
        assert!(can_build_road(&fx.occ(), 0, extension));
        assert!(!can_build_road(&fx.occ(), 0, first), "edge already owned");
    }

    #[test]
    fn test_settlement_needs_own_road() {
        let mut fx = Fixture::new();
        let v = fx.inland_vertex();
        assert!(!can_build_settlement(&fx.occ(), 0, v));

        let edge = fx.board.edges_at_vertex(v)[0];
        fx.edges[edge.index()].owner = Some(0);
        assert!(can_build_settlement(&fx.occ(), 0, v));
        assert!(!can_build_settlement(&fx.occ(), 1, v));
    }

    #[test]
    fn test_city_needs_own_settlement() {
        let mut fx = Fixture::new();
        let v = fx.inland_vertex();
        assert!(!can_build_city(&fx.occ(), 0, v));
        fx.settle(v, 0);
        assert!(can_build_city(&fx.occ(), 0, v));
        assert!(!can_build_city(&fx.occ(), 1, v));
        assert_eq!(legal_city_sites(&fx.occ(), 0), vec![v]);
    }

    #[test]
    fn test_setup_road_must_touch_settlement() {
        let mut fx = Fixture::new();
        let v = fx.inland_vertex();
        fx.settle(v, 0);
        let sites = legal_setup_road_sites(&fx.occ(), v);
        assert_eq!(sites.len(), 3);
        for e in sites {
            assert!(fx.board.edges[e.index()].touches(v));
        }
    }

    #[test]
    fn test_port_grant_is_monotonic() {
        let fx = Fixture::new();
        let (edge, port) = fx.board.ports().next().unwrap();
        let vertex = edge.vertices[0];

        let mut ports = PortAccess::default();
        grant_ports_for_vertex(&fx.board, vertex, &mut ports);
        match port {
            Port::Generic => assert!(ports.generic),
            Port::Specific(r) => assert!(ports.has_specific(r)),
        }

        let before = ports.clone();
        grant_ports_for_vertex(&fx.board, fx.inland_vertex(), &mut ports);
        assert_eq!(ports, before);
    }
}
