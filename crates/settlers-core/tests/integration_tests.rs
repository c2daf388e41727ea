//! Integration tests for the rules engine.
//!
//! These tests drive complete games through the public API, from setup
//! through production, the robber and building.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use settlers_core::game::RobberStep;
use settlers_core::ledger::{self, ResourceAccounts};
use settlers_core::rules;
use settlers_core::*;
use std::sync::Arc;

/// Helper to get any legal action of a specific type
fn find_action<F>(game: &GameState, player: PlayerId, filter: F) -> Option<GameAction>
where
    F: Fn(&GameAction) -> bool,
{
    game.legal_actions(player).into_iter().find(filter)
}

fn apply(game: &GameState, player: PlayerId, action: GameAction) -> GameState {
    game.apply_action(player, &action)
        .unwrap_or_else(|e| panic!("{action:?} by {player} rejected: {e}"))
        .state
}

/// Run through the whole setup phase taking the first legal action each time
fn complete_setup(game: &mut GameState) {
    let max_iterations = 100;
    for _ in 0..max_iterations {
        if game.phase != GamePhase::Setup {
            break;
        }
        let player = game.expected_actor().unwrap();
        let action = game.legal_actions(player).into_iter().next().unwrap();
        *game = apply(game, player, action);
    }

    assert_eq!(
        game.phase,
        GamePhase::DiceRoll,
        "Game should complete setup within {} iterations",
        max_iterations
    );
}

/// Play a seeded game with builder bots, returning the final state and the
/// event log
fn play(seed: u64, players: u8, max_actions: usize) -> (GameState, Vec<GameEvent>) {
    let mut game = GameState::standard(players, seed).unwrap();
    let mut bots: Vec<Bot> = (0..players)
        .map(|id| Bot::with_seed(id, BotDifficulty::Builder, seed ^ u64::from(id)))
        .collect();
    let mut log = Vec::new();

    for _ in 0..max_actions {
        let Some(actor) = game.expected_actor() else {
            break;
        };
        let Some(action) = bots[actor as usize].choose_action(&game) else {
            break;
        };
        let transition = game
            .apply_action(actor, &action)
            .unwrap_or_else(|e| panic!("bot chose {action:?} but it was rejected: {e}"));
        log.extend(transition.events);
        game = transition.state;
    }
    (game, log)
}

fn assert_conserved(game: &GameState, bank_per_resource: u32) {
    for resource in Resource::ALL {
        assert_eq!(
            game.resource_total(resource),
            bank_per_resource,
            "{resource} is not conserved"
        );
    }
}

#[test]
fn test_setup_is_a_snake_draft() {
    let mut game = GameState::standard(3, 10).unwrap();
    let mut settlers = Vec::new();

    while game.phase == GamePhase::Setup {
        let player = game.expected_actor().unwrap();
        let action = game.legal_actions(player).into_iter().next().unwrap();
        if matches!(action, GameAction::PlaceSettlement { .. }) {
            settlers.push(player);
        }
        game = apply(&game, player, action);
    }

    assert_eq!(settlers, vec![0, 1, 2, 2, 1, 0]);
    assert_eq!(game.expected_actor(), Some(0));
    assert_eq!(game.turn_number, 1);
    for player in &game.players {
        assert_eq!(player.settlements_remaining(), 3);
        assert_eq!(player.roads_remaining(), 13);
        assert_eq!(player.victory_points, 2);
    }
}

#[test]
fn test_distance_rule_removes_neighbours() {
    let game = GameState::standard(2, 10).unwrap();
    let vertex = rules::legal_setup_settlement_sites(&game.occupancy())[0];
    let next = apply(&game, 0, GameAction::PlaceSettlement { vertex });

    let sites = rules::legal_setup_settlement_sites(&next.occupancy());
    assert!(!sites.contains(&vertex));
    for neighbour in &next.board.vertex(vertex).unwrap().adjacent_vertices {
        assert!(!sites.contains(neighbour));
    }
}

#[test]
fn test_second_settlement_pays_adjacent_tiles() {
    let mut game = GameState::standard(2, 31).unwrap();

    // An inland corner whose three tiles become wheat, sheep and desert
    let target = game
        .board
        .vertices
        .iter()
        .find(|v| {
            v.adjacent_tiles.len() == 3
                && v.adjacent_tiles
                    .iter()
                    .all(|t| game.board.tiles[t.index()].is_land())
        })
        .map(|v| v.id)
        .unwrap();
    let tiles = game.board.vertex(target).unwrap().adjacent_tiles.clone();
    {
        let board = Arc::make_mut(&mut game.board);
        let kinds = [
            TileKind::Resource(Resource::Wheat),
            TileKind::Resource(Resource::Sheep),
            TileKind::Desert,
        ];
        for (tile, kind) in tiles.iter().zip(kinds) {
            board.tiles[tile.index()].kind = kind;
        }
        board.tiles[tiles[2].index()].token = None;
    }

    let near_target = |game: &GameState, v: VertexId| {
        v == target || game.board.vertex(target).unwrap().adjacent_vertices.contains(&v)
    };
    let place_away = |game: &GameState, player: PlayerId| {
        let vertex = rules::legal_setup_settlement_sites(&game.occupancy())
            .into_iter()
            .find(|v| !near_target(game, *v))
            .unwrap();
        let game = apply(game, player, GameAction::PlaceSettlement { vertex });
        let edge = rules::legal_setup_road_sites(&game.occupancy(), vertex)[0];
        apply(&game, player, GameAction::PlaceRoad { edge })
    };

    game = place_away(&game, 0);
    game = place_away(&game, 1);
    game = place_away(&game, 1);
    assert_eq!(game.expected_actor(), Some(0));
    let before = game.players[0].resources;

    let transition = game
        .apply_action(0, &GameAction::PlaceSettlement { vertex: target })
        .unwrap();
    let after = transition.state;
    let gained = ResourceHand::with_amounts(
        after.players[0].resources.wood - before.wood,
        after.players[0].resources.brick - before.brick,
        after.players[0].resources.sheep - before.sheep,
        after.players[0].resources.wheat - before.wheat,
        after.players[0].resources.ore - before.ore,
    );
    assert_eq!(gained, ResourceHand::with_amounts(0, 0, 1, 1, 0));
    assert!(transition.events.contains(&GameEvent::StartingResources {
        player: 0,
        resources: gained,
    }));
    assert_conserved(&after, 19);
}

#[test]
fn test_seven_collects_discards_in_order() {
    let mut game = GameState::standard(3, 4).unwrap();
    complete_setup(&mut game);

    // Replace whatever setup produced with hands of 9, 6 and 4 cards
    for player in 0..3 {
        let hand = game.players[player as usize].resources;
        ledger::transfer(&mut game, Holder::Player(player), Holder::Bank, &hand).unwrap();
    }
    let hands = [
        ResourceHand::with_amounts(3, 2, 2, 1, 1),
        ResourceHand::with_amounts(2, 1, 1, 1, 1),
        ResourceHand::with_amounts(1, 1, 1, 1, 0),
    ];
    for (player, hand) in hands.iter().enumerate() {
        ledger::transfer(&mut game, Holder::Bank, Holder::Player(player as u8), hand).unwrap();
    }

    let rolled = apply(&game, 0, GameAction::RollDice { roll: 7 });
    assert_eq!(rolled.phase, GamePhase::Robber);
    let robber = rolled.robber.clone().unwrap();
    assert_eq!(robber.pending_discards, vec![0]);
    assert_eq!(robber.discard_amounts.get(&0), Some(&4));

    let discard = find_action(&rolled, 0, |a| {
        matches!(a, GameAction::DiscardResources { .. })
    })
    .unwrap();
    let discarded = apply(&rolled, 0, discard);
    assert_eq!(discarded.players[0].resources.total(), 5);
    assert_eq!(discarded.robber.as_ref().unwrap().step, RobberStep::Move);
    assert_eq!(discarded.expected_actor(), Some(0));
    assert_conserved(&discarded, 19);
}

#[test]
fn test_road_without_brick_changes_nothing() {
    let mut game = GameState::standard(2, 4).unwrap();
    complete_setup(&mut game);
    let mut game = apply(&game, 0, GameAction::RollDice { roll: 2 });
    assert_eq!(game.phase, GamePhase::BuildingTrading);
    let brick = game.players[0].resources.brick;
    ledger::transfer(
        &mut game,
        Holder::Player(0),
        Holder::Bank,
        &ResourceHand::single(Resource::Brick, brick),
    )
    .unwrap();

    let edge = rules::legal_road_sites(&game.occupancy(), 0)[0];
    let action = GameAction::BuildRoad { edge };
    assert_eq!(
        game.apply_action(0, &action).unwrap_err(),
        ActionError::CannotAfford
    );
    assert_eq!(game.dispatch(0, &action), game);
}

#[test]
fn test_exchange_is_all_or_nothing() {
    let mut game = GameState::standard(2, 4).unwrap();
    ledger::transfer(
        &mut game,
        Holder::Bank,
        Holder::Player(0),
        &ResourceHand::single(Resource::Wood, 2),
    )
    .unwrap();

    let result = ledger::exchange(
        &mut game,
        Holder::Player(0),
        Holder::Player(1),
        &ResourceHand::single(Resource::Wood, 2),
        &ResourceHand::single(Resource::Ore, 1),
    );
    assert!(result.is_err());
    assert_eq!(
        game.hand(Holder::Player(0)),
        Some(&ResourceHand::single(Resource::Wood, 2))
    );
    assert_eq!(game.hand(Holder::Player(1)), Some(&ResourceHand::new()));
}

#[test]
fn test_actions_from_json() {
    let game = GameState::standard(2, 4).unwrap();
    let vertex = rules::legal_setup_settlement_sites(&game.occupancy())[0];
    let json = format!(r#"{{"type": "PlaceSettlement", "vertex": {}}}"#, vertex.0);
    let action: GameAction = serde_json::from_str(&json).unwrap();

    let next = game.dispatch(0, &action);
    assert_eq!(next.players[0].settlements, vec![vertex]);
}

#[test]
fn test_first_to_threshold_in_turn_order_wins() {
    let mut game = GameState::new(&GameConfig {
        players: 2,
        winning_points: 3,
        seed: 9,
        ..GameConfig::default()
    })
    .unwrap();
    complete_setup(&mut game);
    game.phase = GamePhase::BuildingTrading;
    game.dice_rolled = true;

    // Both players reach 3 points with one more card; player 1 is later in turn order
    game.players[1].dev_cards.add(DevelopmentCard::VictoryPoint);
    game.players[0].dev_cards.add(DevelopmentCard::VictoryPoint);
    game.dev_deck.push(DevelopmentCard::Knight);
    let cost = ResourceHand::with_amounts(0, 0, 1, 1, 1);
    let hand = game.players[0].resources;
    ledger::transfer(&mut game, Holder::Player(0), Holder::Bank, &hand).unwrap();
    ledger::transfer(&mut game, Holder::Bank, Holder::Player(0), &cost).unwrap();

    let next = apply(&game, 0, GameAction::BuyDevCard);
    assert_eq!(next.phase, GamePhase::GameOver);
    assert_eq!(next.winner, Some(0));
    assert!(next.legal_actions(0).is_empty());
    assert_eq!(next.expected_actor(), None);
}

#[test]
fn test_bot_game_keeps_resources_conserved() {
    let (game, log) = play(7, 4, 3000);
    assert_conserved(&game, 19);
    assert!(log.contains(&GameEvent::SetupComplete));
    assert!(game.turn_number > 1);
}

#[test]
fn test_same_seed_same_game() {
    let (a, log_a) = play(21, 3, 1500);
    let (b, log_b) = play(21, 3, 1500);
    assert_eq!(a, b);
    assert_eq!(log_a, log_b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_resources_conserved(seed in any::<u64>(), players in 2u8..=4) {
        let (game, _) = play(seed, players, 800);
        for resource in Resource::ALL {
            prop_assert_eq!(game.resource_total(resource), 19);
        }
        let pieces_ok = game.players.iter().all(|p| {
            p.settlements.len() <= 5 && p.cities.len() <= 4 && p.roads.len() <= 15
        });
        prop_assert!(pieces_ok);
    }

    #[test]
    fn prop_replay_is_deterministic(seed in any::<u64>()) {
        let (a, _) = play(seed, 3, 400);
        let (b, _) = play(seed, 3, 400);
        prop_assert_eq!(a, b);
    }
}
