//! Victory point accounting and the win check.

use crate::actions::GameEvent;
use crate::board::PlayerId;
use crate::game::{GamePhase, GameState};
use crate::player::PlayerState;
use tracing::info;

/// Points everyone can see: 1 per settlement, 2 per city
pub fn visible_victory_points(player: &PlayerState) -> u32 {
    player.settlements.len() as u32 + 2 * player.cities.len() as u32
}

/// Visible points plus victory point cards
pub fn total_victory_points(player: &PlayerState) -> u32 {
    visible_victory_points(player) + player.hidden_vp()
}

impl GameState {
    /// Recompute every player's visible score from the board
    pub fn refresh_scores(&mut self) {
        for player in &mut self.players {
            player.victory_points = visible_victory_points(player);
        }
    }

    /// First player in turn order at or above the threshold
    pub fn find_winner(&self) -> Option<PlayerId> {
        self.turn_order.iter().copied().find(|id| {
            self.player(*id)
                .is_some_and(|p| total_victory_points(p) >= self.winning_points)
        })
    }

    /// End the game if someone has reached the threshold
    pub(crate) fn check_for_winner(&mut self, events: &mut Vec<GameEvent>) {
        let Some(winner) = self.find_winner() else {
            return;
        };
        let victory_points = self.player(winner).map(total_victory_points).unwrap_or(0);

        self.phase = GamePhase::GameOver;
        self.winner = Some(winner);
        self.trade_offer = None;
        self.dev_card_action = None;
        info!(
            winner,
            victory_points,
            turn = self.turn_number,
            "game over"
        );
        events.push(GameEvent::GameWon {
            player: winner,
            victory_points,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::VertexId;
    use crate::player::DevelopmentCard;

    #[test]
    fn test_visible_and_hidden_points() {
        let mut player = PlayerState::new(0);
        player.settlements = vec![VertexId(1), VertexId(2)];
        player.cities = vec![VertexId(3)];
        player.dev_cards.add(DevelopmentCard::VictoryPoint);

        assert_eq!(visible_victory_points(&player), 4);
        assert_eq!(total_victory_points(&player), 5);
    }

    #[test]
    fn test_tie_goes_to_turn_order() {
        let mut state = GameState::standard(3, 4).unwrap();
        state.winning_points = 2;
        state.players[2].settlements = vec![VertexId(1), VertexId(2)];
        state.players[1].cities = vec![VertexId(3)];

        let mut events = Vec::new();
        state.check_for_winner(&mut events);
        assert_eq!(state.winner, Some(1));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(
            events,
            vec![GameEvent::GameWon {
                player: 1,
                victory_points: 2
            }]
        );
    }

    #[test]
    fn test_below_threshold_keeps_playing() {
        let mut state = GameState::standard(2, 4).unwrap();
        state.players[0].settlements = vec![VertexId(1)];
        let mut events = Vec::new();
        state.check_for_winner(&mut events);
        assert!(events.is_empty());
        assert_eq!(state.winner, None);
    }
}
