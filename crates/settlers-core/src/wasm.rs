//! WebAssembly bindings for the rules engine.
//!
//! A renderer holds one `WasmGame`, reads JSON snapshots from it and feeds
//! actions back in as JSON.

use crate::actions::GameAction;
use crate::bot::{Bot, BotDifficulty};
use crate::config::GameConfig;
use crate::game::GameState;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {err}"))
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game from a JSON configuration; `"{}"` gives the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmGame, JsValue> {
        let config = GameConfig::from_json(config_json).map_err(|e| js_error("Invalid config", e))?;
        let state = GameState::new(&config).map_err(|e| js_error("Cannot create game", e))?;
        Ok(WasmGame { state })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<String, JsValue> {
        self.state.to_json().map_err(|e| js_error("Cannot serialize state", e))
    }

    /// Player who must act next, if the game is still running
    #[wasm_bindgen(js_name = getExpectedActor)]
    pub fn get_expected_actor(&self) -> Option<u8> {
        self.state.expected_actor()
    }

    /// Legal actions for a player as a JSON array
    #[wasm_bindgen(js_name = getLegalActions)]
    pub fn get_legal_actions(&self, player: u8) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.legal_actions(player))
            .map_err(|e| js_error("Cannot serialize actions", e))
    }

    /// Apply an action given as JSON. Returns the events as JSON; a rejected
    /// action leaves the game unchanged and returns the reason.
    pub fn dispatch(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction =
            serde_json::from_str(action_json).map_err(|e| js_error("Invalid action JSON", e))?;
        let transition = self
            .state
            .apply_action(player, &action)
            .map_err(|e| js_error("Action rejected", e))?;
        self.state = transition.state;
        serde_json::to_string(&transition.events).map_err(|e| js_error("Cannot serialize events", e))
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.state.winner
    }

    /// A bot's suggested action for a player; difficulty is "Random" or "Builder"
    #[wasm_bindgen(js_name = getBotAction)]
    pub fn get_bot_action(&self, player: u8, difficulty: &str) -> Result<String, JsValue> {
        let difficulty = match difficulty {
            "Random" => BotDifficulty::Random,
            _ => BotDifficulty::Builder,
        };
        let mut bot = Bot::new(player, difficulty);
        serde_json::to_string(&bot.choose_action(&self.state))
            .map_err(|e| js_error("Cannot serialize action", e))
    }
}
