//! Coarse game state and move budget.

use cube_slide_core::{Event, GameState};
use log::info;

/// Tracks the coarse game state and the move budget of the running level.
#[derive(Clone, Debug)]
pub struct GameSession {
    state: GameState,
    level: u32,
    moves_left: u32,
    max_moves: u32,
}

impl GameSession {
    /// Creates a session sitting in the menu.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GameState::Menu,
            level: 0,
            moves_left: 0,
            max_moves: 0,
        }
    }

    /// Current coarse state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Level number of the running (or last) level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Moves left in the budget.
    #[must_use]
    pub const fn moves_left(&self) -> u32 {
        self.moves_left
    }

    /// Budget the level started with.
    #[must_use]
    pub const fn max_moves(&self) -> u32 {
        self.max_moves
    }

    /// Whether the session accepts moves.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Starts a level with a fresh budget.
    pub fn start_level(&mut self, level: u32, moves: u32, out_events: &mut Vec<Event>) {
        self.level = level;
        self.max_moves = moves;
        self.moves_left = moves;
        self.change_state(GameState::Playing, out_events);
        out_events.push(Event::MovesChanged { moves_left: moves });
        info!("level {level} started with {moves} moves");
    }

    /// Spends one move. Refused when the budget is empty or the session is
    /// not playing.
    pub fn use_move(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.moves_left == 0 || !self.is_playing() {
            return false;
        }
        self.moves_left -= 1;
        out_events.push(Event::MovesChanged {
            moves_left: self.moves_left,
        });
        true
    }

    /// Grants extra moves.
    pub fn add_moves(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        self.moves_left = self.moves_left.saturating_add(amount);
        out_events.push(Event::MovesChanged {
            moves_left: self.moves_left,
        });
    }

    /// Marks the level complete. Only valid while playing.
    pub fn complete_level(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_playing() {
            return;
        }
        self.change_state(GameState::LevelComplete, out_events);
        out_events.push(Event::LevelCompleted { level: self.level });
        info!(
            "level {} complete, {} of {} moves used",
            self.level,
            self.max_moves.saturating_sub(self.moves_left),
            self.max_moves
        );
    }

    /// Marks the level failed. Only valid while playing.
    pub fn fail_level(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_playing() {
            return;
        }
        self.change_state(GameState::LevelFailed, out_events);
        out_events.push(Event::LevelFailed { level: self.level });
        info!("level {} failed", self.level);
    }

    /// Switches between playing and paused; other states are left alone.
    pub fn toggle_pause(&mut self, out_events: &mut Vec<Event>) {
        match self.state {
            GameState::Playing => self.change_state(GameState::Paused, out_events),
            GameState::Paused => self.change_state(GameState::Playing, out_events),
            _ => {}
        }
    }

    /// Returns to the menu.
    pub fn return_to_menu(&mut self, out_events: &mut Vec<Event>) {
        self.change_state(GameState::Menu, out_events);
    }

    fn change_state(&mut self, state: GameState, out_events: &mut Vec<Event>) {
        self.state = state;
        out_events.push(Event::GameStateChanged { state });
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
