//! `GameEngine`: the facade a chat transport talks to.

use std::sync::Arc;

use tracing::info;

use questbot_core::{
    Clock, DiceRoller, EngineConfig, PlayerKey, PlayerSession, StdDice, SystemClock, WorldStore,
};

use crate::error::Result;
use crate::machine::{Env, Reply};
use crate::render;
use crate::state::InteractionState;
use crate::store::{InMemorySessionStore, SessionStore};

/// Replies to one event plus the state the conversation ended up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Messages to send, in order. May be empty.
    pub replies: Vec<Reply>,
    /// Conversation state after the event.
    pub state: InteractionState,
}

/// Routes `(player key, text)` events to per-player conversations.
pub struct GameEngine {
    world: Arc<dyn WorldStore>,
    sessions: Arc<dyn SessionStore>,
    dice: Arc<dyn DiceRoller>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("sessions", &self.sessions.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Engine with in-memory sessions, the system clock and dice seeded
    /// from `config.combat.seed` (or the OS when unset).
    #[must_use]
    pub fn new(world: Arc<dyn WorldStore>, config: EngineConfig) -> Self {
        let dice: Arc<dyn DiceRoller> = match config.combat.seed {
            Some(seed) => Arc::new(StdDice::seeded(seed)),
            None => Arc::new(StdDice::from_entropy()),
        };
        Self {
            world,
            sessions: Arc::new(InMemorySessionStore::new()),
            dice,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the dice.
    #[must_use]
    pub fn with_dice(mut self, dice: Arc<dyn DiceRoller>) -> Self {
        self.dice = dice;
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the session store.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handle one text event from `key`.
    ///
    /// The player's conversation stays locked for the whole event, so
    /// racing events from one player are applied one after another.
    ///
    /// # Errors
    /// `ChatError::Internal` on world-data integrity faults; the
    /// conversation is left as it was.
    pub fn handle(&self, key: PlayerKey, text: &str) -> Result<Response> {
        let (handle, created) = self.sessions.get_or_create(key);
        let mut conversation = handle.lock();

        if created {
            info!(player = %key, "first contact");
            return Ok(Response {
                replies: vec![Reply::plain(render::name_prompt())],
                state: conversation.state(),
            });
        }

        let env = Env {
            key,
            world: &*self.world,
            dice: &*self.dice,
            now: self.clock.now(),
            config: &self.config,
        };
        let replies = conversation.handle(text, &env)?;
        Ok(Response {
            replies,
            state: conversation.state(),
        })
    }

    /// Current state of `key`'s conversation.
    #[must_use]
    pub fn state(&self, key: PlayerKey) -> Option<InteractionState> {
        self.sessions.get(key).map(|h| h.lock().state())
    }

    /// Read the player session of `key`, if a hero has been named.
    pub fn with_session<R>(&self, key: PlayerKey, f: impl FnOnce(&PlayerSession) -> R) -> Option<R> {
        let handle = self.sessions.get(key)?;
        let conversation = handle.lock();
        conversation.session().map(f)
    }

    /// Number of known conversations.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
