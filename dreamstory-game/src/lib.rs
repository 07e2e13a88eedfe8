//! Dream Story Game Engine
//!
//! Platform-agnostic core of the Dream Story life-simulation mini-game: the
//! clock-driven day cycle, scripted situations, daily actions and the
//! versioned save contract. Presentation and audio live elsewhere.

pub mod actions;
pub mod clock;
pub mod config;
pub mod constants;
pub mod data;
#[cfg(feature = "async")]
pub mod driver;
pub mod location;
pub mod persistence;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use actions::{Action, ActionCatalog, ActionId, DailyActionFlags};
pub use clock::ClockTransition;
pub use config::{ConfigError, SessionConfig};
pub use data::{
    BankError, Choice, Situation, SituationBank, SituationIssue, SituationOutcome,
    stat_for_effect_key,
};
#[cfg(feature = "async")]
pub use driver::{DriverSummary, RealtimeDriver, ShutdownHandle};
pub use location::{Direction, Location};
pub use persistence::{LoadedSave, MemoryStorage, PersistenceError};
pub use resolver::{Feedback, FeedbackTone, TransitionError};
pub use scheduler::{RollSource, ScriptedRolls, SituationScheduler};
pub use session::{GameSession, SessionEvent, TickOutcome, TickReport, TickTicket};
pub use state::SimulationState;
pub use stats::{Mood, StatKey, StatLevel, StatVector};

use anyhow::Context as _;
use constants::SAVE_SLOT;

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the situation feed from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be loaded.
    fn load_situation_bank(&self) -> Result<SituationBank, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting save slot storage.
/// A slot holds one encoded save envelope.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write a slot, replacing any previous content
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save_blob(&self, slot: &str, blob: &str) -> Result<(), Self::Error>;

    /// Read a slot; `None` when nothing was saved
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn load_blob(&self, slot: &str) -> Result<Option<String>, Self::Error>;

    /// Delete a slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be deleted.
    fn delete_save(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Name of the config document [`GameEngine`] asks its loader for.
pub const SESSION_CONFIG_NAME: &str = "session";

/// Main game engine binding a data source to a save store
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load and validate the session config.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader fails or a value is out of range.
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let config: SessionConfig = self
            .data_loader
            .load_config(SESSION_CONFIG_NAME)
            .context("loading session config")?;
        config.validate()?;
        Ok(config)
    }

    /// Start a new game with the specified seed
    ///
    /// # Errors
    ///
    /// Returns an error if the situation feed or config cannot be loaded.
    pub fn create_session(&self, seed: u64) -> anyhow::Result<GameSession> {
        let bank = self
            .data_loader
            .load_situation_bank()
            .context("loading situation feed")?;
        let config = self.session_config()?;
        Ok(GameSession::new(seed, bank, config))
    }

    /// Save a session's state to the default slot
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded or written.
    pub fn save_game(&self, state: &SimulationState) -> anyhow::Result<()> {
        let blob = persistence::save(state, chrono::Utc::now())?;
        self.storage
            .save_blob(SAVE_SLOT, &blob)
            .with_context(|| format!("writing save slot '{SAVE_SLOT}'"))
    }

    /// Resume the saved game, if any, against a freshly loaded feed
    ///
    /// # Errors
    ///
    /// Returns an error if storage, feed or save content cannot be read.
    pub fn load_game(&self, seed: u64) -> anyhow::Result<Option<GameSession>> {
        let Some(blob) = self
            .storage
            .load_blob(SAVE_SLOT)
            .with_context(|| format!("reading save slot '{SAVE_SLOT}'"))?
        else {
            return Ok(None);
        };
        let state = persistence::load(&blob).context("decoding saved game")?;
        // Rehydrate with fresh data
        let bank = self
            .data_loader
            .load_situation_bank()
            .context("loading situation feed")?;
        let config = self.session_config()?;
        Ok(Some(GameSession::resume(seed, state, bank, config)))
    }

    /// Remove the saved game.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be deleted.
    pub fn delete_game(&self) -> Result<(), S::Error> {
        self.storage.delete_save(SAVE_SLOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_situation_bank(&self) -> Result<SituationBank, Self::Error> {
            Ok(SituationBank::empty())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let parsed = serde_json::from_str("{}")
                .or_else(|_| serde_json::from_str("null"))
                .unwrap();
            Ok(parsed)
        }
    }

    #[derive(Clone, Copy, Default)]
    struct BrokenConfigLoader;

    impl DataLoader for BrokenConfigLoader {
        type Error = Infallible;

        fn load_situation_bank(&self) -> Result<SituationBank, Self::Error> {
            Ok(SituationBank::empty())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            Ok(serde_json::from_str(r#"{ "schedulerStride": 0 }"#).unwrap())
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_state() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        let mut session = engine.create_session(0xABCD).unwrap();
        session.request_action(ActionId::Exercise).unwrap();
        session.confirm_action(true).unwrap();
        session.advance_ticks(5);
        let snapshot = session.into_state();
        engine.save_game(&snapshot).unwrap();

        let loaded = engine.load_game(7).unwrap().expect("save exists");
        assert_eq!(loaded.snapshot(), &snapshot);

        engine.delete_game().unwrap();
        assert!(engine.load_game(7).unwrap().is_none());
    }

    #[test]
    fn corrupt_save_is_an_error_not_a_panic() {
        let engine = GameEngine::new(FixtureLoader, MemoryStorage::default());
        engine.storage().put(SAVE_SLOT, "{{{");
        assert!(engine.load_game(1).is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let engine = GameEngine::new(BrokenConfigLoader, MemoryStorage::default());
        let err = engine.create_session(1).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }
}
