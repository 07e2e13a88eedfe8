//! Save envelope encoding and the whole-state load contract.
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::GameStorage;
use crate::constants::SAVE_SCHEMA_VERSION;
use crate::state::SimulationState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("save is not readable: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("save has no game state")]
    MissingState,
    #[error("save version '{0}' is not supported")]
    UnsupportedVersion(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveEnvelope<'a> {
    game_state: &'a SimulationState,
    saved_at: DateTime<Utc>,
    version: &'static str,
}

/// A decoded save slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSave {
    pub state: SimulationState,
    pub saved_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

/// Encode the whole state into the versioned envelope.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn save(state: &SimulationState, saved_at: DateTime<Utc>) -> Result<String, PersistenceError> {
    serde_json::to_string(&SaveEnvelope {
        game_state: state,
        saved_at,
        version: SAVE_SCHEMA_VERSION,
    })
    .map_err(PersistenceError::Encode)
}

/// Decode a save blob into a sanitized state.
///
/// # Errors
///
/// See [`read_envelope`].
pub fn load(blob: &str) -> Result<SimulationState, PersistenceError> {
    read_envelope(blob).map(|loaded| loaded.state)
}

/// Decode a save blob with its metadata. The blob is parsed completely
/// before anything is returned, so a failed load never yields partial state.
///
/// # Errors
///
/// Returns [`PersistenceError::Malformed`] for unparseable content,
/// [`PersistenceError::MissingState`] when `gameState` is absent or null and
/// [`PersistenceError::UnsupportedVersion`] for a different major version.
pub fn read_envelope(blob: &str) -> Result<LoadedSave, PersistenceError> {
    let mut envelope: Value = serde_json::from_str(blob).map_err(PersistenceError::Malformed)?;

    let version = match envelope.get("version") {
        None | Some(Value::Null) => None,
        Some(Value::String(version)) => Some(version.clone()),
        Some(other) => return Err(PersistenceError::UnsupportedVersion(other.to_string())),
    };
    if let Some(version) = &version
        && major(version) != major(SAVE_SCHEMA_VERSION)
    {
        return Err(PersistenceError::UnsupportedVersion(version.clone()));
    }

    let game_state = match envelope.get_mut("gameState").map(Value::take) {
        None | Some(Value::Null) => return Err(PersistenceError::MissingState),
        Some(game_state) => game_state,
    };
    let mut state: SimulationState =
        serde_json::from_value(game_state).map_err(PersistenceError::Malformed)?;
    state.sanitize();

    let saved_at = envelope
        .get("savedAt")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|stamp| stamp.with_timezone(&Utc));

    Ok(LoadedSave {
        state,
        saved_at,
        version,
    })
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version).trim()
}

/// In-process save slots, for tests and embedders without durable storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saves: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a slot with raw content.
    pub fn put(&self, slot: &str, blob: impl Into<String>) {
        self.saves.borrow_mut().insert(slot.to_string(), blob.into());
    }

    #[must_use]
    pub fn raw(&self, slot: &str) -> Option<String> {
        self.saves.borrow().get(slot).cloned()
    }
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn save_blob(&self, slot: &str, blob: &str) -> Result<(), Self::Error> {
        self.put(slot, blob);
        Ok(())
    }

    fn load_blob(&self, slot: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(slot))
    }

    fn delete_save(&self, slot: &str) -> Result<(), Self::Error> {
        self.saves.borrow_mut().remove(slot);
        Ok(())
    }
}
