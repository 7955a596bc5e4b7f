//! Consent Manager
//!
//! Reads and writes the consent slots in the flat store. Storage failures
//! never reach the caller: an unreadable decision counts as "no permission".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{ConsentState, PERMISSION_KEY, PERMISSION_TIMESTAMP_KEY};
use crate::error::Result;
use crate::storage::FlatStore;

/// Persists the user's caching decision.
#[derive(Debug, Clone)]
pub struct ConsentManager {
    store: Arc<dyn FlatStore>,
}

impl ConsentManager {
    pub fn new(store: Arc<dyn FlatStore>) -> Self {
        Self { store }
    }

    // == Has Permission ==
    /// True only when the recorded decision is `accepted`. Fails closed.
    pub fn has_permission(&self) -> bool {
        self.permission() == Some(ConsentState::Accepted)
    }

    // == Permission ==
    /// The recorded decision, None if unset, unreadable or unrecognised.
    pub fn permission(&self) -> Option<ConsentState> {
        match self.store.get_item(PERMISSION_KEY) {
            Ok(Some(raw)) => match raw.parse() {
                Ok(state) => Some(state),
                Err(_) => {
                    warn!("Ignoring unrecognised consent value '{}'", raw);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!("Consent slot unreadable, treating as unset: {}", e);
                None
            }
        }
    }

    // == Set Permission ==
    /// Records `state` together with `now_ms`.
    ///
    /// Fails only when the decision itself could not be stored; a lost
    /// timestamp is logged and leaves the decision in place.
    pub fn set_permission(&self, state: ConsentState, now_ms: u64) -> Result<()> {
        self.store.set_item(PERMISSION_KEY, state.as_str())?;
        if let Err(e) = self
            .store
            .set_item(PERMISSION_TIMESTAMP_KEY, &now_ms.to_string())
        {
            warn!("Cache consent recorded without its timestamp: {}", e);
        }
        debug!("Recorded cache consent: {}", state);
        Ok(())
    }

    // == Should Prompt ==
    /// True when no decision has ever been recorded. An unreadable store
    /// suppresses the prompt, since the answer could not be kept anyway.
    pub fn should_prompt(&self) -> bool {
        matches!(self.store.get_item(PERMISSION_KEY), Ok(None))
    }

    /// When the current decision was recorded.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get_item(PERMISSION_TIMESTAMP_KEY).ok()??;
        let millis: i64 = raw.parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}
