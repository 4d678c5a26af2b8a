use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace, warn};

use crate::domain::{Message, TableKey};
use crate::model::Model;
use crate::settings::UserSettings;

/// A save of enabled columns that did not reach the user settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub key: String,
    pub reason: String,
}

/// Writes a table's enabled columns to the user settings after each change
/// made by the user.
///
/// Saves run in the background, at most once, without retry. Failures are
/// logged and, if requested, reported on a failure channel.
#[derive(Clone)]
pub struct SyncTrigger {
    settings: Arc<dyn UserSettings>,
    failures: Option<mpsc::UnboundedSender<SyncFailure>>,
}

impl SyncTrigger {
    pub fn new(settings: Arc<dyn UserSettings>) -> Self {
        Self {
            settings,
            failures: None,
        }
    }

    pub fn with_failure_channel(mut self) -> (Self, mpsc::UnboundedReceiver<SyncFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.failures = Some(tx);
        (self, rx)
    }

    pub fn settings(&self) -> &Arc<dyn UserSettings> {
        &self.settings
    }

    /// Saves the enabled columns of the table `message` addressed, as they are
    /// in `model` right now, if the message is one that must be persisted.
    pub fn on_message(&self, message: &Message, model: &Model) -> Option<JoinHandle<()>> {
        if !message.is_persisted() {
            return None;
        }
        let table = message.table();
        let Some(preference) = model.preference(table) else {
            trace!("Nothing to save for {table}, its columns were never set");
            return None;
        };
        Some(self.save(table.settings_key(), preference.enabled.clone()))
    }

    pub fn save(&self, key: String, enabled: Vec<String>) -> JoinHandle<()> {
        let settings = Arc::clone(&self.settings);
        let failures = self.failures.clone();
        tokio::spawn(async move {
            match settings.set(&key, &enabled).await {
                Ok(()) => debug!("Saved {} enabled columns under {key}", enabled.len()),
                Err(e) => {
                    error!("Saving columns under {key} failed: {e}");
                    if let Some(failures) = failures {
                        let _ = failures.send(SyncFailure {
                            key,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        })
    }

    /// Enabled columns saved for `table`. Nothing saved, an empty selection and
    /// unreadable settings all mean there is no preference.
    #[instrument(skip(self))]
    pub async fn load(&self, table: &TableKey) -> Option<Vec<String>> {
        let key = table.settings_key();
        match self.settings.get(&key).await {
            Ok(Some(ids)) if !ids.is_empty() => Some(ids),
            Ok(_) => None,
            Err(e) => {
                warn!("Loading columns from {key} failed, using defaults: {e}");
                None
            }
        }
    }
}
