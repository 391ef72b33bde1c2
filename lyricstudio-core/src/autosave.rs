//! Periodic background save of the studio's lyrics.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::project::ProjectStore;
use crate::studio::{NoticeLevel, Studio};

pub const LOG_TARGET: &str = "lyricstudio::autosave";

/// Outcome of a single save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Lines were sent to the store
    Saved { lines: usize },
    /// Nothing valid to save yet
    Skipped,
    /// The studio has no project; the saver stops
    NoProject,
    /// The store rejected the save; retried on the next tick
    Failed,
}

/// Saves the studio's lyrics to a [`ProjectStore`] on a fixed interval
pub struct AutoSaver {
    studio: Arc<RwLock<Studio>>,
    store: Arc<dyn ProjectStore>,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl AutoSaver {
    /// Create a new auto-saver
    ///
    /// # Arguments
    /// * `studio` - Shared studio whose lines are saved
    /// * `store` - Destination for the lines
    /// * `interval` - Time between save attempts
    /// * `cancel_token` - Optional external cancellation token for graceful shutdown
    pub fn new(
        studio: Arc<RwLock<Studio>>,
        store: Arc<dyn ProjectStore>,
        interval: Duration,
        cancel_token: Option<CancellationToken>,
    ) -> Self {
        Self {
            studio,
            store,
            interval,
            cancel_token: cancel_token.unwrap_or_default(),
        }
    }

    /// Get a clone of the cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Start the auto-saver in a background task
    #[must_use]
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the save loop until cancelled or the project goes away
    pub async fn run(&self) {
        info!(
            target: LOG_TARGET,
            "Auto-saving to {} every {}s",
            self.store.name(),
            self.interval.as_secs()
        );

        // First save one full interval after start
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: LOG_TARGET, "Auto-saver shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if self.save_now().await == SaveOutcome::NoProject {
                        info!(target: LOG_TARGET, "No project associated, stopping auto-save");
                        break;
                    }
                }
            }
        }
    }

    /// Save once, right now.
    ///
    /// The lines are copied under a short read lock; the network call runs
    /// without holding it.
    pub async fn save_now(&self) -> SaveOutcome {
        let (project_id, lines) = {
            let studio = self.studio.read().await;
            let Some(project_id) = studio.project_id().map(str::to_string) else {
                return SaveOutcome::NoProject;
            };
            if !studio.can_preview() {
                debug!(target: LOG_TARGET, "No valid lines yet, skipping auto-save");
                return SaveOutcome::Skipped;
            }
            (project_id, studio.lines_snapshot())
        };

        match self.store.save_lyrics(&project_id, &lines).await {
            Ok(()) => {
                debug!(target: LOG_TARGET, "Saved {} lines to project {project_id}", lines.len());
                SaveOutcome::Saved { lines: lines.len() }
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Auto-save to project {project_id} failed: {e}");
                self.studio
                    .read()
                    .await
                    .notify(NoticeLevel::Error, format!("Auto-save failed: {e}"));
                SaveOutcome::Failed
            }
        }
    }
}
