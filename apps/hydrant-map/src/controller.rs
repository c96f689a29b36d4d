use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{CommitError, LoadError};
use crate::highlight::{self, HighlightPhase};
use crate::hydrant::Hydrant;
use crate::services::hydrants::OverpassLoader;
use crate::services::settings::SettingsStore;

pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(100);

/// Immutable view of the viewer state. Every transition builds a new
/// snapshot; readers keep whatever snapshot they cloned.
#[derive(Debug, Clone)]
pub struct ViewerSnapshot {
    pub hydrants: Arc<[Arc<Hydrant>]>,
    pub filter: String,
    pub matches: Arc<[Arc<Hydrant>]>,
    pub highlighted: Arc<[Arc<Hydrant>]>,
    /// Filter string in effect when `highlighted` was last set.
    pub highlighted_filter: Option<String>,
    pub load_in_flight: bool,
    pub committing: bool,
    pub navigation_open: bool,
    pub filter_focused: bool,
    pub load_error: Option<String>,
}

impl ViewerSnapshot {
    fn initial(filter: String) -> Self {
        Self {
            hydrants: Arc::from(Vec::new()),
            filter,
            matches: Arc::from(Vec::new()),
            highlighted: Arc::from(Vec::new()),
            highlighted_filter: None,
            load_in_flight: true,
            committing: false,
            navigation_open: false,
            filter_focused: false,
            load_error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load_in_flight || self.committing
    }

    pub fn map_visible(&self) -> bool {
        !self.hydrants.is_empty()
    }

    pub fn commit_enabled(&self) -> bool {
        !self.committing
            && highlight::is_commit_enabled(&self.filter, &self.matches, &self.highlighted)
    }

    pub fn commit_label(&self) -> String {
        highlight::commit_label(&self.filter, &self.matches, &self.highlighted)
    }

    pub fn phase(&self) -> HighlightPhase {
        highlight::phase(
            &self.filter,
            self.highlighted_filter.as_deref(),
            &self.highlighted,
            self.committing,
        )
    }

    pub fn find(&self, id: i64) -> Option<Arc<Hydrant>> {
        self.hydrants.iter().find(|hydrant| hydrant.id() == id).cloned()
    }
}

/// Owns the entity set, the filter string and the highlighted subset.
///
/// State lives in one `Arc<ViewerSnapshot>` that is swapped wholesale on
/// each transition, so readers never observe a half-applied update.
pub struct HydrantMapController {
    settings: Arc<SettingsStore>,
    commit_delay: Duration,
    state: RwLock<Arc<ViewerSnapshot>>,
}

impl HydrantMapController {
    /// Starts in the loading state with the filter restored from settings.
    pub fn new(settings: Arc<SettingsStore>, commit_delay: Duration) -> Self {
        let filter = settings.last_highlight_filter_string();
        Self {
            settings,
            commit_delay,
            state: RwLock::new(Arc::new(ViewerSnapshot::initial(filter))),
        }
    }

    pub fn snapshot(&self) -> Arc<ViewerSnapshot> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn update(&self, f: impl FnOnce(&ViewerSnapshot) -> ViewerSnapshot) -> Arc<ViewerSnapshot> {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = Arc::new(f(&guard));
        *guard = next.clone();
        next
    }

    pub async fn reload(&self, loader: &OverpassLoader) -> Arc<ViewerSnapshot> {
        self.update(|current| ViewerSnapshot {
            load_in_flight: true,
            ..current.clone()
        });
        let guard = InFlightGuard::new(self, "hydrant load", |current| ViewerSnapshot {
            load_in_flight: false,
            ..current.clone()
        });
        let result = loader.load().await;
        guard.disarm();
        self.apply_load(result)
    }

    /// Replaces the entity set with a load outcome.
    ///
    /// On success the current filter is applied right away and its matches
    /// become the highlighted subset, restoring the previous session's view.
    pub fn apply_load(&self, result: Result<Vec<Hydrant>, LoadError>) -> Arc<ViewerSnapshot> {
        match result {
            Ok(hydrants) => {
                tracing::info!(count = hydrants.len(), "hydrants loaded");
                let hydrants: Arc<[Arc<Hydrant>]> = hydrants.into_iter().map(Arc::new).collect();
                self.update(|current| {
                    let matches: Arc<[Arc<Hydrant>]> =
                        highlight::compute_matches(&hydrants, &current.filter).into();
                    ViewerSnapshot {
                        hydrants: hydrants.clone(),
                        highlighted: matches.clone(),
                        highlighted_filter: Some(current.filter.clone()),
                        matches,
                        load_in_flight: false,
                        load_error: None,
                        ..current.clone()
                    }
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "hydrant load failed");
                let message = err.user_message();
                self.update(|current| ViewerSnapshot {
                    hydrants: Arc::from(Vec::new()),
                    matches: Arc::from(Vec::new()),
                    highlighted: Arc::from(Vec::new()),
                    highlighted_filter: None,
                    load_in_flight: false,
                    load_error: Some(message),
                    ..current.clone()
                })
            }
        }
    }

    /// Replaces the filter string and recomputes the live matches.
    ///
    /// Ignored while a commit is in flight; the input is blurred then.
    pub fn set_filter(&self, filter: impl Into<String>) -> Arc<ViewerSnapshot> {
        let filter = filter.into();
        self.update(|current| {
            if current.committing {
                tracing::debug!("filter edit ignored during highlight commit");
                return current.clone();
            }
            let matches = highlight::compute_matches(&current.hydrants, &filter).into();
            ViewerSnapshot {
                filter,
                matches,
                filter_focused: true,
                ..current.clone()
            }
        })
    }

    pub fn toggle_navigation(&self) -> Arc<ViewerSnapshot> {
        self.update(|current| ViewerSnapshot {
            navigation_open: !current.navigation_open,
            ..current.clone()
        })
    }

    /// Promotes the current matches to the highlighted subset.
    ///
    /// Enters `Committing` (input blurred, navigation collapsed), waits out
    /// the commit delay, then highlights and persists the filter string.
    pub async fn commit(&self) -> Result<Arc<ViewerSnapshot>, CommitError> {
        let mut rejected = None;
        self.update(|current| {
            if current.committing {
                rejected = Some(CommitError::Pending);
                return current.clone();
            }
            if !current.commit_enabled() {
                rejected = Some(CommitError::Disabled);
                return current.clone();
            }
            ViewerSnapshot {
                committing: true,
                filter_focused: false,
                navigation_open: false,
                ..current.clone()
            }
        });
        if let Some(err) = rejected {
            return Err(err);
        }
        let guard = InFlightGuard::new(self, "highlight commit", |current| ViewerSnapshot {
            committing: false,
            ..current.clone()
        });

        tokio::time::sleep(self.commit_delay).await;

        // Matches are read after the delay so that a reload landing in the
        // window cannot leave stale entities in the highlighted subset.
        let committed = self.update(|current| ViewerSnapshot {
            highlighted: current.matches.clone(),
            highlighted_filter: Some(current.filter.clone()),
            committing: false,
            ..current.clone()
        });
        guard.disarm();
        self.settings
            .set_last_highlight_filter_string(committed.filter.clone());
        tracing::info!(
            filter = %committed.filter,
            highlighted = committed.highlighted.len(),
            "highlight committed"
        );
        Ok(committed)
    }
}

/// Rolls back an in-flight flag when the future that set it is dropped
/// before reaching its final state transition.
struct InFlightGuard<'a> {
    controller: &'a HydrantMapController,
    operation: &'static str,
    rollback: Option<fn(&ViewerSnapshot) -> ViewerSnapshot>,
}

impl<'a> InFlightGuard<'a> {
    fn new(
        controller: &'a HydrantMapController,
        operation: &'static str,
        rollback: fn(&ViewerSnapshot) -> ViewerSnapshot,
    ) -> Self {
        Self {
            controller,
            operation,
            rollback: Some(rollback),
        }
    }

    fn disarm(mut self) {
        self.rollback = None;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(rollback) = self.rollback.take() {
            tracing::warn!(operation = self.operation, "cancelled before completion");
            self.controller.update(rollback);
        }
    }
}
