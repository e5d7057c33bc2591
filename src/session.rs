//! Dataset session workflow.
//!
//! [`Session`] owns the lifecycle of one uploaded dataset: it gates the
//! dependent actions behind a successful upload, runs each action as a
//! single round trip through the [`ApiClient`], and publishes every state
//! change as a whole new [`SessionSnapshot`] over a watch channel.
//!
//! Overlapping triggers of the same action are resolved with per-slot
//! request tokens: a response is applied only while its token is still the
//! newest issued for that slot, so stale responses (success or failure) are
//! dropped instead of racing last-write-wins.

use crate::client::{ApiClient, ApiError};
use crate::core::models::{FeatureIdeas, Payload, PreviewResult, ProfileResult};
use crate::core::types::{DatasetId, Slot};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Explanation text for one named column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExplanation {
    pub column: String,
    pub text: String,
}

/// Immutable view of the session. Replaced wholesale on every transition;
/// result slots only ever change by a successful refresh of their own
/// action, so a failed profile fetch never blanks a displayed preview.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Set by the first successful upload; superseded by the next one.
    pub dataset_id: Option<DatasetId>,
    pub preview: Option<Payload<PreviewResult>>,
    pub profile: Option<Payload<ProfileResult>>,
    /// Whole-profile explanation text.
    pub explanation: Option<String>,
    /// Most recent per-column explanation.
    pub column_explanation: Option<ColumnExplanation>,
    pub columns: Option<Vec<String>>,
    pub feature_ideas: Option<Payload<FeatureIdeas>>,
    /// Most recent failure message; cleared when a new action starts.
    pub error: Option<String>,
}

pub struct Session {
    client: ApiClient,
    preview_rows: u32,
    state: watch::Sender<SessionSnapshot>,
    tokens: Mutex<[u64; Slot::COUNT]>,
}

impl Session {
    pub fn new(client: ApiClient, preview_rows: u32) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            client,
            preview_rows,
            state,
            tokens: Mutex::new([0; Slot::COUNT]),
        }
    }

    /// Receiver that yields every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Current snapshot, cloned out of the channel.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Upload a new dataset. Clears the preview, profile and failure slots
    /// up front so nothing from the prior dataset stays visible against a
    /// pending one; the dataset id is replaced only on success.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) {
        let token = self.issue(Slot::Upload);
        self.publish(|s| {
            s.error = None;
            s.preview = None;
            s.profile = None;
        });

        let result = self.client.upload(file_name, bytes).await;
        self.finish(Slot::Upload, token, result, |s, payload| {
            info!(dataset_id = %payload.data.dataset_id, "dataset uploaded");
            s.dataset_id = Some(payload.data.dataset_id.clone());
        });
    }

    /// Fetch the row preview for the active dataset.
    pub async fn preview(&self) {
        let Some(id) = self.active_dataset(Slot::Preview) else {
            return;
        };
        let token = self.begin(Slot::Preview);
        let result = self.client.preview(&id, self.preview_rows).await;
        self.finish(Slot::Preview, token, result, |s, payload| {
            s.preview = Some(payload);
        });
    }

    /// Fetch the statistical profile for the active dataset.
    pub async fn profile(&self) {
        let Some(id) = self.active_dataset(Slot::Profile) else {
            return;
        };
        let token = self.begin(Slot::Profile);
        let result = self.client.profile(&id).await;
        self.finish(Slot::Profile, token, result, |s, payload| {
            s.profile = Some(payload);
        });
    }

    /// Request a natural-language explanation of the whole profile.
    pub async fn explain(&self) {
        let Some(id) = self.active_dataset(Slot::Explain) else {
            return;
        };
        let token = self.begin(Slot::Explain);
        let result = self.client.explain(&id).await;
        self.finish(Slot::Explain, token, result, |s, payload| {
            s.explanation = Some(payload.data.explanation);
        });
    }

    /// Fetch the dataset's column names.
    pub async fn columns(&self) {
        let Some(id) = self.active_dataset(Slot::Columns) else {
            return;
        };
        let token = self.begin(Slot::Columns);
        let result = self.client.columns(&id).await;
        self.finish(Slot::Columns, token, result, |s, payload| {
            s.columns = Some(payload.data.columns);
        });
    }

    /// Request an explanation of one named column.
    pub async fn explain_column(&self, column: &str) {
        let Some(id) = self.active_dataset(Slot::ExplainColumn) else {
            return;
        };
        let token = self.begin(Slot::ExplainColumn);
        let result = self.client.explain_column(&id, column).await;
        let column = column.to_string();
        self.finish(Slot::ExplainColumn, token, result, move |s, payload| {
            s.column_explanation = Some(ColumnExplanation {
                column,
                text: payload.data.explanation,
            });
        });
    }

    /// Request feature-engineering suggestions for the active dataset.
    pub async fn feature_ideas(&self) {
        let Some(id) = self.active_dataset(Slot::FeatureIdeas) else {
            return;
        };
        let token = self.begin(Slot::FeatureIdeas);
        let result = self.client.feature_ideas(&id).await;
        self.finish(Slot::FeatureIdeas, token, result, |s, payload| {
            s.feature_ideas = Some(payload);
        });
    }

    /// Precondition gate: dependent actions are silent no-ops until an
    /// upload has succeeded. Nothing is published, nothing goes on the wire.
    fn active_dataset(&self, slot: Slot) -> Option<DatasetId> {
        let id = self.state.borrow().dataset_id.clone();
        if id.is_none() {
            debug!(%slot, "action requested with no active dataset; ignoring");
        }
        id
    }

    /// Start an action: bump its token and clear the failure slot.
    fn begin(&self, slot: Slot) -> u64 {
        let token = self.issue(slot);
        self.publish(|s| s.error = None);
        token
    }

    /// Apply an action's outcome, unless a newer trigger of the same slot
    /// has been issued in the meantime.
    fn finish<T>(
        &self,
        slot: Slot,
        token: u64,
        result: Result<T, ApiError>,
        apply: impl FnOnce(&mut SessionSnapshot, T),
    ) {
        if !self.is_current(slot, token) {
            debug!(%slot, token, "discarding stale response");
            return;
        }
        match result {
            Ok(value) => self.publish(|s| apply(s, value)),
            Err(err) => {
                warn!(%slot, error = %err, "action failed");
                self.publish(|s| s.error = Some(err.message().to_string()));
            }
        }
    }

    fn issue(&self, slot: Slot) -> u64 {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens[slot.index()] += 1;
        tokens[slot.index()]
    }

    fn is_current(&self, slot: Slot, token: u64) -> bool {
        let tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens[slot.index()] == token
    }

    /// Publish a state change. The closure runs under the channel's own
    /// lock, so actions finishing concurrently on different slots cannot
    /// lose each other's updates; subscribers still only ever observe
    /// complete snapshots.
    fn publish(&self, change: impl FnOnce(&mut SessionSnapshot)) {
        self.state.send_modify(change);
    }
}
