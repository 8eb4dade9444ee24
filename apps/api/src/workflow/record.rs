//! The single live workflow record and the input that starts a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::brand::BrandKit;
use crate::models::media::InlineImage;
use crate::models::post::{Critique, DraftPost};
use crate::models::profile::ProfileSnapshot;
use crate::workflow::stage::Stage;

/// Form input for one run.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub profile_url: String,
    pub theme: String,
    pub reference_image: Option<InlineImage>,
}

/// Everything a run has produced so far. Entities stay `None` until their stage completes,
/// and stay populated after a failure so they can be shown for diagnosis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowRecord {
    pub run_id: Option<Uuid>,
    pub stage: Stage,
    pub profile_url: String,
    pub theme: String,
    pub has_reference_image: bool,
    pub profile: Option<ProfileSnapshot>,
    pub brand_kit: Option<BrandKit>,
    pub post: Option<DraftPost>,
    pub critique: Option<Critique>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowRecord {
    /// A fresh record for a new run. It stays `Idle` until the driver enters `Scraping`.
    pub fn start(run_id: Uuid, input: &RunInput) -> Self {
        Self {
            run_id: Some(run_id),
            profile_url: input.profile_url.clone(),
            theme: input.theme.clone(),
            has_reference_image: input.reference_image.is_some(),
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// A run has been started and has not finished yet.
    pub fn is_active(&self) -> bool {
        self.run_id.is_some() && !self.stage.is_terminal()
    }

    pub fn is_owned_by(&self, run_id: Uuid) -> bool {
        self.run_id == Some(run_id)
    }

    /// Moves to `to` if the stage machine allows it. Returns whether it moved.
    pub fn advance(&mut self, to: Stage) -> bool {
        if !self.stage.can_transition_to(to) {
            return false;
        }
        self.stage = to;
        if to.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        true
    }

    pub fn fail(&mut self, message: String) -> bool {
        if !self.advance(Stage::Error) {
            return false;
        }
        self.error = Some(message);
        true
    }

    /// Back to the initial empty record, whatever the current stage.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
