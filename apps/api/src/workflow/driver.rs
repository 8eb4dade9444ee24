//! Workflow driver: runs the five steps in order against the single live record.
//!
//! Flow: scrape → analyze → draft → design → review → completed.
//!
//! Each step's output feeds the next. A progress notification is emitted before each
//! step's call is issued. The first failing step ends the run in `Error` with its
//! message; entities produced before it stay on the record. The record lock is never
//! held across a step call.
//!
//! Starting a new run replaces the record. A run that finds its id no longer owns the
//! record stops before its next step and writes nothing further.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::brand_kit::generate_brand_kit;
use crate::generation::copy::generate_post_copy;
use crate::generation::critique::critique_post;
use crate::generation::image::generate_post_image;
use crate::llm_client::LlmClient;
use crate::models::brand::BrandKit;
use crate::models::media::InlineImage;
use crate::models::post::{Critique, DraftPost};
use crate::models::profile::ProfileSnapshot;
use crate::scraper::ScrapeClient;
use crate::workflow::record::{RunInput, WorkflowRecord};
use crate::workflow::stage::Stage;

// ────────────────────────────────────────────────────────────────────────────
// Step seam
// ────────────────────────────────────────────────────────────────────────────

/// The five pipeline steps. `LiveSteps` calls the real services; tests substitute fakes.
///
/// Carried by the driver as `Arc<dyn WorkflowSteps>`.
#[async_trait]
pub trait WorkflowSteps: Send + Sync {
    async fn scrape(&self, profile_url: &str) -> Result<ProfileSnapshot, AppError>;

    async fn analyze(&self, profile: &ProfileSnapshot, theme: &str)
        -> Result<BrandKit, AppError>;

    async fn draft(&self, kit: &BrandKit, theme: &str) -> Result<DraftPost, AppError>;

    async fn design(
        &self,
        kit: &BrandKit,
        post: &DraftPost,
        reference: Option<&InlineImage>,
    ) -> Result<InlineImage, AppError>;

    async fn review(
        &self,
        kit: &BrandKit,
        post: &DraftPost,
        image_ref: &str,
    ) -> Result<Critique, AppError>;
}

/// Steps backed by the scrape service and the generative-AI service.
pub struct LiveSteps {
    scraper: ScrapeClient,
    llm: LlmClient,
}

impl LiveSteps {
    pub fn new(scraper: ScrapeClient, llm: LlmClient) -> Self {
        Self { scraper, llm }
    }
}

#[async_trait]
impl WorkflowSteps for LiveSteps {
    async fn scrape(&self, profile_url: &str) -> Result<ProfileSnapshot, AppError> {
        Ok(self.scraper.fetch(profile_url).await)
    }

    async fn analyze(
        &self,
        profile: &ProfileSnapshot,
        theme: &str,
    ) -> Result<BrandKit, AppError> {
        generate_brand_kit(profile, theme, &self.llm).await
    }

    async fn draft(&self, kit: &BrandKit, theme: &str) -> Result<DraftPost, AppError> {
        generate_post_copy(kit, theme, &self.llm).await
    }

    async fn design(
        &self,
        kit: &BrandKit,
        post: &DraftPost,
        reference: Option<&InlineImage>,
    ) -> Result<InlineImage, AppError> {
        generate_post_image(kit, post, reference, &self.llm).await
    }

    async fn review(
        &self,
        kit: &BrandKit,
        post: &DraftPost,
        image_ref: &str,
    ) -> Result<Critique, AppError> {
        critique_post(kit, post, image_ref, &self.llm).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Driver
// ────────────────────────────────────────────────────────────────────────────

/// Artifacts of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub brand_kit: BrandKit,
    pub post: DraftPost,
    pub critique: Critique,
}

pub struct WorkflowDriver {
    steps: Arc<dyn WorkflowSteps>,
    record: RwLock<WorkflowRecord>,
}

impl WorkflowDriver {
    pub fn new(steps: Arc<dyn WorkflowSteps>) -> Self {
        Self {
            steps,
            record: RwLock::new(WorkflowRecord::default()),
        }
    }

    pub async fn snapshot(&self) -> WorkflowRecord {
        self.record.read().await.clone()
    }

    /// Discards the record, whatever stage it is in.
    pub async fn reset(&self) {
        let mut record = self.record.write().await;
        if record.is_active() {
            warn!(run_id = ?record.run_id, "Resetting while a run is in progress");
        }
        record.reset();
        info!("Workflow reset to idle");
    }

    /// Installs a fresh record for a new run and returns its id.
    pub async fn begin(&self, input: &RunInput) -> Uuid {
        let run_id = Uuid::new_v4();
        let mut record = self.record.write().await;
        if record.is_active() {
            warn!(previous = ?record.run_id, "Discarding in-progress run");
        }
        *record = WorkflowRecord::start(run_id, input);
        info!(%run_id, profile_url = %input.profile_url, "Workflow started");
        run_id
    }

    /// Starts a new run and drives it to completion or failure.
    pub async fn run<F>(&self, input: RunInput, progress: F) -> Result<RunOutput, AppError>
    where
        F: FnMut(Stage) + Send,
    {
        let run_id = self.begin(&input).await;
        self.execute(run_id, &input, progress).await
    }

    /// Drives a run previously installed with [`begin`](Self::begin).
    pub async fn execute<F>(
        &self,
        run_id: Uuid,
        input: &RunInput,
        mut progress: F,
    ) -> Result<RunOutput, AppError>
    where
        F: FnMut(Stage) + Send,
    {
        match self.execute_stages(run_id, input, &mut progress).await {
            Ok(output) => {
                info!(
                    %run_id,
                    score = output.critique.score,
                    approved = output.critique.approved,
                    "Workflow completed"
                );
                Ok(output)
            }
            Err(AppError::Superseded(id)) => {
                warn!(run_id = %id, "Run superseded, stopping");
                Err(AppError::Superseded(id))
            }
            Err(e) => {
                let message = e.to_string();
                error!(%run_id, "Workflow failed: {message}");
                // A newer run may own the record by now; its state wins.
                let _ = self.with_record(run_id, |r| r.fail(message)).await;
                Err(e)
            }
        }
    }

    async fn execute_stages<F>(
        &self,
        run_id: Uuid,
        input: &RunInput,
        progress: &mut F,
    ) -> Result<RunOutput, AppError>
    where
        F: FnMut(Stage) + Send,
    {
        // Step 1: Scrape
        self.enter(run_id, Stage::Scraping, progress).await?;
        let profile = self.steps.scrape(&input.profile_url).await?;
        self.with_record(run_id, |r| r.profile = Some(profile.clone()))
            .await?;

        // Step 2: Brand kit
        self.enter(run_id, Stage::Analyzing, progress).await?;
        let brand_kit = self.steps.analyze(&profile, &input.theme).await?;
        self.with_record(run_id, |r| r.brand_kit = Some(brand_kit.clone()))
            .await?;

        // Step 3: Copy
        self.enter(run_id, Stage::Drafting, progress).await?;
        let mut post = self.steps.draft(&brand_kit, &input.theme).await?;
        post.image_url = None;
        self.with_record(run_id, |r| r.post = Some(post.clone()))
            .await?;

        // Step 4: Visuals; the only mutation of the draft after creation
        self.enter(run_id, Stage::Designing, progress).await?;
        let image = self
            .steps
            .design(&brand_kit, &post, input.reference_image.as_ref())
            .await?;
        let image_ref = image.to_data_uri();
        post.image_url = Some(image_ref.clone());
        self.with_record(run_id, |r| {
            if let Some(stored) = r.post.as_mut() {
                stored.image_url = Some(image_ref.clone());
            }
        })
        .await?;

        // Step 5: Critique of the full post, image included
        self.enter(run_id, Stage::Reviewing, progress).await?;
        let critique = self.steps.review(&brand_kit, &post, &image_ref).await?;
        self.with_record(run_id, |r| {
            r.critique = Some(critique.clone());
            r.advance(Stage::Completed)
        })
        .await?;

        Ok(RunOutput {
            brand_kit,
            post,
            critique,
        })
    }

    /// Moves the record into `stage`, then notifies. The notification always precedes the call.
    async fn enter<F>(&self, run_id: Uuid, stage: Stage, progress: &mut F) -> Result<(), AppError>
    where
        F: FnMut(Stage) + Send,
    {
        let moved = self.with_record(run_id, |r| r.advance(stage)).await?;
        if !moved {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Illegal stage transition into {stage:?}"
            )));
        }
        info!(%run_id, stage = ?stage, "Agent is currently: {}", stage.label());
        progress(stage);
        Ok(())
    }

    /// Applies `update` to the record if `run_id` still owns it.
    async fn with_record<T>(
        &self,
        run_id: Uuid,
        update: impl FnOnce(&mut WorkflowRecord) -> T,
    ) -> Result<T, AppError> {
        let mut record = self.record.write().await;
        if !record.is_owned_by(run_id) {
            return Err(AppError::Superseded(run_id));
        }
        Ok(update(&mut record))
    }
}
