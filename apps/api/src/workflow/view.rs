//! Read models served to the client: the record with a progress block, and the
//! result summary shown once a run completes.

use serde::Serialize;

use crate::workflow::record::WorkflowRecord;
use crate::workflow::stage::{Stage, PIPELINE};

/// Tone descriptors shown in the brand summary.
const SUMMARY_TONE_LIMIT: usize = 3;

#[derive(Debug, Serialize)]
pub struct Progress {
    pub stage: Stage,
    pub label: &'static str,
    /// 1-based position in the pipeline; `None` outside it.
    pub step: Option<usize>,
    pub total_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
}

impl Progress {
    pub fn of(stage: Stage) -> Self {
        Self {
            stage,
            label: stage.label(),
            step: stage.pipeline_index().map(|i| i + 1),
            total_steps: PIPELINE.len(),
            percent: stage.progress_percent(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowView {
    pub progress: Progress,
    #[serde(flatten)]
    pub record: WorkflowRecord,
}

impl From<WorkflowRecord> for WorkflowView {
    fn from(record: WorkflowRecord) -> Self {
        Self {
            progress: Progress::of(record.stage),
            record,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BrandSummary {
    pub tone_of_voice: Vec<String>,
    pub color_palette: Vec<String>,
    pub visual_style: String,
    pub key_themes: Vec<String>,
    pub target_audience: String,
}

#[derive(Debug, Serialize)]
pub struct ResultSummary {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub hashtag_line: String,
    pub image_url: Option<String>,
    pub score: i64,
    pub feedback: Vec<String>,
    pub approved: bool,
    pub verdict: &'static str,
    pub brand: BrandSummary,
}

impl ResultSummary {
    /// Builds the summary of a completed record; `None` for any other record.
    pub fn from_record(record: &WorkflowRecord) -> Option<Self> {
        if record.stage != Stage::Completed {
            return None;
        }
        let kit = record.brand_kit.as_ref()?;
        let post = record.post.as_ref()?;
        let critique = record.critique.as_ref()?;

        let hashtags = post.normalized_hashtags();
        Some(Self {
            caption: post.caption.clone(),
            hashtag_line: hashtags.join(" "),
            hashtags,
            image_url: post.image_url.clone(),
            score: critique.score,
            feedback: critique.feedback.clone(),
            approved: critique.approved,
            verdict: critique.verdict(),
            brand: BrandSummary {
                tone_of_voice: kit
                    .tone_of_voice
                    .iter()
                    .take(SUMMARY_TONE_LIMIT)
                    .cloned()
                    .collect(),
                color_palette: kit.color_palette.clone(),
                visual_style: kit.visual_style.clone(),
                key_themes: kit.key_themes.clone(),
                target_audience: kit.target_audience.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::brand::BrandKit;
    use crate::models::post::{Critique, DraftPost};

    fn completed_record() -> WorkflowRecord {
        WorkflowRecord {
            stage: Stage::Completed,
            brand_kit: Some(BrandKit {
                tone_of_voice: vec![
                    "bold".to_string(),
                    "warm".to_string(),
                    "witty".to_string(),
                    "calm".to_string(),
                ],
                color_palette: vec!["#fff".to_string()],
                visual_style: "Airy".to_string(),
                key_themes: vec!["home".to_string()],
                target_audience: "Parents".to_string(),
            }),
            post: Some(DraftPost {
                caption: "Cozy mornings".to_string(),
                hashtags: vec!["home".to_string(), "#coffee".to_string()],
                image_url: Some("data:image/png;base64,AAAA".to_string()),
            }),
            critique: Some(Critique {
                score: 79,
                feedback: vec!["Nice light".to_string()],
                approved: false,
            }),
            ..WorkflowRecord::default()
        }
    }

    #[test]
    fn test_progress_block_for_running_stage() {
        let progress = Progress::of(Stage::Designing);
        assert_eq!(progress.step, Some(4));
        assert_eq!(progress.total_steps, 5);
        assert_eq!(progress.percent, Some(75));
        assert_eq!(progress.label, "Generating Visuals");
    }

    #[test]
    fn test_progress_block_for_error_has_no_percent() {
        let value = serde_json::to_value(Progress::of(Stage::Error)).unwrap();
        assert!(value.get("percent").is_none());
        assert!(value["step"].is_null());
        assert_eq!(value["stage"], "ERROR");
    }

    #[test]
    fn test_view_flattens_record_fields() {
        let value = serde_json::to_value(WorkflowView::from(WorkflowRecord::default())).unwrap();
        assert_eq!(value["stage"], "IDLE");
        assert_eq!(value["progress"]["percent"], 0);
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_summary_formats_completed_record() {
        let summary = ResultSummary::from_record(&completed_record()).unwrap();
        assert_eq!(summary.hashtags, vec!["#home", "#coffee"]);
        assert_eq!(summary.hashtag_line, "#home #coffee");
        assert_eq!(summary.verdict, "NEEDS REVISION");
        assert_eq!(summary.brand.tone_of_voice, vec!["bold", "warm", "witty"]);
        assert_eq!(summary.image_url.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_summary_unavailable_before_completion() {
        let mut record = completed_record();
        record.stage = Stage::Reviewing;
        assert!(ResultSummary::from_record(&record).is_none());
        assert!(ResultSummary::from_record(&WorkflowRecord::default()).is_none());
    }
}
