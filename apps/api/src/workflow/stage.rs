//! Workflow stages and the transitions allowed between them.
//!
//! ```text
//! Idle → Scraping → Analyzing → Drafting → Designing → Reviewing → Completed
//!            └──────────┴───────────┴──────────┴───────────┴──→ Error
//! ```
//!
//! `Completed` and `Error` are terminal. Leaving them (or any other stage) back to
//! `Idle` only happens through a reset, which replaces the whole record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[default]
    Idle,
    Scraping,
    Analyzing,
    Drafting,
    Designing,
    Reviewing,
    Completed,
    Error,
}

/// The five working stages, in execution order.
pub const PIPELINE: [Stage; 5] = [
    Stage::Scraping,
    Stage::Analyzing,
    Stage::Drafting,
    Stage::Designing,
    Stage::Reviewing,
];

impl Stage {
    /// Position within [`PIPELINE`], if this is a working stage.
    pub fn pipeline_index(self) -> Option<usize> {
        PIPELINE.iter().position(|s| *s == self)
    }

    pub fn is_running(self) -> bool {
        self.pipeline_index().is_some()
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Error)
    }

    /// The stage that follows on success.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Scraping),
            Stage::Scraping => Some(Stage::Analyzing),
            Stage::Analyzing => Some(Stage::Drafting),
            Stage::Drafting => Some(Stage::Designing),
            Stage::Designing => Some(Stage::Reviewing),
            Stage::Reviewing => Some(Stage::Completed),
            Stage::Completed | Stage::Error => None,
        }
    }

    /// Whether the driver may move from `self` to `to`: one step forward, or into `Error`
    /// from a running stage.
    pub fn can_transition_to(self, to: Stage) -> bool {
        if to == Stage::Error {
            return self.is_running();
        }
        self.next() == Some(to)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "Idle",
            Stage::Scraping => "Scraping Data",
            Stage::Analyzing => "Analyzing Brand",
            Stage::Drafting => "Drafting Copy",
            Stage::Designing => "Generating Visuals",
            Stage::Reviewing => "Expert Critique",
            Stage::Completed => "Completed",
            Stage::Error => "Process Failed",
        }
    }

    /// Progress through the pipeline in percent. `None` once a run has failed.
    pub fn progress_percent(self) -> Option<u8> {
        match self {
            Stage::Idle => Some(0),
            Stage::Completed => Some(100),
            Stage::Error => None,
            running => running
                .pipeline_index()
                .map(|i| (i * 100 / (PIPELINE.len() - 1)) as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Stage; 8] = [
        Stage::Idle,
        Stage::Scraping,
        Stage::Analyzing,
        Stage::Drafting,
        Stage::Designing,
        Stage::Reviewing,
        Stage::Completed,
        Stage::Error,
    ];

    #[test]
    fn test_next_walks_the_pipeline_in_order() {
        let mut walked = vec![];
        let mut stage = Stage::Idle;
        while let Some(next) = stage.next() {
            walked.push(next);
            stage = next;
        }
        assert_eq!(walked[..5], PIPELINE);
        assert_eq!(walked.last(), Some(&Stage::Completed));
    }

    #[test]
    fn test_transitions_only_move_forward() {
        for from in ALL {
            for to in ALL {
                let allowed = from.can_transition_to(to);
                if from.is_terminal() {
                    assert!(!allowed, "{from:?} is terminal but allowed {to:?}");
                }
                if let (Some(a), Some(b)) = (from.pipeline_index(), to.pipeline_index()) {
                    assert_eq!(allowed, b == a + 1, "{from:?} -> {to:?}");
                }
            }
        }
    }

    #[test]
    fn test_no_stage_transitions_to_itself() {
        for stage in ALL {
            assert!(!stage.can_transition_to(stage), "{stage:?} -> {stage:?}");
        }
    }

    #[test]
    fn test_error_reachable_only_while_running() {
        for stage in ALL {
            assert_eq!(stage.can_transition_to(Stage::Error), stage.is_running());
        }
    }

    #[test]
    fn test_idle_can_only_start_scraping() {
        let targets: Vec<Stage> = ALL
            .into_iter()
            .filter(|to| Stage::Idle.can_transition_to(*to))
            .collect();
        assert_eq!(targets, vec![Stage::Scraping]);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(Stage::Idle.progress_percent(), Some(0));
        assert_eq!(Stage::Scraping.progress_percent(), Some(0));
        assert_eq!(Stage::Analyzing.progress_percent(), Some(25));
        assert_eq!(Stage::Drafting.progress_percent(), Some(50));
        assert_eq!(Stage::Designing.progress_percent(), Some(75));
        assert_eq!(Stage::Reviewing.progress_percent(), Some(100));
        assert_eq!(Stage::Completed.progress_percent(), Some(100));
        assert_eq!(Stage::Error.progress_percent(), None);
    }

    #[test]
    fn test_stage_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Stage::Drafting).unwrap(), "\"DRAFTING\"");
        assert_eq!(serde_json::to_string(&Stage::Idle).unwrap(), "\"IDLE\"");
    }
}
