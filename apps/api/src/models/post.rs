use serde::{Deserialize, Serialize};

/// Draft post produced by the copy step. `image_url` is filled in exactly once, by the
/// design step, with a `data:` URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPost {
    #[serde(rename = "copy")]
    pub caption: String,
    pub hashtags: Vec<String>,
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl DraftPost {
    /// Hashtags with a leading `#`, whether or not the model included one.
    pub fn normalized_hashtags(&self) -> Vec<String> {
        self.hashtags
            .iter()
            .map(|tag| {
                if tag.starts_with('#') {
                    tag.clone()
                } else {
                    format!("#{tag}")
                }
            })
            .collect()
    }

    /// First `max_chars` characters of the caption, never splitting a code point.
    pub fn caption_excerpt(&self, max_chars: usize) -> String {
        self.caption.chars().take(max_chars).collect()
    }
}

/// Expert critique of the finished post. Terminal artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    pub score: i64,
    pub feedback: Vec<String>,
    pub approved: bool,
}

impl Critique {
    pub fn verdict(&self) -> &'static str {
        if self.approved {
            "APPROVED FOR PUBLISH"
        } else {
            "NEEDS REVISION"
        }
    }
}
