use serde::{Deserialize, Serialize};

/// Brand kit derived from a profile snapshot and the user's theme.
///
/// Field names on the wire are the camelCase keys the analysis call's response schema
/// requires, so the model's JSON deserializes directly. All five fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKit {
    pub tone_of_voice: Vec<String>,
    pub color_palette: Vec<String>,
    pub visual_style: String,
    pub key_themes: Vec<String>,
    pub target_audience: String,
}

impl BrandKit {
    pub fn tone_line(&self) -> String {
        self.tone_of_voice.join(", ")
    }

    pub fn palette_line(&self) -> String {
        self.color_palette.join(", ")
    }
}
