//! Brand analyst: derives a [`BrandKit`] from a scraped profile and the user's theme.

use crate::errors::AppError;
use crate::generation::prompts::{render, BRAND_ANALYSIS_PROMPT_TEMPLATE};
use crate::llm_client::schema::Schema;
use crate::llm_client::{LlmClient, Part, ANALYSIS_MODEL};
use crate::models::brand::BrandKit;
use crate::models::profile::ProfileSnapshot;

pub fn brand_kit_schema() -> Schema {
    Schema::object(vec![
        ("toneOfVoice", Schema::array_of(Schema::string())),
        ("colorPalette", Schema::array_of(Schema::string())),
        ("visualStyle", Schema::string()),
        ("keyThemes", Schema::array_of(Schema::string())),
        ("targetAudience", Schema::string()),
    ])
}

pub fn build_brand_prompt(profile: &ProfileSnapshot, theme: &str) -> String {
    render(
        BRAND_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("theme", theme),
            ("username", profile.username.as_str()),
            ("biography", profile.biography.as_str()),
            ("captions", profile.joined_captions().as_str()),
        ],
    )
}

/// Calls the analysis model and parses its structured answer into a `BrandKit`.
pub async fn generate_brand_kit(
    profile: &ProfileSnapshot,
    theme: &str,
    llm: &LlmClient,
) -> Result<BrandKit, AppError> {
    let prompt = build_brand_prompt(profile, theme);
    llm.generate_json::<BrandKit>(ANALYSIS_MODEL, &[Part::text(prompt)], &brand_kit_schema())
        .await
        .map_err(|e| AppError::Llm(format!("Brand analysis failed: {e}")))
}
