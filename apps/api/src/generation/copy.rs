//! Copywriter: drafts the caption and hashtags for the new post.

use crate::errors::AppError;
use crate::generation::prompts::{render, COPYWRITING_PROMPT_TEMPLATE};
use crate::llm_client::schema::Schema;
use crate::llm_client::{LlmClient, Part, COPY_MODEL};
use crate::models::brand::BrandKit;
use crate::models::post::DraftPost;

pub fn draft_post_schema() -> Schema {
    Schema::object(vec![
        ("copy", Schema::string()),
        ("hashtags", Schema::array_of(Schema::string())),
    ])
}

pub fn build_copy_prompt(kit: &BrandKit, theme: &str) -> String {
    render(
        COPYWRITING_PROMPT_TEMPLATE,
        &[
            ("theme", theme),
            ("tone", kit.tone_line().as_str()),
            ("audience", kit.target_audience.as_str()),
        ],
    )
}

/// Returns a draft with no image; the design step attaches one later.
pub async fn generate_post_copy(
    kit: &BrandKit,
    theme: &str,
    llm: &LlmClient,
) -> Result<DraftPost, AppError> {
    let prompt = build_copy_prompt(kit, theme);
    let mut draft: DraftPost = llm
        .generate_json(COPY_MODEL, &[Part::text(prompt)], &draft_post_schema())
        .await
        .map_err(|e| AppError::Llm(format!("Copywriting failed: {e}")))?;

    // The image only ever comes from the design step.
    draft.image_url = None;
    Ok(draft)
}
