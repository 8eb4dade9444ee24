//! Expert critic: scores the finished post against the brand kit.
//!
//! The generated image is decoded from its `data:` URI and sent back to the
//! vision model as inline data. The approval flag is taken as returned.

use crate::errors::AppError;
use crate::generation::prompts::{render, CRITIQUE_PROMPT_TEMPLATE};
use crate::llm_client::schema::Schema;
use crate::llm_client::{LlmClient, Part, ANALYSIS_MODEL};
use crate::models::brand::BrandKit;
use crate::models::media::InlineImage;
use crate::models::post::{Critique, DraftPost};

pub fn critique_schema() -> Schema {
    Schema::object(vec![
        ("score", Schema::integer()),
        ("feedback", Schema::array_of(Schema::string())),
        ("approved", Schema::boolean()),
    ])
}

pub fn build_critique_prompt(kit: &BrandKit, post: &DraftPost) -> String {
    render(
        CRITIQUE_PROMPT_TEMPLATE,
        &[
            ("tone", kit.tone_line().as_str()),
            ("style", kit.visual_style.as_str()),
            ("caption", post.caption.as_str()),
        ],
    )
}

pub async fn critique_post(
    kit: &BrandKit,
    post: &DraftPost,
    image_ref: &str,
    llm: &LlmClient,
) -> Result<Critique, AppError> {
    let image = InlineImage::from_data_uri(image_ref)?;
    let parts = [
        Part::image(image),
        Part::text(build_critique_prompt(kit, post)),
    ];

    llm.generate_json::<Critique>(ANALYSIS_MODEL, &parts, &critique_schema())
        .await
        .map_err(|e| AppError::Llm(format!("Critique failed: {e}")))
}
