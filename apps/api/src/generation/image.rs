//! Designer: produces the post image, either by transforming a user-supplied
//! reference image or by generating one from scratch.
//!
//! The two modes differ only in the request: the transform mode sends the reference
//! as inline data ahead of its prompt. Both read the first inline image of the
//! response and fail the same way when there is none.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{
    render, GENERATE_EXCERPT_CHARS, IMAGE_GENERATE_PROMPT_TEMPLATE, IMAGE_TRANSFORM_PROMPT_TEMPLATE,
    TRANSFORM_EXCERPT_CHARS,
};
use crate::llm_client::{LlmClient, Part, IMAGE_MODEL};
use crate::models::brand::BrandKit;
use crate::models::media::InlineImage;
use crate::models::post::DraftPost;

/// Builds the request parts for the image call.
pub fn build_image_parts(
    kit: &BrandKit,
    post: &DraftPost,
    reference: Option<&InlineImage>,
) -> Vec<Part> {
    match reference {
        Some(image) => {
            let prompt = render(
                IMAGE_TRANSFORM_PROMPT_TEMPLATE,
                &[
                    ("style", kit.visual_style.as_str()),
                    ("palette", kit.palette_line().as_str()),
                    ("excerpt", post.caption_excerpt(TRANSFORM_EXCERPT_CHARS).as_str()),
                ],
            );
            vec![Part::image(image.clone()), Part::text(prompt)]
        }
        None => {
            let prompt = render(
                IMAGE_GENERATE_PROMPT_TEMPLATE,
                &[
                    ("style", kit.visual_style.as_str()),
                    ("palette", kit.palette_line().as_str()),
                    ("excerpt", post.caption_excerpt(GENERATE_EXCERPT_CHARS).as_str()),
                    ("mood", kit.tone_line().as_str()),
                ],
            );
            vec![Part::text(prompt)]
        }
    }
}

pub async fn generate_post_image(
    kit: &BrandKit,
    post: &DraftPost,
    reference: Option<&InlineImage>,
    llm: &LlmClient,
) -> Result<InlineImage, AppError> {
    info!(
        "Generating post image ({})",
        if reference.is_some() {
            "transforming reference"
        } else {
            "from scratch"
        }
    );

    let parts = build_image_parts(kit, post, reference);
    let response = llm
        .generate(IMAGE_MODEL, &parts, None)
        .await
        .map_err(|e| AppError::Llm(format!("Image generation failed: {e}")))?;

    response.first_inline_image().ok_or_else(|| {
        warn!(
            finish_reason = response.finish_reason().unwrap_or("unknown"),
            "Image response carried no inline image"
        );
        AppError::NoImage
    })
}
