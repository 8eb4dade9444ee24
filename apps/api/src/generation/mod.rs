// Generation steps: brand analysis, copywriting, image design, critique.
// All model calls go through llm_client; each step owns its prompt and response schema.

pub mod brand_kit;
pub mod copy;
pub mod critique;
pub mod image;
pub mod prompts;
