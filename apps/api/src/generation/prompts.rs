// All LLM prompt templates for the generation pipeline.
// Placeholders are `{name}` and are filled with `render` by the step that owns the template.

/// Brand analysis prompt.
/// Replace: {theme}, {username}, {biography}, {captions}
pub const BRAND_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following Instagram profile data and the user's desired theme.

User Theme/Goal: {theme}

Instagram Data:
Username: {username}
Bio: {biography}
Recent Captions: {captions}

Construct a comprehensive Brand Kit.
Include:
1. Tone of Voice (adjectives)
2. Color Palette (hex codes or names)
3. Visual Style description
4. Key Themes
5. Target Audience description"#;

/// Copywriting prompt.
/// Replace: {theme}, {tone}, {audience}
pub const COPYWRITING_PROMPT_TEMPLATE: &str = r#"Act as an expert social media copywriter.
Create a new Instagram post based on this Brand Kit and Theme.

Theme: {theme}
Brand Voice: {tone}
Target Audience: {audience}

Output a JSON object with 'copy' (the caption) and 'hashtags' (list of strings)."#;

/// Image prompt used when the user supplied a reference image.
/// Replace: {style}, {palette}, {excerpt}
pub const IMAGE_TRANSFORM_PROMPT_TEMPLATE: &str = r#"Transform this reference image into a polished social media post.
Style: {style}.
Color Palette: {palette}.
Context: The post is about: "{excerpt}...".
Ensure it looks professional, high-resolution, and aesthetically pleasing."#;

/// Image prompt used when generating from scratch.
/// Replace: {style}, {palette}, {excerpt}, {mood}
pub const IMAGE_GENERATE_PROMPT_TEMPLATE: &str = r#"Create a high-quality, professional Instagram image.
Style: {style}.
Color Palette: {palette}.
Subject: Visual representation of: "{excerpt}...".
Mood: {mood}.
Aspect Ratio: 1:1."#;

/// Caption characters quoted in the transform prompt.
pub const TRANSFORM_EXCERPT_CHARS: usize = 100;
/// Caption characters quoted in the generate-from-scratch prompt.
pub const GENERATE_EXCERPT_CHARS: usize = 150;

/// Critique prompt. The image is sent as inline data ahead of this text.
/// Replace: {tone}, {style}, {caption}
pub const CRITIQUE_PROMPT_TEMPLATE: &str = r#"Act as a Senior Brand Manager. Evaluate this generated social media post against the Brand Kit.

Brand Voice Required: {tone}
Visual Style Required: {style}

Generated Copy: "{caption}"

Review the attached image and the copy.
Provide:
1. A score from 0-100.
2. A list of 3 specific feedback points (critiques or praises).
3. A boolean 'approved' (true if score > 75)."#;

/// Fills `{name}` placeholders in one pass over the template. Inserted values are never
/// scanned again, so braces inside user or model text come through verbatim.
/// Unknown `{...}` sequences are left as they are.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match filled {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
