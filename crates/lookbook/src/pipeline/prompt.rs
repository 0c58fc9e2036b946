//! Prompt construction for the three call shapes.
//!
//! The text-to-image model never sees the reference images, so the analysis
//! prompt demands enough written detail to reproduce the person and garment
//! from text alone, and the variation prompt re-asserts that identity in
//! full on every call.

use super::analysis::{DetailedDescription, Pose};
use super::config::PromptContext;

/// Instruction block for the vision-analysis call.
pub fn analysis_prompt(has_scene: bool, context: Option<&PromptContext>) -> String {
    let image_list = if has_scene {
        "You are given 3 images:\n1. Background/Scene\n2. Model\n3. Garment/Product"
    } else {
        "You are given 2 images:\n1. Model\n2. Garment/Product"
    };

    let background_note = if has_scene {
        "Describe the background image: environment type, dominant colors, \
         lighting, environmental details (props, furniture, architecture), \
         overall color tone (warm/cool/neutral)."
    } else {
        "No background image was provided: invent a background that suits the \
         garment and describe it with the same precision."
    };

    let context_block = context
        .filter(|c| !c.is_empty())
        .map(format_context_block)
        .unwrap_or_default();

    format!(
        r#"You are an expert image analyst. Your task: describe these images in EXTREME detail so that a text-to-image AI can recreate them with 100% accuracy.

IMPORTANT: the image-generation AI CANNOT see the originals. It only reads text. You MUST describe every identifying detail.

{image_list}
{context_block}
A. MODEL — describe in extreme detail:
- Gender and estimated age (e.g. "Asian woman, approximately 25 years old")
- Ethnicity and EXACT skin tone (e.g. "East Asian, fair porcelain skin tone")
- Face shape (oval/round/heart-shaped) and distinguishing features
- Eyes: shape, color, spacing, visible makeup
- Nose and lips: shape, fullness, color
- Hair: EXACT color, length, style, texture (straight/wavy/curly)
- Body: estimated height, build (slim/athletic/curvy)
- Overall style

B. GARMENT — describe in extreme detail:
- Garment type (shirt/dress/jacket/pants...)
- EXACT colors using specific color names ("coral pink", "navy blue", "emerald green")
- Pattern: stripes/floral/solid/geometric, with pattern size and colors
- Material and texture: cotton/silk/denim/leather, matte or glossy
- Fit and silhouette: oversized/fitted/loose/tailored
- Construction: neckline, collar, sleeves, buttons, pockets, zippers
- Any SPECIAL elements: logos, embroidery, prints, unique design details
- If the image is a sketch: describe the design and suggest suitable colors

C. BACKGROUND:
{background_note}

D. THEME & POSES:
- Pick one suitable theme (High Fashion / Street Style / Editorial / Commercial)
- Define exactly 3 poses: front view, side or three-quarter view, back view

Return JSON in exactly this shape:
{{
  "modelDescription": "extremely detailed model description in English, 150-200 words, focused on identifying features: face shape, eye shape and color, nose, lips, skin tone, hair color and style, body type, height estimate",
  "garmentDescription": "extremely detailed garment description in English, 150-200 words, focused on: exact garment type, precise color names, patterns with sizes and colors, material and texture, fit and silhouette, neckline, sleeves, closures, pockets, unique design elements",
  "backgroundDescription": "detailed background description in English, 80-100 words",
  "theme": "theme name",
  "poses": [
    {{"name": "Front View", "description": "detailed front pose"}},
    {{"name": "Side View", "description": "detailed side pose"}},
    {{"name": "Back View", "description": "detailed back pose"}}
  ]
}}

Return ONLY the JSON, no other text."#
    )
}

fn format_context_block(context: &PromptContext) -> String {
    let mut lines = vec!["\nAdditional context from the user:".to_string()];
    if let Some(name) = &context.product_name {
        lines.push(format!("- Product name: {}", name));
    }
    if let Some(description) = &context.product_description {
        lines.push(format!("- Product description: {}", description));
    }
    if let Some(model) = &context.model_description {
        lines.push(format!("- Preferred model look: {}", model));
    }
    if let Some(background) = &context.background_description {
        lines.push(format!("- Preferred background: {}", background));
    }
    if let Some(category) = &context.background_category {
        lines.push(format!("- Background category: {}", category));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Prompt for the seed image: the first pose rendered from the full
/// descriptions plus explicit photographic-quality instructions.
pub fn seed_prompt(description: &DetailedDescription, pose: &Pose) -> String {
    format!(
        r#"Professional fashion photography, {theme} style.

CRITICAL: Generate EXACTLY this specific person and outfit:

MODEL DESCRIPTION (MUST MATCH EXACTLY):
{model}

GARMENT DESCRIPTION (MUST MATCH EXACTLY):
{garment}

BACKGROUND:
{background}

POSE:
{pose}

IMPORTANT CONSISTENCY REQUIREMENTS:
- The model MUST have ALL the physical features described above (face shape, eyes, nose, lips, skin tone, hair)
- The outfit MUST match ALL details described (exact colors, patterns, design, materials)
- Use the EXACT background described
- Professional fashion photography quality, 4K resolution, cinematic lighting
- The model should look natural and realistic, not cartoon or illustration

Photography specifications:
- Camera: Full-frame DSLR, 85mm portrait lens
- Lighting: Professional studio lighting or natural light as specified
- Focus: Sharp focus on model and outfit
- Style: High-end fashion editorial photography"#,
        theme = description.theme,
        model = description.model_description,
        garment = description.garment_description,
        background = description.background_description,
        pose = pose.description,
    )
}

/// Prompt for a pose variation. Identity is re-asserted purely through the
/// repeated textual descriptions; no pixel data from the seed is passed
/// back, since no image-edit API is assumed available.
pub fn variation_prompt(description: &DetailedDescription, pose: &Pose) -> String {
    format!(
        r#"Professional fashion photography.

CRITICAL: Keep EXACTLY the same person and outfit from the reference shoot. ONLY change the pose.

WHAT TO KEEP (DO NOT CHANGE):
- Same model: exact same face, same skin tone, same hair, same body type
- Same outfit: exact same clothing design, colors, patterns, materials
- Same background and lighting setup

WHAT TO CHANGE:
New pose: {pose}

CONSISTENCY IS CRITICAL:
- The person's face MUST be identical to the reference shoot
- The clothing MUST be identical to the reference shoot
- ONLY the body pose and camera angle should change
- Maintain professional fashion photography quality, 4K resolution

REFERENCE DETAILS (for consistency):
Model: {model}
Garment: {garment}
Background: {background}"#,
        pose = pose.description,
        model = description.model_description,
        garment = description.garment_description,
        background = description.background_description,
    )
}
