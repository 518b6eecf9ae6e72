//! Builds the edit prompt from a sanitized [`GenerationRequest`].
//!
//! Sections are emitted in a fixed order. The edit model weighs later
//! instructions more heavily, so the reference block, when present, is last.

use super::request::{GenerationRequest, Mode};

const SCENE_DEFAULT: &str = "real Costa Rica environment, tasteful composition, natural light";

const SCENE_DEFAULT_WITH_REFERENCE: &str = "recreate the setting, camera position and light of the \
reference image, placing the bottle as the product in that scene";

const PRODUCT_PRESERVATION: &str = r#"Product preservation:
Use the provided bottle image as the exact product. Do not modify bottle geometry or proportions.
Do not warp, stretch, bend or melt the bottle. Do not change the cap, its color or its shape.
Photorealistic commercial beverage photography with natural optical physics.
Realistic plastic refraction and reflections. Real condensation droplets only where plausible.
Authentic daylight behavior. No HDR exaggeration. No volumetric rays. No 3D render look.
No volcano eruption, no lava, no catastrophes."#;

const LABEL_PRESERVATION: &str = r#"Label preservation:
Keep the label exactly as in the product image: same position, size, colors and wrap around the bottle.
Do not alter, translate, re-letter or re-typeset any text. Do not invent logos, seals or claims.
The label must stay readable and face the camera."#;

const LABEL_ILLUSTRATION: &str = r#"Label illustration integrity:
The artwork printed on the label is part of the product. Do not redraw, simplify, recolor or extend it.
Do not let the scene bleed into the label. Elements of the label illustration must not appear as real objects in the scene."#;

const PRODUCT_HIERARCHY: &str = r#"Product hierarchy:
This bottle is the only branded item in frame. No other bottles, cans, cups or packaging.
No external brands, logos, signage or readable text anywhere in the scene.
Props and people, if any, support the product and never compete with it."#;

const COMPOSITION: &str = r#"Composition:
Hero product framing, readable label, correct proportions and realistic scale.
Real camera feel, realistic depth of field, natural bokeh, subtle color grading.
Keep the bottle in sharp focus and fully inside the frame."#;

const COMPOSITION_WITH_REFERENCE: &str = r#"Composition:
Keep correct proportions, realistic scale and a readable label.
Do not recenter the bottle or force a symmetric hero layout; preserve the framing and asymmetry of the reference.
Keep the bottle in sharp focus and fully inside the frame."#;

const REFERENCE_DOMINANCE: &str = r#"Reference image (highest priority):
The first image is a framing reference, the second image is the product.
Match the reference exactly in camera angle, camera height, subject distance, lens feel, crop and lighting direction.
Match its color temperature, contrast and time of day.
Do not copy any identifying content from the reference: no faces, people's likeness, logos, text, labels or products from it.
Only the product from the second image may appear as the branded item."#;

/// Style sentence for a visual preset.
pub fn mode_style(mode: Mode) -> &'static str {
    match mode {
        Mode::Naturaleza => {
            "documentary tropical nature, real Costa Rica, natural daylight, authentic textures, no dramatization"
        }
        Mode::Spot => {
            "clean commercial spot look, controlled lighting, premium but realistic, simple composition"
        }
        Mode::Corporativo => {
            "corporate minimal look, clean background, sober premium lighting, institutional style"
        }
        Mode::Caribe => {
            "fresh Caribbean natural look, bright but real light, turquoise ocean bokeh, no resort glam exaggeration"
        }
        Mode::Publicitario => {
            "advertising hero product composition, poster-like framing, product dominant, realistic"
        }
    }
}

pub fn compose(request: &GenerationRequest) -> String {
    let with_reference = request.has_reference();

    let scene = match request.scene.as_deref() {
        Some(scene) => scene,
        None if with_reference => SCENE_DEFAULT_WITH_REFERENCE,
        None => SCENE_DEFAULT,
    };

    let composition = if with_reference {
        COMPOSITION_WITH_REFERENCE
    } else {
        COMPOSITION
    };

    let mut sections = vec![
        format!("Style:\n{}.", mode_style(request.mode)),
        format!("Scene direction:\n{}", scene),
        PRODUCT_PRESERVATION.to_string(),
        LABEL_PRESERVATION.to_string(),
        LABEL_ILLUSTRATION.to_string(),
        PRODUCT_HIERARCHY.to_string(),
        composition.to_string(),
    ];

    if with_reference {
        sections.push(REFERENCE_DOMINANCE.to_string());
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_reference() -> GenerationRequest {
        GenerationRequest {
            reference_image_url: Some("https://example.com/ref.jpg".to_string()),
            ..GenerationRequest::default()
        }
    }

    #[test]
    fn compose_is_deterministic() {
        let request = with_reference();
        assert_eq!(compose(&request), compose(&request.clone()));
    }

    #[test]
    fn default_request_golden_prefix() {
        let prompt = compose(&GenerationRequest::default());
        let expected_head = "Style:\n\
            advertising hero product composition, poster-like framing, product dominant, realistic.\n\
            \n\
            Scene direction:\n\
            real Costa Rica environment, tasteful composition, natural light\n\
            \n\
            Product preservation:\n";
        assert!(prompt.starts_with(expected_head), "{prompt}");
        assert!(prompt.ends_with(COMPOSITION));
    }

    #[test]
    fn sections_follow_fixed_order() {
        let prompt = compose(&with_reference());
        let headers = [
            "Style:",
            "Scene direction:",
            "Product preservation:",
            "Label preservation:",
            "Label illustration integrity:",
            "Product hierarchy:",
            "Composition:",
            "Reference image (highest priority):",
        ];
        let positions: Vec<usize> = headers
            .iter()
            .map(|header| prompt.find(header).expect(header))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(prompt.ends_with(REFERENCE_DOMINANCE));
    }

    #[test]
    fn reference_block_only_in_reference_mode() {
        let plain = compose(&GenerationRequest::default());
        assert!(!plain.contains("Reference image"));
        assert!(plain.contains(COMPOSITION));
        assert!(!plain.contains(COMPOSITION_WITH_REFERENCE));

        let referenced = compose(&with_reference());
        assert!(referenced.contains(COMPOSITION_WITH_REFERENCE));
        assert!(referenced.contains(SCENE_DEFAULT_WITH_REFERENCE));
        assert!(!referenced.contains(SCENE_DEFAULT));
    }

    #[test]
    fn user_scene_replaces_default() {
        let request = GenerationRequest {
            mode: Mode::Caribe,
            scene: Some("bottle on wet sand at sunrise".to_string()),
            ..GenerationRequest::default()
        };
        let prompt = compose(&request);
        assert!(prompt.contains("Scene direction:\nbottle on wet sand at sunrise\n"));
        assert!(prompt.contains(mode_style(Mode::Caribe)));
        assert!(!prompt.contains(SCENE_DEFAULT));
    }
}
