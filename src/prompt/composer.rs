use crate::models::{Look, OptionSet};

const PHOTOREALISTIC_TEMPLATE: &str = "create an ultra-realistic photograph of {description} taken with a Sony α7 III camera using an 85mm lens at an f/1.2 aperture. The image should be in 4K resolution, with a focus on capturing the intricate details of the subject. The lighting should be soft and natural, enhancing the textures and colors of the scene. The background should be blurred to create a bokeh effect, drawing attention to the main subject. The overall composition should evoke a sense of realism and depth, making the viewer feel as if they are part of the scene.";

/// Builds the instruction sent to the enhancer from a validated option set.
///
/// Photorealistic requests use a fixed camera template that only depends on
/// the description. Styled requests are assembled clause by clause in a fixed
/// order; a clause whose option is off is left out entirely.
pub fn compose(options: &OptionSet) -> String {
    let style = match options.look() {
        Look::Photorealistic => {
            return PHOTOREALISTIC_TEMPLATE.replace("{description}", options.description())
        }
        Look::Styled(style) => style,
    };

    let mut prompt = format!(
        "Generate an image of {}, styled as {}",
        options.description(),
        style
    );

    match options.background_color() {
        Some(color) => prompt.push_str(&format!(", set against a solid {} background.", color)),
        None => prompt.push('.'),
    }

    if let Some(advanced) = options.advanced() {
        if advanced.resolution_4k {
            prompt.push_str(" The image should be in 4K resolution.");
        }
        if advanced.bokeh {
            prompt.push_str(" The image should have a bokeh effect.");
        }
        if let Some(ratio) = advanced.aspect_ratio {
            prompt.push_str(&format!(" Aspect ratio: {}.", ratio.label()));
        }
        if let Some(extra) = advanced
            .extra_requirements
            .as_deref()
            .map(str::trim)
            .filter(|extra| !extra.is_empty())
        {
            prompt.push_str(&format!(" Extra requirements include: {}", extra));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdvancedOptions, AspectRatio};

    const FOUR_K: &str = " The image should be in 4K resolution.";
    const BOKEH: &str = " The image should have a bokeh effect.";

    fn styled(description: &str) -> crate::models::OptionSetBuilder {
        OptionSet::builder(description).with_style("Watercolor")
    }

    #[test]
    fn test_base_clause_only() {
        let options = styled("a cat surfing").build().unwrap();
        assert_eq!(
            compose(&options),
            "Generate an image of a cat surfing, styled as Watercolor."
        );
    }

    #[test]
    fn test_background_color_clause() {
        let options = styled("a cat surfing")
            .with_background_color("#ff0000")
            .build()
            .unwrap();
        assert_eq!(
            compose(&options),
            "Generate an image of a cat surfing, styled as Watercolor, set against a solid #ff0000 background."
        );
    }

    #[test]
    fn test_all_advanced_clauses_in_order() {
        let options = styled("  a lighthouse at dusk ")
            .with_background_color("#ffffff")
            .with_advanced(AdvancedOptions {
                resolution_4k: true,
                bokeh: true,
                aspect_ratio: Some(AspectRatio::Landscape),
                extra_requirements: Some("  dramatic lighting ".into()),
            })
            .build()
            .unwrap();

        assert_eq!(
            compose(&options),
            "Generate an image of a lighthouse at dusk, styled as Watercolor, set against a solid #ffffff background. \
The image should be in 4K resolution. The image should have a bokeh effect. \
Aspect ratio: Landscape (16:9). Extra requirements include: dramatic lighting"
        );
    }

    #[test]
    fn test_each_clause_present_iff_enabled() {
        for mask in 0u8..16 {
            let advanced = AdvancedOptions {
                resolution_4k: mask & 1 != 0,
                bokeh: mask & 2 != 0,
                aspect_ratio: (mask & 4 != 0).then_some(AspectRatio::Square),
                extra_requirements: (mask & 8 != 0).then(|| "no text".to_string()),
            };
            let prompt = compose(&styled("a fox").with_advanced(advanced).build().unwrap());

            assert_eq!(prompt.contains(FOUR_K), mask & 1 != 0);
            assert_eq!(prompt.contains(BOKEH), mask & 2 != 0);
            assert_eq!(prompt.contains("Aspect ratio: Square (1:1)."), mask & 4 != 0);
            assert_eq!(prompt.contains("Extra requirements include: no text"), mask & 8 != 0);

            let positions: Vec<usize> = [FOUR_K, BOKEH, " Aspect ratio:", " Extra requirements"]
                .iter()
                .filter_map(|clause| prompt.find(clause))
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_advanced_disabled_emits_no_advanced_clauses() {
        let prompt = compose(&styled("a fox").build().unwrap());
        assert!(!prompt.contains("4K"));
        assert!(!prompt.contains("bokeh"));
        assert!(!prompt.contains("Aspect ratio"));
    }

    #[test]
    fn test_photorealistic_ignores_everything_but_description() {
        let plain = OptionSet::builder("an old fisherman")
            .photorealistic(true)
            .build()
            .unwrap();
        let decorated = OptionSet::builder("an old fisherman")
            .photorealistic(true)
            .with_style("Anime")
            .with_background_color("#123456")
            .with_advanced(AdvancedOptions {
                resolution_4k: false,
                bokeh: false,
                aspect_ratio: Some(AspectRatio::Cinematic),
                extra_requirements: Some("neon".into()),
            })
            .build()
            .unwrap();

        let prompt = compose(&plain);
        assert_eq!(prompt, compose(&decorated));
        assert!(prompt.starts_with(
            "create an ultra-realistic photograph of an old fisherman taken with a Sony α7 III camera"
        ));
        assert!(prompt.ends_with("making the viewer feel as if they are part of the scene."));
    }
}
