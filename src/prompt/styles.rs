/// Full style catalog, grouped by category.
pub const STYLE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Photography",
        &[
            "Portrait Photography",
            "Street Photography",
            "Macro Photography",
            "Long Exposure",
            "Film Noir",
            "Polaroid",
        ],
    ),
    (
        "Traditional Art",
        &[
            "Watercolor",
            "Oil Painting",
            "Charcoal Sketch",
            "Ink Wash",
            "Pastel Drawing",
            "Impressionism",
        ],
    ),
    (
        "Digital Art",
        &[
            "Digital Painting",
            "Concept Art",
            "Pixel Art",
            "Vaporwave",
            "Low Poly",
            "Glitch Art",
        ],
    ),
    (
        "Illustration",
        &[
            "Anime",
            "Comic Book",
            "Children's Book",
            "Flat Vector",
            "Line Art",
            "Ukiyo-e",
        ],
    ),
    (
        "3D & Render",
        &[
            "3D Render",
            "Claymation",
            "Isometric",
            "Unreal Engine",
            "Papercraft",
        ],
    ),
    (
        "Movements",
        &[
            "Art Nouveau",
            "Art Deco",
            "Surrealism",
            "Pop Art",
            "Cyberpunk",
            "Steampunk",
        ],
    ),
];

/// Short list shown unless the full catalog is requested.
pub const ESSENTIAL_STYLES: &[&str] = &[
    "Photorealistic",
    "Watercolor",
    "Oil Painting",
    "Digital Painting",
    "Anime",
    "Comic Book",
    "3D Render",
    "Pixel Art",
    "Cyberpunk",
    "Surrealism",
];

/// Every style as a `"Category - Style"` label.
pub fn all_style_labels() -> Vec<String> {
    STYLE_CATEGORIES
        .iter()
        .flat_map(|(category, styles)| {
            styles
                .iter()
                .map(move |style| format!("{} - {}", category, style))
        })
        .collect()
}

pub fn style_labels(list_all: bool) -> Vec<String> {
    if list_all {
        all_style_labels()
    } else {
        ESSENTIAL_STYLES.iter().map(|style| style.to_string()).collect()
    }
}

/// Strips the category from a catalog label; plain names pass through.
pub fn style_name(label: &str) -> &str {
    label.rsplit(" - ").next().unwrap_or(label).trim()
}
