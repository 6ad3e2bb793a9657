//! `generate_moodboard`

use super::{Tool, ToolError, required_str};
use serde_json::{Value, json};
use uuid::Uuid;

const MAX_ELEMENTS: usize = 5;

const STYLES: &[(&str, &[&str])] = &[
    ("traditional", &["traditional", "classic", "heritage", "royal", "regal", "temple"]),
    ("modern", &["modern", "contemporary", "minimalist", "sleek", "chic"]),
    ("fusion", &["fusion", "indo-western", "mix", "blend"]),
    ("vintage", &["vintage", "retro", "old-world", "antique"]),
    ("bohemian", &["boho", "bohemian", "free-spirited", "rustic"]),
];

const COLORS: &[&str] = &[
    "red", "gold", "pink", "pastel", "ivory", "white", "burgundy", "green", "blue",
];

const THEMES: &[&str] = &[
    "royal",
    "garden",
    "beach",
    "palace",
    "destination",
    "intimate",
    "grand",
];

const PALETTES: &[(&str, [&str; 5])] = &[
    ("traditional", ["#8B0000", "#D4AF37", "#FFD700", "#800020", "#F5E6CC"]),
    ("modern", ["#E8D5B7", "#B8860B", "#FFFFFF", "#1C1C1C", "#C9A86C"]),
    ("fusion", ["#DDA0DD", "#FFB6C1", "#D4AF37", "#F0E68C", "#E6E6FA"]),
    ("vintage", ["#D4A76A", "#C19A6B", "#F5F5DC", "#8B4513", "#DEB887"]),
    ("bohemian", ["#D2691E", "#F4A460", "#8FBC8F", "#DAA520", "#F5DEB3"]),
    ("pink", ["#FFB6C1", "#FF69B4", "#FFC0CB", "#DB7093", "#F5E6E8"]),
    ("gold", ["#FFD700", "#D4AF37", "#B8860B", "#DAA520", "#F5E6CC"]),
    ("red", ["#8B0000", "#DC143C", "#B22222", "#800000", "#FFE4E1"]),
];

const DEFAULT_PALETTE: [&str; 5] = ["#D4AF37", "#FFFAF0", "#8B0000", "#F5E6CC", "#2C2C2C"];

/// (type, name, description)
type Element = (&'static str, &'static str, &'static str);

const ELEMENTS: &[(&str, [Element; 3])] = &[
    (
        "traditional",
        [
            ("decor", "Marigold garlands", "Classic orange and yellow florals"),
            ("lighting", "Brass diyas", "Traditional oil lamps"),
            ("fabric", "Banarasi drapes", "Rich silk with zari work"),
        ],
    ),
    (
        "modern",
        [
            ("decor", "Geometric centerpieces", "Clean lines and metallic accents"),
            ("lighting", "Fairy light canopy", "Minimalist warm lighting"),
            ("fabric", "Sheer white drapes", "Elegant and understated"),
        ],
    ),
    (
        "fusion",
        [
            ("decor", "Acrylic mandap", "Modern structure with floral accents"),
            ("lighting", "Crystal chandeliers", "Blend of classic and contemporary"),
            ("fabric", "Ombre drapes", "Gradient colors for drama"),
        ],
    ),
];

const DEFAULT_ELEMENTS: [Element; 3] = [
    ("decor", "Fresh floral arrangements", "Seasonal blooms"),
    ("lighting", "Warm ambient lighting", "Romantic atmosphere"),
    ("fabric", "Coordinated linens", "Matching table settings"),
];

/// Style, color, then theme tags found in the prompt, in that order.
fn style_tags(prompt: &str) -> Vec<&'static str> {
    let prompt = prompt.to_lowercase();
    let mut tags: Vec<&'static str> = STYLES
        .iter()
        .filter(|(_, words)| words.iter().any(|w| prompt.contains(w)))
        .map(|(style, _)| *style)
        .collect();
    tags.extend(COLORS.iter().filter(|c| prompt.contains(*c)));
    tags.extend(THEMES.iter().filter(|t| prompt.contains(*t)));

    if tags.is_empty() {
        tags.extend(["elegant", "indian-wedding"]);
    }
    tags
}

/// Palette of the first tag that has one.
fn palette(tags: &[&str]) -> [&'static str; 5] {
    tags.iter()
        .find_map(|tag| PALETTES.iter().find(|(name, _)| name == tag))
        .map(|(_, colors)| *colors)
        .unwrap_or(DEFAULT_PALETTE)
}

fn elements(tags: &[&str]) -> Vec<Value> {
    let mut picked: Vec<Element> = tags
        .iter()
        .filter_map(|tag| ELEMENTS.iter().find(|(name, _)| name == tag))
        .flat_map(|(_, items)| items.iter().copied())
        .collect();
    if picked.is_empty() {
        picked.extend(DEFAULT_ELEMENTS);
    }
    picked
        .into_iter()
        .take(MAX_ELEMENTS)
        .map(|(kind, name, description)| {
            json!({ "type": kind, "name": name, "description": description })
        })
        .collect()
}

pub struct MoodboardTool;

impl Tool for MoodboardTool {
    fn name(&self) -> &'static str {
        "generate_moodboard"
    }

    fn description(&self) -> &'static str {
        "Create a visual moodboard based on wedding style preferences. Use when users want to visualize their wedding aesthetic or need inspiration."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Description of the wedding style, colors, and theme (e.g., \"Royal traditional with gold and burgundy\", \"Modern minimalist beach wedding\")"
                }
            },
            "required": ["prompt"]
        })
    }

    fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let prompt = required_str(args, "prompt")?;
        let tags = style_tags(prompt);
        let id = Uuid::new_v4().simple().to_string();
        let moodboard_id = format!("MB-{}", &id[..8]);

        Ok(json!({
            "moodboard_url": format!("https://weddingease.com/moodboards/{moodboard_id}"),
            "moodboard_id": moodboard_id,
            "prompt": prompt,
            "style_tags": tags,
            "color_palette": palette(&tags),
            "elements": elements(&tags),
            "note": "This is a conceptual moodboard. Save it to your collection or share with vendors for reference.",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_style_color_theme_order() {
        let tags = style_tags("Royal traditional with gold and burgundy");
        assert_eq!(tags, ["traditional", "gold", "burgundy", "royal"]);
    }

    #[test]
    fn default_tags() {
        assert_eq!(style_tags("something lovely"), ["elegant", "indian-wedding"]);
        assert_eq!(palette(&["elegant"]), DEFAULT_PALETTE);
    }

    #[test]
    fn palette_uses_first_known_tag() {
        assert_eq!(palette(&["garden", "pink", "red"])[1], "#FF69B4");
    }

    #[test]
    fn elements_are_capped() {
        let tags = style_tags("modern fusion with a traditional touch");
        let picked = elements(&tags);
        assert_eq!(picked.len(), 5);
        assert_eq!(picked[0]["name"], "Marigold garlands");
    }

    #[test]
    fn moodboard_shape() {
        let result = MoodboardTool
            .execute(&json!({"prompt": "Modern minimalist beach wedding"}))
            .unwrap();
        let id = result["moodboard_id"].as_str().unwrap();
        assert!(id.starts_with("MB-"));
        assert_eq!(id.len(), 11);
        assert!(result["moodboard_url"].as_str().unwrap().ends_with(id));
        assert_eq!(result["color_palette"][0], "#E8D5B7");
        assert_eq!(result["elements"].as_array().unwrap().len(), 3);
    }
}
