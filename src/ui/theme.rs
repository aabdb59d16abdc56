use std::fs;

use factdrill::display::LineTone;
use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub accent: String,
    pub border: String,
    pub border_focused: String,
    pub cell_bg: String,
    pub cover: String,
    pub divider: String,
    pub divider_dim: String,
    pub correct: String,
    pub incorrect: String,
    pub warning: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub key_bg: String,
    pub key_fg: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // Try user themes dir
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("factdrill")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path)
                && let Ok(theme) = toml::from_str::<Theme>(&content)
            {
                return Some(theme);
            }
        }

        // Try bundled themes
        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("chalkboard").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1f2d24".to_string(),
            fg: "#f2f2e9".to_string(),
            accent: "#f6d365".to_string(),
            border: "#5b6f60".to_string(),
            border_focused: "#f6d365".to_string(),
            cell_bg: "#26382c".to_string(),
            cover: "#3f5246".to_string(),
            divider: "#f2f2e9".to_string(),
            divider_dim: "#7d8c81".to_string(),
            correct: "#9be29b".to_string(),
            incorrect: "#ff8f8f".to_string(),
            warning: "#f6d365".to_string(),
            bar_filled: "#f6d365".to_string(),
            bar_empty: "#33463a".to_string(),
            key_bg: "#33463a".to_string(),
            key_fg: "#f2f2e9".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && hex.is_ascii()
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn cell_bg(&self) -> Color { Self::parse_color(&self.cell_bg) }
    pub fn cover(&self) -> Color { Self::parse_color(&self.cover) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn key_bg(&self) -> Color { Self::parse_color(&self.key_bg) }
    pub fn key_fg(&self) -> Color { Self::parse_color(&self.key_fg) }

    /// Divider color for a tone. A transparent line is drawn in the cell
    /// background so it occupies space without showing.
    pub fn line(&self, tone: LineTone) -> Color {
        match tone {
            LineTone::Transparent => self.cell_bg(),
            LineTone::Solid => Self::parse_color(&self.divider),
            LineTone::Gray => Self::parse_color(&self.divider_dim),
        }
    }
}
