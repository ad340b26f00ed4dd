use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::task::{Priority, TaskType};
use crate::ops::gantt::user_class_index;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    /// Background of weekend columns on the Gantt day scale
    pub weekend_bg: Color,
    /// Gantt bar colors for `wx-user-1`, `wx-user-2`, ... (cycled)
    pub user_colors: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            blue: Color::Rgb(0x44, 0x88, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            weekend_bg: Color::Rgb(0x1A, 0x0E, 0x2E),
            user_colors: vec![
                Color::Rgb(0x9F, 0xB3, 0xDF),
                Color::Rgb(0x9E, 0xC6, 0xF3),
                Color::Rgb(0xBD, 0xDD, 0xE4),
                Color::Rgb(0xFA, 0xE7, 0xF3),
                Color::Rgb(0xFF, 0xE3, 0xA9),
            ],
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the `[ui]` config section, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "cyan" => theme.cyan = color,
                "purple" => theme.purple = color,
                "blue" => theme.blue = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_border" => theme.selection_border = color,
                "weekend_bg" => theme.weekend_bg = color,
                _ => {}
            }
        }

        // A non-empty user palette replaces the default one; bad entries are skipped
        let users: Vec<Color> = ui
            .user_colors
            .iter()
            .filter_map(|c| parse_hex_color(c))
            .collect();
        if !users.is_empty() {
            theme.user_colors = users;
        }

        theme
    }

    /// Bar color for a `wx-user-N` class. Unclassed bars use the dim color.
    pub fn user_color(&self, class: Option<&str>) -> Color {
        match class.and_then(user_class_index) {
            Some(n) if n > 0 && !self.user_colors.is_empty() => {
                self.user_colors[(n - 1) % self.user_colors.len()]
            }
            _ => self.dim,
        }
    }

    pub fn type_color(&self, task_type: TaskType) -> Color {
        match task_type {
            TaskType::General => self.dim,
            TaskType::Fe => self.cyan,
            TaskType::Be => self.purple,
        }
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::High => self.red,
            Priority::Medium => self.yellow,
            Priority::Low => self.green,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#9FB3DF"),
            Some(Color::Rgb(0x9F, 0xB3, 0xDF))
        );
        assert_eq!(parse_hex_color("9FB3DF"), None);
        assert_eq!(parse_hex_color("#9FB3"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color("#a\u{e9}\u{e9}b"), None);
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("weekend_bg".into(), "#101010".into());
        ui.colors.insert("nonsense".into(), "#101010".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.weekend_bg, Color::Rgb(0x10, 0x10, 0x10));
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
        assert_eq!(theme.user_colors.len(), 5);
    }

    #[test]
    fn test_user_palette_override() {
        let ui = UiConfig {
            user_colors: vec!["#112233".into(), "bad".into(), "#445566".into()],
            ..Default::default()
        };
        let theme = Theme::from_config(&ui);
        assert_eq!(
            theme.user_colors,
            vec![Color::Rgb(0x11, 0x22, 0x33), Color::Rgb(0x44, 0x55, 0x66)]
        );
        // Palette cycles past its end
        assert_eq!(
            theme.user_color(Some("wx-user-3")),
            Color::Rgb(0x11, 0x22, 0x33)
        );
    }

    #[test]
    fn test_user_color_fallback() {
        let theme = Theme::default();
        assert_eq!(theme.user_color(Some("wx-user-1")), theme.user_colors[0]);
        assert_eq!(theme.user_color(Some("task")), theme.dim);
        assert_eq!(theme.user_color(None), theme.dim);
    }
}
