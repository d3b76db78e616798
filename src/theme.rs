//! Launcher theme tokens: colour palette and font stack.
//!
//! The renderer consumes these as plain configuration. Users can override a
//! handful of colours from the appearance settings; overrides are merged onto
//! a base theme and never mutate it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("Invalid colour '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),
}

/// A validated hex colour, stored as lowercase `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse `#rgb` or `#rrggbb` (case-insensitive). Short forms are expanded.
    pub fn parse(value: &str) -> Result<Color, ThemeError> {
        let invalid = || ThemeError::InvalidColor(value.to_string());
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return Err(invalid()),
        };
        Ok(Color(format!("#{}", expanded.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or_default()
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }

    fn builtin(hex: &'static str) -> Color {
        Color(hex.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Color {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Named colour tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Main background
    pub main: Color,
    /// Cards and side bars
    pub darker: Color,
    /// Hover surfaces
    pub light: Color,
    /// Primary text
    pub text: Color,
    /// Secondary text
    pub muted: Color,
    /// Accent (buttons, highlights)
    pub accent: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            main: Color::builtin("#36393f"),
            darker: Color::builtin("#2f3136"),
            light: Color::builtin("#40444b"),
            text: Color::builtin("#dcddde"),
            muted: Color::builtin("#b9bbbe"),
            accent: Color::builtin("#5865f2"),
        }
    }
}

/// Full theme: palette, background gradient and sans-serif font stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub palette: Palette,

    /// Gradient background (top, bottom). `None` uses `(main, darker)`.
    pub background: Option<(Color, Color)>,

    pub font_sans: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            background: None,
            font_sans: ["Inter", "Roboto", "Helvetica Neue", "Arial", "sans-serif"]
                .iter()
                .map(|font| font.to_string())
                .collect(),
        }
    }
}

impl Theme {
    /// Background gradient as (top, bottom).
    pub fn background(&self) -> (Color, Color) {
        self.background.clone().unwrap_or_else(|| {
            (self.palette.main.clone(), self.palette.darker.clone())
        })
    }

    /// A copy of this theme with the user's overrides applied.
    pub fn merged(&self, overrides: &ThemeOverrides) -> Theme {
        let mut theme = self.clone();
        let palette = &mut theme.palette;

        if let Some(accent) = &overrides.accent {
            palette.accent = accent.clone();
        }
        if let Some(card_bg) = &overrides.card_bg {
            palette.darker = card_bg.clone();
        }
        if let Some(text_main) = &overrides.text_main {
            palette.text = text_main.clone();
        }

        if overrides.bg_top.is_some() || overrides.bg_bottom.is_some() {
            let (top, bottom) = self.background();
            theme.background = Some((
                overrides.bg_top.clone().unwrap_or(top),
                overrides.bg_bottom.clone().unwrap_or(bottom),
            ));
        }
        theme
    }

    /// CSS font-family value, quoting names that contain spaces.
    pub fn font_family(&self) -> String {
        self.font_sans
            .iter()
            .map(|font| {
                if font.contains(' ') {
                    format!("\"{}\"", font)
                } else {
                    font.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Colours a user can customize from the appearance settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOverrides {
    pub accent: Option<Color>,
    pub card_bg: Option<Color>,
    pub bg_top: Option<Color>,
    pub bg_bottom: Option<Color>,
    pub text_main: Option<Color>,
}

impl ThemeOverrides {
    pub fn is_empty(&self) -> bool {
        *self == ThemeOverrides::default()
    }
}
