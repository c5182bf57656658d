// Style vocabulary
// Character flags, carrier span attributes and the document-wide style profile

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character-level flags carried by a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl TextStyle {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn bold() -> Self {
        TextStyle {
            bold: true,
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        TextStyle {
            italic: true,
            ..Default::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::plain()
    }
}

/// One of the character-level flags of [`TextStyle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl Flag {
    pub fn get(self, style: &TextStyle) -> bool {
        match self {
            Flag::Bold => style.bold,
            Flag::Italic => style.italic,
            Flag::Underline => style.underline,
            Flag::Strikethrough => style.strikethrough,
        }
    }

    pub fn set(self, style: &mut TextStyle, on: bool) {
        match self {
            Flag::Bold => style.bold = on,
            Flag::Italic => style.italic = on,
            Flag::Underline => style.underline = on,
            Flag::Strikethrough => style.strikethrough = on,
        }
    }
}

/// A font size in CSS pixels, always within [`FontSize::MIN`, `FontSize::MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FontSize(u8);

impl FontSize {
    pub const MIN: u8 = 8;
    pub const MAX: u8 = 72;
    pub const DEFAULT: FontSize = FontSize(16);

    /// Accepts only values inside the valid range
    pub fn new(px: u32) -> Option<Self> {
        if (u32::from(Self::MIN)..=u32::from(Self::MAX)).contains(&px) {
            Some(FontSize(px as u8))
        } else {
            None
        }
    }

    /// Clamp an arbitrary value into the valid range
    pub fn clamped(px: i64) -> Self {
        FontSize(px.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Parse user input the way a numeric control reports it.
    /// Leading whitespace and trailing garbage ("14px") are tolerated,
    /// anything without leading digits or outside the range is rejected.
    pub fn parse(input: &str) -> Option<Self> {
        let digits: String = input
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse::<u32>().ok().and_then(Self::new)
    }

    pub fn px(self) -> u8 {
        self.0
    }

    /// Step by `delta` pixels, clamped to the valid range
    pub fn step(self, delta: i64) -> Self {
        Self::clamped(i64::from(self.0) + delta)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for FontSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        FontSize::new(value).ok_or_else(|| {
            format!(
                "font size {value} outside {}..={}",
                FontSize::MIN,
                FontSize::MAX
            )
        })
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        u32::from(size.0)
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// An sRGB color as produced by a color picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive)
    pub fn parse(input: &str) -> Option<Self> {
        let hex = input.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let mut parts = hex.chars().map(|c| {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    v * 17
                });
                Some(Color::rgb(parts.next()?, parts.next()?, parts.next()?))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("invalid color {value:?}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Identifies one attribute of a [`SpanStyle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKey {
    FontFamily,
    FontSize,
    Color,
    Highlight,
}

/// A single style intent expressed through a toolbar control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleProperty {
    FontFamily(String),
    FontSize(FontSize),
    Color(Color),
    Highlight(Color),
}

impl StyleProperty {
    pub fn key(&self) -> StyleKey {
        match self {
            StyleProperty::FontFamily(_) => StyleKey::FontFamily,
            StyleProperty::FontSize(_) => StyleKey::FontSize,
            StyleProperty::Color(_) => StyleKey::Color,
            StyleProperty::Highlight(_) => StyleKey::Highlight,
        }
    }

    pub fn to_span_style(&self) -> SpanStyle {
        let mut style = SpanStyle::default();
        style.set(self.clone());
        style
    }
}

/// The attribute set declared by a carrier span
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpanStyle {
    pub font_family: Option<String>,
    pub font_size: Option<FontSize>,
    pub color: Option<Color>,
    pub highlight: Option<Color>,
}

impl SpanStyle {
    pub fn is_empty(&self) -> bool {
        self.attribute_count() == 0
    }

    /// Number of declared attributes
    pub fn attribute_count(&self) -> usize {
        usize::from(self.font_family.is_some())
            + usize::from(self.font_size.is_some())
            + usize::from(self.color.is_some())
            + usize::from(self.highlight.is_some())
    }

    pub fn set(&mut self, property: StyleProperty) {
        match property {
            StyleProperty::FontFamily(family) => self.font_family = Some(family),
            StyleProperty::FontSize(size) => self.font_size = Some(size),
            StyleProperty::Color(color) => self.color = Some(color),
            StyleProperty::Highlight(color) => self.highlight = Some(color),
        }
    }

    pub fn clear(&mut self, key: StyleKey) {
        match key {
            StyleKey::FontFamily => self.font_family = None,
            StyleKey::FontSize => self.font_size = None,
            StyleKey::Color => self.color = None,
            StyleKey::Highlight => self.highlight = None,
        }
    }

    pub fn has(&self, key: StyleKey) -> bool {
        match key {
            StyleKey::FontFamily => self.font_family.is_some(),
            StyleKey::FontSize => self.font_size.is_some(),
            StyleKey::Color => self.color.is_some(),
            StyleKey::Highlight => self.highlight.is_some(),
        }
    }

    /// Declared attributes of `self` win over those of `outer`
    pub fn merged_over(&self, outer: &SpanStyle) -> SpanStyle {
        SpanStyle {
            font_family: self
                .font_family
                .clone()
                .or_else(|| outer.font_family.clone()),
            font_size: self.font_size.or(outer.font_size),
            color: self.color.or(outer.color),
            highlight: self.highlight.or(outer.highlight),
        }
    }

    /// True when every attribute declared here is declared identically by `parent`
    pub fn is_redundant_under(&self, parent: &SpanStyle) -> bool {
        let same = |mine: bool, equal: bool| !mine || equal;
        !self.is_empty()
            && same(
                self.font_family.is_some(),
                self.font_family == parent.font_family,
            )
            && same(self.font_size.is_some(), self.font_size == parent.font_size)
            && same(self.color.is_some(), self.color == parent.color)
            && same(self.highlight.is_some(), self.highlight == parent.highlight)
    }

    /// Inline CSS declarations, in a stable order
    pub fn to_css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(family) = &self.font_family
            && is_valid_font_family(family)
        {
            decls.push(format!("font-family: {family}"));
        }
        if let Some(size) = self.font_size {
            decls.push(format!("font-size: {size}"));
        }
        if let Some(color) = self.color {
            decls.push(format!("color: {color}"));
        }
        if let Some(color) = self.highlight {
            decls.push(format!("background-color: {color}"));
        }
        decls.join("; ")
    }
}

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn css_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Size and weight of one heading level, relative to the base size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingStyle {
    pub size_em: f32,
    #[serde(default = "default_true")]
    pub bold: bool,
}

fn default_true() -> bool {
    true
}

/// Base font stack of a fresh profile
pub const DEFAULT_FONT_FAMILY: &str = "Inter, Arial, sans-serif";

/// Whether a font-family list can be written into CSS as-is. Rejects empty
/// input and anything that could end the declaration or the markup around it.
pub fn is_valid_font_family(family: &str) -> bool {
    !family.trim().is_empty()
        && !family
            .chars()
            .any(|c| matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\\') || c.is_control())
}

/// Deserialize a font-family list, refusing values [`is_valid_font_family`] rejects
pub fn deserialize_font_family<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let family = String::deserialize(deserializer)?;
    if is_valid_font_family(&family) {
        Ok(family)
    } else {
        Err(de::Error::custom(format!("invalid font family {family:?}")))
    }
}

/// Deserialize a list of font-family options, each checked like a single family
pub fn deserialize_font_families<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let families = Vec::<String>::deserialize(deserializer)?;
    match families.iter().find(|f| !is_valid_font_family(f)) {
        Some(bad) => Err(de::Error::custom(format!("invalid font family {bad:?}"))),
        None => Ok(families),
    }
}

/// Whole-document defaults, applied uniformly rather than per selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    #[serde(deserialize_with = "deserialize_font_family")]
    pub font_family: String,
    pub font_size: FontSize,
    pub line_height: f32,
    pub text_color: Option<Color>,
    pub background_color: Option<Color>,
    pub h1: HeadingStyle,
    pub h2: HeadingStyle,
    pub h3: HeadingStyle,
}

impl Default for StyleProfile {
    fn default() -> Self {
        StyleProfile {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: FontSize::DEFAULT,
            line_height: 1.6,
            text_color: None,
            background_color: None,
            h1: HeadingStyle {
                size_em: 2.0,
                bold: true,
            },
            h2: HeadingStyle {
                size_em: 1.5,
                bold: true,
            },
            h3: HeadingStyle {
                size_em: 1.25,
                bold: true,
            },
        }
    }
}

impl StyleProfile {
    /// Style of heading `level`; levels are clamped to 1..=3
    pub fn heading(&self, level: u8) -> &HeadingStyle {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            _ => &self.h3,
        }
    }

    pub fn heading_mut(&mut self, level: u8) -> &mut HeadingStyle {
        match level {
            0 | 1 => &mut self.h1,
            2 => &mut self.h2,
            _ => &mut self.h3,
        }
    }

    /// Computed pixel size of a heading, clamped to the valid font-size range
    pub fn heading_size(&self, level: u8) -> FontSize {
        let px = f32::from(self.font_size.px()) * self.heading(level).size_em;
        FontSize::clamped(px.round() as i64)
    }

    /// The first family of the base font stack, without quotes
    pub fn primary_family(&self) -> String {
        primary_family(&self.font_family)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// First entry of a CSS font-family list, stripped of quotes
pub fn primary_family(stack: &str) -> String {
    stack
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}
