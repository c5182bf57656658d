// Toolbar command identifiers
// Buttons carry an identifier and an optional value; this turns them into
// typed commands before they reach the editor.

use super::structured_document::BlockType;
use super::style::{Alignment, Color, Flag, FontSize, StyleProperty, is_valid_font_family};
use crate::error::CommandError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleFlag(Flag),
    Align(Alignment),
    FormatBlock(BlockType),
    Style(StyleProperty),
    RemoveFormat,
}

impl Command {
    /// Parse a command identifier and its optional value.
    /// Identifiers match case-insensitively.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Command, CommandError> {
        let invalid = || CommandError::InvalidValue {
            command: name.to_string(),
            value: value.unwrap_or_default().to_string(),
        };
        let command = match name.trim().to_ascii_lowercase().as_str() {
            "bold" => Command::ToggleFlag(Flag::Bold),
            "italic" => Command::ToggleFlag(Flag::Italic),
            "underline" => Command::ToggleFlag(Flag::Underline),
            "strikethrough" => Command::ToggleFlag(Flag::Strikethrough),
            "justifyleft" => Command::Align(Alignment::Left),
            "justifycenter" => Command::Align(Alignment::Center),
            "justifyright" => Command::Align(Alignment::Right),
            "justifyfull" => Command::Align(Alignment::Justify),
            "removeformat" => Command::RemoveFormat,
            "formatblock" => {
                Command::FormatBlock(value.and_then(BlockType::parse).ok_or_else(invalid)?)
            }
            "fontsize" => Command::Style(StyleProperty::FontSize(
                value.and_then(FontSize::parse).ok_or_else(invalid)?,
            )),
            "fontname" => {
                let family = value.map(str::trim).filter(|v| is_valid_font_family(v));
                Command::Style(StyleProperty::FontFamily(
                    family.ok_or_else(invalid)?.to_string(),
                ))
            }
            "forecolor" => Command::Style(StyleProperty::Color(
                value.and_then(Color::parse).ok_or_else(invalid)?,
            )),
            "hilitecolor" | "backcolor" => Command::Style(StyleProperty::Highlight(
                value.and_then(Color::parse).ok_or_else(invalid)?,
            )),
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
    }

    /// Parse the `NAME` or `NAME=VALUE` form used on the command line
    pub fn parse_spec(spec: &str) -> Result<Command, CommandError> {
        match spec.split_once('=') {
            Some((name, value)) => Command::parse(name, Some(value)),
            None => Command::parse(spec, None),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ToggleFlag(flag) => write!(f, "{flag:?}"),
            Command::Align(alignment) => write!(f, "align {}", alignment.css_value()),
            Command::FormatBlock(block_type) => write!(f, "formatBlock {}", block_type.tag_name()),
            Command::Style(property) => write!(f, "style {property:?}"),
            Command::RemoveFormat => write!(f, "removeFormat"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toolbar_identifiers() {
        assert_eq!(
            Command::parse("strikeThrough", None),
            Ok(Command::ToggleFlag(Flag::Strikethrough))
        );
        assert_eq!(
            Command::parse("justifyFull", None),
            Ok(Command::Align(Alignment::Justify))
        );
        assert_eq!(
            Command::parse("formatBlock", Some("<H2>")),
            Ok(Command::FormatBlock(BlockType::heading(2)))
        );
        assert_eq!(
            Command::parse("hiliteColor", Some("#ffff00")),
            Ok(Command::Style(StyleProperty::Highlight(Color::rgb(255, 255, 0))))
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Command::parse("fontSize", Some("99")),
            Err(CommandError::InvalidValue { .. })
        ));
        assert!(matches!(
            Command::parse("fontSize", None),
            Err(CommandError::InvalidValue { .. })
        ));
        assert!(matches!(
            Command::parse("fontName", Some("  ")),
            Err(CommandError::InvalidValue { .. })
        ));
        let rejected = [
            "Georgia; color: red",
            "Inter}</style><script>",
            "A\"B",
            "Serif\nX",
        ];
        for family in rejected {
            assert!(matches!(
                Command::parse("fontName", Some(family)),
                Err(CommandError::InvalidValue { .. })
            ));
        }
        let family = "'Times New Roman', serif";
        assert_eq!(
            Command::parse("fontName", Some(family)),
            Ok(Command::Style(StyleProperty::FontFamily(family.into())))
        );
        assert_eq!(
            Command::parse("insertImage", None),
            Err(CommandError::Unknown("insertImage".into()))
        );
    }

    #[test]
    fn test_parse_spec() {
        assert_eq!(
            Command::parse_spec("fontSize=24"),
            Ok(Command::Style(StyleProperty::FontSize(FontSize::new(24).unwrap())))
        );
        assert_eq!(Command::parse_spec("bold"), Ok(Command::ToggleFlag(Flag::Bold)));
    }
}
