//! Line-oriented command script read from stdin.

use chalkboard_core::color::RgbHex;
use chalkboard_core::tools::ToolKind;
use kurbo::Point;
use std::num::NonZeroU32;
use thiserror::Error;

/// One scripted action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Tool(ToolKind),
    Key(char),
    Color(RgbHex),
    Size(NonZeroU32),
    Down(Point),
    Move(Point),
    Up(Option<Point>),
    Leave,
    Clear,
    Snapshot,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Tool(_) => "tool",
            Command::Key(_) => "key",
            Command::Color(_) => "color",
            Command::Size(_) => "size",
            Command::Down(_) => "down",
            Command::Move(_) => "move",
            Command::Up(_) => "up",
            Command::Leave => "leave",
            Command::Clear => "clear",
            Command::Snapshot => "snapshot",
        }
    }
}

/// Script errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("{command}: missing {what}")]
    Missing { command: &'static str, what: &'static str },
    #[error("{command}: invalid {what} '{value}'")]
    Invalid {
        command: &'static str,
        what: &'static str,
        value: String,
    },
    #[error("{0}: too many arguments")]
    TooMany(&'static str),
}

type Args<'a> = std::vec::IntoIter<&'a str>;

fn next<'a>(args: &mut Args<'a>, command: &'static str, what: &'static str) -> Result<&'a str, CommandError> {
    args.next().ok_or(CommandError::Missing { command, what })
}

fn coord(args: &mut Args<'_>, command: &'static str, what: &'static str) -> Result<f64, CommandError> {
    let value = next(args, command, what)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::Invalid {
            command,
            what,
            value: value.to_string(),
        })
}

fn point(args: &mut Args<'_>, command: &'static str) -> Result<Point, CommandError> {
    Ok(Point::new(coord(args, command, "x")?, coord(args, command, "y")?))
}

fn done(args: &mut Args<'_>, command: &'static str) -> Result<(), CommandError> {
    match args.next() {
        Some(_) => Err(CommandError::TooMany(command)),
        None => Ok(()),
    }
}

/// Words of a line up to a comment.
///
/// A comment starts at a leading `#` or at a standalone `#` word, so color
/// arguments like `#ff0000` are kept.
fn words(line: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for (i, word) in line.split_whitespace().enumerate() {
        if word == "#" || (i == 0 && word.starts_with('#')) {
            break;
        }
        words.push(word);
    }
    words
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let mut args = words(line).into_iter();
    let Some(name) = args.next() else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "tool" => {
            let value = next(&mut args, "tool", "tool name")?;
            let tool = ToolKind::from_name(&value.to_ascii_lowercase()).ok_or_else(|| CommandError::Invalid {
                command: "tool",
                what: "tool name",
                value: value.to_string(),
            })?;
            Command::Tool(tool)
        }
        "key" => {
            let value = next(&mut args, "key", "key")?;
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => Command::Key(key),
                _ => {
                    return Err(CommandError::Invalid {
                        command: "key",
                        what: "key",
                        value: value.to_string(),
                    });
                }
            }
        }
        "color" => {
            let value = next(&mut args, "color", "color")?;
            let color = value.parse::<RgbHex>().map_err(|_| CommandError::Invalid {
                command: "color",
                what: "color",
                value: value.to_string(),
            })?;
            Command::Color(color)
        }
        "size" => {
            let value = next(&mut args, "size", "width")?;
            let width = value.parse::<NonZeroU32>().map_err(|_| CommandError::Invalid {
                command: "size",
                what: "width",
                value: value.to_string(),
            })?;
            Command::Size(width)
        }
        "down" => Command::Down(point(&mut args, "down")?),
        "move" => Command::Move(point(&mut args, "move")?),
        "up" => {
            if !args.as_slice().is_empty() {
                Command::Up(Some(point(&mut args, "up")?))
            } else {
                Command::Up(None)
            }
        }
        "leave" => Command::Leave,
        "clear" => Command::Clear,
        "snapshot" => Command::Snapshot,
        _ => return Err(CommandError::Unknown(name.to_string())),
    };

    done(&mut args, command.name())?;
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comments() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# draw a box"), Ok(None));
        assert_eq!(parse_line("#draw"), Ok(None));
        assert_eq!(parse_line("clear # wipe it"), Ok(Some(Command::Clear)));
    }

    #[test]
    fn test_tool_and_key() {
        assert_eq!(parse_line("tool rect"), Ok(Some(Command::Tool(ToolKind::Rect))));
        assert_eq!(parse_line("TOOL Eraser"), Ok(Some(Command::Tool(ToolKind::Eraser))));
        assert_eq!(parse_line("key c"), Ok(Some(Command::Key('c'))));
        assert!(matches!(parse_line("tool brush"), Err(CommandError::Invalid { .. })));
        assert!(matches!(parse_line("key ab"), Err(CommandError::Invalid { .. })));
    }

    #[test]
    fn test_color_and_size() {
        assert_eq!(
            parse_line("color #FF8000"),
            Ok(Some(Command::Color(RgbHex::new(255, 128, 0))))
        );
        assert_eq!(parse_line("size 8"), Ok(Some(Command::Size(NonZeroU32::new(8).unwrap()))));
        assert!(matches!(parse_line("size 0"), Err(CommandError::Invalid { .. })));
        assert!(matches!(parse_line("color red"), Err(CommandError::Invalid { .. })));
    }

    #[test]
    fn test_pointer_commands() {
        assert_eq!(parse_line("down 10 20.5"), Ok(Some(Command::Down(Point::new(10.0, 20.5)))));
        assert_eq!(parse_line("move 1 2 # trailing"), Ok(Some(Command::Move(Point::new(1.0, 2.0)))));
        assert_eq!(parse_line("up"), Ok(Some(Command::Up(None))));
        assert_eq!(parse_line("up 3 4"), Ok(Some(Command::Up(Some(Point::new(3.0, 4.0))))));
        assert_eq!(parse_line("leave"), Ok(Some(Command::Leave)));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_line("down 10"),
            Err(CommandError::Missing { command: "down", what: "y" })
        );
        assert!(matches!(parse_line("move x 1"), Err(CommandError::Invalid { what: "x", .. })));
        assert!(matches!(parse_line("down NaN 1"), Err(CommandError::Invalid { .. })));
        assert_eq!(parse_line("clear now"), Err(CommandError::TooMany("clear")));
        assert_eq!(parse_line("undo"), Err(CommandError::Unknown("undo".to_string())));
    }
}
