//! Line commands accepted by voyagerd on stdin.

use std::str::FromStr;

use thiserror::Error;

/// One parsed input line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `pos <lat> <lng>`
    Position { latitude: f64, longitude: f64 },
    /// `sos`
    Sos,
    /// `hold`
    Hold,
    /// `release`
    Release,
    /// `broadcast on|off`
    Broadcast(bool),
    /// `dial`
    Dial,
    /// `status`
    Status,
    /// `contacts`
    Contacts,
    /// `quit`
    Quit,
}

/// Why a line was not understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseCommandError(String);

fn invalid(message: impl Into<String>) -> ParseCommandError {
    ParseCommandError(message.into())
}

fn coordinate(raw: Option<&str>, name: &str) -> Result<f64, ParseCommandError> {
    let raw = raw.ok_or_else(|| invalid(format!("missing {name}")))?;
    raw.parse()
        .map_err(|_| invalid(format!("{name} is not a number: {raw}")))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| invalid("empty command"))?
            .to_ascii_lowercase();

        let command = match verb.as_str() {
            "pos" => Command::Position {
                latitude: coordinate(words.next(), "latitude")?,
                longitude: coordinate(words.next(), "longitude")?,
            },
            "sos" => Command::Sos,
            "hold" => Command::Hold,
            "release" => Command::Release,
            "broadcast" => match words.next() {
                Some("on") => Command::Broadcast(true),
                Some("off") => Command::Broadcast(false),
                _ => return Err(invalid("usage: broadcast on|off")),
            },
            "dial" => Command::Dial,
            "status" => Command::Status,
            "contacts" => Command::Contacts,
            "quit" | "exit" => Command::Quit,
            other => return Err(invalid(format!("unknown command: {other}"))),
        };

        if words.next().is_some() {
            return Err(invalid(format!("trailing input after {verb}")));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions() {
        assert_eq!(
            "pos 22.5675 88.3712".parse::<Command>(),
            Ok(Command::Position {
                latitude: 22.5675,
                longitude: 88.3712
            })
        );
        assert!("pos 22.5".parse::<Command>().is_err());
        assert!("pos north 88".parse::<Command>().is_err());
    }

    #[test]
    fn parses_bare_verbs() {
        assert_eq!("SOS".parse::<Command>(), Ok(Command::Sos));
        assert_eq!("  hold ".parse::<Command>(), Ok(Command::Hold));
        assert_eq!("release".parse::<Command>(), Ok(Command::Release));
        assert_eq!("dial".parse::<Command>(), Ok(Command::Dial));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn parses_broadcast_toggle() {
        assert_eq!("broadcast on".parse::<Command>(), Ok(Command::Broadcast(true)));
        assert_eq!("broadcast off".parse::<Command>(), Ok(Command::Broadcast(false)));
        assert!("broadcast".parse::<Command>().is_err());
    }

    #[test]
    fn rejects_noise() {
        assert!("".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
        assert!("status now".parse::<Command>().is_err());
    }

    #[test]
    fn errors_render_their_reason() {
        let err = "launch".parse::<Command>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command: launch");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
