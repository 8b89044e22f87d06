//! Command layer: raw argument text in, reply out.
//!
//! Splitting is plain whitespace; quotes are not interpreted.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::compositor::Compositor;
use crate::resources::read_image_bytes;

pub const USAGE: &str = "Usage: /zimin <left text> <middle text> <right text>\n\
Example: /zimin 当破即破！ 当断即断！ ?!当当!?\n\
Note: keep each text within 15 characters";

pub const ARGUMENT_COUNT_HINT: &str = "Please provide three texts separated by spaces\n\
Example: /zimin left middle right";

pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no arguments given")]
    Empty,

    #[error("expected 3 arguments, got {0}")]
    WrongArgumentCount(usize),
}

impl CommandError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CommandError::Empty => USAGE,
            CommandError::WrongArgumentCount(_) => ARGUMENT_COUNT_HINT,
        }
    }
}

/// Split trimmed argument text into exactly three tokens.
pub fn parse_args(arg_text: &str) -> Result<[String; 3], CommandError> {
    let trimmed = arg_text.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Empty);
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    match parts.as_slice() {
        [left, middle, right] => Ok([left.to_string(), middle.to_string(), right.to_string()]),
        _ => Err(CommandError::WrongArgumentCount(parts.len())),
    }
}

/// What goes back to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Reply {
    Image {
        #[serde(skip)]
        bytes: Vec<u8>,
        mime: &'static str,
    },
    Text {
        message: String,
    },
}

impl Reply {
    fn text(message: impl Into<String>) -> Self {
        Reply::Text { message: message.into() }
    }
}

/// Run one command invocation end to end.
pub fn handle_command(compositor: &Compositor, arg_text: &str, cache_dir: &Path) -> Reply {
    let [left, middle, right] = match parse_args(arg_text) {
        Ok(texts) => texts,
        Err(e) => return Reply::text(e.user_message()),
    };

    let path = match compositor.compose([left.as_str(), middle.as_str(), right.as_str()], cache_dir) {
        Ok(path) => path,
        Err(e) if e.is_invalid_input() => return Reply::text(e.user_message()),
        Err(e) => {
            tracing::error!(error = %e, "Zimin command failed");
            return Reply::text(e.user_message());
        }
    };

    match read_image_bytes(&path) {
        Some(bytes) => Reply::Image { bytes, mime: PNG_MIME },
        None => Reply::text("failed to read the generated image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZiminConfig;

    #[test]
    fn test_parse_three_tokens() {
        let parts = parse_args("  当破即破！ 当断即断！   ?!当当!? ").unwrap();
        assert_eq!(parts, ["当破即破！", "当断即断！", "?!当当!?"].map(String::from));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(parse_args("   "), Err(CommandError::Empty));
        assert!(CommandError::Empty.user_message().starts_with("Usage"));
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        assert_eq!(parse_args("a b"), Err(CommandError::WrongArgumentCount(2)));
        assert_eq!(parse_args("a b c d"), Err(CommandError::WrongArgumentCount(4)));
    }

    #[test]
    fn test_handle_usage_and_count_replies() {
        let compositor = Compositor::new(&ZiminConfig::default(), Path::new("/nonexistent"));
        let cache = Path::new("/nonexistent/cache");
        assert_eq!(handle_command(&compositor, "", cache), Reply::text(USAGE));
        assert_eq!(handle_command(&compositor, "one two", cache), Reply::text(ARGUMENT_COUNT_HINT));
    }

    #[test]
    fn test_handle_reports_invalid_text() {
        let compositor = Compositor::new(&ZiminConfig::default(), Path::new("/nonexistent"));
        let reply = handle_command(&compositor, "a b 0123456789abcdef", Path::new("/nonexistent/cache"));
        match reply {
            Reply::Text { message } => {
                assert!(message.starts_with("input error"));
                assert!(message.contains("0123456789abcdef"));
            }
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_missing_template() {
        let compositor = Compositor::new(&ZiminConfig::default(), Path::new("/nonexistent"));
        let reply = handle_command(&compositor, "a b c", Path::new("/nonexistent/cache"));
        assert!(matches!(reply, Reply::Text { message } if message.contains("resource incomplete")));
    }
}
