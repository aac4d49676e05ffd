//! Slash-command parsing and validation.
//!
//! Turns the free text typed after `/mog` into a [`ValidatedCommand`] or a
//! user-facing [`CommandError`]. Parsing never touches storage or the network.

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Verbs that take an emoji argument.
pub const ARG_VERBS: [&str; 2] = ["add", "delete"];
/// Verbs that ignore any arguments.
pub const SOLO_VERBS: [&str; 5] = ["list", "completed", "mine", "help", "count"];

pub const MAX_EMOJI_NAME_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Completed,
    Mine,
    Add { emoji: String },
    Delete { emoji: String },
    Help,
    Count,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Completed => "completed",
            Self::Mine => "mine",
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Help => "help",
            Self::Count => "count",
        }
    }

    pub fn emoji(&self) -> Option<&str> {
        match self {
            Self::Add { emoji } | Self::Delete { emoji } => Some(emoji),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedCommand {
    pub user: String,
    pub action: Action,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid token.")]
    InvalidToken,
    #[error("No command found.")]
    NoCommand,
    #[error("`{0}` requires an emoji name.")]
    MissingArgument(String),
    #[error("Invalid emoji name `:{0}:`.")]
    InvalidEmojiName(String),
    #[error("Unknown command `{0}`.")]
    UnknownCommand(String),
}

impl CommandError {
    /// Text sent back to the caller for a rejected command.
    pub fn response_text(&self) -> String {
        format!("Error. {self}")
    }
}

pub struct CommandParser {
    outgoing_token: SecretString,
}

impl CommandParser {
    pub fn new(outgoing_token: SecretString) -> Self {
        Self { outgoing_token }
    }

    pub fn parse(
        &self,
        auth_token: &str,
        raw_text: &str,
        user_name: &str,
    ) -> Result<ValidatedCommand, CommandError> {
        if !self.token_matches(auth_token) {
            return Err(CommandError::InvalidToken);
        }

        let action = parse_action(raw_text)?;
        Ok(ValidatedCommand { user: user_name.to_owned(), action })
    }

    fn token_matches(&self, auth_token: &str) -> bool {
        let expected = self.outgoing_token.expose_secret().as_bytes();
        bool::from(auth_token.as_bytes().ct_eq(expected))
    }
}

/// Classifies command text without checking the caller's token.
pub fn parse_action(raw_text: &str) -> Result<Action, CommandError> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Err(CommandError::NoCommand);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let argument = parts.next().map(|token| token.trim_matches(':'));

    match verb {
        "list" => Ok(Action::List),
        "completed" => Ok(Action::Completed),
        "mine" => Ok(Action::Mine),
        "help" => Ok(Action::Help),
        "count" => Ok(Action::Count),
        "add" | "delete" => {
            let emoji = argument.ok_or_else(|| CommandError::MissingArgument(verb.to_owned()))?;
            if !is_valid_emoji_name(emoji) {
                return Err(CommandError::InvalidEmojiName(emoji.to_owned()));
            }

            let emoji = emoji.to_owned();
            if verb == "add" {
                Ok(Action::Add { emoji })
            } else {
                Ok(Action::Delete { emoji })
            }
        }
        other => Err(CommandError::UnknownCommand(other.to_owned())),
    }
}

/// Up to 100 characters from `[A-Za-z0-9_-]`. The empty name is accepted.
pub fn is_valid_emoji_name(name: &str) -> bool {
    name.len() <= MAX_EMOJI_NAME_LEN
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::{
        is_valid_emoji_name, parse_action, Action, CommandError, CommandParser, ValidatedCommand,
        ARG_VERBS, SOLO_VERBS,
    };

    fn parser() -> CommandParser {
        CommandParser::new(SecretString::from("outgoing-secret".to_string()))
    }

    #[test]
    fn rejects_mismatched_token_regardless_of_text() {
        let parser = parser();
        for text in ["list", "add chopz", "", "krinkle"] {
            assert_eq!(
                parser.parse("bogus_token", text, "powerlanguage"),
                Err(CommandError::InvalidToken)
            );
        }
        assert_eq!(parser.parse("", "list", "powerlanguage"), Err(CommandError::InvalidToken));
        assert_eq!(
            parser.parse("outgoing-secret-and-more", "list", "powerlanguage"),
            Err(CommandError::InvalidToken)
        );
    }

    #[test]
    fn accepts_matching_token_and_carries_user() {
        let command = parser().parse("outgoing-secret", "add chopz", "powerlanguage");
        assert_eq!(
            command,
            Ok(ValidatedCommand {
                user: "powerlanguage".to_string(),
                action: Action::Add { emoji: "chopz".to_string() },
            })
        );
    }

    #[test]
    fn empty_or_blank_text_has_no_command() {
        assert_eq!(parse_action(""), Err(CommandError::NoCommand));
        assert_eq!(parse_action("   \t "), Err(CommandError::NoCommand));
        assert_eq!(CommandError::NoCommand.response_text(), "Error. No command found.");
    }

    #[test]
    fn solo_verbs_ignore_extra_tokens() {
        assert_eq!(parse_action("list cats"), Ok(Action::List));
        assert_eq!(parse_action("completed"), Ok(Action::Completed));
        assert_eq!(parse_action("mine all of them"), Ok(Action::Mine));
        assert_eq!(parse_action("help me"), Ok(Action::Help));
        assert_eq!(parse_action("count"), Ok(Action::Count));
    }

    #[test]
    fn argument_verbs_require_an_emoji() {
        let error = parse_action("add").expect_err("add without emoji");
        assert_eq!(error, CommandError::MissingArgument("add".to_string()));
        assert_eq!(error.response_text(), "Error. `add` requires an emoji name.");

        assert_eq!(
            parse_action("delete   "),
            Err(CommandError::MissingArgument("delete".to_string()))
        );
    }

    #[test]
    fn argument_verbs_strip_colons_and_ignore_extra_tokens() {
        assert_eq!(parse_action("add :chopz:"), Ok(Action::Add { emoji: "chopz".to_string() }));
        assert_eq!(
            parse_action("add chopz yo yo cat"),
            Ok(Action::Add { emoji: "chopz".to_string() })
        );
        assert_eq!(
            parse_action("delete ::party-parrot_2::"),
            Ok(Action::Delete { emoji: "party-parrot_2".to_string() })
        );
    }

    #[test]
    fn invalid_characters_are_rejected_with_colon_framed_name() {
        let error = parse_action("add cat*s").expect_err("cat*s is invalid");
        assert_eq!(error, CommandError::InvalidEmojiName("cat*s".to_string()));
        assert_eq!(error.response_text(), "Error. Invalid emoji name `:cat*s:`.");
    }

    #[test]
    fn emoji_name_length_limit_is_one_hundred() {
        let at_limit = "a".repeat(100);
        let over_limit = "1".repeat(101);

        assert_eq!(
            parse_action(&format!("add {at_limit}")),
            Ok(Action::Add { emoji: at_limit.clone() })
        );
        assert_eq!(
            parse_action(&format!("add {over_limit}")),
            Err(CommandError::InvalidEmojiName(over_limit))
        );
    }

    #[test]
    fn colon_only_argument_yields_empty_emoji_name() {
        assert!(is_valid_emoji_name(""));
        assert_eq!(parse_action("add ::"), Ok(Action::Add { emoji: String::new() }));
    }

    #[test]
    fn non_ascii_names_are_rejected() {
        assert!(!is_valid_emoji_name("café"));
        assert!(!is_valid_emoji_name("thumbs up"));
        assert!(is_valid_emoji_name("Thumbs_Up-2"));
    }

    #[test]
    fn unknown_verbs_are_named_in_the_error() {
        let error = parse_action("krinkle chopz").expect_err("unknown verb");
        assert_eq!(error, CommandError::UnknownCommand("krinkle".to_string()));
        assert_eq!(error.response_text(), "Error. Unknown command `krinkle`.");
        assert_eq!(parse_action("LIST"), Err(CommandError::UnknownCommand("LIST".to_string())));
    }

    #[test]
    fn every_advertised_verb_parses() {
        for verb in SOLO_VERBS {
            let action = parse_action(verb).expect("solo verb");
            assert_eq!(action.verb(), verb);
            assert_eq!(action.emoji(), None);
        }
        for verb in ARG_VERBS {
            let action = parse_action(&format!("{verb} chopz")).expect("argument verb");
            assert_eq!(action.verb(), verb);
            assert_eq!(action.emoji(), Some("chopz"));
        }
    }

    #[test]
    fn parse_is_total_over_awkward_inputs() {
        let inputs = [
            "\u{0}",
            ":::",
            "add \u{1F600}",
            "delete -",
            "\n\nadd\n\nchopz\n",
            "add ::::::::::::::::::::",
        ];
        for input in inputs {
            let _ = parser().parse("outgoing-secret", input, "powerlanguage");
        }
        assert_eq!(
            parse_action("\n\nadd\n\nchopz\n"),
            Ok(Action::Add { emoji: "chopz".to_string() })
        );
    }
}
