//! Request orchestration: parse, reconcile against the known-emoji oracle, then
//! dispatch to the action handler and render the reply text.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::command::{Action, CommandParser, ValidatedCommand, ARG_VERBS, SOLO_VERBS};
use crate::domain::desire::DesireStatus;
use crate::emoji::{KnownEmojiOracle, OracleError};
use crate::errors::ApplicationError;
use crate::ledger::{DesireLedger, DesireStore, EmojiDemand, StoreError};

pub const EPHEMERAL: &str = "ephemeral";

pub const NO_OUTSTANDING_REQUESTS: &str = "There are no outstanding requests.";
pub const NO_COMPLETED_REQUESTS: &str = "There are no completed requests.";
pub const NO_OUTSTANDING_DESIRES: &str = "You do not have any outstanding desires.";
pub const NOT_DESIRED_OR_FULFILLED: &str =
    "You have not desired that emoji or the desire has been fulfilled.";

/// Reply handed back to the slash-command caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    pub response_type: &'static str,
    pub text: String,
}

impl CommandReply {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: EPHEMERAL, text: text.into() }
    }
}

pub struct RequestProcessor<S, O> {
    parser: CommandParser,
    ledger: DesireLedger<S>,
    oracle: O,
}

impl<S, O> RequestProcessor<S, O>
where
    S: DesireStore,
    O: KnownEmojiOracle,
{
    pub fn new(parser: CommandParser, ledger: DesireLedger<S>, oracle: O) -> Self {
        Self { parser, ledger, oracle }
    }

    pub fn ledger(&self) -> &DesireLedger<S> {
        &self.ledger
    }

    /// Single entry point for a slash command. Rejected commands come back as an
    /// `Ok` reply carrying the error text; `Err` is reserved for infrastructure
    /// failures.
    pub async fn handle(
        &self,
        auth_token: &str,
        raw_text: &str,
        user_name: &str,
    ) -> Result<CommandReply, ApplicationError> {
        match self.parser.parse(auth_token, raw_text, user_name) {
            Ok(command) => self.execute(command).await,
            Err(error) => {
                info!(
                    event_name = "mog.request.rejected",
                    user = user_name,
                    reason = %error,
                    "slash command rejected"
                );
                Ok(CommandReply::ephemeral(error.response_text()))
            }
        }
    }

    pub async fn execute(&self, command: ValidatedCommand) -> Result<CommandReply, ApplicationError> {
        let known = self.oracle.list_known_emoji().await;
        match &known {
            Ok(known) => {
                self.reconcile(known).await?;
            }
            Err(error) => {
                warn!(
                    event_name = "mog.reconcile.skipped",
                    error = %error,
                    "known-emoji oracle unavailable; skipping reconciliation"
                );
            }
        }

        let user = command.user.as_str();
        let text = match &command.action {
            Action::List => self.list_pending().await?,
            Action::Completed => self.list_completed().await?,
            Action::Mine => self.list_mine(user).await?,
            Action::Add { emoji } => self.add(emoji, user, &known).await?,
            Action::Delete { emoji } => self.delete(emoji, user).await?,
            Action::Help => help_text(),
            Action::Count => self.count().await?,
        };

        info!(
            event_name = "mog.request.handled",
            user,
            action = command.action.verb(),
            emoji = command.action.emoji().unwrap_or_default(),
            "slash command handled"
        );
        Ok(CommandReply::ephemeral(text))
    }

    /// Promotes pending desires whose emoji now exists. Returns the promoted emoji.
    pub async fn reconcile(&self, known: &HashSet<String>) -> Result<Vec<String>, StoreError> {
        let mut completed = Vec::new();
        for emoji in self.ledger.distinct_pending_emoji().await? {
            if known.contains(&emoji) {
                self.ledger.complete_all(&emoji).await?;
                completed.push(emoji);
            }
        }

        if !completed.is_empty() {
            info!(
                event_name = "mog.reconcile.completed",
                completed = completed.len(),
                emoji = %completed.join(","),
                "pending desires fulfilled"
            );
        }
        Ok(completed)
    }

    async fn list_pending(&self) -> Result<String, ApplicationError> {
        let ranked = self.ledger.popularity(DesireStatus::Pending).await?;
        if ranked.is_empty() {
            return Ok(NO_OUTSTANDING_REQUESTS.to_string());
        }
        Ok(render_lines(&ranked, |demand| {
            format!("`:{}:` requested by {}", demand.emoji, demand.users.join(", "))
        }))
    }

    async fn list_completed(&self) -> Result<String, ApplicationError> {
        let ranked = self.ledger.popularity(DesireStatus::Fulfilled).await?;
        if ranked.is_empty() {
            return Ok(NO_COMPLETED_REQUESTS.to_string());
        }
        Ok(render_lines(&ranked, |demand| {
            format!(
                ":{0}: - `:{0}:` requested by {1}",
                demand.emoji,
                demand.users.join(", ")
            )
        }))
    }

    async fn list_mine(&self, user: &str) -> Result<String, ApplicationError> {
        let emoji = self.ledger.emoji_for(user, DesireStatus::Pending).await?;
        if emoji.is_empty() {
            return Ok(NO_OUTSTANDING_DESIRES.to_string());
        }
        let quoted: Vec<String> = emoji.iter().map(|name| format!("`:{name}:`")).collect();
        Ok(format!("You've requested: {}", quoted.join(", ")))
    }

    async fn add(
        &self,
        emoji: &str,
        user: &str,
        known: &Result<HashSet<String>, OracleError>,
    ) -> Result<String, ApplicationError> {
        if self.ledger.has_pending(emoji, user).await? {
            return Ok(already_requested(emoji));
        }

        let known = known.as_ref().map_err(|error| ApplicationError::from(error.clone()))?;
        if known.contains(emoji) {
            return Ok(format!("`:{emoji}:` already exists. It looks like :{emoji}:"));
        }

        if !self.ledger.add_pending(emoji, user).await? {
            // Lost a race with a concurrent add for the same pair.
            return Ok(already_requested(emoji));
        }
        Ok(format!("You requested `:{emoji}:`"))
    }

    async fn delete(&self, emoji: &str, user: &str) -> Result<String, ApplicationError> {
        if !self.ledger.has_pending(emoji, user).await? {
            return Ok(NOT_DESIRED_OR_FULFILLED.to_string());
        }
        self.ledger.remove_pending(emoji, user).await?;
        Ok(format!("Your request for `:{emoji}:` was deleted."))
    }

    async fn count(&self) -> Result<String, ApplicationError> {
        let count = self.ledger.count_distinct_pending().await?;
        Ok(match count {
            0 => NO_OUTSTANDING_REQUESTS.to_string(),
            1 => "There is 1 outstanding emoji request.".to_string(),
            n => format!("There are {n} outstanding emoji requests."),
        })
    }
}

fn already_requested(emoji: &str) -> String {
    format!("You have already requested `:{emoji}:`")
}

fn render_lines(ranked: &[EmojiDemand], line: impl Fn(&EmojiDemand) -> String) -> String {
    ranked.iter().map(|demand| format!("{}\n", line(demand))).collect()
}

pub fn help_text() -> String {
    let verbs: Vec<&str> = ARG_VERBS.iter().chain(SOLO_VERBS.iter()).copied().collect();
    format!(
        "Valid commands: {}.\n\nRequest emoji that you'd like to see on Slack and see the most popular requests.",
        verbs.join(", ")
    )
}
