use serde::{Deserialize, Serialize};

use mog_core::emoji::KnownEmojiOracle;
use mog_core::ledger::DesireStore;
use mog_core::processor::{CommandReply, RequestProcessor};
use mog_core::ApplicationError;

/// Outgoing-webhook form body. Slack sends more fields than these; the rest are
/// ignored.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SlashCommandPayload {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user_name: String,
}

impl std::fmt::Debug for SlashCommandPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashCommandPayload")
            .field("token", &"[REDACTED]")
            .field("text", &self.text)
            .field("user_name", &self.user_name)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlashResponse {
    pub response_type: String,
    pub text: String,
}

impl From<CommandReply> for SlashResponse {
    fn from(reply: CommandReply) -> Self {
        Self { response_type: reply.response_type.to_owned(), text: reply.text }
    }
}

pub struct CommandRouter<S, O> {
    processor: RequestProcessor<S, O>,
}

impl<S, O> CommandRouter<S, O>
where
    S: DesireStore,
    O: KnownEmojiOracle,
{
    pub fn new(processor: RequestProcessor<S, O>) -> Self {
        Self { processor }
    }

    pub async fn route(
        &self,
        payload: &SlashCommandPayload,
    ) -> Result<SlashResponse, ApplicationError> {
        self.processor
            .handle(&payload.token, &payload.text, &payload.user_name)
            .await
            .map(SlashResponse::from)
    }
}
