use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use mog_core::emoji::KnownEmojiOracle;
use mog_core::errors::InterfaceError;
use mog_core::ledger::DesireStore;
use mog_slack::{CommandRouter, SlashCommandPayload};
use serde::Serialize;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

pub fn router<S, O>(commands: Arc<CommandRouter<S, O>>) -> Router
where
    S: DesireStore + 'static,
    O: KnownEmojiOracle + 'static,
{
    Router::new().route("/", post(slash_command::<S, O>)).with_state(commands)
}

pub async fn slash_command<S, O>(
    State(commands): State<Arc<CommandRouter<S, O>>>,
    Form(payload): Form<SlashCommandPayload>,
) -> Response
where
    S: DesireStore + 'static,
    O: KnownEmojiOracle + 'static,
{
    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!("slash_command", correlation_id = %correlation_id);

    match commands.route(&payload).instrument(span).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(failure) => {
            error!(
                event_name = "mog.request.failed",
                correlation_id = %correlation_id,
                user = %payload.user_name,
                error = %failure,
                "slash command failed"
            );
            error_response(failure.into_interface(correlation_id))
        }
    }
}

fn error_response(error: InterfaceError) -> Response {
    let status = match error {
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorBody {
        error: error.user_message().to_string(),
        correlation_id: error.correlation_id().to_string(),
    };
    (status, Json(body)).into_response()
}
