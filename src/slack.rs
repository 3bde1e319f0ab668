//! Slack slash-command integration
//!
//! `/simulate <iterations> <product>` is acknowledged immediately; the
//! session then runs on a background task with a bounded lifetime and its
//! outcome, success or failure, is always posted to the command's
//! `response_url`.

mod command;
mod oauth;
mod webhook;

pub use command::parse_command;
pub use oauth::OAuthClient;
pub use webhook::{ResponseUrlClient, SlackMessage};

use crate::boardroom::{Session, SessionError};
use crate::format::to_slack;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Run `session` in the background and post its outcome to `response_url`.
///
/// The session is abandoned after `limit`; the failure is still reported.
/// Delivery is bounded by `delivery`'s own timeout, so the task always ends.
pub fn spawn_session_reply(
    session: Session,
    response_url: String,
    delivery: ResponseUrlClient,
    limit: Duration,
) -> JoinHandle<()> {
    let session_id = session.id().to_string();
    tokio::spawn(async move {
        let message = match timeout(limit, session.run()).await {
            Ok(Ok(snapshot)) => SlackMessage::in_channel(to_slack(&snapshot.transcript)),
            Ok(Err(e)) => failure_message(&e),
            Err(_) => {
                tracing::warn!(session_id = %session_id, limit_secs = limit.as_secs(), "Session timed out");
                failure_message(&SessionError::TimedOut(limit))
            }
        };

        match delivery.post(&response_url, &message).await {
            Ok(()) => tracing::info!(
                session_id = %session_id,
                response_type = ?message.response_type,
                "Delivered session result to Slack"
            ),
            Err(e) => tracing::error!(
                session_id = %session_id,
                error = %e,
                "Failed to deliver session result to Slack"
            ),
        }
    })
}

fn failure_message(error: &SessionError) -> SlackMessage {
    SlackMessage::ephemeral(format!(":x: Boardroom session failed: {error}"))
}
