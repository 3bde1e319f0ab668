//! Server-Sent Events for streamed sessions

use crate::boardroom::{SessionError, Snapshot};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;

/// One `snapshot` event per completed turn, or a final `error` event.
///
/// Dropping the response (client disconnect) drops the session stream, so
/// no further turns are generated.
pub fn session_events(
    snapshots: impl Stream<Item = Result<Snapshot, SessionError>> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = snapshots.map(|item| Ok(to_event(item)));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_event(item: Result<Snapshot, SessionError>) -> Event {
    let (event_type, data) = match item {
        Ok(snapshot) => (
            "snapshot",
            json!({
                "type": "snapshot",
                "session_id": snapshot.session_id,
                "transcript": snapshot.transcript,
                "speaker": snapshot.speaker,
                "turns_taken": snapshot.turns_taken,
                "finished": snapshot.finished,
                "stop_reason": snapshot.stop_reason,
            }),
        ),
        Err(e) => (
            "error",
            json!({
                "type": "error",
                "error": e.to_string(),
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
