//! Server-Sent Events support

use crate::runtime::ConversationSnapshot;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

/// Stream every snapshot as a `snapshot` event, starting with the current one.
/// Intermediate snapshots may be skipped if the client is slow; the latest
/// one always arrives.
pub fn sse_stream(
    snapshot_rx: watch::Receiver<Arc<ConversationSnapshot>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = WatchStream::new(snapshot_rx).map(|snapshot| Ok(snapshot_event(&snapshot)));

    Sse::new(snapshots).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn snapshot_event(snapshot: &ConversationSnapshot) -> Event {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|_| "null".to_string());
    Event::default().event("snapshot").data(data)
}

