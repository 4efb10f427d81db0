//! Live chat event streams over WebSocket.
//!
//! Each subscription owns one connection. A background task reads text
//! frames, decodes them into [`ChatEvent`]s and forwards them through an
//! mpsc channel to the single consumer holding the [`EventStream`]. The
//! stream ends (yields `None`) when the server closes the socket, the
//! connection fails, or the consumer calls [`EventStream::close`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};
use url::Url;

use parley_shared::protocol::ChatEvent;

use crate::error::StreamError;

/// Events buffered between the socket task and the consumer.
pub const DEFAULT_STREAM_BUFFER: usize = 256;

/// Single-consumer stream of chat events with explicit close.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<ChatEvent>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl EventStream {
    /// A stream fed by an in-process sender instead of a socket.
    pub fn channel(buffer: usize) -> (mpsc::Sender<ChatEvent>, EventStream) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            tx,
            EventStream {
                rx,
                shutdown: None,
            },
        )
    }

    /// Next event, or `None` once the subscription is over.
    pub async fn recv(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }

    /// Stop the subscription and release the connection.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.rx.close();
    }
}

impl Stream for EventStream {
    type Item = ChatEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open a WebSocket subscription at `url`, authenticated with `token`.
pub async fn open_event_stream(url: Url, token: &str) -> Result<EventStream, StreamError> {
    let mut request = url.as_str().into_client_request()?;
    let bearer =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| StreamError::Unauthorized)?;
    request.headers_mut().insert(AUTHORIZATION, bearer);

    let (ws, _response) = connect_async(request).await?;
    let (mut sink, mut source) = ws.split();

    let (tx, rx) = mpsc::channel(DEFAULT_STREAM_BUFFER);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let scope = url.path().to_string();

    info!(scope = %scope, "event stream opened");

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    let _ = sink.send(WsMessage::Close(None)).await;
                    debug!(scope = %scope, "event stream closed by consumer");
                    break;
                }
                frame = source.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(event) = decode_frame(&text) {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Ping(payload))) => {
                        let _ = sink.send(WsMessage::Pong(payload)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        info!(scope = %scope, "event stream closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(scope = %scope, error = %e, "event stream failed");
                        break;
                    }
                }
            }
        }
    });

    Ok(EventStream {
        rx,
        shutdown: Some(shutdown_tx),
    })
}

/// Decode one text frame. Frames that are not chat events are skipped.
pub fn decode_frame(text: &str) -> Option<ChatEvent> {
    match ChatEvent::from_json(text) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, len = text.len(), "skipping undecodable frame");
            None
        }
    }
}
