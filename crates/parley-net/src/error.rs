use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failure to open an event stream. Stream opening is not an envelope
/// operation, so it reports directly instead of through `ApiResult`.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("not signed in")]
    Unauthorized,

    #[error("invalid stream url: {0}")]
    Url(#[from] url::ParseError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),
}

impl StreamError {
    /// True when retrying cannot help until the user signs in again.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            StreamError::Unauthorized => true,
            StreamError::WebSocket(e) => matches!(
                e.as_ref(),
                tungstenite::Error::Http(resp) if resp.status().as_u16() == 401
            ),
            StreamError::Url(_) => false,
        }
    }
}

impl From<tungstenite::Error> for StreamError {
    fn from(e: tungstenite::Error) -> Self {
        StreamError::WebSocket(Box::new(e))
    }
}
