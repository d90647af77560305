//! Reqwest-based SSE transport adapter.
//!
//! Opens `GET {endpoint}` with `Accept: text/event-stream`, checks the
//! status and content type, then decodes the body into frames with
//! [`SseDecoder`]. Only unnamed (or `message`) frames are reported as
//! messages, matching what a browser `EventSource.onmessage` handler sees.
//!
//! A server ending the body is reported as [`TransportError::ServerClosed`]:
//! the endpoint is expected to stream for as long as the client listens.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Url;
use tokio::sync::Mutex;
use tracing::debug;

use super::close_signal::CloseSignal;
use crate::error::{classify_reqwest_error, TransportError};
use crate::sse::SseDecoder;
use crate::traits::{ConnectionFactory, EventSourceConnection, TransportEvent};

/// MIME type an SSE endpoint must answer with.
pub const EVENT_STREAM_MIME: &str = "text/event-stream";

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Connection factory using reqwest.
///
/// # Example
///
/// ```ignore
/// use ssewire::adapters::ReqwestConnectionFactory;
/// use ssewire::traits::ConnectionFactory;
///
/// let factory = ReqwestConnectionFactory::new()
///     .with_headers(vec![("Cookie".to_string(), "id=abc".to_string())]);
/// let connection = factory.open("http://localhost:8000/sse")?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestConnectionFactory {
    client: reqwest::Client,
    headers: Vec<(String, String)>,
}

impl ReqwestConnectionFactory {
    /// Create a factory with a default reqwest client.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a factory around a preconfigured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            headers: Vec::new(),
        }
    }

    /// Headers sent with every connection this factory opens.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    fn build_headers(&self) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }
}

impl Default for ReqwestConnectionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionFactory for ReqwestConnectionFactory {
    fn open(&self, endpoint: &str) -> Result<Arc<dyn EventSourceConnection>, TransportError> {
        let url = Url::parse(endpoint).map_err(|e| TransportError::InvalidUrl {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: endpoint.to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let headers = self.build_headers()?;
        Ok(Arc::new(ReqwestSseConnection::new(
            self.client.clone(),
            url,
            headers,
        )))
    }
}

enum StreamPhase {
    /// Request not sent yet
    Pending,
    /// Response accepted, body being decoded
    Streaming {
        body: ByteStream,
        decoder: SseDecoder,
    },
    /// Errored or closed
    Finished,
}

/// One SSE connection over HTTP.
///
/// The request is sent lazily on the first [`EventSourceConnection::next_event`]
/// call, which reports [`TransportEvent::Open`] once the response is accepted.
pub struct ReqwestSseConnection {
    client: reqwest::Client,
    url: Url,
    headers: HeaderMap,
    phase: Mutex<StreamPhase>,
    close_signal: CloseSignal,
}

impl ReqwestSseConnection {
    fn new(client: reqwest::Client, url: Url, headers: HeaderMap) -> Self {
        Self {
            client,
            url,
            headers,
            phase: Mutex::new(StreamPhase::Pending),
            close_signal: CloseSignal::new(),
        }
    }

    async fn open_stream(&self) -> Result<StreamPhase, TransportError> {
        let response = self
            .client
            .get(self.url.clone())
            .headers(self.headers.clone())
            .header(ACCEPT, EVENT_STREAM_MIME)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e, self.url.as_str()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type
            .trim_start()
            .to_ascii_lowercase()
            .starts_with(EVENT_STREAM_MIME)
        {
            return Err(TransportError::UnexpectedContentType { content_type });
        }

        debug!("SSE stream open at {}", self.url);
        Ok(StreamPhase::Streaming {
            body: Box::pin(response.bytes_stream()),
            decoder: SseDecoder::new(),
        })
    }

    async fn advance(&self) -> Option<TransportEvent> {
        let mut phase = self.phase.lock().await;

        if matches!(*phase, StreamPhase::Pending) {
            return Some(match self.open_stream().await {
                Ok(streaming) => {
                    *phase = streaming;
                    TransportEvent::Open
                }
                Err(err) => {
                    *phase = StreamPhase::Finished;
                    TransportEvent::Error(err)
                }
            });
        }

        let result = match &mut *phase {
            StreamPhase::Streaming { body, decoder } => next_message(body, decoder).await,
            _ => return None,
        };

        Some(match result {
            Ok(data) => TransportEvent::Message(data),
            Err(err) => {
                *phase = StreamPhase::Finished;
                TransportEvent::Error(err)
            }
        })
    }
}

/// Read until the decoder yields the next message frame.
async fn next_message(
    body: &mut ByteStream,
    decoder: &mut SseDecoder,
) -> Result<String, TransportError> {
    loop {
        while let Some(result) = decoder.next_frame() {
            match result {
                Ok(frame) if frame.is_message() => return Ok(frame.data),
                Ok(frame) => debug!("Skipping named SSE event '{}'", frame.event_name()),
                Err(err) => {
                    return Err(TransportError::Stream {
                        message: err.to_string(),
                    })
                }
            }
        }

        match body.next().await {
            Some(Ok(chunk)) => decoder.push(&chunk),
            Some(Err(err)) => {
                return Err(TransportError::Stream {
                    message: err.to_string(),
                })
            }
            None => return Err(TransportError::ServerClosed),
        }
    }
}

#[async_trait]
impl EventSourceConnection for ReqwestSseConnection {
    async fn next_event(&self) -> Option<TransportEvent> {
        if self.close_signal.is_closed() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.close_signal.closed() => None,
            event = self.advance() => event,
        }
    }

    fn close(&self) {
        if self.close_signal.close() {
            debug!("Closing SSE connection to {}", self.url);
            // Release the response body right away unless a reader holds it;
            // a reader drops it when its pending next_event is cancelled.
            if let Ok(mut phase) = self.phase.try_lock() {
                *phase = StreamPhase::Finished;
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.close_signal.is_closed()
    }
}
