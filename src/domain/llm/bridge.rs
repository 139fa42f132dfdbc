//! Bounded byte channel between a generation task and a pull-based reader
//!
//! The stream is byte oriented. A single `receive` returns whatever is
//! buffered (at most [`RECEIVE_CHUNK_SIZE`] bytes), which may split a UTF-8
//! sequence or a server-sent event. Callers that need framing rebuild it from
//! the concatenated bytes.

use std::fmt;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::domain::DomainError;

/// Bytes the producer may buffer before its writes wait for the reader
pub const BRIDGE_CAPACITY: usize = 4 * 1024;

/// Upper bound on the bytes returned by one `receive`
pub const RECEIVE_CHUNK_SIZE: usize = 2 * 1024;

/// Stream type for draining a chat stream with `StreamExt`
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

type Completion = Result<(), DomainError>;

/// Create a bridge holding at most `capacity` unread bytes.
///
/// `cancel` is owned by the stream: cancelling it, or dropping the returned
/// [`ChatStream`], stops the producer.
pub fn bridge(capacity: usize, cancel: CancellationToken) -> (BridgeWriter, ChatStream) {
    let (write_half, read_half) = tokio::io::duplex(capacity);
    let (done_tx, done_rx) = oneshot::channel();

    let writer = BridgeWriter {
        stream: write_half,
        done: Some(done_tx),
        cancel: cancel.clone(),
    };

    let reader = ChatStream {
        id: Uuid::new_v4(),
        stream: read_half,
        done: done_rx,
        cancel,
        terminal: None,
    };

    (writer, reader)
}

/// Producer side of the bridge
pub struct BridgeWriter {
    stream: DuplexStream,
    done: Option<oneshot::Sender<Completion>>,
    cancel: CancellationToken,
}

impl BridgeWriter {
    /// Write the whole chunk, waiting while the buffer is full.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), DomainError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DomainError::cancelled("chat stream cancelled")),
            result = self.stream.write_all(chunk) => result.map_err(|e| {
                DomainError::internal(format!("Chat stream reader is gone: {}", e))
            }),
        }
    }

    /// Finish the stream successfully; the reader sees end-of-stream after
    /// draining everything written so far.
    pub fn close(self) {
        self.finish(Ok(()));
    }

    /// Finish the stream with an error; the reader sees it after draining
    /// everything written so far.
    pub fn close_with_error(self, error: DomainError) {
        self.finish(Err(error));
    }

    fn finish(mut self, completion: Completion) {
        // The completion must be in place before the pipe reports EOF.
        if let Some(done) = self.done.take() {
            let _ = done.send(completion);
        }
    }
}

impl fmt::Debug for BridgeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeWriter")
            .field("closed", &self.done.is_none())
            .finish()
    }
}

/// Read side of one chat generation
///
/// Once `receive` reports end-of-stream or an error, every later call reports
/// the same outcome.
pub struct ChatStream {
    id: Uuid,
    stream: DuplexStream,
    done: oneshot::Receiver<Completion>,
    cancel: CancellationToken,
    terminal: Option<Completion>,
}

enum ReadOutcome {
    Cancelled(DomainError),
    Read(std::io::Result<usize>),
}

impl ChatStream {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Token governing this stream's generation task
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Pull the next chunk of generated bytes.
    ///
    /// Returns `Ok(None)` at end-of-stream. Cancelling `cancel` (or the token
    /// the stream was created with) terminates the stream with a cancellation
    /// error, even when unread bytes remain.
    pub async fn receive(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<Bytes>, DomainError> {
        if let Some(terminal) = &self.terminal {
            return terminal.clone().map(|()| None);
        }

        let mut buf = BytesMut::zeroed(RECEIVE_CHUNK_SIZE);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                ReadOutcome::Cancelled(DomainError::cancelled("receive cancelled by caller"))
            }
            _ = self.cancel.cancelled() => {
                ReadOutcome::Cancelled(DomainError::cancelled("chat stream cancelled"))
            }
            read = self.stream.read(&mut buf) => ReadOutcome::Read(read),
        };

        match outcome {
            ReadOutcome::Read(Ok(0)) => {
                let completion = match (&mut self.done).await {
                    Ok(completion) => completion,
                    Err(_) => Err(DomainError::internal(
                        "Generation task stopped without finishing the stream",
                    )),
                };
                self.terminate(completion)
            }
            ReadOutcome::Read(Ok(n)) => {
                buf.truncate(n);
                debug!(stream_id = %self.id, bytes = n, "Chat stream chunk received");
                Ok(Some(buf.freeze()))
            }
            ReadOutcome::Read(Err(e)) => self.terminate(Err(DomainError::internal(format!(
                "Chat stream read failed: {}",
                e
            )))),
            ReadOutcome::Cancelled(error) => {
                self.cancel.cancel();
                self.terminate(Err(error))
            }
        }
    }

    /// Drain the stream into text.
    ///
    /// Decoding happens once over the concatenated bytes, so multi-byte
    /// characters split across chunks survive.
    pub async fn collect_text(&mut self, cancel: &CancellationToken) -> Result<String, DomainError> {
        let mut bytes = Vec::new();
        while let Some(chunk) = self.receive(cancel).await? {
            bytes.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Adapt the stream to `futures::Stream`; it ends after end-of-stream or
    /// after yielding the terminal error once.
    pub fn into_stream(self, cancel: CancellationToken) -> ChunkStream {
        let stream = futures::stream::unfold(Some(self), move |state| {
            let cancel = cancel.clone();
            async move {
                let mut chat = state?;
                match chat.receive(&cancel).await {
                    Ok(Some(chunk)) => Some((Ok(chunk), Some(chat))),
                    Ok(None) => None,
                    Err(e) => Some((Err(e), None)),
                }
            }
        });

        Box::pin(stream)
    }

    fn terminate(&mut self, completion: Completion) -> Result<Option<Bytes>, DomainError> {
        debug!(
            stream_id = %self.id,
            failed = completion.is_err(),
            "Chat stream terminated"
        );
        self.terminal = Some(completion.clone());
        completion.map(|()| None)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream")
            .field("id", &self.id)
            .field("terminal", &self.terminal)
            .finish()
    }
}
