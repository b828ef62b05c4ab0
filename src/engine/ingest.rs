//! Streaming plan ingestion.
//!
//! Reads the chunked response body, appends each chunk to an append-only
//! accumulator and publishes the grown accumulator after every chunk.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::PlanError;
use crate::model::PlanEvent;

/// Control messages accepted by an in-flight ingestion.
#[derive(Debug, Clone)]
pub enum IngestControl {
    /// Stop reading and drop the response, releasing the connection.
    Cancel,
}

/// Carries UTF-8 decoding state across chunk boundaries. The transport is
/// free to split a multi-byte sequence between chunks; the undecodable
/// tail of one chunk is prepended to the next.
#[derive(Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, chunk: &[u8]) -> Result<String, PlanError> {
        self.pending.extend_from_slice(chunk);
        match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                let out = s.to_string();
                self.pending.clear();
                Ok(out)
            }
            Err(e) if e.error_len().is_none() => {
                // Incomplete sequence at the end of the buffer; emit the
                // valid prefix and keep the tail for the next chunk.
                let valid = e.valid_up_to();
                let out = std::str::from_utf8(&self.pending[..valid])
                    .map_err(|_| PlanError::Stream("invalid UTF-8 in response".to_string()))?
                    .to_string();
                self.pending.drain(..valid);
                Ok(out)
            }
            Err(_) => Err(PlanError::Stream(
                "response is not valid UTF-8".to_string(),
            )),
        }
    }

    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Consume `body` to completion, emitting a `PlanEvent::Snapshot` with the
/// whole accumulator after each chunk. Returns the final text, which equals
/// the last emitted snapshot. On any failure the partial accumulator is
/// dropped, never returned.
pub(crate) async fn accumulate<S, E>(
    mut body: S,
    event_tx: &mpsc::UnboundedSender<PlanEvent>,
    control_rx: &mut mpsc::UnboundedReceiver<IngestControl>,
) -> Result<String, PlanError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::error::Error,
{
    let mut accumulator = String::new();
    let mut carry = Utf8Carry::default();
    let mut chunks = 0usize;

    loop {
        let maybe_chunk = tokio::select! {
            ctrl = control_rx.recv() => {
                match ctrl {
                    Some(IngestControl::Cancel) | None => {
                        debug!(chunks, "ingest cancelled");
                        return Err(PlanError::Cancelled);
                    }
                }
            }
            chunk = body.next() => chunk,
        };

        match maybe_chunk {
            Some(Ok(bytes)) => {
                chunks += 1;
                let text = carry.decode(&bytes)?;
                if !text.is_empty() {
                    accumulator.push_str(&text);
                    let _ = event_tx.send(PlanEvent::Snapshot {
                        text: accumulator.clone(),
                    });
                }
            }
            Some(Err(e)) => {
                debug!(chunks, error = %e, "body read failed");
                return Err(PlanError::Stream(e.to_string()));
            }
            None => break,
        }
    }

    if !carry.is_empty() {
        return Err(PlanError::Stream(
            "response ended inside a UTF-8 sequence".to_string(),
        ));
    }
    if accumulator.is_empty() {
        return Err(PlanError::Stream(
            "response contained no plan text".to_string(),
        ));
    }

    debug!(chunks, bytes = accumulator.len(), "ingest complete");
    Ok(accumulator)
}
