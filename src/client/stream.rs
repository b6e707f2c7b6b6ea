//! Incremental UTF-8 decoding of a streamed response body.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::ClientError;

/// Decoded text chunks, in arrival order. Ends when the transport closes.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

/// Turn a byte stream into a text stream.
///
/// A multi-byte character split across chunks is held back until its
/// remaining bytes arrive. Invalid sequences decode to U+FFFD. Chunks that
/// decode to nothing are skipped.
pub fn decode_text_stream<S, E>(bytes: S) -> TextStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ClientError> + Send + 'static,
{
    let state = (Box::pin(bytes), Utf8Decoder::default(), false);

    let text = futures::stream::unfold(state, |(mut inner, mut decoder, done)| async move {
        if done {
            return None;
        }
        loop {
            match inner.next().await {
                Some(Ok(chunk)) => {
                    let text = decoder.push(&chunk);
                    if !text.is_empty() {
                        return Some((Ok(text), (inner, decoder, false)));
                    }
                }
                Some(Err(e)) => return Some((Err(e.into()), (inner, decoder, true))),
                None => {
                    let rest = decoder.finish();
                    if rest.is_empty() {
                        return None;
                    }
                    return Some((Ok(rest), (inner, decoder, true)));
                }
            }
        }
    });

    Box::pin(text)
}

/// Streaming UTF-8 decoder that carries incomplete trailing sequences over to
/// the next chunk.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is left when the stream ends.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
