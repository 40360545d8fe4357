//! Server-Sent Events framing and stream-safe UTF-8 decoding.

use bytes::Bytes;
use futures::{ stream, StreamExt };

use super::chat::ByteStream;

/// Wraps `text` as a single SSE frame.
pub fn frame(text: &str) -> Bytes {
    format!("data: {}\n\n", text).into()
}

/// Incremental UTF-8 decoder.
///
/// An incomplete code point at the end of a chunk is held back until the next chunk
/// arrives, so decoded text never contains a half character. Invalid sequences are
/// replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // valid_up_to always lands on a char boundary
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flushes whatever is still held back. Returns `None` when nothing is pending.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(rest)
    }
}

/// Re-frames a raw upstream byte stream as SSE: one `data: <text>\n\n` frame per
/// upstream chunk, in arrival order. Pull-based, so nothing is read from upstream
/// before the previous frame has been taken.
pub fn sse_frames(upstream: ByteStream) -> ByteStream {
    let state = Some((upstream, Utf8Decoder::new()));

    Box::pin(stream::unfold(state, |state| async move {
        let (mut upstream, mut decoder) = state?;
        loop {
            match upstream.next().await {
                Some(Ok(chunk)) => {
                    let text = decoder.decode(&chunk);
                    if text.is_empty() {
                        continue;
                    }
                    return Some((Ok(frame(&text)), Some((upstream, decoder))));
                }
                Some(Err(e)) => return Some((Err(e), None)),
                None => {
                    return decoder.finish().map(|rest| (Ok(frame(&rest)), None));
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    fn upstream(chunks: Vec<Result<Bytes, ChatError>>) -> ByteStream {
        Box::pin(stream::iter(chunks))
    }

    fn ok(bytes: &'static [u8]) -> Result<Bytes, ChatError> {
        Ok(Bytes::from_static(bytes))
    }

    #[test]
    fn frame_format() {
        assert_eq!(frame("hello").as_ref(), b"data: hello\n\n");
        assert_eq!(frame("").as_ref(), b"data: \n\n");
    }

    #[test]
    fn decoder_carries_split_code_point() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "héllo".as_bytes();
        assert_eq!(decoder.decode(&bytes[..2]), "h");
        assert_eq!(decoder.decode(&bytes[2..]), "éllo");
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn decoder_flushes_truncated_tail() {
        let mut decoder = Utf8Decoder::new();
        let emoji = "🙂".as_bytes();
        assert_eq!(decoder.decode(&emoji[..3]), "");
        assert_eq!(decoder.finish().as_deref(), Some("\u{FFFD}"));
    }

    #[tokio::test]
    async fn one_frame_per_chunk_in_order() {
        let out: Vec<Bytes> = sse_frames(upstream(vec![ok(b"{\"a\":1}"), ok(b"two"), ok(b" three")]))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            out,
            vec![
                Bytes::from_static(b"data: {\"a\":1}\n\n"),
                Bytes::from_static(b"data: two\n\n"),
                Bytes::from_static(b"data:  three\n\n"),
            ]
        );
    }

    #[tokio::test]
    async fn split_character_is_reassembled_across_frames() {
        let bytes = "añb".as_bytes();
        let out: Vec<Bytes> = sse_frames(upstream(vec![ok(&bytes[..2]), ok(&bytes[2..])]))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(out, vec![Bytes::from_static(b"data: a\n\n"), Bytes::from("data: ñb\n\n")]);
    }

    #[tokio::test]
    async fn upstream_error_ends_the_stream() {
        let mut frames = sse_frames(upstream(vec![ok(b"partial"), Err(ChatError::NoReadableBody), ok(b"never")]));
        assert_eq!(frames.next().await.unwrap().unwrap(), Bytes::from_static(b"data: partial\n\n"));
        assert!(frames.next().await.unwrap().is_err());
        assert!(frames.next().await.is_none());
    }
}
