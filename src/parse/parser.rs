//! The push-style line-framing driver: [`MiParser`] buffers bytes, slices
//! complete lines off the front of the buffer, and runs each one through
//! the [`grammar`](crate::parse::grammar) (spec §4.4).

use crate::diagnostics::{log_parse_error, log_push};
use crate::error::MiError;
use crate::parse::buffer::ByteBuffer;
use crate::parse::grammar::parse_line;
use crate::value::{Output, OutputRecord};

/// Owns the unconsumed-byte buffer and emits one [`Output`] per complete
/// line to a caller-supplied sink, synchronously, in line order.
///
/// Not internally synchronized; per spec §5 a parser instance must not be
/// shared across threads.
pub struct MiParser<F> {
    buffer: ByteBuffer,
    sink: F,
}

impl<F: FnMut(Output)> MiParser<F> {
    #[must_use]
    pub fn new(sink: F) -> Self {
        MiParser { buffer: ByteBuffer::new(), sink }
    }

    /// Appends `bytes` to the internal buffer, then extracts and parses
    /// every complete line now available, invoking the sink once per line
    /// in order. Partial trailing data remains buffered for a future push.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), MiError> {
        drain_lines(&mut self.buffer, bytes, &mut self.sink)
    }
}

/// Appends `bytes` to `buffer`, then extracts and parses every complete
/// line now available, invoking `sink` once per line in order. Partial
/// trailing data remains buffered for a future call.
///
/// A free function rather than a method so [`Facade`](crate::Facade) can
/// drive the same buffering/line-extraction logic while dispatching to
/// its own per-variant callbacks instead of a single stored sink — the
/// two need disjoint field borrows of their owning struct, which a shared
/// method taking `&mut self` can't express.
///
/// A push that contains no newline byte at all is a cheap append with no
/// further work — this mirrors the single forward-then-backward scan
/// `gdbwire_mi_parser_push_data` does to avoid re-scanning the whole
/// buffer on every single-byte push.
pub(crate) fn drain_lines(
    buffer: &mut ByteBuffer,
    bytes: &[u8],
    mut sink: impl FnMut(Output),
) -> Result<(), MiError> {
    log_push(bytes.len());
    let has_terminator = bytes.iter().any(|&b| b == b'\n' || b == b'\r');
    buffer.append(bytes)?;
    if !has_terminator {
        return Ok(());
    }
    while let Some(line_length) = next_line_length(buffer) {
        let data = buffer.as_bytes();
        let line = String::from_utf8_lossy(&data[..line_length]).into_owned();
        buffer.erase(0, line_length)?;
        let output = parse_line(&line);
        if let OutputRecord::ParseError(ref err) = output.record {
            log_parse_error(err);
        }
        sink(output);
    }
    Ok(())
}

/// Finds the length of the leading complete line in the buffer, if one is
/// available. A `\r` found as the very last buffered byte is ambiguous —
/// it might be the first half of a CRLF split across a push boundary — so
/// it is not treated as a complete line until either a following byte
/// disambiguates it or more data confirms it really is `\r\n`.
fn next_line_length(buffer: &ByteBuffer) -> Option<usize> {
    let data = buffer.as_bytes();
    let pos = buffer.find_first_of(b"\r\n");
    if pos == data.len() {
        return None;
    }
    if data[pos] == b'\r' {
        if pos + 1 < data.len() {
            Some(if data[pos + 1] == b'\n' { pos + 2 } else { pos + 1 })
        } else {
            None
        }
    } else {
        Some(pos + 1)
    }
}
