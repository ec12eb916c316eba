//! Error taxonomy.
//!
//! The wire protocol itself never fails to decode a line: unrecognized
//! syntax becomes a [`ParseError`](crate::ParseError) *record* in the output
//! stream, not an `Err`. The error types here cover everything else that can
//! go wrong — buffer growth, command decoding, and annotation handling —
//! following the four-way split of the original `gdbwire_result` enum
//! (`GDBWIRE_OK`/`GDBWIRE_ASSERT`/`GDBWIRE_LOGIC`/`GDBWIRE_NOMEM`).

use static_assertions::assert_impl_all;
use thiserror::Error;

/// Failures from [`ByteBuffer`](crate::parse::buffer::ByteBuffer) growth and
/// slicing.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum BufferError {
    /// The buffer would need to grow past what `usize` can address.
    #[error("buffer capacity would overflow")]
    CapacityOverflow,
    /// An erase was requested starting outside the buffer's current bounds.
    #[error("erase position {pos} is out of bounds for a buffer of length {len}")]
    EraseOutOfBounds { pos: usize, len: usize },
}

/// Failures from [`MiParser::push`](crate::MiParser::push).
///
/// A malformed *line* never reaches this type — it becomes a
/// [`ParseError`](crate::ParseError) record delivered to the sink. This type
/// covers only the things that stop the parser from making progress at all.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum MiError {
    /// The internal buffer failed to grow to hold the pushed bytes.
    #[error("failed to buffer pushed data: {0}")]
    NoMem(#[from] BufferError),
}

/// Failures from [`AnnotationParser::push_data`](crate::AnnotationParser::push_data).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum AnnotationError {
    /// The internal buffer failed to grow to hold the pushed bytes.
    #[error("failed to buffer pushed data: {0}")]
    NoMem(#[from] BufferError),
}

/// Failures from decoding a [`ResultRecord`](crate::ResultRecord) into a
/// typed [`Command`](crate::Command).
///
/// Mirrors the `GDBWIRE_ASSERT`/`GDBWIRE_LOGIC`/`GDBWIRE_NOMEM` outcomes of
/// `gdbwire_get_mi_command` and the command-specific decoders in
/// `gdbwire_mi_command.c`: a missing required field or a result class other
/// than `done` is a logic error, a field present but shaped in a way the
/// decoder can't make sense of is also a logic error, and only genuine
/// allocation failure is `NoMem`.
#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// A required field was missing from the result record, or the record's
    /// shape otherwise didn't match what the command kind requires.
    ///
    /// This also covers cases the original C tolerates loosely — for
    /// example, a `-break-insert` response whose `body` list contains one
    /// or more unlabelled tuples after the first `bkpt=`-labelled one is
    /// *not* an error (GDB itself emits this shape for multi-location
    /// breakpoints); only a genuinely unrecognized shape lands here.
    #[error("{0}")]
    Logic(String),
    /// A caller-supplied precondition was violated, e.g. a command kind was
    /// requested against a record whose `result_class` isn't `done`.
    #[error("{0}")]
    Assert(String),
    /// Failed to allocate memory while building the decoded command.
    #[error("failed to allocate memory decoding command")]
    NoMem(#[from] BufferError),
}

assert_impl_all!(BufferError: std::error::Error, Send, Sync);
assert_impl_all!(MiError: std::error::Error, Send, Sync);
assert_impl_all!(AnnotationError: std::error::Error, Send, Sync);
assert_impl_all!(DecodeError: std::error::Error, Send, Sync);
