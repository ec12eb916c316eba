//! A streaming parser for the GDB/LLDB machine-interface wire protocol and
//! its companion annotation channel.
//!
//! [`MiParser`] turns a byte stream into a sequence of [`Output`] records —
//! stream output, async notifications, command responses, prompts, and
//! recoverable parse errors — one per line, in order, without ever blocking
//! on more input. [`Facade`] demultiplexes those records into independent
//! callbacks and adds a one-shot [`interpret_single`] helper for
//! request/response use. [`AnnotationParser`] separately decodes the older
//! `\n\032\032name ...\n` annotation channel. [`Command::decode`] validates
//! and materializes typed values (source locations, stack frames, breakpoint
//! tables) out of a parsed [`ResultRecord`].
//!
//! Driving the debugger process, interpreting record semantics beyond what
//! [`Command::decode`] validates, and rendering output are all left to the
//! caller.

pub mod command;
pub mod diagnostics;
pub mod error;
pub mod facade;
pub mod parse;
pub mod value;

pub use command::{
    BreakInfo, Breakpoint, Command, CommandKind, Disposition, SourceFile, SourceFileEntry,
    StackFrame,
};
pub use error::{AnnotationError, BufferError, DecodeError, MiError};
pub use facade::{interpret_single, Facade};
pub use parse::annotation::{AnnotationKind, AnnotationOutput, AnnotationParser};
pub use parse::parser::MiParser;
pub use value::{
    AsyncClass, AsyncKind, AsyncRecord, OobRecord, Output, OutputRecord, ParseError, Position,
    ResultClass, ResultKind, ResultPayload, ResultRecord, ResultValue, StreamKind, StreamRecord,
};
