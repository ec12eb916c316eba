//! [`Facade`]: a trivial demultiplexer over [`MiParser`] that routes each
//! [`OutputRecord`] variant to its own callback, plus a one-shot
//! `interpret_single` helper for synchronous request/response use (spec
//! §4.7), grounded on `gdbwire_callbacks`'s five function pointers and
//! `gdbwire_interpreter_exec` in `gdbwire.c`.

use crate::command::{Command, CommandKind};
use crate::error::{DecodeError, MiError};
use crate::parse::buffer::ByteBuffer;
use crate::parse::parser::{drain_lines, MiParser};
use crate::value::{AsyncRecord, OobRecord, OutputRecord, ParseError, ResultRecord, StreamRecord};

/// Demultiplexes parsed output into up to five independent callbacks, one
/// per [`OutputRecord`] variant, mirroring `gdbwire_callbacks`'s five
/// function pointers one for one rather than a single combined closure.
///
/// Owns its own line-framing buffer rather than an [`MiParser`] directly:
/// an `MiParser`'s sink closure is fixed at construction, but a façade
/// needs that sink to call back into its own per-variant callbacks, which
/// would make the parser self-referential. Using the same
/// buffer-plus-free-function plumbing `MiParser` is built on avoids that
/// without duplicating the line-extraction logic.
#[derive(Default)]
pub struct Facade<'a> {
    buffer: ByteBuffer,
    on_stream: Option<Box<dyn FnMut(StreamRecord) + 'a>>,
    on_async: Option<Box<dyn FnMut(AsyncRecord) + 'a>>,
    on_result: Option<Box<dyn FnMut(ResultRecord) + 'a>>,
    on_prompt: Option<Box<dyn FnMut() + 'a>>,
    on_parse_error: Option<Box<dyn FnMut(ParseError) + 'a>>,
}

impl<'a> Facade<'a> {
    #[must_use]
    pub fn new() -> Self {
        Facade::default()
    }

    #[must_use]
    pub fn on_stream(mut self, f: impl FnMut(StreamRecord) + 'a) -> Self {
        self.on_stream = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_async(mut self, f: impl FnMut(AsyncRecord) + 'a) -> Self {
        self.on_async = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_result(mut self, f: impl FnMut(ResultRecord) + 'a) -> Self {
        self.on_result = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_prompt(mut self, f: impl FnMut() + 'a) -> Self {
        self.on_prompt = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_parse_error(mut self, f: impl FnMut(ParseError) + 'a) -> Self {
        self.on_parse_error = Some(Box::new(f));
        self
    }

    /// Appends `bytes` and dispatches every complete line's record to
    /// whichever callback matches its variant, in order. Partial trailing
    /// data remains buffered for a future call.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), MiError> {
        // Destructuring `self` into its fields borrows each one
        // independently, so the buffer can be driven by `drain_lines`
        // while the closure below mutably borrows the callback fields —
        // a single `&mut self` method call couldn't express that split.
        let Facade { buffer, on_stream, on_async, on_result, on_prompt, on_parse_error } = self;
        drain_lines(buffer, bytes, |out| match out.record {
            OutputRecord::Oob(OobRecord::Stream(rec)) => {
                if let Some(cb) = on_stream {
                    cb(rec);
                }
            }
            OutputRecord::Oob(OobRecord::Async(rec)) => {
                if let Some(cb) = on_async {
                    cb(rec);
                }
            }
            OutputRecord::Result(rec) => {
                if let Some(cb) = on_result {
                    cb(rec);
                }
            }
            OutputRecord::Prompt => {
                if let Some(cb) = on_prompt {
                    cb();
                }
            }
            OutputRecord::ParseError(err) => {
                if let Some(cb) = on_parse_error {
                    cb(err);
                }
            }
        })
    }
}

/// Parses `bytes` as a single, complete, one-shot command response and
/// decodes it as `kind`, grounded on `gdbwire_interpreter_exec`: the bytes
/// must produce exactly one result record and no stream, async, prompt, or
/// parse-error record, else the shape is rejected as a logic error, mirroring
/// `gdbwire_interpreter_exec_{stream_record,async_record,prompt,parse_error}`
/// all unconditionally setting `ctx->result = GDBWIRE_LOGIC`.
pub fn interpret_single(bytes: &[u8], kind: CommandKind) -> Result<Command, DecodeError> {
    let mut result: Option<ResultRecord> = None;
    let mut other_event = false;
    {
        let mut parser = MiParser::new(|out| match out.record {
            OutputRecord::Result(rec) => {
                if result.is_some() {
                    other_event = true;
                } else {
                    result = Some(rec);
                }
            }
            _ => other_event = true,
        });
        parser
            .push(bytes)
            .map_err(|e| DecodeError::Logic(format!("failed to buffer input: {e}")))?;
    }
    if other_event {
        return Err(DecodeError::Logic(
            "expected exactly one result record and nothing else".to_string(),
        ));
    }
    let record = result.ok_or_else(|| {
        DecodeError::Logic("input did not contain a result record".to_string())
    })?;
    Command::decode(kind, &record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ResultClass, StreamKind};

    #[test]
    fn dispatches_each_record_kind_to_its_own_callback() {
        let mut streams = Vec::new();
        let mut prompts = 0;
        {
            let mut facade = Facade::new()
                .on_stream(|rec| streams.push(rec))
                .on_prompt(|| prompts += 1);
            facade.push(b"~\"hello\"\n(gdb)\n").unwrap();
        }
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].kind, StreamKind::Console);
        assert_eq!(prompts, 1);
    }

    #[test]
    fn interpret_single_decodes_a_clean_response() {
        let cmd = interpret_single(b"^done,line=\"1\",file=\"a.c\"\n", CommandKind::SourceFile)
            .unwrap();
        match cmd {
            Command::SourceFile(sf) => assert_eq!(sf.file, "a.c"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn interpret_single_rejects_extra_stream_record() {
        let err = interpret_single(
            b"~\"noise\"\n^done,line=\"1\",file=\"a.c\"\n",
            CommandKind::SourceFile,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Logic(_)));
    }

    #[test]
    fn interpret_single_rejects_missing_result_record() {
        let err = interpret_single(b"~\"noise\"\n", CommandKind::SourceFile).unwrap_err();
        assert!(matches!(err, DecodeError::Logic(_)));
    }

    #[test]
    fn interpret_single_rejects_non_done_class_via_command_decode() {
        let err = interpret_single(b"^error,msg=\"boom\"\n", CommandKind::SourceFile).unwrap_err();
        assert!(matches!(err, DecodeError::Assert(_)));
    }

    #[test]
    fn buffers_a_partial_line_across_separate_push_calls() {
        let mut streams = Vec::new();
        {
            let mut facade = Facade::new().on_stream(|rec| streams.push(rec));
            facade.push(b"~\"partial").unwrap();
            assert!(streams.is_empty());
            facade.push(b" line\"\n").unwrap();
        }
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].text, "partial line");
    }

    #[test]
    fn result_class_is_exposed_on_the_record() {
        let mut seen_class = None;
        {
            let mut facade = Facade::new().on_result(|rec| seen_class = Some(rec.class.clone()));
            facade.push(b"^done\n").unwrap();
        }
        assert_eq!(seen_class, Some(ResultClass::Done));
    }
}
