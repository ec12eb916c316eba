//! The annotation-channel parser: a four-state automaton that separates
//! raw console output from `\n\032\032name ...\n` markers (spec §4.6),
//! lifted byte-for-byte from `gdbwire_annotation_parser_parse` in
//! `gdbwire_annotation_parser.c`, including its "send a line at a time"
//! console-output flushing and its state-machine backtracking when a
//! marker prefix doesn't materialize.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::diagnostics::log_annotation_push;
use crate::error::AnnotationError;
use crate::parse::buffer::ByteBuffer;

/// The recognized annotation names (spec §6.3), mapping to a kind. Anything
/// else maps to [`AnnotationKind::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    BreakpointsInvalid,
    Source,
    FrameEnd,
    FramesInvalid,
    PreCommands,
    Commands,
    PostCommands,
    PreOverloadChoice,
    OverloadChoice,
    PostOverloadChoice,
    PreInstanceChoice,
    InstanceChoice,
    PostInstanceChoice,
    PreQuery,
    Query,
    PostQuery,
    PrePromptForContinue,
    PromptForContinue,
    PostPromptForContinue,
    PrePrompt,
    Prompt,
    PostPrompt,
    ErrorBegin,
    Error,
    Quit,
    Exited,
    Unknown,
}

fn annotation_table() -> &'static HashMap<&'static str, AnnotationKind> {
    static TABLE: OnceLock<HashMap<&'static str, AnnotationKind>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use AnnotationKind::*;
        HashMap::from([
            ("breakpoints-invalid", BreakpointsInvalid),
            ("source", Source),
            ("frame-end", FrameEnd),
            ("frames-invalid", FramesInvalid),
            ("pre-commands", PreCommands),
            ("commands", Commands),
            ("post-commands", PostCommands),
            ("pre-overload-choice", PreOverloadChoice),
            ("overload-choice", OverloadChoice),
            ("post-overload-choice", PostOverloadChoice),
            ("pre-instance-choice", PreInstanceChoice),
            ("instance-choice", InstanceChoice),
            ("post-instance-choice", PostInstanceChoice),
            ("pre-query", PreQuery),
            ("query", Query),
            ("post-query", PostQuery),
            ("pre-prompt-for-continue", PrePromptForContinue),
            ("prompt-for-continue", PromptForContinue),
            ("post-prompt-for-continue", PostPromptForContinue),
            ("pre-prompt", PrePrompt),
            ("prompt", Prompt),
            ("post-prompt", PostPrompt),
            ("error-begin", ErrorBegin),
            ("error", Error),
            ("quit", Quit),
            ("exited", Exited),
        ])
    })
}

/// A console-output byte run, or a parsed annotation marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationOutput {
    ConsoleOutput(String),
    Annotation { kind: AnnotationKind, raw_text: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    GdbData,
    NewLine,
    ControlZ,
    Text,
}

/// Splits the annotation channel into console-output runs and discrete
/// annotations, retaining partial state (a pending marker prefix, or a
/// partially accumulated annotation body) across `push_data` calls.
///
/// Holds its two accumulators in [`ByteBuffer`]s rather than plain `Vec<u8>`,
/// matching `gdbwire_annotation_parser`'s own two `gdbwire_string*` fields in
/// `gdbwire_annotation_parser.c` — and letting a failed accumulator grow
/// surface as [`AnnotationError::NoMem`] instead of being unrepresentable.
pub struct AnnotationParser<F> {
    state: State,
    console_output: ByteBuffer,
    annotation_text: ByteBuffer,
    sink: F,
}

impl<F: FnMut(AnnotationOutput)> AnnotationParser<F> {
    #[must_use]
    pub fn new(sink: F) -> Self {
        AnnotationParser {
            state: State::GdbData,
            console_output: ByteBuffer::new(),
            annotation_text: ByteBuffer::new(),
            sink,
        }
    }

    /// Feeds `bytes` through the state machine, emitting `ConsoleOutput`
    /// and `Annotation` events to the sink as they become available.
    /// `\r` bytes are discarded unconditionally in every state, before the
    /// state machine even runs.
    pub fn push_data(&mut self, bytes: &[u8]) -> Result<(), AnnotationError> {
        log_annotation_push(bytes.len());
        for &byte in bytes {
            if byte == b'\r' {
                continue;
            }
            self.step(byte)?;
        }
        self.flush_console_output()
    }

    fn step(&mut self, byte: u8) -> Result<(), AnnotationError> {
        match self.state {
            State::GdbData => {
                if byte == b'\n' {
                    self.state = State::NewLine;
                } else {
                    self.process_char(byte)?;
                }
            }
            State::NewLine => {
                if byte == 0x1a {
                    self.state = State::ControlZ;
                } else {
                    self.process_char(b'\n')?;
                    if byte == b'\n' {
                        // stay in NewLine: this byte is now the deferred newline
                    } else {
                        self.process_char(byte)?;
                        self.state = State::GdbData;
                    }
                }
            }
            State::ControlZ => {
                if byte == 0x1a {
                    self.state = State::Text;
                } else {
                    self.process_char(b'\n')?;
                    self.process_char(0x1a)?;
                    if byte == b'\n' {
                        self.state = State::NewLine;
                    } else {
                        self.process_char(byte)?;
                        self.state = State::GdbData;
                    }
                }
            }
            State::Text => {
                if byte == b'\n' {
                    self.finish_annotation()?;
                    self.state = State::GdbData;
                    self.annotation_text.clear();
                } else {
                    self.annotation_text.append(&[byte])?;
                }
            }
        }
        Ok(())
    }

    /// Appends `byte` to the console accumulator; flushes immediately if it
    /// was a newline, matching `gdbwire_annotation_parser_process_char`'s
    /// "send a line at a time" policy.
    fn process_char(&mut self, byte: u8) -> Result<(), AnnotationError> {
        self.console_output.append(&[byte])?;
        if byte == b'\n' {
            self.flush_console_output()?;
        }
        Ok(())
    }

    fn flush_console_output(&mut self) -> Result<(), AnnotationError> {
        if !self.console_output.is_empty() {
            let text = String::from_utf8_lossy(self.console_output.as_bytes()).into_owned();
            self.console_output.clear();
            (self.sink)(AnnotationOutput::ConsoleOutput(text));
        }
        Ok(())
    }

    fn finish_annotation(&mut self) -> Result<(), AnnotationError> {
        let raw_text = String::from_utf8_lossy(self.annotation_text.as_bytes()).into_owned();
        let name_end = raw_text.find(' ').unwrap_or(raw_text.len());
        let kind = annotation_table()
            .get(&raw_text[..name_end])
            .copied()
            .unwrap_or(AnnotationKind::Unknown);
        // Any console output accumulated before the marker is sent first.
        self.flush_console_output()?;
        (self.sink)(AnnotationOutput::Annotation { kind, raw_text });
        Ok(())
    }
}
