//! The parse-tree types produced by [`MiParser`](crate::MiParser): token
//! positions, the `Result` key/value tree, and the `OutputRecord` family.
//!
//! These are tagged unions end to end (`enum`s with exhaustive matching, no
//! inheritance) per the "Tagged variants" design note: `OutputRecord`,
//! `OobRecord`, `AsyncRecord::class`, `ResultRecord::class`, and
//! `ResultKind` all replace a C `kind` field plus `union`.

/// A 1-based, inclusive column range for a token inside its originating
/// line. A single-character token has `start_column == end_column`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub start_column: u32,
    pub end_column: u32,
}

impl Position {
    #[must_use]
    pub fn new(start_column: u32, end_column: u32) -> Self {
        Position { start_column, end_column }
    }

    #[must_use]
    pub fn single(column: u32) -> Self {
        Position { start_column: column, end_column: column }
    }
}

/// The kind of an async record, mirroring which sigil (`*`, `+`, `=`)
/// introduced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsyncKind {
    /// `*` — execution state changed.
    Exec,
    /// `+` — status on the length of a running operation.
    Status,
    /// `=` — a notification unrelated to a specific command.
    Notify,
}

/// The reason code carried by an async record.
///
/// Unrecognized reason strings are preserved verbatim in `Unsupported`
/// rather than discarded, since front ends may want to display or log them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AsyncClass {
    Stopped,
    Running,
    Download,
    ThreadGroupAdded,
    ThreadGroupRemoved,
    ThreadGroupStarted,
    ThreadGroupExited,
    ThreadCreated,
    ThreadExited,
    ThreadSelected,
    LibraryLoaded,
    LibraryUnloaded,
    TraceframeChanged,
    TsvCreated,
    TsvModified,
    TsvDeleted,
    BreakpointCreated,
    BreakpointModified,
    BreakpointDeleted,
    RecordStarted,
    RecordStopped,
    CmdParamChanged,
    MemoryChanged,
    /// Any class string not in the recognized set, preserved verbatim.
    Unsupported(String),
}

impl AsyncClass {
    /// Maps the wire identifier following the async sigil to a class,
    /// per §6.2's recognized list.
    #[must_use]
    pub fn from_identifier(ident: &str) -> Self {
        match ident {
            "stopped" => AsyncClass::Stopped,
            "running" => AsyncClass::Running,
            "download" => AsyncClass::Download,
            "thread-group-added" => AsyncClass::ThreadGroupAdded,
            "thread-group-removed" => AsyncClass::ThreadGroupRemoved,
            "thread-group-started" => AsyncClass::ThreadGroupStarted,
            "thread-group-exited" => AsyncClass::ThreadGroupExited,
            "thread-created" => AsyncClass::ThreadCreated,
            "thread-exited" => AsyncClass::ThreadExited,
            "thread-selected" => AsyncClass::ThreadSelected,
            "library-loaded" => AsyncClass::LibraryLoaded,
            "library-unloaded" => AsyncClass::LibraryUnloaded,
            "traceframe-changed" => AsyncClass::TraceframeChanged,
            "tsv-created" => AsyncClass::TsvCreated,
            "tsv-modified" => AsyncClass::TsvModified,
            "tsv-deleted" => AsyncClass::TsvDeleted,
            "breakpoint-created" => AsyncClass::BreakpointCreated,
            "breakpoint-modified" => AsyncClass::BreakpointModified,
            "breakpoint-deleted" => AsyncClass::BreakpointDeleted,
            "record-started" => AsyncClass::RecordStarted,
            "record-stopped" => AsyncClass::RecordStopped,
            "cmd-param-changed" => AsyncClass::CmdParamChanged,
            "memory-changed" => AsyncClass::MemoryChanged,
            other => AsyncClass::Unsupported(other.to_string()),
        }
    }
}

/// The outcome class carried by a result record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
    /// Any identifier not in the recognized set, preserved verbatim.
    Unsupported(String),
}

impl ResultClass {
    #[must_use]
    pub fn from_identifier(ident: &str) -> Self {
        match ident {
            "done" => ResultClass::Done,
            "running" => ResultClass::Running,
            "connected" => ResultClass::Connected,
            "error" => ResultClass::Error,
            "exit" => ResultClass::Exit,
            other => ResultClass::Unsupported(other.to_string()),
        }
    }
}

/// The kind of a stream record, i.e. which sigil (`~`, `@`, `&`) introduced
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// `~` — console output meant for the user.
    Console,
    /// `@` — output from the program being debugged.
    Target,
    /// `&` — the debugger's own internal log.
    Log,
}

/// `~`/`@`/`&` CSTRING. `text` is the payload with surrounding quotes
/// stripped but escape sequences left exactly as the debugger emitted them
/// — the round-trip property of spec §8 requires this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamRecord {
    pub kind: StreamKind,
    pub text: String,
}

/// `[INT] (*|+|=) IDENT ("," result-list)?`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsyncRecord {
    /// The correlation token, if the wire included one.
    ///
    /// Front ends must not rely on this being populated: modern debugger
    /// emissions never set it on async records. The field is kept rather
    /// than dropped per the open question in spec §9 — interpretation is
    /// left to the caller, not decided here.
    pub token: Option<String>,
    pub kind: AsyncKind,
    pub class: AsyncClass,
    pub results: Vec<ResultValue>,
}

/// A stream record or an async record — the two kinds of out-of-band
/// record that are not a caller's command response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OobRecord {
    Stream(StreamRecord),
    Async(AsyncRecord),
}

/// `[INT] ^ IDENT ("," result-list)?` — the response to a caller-issued
/// command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRecord {
    pub token: Option<String>,
    pub class: ResultClass,
    pub results: Vec<ResultValue>,
}

/// The payload kind of a [`ResultValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultKind {
    CString,
    Tuple,
    List,
}

/// The payload of a [`ResultValue`]: either a dequoted string or an ordered
/// sequence of children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultPayload {
    CString(String),
    Tuple(Vec<ResultValue>),
    List(Vec<ResultValue>),
}

/// A single key/value node of a result list.
///
/// `variable` is the optional `IDENT =` key. Tuples normally have keyed
/// children, but a child with no key is accepted and preserved verbatim
/// (quirk tolerance, spec §3 invariants) rather than rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultValue {
    pub variable: Option<String>,
    pub payload: ResultPayload,
}

impl ResultValue {
    #[must_use]
    pub fn kind(&self) -> ResultKind {
        match &self.payload {
            ResultPayload::CString(_) => ResultKind::CString,
            ResultPayload::Tuple(_) => ResultKind::Tuple,
            ResultPayload::List(_) => ResultKind::List,
        }
    }

    /// Returns the CString payload, if this value is one.
    #[must_use]
    pub fn as_cstring(&self) -> Option<&str> {
        match &self.payload {
            ResultPayload::CString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the child sequence, whether this value is a tuple or a list.
    #[must_use]
    pub fn children(&self) -> Option<&[ResultValue]> {
        match &self.payload {
            ResultPayload::Tuple(children) | ResultPayload::List(children) => Some(children),
            ResultPayload::CString(_) => None,
        }
    }

    /// Finds the first child keyed `variable`, if any.
    #[must_use]
    pub fn find(&self, variable: &str) -> Option<&ResultValue> {
        self.children()?
            .iter()
            .find(|child| child.variable.as_deref() == Some(variable))
    }
}

/// A detected syntax error on a single line: tokens were discarded up to
/// the next newline and parsing resumes cleanly on the following line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// The lexeme at the error site. An empty line's error token is the
    /// literal `"\n"`.
    pub token: String,
    pub pos: Position,
}

/// One parsed line of output: an out-of-band record, a command response, a
/// prompt marker, or a parse error — always paired with the literal line
/// text (including its terminating newline) that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputRecord {
    Oob(OobRecord),
    Result(ResultRecord),
    Prompt,
    ParseError(ParseError),
}

/// A fully parsed line: the record plus the exact bytes of the line that
/// produced it, terminator included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub record: OutputRecord,
    pub line: String,
}
