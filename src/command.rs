//! Typed command decoding: validates that a [`ResultRecord`] has the shape
//! expected for a given [`CommandKind`] and materializes a typed
//! [`Command`] value (spec §4.5), grounded field-for-field on
//! `gdbwire_mi_command.c`'s `file_list_exec_source_file`,
//! `file_list_exec_source_files`, `stack_info_frame`, `break_info` and
//! `break_info_for_breakpoint`.

use crate::diagnostics::log_decode_error;
use crate::error::DecodeError;
use crate::value::{ResultClass, ResultRecord, ResultValue};

/// Which typed command a [`ResultRecord`] should be decoded as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SourceFile,
    SourceFiles,
    StackFrame,
    BreakInfo,
}

/// `-file-list-exec-source-file` response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub line: u32,
    pub file: String,
    pub fullname: Option<String>,
    /// `None` when `macro-info` was absent from the wire; `Some(false)`
    /// when it was present and `0`. This distinguishes "absent" from
    /// "present and false", per spec §4.5.
    pub macro_info: Option<bool>,
}

/// One entry of a `-file-list-exec-source-files` response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFileEntry {
    pub file: String,
    pub fullname: Option<String>,
}

/// A single stack frame, as returned e.g. by `-stack-info-frame`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub level: i32,
    /// `None` when the wire carried the literal `<unavailable>` sentinel.
    pub address: Option<String>,
    pub func: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    pub line: i32,
    pub from: Option<String>,
}

/// The normalized form of a breakpoint's `disp` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
    Delete,
    DeleteNextStop,
    Disable,
    Keep,
    Unknown,
}

/// One breakpoint (or breakpoint location) from a `-break-info`/
/// `-break-insert` style response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    pub number: String,
    /// True for a breakpoint with `addr == "<MULTIPLE>"` — a multi-location
    /// breakpoint whose locations are listed in `child_breakpoints`.
    pub multi: bool,
    /// True when this breakpoint's `number` field contained a `.`,
    /// indicating it's a location belonging to a previously emitted multi
    /// breakpoint rather than a top-level entry.
    pub from_multi: bool,
    pub enabled: bool,
    /// True for a breakpoint with `addr == "<PENDING>"`.
    pub pending: bool,
    pub address: Option<String>,
    pub catch_type: Option<String>,
    pub r#type: Option<String>,
    pub disposition: Disposition,
    pub func: Option<String>,
    pub file: Option<String>,
    pub fullname: Option<String>,
    pub line: u64,
    pub times: u64,
    pub original_location: Option<String>,
    /// Locations of a multi-location breakpoint. Empty for an ordinary,
    /// non-multi breakpoint.
    pub child_breakpoints: Vec<Breakpoint>,
    /// A non-owning back-reference to this breakpoint's parent: the index
    /// into the owning [`BreakInfo::breakpoints`] vec. `None` for a
    /// top-level breakpoint. Never participates in ownership — only the
    /// parent's `child_breakpoints` vec owns a multi-location child (spec
    /// §9 "Breakpoint back-references").
    pub parent: Option<usize>,
}

/// `-break-info` response: the flat, ordered list of top-level
/// breakpoints. Multi-location children are nested under their parent's
/// `child_breakpoints`, not listed again at the top level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakInfo {
    pub breakpoints: Vec<Breakpoint>,
}

/// A decoded, typed command response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SourceFile(SourceFile),
    SourceFiles(Vec<SourceFileEntry>),
    StackFrame(StackFrame),
    BreakInfo(BreakInfo),
}

impl Command {
    /// Validates `record` against `kind` and materializes the typed
    /// command. Requires `record.class == Done`, matching every decoder in
    /// `gdbwire_mi_command.c`.
    pub fn decode(kind: CommandKind, record: &ResultRecord) -> Result<Command, DecodeError> {
        if record.class != ResultClass::Done {
            let err = DecodeError::Assert(format!(
                "command decoding requires a result record with class done, got {:?}",
                record.class
            ));
            log_decode_error(&err.to_string());
            return Err(err);
        }
        match kind {
            CommandKind::SourceFile => decode_source_file(record),
            CommandKind::SourceFiles => decode_source_files(record),
            CommandKind::StackFrame => decode_stack_frame(record),
            CommandKind::BreakInfo => decode_break_info(record),
        }
    }
}

fn find<'a>(fields: &'a [ResultValue], key: &str) -> Option<&'a ResultValue> {
    fields.iter().find(|f| f.variable.as_deref() == Some(key))
}

fn find_str<'a>(fields: &'a [ResultValue], key: &str) -> Option<&'a str> {
    find(fields, key)?.as_cstring()
}

fn logic(message: impl Into<String>) -> DecodeError {
    let err = DecodeError::Logic(message.into());
    log_decode_error(&err.to_string());
    err
}

/// `strtoul`-like: decimal digits only, non-empty, entire string consumed,
/// no leading sign.
fn parse_u64_strict(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_u32_strict(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `strtol`-like: an optional leading `-`, then decimal digits, entire
/// string consumed. A leading `+` is rejected.
fn parse_i32_strict(s: &str) -> Option<i32> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn decode_source_file(record: &ResultRecord) -> Result<Command, DecodeError> {
    let line_str = find_str(&record.results, "line")
        .ok_or_else(|| logic("source file response is missing required field `line`"))?;
    let line = parse_u32_strict(line_str)
        .ok_or_else(|| logic(format!("invalid decimal value for `line`: {line_str:?}")))?;
    let file = find_str(&record.results, "file")
        .ok_or_else(|| logic("source file response is missing required field `file`"))?
        .to_string();
    let fullname = find_str(&record.results, "fullname").map(str::to_string);
    let macro_info = match find_str(&record.results, "macro-info") {
        None => None,
        Some("0") => Some(false),
        Some("1") => Some(true),
        Some(other) => {
            return Err(logic(format!("invalid value for `macro-info`: {other:?}")));
        }
    };
    Ok(Command::SourceFile(SourceFile { line, file, fullname, macro_info }))
}

fn decode_source_files(record: &ResultRecord) -> Result<Command, DecodeError> {
    let files = match find(&record.results, "files") {
        None => Vec::new(),
        Some(rv) => {
            let elements = rv
                .children()
                .ok_or_else(|| logic("`files` must be a list"))?;
            let mut out = Vec::with_capacity(elements.len());
            for elem in elements {
                let fields = elem
                    .children()
                    .ok_or_else(|| logic("each element of `files` must be a tuple"))?;
                if fields.is_empty() {
                    return Err(logic("a `files` element is missing required field `file`"));
                }
                if fields[0].variable.as_deref() != Some("file") {
                    return Err(logic(
                        "the first field of a `files` element must be `file`",
                    ));
                }
                let file = fields[0]
                    .as_cstring()
                    .ok_or_else(|| logic("`file` must be a string"))?
                    .to_string();
                let fullname = if fields.len() > 1 {
                    if fields[1].variable.as_deref() != Some("fullname") {
                        return Err(logic(
                            "the second field of a `files` element must be `fullname`",
                        ));
                    }
                    Some(
                        fields[1]
                            .as_cstring()
                            .ok_or_else(|| logic("`fullname` must be a string"))?
                            .to_string(),
                    )
                } else {
                    None
                };
                if fields.len() > 2 {
                    return Err(logic("a `files` element may only have `file`/`fullname`"));
                }
                out.push(SourceFileEntry { file, fullname });
            }
            out
        }
    };
    Ok(Command::SourceFiles(files))
}

fn decode_stack_frame(record: &ResultRecord) -> Result<Command, DecodeError> {
    let frame = find(&record.results, "frame")
        .ok_or_else(|| logic("stack frame response is missing required field `frame`"))?;
    let fields = frame
        .children()
        .ok_or_else(|| logic("`frame` must be a tuple"))?;

    let level_str = find_str(fields, "level")
        .ok_or_else(|| logic("`frame` is missing required field `level`"))?;
    let level = parse_i32_strict(level_str)
        .ok_or_else(|| logic(format!("invalid decimal value for `level`: {level_str:?}")))?;

    let addr = find_str(fields, "addr")
        .ok_or_else(|| logic("`frame` is missing required field `addr`"))?;
    let address = if addr == "<unavailable>" { None } else { Some(addr.to_string()) };

    let func = find_str(fields, "func").map(str::to_string);
    let file = find_str(fields, "file").map(str::to_string);
    let fullname = find_str(fields, "fullname").map(str::to_string);
    let line = match find_str(fields, "line") {
        None => 0,
        Some(s) => {
            parse_i32_strict(s).ok_or_else(|| logic(format!("invalid decimal value for `line`: {s:?}")))?
        }
    };
    let from = find_str(fields, "from").map(str::to_string);

    Ok(Command::StackFrame(StackFrame { level, address, func, file, fullname, line, from }))
}

fn decode_break_info(record: &ResultRecord) -> Result<Command, DecodeError> {
    let table = find(&record.results, "BreakpointTable")
        .ok_or_else(|| logic("break info response is missing required field `BreakpointTable`"))?;
    let table_fields = table
        .children()
        .ok_or_else(|| logic("`BreakpointTable` must be a tuple"))?;
    let body = find(table_fields, "body")
        .ok_or_else(|| logic("`BreakpointTable` is missing required field `body`"))?;
    let elements = body.children().ok_or_else(|| logic("`body` must be a list"))?;

    let mut breakpoints: Vec<Breakpoint> = Vec::new();
    for elem in elements {
        let fields = elem
            .children()
            .ok_or_else(|| logic("each element of `body` must be a tuple"))?;
        let mut bkpt = breakpoint_for_fields(fields)?;
        if bkpt.from_multi {
            let parent_index = breakpoints.len().checked_sub(1).ok_or_else(|| {
                logic("a multi-location breakpoint entry has no preceding parent")
            })?;
            bkpt.parent = Some(parent_index);
            breakpoints[parent_index].child_breakpoints.push(bkpt);
        } else {
            breakpoints.push(bkpt);
        }
    }

    Ok(Command::BreakInfo(BreakInfo { breakpoints }))
}

fn breakpoint_for_fields(fields: &[ResultValue]) -> Result<Breakpoint, DecodeError> {
    let number = find_str(fields, "number")
        .ok_or_else(|| logic("a breakpoint is missing required field `number`"))?
        .to_string();
    let from_multi = number.contains('.');

    let enabled = matches!(find_str(fields, "enabled"), Some("y"));

    let (address, multi, pending) = match find_str(fields, "addr") {
        Some("<MULTIPLE>") => (None, true, false),
        Some("<PENDING>") => (None, false, true),
        Some(other) => (Some(other.to_string()), false, false),
        None => (None, false, false),
    };

    let catch_type = find_str(fields, "catch-type").map(str::to_string);
    let r#type = find_str(fields, "type").map(str::to_string);

    let disposition = match find_str(fields, "disp") {
        None => Disposition::Unknown,
        Some("del") => Disposition::Delete,
        Some("dstp") => Disposition::DeleteNextStop,
        Some("dis") => Disposition::Disable,
        Some("keep") => Disposition::Keep,
        Some(other) => return Err(logic(format!("unknown breakpoint disposition: {other:?}"))),
    };

    let func = find_str(fields, "func").map(str::to_string);
    let file = find_str(fields, "file").map(str::to_string);
    let fullname = find_str(fields, "fullname").map(str::to_string);

    let line = match find_str(fields, "line") {
        None => 0,
        Some(s) => {
            parse_u64_strict(s).ok_or_else(|| logic(format!("invalid decimal value for `line`: {s:?}")))?
        }
    };
    let times = match find_str(fields, "times") {
        None => 0,
        Some(s) => parse_u64_strict(s)
            .ok_or_else(|| logic(format!("invalid decimal value for `times`: {s:?}")))?,
    };
    let original_location = find_str(fields, "original-location").map(str::to_string);

    Ok(Breakpoint {
        number,
        multi,
        from_multi,
        enabled,
        pending,
        address,
        catch_type,
        r#type,
        disposition,
        func,
        file,
        fullname,
        line,
        times,
        original_location,
        child_breakpoints: Vec::new(),
        parent: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::grammar::parse_line;
    use crate::value::OutputRecord;

    fn result_record(line: &str) -> ResultRecord {
        match parse_line(line).record {
            OutputRecord::Result(rec) => rec,
            other => panic!("expected a result record, got {other:?}"),
        }
    }

    #[test]
    fn decodes_source_file() {
        let rec = result_record(
            "^done,line=\"33\",file=\"test.cpp\",fullname=\"/home/foo/test.cpp\",macro-info=\"0\"\n",
        );
        let cmd = Command::decode(CommandKind::SourceFile, &rec).unwrap();
        assert_eq!(
            cmd,
            Command::SourceFile(SourceFile {
                line: 33,
                file: "test.cpp".to_string(),
                fullname: Some("/home/foo/test.cpp".to_string()),
                macro_info: Some(false),
            })
        );
    }

    #[test]
    fn source_file_without_macro_info_is_none() {
        let rec = result_record("^done,line=\"1\",file=\"a.c\"\n");
        let cmd = Command::decode(CommandKind::SourceFile, &rec).unwrap();
        match cmd {
            Command::SourceFile(sf) => assert_eq!(sf.macro_info, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_source_files_list() {
        let rec = result_record(
            "^done,files=[{file=\"a.c\",fullname=\"/a.c\"},{file=\"b.c\"}]\n",
        );
        let cmd = Command::decode(CommandKind::SourceFiles, &rec).unwrap();
        match cmd {
            Command::SourceFiles(files) => {
                assert_eq!(files.len(), 2);
                assert_eq!(files[0].file, "a.c");
                assert_eq!(files[0].fullname.as_deref(), Some("/a.c"));
                assert_eq!(files[1].fullname, None);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_stack_frame_with_unavailable_address() {
        let rec = result_record(
            "^done,frame={level=\"0\",addr=\"<unavailable>\",func=\"main\",line=\"10\"}\n",
        );
        let cmd = Command::decode(CommandKind::StackFrame, &rec).unwrap();
        match cmd {
            Command::StackFrame(frame) => {
                assert_eq!(frame.level, 0);
                assert_eq!(frame.address, None);
                assert_eq!(frame.func.as_deref(), Some("main"));
                assert_eq!(frame.line, 10);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decodes_multi_location_breakpoints_with_unlabelled_siblings() {
        let rec = result_record(
            "^done,BreakpointTable={body=[bkpt={number=\"1\",addr=\"<MULTIPLE>\",disp=\"keep\"},\
             {number=\"1.1\",addr=\"0x1\",disp=\"keep\"},\
             {number=\"1.2\",addr=\"0x2\",disp=\"keep\"}]}\n",
        );
        let cmd = Command::decode(CommandKind::BreakInfo, &rec).unwrap();
        match cmd {
            Command::BreakInfo(info) => {
                assert_eq!(info.breakpoints.len(), 1);
                let parent = &info.breakpoints[0];
                assert!(parent.multi);
                assert_eq!(parent.child_breakpoints.len(), 2);
                assert!(parent.child_breakpoints[0].from_multi);
                assert_eq!(parent.child_breakpoints[0].parent, Some(0));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_disposition_is_a_logic_error() {
        let rec = result_record(
            "^done,BreakpointTable={body=[bkpt={number=\"1\",disp=\"nope\"}]}\n",
        );
        let err = Command::decode(CommandKind::BreakInfo, &rec).unwrap_err();
        assert!(matches!(err, DecodeError::Logic(_)));
    }

    #[test]
    fn rejects_non_done_class() {
        let rec = result_record("^error,msg=\"boom\"\n");
        let err = Command::decode(CommandKind::SourceFile, &rec).unwrap_err();
        assert!(matches!(err, DecodeError::Assert(_)));
    }
}
