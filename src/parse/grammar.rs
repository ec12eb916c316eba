//! The per-line grammar: turns a line's token stream into exactly one
//! [`OutputRecord`], with error-to-newline recovery (spec §4.3).
//!
//! This is a small hand-rolled recursive-descent parser rather than
//! generated LR tables, per the "Push parser state" design note — the
//! grammar is regular enough that either approach works, and a line is
//! always fully buffered before parsing starts (`MiParser` only invokes
//! this once a complete line has been sliced out), so there is no need for
//! the token-at-a-time incrementality a true push parser would add.

use crate::parse::lexer::{tokenize, Token, TokenKind};
use crate::value::{
    AsyncClass, AsyncKind, AsyncRecord, OobRecord, Output, OutputRecord, ParseError, Position,
    ResultClass, ResultPayload, ResultRecord, ResultValue, StreamKind, StreamRecord,
};

/// Parses one complete line (terminator included) into an [`Output`].
/// Never fails: a syntax error becomes an `OutputRecord::ParseError`
/// variant rather than a `Result::Err`, per spec §4.3/§7.
pub fn parse_line(line: &str) -> Output {
    let record = match tokenize(line) {
        Ok(tokens) => parse_tokens(&tokens).unwrap_or_else(OutputRecord::ParseError),
        Err(err) => OutputRecord::ParseError(ParseError {
            token: err.lexeme.to_string(),
            pos: err.pos,
        }),
    };
    Output { record, line: line.to_string() }
}

struct Cursor<'a, 'b> {
    tokens: &'b [Token<'a>],
    index: usize,
}

impl<'a, 'b> Cursor<'a, 'b> {
    fn new(tokens: &'b [Token<'a>]) -> Self {
        Cursor { tokens, index: 0 }
    }

    /// The current token. Always valid: every token stream ends in a
    /// `Newline`, which every grammar production eventually consumes last.
    fn peek(&self) -> &Token<'a> {
        self.tokens.get(self.index).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn advance(&mut self) -> Token<'a> {
        let tok = *self.peek();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        tok
    }

    fn error_here(&self) -> ParseError {
        let tok = self.peek();
        ParseError { token: tok.lexeme.to_string(), pos: tok.pos }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error_here())
        }
    }
}

fn parse_tokens<'a>(tokens: &[Token<'a>]) -> Result<OutputRecord, ParseError> {
    let mut cur = Cursor::new(tokens);
    match cur.peek().kind {
        TokenKind::Newline => Err(ParseError { token: "\n".to_string(), pos: cur.peek().pos }),
        TokenKind::Tilde => {
            cur.advance();
            parse_stream(StreamKind::Console, &mut cur)
        }
        TokenKind::At => {
            cur.advance();
            parse_stream(StreamKind::Target, &mut cur)
        }
        TokenKind::Ampersand => {
            cur.advance();
            parse_stream(StreamKind::Log, &mut cur)
        }
        TokenKind::Star => {
            cur.advance();
            parse_async(AsyncKind::Exec, None, &mut cur)
        }
        TokenKind::Plus => {
            cur.advance();
            parse_async(AsyncKind::Status, None, &mut cur)
        }
        TokenKind::Equals => {
            cur.advance();
            parse_async(AsyncKind::Notify, None, &mut cur)
        }
        TokenKind::Caret => {
            cur.advance();
            parse_result(None, &mut cur)
        }
        TokenKind::Integer => {
            let token_tok = cur.advance();
            let token = Some(token_tok.lexeme.to_string());
            match cur.peek().kind {
                TokenKind::Star => {
                    cur.advance();
                    parse_async(AsyncKind::Exec, token, &mut cur)
                }
                TokenKind::Plus => {
                    cur.advance();
                    parse_async(AsyncKind::Status, token, &mut cur)
                }
                TokenKind::Equals => {
                    cur.advance();
                    parse_async(AsyncKind::Notify, token, &mut cur)
                }
                TokenKind::Caret => {
                    cur.advance();
                    parse_result(token, &mut cur)
                }
                _ => Err(cur.error_here()),
            }
        }
        TokenKind::OpenParen => parse_prompt(&mut cur),
        _ => Err(cur.error_here()),
    }
}

fn parse_stream(kind: StreamKind, cur: &mut Cursor<'_, '_>) -> Result<OutputRecord, ParseError> {
    let text_tok = cur.expect(TokenKind::CString)?;
    cur.expect(TokenKind::Newline)?;
    Ok(OutputRecord::Oob(OobRecord::Stream(StreamRecord {
        kind,
        text: dequote(text_tok.lexeme),
    })))
}

fn parse_async(
    kind: AsyncKind,
    token: Option<String>,
    cur: &mut Cursor<'_, '_>,
) -> Result<OutputRecord, ParseError> {
    let class_tok = cur.expect(TokenKind::Identifier)?;
    let class = AsyncClass::from_identifier(class_tok.lexeme);
    let results = parse_optional_result_list(cur)?;
    cur.expect(TokenKind::Newline)?;
    Ok(OutputRecord::Oob(OobRecord::Async(AsyncRecord { token, kind, class, results })))
}

fn parse_result(
    token: Option<String>,
    cur: &mut Cursor<'_, '_>,
) -> Result<OutputRecord, ParseError> {
    let class_tok = cur.expect(TokenKind::Identifier)?;
    let class = ResultClass::from_identifier(class_tok.lexeme);
    let results = parse_optional_result_list(cur)?;
    cur.expect(TokenKind::Newline)?;
    Ok(OutputRecord::Result(ResultRecord { token, class, results }))
}

fn parse_prompt(cur: &mut Cursor<'_, '_>) -> Result<OutputRecord, ParseError> {
    cur.expect(TokenKind::OpenParen)?;
    let ident = cur.expect(TokenKind::Identifier)?;
    if ident.lexeme != "gdb" {
        return Err(ParseError { token: ident.lexeme.to_string(), pos: ident.pos });
    }
    cur.expect(TokenKind::CloseParen)?;
    cur.expect(TokenKind::Newline)?;
    Ok(OutputRecord::Prompt)
}

/// `("," result-list)?` — a leading comma introduces the list; its absence
/// means an empty result sequence.
fn parse_optional_result_list(cur: &mut Cursor<'_, '_>) -> Result<Vec<ResultValue>, ParseError> {
    if cur.peek().kind == TokenKind::Comma {
        cur.advance();
        parse_result_list(cur)
    } else {
        Ok(Vec::new())
    }
}

/// `result ("," result)*`. Stops as soon as an element isn't followed by a
/// comma, leaving the cursor positioned on whatever comes next — the caller
/// decides whether that's valid (a closing bracket/brace, or a newline).
fn parse_result_list(cur: &mut Cursor<'_, '_>) -> Result<Vec<ResultValue>, ParseError> {
    let mut results = Vec::new();
    loop {
        results.push(parse_result_value(cur)?);
        if cur.peek().kind == TokenKind::Comma {
            cur.advance();
        } else {
            break;
        }
    }
    Ok(results)
}

/// `result := IDENT "=" value | value` — value-only elements are tolerated
/// (spec §3: "a child with no key is accepted ... and preserved verbatim").
fn parse_result_value(cur: &mut Cursor<'_, '_>) -> Result<ResultValue, ParseError> {
    let variable = if cur.peek().kind == TokenKind::Identifier {
        let save = cur.index;
        let ident = cur.advance();
        if cur.peek().kind == TokenKind::Equals {
            cur.advance();
            Some(ident.lexeme.to_string())
        } else {
            cur.index = save;
            None
        }
    } else {
        None
    };
    let payload = parse_value(cur)?;
    Ok(ResultValue { variable, payload })
}

fn parse_value(cur: &mut Cursor<'_, '_>) -> Result<ResultPayload, ParseError> {
    match cur.peek().kind {
        TokenKind::CString => {
            let tok = cur.advance();
            Ok(ResultPayload::CString(dequote(tok.lexeme)))
        }
        TokenKind::OpenBrace => {
            cur.advance();
            if cur.peek().kind == TokenKind::CloseBrace {
                cur.advance();
                return Ok(ResultPayload::Tuple(Vec::new()));
            }
            let children = parse_result_list(cur)?;
            cur.expect(TokenKind::CloseBrace)?;
            Ok(ResultPayload::Tuple(children))
        }
        TokenKind::OpenBracket => {
            cur.advance();
            if cur.peek().kind == TokenKind::CloseBracket {
                cur.advance();
                return Ok(ResultPayload::List(Vec::new()));
            }
            let children = parse_result_list(cur)?;
            cur.expect(TokenKind::CloseBracket)?;
            Ok(ResultPayload::List(children))
        }
        _ => Err(cur.error_here()),
    }
}

/// Strips the surrounding quotes from a CString lexeme. Escape sequences
/// are left untouched: spec §4.3 requires the stream-record `text` field
/// to carry escapes exactly as emitted, and the same dequoting is applied
/// uniformly to every `CString` result payload so a command decoder sees
/// the literal wire bytes it needs to match against (e.g. `"<MULTIPLE>"`,
/// `"y"`, `"del"`).
fn dequote(lexeme: &str) -> String {
    lexeme[1..lexeme.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OutputRecord;

    #[test]
    fn stream_record() {
        let out = parse_line("~\"hello\"\n");
        assert_eq!(out.line, "~\"hello\"\n");
        match out.record {
            OutputRecord::Oob(OobRecord::Stream(rec)) => {
                assert_eq!(rec.kind, StreamKind::Console);
                assert_eq!(rec.text, "hello");
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn async_record_with_token() {
        let out = parse_line("111*stopped,reason=\"breakpoint-hit\"\n");
        match out.record {
            OutputRecord::Oob(OobRecord::Async(rec)) => {
                assert_eq!(rec.token.as_deref(), Some("111"));
                assert_eq!(rec.kind, AsyncKind::Exec);
                assert_eq!(rec.class, AsyncClass::Stopped);
                assert_eq!(rec.results.len(), 1);
                assert_eq!(rec.results[0].variable.as_deref(), Some("reason"));
                assert_eq!(rec.results[0].as_cstring(), Some("breakpoint-hit"));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn result_record_with_fields() {
        let out = parse_line(
            "^done,line=\"33\",file=\"test.cpp\",fullname=\"/home/foo/test.cpp\",macro-info=\"0\"\n",
        );
        match out.record {
            OutputRecord::Result(rec) => {
                assert_eq!(rec.class, ResultClass::Done);
                assert_eq!(rec.results.len(), 4);
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn prompt() {
        let out = parse_line("(gdb)\n");
        assert_eq!(out.record, OutputRecord::Prompt);
    }

    #[test]
    fn prompt_rejects_other_identifiers() {
        let out = parse_line("(lldb)\n");
        match out.record {
            OutputRecord::ParseError(err) => assert_eq!(err.token, "lldb"),
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn unrecognized_leading_byte_is_a_parse_error() {
        let out = parse_line("$error\n");
        match out.record {
            OutputRecord::ParseError(err) => {
                assert_eq!(err.token, "$");
                assert_eq!(err.pos, Position::single(1));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn empty_line_is_a_parse_error_with_newline_token() {
        let out = parse_line("\n");
        match out.record {
            OutputRecord::ParseError(err) => assert_eq!(err.token, "\n"),
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn missing_comma_in_list_is_a_parse_error_at_the_stray_token() {
        let out = parse_line("*stopped,[key=\"value\", key2= \" \"value2\"]\n");
        match out.record {
            OutputRecord::ParseError(err) => {
                assert_eq!(err.token, "value2");
                assert_eq!(err.pos, Position::new(33, 38));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn list_tolerates_unlabelled_and_labelled_siblings() {
        let out = parse_line("=notify,list=[\"a\",key=\"b\"]\n");
        match out.record {
            OutputRecord::Oob(OobRecord::Async(rec)) => {
                let list = rec.results[0].children().unwrap();
                assert_eq!(list[0].variable, None);
                assert_eq!(list[1].variable.as_deref(), Some("key"));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn nested_tuple_in_list() {
        let out = parse_line("^done,body=[{number=\"1\"},{number=\"1.1\"}]\n");
        match out.record {
            OutputRecord::Result(rec) => {
                let body = rec.results[0].children().unwrap();
                assert_eq!(body.len(), 2);
                assert_eq!(body[0].find("number").unwrap().as_cstring(), Some("1"));
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }
}
