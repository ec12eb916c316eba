//! Line-scoped tokenizer. Turns one logical line (terminator included) into
//! a sequence of [`Token`]s with 1-based column positions, resetting to
//! column 1 at the start of every line (spec §4.2).

use crate::value::Position;

/// A lexical token kind. CString lexemes carry their surrounding quotes;
/// the lexer does not interpret escape sequences — that's the grammar's
/// job once it knows which field the payload is going into (spec §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Equals,
    Newline,
    Integer,
    Identifier,
    CString,
    Caret,
    Star,
    Plus,
    Tilde,
    At,
    Ampersand,
    OpenParen,
    CloseParen,
}

/// A single token: its kind, the exact source bytes it spans, and its
/// column position within the line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub pos: Position,
}

/// The line could not be fully tokenized — most commonly an unterminated
/// quoted string. Carries the lexeme and position of the offending byte,
/// for the grammar to turn into a [`crate::ParseError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError<'a> {
    pub lexeme: &'a str,
    pub pos: Position,
}

/// Tokenizes one line. The line must end in `\n` (the caller, `MiParser`,
/// always hands over lines with their terminator attached); any of
/// `\n`, `\r\n`, or a lone `\r` is accepted and produces one `Newline`
/// token.
pub fn tokenize(line: &str) -> Result<Vec<Token<'_>>, LexError<'_>> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut column = 1u32;

    while i < bytes.len() {
        let start_column = column;
        match bytes[i] {
            b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        lexeme: &line[i..i + 2],
                        pos: Position::new(start_column, start_column + 1),
                    });
                    i += 2;
                    column += 2;
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        lexeme: &line[i..i + 1],
                        pos: Position::single(start_column),
                    });
                    i += 1;
                    column += 1;
                }
            }
            b'\n' => {
                tokens.push(Token {
                    kind: TokenKind::Newline,
                    lexeme: &line[i..i + 1],
                    pos: Position::single(start_column),
                });
                i += 1;
                column += 1;
            }
            b'{' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::OpenBrace);
            }
            b'}' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::CloseBrace);
            }
            b'[' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::OpenBracket);
            }
            b']' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::CloseBracket);
            }
            b',' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Comma);
            }
            b'=' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Equals);
            }
            b'^' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Caret);
            }
            b'*' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Star);
            }
            b'+' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Plus);
            }
            b'~' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Tilde);
            }
            b'@' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::At);
            }
            b'&' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::Ampersand);
            }
            b'(' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::OpenParen);
            }
            b')' => {
                push_single(&mut tokens, line, &mut i, &mut column, TokenKind::CloseParen);
            }
            b'"' => {
                let (len, columns) = scan_cstring(&bytes[i..]).ok_or_else(|| LexError {
                    lexeme: &line[i..],
                    pos: Position::single(start_column),
                })?;
                tokens.push(Token {
                    kind: TokenKind::CString,
                    lexeme: &line[i..i + len],
                    pos: Position::new(start_column, start_column + columns - 1),
                });
                i += len;
                column += columns;
            }
            b'0'..=b'9' => {
                let len = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
                tokens.push(Token {
                    kind: TokenKind::Integer,
                    lexeme: &line[i..i + len],
                    pos: Position::new(start_column, start_column + len as u32 - 1),
                });
                i += len;
                column += len as u32;
            }
            b' ' | b'\t' => {
                i += 1;
                column += 1;
            }
            b if is_ident_start(b) => {
                let len = 1 + bytes[i + 1..]
                    .iter()
                    .take_while(|&&b| is_ident_continue(b))
                    .count();
                tokens.push(Token {
                    kind: TokenKind::Identifier,
                    lexeme: &line[i..i + len],
                    pos: Position::new(start_column, start_column + len as u32 - 1),
                });
                i += len;
                column += len as u32;
            }
            _ => {
                return Err(LexError {
                    lexeme: &line[i..i + 1],
                    pos: Position::single(start_column),
                });
            }
        }
    }

    Ok(tokens)
}

fn push_single(
    tokens: &mut Vec<Token<'_>>,
    line: &str,
    i: &mut usize,
    column: &mut u32,
    kind: TokenKind,
) {
    tokens.push(Token { kind, lexeme: &line[*i..*i + 1], pos: Position::single(*column) });
    *i += 1;
    *column += 1;
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Scans a quoted CString lexeme starting at `bytes[0] == b'"'`. Returns the
/// byte length and column width of the lexeme (escaped bytes count once
/// towards column width, matching how a single backslash-letter escape
/// occupies the columns of both source characters on the wire). Returns
/// `None` if the closing quote is never found before a newline or the end
/// of the line.
fn scan_cstring(bytes: &[u8]) -> Option<(usize, u32)> {
    let mut i = 1usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Some((i + 1, (i + 1) as u32)),
            b'\\' if i + 1 < bytes.len() && bytes[i + 1] != b'\n' => {
                i += 2;
            }
            b'\n' => return None,
            _ => {
                i += 1;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn stream_record_tokens() {
        assert_eq!(
            kinds("~\"hello\"\n"),
            vec![TokenKind::Tilde, TokenKind::CString, TokenKind::Newline]
        );
    }

    #[test]
    fn async_record_with_token_and_results() {
        let toks = tokenize("111*stopped,reason=\"breakpoint-hit\"\n").unwrap();
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::CString,
                TokenKind::Newline,
            ]
        );
        assert_eq!(toks[0].lexeme, "111");
        assert_eq!(toks[6].lexeme, "\"breakpoint-hit\"");
    }

    #[test]
    fn prompt_tokens() {
        assert_eq!(
            kinds("(gdb)\n"),
            vec![
                TokenKind::OpenParen,
                TokenKind::Identifier,
                TokenKind::CloseParen,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn crlf_is_one_newline_token() {
        let toks = tokenize("(gdb)\r\n").unwrap();
        assert_eq!(toks.last().unwrap().kind, TokenKind::Newline);
        assert_eq!(toks.last().unwrap().lexeme, "\r\n");
    }

    #[test]
    fn identifier_allows_hyphen_after_first_char() {
        let toks = tokenize("thread-id\n").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[0].lexeme, "thread-id");
    }

    #[test]
    fn cstring_with_escaped_quote_is_not_a_terminator() {
        let toks = tokenize("~\"a\\\"b\"\n").unwrap();
        assert_eq!(toks[1].lexeme, "\"a\\\"b\"");
    }

    #[test]
    fn unterminated_cstring_is_a_lex_error() {
        assert!(tokenize("~\"unterminated\n").is_err());
    }

    #[test]
    fn column_positions_reset_at_line_start() {
        let toks = tokenize("^done\n").unwrap();
        assert_eq!(toks[0].pos, Position::single(1));
        assert_eq!(toks[1].pos, Position::new(2, 5));
    }

    #[test]
    fn whitespace_between_tokens_is_skipped() {
        let toks = tokenize("*stopped, reason=\"x\"\n").unwrap();
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::CString,
                TokenKind::Newline,
            ]
        );
        // column 11 is the `r` of `reason`, not the space before it.
        assert_eq!(toks[3].pos, Position::single(11));
    }

    #[test]
    fn unrecognized_byte_is_a_lex_error_at_the_error_column() {
        let err = tokenize("$error\n").unwrap_err();
        assert_eq!(err.lexeme, "$");
        assert_eq!(err.pos, Position::single(1));
    }
}
