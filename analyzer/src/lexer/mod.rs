use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::span::Span;

mod token;

pub use token::{Lit, LitKind, Symbol, Token, TokenIdx, TokenKind};

pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lex the input into tokens.
///
/// - Spaces and tabs are dropped; newlines are kept as trivia tokens (the parser's layout
///   rules need them).
/// - Numbers: ASCII digits with an optional fraction part (`1`, `3.14`). A dot is only part
///   of the number when a digit follows, so `Json.map` stays `Ident Dot Ident`.
/// - Strings: double-quoted, `\` escapes the next character.
/// - Comments: `--` to end of line, `{- -}` nested blocks.
/// - Unknown characters produce a diagnostic and are skipped; lexing never fails.
pub fn lex(input: &str) -> LexOutput {
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    let mut iter = input.char_indices().peekable();

    while let Some((start, ch)) = iter.next() {
        // Skip spaces/tabs but keep newlines as trivia tokens.
        if matches!(ch, ' ' | '\t' | '\r') {
            continue;
        }

        if ch == '\n' {
            tokens.push(Token {
                kind: TokenKind::Newline,
                span: Span::new(start as u32, (start + 1) as u32),
            });
            continue;
        }

        match ch {
            '.' => tokens.push(Token {
                kind: TokenKind::Dot,
                span: Span::new(start as u32, (start + 1) as u32),
            }),
            ',' => tokens.push(Token {
                kind: TokenKind::Comma,
                span: Span::new(start as u32, (start + 1) as u32),
            }),
            '\\' => tokens.push(Token {
                kind: TokenKind::Backslash,
                span: Span::new(start as u32, (start + 1) as u32),
            }),
            '(' => tokens.push(Token {
                kind: TokenKind::OpenParen,
                span: Span::new(start as u32, (start + 1) as u32),
            }),
            ')' => tokens.push(Token {
                kind: TokenKind::CloseParen,
                span: Span::new(start as u32, (start + 1) as u32),
            }),
            '[' => tokens.push(Token {
                kind: TokenKind::OpenBracket,
                span: Span::new(start as u32, (start + 1) as u32),
            }),
            ']' => tokens.push(Token {
                kind: TokenKind::CloseBracket,
                span: Span::new(start as u32, (start + 1) as u32),
            }),

            '{' => {
                if matches!(iter.peek(), Some((_, '-'))) {
                    // `{- -}` block comment, possibly nested.
                    iter.next();
                    let mut depth = 1usize;
                    let mut end = start + 2;
                    while let Some((i, c2)) = iter.next() {
                        end = i + c2.len_utf8();
                        if c2 == '{' && matches!(iter.peek(), Some((_, '-'))) {
                            iter.next();
                            end += 1;
                            depth += 1;
                        } else if c2 == '-' && matches!(iter.peek(), Some((_, '}'))) {
                            iter.next();
                            end += 1;
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                    }
                    if depth > 0 {
                        diagnostics.push(make_error(
                            Span::new(start as u32, input.len() as u32),
                            "unterminated block comment".to_string(),
                        ));
                    }
                    tokens.push(Token {
                        kind: TokenKind::BlockComment(Symbol {
                            text: String::from(&input[start..end]),
                        }),
                        span: Span::new(start as u32, end as u32),
                    });
                } else {
                    tokens.push(Token {
                        kind: TokenKind::OpenBrace,
                        span: Span::new(start as u32, (start + 1) as u32),
                    });
                }
            }
            '}' => tokens.push(Token {
                kind: TokenKind::CloseBrace,
                span: Span::new(start as u32, (start + 1) as u32),
            }),

            '"' => {
                // Read string until the next unescaped quote.
                let mut end: Option<usize> = None;
                while let Some((i, c)) = iter.next() {
                    if c == '\\' {
                        iter.next();
                        continue;
                    }
                    if c == '"' {
                        end = Some(i + 1);
                        break;
                    }
                }

                let end = match end {
                    Some(end) => end,
                    None => {
                        diagnostics.push(make_error(
                            Span::new(start as u32, input.len() as u32),
                            "unterminated string literal".to_string(),
                        ));
                        input.len()
                    }
                };

                tokens.push(Token {
                    kind: TokenKind::Literal(Lit {
                        kind: LitKind::String,
                        symbol: Symbol {
                            text: String::from(&input[start..end]),
                        },
                    }),
                    span: Span::new(start as u32, end as u32),
                });
            }

            c if c.is_ascii_digit() => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, c2)) = iter.peek() {
                    if c2.is_ascii_digit() {
                        iter.next();
                        end = i + c2.len_utf8();
                    } else {
                        break;
                    }
                }
                // Fraction part only when a digit follows the dot.
                if input[end..].starts_with('.')
                    && input[end + 1..].chars().next().is_some_and(|c2| c2.is_ascii_digit())
                {
                    iter.next(); // '.'
                    while let Some(&(i, c2)) = iter.peek() {
                        if c2.is_ascii_digit() {
                            iter.next();
                            end = i + c2.len_utf8();
                        } else {
                            break;
                        }
                    }
                }

                tokens.push(Token {
                    kind: TokenKind::Literal(Lit {
                        kind: LitKind::Number,
                        symbol: Symbol {
                            text: String::from(&input[start..end]),
                        },
                    }),
                    span: Span::new(start as u32, end as u32),
                });
            }

            c if is_ident_start(c) => {
                let mut end = start + c.len_utf8();
                let mut ident = String::new();
                ident.push(c);

                while let Some(&(i, c2)) = iter.peek() {
                    if is_ident_continue(c2) {
                        ident.push(c2);
                        iter.next();
                        end = i + c2.len_utf8();
                    } else {
                        break;
                    }
                }

                let kind = match ident.as_str() {
                    "case" => TokenKind::Case,
                    "of" => TokenKind::Of,
                    "let" => TokenKind::Let,
                    "in" => TokenKind::In,
                    "if" => TokenKind::If,
                    "then" => TokenKind::Then,
                    "else" => TokenKind::Else,
                    _ if c.is_uppercase() => TokenKind::UpperIdent(Symbol { text: ident }),
                    _ => TokenKind::LowerIdent(Symbol { text: ident }),
                };

                tokens.push(Token {
                    kind,
                    span: Span::new(start as u32, end as u32),
                });
            }

            c if is_op_char(c) => {
                if c == '-' && matches!(iter.peek(), Some((_, '-'))) {
                    // `--` line comment.
                    iter.next();
                    let mut end = start + 2;
                    while let Some(&(i, c2)) = iter.peek() {
                        if c2 == '\n' {
                            break;
                        }
                        iter.next();
                        end = i + c2.len_utf8();
                    }
                    tokens.push(Token {
                        kind: TokenKind::LineComment(Symbol {
                            text: String::from(&input[start + 2..end]),
                        }),
                        span: Span::new(start as u32, end as u32),
                    });
                    continue;
                }

                let mut end = start + c.len_utf8();
                let mut op = String::new();
                op.push(c);
                while let Some(&(i, c2)) = iter.peek() {
                    if is_op_char(c2) {
                        op.push(c2);
                        iter.next();
                        end = i + c2.len_utf8();
                    } else {
                        break;
                    }
                }

                let kind = match op.as_str() {
                    "=" => TokenKind::Eq,
                    "->" => TokenKind::Arrow,
                    ":" => TokenKind::Colon,
                    "|" => TokenKind::Pipe,
                    _ => TokenKind::Op(Symbol { text: op }),
                };

                tokens.push(Token {
                    kind,
                    span: Span::new(start as u32, end as u32),
                });
            }

            _ => {
                diagnostics.push(make_error(
                    Span::new(start as u32, (start + ch.len_utf8()) as u32),
                    format!("unexpected char '{}'", ch),
                ));
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(input.len() as u32, input.len() as u32),
    });

    LexOutput {
        tokens,
        diagnostics,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_op_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '<' | '>' | '=' | '&' | '|' | '^' | '%' | ':' | '!'
    )
}

fn make_error(span: Span, message: String) -> Diagnostic {
    Diagnostic {
        kind: DiagnosticKind::Error,
        message,
        span,
    }
}
