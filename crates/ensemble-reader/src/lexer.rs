use ensemble_core::{EnsembleError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Quote,
    Quasiquote,
    Unquote,
    SpliceUnquote,
    Deref,
    Meta,
    Number(f64),
    String(String),
    Symbol(String),
    Keyword(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, EnsembleError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    while i < chars.len() {
        let ch = chars[i];
        let span = Span::new(line, col);

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '\'' => Some(Token::Quote),
            '`' => Some(Token::Quasiquote),
            '@' => Some(Token::Deref),
            '^' => Some(Token::Meta),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(SpannedToken { token, span });
            i += 1;
            col += 1;
            continue;
        }

        match ch {
            // Commas are whitespace
            ' ' | '\t' | '\r' | ',' => {
                i += 1;
                col += 1;
            }
            '\n' => {
                i += 1;
                line += 1;
                col = 1;
            }

            ';' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }

            '~' => {
                if chars.get(i + 1) == Some(&'@') {
                    tokens.push(SpannedToken {
                        token: Token::SpliceUnquote,
                        span,
                    });
                    i += 2;
                    col += 2;
                } else {
                    tokens.push(SpannedToken {
                        token: Token::Unquote,
                        span,
                    });
                    i += 1;
                    col += 1;
                }
            }

            '"' => {
                let mut s = String::new();
                i += 1;
                col += 1;
                loop {
                    let Some(&c) = chars.get(i) else {
                        return Err(EnsembleError::unbalanced(
                            "expected '\"', got end of input",
                            span,
                        ));
                    };
                    match c {
                        '"' => break,
                        '\\' => {
                            let Some(&escaped) = chars.get(i + 1) else {
                                return Err(EnsembleError::unbalanced(
                                    "expected '\"', got end of input",
                                    span,
                                ));
                            };
                            s.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                other => other,
                            });
                            if escaped == '\n' {
                                line += 1;
                                col = 0;
                            }
                            i += 2;
                            col += 2;
                        }
                        '\n' => {
                            s.push(c);
                            i += 1;
                            line += 1;
                            col = 1;
                        }
                        _ => {
                            s.push(c);
                            i += 1;
                            col += 1;
                        }
                    }
                }
                // closing quote
                i += 1;
                col += 1;
                tokens.push(SpannedToken {
                    token: Token::String(s),
                    span,
                });
            }

            _ => {
                let start = i;
                while i < chars.len() && is_atom_char(chars[i]) {
                    i += 1;
                    col += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(SpannedToken {
                    token: classify_atom(text, span)?,
                    span,
                });
            }
        }
    }

    Ok(tokens)
}

/// Bare atoms run until whitespace, a comma, a delimiter, a quote character or `;`.
fn is_atom_char(ch: char) -> bool {
    !ch.is_whitespace()
        && !matches!(
            ch,
            ',' | ';' | '(' | ')' | '[' | ']' | '{' | '}' | '\'' | '"' | '`'
        )
}

fn classify_atom(text: String, span: Span) -> Result<Token, EnsembleError> {
    match text.as_str() {
        "nil" => return Ok(Token::Nil),
        "true" => return Ok(Token::Bool(true)),
        "false" => return Ok(Token::Bool(false)),
        _ => {}
    }
    if is_number(&text) {
        // Literals past f64 range would print as `inf` and read back as a symbol
        return match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => Err(EnsembleError::syntax(
                format!("number literal out of range: {text}"),
                span,
            )),
        };
    }
    Ok(match text.strip_prefix(':') {
        Some(name) if !name.is_empty() => Token::Keyword(name.to_string()),
        _ => Token::Symbol(text),
    })
}

/// `-?\d+(\.\d+)?`
fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.is_none_or(all_digits)
}
