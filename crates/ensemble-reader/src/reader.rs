use std::rc::Rc;

use ensemble_core::{EnsembleError, MapEntries, MapKey, Span, Value};

use crate::lexer::{tokenize, SpannedToken, Token};

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    /// Position just past the last token, used for end-of-input errors.
    eof: Span,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, eof: Span) -> Self {
        Parser {
            tokens,
            pos: 0,
            eof,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn span(&self) -> Span {
        self.tokens.get(self.pos).map(|t| t.span).unwrap_or(self.eof)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_expr(&mut self) -> Result<Value, EnsembleError> {
        let span = self.span();
        let Some(token) = self.peek().cloned() else {
            return Err(EnsembleError::unbalanced("unexpected end of input", span));
        };
        match token {
            Token::LParen => self
                .parse_seq(Token::RParen, ')')
                .map(Value::list),
            Token::LBracket => self
                .parse_seq(Token::RBracket, ']')
                .map(Value::vector),
            Token::LBrace => self.parse_map(),
            Token::RParen | Token::RBracket | Token::RBrace => Err(EnsembleError::syntax(
                format!("unexpected '{}'", closer_char(&token)),
                span,
            )),
            Token::Quote => self.parse_wrapped("quote"),
            Token::Quasiquote => self.parse_wrapped("quasiquote"),
            Token::Unquote => self.parse_wrapped("unquote"),
            Token::SpliceUnquote => self.parse_wrapped("splice-unquote"),
            Token::Deref => self.parse_wrapped("deref"),
            Token::Meta => {
                self.advance();
                let meta = self.parse_expr()?;
                let form = self.parse_expr()?;
                Ok(Value::list(vec![Value::symbol("with-meta"), form, meta]))
            }
            _ => self.parse_atom(),
        }
    }

    /// `'x` and friends: `(name x)`.
    fn parse_wrapped(&mut self, name: &str) -> Result<Value, EnsembleError> {
        self.advance();
        let inner = self.parse_expr()?;
        Ok(Value::list(vec![Value::symbol(name), inner]))
    }

    fn parse_seq(&mut self, close: Token, close_ch: char) -> Result<Vec<Value>, EnsembleError> {
        let open_span = self.span();
        self.advance();
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(EnsembleError::unbalanced(
                        format!("expected '{close_ch}', got end of input"),
                        open_span,
                    ))
                }
                Some(t) if *t == close => {
                    self.advance();
                    return Ok(items);
                }
                Some(t @ (Token::RParen | Token::RBracket | Token::RBrace)) => {
                    return Err(EnsembleError::syntax(
                        format!("expected '{close_ch}', got '{}'", closer_char(t)),
                        self.span(),
                    ))
                }
                Some(_) => items.push(self.parse_expr()?),
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value, EnsembleError> {
        let open_span = self.span();
        let items = self.parse_seq(Token::RBrace, '}')?;
        if items.len() % 2 != 0 {
            return Err(EnsembleError::syntax(
                "map literal must have an even number of forms",
                open_span,
            ));
        }
        let mut entries = MapEntries::new();
        for pair in items.chunks(2) {
            let key = MapKey::from_value(&pair[0]).map_err(|_| {
                EnsembleError::syntax(
                    format!("invalid map key of type {}", pair[0].type_name()),
                    open_span,
                )
            })?;
            entries.insert(key, pair[1].clone());
        }
        Ok(Value::map(entries))
    }

    fn parse_atom(&mut self) -> Result<Value, EnsembleError> {
        let span = self.span();
        match self.advance().map(|t| &t.token) {
            Some(Token::Number(n)) => Ok(Value::Number(*n)),
            Some(Token::String(s)) => Ok(Value::String(Rc::from(s.as_str()))),
            Some(Token::Symbol(s)) => Ok(Value::symbol(s)),
            Some(Token::Keyword(k)) => Ok(Value::keyword(k)),
            Some(Token::Bool(b)) => Ok(Value::Bool(*b)),
            Some(Token::Nil) => Ok(Value::Nil),
            Some(t) => Err(EnsembleError::syntax(
                format!("unexpected token: {t:?}"),
                span,
            )),
            None => Err(EnsembleError::unbalanced("unexpected end of input", span)),
        }
    }
}

fn closer_char(token: &Token) -> char {
    match token {
        Token::RParen => ')',
        Token::RBracket => ']',
        _ => '}',
    }
}

fn end_span(input: &str) -> Span {
    let line = input.matches('\n').count() + 1;
    let col = input.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    Span::new(line, col)
}

/// Read a single form. Empty input (or only comments) reads as nil.
pub fn read(input: &str) -> Result<Value, EnsembleError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(Value::Nil);
    }
    let mut parser = Parser::new(tokens, end_span(input));
    parser.parse_expr()
}

/// Read every top-level form in order.
pub fn read_many(input: &str) -> Result<Vec<Value>, EnsembleError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens, end_span(input));
    let mut exprs = Vec::new();
    while parser.peek().is_some() {
        exprs.push(parser.parse_expr()?);
    }
    Ok(exprs)
}
