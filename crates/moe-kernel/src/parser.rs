//! Parser for the canonical expression text form.
//!
//! ```text
//! expression := term ( ( '|' | '>' ) term )*
//! term       := atom [ '(' [ option ( ',' option )* ] ')' ]
//! option     := atom '=' atom
//! atom       := bare | '"' escaped '"'
//! ```
//!
//! Whitespace between tokens is ignored.

use crate::error::ExpressionError;
use crate::expression::Expression;
use crate::operation::{Operation, Operator};
use crate::term::{Options, Term, is_bare_char};

/// Parse a rendered expression.
pub fn parse(input: &str) -> Result<Expression, ExpressionError> {
    let mut cursor = Cursor::new(input);
    let root = cursor.term()?;
    let mut expression = Expression::repository_term(root);

    loop {
        cursor.skip_whitespace();
        let Some(c) = cursor.peek() else {
            break;
        };
        let Some(operator) = Operator::from_delimiter(c) else {
            return Err(cursor.error(format!("expected '|' or '>', found {c:?}")));
        };
        cursor.bump();
        let position = cursor.pos;
        let term = cursor.term()?;
        let operation = Operation::new(operator, term).map_err(|err| {
            ExpressionError::parse(input, position, err.to_string())
        })?;
        expression = Expression::chain(expression, operation)?;
    }

    Ok(expression)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ExpressionError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> ExpressionError {
        ExpressionError::parse(self.input, self.pos, message)
    }

    fn term(&mut self) -> Result<Term, ExpressionError> {
        let identifier = self.atom()?;
        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Ok(Term::new(identifier));
        }
        self.bump();

        let mut options = Options::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Term::with_options(identifier, options));
        }

        loop {
            let key_pos = self.pos;
            let key = self.atom()?;
            self.expect('=')?;
            let value = self.atom()?;
            if options.insert(key.clone(), value).is_some() {
                return Err(ExpressionError::parse(
                    self.input,
                    key_pos,
                    format!("duplicate option {key:?}"),
                ));
            }

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(')') => break,
                Some(c) => return Err(self.error(format!("expected ',' or ')', found {c:?}"))),
                None => return Err(self.error("unterminated option list")),
            }
        }

        Ok(Term::with_options(identifier, options))
    }

    fn atom(&mut self) -> Result<String, ExpressionError> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') => self.quoted(),
            Some(c) if is_bare_char(c) => {
                let start = self.pos;
                while self.peek().is_some_and(is_bare_char) {
                    self.bump();
                }
                Ok(self.input[start..self.pos].to_string())
            }
            Some(c) => Err(self.error(format!("expected identifier, found {c:?}"))),
            None => Err(self.error("expected identifier, found end of input")),
        }
    }

    fn quoted(&mut self) -> Result<String, ExpressionError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => return Err(self.error(format!("invalid escape \\{c}"))),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(ExpressionError::parse(
            self.input,
            start,
            "unterminated quoted string",
        ))
    }
}
