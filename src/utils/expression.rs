//! Restricted arithmetic evaluator for user-entered actual values
//!
//! Accepts decimal numbers, `+ - * /`, unary signs and parentheses.
//! Nothing else is interpreted.

use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

use crate::types::ExpressionError;

const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression such as `100+50` or `(12.5 * 4) - 3`
pub fn evaluate(input: &str) -> Result<BigDecimal, ExpressionError> {
    let mut parser = ExpressionParser::new(input);
    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Err(ExpressionError::Empty);
    }

    let value = parser.expression(0)?;

    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(ExpressionError::TrailingInput {
            position: parser.pos,
        });
    }

    Ok(value)
}

struct ExpressionParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExpressionParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self, depth: usize) -> Result<BigDecimal, ExpressionError> {
        let mut value = self.term(depth)?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term(depth)?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term(depth)?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self, depth: usize) -> Result<BigDecimal, ExpressionError> {
        let mut value = self.factor(depth)?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    let rhs = self.factor(depth)?;
                    value = value * rhs;
                }
                Some('/') => {
                    self.pos += 1;
                    let rhs = self.factor(depth)?;
                    if rhs.is_zero() {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    value = value / rhs;
                }
                _ => return Ok(value),
            }
        }
    }

    // factor := ('+' | '-') factor | number | '(' expression ')'
    fn factor(&mut self, depth: usize) -> Result<BigDecimal, ExpressionError> {
        if depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }

        self.skip_whitespace();
        match self.peek() {
            None => Err(ExpressionError::UnexpectedEnd),
            Some('+') => {
                self.pos += 1;
                self.factor(depth + 1)
            }
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor(depth + 1)?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expression(depth + 1)?;
                self.skip_whitespace();
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(found) => Err(ExpressionError::UnexpectedChar {
                        found,
                        position: self.pos,
                    }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(found) => Err(ExpressionError::UnexpectedChar {
                found,
                position: self.pos,
            }),
        }
    }

    fn number(&mut self) -> Result<BigDecimal, ExpressionError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        BigDecimal::from_str(&literal).map_err(|_| ExpressionError::InvalidNumber(literal))
    }
}
