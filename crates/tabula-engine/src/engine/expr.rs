//! Closed-grammar evaluator for substituted formula expressions.
//!
//! After cell references have been replaced by their values, the remaining
//! text is evaluated here. The grammar is deliberately small:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | STRING | '(' expr ')'
//! ```
//!
//! `+` concatenates when either side is text. The other operators accept text
//! only if it reads as a number. There are no identifiers, calls or
//! assignments, so formula text can never reach anything but arithmetic.

use thiserror::Error;

use super::value::{Value, format_number, parse_number};

const MAX_DEPTH: usize = 128;

/// Why an expression could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character {0:?} at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("malformed number {0:?}")]
    BadNumber(String),

    #[error("text {0:?} used as a number")]
    NotANumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("expression nested too deeply")]
    TooDeep,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Num(f64),
    Str(String),
}

impl Operand {
    fn to_number(&self) -> Result<f64, ExprError> {
        match self {
            Operand::Num(n) => Ok(*n),
            Operand::Str(s) => parse_number(s).ok_or_else(|| ExprError::NotANumber(s.clone())),
        }
    }

    fn into_text(self) -> String {
        match self {
            Operand::Num(n) => format_number(n),
            Operand::Str(s) => s,
        }
    }
}

/// Evaluate an expression to a number or text value.
pub fn eval_expression(text: &str) -> Result<Value, ExprError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let result = parser.expr(0)?;
    if parser.pos < parser.tokens.len() {
        return Err(ExprError::UnexpectedToken(parser.pos));
    }
    match result {
        Operand::Num(n) if !n.is_finite() => Err(ExprError::NonFinite),
        Operand::Num(n) => Ok(Value::Number(n)),
        Operand::Str(s) => Ok(Value::Text(s)),
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(i, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                chars.next();
                tokens.push(match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => s.push(escaped),
                            None => break,
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        other => s.push(other),
                    }
                }
                if !closed {
                    return Err(ExprError::UnterminatedString);
                }
                tokens.push(Token::Text(s));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = i;
                let mut prev = '\0';
                while let Some(&(j, c)) = chars.peek() {
                    let exponent_sign = (c == '+' || c == '-') && (prev == 'e' || prev == 'E');
                    if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                        end = j + c.len_utf8();
                        prev = c;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &text[i..end];
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::BadNumber(literal.to_string()))?;
                tokens.push(Token::Number(n));
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self, depth: usize) -> Result<Operand, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        let mut lhs = self.term(depth)?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Plus => {
                    self.pos += 1;
                    let rhs = self.term(depth)?;
                    lhs = match (lhs, rhs) {
                        (Operand::Num(a), Operand::Num(b)) => Operand::Num(a + b),
                        (a, b) => Operand::Str(a.into_text() + &b.into_text()),
                    };
                }
                Token::Minus => {
                    self.pos += 1;
                    let rhs = self.term(depth)?;
                    lhs = Operand::Num(lhs.to_number()? - rhs.to_number()?);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn term(&mut self, depth: usize) -> Result<Operand, ExprError> {
        let mut lhs = self.unary(depth)?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Star => {
                    self.pos += 1;
                    let rhs = self.unary(depth)?;
                    lhs = Operand::Num(lhs.to_number()? * rhs.to_number()?);
                }
                Token::Slash => {
                    self.pos += 1;
                    let rhs = self.unary(depth)?.to_number()?;
                    if rhs == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    lhs = Operand::Num(lhs.to_number()? / rhs);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn unary(&mut self, depth: usize) -> Result<Operand, ExprError> {
        if depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Operand::Num(-self.unary(depth + 1)?.to_number()?))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                Ok(Operand::Num(self.unary(depth + 1)?.to_number()?))
            }
            _ => self.primary(depth),
        }
    }

    fn primary(&mut self, depth: usize) -> Result<Operand, ExprError> {
        let at = self.pos;
        match self.next() {
            Some(Token::Number(n)) => Ok(Operand::Num(n)),
            Some(Token::Text(s)) => Ok(Operand::Str(s)),
            Some(Token::LParen) => {
                let inner = self.expr(depth + 1)?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(_) => Err(ExprError::UnexpectedToken(self.pos - 1)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(_) => Err(ExprError::UnexpectedToken(at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
