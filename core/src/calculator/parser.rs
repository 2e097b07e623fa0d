//! Expression parser for calculator input.
//!
//! Supports:
//! - Numbers (integers and floats, with optional exponent)
//! - Arithmetic operators (+, -, *, /, %, **)
//! - Unary prefix operators (-, +)
//! - Parentheses for grouping
//! - Calls to allow-listed functions (sqrt, log, log10, sin, cos, tan, ceil, floor, abs, round)
//!
//! Anything else, including bare names, attribute access, string literals and
//! operators such as `^` or `//`, is rejected here and never reaches the
//! evaluator.

use super::tables::{lookup_function, BinaryOperator, UnaryOperator};
use thiserror::Error;

/// Maximum height of a parsed tree, and maximum nesting of parentheses and
/// prefix operators.
pub const MAX_DEPTH: usize = 256;

/// Parse error with location info
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary prefix operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Function call
    Call { name: String, args: Vec<Expr> },
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Identifier(name) => format!("name '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::StarStar => "'**'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Tokenizer
struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Returns the next token together with the position it starts at.
    fn next_token(&mut self) -> Result<(Token, usize), ParseError> {
        self.skip_whitespace();

        let pos = self.position;
        let Some(c) = self.peek() else {
            return Ok((Token::Eof, pos));
        };

        let token = match c {
            '+' => {
                self.advance();
                Token::Plus
            }
            '-' => {
                self.advance();
                Token::Minus
            }
            '*' => {
                self.advance();
                if self.peek() == Some('*') {
                    self.advance();
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '/' => {
                if self.peek_at(1) == Some('/') {
                    return Err(self.disallowed_operator("//", pos));
                }
                self.advance();
                Token::Slash
            }
            '%' => {
                self.advance();
                Token::Percent
            }
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '.' if !matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                return Err(ParseError::new(
                    "attribute access is not allowed",
                    pos,
                ));
            }
            c if c.is_ascii_digit() || c == '.' => self.read_number()?,
            c if c.is_alphabetic() || c == '_' => Token::Identifier(self.read_identifier()),
            '^' | '&' | '|' | '~' | '@' => return Err(self.disallowed_operator(&c.to_string(), pos)),
            '<' | '>' | '=' | '!' => {
                let mut op = c.to_string();
                if let Some(next) = self.peek_at(1).filter(|n| matches!(*n, '<' | '>' | '=')) {
                    op.push(next);
                }
                return Err(self.disallowed_operator(&op, pos));
            }
            '"' | '\'' => {
                return Err(ParseError::new("string literals are not allowed", pos));
            }
            _ => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", c),
                    pos,
                ));
            }
        };

        Ok((token, pos))
    }

    fn disallowed_operator(&self, op: &str, pos: usize) -> ParseError {
        ParseError::new(format!("operator '{}' is not allowed", op), pos)
    }

    fn read_number(&mut self) -> Result<Token, ParseError> {
        let pos = self.position;
        let mut num_str = String::new();

        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            num_str.push(c);
            self.advance();
        }
        if self.peek() == Some('.') {
            num_str.push('.');
            self.advance();
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                num_str.push(c);
                self.advance();
            }
        }

        // Exponent only when digits follow: "1e3", "1.5E-3"
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if matches!(self.peek_at(digit_at), Some(d) if d.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.advance() {
                        num_str.push(c);
                    }
                }
                while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                    num_str.push(c);
                    self.advance();
                }
            }
        }

        if matches!(self.peek(), Some('j' | 'J')) {
            return Err(ParseError::new("complex numbers are not allowed", pos));
        }
        if self.peek() == Some('.') {
            return Err(ParseError::new(
                format!("invalid number '{}.'", num_str),
                pos,
            ));
        }

        match num_str.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            Ok(_) => Err(ParseError::new(
                format!("number '{}' is out of range", num_str),
                pos,
            )),
            Err(_) => Err(ParseError::new(
                format!("invalid number '{}'", num_str),
                pos,
            )),
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            name.push(c);
            self.advance();
        }
        name
    }
}

/// Parser for expressions
///
/// Every `parse_*` method returns the subtree together with its height, so the
/// flat `+ - * / %` loops are bounded by [`MAX_DEPTH`] the same way nesting is.
struct Parser {
    lexer: Lexer,
    current: Token,
    current_pos: usize,
    nesting: usize,
}

/// A parsed subtree and its height (a lone number has height 1).
type Subtree = (Expr, usize);

impl Parser {
    fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let (current, current_pos) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            current_pos,
            nesting: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, pos) = self.lexer.next_token()?;
        self.current = token;
        self.current_pos = pos;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_pos)
    }

    fn too_deep(&self) -> ParseError {
        self.error("expression nested too deeply")
    }

    /// Height of a new node over children of height `child`.
    fn node_height(&self, child: usize) -> Result<usize, ParseError> {
        let height = child + 1;
        if height > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(height)
    }

    fn binary(
        &self,
        op: BinaryOperator,
        left: Subtree,
        right: Subtree,
    ) -> Result<Subtree, ParseError> {
        let height = self.node_height(left.1.max(right.1))?;
        let expr = Expr::BinaryOp {
            op,
            left: Box::new(left.0),
            right: Box::new(right.0),
        };
        Ok((expr, height))
    }

    fn expect_rparen(&mut self, context: &str) -> Result<(), ParseError> {
        if self.current != Token::RParen {
            return Err(self.error(format!(
                "expected ')' {}, found {}",
                context,
                self.current.describe()
            )));
        }
        self.advance()
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let (expr, _) = self.parse_additive()?;
        if self.current != Token::Eof {
            return Err(self.error(format!(
                "unexpected {} after expression",
                self.current.describe()
            )));
        }
        Ok(expr)
    }

    // Additive: term (('+' | '-') term)*
    fn parse_additive(&mut self) -> Result<Subtree, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right)?;
        }

        Ok(left)
    }

    // Multiplicative: unary (('*' | '/' | '%') unary)*
    fn parse_multiplicative(&mut self) -> Result<Subtree, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                Token::Percent => BinaryOperator::Mod,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary()?;
            left = self.binary(op, left, right)?;
        }

        Ok(left)
    }

    // Parentheses add no height to the tree, so parser recursion is bounded here too.
    fn parse_unary(&mut self) -> Result<Subtree, ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(self.too_deep());
        }
        let result = self.parse_unary_inner();
        self.nesting -= 1;
        result
    }

    // Unary: ('-' | '+') unary | power
    fn parse_unary_inner(&mut self) -> Result<Subtree, ParseError> {
        let op = match self.current {
            Token::Minus => UnaryOperator::Neg,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_power(),
        };
        self.advance()?;
        let (operand, height) = self.parse_unary()?;
        let height = self.node_height(height)?;
        let expr = Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        };
        Ok((expr, height))
    }

    // Power: primary ('**' unary)?  (right associative, binds tighter than a
    // prefix operator on its left: -2**2 == -(2**2))
    fn parse_power(&mut self) -> Result<Subtree, ParseError> {
        let base = self.parse_primary()?;

        if self.current == Token::StarStar {
            self.advance()?;
            let exp = self.parse_unary()?;
            self.binary(BinaryOperator::Pow, base, exp)
        } else {
            Ok(base)
        }
    }

    // Primary: number | function_call | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Subtree, ParseError> {
        match &self.current {
            Token::Number(n) => {
                let val = *n;
                self.advance()?;
                Ok((Expr::Number(val), 1))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                let name_pos = self.current_pos;
                self.advance()?;

                if self.current != Token::LParen {
                    return Err(ParseError::new(
                        format!("name '{}' is not allowed", name),
                        name_pos,
                    ));
                }
                if lookup_function(&name).is_none() {
                    return Err(ParseError::new(
                        format!("function '{}' is not allowed", name),
                        name_pos,
                    ));
                }
                self.advance()?; // consume '('
                let (args, height) = self.parse_arguments()?;
                let height = self.node_height(height)?;
                Ok((Expr::Call { name, args }, height))
            }
            Token::LParen => {
                self.advance()?;
                let group = self.parse_additive()?;
                self.expect_rparen("to close group")?;
                Ok(group)
            }
            other => Err(self.error(format!("unexpected {}", other.describe()))),
        }
    }

    // Arguments: (additive (',' additive)* ','?)? ')'
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, usize), ParseError> {
        let mut args = Vec::new();
        let mut height = 0;
        while self.current != Token::RParen {
            let (arg, arg_height) = self.parse_additive()?;
            args.push(arg);
            height = height.max(arg_height);
            if self.current == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect_rparen("after function arguments")?;
        Ok((args, height))
    }
}

/// Parse an expression string into an AST.
///
/// The input is taken as-is: `%` here is the modulo operator. Use
/// [`super::evaluate`] for calculator input, which rewrites `%` first.
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new("empty expression", 0));
    }
    let mut parser = Parser::new(input)?;
    parser.parse()
}
