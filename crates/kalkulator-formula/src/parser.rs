//! Expression parser
//!
//! A recursive descent parser for normalized formula text with proper operator
//! precedence. Function calls are resolved against the [`FunctionRegistry`]
//! while parsing, so a call outside the whitelist fails before anything is
//! evaluated.

use std::fmt;

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{EvalError, EvalResult};
use crate::functions::FunctionRegistry;

/// Deepest nesting of parentheses, calls, prefix operators and `**`
pub const MAX_NESTING: usize = 64;

/// Most binary operators one expression may contain
pub const MAX_OPERATORS: usize = 512;

/// Parse normalized formula text into an AST
///
/// # Example
/// ```rust
/// use kalkulator_formula::{parse_expression, FunctionRegistry};
///
/// let registry = FunctionRegistry::new();
/// let ast = parse_expression("1 + 2", &registry).unwrap();
/// let ast = parse_expression("round(width * 1.23, 2)", &registry).unwrap();
/// assert!(parse_expression("system(1)", &registry).is_err());
/// ```
pub fn parse_expression(text: &str, registry: &FunctionRegistry) -> EvalResult<Expr> {
    let mut parser = ExpressionParser::new(text, registry)?;
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(parser.unexpected());
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    Boolean(bool),

    // Variable or function name
    Identifier(String),

    // Logical
    And,
    Or,
    Not,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,

    // Comparison
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Delimiters
    Comma,
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Number(n) => return write!(f, "{}", n),
            Token::Boolean(b) => return write!(f, "{}", b),
            Token::Identifier(name) => return f.write_str(name),
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Power => "**",
            Token::Equal => "==",
            Token::NotEqual => "!=",
            Token::Identical => "===",
            Token::NotIdentical => "!==",
            Token::LessThan => "<",
            Token::LessEqual => "<=",
            Token::GreaterThan => ">",
            Token::GreaterEqual => ">=",
            Token::Comma => ",",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Eof => "end of expression",
        };
        f.write_str(text)
    }
}

/// Expression parser
struct ExpressionParser<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
    current_token: Option<Token>,
    registry: &'a FunctionRegistry,
    depth: usize,
    operators: usize,
}

impl<'a> ExpressionParser<'a> {
    fn new(input: &'a str, registry: &'a FunctionRegistry) -> EvalResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            token_start: 0,
            current_token: None,
            registry,
            depth: 0,
            operators: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> EvalResult<()> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = Some(self.scan_token()?);
        Ok(())
    }

    fn scan_token(&mut self) -> EvalResult<Token> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        // Single-character tokens
        match c {
            '+' => {
                self.advance();
                return Ok(Token::Plus);
            }
            '-' => {
                self.advance();
                return Ok(Token::Minus);
            }
            '/' => {
                self.advance();
                return Ok(Token::Slash);
            }
            '%' => {
                self.advance();
                return Ok(Token::Percent);
            }
            ',' => {
                self.advance();
                return Ok(Token::Comma);
            }
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            _ => {}
        }

        // Multi-character operators
        if c == '*' {
            self.advance();
            if self.peek_char() == Some('*') {
                self.advance();
                return Ok(Token::Power);
            }
            return Ok(Token::Star);
        }

        if c == '<' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::LessEqual);
            }
            return Ok(Token::LessThan);
        }

        if c == '>' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::GreaterEqual);
            }
            return Ok(Token::GreaterThan);
        }

        if c == '=' && self.peek_char_at(1) == Some('=') {
            self.advance();
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::Identical);
            }
            return Ok(Token::Equal);
        }

        if c == '!' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::NotIdentical);
                }
                return Ok(Token::NotEqual);
            }
            return Ok(Token::Not);
        }

        if c == '&' && self.peek_char_at(1) == Some('&') {
            self.advance();
            self.advance();
            return Ok(Token::And);
        }

        if c == '|' && self.peek_char_at(1) == Some('|') {
            self.advance();
            self.advance();
            return Ok(Token::Or);
        }

        // Number
        if c.is_ascii_digit() || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Identifier or keyword
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_identifier());
        }

        Err(self.syntax_error(format!("Unexpected character \"{}\"", c), self.pos))
    }

    fn scan_number(&mut self) -> EvalResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part, only when digits follow
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let has_digits = match self.peek_char_at(1) {
                Some('+') | Some('-') => self.peek_char_at(2).map_or(false, |c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                self.advance();
                if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                    self.advance();
                }
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| self.syntax_error(format!("Malformed number \"{}\"", num_str), start))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        match text.to_ascii_lowercase().as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Identifier(text.to_string()),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> EvalResult<Token> {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> EvalResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(self.syntax_error(
                format!(
                    "Expected \"{}\" but found \"{}\"",
                    expected,
                    self.current_token()
                ),
                self.token_start,
            ))
        }
    }

    fn syntax_error(&self, message: String, position: usize) -> EvalError {
        EvalError::Syntax {
            message,
            position,
            expression: self.input.to_string(),
        }
    }

    fn unexpected(&self) -> EvalError {
        self.syntax_error(
            format!("Unexpected token \"{}\"", self.current_token()),
            self.token_start,
        )
    }

    // === Size limits ===
    // Bounds the AST depth, which the evaluator and `Drop` walk recursively.

    fn enter(&mut self) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.syntax_error(
                "Expression is nested too deeply".to_string(),
                self.token_start,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn count_operator(&mut self) -> EvalResult<()> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(self.syntax_error(
                "Expression has too many operators".to_string(),
                self.token_start,
            ));
        }
        Ok(())
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Logical or: or, ||
    // 2. Logical and: and, &&
    // 3. Comparison: ==, !=, ===, !==, <, <=, >, >=
    // 4. Addition/Subtraction: +, -
    // 5. Multiplication/Division/Modulo: *, /, %
    // 6. Exponentiation: ** (right associative)
    // 7. Unary: -, +, not, !
    // 8. Primary: literals, variables, function calls, parentheses

    fn parse_expression(&mut self) -> EvalResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_and()?;

        while matches!(self.current_token(), Token::Or) {
            self.count_operator()?;
            self.consume()?;
            let right = self.parse_and()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_comparison()?;

        while matches!(self.current_token(), Token::And) {
            self.count_operator()?;
            self.consume()?;
            let right = self.parse_comparison()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::Identical => BinaryOperator::Identical,
                Token::NotIdentical => BinaryOperator::NotIdentical,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.count_operator()?;
            self.consume()?;
            let right = self.parse_additive()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.count_operator()?;
            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                Token::Percent => BinaryOperator::Modulo,
                _ => break,
            };

            self.count_operator()?;
            self.consume()?;
            let right = self.parse_exponent()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> EvalResult<Expr> {
        let left = self.parse_unary()?;

        if matches!(self.current_token(), Token::Power) {
            self.count_operator()?;
            self.consume()?;
            self.enter()?;
            let right = self.parse_exponent()?; // Right associative
            self.leave();
            return Ok(Expr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> EvalResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Not => UnaryOperator::Not,
            // Prefix plus (no-op)
            Token::Plus => {
                self.consume()?;
                self.enter()?;
                let operand = self.parse_unary()?;
                self.leave();
                return Ok(operand);
            }
            _ => return self.parse_primary(),
        };

        self.consume()?;
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        let start = self.token_start;

        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(Expr::Number(n))
            }

            Token::Boolean(b) => {
                self.consume()?;
                Ok(Expr::Boolean(b))
            }

            Token::LeftParen => {
                self.consume()?;
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Identifier(name) => {
                self.consume()?;
                // Check if it's a function call
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name, start)
                } else {
                    Ok(Expr::Variable(name))
                }
            }

            _ => Err(self.unexpected()),
        }
    }

    fn parse_function_call(&mut self, name: String, position: usize) -> EvalResult<Expr> {
        let registry = self.registry;
        let func = registry
            .get(&name)
            .ok_or(EvalError::UnknownFunction { name, position })?;

        self.expect(&Token::LeftParen)?;
        self.enter()?;

        let mut args = Vec::new();

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                args.push(self.parse_expression()?);
            }
        }

        self.leave();
        self.expect(&Token::RightParen)?;

        // Check argument count
        if args.len() < func.min_args {
            return Err(EvalError::ArgumentCount {
                function: func.name.to_string(),
                expected: format!("at least {}", func.min_args),
                actual: args.len(),
            });
        }

        if let Some(max) = func.max_args {
            if args.len() > max {
                return Err(EvalError::ArgumentCount {
                    function: func.name.to_string(),
                    expected: format!("at most {}", max),
                    actual: args.len(),
                });
            }
        }

        Ok(Expr::Function {
            name: func.name.to_string(),
            args,
        })
    }
}
