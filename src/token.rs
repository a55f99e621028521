//! Токенизатор выражений.
//!
//! Распознаёт идентификаторы, целые числа, четыре арифметических оператора,
//! присваивание `=` и скобки. Отображение токенов совпадает с тем, что
//! печатает баннер: `IDENTIFIER(a) PLUS IDENTIFIER(b)`.
//!
//! # Пример
//!
//! ```
//! use expr_parser_demo::token::{Token, Tokenizer};
//!
//! let tokens: Vec<Token> = Tokenizer::new("a + 1")
//!     .map(|r| r.map(|st| st.token))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(tokens[1], Token::Plus);
//! ```

use std::{fmt::Display, num::ParseIntError};
use thiserror::Error;

/// Токен выражения.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// Имя переменной.
    Identifier(String),
    /// Беззнаковое целое число (знак обрабатывается как унарный оператор).
    Number(u64),
    Plus,
    Minus,
    Multiply,
    Divide,
    /// `=`
    Assign,
    /// Открывающая скобка `(`.
    LParen,
    /// Закрывающая скобка `)`.
    RParen,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "IDENTIFIER({name})"),
            Self::Number(n) => write!(f, "NUMBER({n})"),
            Self::Plus => f.write_str("PLUS"),
            Self::Minus => f.write_str("MINUS"),
            Self::Multiply => f.write_str("MULTIPLY"),
            Self::Divide => f.write_str("DIVIDE"),
            Self::Assign => f.write_str("ASSIGN"),
            Self::LParen => f.write_str("LPAREN"),
            Self::RParen => f.write_str("RPAREN"),
        }
    }
}

/// Токен с информацией о позиции в исходной строке.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SpannedToken {
    pub token: Token,
    /// Позиция начала токена (в байтах от начала строки).
    pub pos: usize,
}

impl SpannedToken {
    pub const fn new(token: Token, pos: usize) -> Self {
        Self { token, pos }
    }
}

/// Ошибка токенизации.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("position {pos}: {kind}")]
pub struct TokenError {
    /// Позиция ошибки в исходной строке.
    pub pos: usize,
    pub kind: TokenErrorKind,
}

impl TokenError {
    const fn new(pos: usize, kind: TokenErrorKind) -> Self {
        Self { pos, kind }
    }
}

/// Тип ошибки токенизации.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenErrorKind {
    /// Неизвестный символ.
    UnknownSymbol(char),
    /// Число не помещается в u64.
    NumberError(ParseIntError),
}

impl Display for TokenErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSymbol(symbol) => write!(f, "unknown symbol '{symbol}'"),
            Self::NumberError(err) => write!(f, "invalid number: {err}"),
        }
    }
}

/// Итератор по токенам входной строки.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input.chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let mut chars = self.input.chars();
        let ch = chars.next()?;
        self.input = chars.as_str();
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let byte_len: usize = self
            .input
            .chars()
            .take_while(|&c| predicate(c))
            .map(char::len_utf8)
            .sum();

        let (consumed, rest) = self.input.split_at(byte_len);
        self.pos += byte_len;
        self.input = rest;
        consumed
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn read_number(&mut self, start_pos: usize) -> Result<SpannedToken, TokenError> {
        let digits = self.advance_while(|c| c.is_ascii_digit());

        digits
            .parse()
            .map(|n| SpannedToken::new(Token::Number(n), start_pos))
            .map_err(|err| TokenError::new(start_pos, TokenErrorKind::NumberError(err)))
    }

    fn read_identifier(&mut self, start_pos: usize) -> SpannedToken {
        let name = self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        SpannedToken::new(Token::Identifier(name.to_owned()), start_pos)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<SpannedToken, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let start_pos = self.pos;
        let ch = self.peek()?;

        let simple = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Multiply),
            '/' => Some(Token::Divide),
            '=' => Some(Token::Assign),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(token) = simple {
            self.advance();
            return Some(Ok(SpannedToken::new(token, start_pos)));
        }

        let token = match ch {
            '0'..='9' => self.read_number(start_pos),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_identifier(start_pos)),
            _ => {
                self.advance();
                Err(TokenError::new(start_pos, TokenErrorKind::UnknownSymbol(ch)))
            }
        };

        Some(token)
    }
}

/// Разбивает строку на токены целиком, останавливаясь на первой ошибке.
///
/// # Ошибки
///
/// Возвращает первую [`TokenError`], встреченную во входной строке.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, TokenError> {
    Tokenizer::new(input).collect()
}

/// Форматирует поток токенов в одну строку через пробел.
#[must_use]
pub fn format_tokens(tokens: &[SpannedToken]) -> String {
    tokens
        .iter()
        .map(|st| st.token.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
