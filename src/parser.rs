//! Рекурсивный нисходящий парсер выражений.
//!
//! Преобразует поток [`Token`] в инструкцию ([`Statement`]).
//!
//! # Грамматика
//!
//! ```text
//! statement = IDENT '=' expr | expr
//! expr      = term (('+' | '-') term)*
//! term      = unary (('*' | '/') unary)*
//! unary     = ('+' | '-') unary | factor
//! factor    = NUMBER | IDENT | '(' expr ')'
//! ```
//!
//! Приоритет (от высшего к низшему):
//! 1. Скобки `()`
//! 2. Унарные `+`, `-`
//! 3. Умножение `*`, деление `/`
//! 4. Сложение `+`, вычитание `-`
//!
//! Все бинарные операторы левоассоциативны.
//!
//! Глубина вложенности (скобки, унарные операторы, цепочки бинарных
//! операторов) ограничена [`MAX_DEPTH`], так что рекурсия парсера и
//! последующий обход дерева не переполняют стек.
//!
//! # Примеры
//!
//! ```
//! use expr_parser_demo::expression::{BinaryOp, Expr};
//! use expr_parser_demo::parser::parse_expr;
//!
//! let expr = parse_expr("a + b * c").unwrap();
//! assert_eq!(
//!     expr,
//!     Expr::binary(
//!         BinaryOp::Add,
//!         Expr::identifier("a"),
//!         Expr::binary(BinaryOp::Mul, Expr::identifier("b"), Expr::identifier("c")),
//!     )
//! );
//! ```

use std::iter::Peekable;

use thiserror::Error;

use crate::expression::{BinaryOp, Expr, Statement, UnaryOp};
use crate::token::{SpannedToken, Token, TokenError, Tokenizer};

/// Максимальная глубина вложенности выражения.
pub const MAX_DEPTH: usize = 128;

/// Ошибки, возникающие при разборе выражения.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected token {token}")]
    UnexpectedToken { token: Token, pos: usize },

    #[error("{0}")]
    TokenError(#[from] TokenError),

    #[error("missing closing parenthesis")]
    UnclosedParen {
        /// Позиция открывающей скобки.
        open_pos: usize,
    },

    #[error("number out of i64 range")]
    NumberOutOfRange { pos: usize },

    #[error("expression nested too deeply")]
    TooDeep {
        /// Позиция токена, на котором превышен предел.
        pos: usize,
    },
}

impl ParseError {
    /// Возвращает позицию ошибки, если она известна.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEof => None,
            Self::UnexpectedToken { pos, .. } => Some(*pos),
            Self::TokenError(te) => Some(te.pos),
            Self::UnclosedParen { open_pos } => Some(*open_pos),
            Self::NumberOutOfRange { pos } | Self::TooDeep { pos } => Some(*pos),
        }
    }
}

/// Рекурсивный нисходящий парсер.
pub struct Parser<'a> {
    tokens: Peekable<Tokenizer<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(input).peekable(),
            depth: 0,
        }
    }

    /// Разбирает строку как инструкцию: присваивание или выражение.
    ///
    /// # Ошибки
    ///
    /// Возвращает [`ParseError`] при синтаксических ошибках.
    pub fn parse_statement(mut self) -> Result<Statement, ParseError> {
        let expr = self.expr()?;

        let is_assign = matches!(
            self.peek(),
            Some(Ok(SpannedToken {
                token: Token::Assign,
                ..
            }))
        );

        let stmt = match expr {
            Expr::Identifier(name) if is_assign => {
                self.advance();
                let value = self.expr()?;
                Statement::Assign { name, value }
            }
            expr => Statement::Expr(expr),
        };

        self.finish()?;
        Ok(stmt)
    }

    /// Разбирает строку как одно выражение.
    ///
    /// # Ошибки
    ///
    /// Возвращает [`ParseError`] при синтаксических ошибках.
    pub fn parse_expr(mut self) -> Result<Expr, ParseError> {
        let expr = self.expr()?;
        self.finish()?;
        Ok(expr)
    }

    /// Проверяет, что после разобранного выражения ввод закончился.
    fn finish(&mut self) -> Result<(), ParseError> {
        match self.tokens.next() {
            None => Ok(()),
            Some(Ok(st)) => Err(ParseError::UnexpectedToken {
                token: st.token,
                pos: st.pos,
            }),
            Some(Err(err)) => Err(err.into()),
        }
    }

    fn peek(&mut self) -> Option<&Result<SpannedToken, TokenError>> {
        self.tokens.peek()
    }

    fn advance(&mut self) -> Option<Result<SpannedToken, TokenError>> {
        self.tokens.next()
    }

    /// Пытается сопоставить следующий токен через `select`.
    /// Возвращает результат `select` и позицию токена при совпадении
    /// и потребляет токен.
    fn match_token<T>(&mut self, select: impl Fn(&Token) -> Option<T>) -> Option<(T, usize)> {
        let matched = match self.peek()? {
            Ok(st) => (select(&st.token)?, st.pos),
            Err(_) => return None,
        };
        self.advance();
        Some(matched)
    }

    /// Спускается на уровень глубже. После ошибки парсер не используется,
    /// поэтому счётчик восстанавливают только успешные ветки.
    fn enter(&mut self, pos: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { pos });
        }
        Ok(())
    }

    /// Разбирает: `expr = term (('+' | '-') term)*`
    fn expr(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.term()?;

        // Каждый оператор цепочки добавляет уровень левому поддереву
        while let Some((kind, pos)) = self.match_token(|t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            self.enter(pos)?;
            let right = self.term()?;
            left = Expr::binary(kind, left, right);
        }

        self.depth = base;
        Ok(left)
    }

    /// Разбирает: `term = unary (('*' | '/') unary)*`
    fn term(&mut self) -> Result<Expr, ParseError> {
        let base = self.depth;
        let mut left = self.unary()?;

        while let Some((kind, pos)) = self.match_token(|t| match t {
            Token::Multiply => Some(BinaryOp::Mul),
            Token::Divide => Some(BinaryOp::Div),
            _ => None,
        }) {
            self.enter(pos)?;
            let right = self.unary()?;
            left = Expr::binary(kind, left, right);
        }

        self.depth = base;
        Ok(left)
    }

    /// Разбирает: `unary = ('+' | '-') unary | factor`
    fn unary(&mut self) -> Result<Expr, ParseError> {
        let Some((kind, op_pos)) = self.match_token(|t| match t {
            Token::Plus => Some(UnaryOp::Plus),
            Token::Minus => Some(UnaryOp::Neg),
            _ => None,
        }) else {
            return self.factor();
        };

        // Минус прямо перед числом даёт отрицательный литерал,
        // иначе i64::MIN (-9223372036854775808) не представим.
        if kind == UnaryOp::Neg {
            if let Some(Ok(SpannedToken {
                token: Token::Number(n),
                pos,
            })) = self.peek()
            {
                let (n, pos) = (*n, *pos);
                self.advance();
                return Self::make_negative_literal(n, pos);
            }
        }

        self.enter(op_pos)?;
        let child = self.unary()?;
        self.depth -= 1;
        Ok(Expr::unary(kind, child))
    }

    fn make_negative_literal(n: u64, pos: usize) -> Result<Expr, ParseError> {
        const I64_MIN_ABS: u64 = i64::MAX as u64 + 1;

        if n <= i64::MAX as u64 {
            Ok(Expr::literal(-(n as i64)))
        } else if n == I64_MIN_ABS {
            Ok(Expr::literal(i64::MIN))
        } else {
            Err(ParseError::NumberOutOfRange { pos })
        }
    }

    /// Разбирает: `factor = NUMBER | IDENT | '(' expr ')'`
    fn factor(&mut self) -> Result<Expr, ParseError> {
        let spanned = self.advance().ok_or(ParseError::UnexpectedEof)??;

        match spanned.token {
            Token::Number(n) => {
                if n <= i64::MAX as u64 {
                    Ok(Expr::literal(n as i64))
                } else {
                    Err(ParseError::NumberOutOfRange { pos: spanned.pos })
                }
            }
            Token::Identifier(name) => Ok(Expr::Identifier(name)),
            Token::LParen => {
                let open_pos = spanned.pos;
                self.enter(open_pos)?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Ok(SpannedToken {
                        token: Token::RParen,
                        ..
                    })) => Ok(inner),
                    Some(Ok(st)) => Err(ParseError::UnexpectedToken {
                        token: st.token,
                        pos: st.pos,
                    }),
                    Some(Err(e)) => Err(e.into()),
                    None => Err(ParseError::UnclosedParen { open_pos }),
                }
            }
            token => Err(ParseError::UnexpectedToken {
                token,
                pos: spanned.pos,
            }),
        }
    }
}

/// Разбирает строку в инструкцию.
///
/// # Ошибки
///
/// Возвращает [`ParseError`] при некорректном синтаксисе.
///
/// # Примеры
///
/// ```
/// use expr_parser_demo::expression::Statement;
/// use expr_parser_demo::parser::parse;
///
/// assert!(matches!(parse("x = 1 + 2").unwrap(), Statement::Assign { .. }));
/// assert!(matches!(parse("x + 2").unwrap(), Statement::Expr(_)));
/// ```
pub fn parse(input: &str) -> Result<Statement, ParseError> {
    Parser::new(input).parse_statement()
}

/// Разбирает строку в дерево выражения; присваивание здесь недопустимо.
///
/// # Ошибки
///
/// Возвращает [`ParseError`] при некорректном синтаксисе.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    Parser::new(input).parse_expr()
}
