//! Дерево выражений и его вычисление.
//!
//! Литералы i64, переменные, унарные `+` и `-`, бинарные `+`, `-`, `*`, `/`.
//! Значения переменных берутся из [`Environment`].
//!
//! # Примеры
//!
//! ```
//! use expr_parser_demo::expression::{BinaryOp, Environment, Expr};
//!
//! let mut env = Environment::new();
//! env.set("a", 2);
//!
//! let e = Expr::binary(BinaryOp::Add, Expr::identifier("a"), Expr::literal(3));
//! assert_eq!(e.evaluate(&env), Ok(5));
//! ```

use std::collections::HashMap;

use thiserror::Error;

/// Ошибки при вычислении выражения.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("overflow")]
    Overflow,
    /// Переменной не присвоено значение.
    #[error("unbound identifier '{0}'")]
    UnboundIdentifier(String),
}

/// Унарные операции.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Унарный плюс (идентичность).
    Plus,
    /// Унарный минус (отрицание).
    Neg,
}

impl UnaryOp {
    /// Применить унарную операцию к значению.
    ///
    /// # Ошибки
    ///
    /// Возвращает [`EvalError::Overflow`] при переполнении (например, `-i64::MIN`).
    pub fn apply(self, value: i64) -> Result<i64, EvalError> {
        match self {
            Self::Plus => Ok(value),
            Self::Neg => value.checked_neg().ok_or(EvalError::Overflow),
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Neg => '-',
        }
    }
}

/// Бинарные операции.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Целочисленное деление.
    Div,
}

impl BinaryOp {
    /// Применить бинарную операцию к операндам.
    ///
    /// # Ошибки
    ///
    /// - [`EvalError::DivisionByZero`] при делении на ноль.
    /// - [`EvalError::Overflow`] при переполнении.
    pub fn apply(self, left: i64, right: i64) -> Result<i64, EvalError> {
        match self {
            Self::Add => left.checked_add(right).ok_or(EvalError::Overflow),
            Self::Sub => left.checked_sub(right).ok_or(EvalError::Overflow),
            Self::Mul => left.checked_mul(right).ok_or(EvalError::Overflow),
            Self::Div => {
                if right == 0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    left.checked_div(right).ok_or(EvalError::Overflow)
                }
            }
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Дерево выражений.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Литеральное целое значение.
    Literal(i64),
    /// Ссылка на переменную.
    Identifier(String),
    Unary { kind: UnaryOp, child: Box<Expr> },
    Binary {
        kind: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub const fn literal(value: i64) -> Self {
        Self::Literal(value)
    }

    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    #[must_use]
    pub fn unary(kind: UnaryOp, child: Self) -> Self {
        Self::Unary {
            kind,
            child: Box::new(child),
        }
    }

    #[must_use]
    pub fn binary(kind: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Вычислить значение выражения.
    ///
    /// Операнды вычисляются слева направо, первая ошибка прерывает вычисление.
    ///
    /// # Ошибки
    ///
    /// - [`EvalError::DivisionByZero`] при делении на ноль.
    /// - [`EvalError::Overflow`] при переполнении.
    /// - [`EvalError::UnboundIdentifier`] для переменной без значения.
    pub fn evaluate(&self, env: &Environment) -> Result<i64, EvalError> {
        match self {
            Self::Literal(v) => Ok(*v),
            Self::Identifier(name) => env
                .get(name)
                .ok_or_else(|| EvalError::UnboundIdentifier(name.clone())),
            Self::Unary { kind, child } => kind.apply(child.evaluate(env)?),
            Self::Binary { kind, left, right } => {
                let l = left.evaluate(env)?;
                let r = right.evaluate(env)?;
                kind.apply(l, r)
            }
        }
    }
}

/// Разобранная строка ввода: выражение или присваивание.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Expr(Expr),
    Assign { name: String, value: Expr },
}

impl Statement {
    /// Дерево выражения, которое нужно вычислить.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        match self {
            Self::Expr(expr) | Self::Assign { value: expr, .. } => expr,
        }
    }

    /// Выполняет инструкцию: вычисляет выражение и, для присваивания,
    /// сохраняет результат в окружении.
    ///
    /// # Ошибки
    ///
    /// Возвращает [`EvalError`]; при ошибке окружение не меняется.
    pub fn execute(&self, env: &mut Environment) -> Result<i64, EvalError> {
        match self {
            Self::Expr(expr) => expr.evaluate(env),
            Self::Assign { name, value } => {
                let result = value.evaluate(env)?;
                env.set(name.clone(), result);
                Ok(result)
            }
        }
    }
}

/// Значения переменных одной сессии.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, i64>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<i64> {
        self.vars.get(name).copied()
    }

    /// Присваивает значение, возвращая предыдущее.
    pub fn set(&mut self, name: impl Into<String>, value: i64) -> Option<i64> {
        self.vars.insert(name.into(), value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &Expr) -> Result<i64, EvalError> {
        expr.evaluate(&Environment::new())
    }

    #[test]
    fn literal_eval() {
        assert_eq!(eval(&Expr::literal(0)), Ok(0));
        assert_eq!(eval(&Expr::literal(42)), Ok(42));
        assert_eq!(eval(&Expr::literal(-7)), Ok(-7));
    }

    #[test]
    fn unary_plus_neg() {
        let e = Expr::unary(UnaryOp::Plus, Expr::literal(5));
        assert_eq!(eval(&e), Ok(5));

        let e = Expr::unary(UnaryOp::Neg, Expr::literal(5));
        assert_eq!(eval(&e), Ok(-5));
    }

    #[test]
    fn binary_arithmetic() {
        let a = Expr::literal(10);
        let b = Expr::literal(3);

        assert_eq!(eval(&Expr::binary(BinaryOp::Add, a.clone(), b.clone())), Ok(13));
        assert_eq!(eval(&Expr::binary(BinaryOp::Sub, a.clone(), b.clone())), Ok(7));
        assert_eq!(eval(&Expr::binary(BinaryOp::Mul, a.clone(), b.clone())), Ok(30));
        assert_eq!(eval(&Expr::binary(BinaryOp::Div, a, b)), Ok(3));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(BinaryOp::Div.apply(-7, 2), Ok(-3));
        assert_eq!(BinaryOp::Div.apply(7, -2), Ok(-3));
    }

    #[test]
    fn identifiers_resolve_from_environment() {
        let mut env = Environment::new();
        env.set("b", 3);
        env.set("c", 4);

        // a + b * c
        let expr = Expr::binary(
            BinaryOp::Add,
            Expr::identifier("a"),
            Expr::binary(BinaryOp::Mul, Expr::identifier("b"), Expr::identifier("c")),
        );
        assert_eq!(
            expr.evaluate(&env),
            Err(EvalError::UnboundIdentifier("a".into()))
        );

        env.set("a", 2);
        assert_eq!(expr.evaluate(&env), Ok(14));
    }

    #[test]
    fn left_operand_error_wins() {
        // Ошибка левого операнда возвращается раньше правого
        let expr = Expr::binary(
            BinaryOp::Add,
            Expr::identifier("x"),
            Expr::binary(BinaryOp::Div, Expr::literal(1), Expr::literal(0)),
        );
        assert_eq!(eval(&expr), Err(EvalError::UnboundIdentifier("x".into())));
    }

    #[test]
    fn div_by_zero_returns_error() {
        let expr = Expr::binary(BinaryOp::Div, Expr::literal(1), Expr::literal(0));
        assert_eq!(eval(&expr), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn overflow_cases() {
        let add = Expr::binary(BinaryOp::Add, Expr::literal(i64::MAX), Expr::literal(1));
        let sub = Expr::binary(BinaryOp::Sub, Expr::literal(i64::MIN), Expr::literal(1));
        let mul = Expr::binary(BinaryOp::Mul, Expr::literal(i64::MAX), Expr::literal(2));
        let div = Expr::binary(BinaryOp::Div, Expr::literal(i64::MIN), Expr::literal(-1));
        let neg = Expr::unary(UnaryOp::Neg, Expr::literal(i64::MIN));

        for expr in [add, sub, mul, div, neg] {
            assert_eq!(eval(&expr), Err(EvalError::Overflow), "{expr:?}");
        }
    }

    #[test]
    fn assignment_updates_environment() {
        let mut env = Environment::new();
        let stmt = Statement::Assign {
            name: "x".into(),
            value: Expr::binary(BinaryOp::Mul, Expr::literal(6), Expr::literal(7)),
        };

        assert_eq!(stmt.execute(&mut env), Ok(42));
        assert_eq!(env.get("x"), Some(42));
    }

    #[test]
    fn failed_assignment_keeps_old_value() {
        let mut env = Environment::new();
        env.set("x", 1);
        let stmt = Statement::Assign {
            name: "x".into(),
            value: Expr::binary(BinaryOp::Div, Expr::literal(1), Expr::literal(0)),
        };

        assert_eq!(stmt.execute(&mut env), Err(EvalError::DivisionByZero));
        assert_eq!(env.get("x"), Some(1));
    }

    #[test]
    fn symbols() {
        assert_eq!(UnaryOp::Neg.symbol(), '-');
        assert_eq!(BinaryOp::Mul.symbol(), '*');
        assert_eq!(BinaryOp::Div.symbol(), '/');
    }
}
