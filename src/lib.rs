//! # expr_parser_demo
//!
//! Консольная демонстрация разбора выражений.
//!
//! Программа печатает баннер с примером токенизации и дерева разбора, а затем
//! передаёт управление циклу [`repl::ExpressionLoop`], который читает
//! выражения из stdin до конца ввода.
//!
//! Поддерживает:
//! - Идентификаторы и целые числа (i64), включая i64::MIN
//! - Бинарные операции: `+`, `-`, `*`, `/`
//! - Унарные операции: `+`, `-`
//! - Скобки для группировки
//! - Присваивание `name = expr`
//!
//! # Пример использования
//!
//! ```
//! use expr_parser_demo::evaluate;
//!
//! assert_eq!(evaluate("2 + 2").unwrap(), 4);
//! assert_eq!(evaluate("-9223372036854775808").unwrap(), i64::MIN);
//! ```

pub mod config;
pub mod expression;
pub mod parser;
pub mod render;
pub mod repl;
pub mod token;

use std::io::{self, BufRead, Write};

use expression::Environment;
use repl::ExpressionLoop;

/// Баннер, который печатается один раз перед запуском цикла.
pub const BANNER: &str = concat!(
    "Expression Parser Demo\n",
    "Enter expressions to evaluate (Ctrl+D to exit):\n",
    "Example: a + b * c would be tokenized as:\n",
    "IDENTIFIER(a) PLUS IDENTIFIER(b) MULTIPLY IDENTIFIER(c)\n\n",
    "And parsed according to operator precedence:\n",
    "  +\n",
    " / \\\n",
    "a   *\n",
    "   / \\\n",
    "  b   c\n\n",
    "Now you can try your own expressions:\n",
);

/// Общий тип ошибки.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("{0}")]
    Parse(#[from] parser::ParseError),

    #[error("{0}")]
    Eval(#[from] expression::EvalError),
}

impl CalcError {
    /// Возвращает позицию ошибки в исходной строке, если она известна.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Parse(pe) => pe.position(),
            Self::Eval(_) => None,
        }
    }
}

/// Вычисляет выражение без переменных.
///
/// # Ошибки
///
/// Возвращает [`CalcError`] при ошибках парсинга или вычисления.
///
/// # Примеры
///
/// ```
/// use expr_parser_demo::evaluate;
///
/// assert_eq!(evaluate("(1 + 2) * 3").unwrap(), 9);
/// assert!(evaluate("1 / 0").is_err());
/// assert!(evaluate("a + 1").is_err());
/// ```
pub fn evaluate(input: &str) -> Result<i64, CalcError> {
    let expr = parser::parse_expr(input)?;
    Ok(expr.evaluate(&Environment::new())?)
}

/// Разбирает и выполняет инструкцию в заданном окружении.
///
/// # Ошибки
///
/// Возвращает [`CalcError`] при ошибках парсинга или вычисления.
///
/// ```
/// use expr_parser_demo::execute;
/// use expr_parser_demo::expression::Environment;
///
/// let mut env = Environment::new();
/// execute("x = 20", &mut env).unwrap();
/// assert_eq!(execute("x * 2 + 2", &mut env).unwrap(), 42);
/// ```
pub fn execute(input: &str, env: &mut Environment) -> Result<i64, CalcError> {
    let stmt = parser::parse(input)?;
    Ok(stmt.execute(env)?)
}

/// Печатает баннер.
///
/// # Ошибки
///
/// Возвращает [`io::Error`] при ошибке записи.
pub fn write_banner(output: &mut dyn Write) -> io::Result<()> {
    output.write_all(BANNER.as_bytes())?;
    output.flush()
}

/// Печатает баннер и передаёт управление циклу разбора.
///
/// Возвращает статус, с которым завершился цикл.
///
/// # Ошибки
///
/// Возвращает [`io::Error`], если не удалось напечатать баннер; цикл в этом
/// случае не запускается.
pub fn run_with(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    parse_loop: &mut dyn ExpressionLoop,
) -> io::Result<i32> {
    write_banner(output)?;
    Ok(parse_loop.run(input, output))
}
