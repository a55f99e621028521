//! Интерактивная сессия: читает строки, разбирает и вычисляет их.
//!
//! Сессия реализует [`ExpressionLoop`]: точка входа печатает баннер и
//! передаёт управление циклу, не интересуясь его внутренним устройством.

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::CalcError;
use crate::config::SessionConfig;
use crate::expression::{Environment, Statement};
use crate::parser::{self, ParseError};
use crate::render::render_statement;
use crate::token::{format_tokens, tokenize};

/// Статус успешного завершения (конец ввода).
pub const STATUS_OK: i32 = 0;
/// Статус при ошибке чтения ввода или записи вывода.
pub const STATUS_IO_ERROR: i32 = 1;

/// Цикл разбора выражений, которому точка входа передаёт управление.
///
/// Возвращает целочисленный статус; точка входа его не анализирует.
pub trait ExpressionLoop {
    fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> i32;
}

/// Сессия с собственным набором переменных.
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    env: Environment,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            env: Environment::new(),
        }
    }

    /// Переменные, присвоенные за время сессии.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.env
    }

    fn prompt(&self, output: &mut dyn Write) -> io::Result<()> {
        if !self.config.prompt.is_empty() {
            write!(output, "{}", self.config.prompt)?;
            output.flush()?;
        }
        Ok(())
    }

    fn run_lines(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> io::Result<()> {
        let mut buf = Vec::new();

        loop {
            self.prompt(output)?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("end of input");
                if !self.config.prompt.is_empty() {
                    writeln!(output)?;
                }
                return Ok(());
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "skipping line with invalid UTF-8");
                    writeln!(output, "Error: invalid UTF-8 at byte {}", e.valid_up_to())?;
                    continue;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            self.process_line(trimmed, output)?;
        }
    }

    /// Обрабатывает одну непустую строку ввода.
    ///
    /// Ошибки разбора и вычисления выводятся пользователю; наружу
    /// возвращаются только ошибки записи.
    pub fn process_line(&mut self, input: &str, output: &mut dyn Write) -> io::Result<()> {
        if self.config.show_tokens {
            match tokenize(input) {
                Ok(tokens) => writeln!(output, "Tokens: {}", format_tokens(&tokens))?,
                Err(e) => {
                    return print_error_with_context(output, input, &ParseError::from(e).into());
                }
            }
        }

        let stmt = match parser::parse(input) {
            Ok(stmt) => stmt,
            Err(e) => {
                debug!(input, error = %e, "parse failed");
                return print_error_with_context(output, input, &e.into());
            }
        };
        debug!(?stmt, "parsed");

        if self.config.show_tree {
            writeln!(output, "Tree:")?;
            writeln!(output, "{}", render_statement(&stmt))?;
        }

        if !self.config.evaluate {
            return Ok(());
        }

        match stmt.execute(&mut self.env) {
            Ok(value) => match &stmt {
                Statement::Assign { name, .. } => writeln!(output, "{name} = {value}"),
                Statement::Expr(_) => writeln!(output, "Result: {value}"),
            },
            Err(e) => print_error_with_context(output, input, &e.into()),
        }
    }
}

impl ExpressionLoop for Session {
    fn run(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> i32 {
        info!(config = ?self.config, "session started");

        match self.run_lines(input, output) {
            Ok(()) => {
                info!(variables = self.env.len(), "session finished");
                STATUS_OK
            }
            Err(e) => {
                warn!(error = %e, "session aborted by I/O error");
                STATUS_IO_ERROR
            }
        }
    }
}

/// Выводит ошибку с указанием позиции в исходной строке.
fn print_error_with_context(
    output: &mut dyn Write,
    input: &str,
    error: &CalcError,
) -> io::Result<()> {
    if let Some(pos) = error.position() {
        // Позиция в байтах, каретка ставится по символам
        let column = input.get(..pos).map_or(pos, |prefix| prefix.chars().count());
        writeln!(output, "  {input}")?;
        writeln!(output, "  {}^", " ".repeat(column))?;
    }
    writeln!(output, "Error: {error}")
}
