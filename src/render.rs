//! Отрисовка дерева выражения псевдографикой.
//!
//! Оператор ставится над своими операндами и соединяется с ними рёбрами
//! `/` и `\`. Для `a + b * c` получается:
//!
//! ```text
//!   +
//!  / \
//! a   *
//!    / \
//!   b   c
//! ```
//!
//! Корни соседних поддеревьев находятся минимум в четырёх колонках друг
//! от друга; если поддеревья шире, рёбра удлиняются.

use crate::expression::{Expr, Statement};

/// Минимальное расстояние между корнями левого и правого поддеревьев.
const MIN_ROOT_GAP: usize = 4;

/// Прямоугольный фрагмент рисунка с отмеченной колонкой корня.
#[derive(Debug)]
struct Block {
    lines: Vec<Vec<char>>,
    width: usize,
    root: usize,
}

impl Block {
    fn leaf(label: &str) -> Self {
        let chars: Vec<char> = label.chars().collect();
        let width = chars.len();
        Self {
            root: width.saturating_sub(1) / 2,
            lines: vec![chars],
            width,
        }
    }

    fn unary(symbol: char, child: Self) -> Self {
        let mut lines = Vec::with_capacity(child.lines.len() + 2);
        lines.push(row_with(&[(child.root, symbol)]));
        lines.push(row_with(&[(child.root, '|')]));
        lines.extend(child.lines);

        Self {
            lines,
            width: child.width,
            root: child.root,
        }
    }

    fn binary(label: &str, left: Self, right: Self) -> Self {
        let left_root = left.root;

        let mut offset = (left.width + 1).max((left_root + MIN_ROOT_GAP).saturating_sub(right.root));
        // Родитель должен стоять ровно посередине между корнями
        if (offset + right.root - left_root) % 2 == 1 {
            offset += 1;
        }
        let right_root = offset + right.root;
        let mid = (left_root + right_root) / 2;

        let label: Vec<char> = label.chars().collect();
        let label_start = mid.saturating_sub(label.len().saturating_sub(1) / 2);

        let mut lines = Vec::new();

        let mut head = vec![' '; label_start];
        head.extend(&label);
        lines.push(head);

        let edge_rows = (right_root - left_root) / 2 - 1;
        for k in (1..=edge_rows).rev() {
            lines.push(row_with(&[(left_root + k, '/'), (right_root - k, '\\')]));
        }

        let body = left.lines.len().max(right.lines.len());
        for i in 0..body {
            let mut row = left.lines.get(i).cloned().unwrap_or_default();
            if let Some(right_line) = right.lines.get(i) {
                row.resize(offset, ' ');
                row.extend(right_line);
            }
            lines.push(row);
        }

        Self {
            lines,
            width: left.width.max(offset + right.width).max(label_start + label.len()),
            root: mid,
        }
    }

    fn into_string(self) -> String {
        self.lines
            .into_iter()
            .map(|row| row.into_iter().collect::<String>().trim_end().to_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Строка из пробелов с символами в заданных колонках.
fn row_with(cells: &[(usize, char)]) -> Vec<char> {
    let len = cells.iter().map(|&(col, _)| col + 1).max().unwrap_or(0);
    let mut row = vec![' '; len];
    for &(col, ch) in cells {
        row[col] = ch;
    }
    row
}

fn layout(expr: &Expr) -> Block {
    match expr {
        Expr::Literal(value) => Block::leaf(&value.to_string()),
        Expr::Identifier(name) => Block::leaf(name),
        Expr::Unary { kind, child } => Block::unary(kind.symbol(), layout(child)),
        Expr::Binary { kind, left, right } => {
            Block::binary(&kind.symbol().to_string(), layout(left), layout(right))
        }
    }
}

/// Рисует дерево выражения. Строки разделены `\n`, без хвостовых пробелов
/// и без завершающего перевода строки.
#[must_use]
pub fn render_tree(expr: &Expr) -> String {
    layout(expr).into_string()
}

/// Рисует инструкцию; присваивание изображается узлом `=`.
#[must_use]
pub fn render_statement(stmt: &Statement) -> String {
    match stmt {
        Statement::Expr(expr) => render_tree(expr),
        Statement::Assign { name, value } => {
            Block::binary("=", Block::leaf(name), layout(value)).into_string()
        }
    }
}
