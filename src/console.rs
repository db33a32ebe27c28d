//! Console output for query results.
//!
//! Rendering functions for the supported output formats plus
//! [`ConsoleHandler`], the result handler the bundled binary wires into its
//! executor. The handler drains each cursor, renders, and writes to its
//! output; applications embedding the library can use it as-is or as a
//! reference for their own [`ResultHandler`] implementations.

use std::io::{self, Write};

use clap::ValueEnum;
use serde_json::Value as JsonValue;
use unicode_width::UnicodeWidthStr;

use crate::db::driver::Rows;
use crate::db::executor::ResultHandler;
use crate::db::types::Row;
use crate::error::{DbError, DbResult};

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (like MySQL CLI)
    #[default]
    Table,
    /// JSON array of row objects
    Json,
    /// Markdown table format
    Markdown,
}

/// Render rows as an ASCII table with a row-count trailer.
pub fn render_table(columns: &[String], rows: &[Row]) -> String {
    if columns.is_empty() {
        return "Empty set\n".to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..columns.len())
                .map(|i| row.get(i).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut output = String::new();
    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("| {:^width$} ", col, width = w))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for (row, row_cells) in rows.iter().zip(&cells) {
        let row_str: String = row_cells
            .iter()
            .enumerate()
            .zip(&widths)
            .map(|((i, cell), w)| {
                let numeric = row.get(i).is_some_and(|v| v.is_numeric());
                if numeric {
                    format!("| {:>width$} ", cell, width = w)
                } else {
                    format!("| {:<width$} ", cell, width = w)
                }
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&separator);

    let row_text = if rows.len() == 1 { "row" } else { "rows" };
    output.push_str(&format!("{} {} in set\n", rows.len(), row_text));

    output
}

/// Render rows as a Markdown table.
pub fn render_markdown(columns: &[String], rows: &[Row]) -> String {
    if columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();

    let header: String = columns
        .iter()
        .map(|c| format!("| {} ", c))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);

    let sep: String = columns.iter().map(|_| "|---").collect::<String>() + "|\n";
    output.push_str(&sep);

    for row in rows {
        let row_str: String = (0..columns.len())
            .map(|i| {
                let cell = row.get(i).map(|v| v.to_string()).unwrap_or_default();
                format!("| {} ", cell)
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&format!("\n*{} rows*", rows.len()));

    output
}

/// Render rows as a pretty-printed JSON array of objects.
pub fn render_json(columns: &[String], rows: &[Row], decode_binary: bool) -> String {
    let array: Vec<JsonValue> = rows
        .iter()
        .map(|row| JsonValue::Object(row.to_json_map(columns, decode_binary)))
        .collect();
    serde_json::to_string_pretty(&array).unwrap_or_default()
}

/// Render an affected-row summary line.
pub fn render_affected(count: Option<u64>) -> String {
    match count {
        Some(1) => "Query OK, 1 row affected".to_string(),
        Some(n) => format!("Query OK, {} rows affected", n),
        None => "Query OK, rows affected unknown".to_string(),
    }
}

/// Result handler that renders outcomes to a writer.
pub struct ConsoleHandler<W: Write> {
    out: W,
    format: OutputFormat,
}

impl ConsoleHandler<io::Stdout> {
    /// Handler writing to standard output.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ConsoleHandler<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    fn write_text(&mut self, text: &str) -> DbResult<()> {
        self.out
            .write_all(text.as_bytes())
            .map_err(DbError::dispatch)?;
        if !text.ends_with('\n') {
            writeln!(self.out).map_err(DbError::dispatch)?;
        }
        self.out.flush().map_err(DbError::dispatch)
    }
}

impl<W: Write> ResultHandler for ConsoleHandler<W> {
    fn on_rows(&mut self, rows: &mut dyn Rows) -> DbResult<()> {
        let columns = rows.columns().to_vec();
        let mut fetched = Vec::new();
        while let Some(row) = rows.next()? {
            fetched.push(row);
        }
        let text = match self.format {
            OutputFormat::Table => render_table(&columns, &fetched),
            OutputFormat::Json => render_json(&columns, &fetched, false),
            OutputFormat::Markdown => render_markdown(&columns, &fetched),
        };
        self.write_text(&text)
    }

    fn on_rows_affected(&mut self, count: Option<u64>) -> DbResult<()> {
        let text = render_affected(count);
        self.write_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::Value;

    fn sample_rows() -> (Vec<String>, Vec<Row>) {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            Row::new(vec![Value::Integer(1), Value::Text("alice".into())]),
            Row::new(vec![Value::Integer(2), Value::Null]),
        ];
        (columns, rows)
    }

    #[test]
    fn test_render_table_layout() {
        let (columns, rows) = sample_rows();
        let table = render_table(&columns, &rows);
        assert!(table.contains("| id | name  |"));
        assert!(table.contains("|  1 | alice |"));
        assert!(table.contains("|  2 | NULL  |"));
        assert!(table.contains("2 rows in set"));
        assert!(table.starts_with("+----+-------+"));
    }

    #[test]
    fn test_render_table_singular_row() {
        let columns = vec!["x".to_string()];
        let rows = vec![Row::new(vec![Value::Integer(1)])];
        let table = render_table(&columns, &rows);
        assert!(table.contains("1 row in set"));
    }

    #[test]
    fn test_render_table_no_columns() {
        assert_eq!(render_table(&[], &[]), "Empty set\n");
    }

    #[test]
    fn test_render_table_empty_result() {
        let columns = vec!["x".to_string()];
        let table = render_table(&columns, &[]);
        assert!(table.contains("| x |"));
        assert!(table.contains("0 rows in set"));
    }

    #[test]
    fn test_render_json_round_trips() {
        let (columns, rows) = sample_rows();
        let json = render_json(&columns, &rows, false);
        let parsed: Vec<serde_json::Map<String, JsonValue>> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["id"], serde_json::json!(1));
        assert_eq!(parsed[1]["name"], JsonValue::Null);
    }

    #[test]
    fn test_render_markdown() {
        let (columns, rows) = sample_rows();
        let md = render_markdown(&columns, &rows);
        assert!(md.contains("| id | name |"));
        assert!(md.contains("|---|---|"));
        assert!(md.contains("| 1 | alice |"));
        assert!(md.ends_with("*2 rows*"));
    }

    #[test]
    fn test_render_affected() {
        assert_eq!(render_affected(Some(1)), "Query OK, 1 row affected");
        assert_eq!(render_affected(Some(3)), "Query OK, 3 rows affected");
        assert_eq!(render_affected(None), "Query OK, rows affected unknown");
    }

    struct FixedRows {
        columns: Vec<String>,
        rows: Vec<Row>,
    }

    impl Rows for FixedRows {
        fn columns(&self) -> &[String] {
            &self.columns
        }
        fn next(&mut self) -> DbResult<Option<Row>> {
            if self.rows.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.rows.remove(0)))
            }
        }
    }

    #[test]
    fn test_console_handler_renders_rows() {
        let (columns, rows) = sample_rows();
        let mut cursor = FixedRows { columns, rows };
        let mut handler = ConsoleHandler::new(Vec::new(), OutputFormat::Table);
        handler.on_rows(&mut cursor).unwrap();
        let output = String::from_utf8(handler.out).unwrap();
        assert!(output.contains("2 rows in set"));
        // Cursor fully drained.
        assert!(cursor.next().unwrap().is_none());
    }

    #[test]
    fn test_console_handler_renders_count() {
        let mut handler = ConsoleHandler::new(Vec::new(), OutputFormat::Table);
        handler.on_rows_affected(Some(5)).unwrap();
        let output = String::from_utf8(handler.out).unwrap();
        assert_eq!(output, "Query OK, 5 rows affected\n");
    }
}
