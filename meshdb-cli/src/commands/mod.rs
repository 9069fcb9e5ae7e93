pub mod config;
pub mod db;
pub mod node;
pub mod query;
pub mod replicate;
pub mod tx;

use anyhow::Result;
use comfy_table::{Table, presets::UTF8_FULL};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct OutputContext {
    pub json: bool,
}

impl OutputContext {
    pub fn print_table(&self, columns: &[&str], rows: &[Vec<Value>]) -> Result<()> {
        if self.json {
            let result = serde_json::json!({
                "columns": columns,
                "rows": rows,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(columns.to_vec());

        for row in rows {
            let values: Vec<String> = row.iter().map(value_to_string).collect();
            table.add_row(values);
        }

        println!("{table}");
        Ok(())
    }

    pub fn print_json<T: serde::Serialize>(&self, data: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(data)?);
        Ok(())
    }

    pub fn print_success(&self, message: &str) {
        use colored::Colorize;
        println!("{} {}", "✓".green(), message);
    }

    pub fn print_error(&self, message: &str) {
        use colored::Colorize;
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn print_info(&self, message: &str) {
        use colored::Colorize;
        println!("{} {}", "ℹ".blue(), message);
    }
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(value_to_string).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

/// Table columns taken from the keys of the first object, in order
pub fn object_columns(rows: &[Value]) -> Vec<String> {
    rows.first()
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

/// Print JSON objects as a table keyed by `columns`
pub fn print_objects(output: &OutputContext, columns: &[String], rows: &[Value]) -> Result<()> {
    let header: Vec<&str> = columns.iter().map(String::as_str).collect();
    let cells: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    output.print_table(&header, &cells)
}
