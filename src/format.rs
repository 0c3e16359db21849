//! Rendering of list responses as CSV or JSON, to stdout or a file.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Serialize `rows` in the requested format.
pub fn render<T: Serialize>(rows: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => {
            let mut w = csv::Writer::from_writer(Vec::new());
            for row in rows {
                w.serialize(row).context("serialize CSV row")?;
            }
            let bytes = w.into_inner().context("flush CSV writer")?;
            Ok(String::from_utf8(bytes).context("CSV output is not UTF-8")?)
        }
    }
}

/// Write to `output` if given, else stdout.
pub fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs_err::write(path, text).with_context(|| format!("write {}", path.display()))?
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        id: &'static str,
        n: u32,
    }

    #[test]
    fn csv_has_header_and_rows() {
        let rows = vec![Row { id: "a", n: 1 }, Row { id: "b", n: 2 }];
        let out = render(&rows, OutputFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("id,n"));
        assert_eq!(lines.next(), Some("a,1"));
        assert_eq!(lines.next(), Some("b,2"));
    }

    #[test]
    fn json_is_an_array() {
        let rows = vec![Row { id: "a", n: 1 }];
        let out = render(&rows, OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["id"], "a");
    }

    #[test]
    fn emit_writes_to_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        emit("id,n\na,1", Some(f.path())).unwrap();
        assert_eq!(fs_err::read_to_string(f.path()).unwrap(), "id,n\na,1");
    }
}
