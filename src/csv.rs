use anyhow::Context;
use std::path::Path;

pub trait CsvRow {
    const HEADERS: &'static [&'static str];
    const FILE_NAME: &'static str;

    fn cells(&self) -> Vec<String>;
}

/// RFC 4180 field quoting.
pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn join_line<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| csv_quote(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn render<T: CsvRow>(rows: &[T]) -> String {
    let mut out = join_line(T::HEADERS);
    for row in rows {
        out.push('\n');
        out.push_str(&join_line(&row.cells()));
    }
    out
}

pub fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.to_string_lossy()))
}

pub fn opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}
