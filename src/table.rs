use std::fmt::Write as _;

use crate::model::CsvMetadata;

/// Renders rows under a header line and a dashed separator, columns padded to
/// the widest cell and joined by two spaces.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Preview rows of an uploaded file, in file column order.
pub fn render_preview(metadata: &CsvMetadata) -> String {
    if metadata.preview_rows.is_empty() {
        return "No preview rows.\n".to_string();
    }
    let rows: Vec<Vec<String>> = metadata
        .preview_rows
        .iter()
        .map(|row| {
            metadata
                .columns
                .iter()
                .map(|column| row.get(column).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    render_table(&metadata.columns, &rows)
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let clean = cell.replace(['\n', '\r', '\t'], " ");
            let padding = width.saturating_sub(display_width(&clean));
            format!("{clean}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}
