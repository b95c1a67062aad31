//! Minimal CSV reader/writer shared by the lead ingestor and results log
//!
//! Covers the RFC 4180 subset the lead spreadsheets actually use: quoted
//! fields, doubled-quote escapes, embedded separators and newlines, CRLF.

/// Parse CSV content into rows of fields.
pub fn parse(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();
    // Tracks whether anything was consumed since the last record break,
    // so a trailing newline does not produce a phantom empty row.
    let mut pending = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                pending = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                pending = true;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                pending = false;
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                pending = false;
            }
            _ => {
                field.push(c);
                pending = true;
            }
        }
    }

    if pending || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Format one row as a CSV line (no trailing newline).
pub fn format_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
