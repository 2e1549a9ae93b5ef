//! Comma-separated text helpers
//!
//! Shared by the reference dataset loader and the history export.

/// Separator between fields on one line
pub const FIELD_DELIMITER: char = ',';

/// Separator between unit symbols inside the `common_units` field
pub const LIST_DELIMITER: char = ';';

/// Byte order mark some spreadsheet tools prepend to UTF-8 files
pub const UTF8_BOM: char = '\u{feff}';

/// Split one line into fields.
///
/// Double-quoted fields may contain the delimiter; `""` inside quotes is a
/// literal quote. Fields are returned untrimmed.
pub fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => current.push(c),
            }
        } else {
            match c {
                '"' if current.trim().is_empty() => {
                    current.clear();
                    in_quotes = true;
                }
                c if c == FIELD_DELIMITER => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }

    fields.push(current);
    Ok(fields)
}

/// Quote a field if it contains the delimiter, a quote or a line break
pub fn escape_field(field: &str) -> String {
    if field.contains([FIELD_DELIMITER, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Join fields into one line, escaping as needed
pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(&FIELD_DELIMITER.to_string())
}
