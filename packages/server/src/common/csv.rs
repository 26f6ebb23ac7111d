//! Minimal CSV writing and reading.
//!
//! Every written field is wrapped in double quotes with inner quotes doubled,
//! which is all the export needs. A test-only reader understands the same
//! quoting and tolerates CRLF line endings.

use std::fmt::Write;

/* ---------------- Writing ---------------- */

/// Quote one field: `a"b` becomes `"a""b"`.
pub fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Append one row, every field quoted, terminated by `\n`.
pub fn write_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    let mut first = true;
    for cell in row {
        if !first {
            out.push(',');
        }
        first = false;
        // Writing into a String cannot fail.
        let _ = write!(out, "{}", quote_field(cell.as_ref()));
    }
    out.push('\n');
}

/* ---------------- Parsing ---------------- */

/// Parse CSV text into rows of fields. Blank lines are skipped.
#[cfg(test)]
pub(crate) fn parse_rows(text: &str) -> Vec<Vec<String>> {
    use std::mem::take;

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next(); // doubled quote
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a final newline
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_every_field() {
        let mut out = String::new();
        write_row(&mut out, &["a", "", "c d"]);
        assert_eq!(out, "\"a\",\"\",\"c d\"\n");
    }

    #[test]
    fn doubles_inner_quotes() {
        assert_eq!(quote_field(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn parse_recovers_written_fields() {
        let fields = ["plain", "comma, inside", "quote \" inside", "line\nbreak", ""];
        let mut out = String::new();
        write_row(&mut out, &fields);

        let rows = parse_rows(&out);
        assert_eq!(rows, vec![fields.iter().map(|f| f.to_string()).collect::<Vec<_>>()]);
    }

    #[test]
    fn parse_handles_crlf_and_blank_lines() {
        let rows = parse_rows("\"a\",\"b\"\r\n\r\n\"c\",\"d\"");
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ]
        );
    }
}
