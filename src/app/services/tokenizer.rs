//! Quote-aware CSV tokenizer for vendor export files
//!
//! The vendor exports are RFC-4180-ish: double-quoted fields, doubled
//! quotes as literal quotes, commas inside quoted fields, and an optional
//! leading byte-order-mark. Rows are padded or truncated to the header's
//! field count because the source files are known to be inconsistently
//! formatted.

use crate::config::ParseOptions;
use crate::{Error, Result};
use tracing::debug;

/// UTF-8 byte-order-mark as a char, stripped once at position 0 only
const BOM: char = '\u{feff}';

/// Tokenized file content: one header row plus normalized data rows
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedContent {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// True when the row cap stopped ingestion before the end of the file
    pub truncated: bool,
}

/// Strip a leading byte-order-mark, if present
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix(BOM).unwrap_or(content)
}

/// Split a single CSV line into fields.
///
/// Handles double-quote-delimited fields, doubled quotes inside a quoted
/// field as a literal quote, and commas inside quoted fields. Unquoted
/// fields are trimmed of surrounding whitespace.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let line = strip_bom(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                was_quoted = true;
            }
            ',' if !in_quotes => {
                fields.push(finish_field(current, was_quoted));
                current = String::new();
                was_quoted = false;
            }
            _ => current.push(c),
        }
    }
    fields.push(finish_field(current, was_quoted));
    fields
}

fn finish_field(field: String, was_quoted: bool) -> String {
    if was_quoted {
        field
    } else {
        field.trim().to_string()
    }
}

/// Remove ASCII control characters from a field value
fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect()
}

/// Tokenize whole-file content into a header row and normalized data rows.
///
/// Splits on CR/LF or LF, drops blank lines, treats line 1 as the header,
/// and pads/truncates every subsequent row to the header's field count.
/// The row cap stops ingestion early without erroring; the byte cap rejects
/// the whole file before tokenizing.
pub fn tokenize_content(
    content: &str,
    filename: &str,
    options: &ParseOptions,
) -> Result<TokenizedContent> {
    if content.len() > options.max_file_bytes {
        return Err(Error::content_validation(
            filename,
            format!(
                "file size {} bytes exceeds the {} byte limit",
                content.len(),
                options.max_file_bytes
            ),
        ));
    }

    let mut lines = strip_bom(content)
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(line) => tokenize_line(line),
        None => {
            return Err(Error::content_validation(filename, "file contains no data"));
        }
    };

    let mut rows = Vec::new();
    let mut truncated = false;
    for line in lines {
        if rows.len() >= options.max_rows {
            truncated = true;
            debug!(
                "Row cap of {} reached for {}; remaining lines dropped",
                options.max_rows, filename
            );
            break;
        }

        let mut fields = tokenize_line(line);
        if options.sanitize_input {
            for field in &mut fields {
                if field.chars().any(char::is_control) {
                    *field = sanitize_field(field);
                }
            }
        }

        // Normalize row arity to the header: missing trailing fields become
        // empty, extras are dropped
        fields.resize(header.len(), String::new());
        rows.push(fields);
    }

    Ok(TokenizedContent {
        header,
        rows,
        truncated,
    })
}

/// Extract just the header fields from raw content, tolerantly.
///
/// Used by the format detector: strips a leading BOM, tokenizes only the
/// first non-blank line, and discards empty tokens.
pub fn header_fields(content: &str) -> Vec<String> {
    strip_bom(content)
        .split(['\r', '\n'])
        .find(|line| !line.trim().is_empty())
        .map(tokenize_line)
        .unwrap_or_default()
        .into_iter()
        .filter(|field| !field.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        assert_eq!(tokenize_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unquoted_fields_trimmed() {
        assert_eq!(tokenize_line("  a , b ,c  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_field_with_comma() {
        assert_eq!(
            tokenize_line(r#"device,"AHU-1, Floor 2",ok"#),
            vec!["device", "AHU-1, Floor 2", "ok"]
        );
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(
            tokenize_line(r#""say ""hello""",x"#),
            vec![r#"say "hello""#, "x"]
        );
    }

    #[test]
    fn test_quoted_field_preserves_whitespace() {
        assert_eq!(tokenize_line(r#"" padded ",y"#), vec![" padded ", "y"]);
    }

    #[test]
    fn test_bom_stripped_at_start_only() {
        assert_eq!(tokenize_line("\u{feff}Name,Value"), vec!["Name", "Value"]);
        // A BOM later in the line is field content, not a marker
        let fields = tokenize_line("Name,\u{feff}Value");
        assert_eq!(fields[1], "\u{feff}Value");
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(tokenize_line("a,,c"), vec!["a", "", "c"]);
        assert_eq!(tokenize_line(","), vec!["", ""]);
    }

    #[test]
    fn test_content_header_and_rows() {
        let content = "Name,Value\r\ncpu.usage,4%\nheap.used,100 MB\n";
        let tokenized =
            tokenize_content(content, "resource.csv", &ParseOptions::default()).unwrap();
        assert_eq!(tokenized.header, vec!["Name", "Value"]);
        assert_eq!(tokenized.rows.len(), 2);
        assert_eq!(tokenized.rows[0], vec!["cpu.usage", "4%"]);
        assert!(!tokenized.truncated);
    }

    #[test]
    fn test_rows_padded_and_truncated_to_header() {
        let content = "a,b,c\n1,2\n1,2,3,4\n";
        let tokenized = tokenize_content(content, "x.csv", &ParseOptions::default()).unwrap();
        assert_eq!(tokenized.rows[0], vec!["1", "2", ""]);
        assert_eq!(tokenized.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let content = "a,b\n\n1,2\n   \n3,4\n";
        let tokenized = tokenize_content(content, "x.csv", &ParseOptions::default()).unwrap();
        assert_eq!(tokenized.rows.len(), 2);
    }

    #[test]
    fn test_row_cap_stops_without_error() {
        let content = "a\n1\n2\n3\n4\n5\n";
        let options = ParseOptions::default().with_max_rows(3);
        let tokenized = tokenize_content(content, "x.csv", &options).unwrap();
        assert_eq!(tokenized.rows.len(), 3);
        assert!(tokenized.truncated);
    }

    #[test]
    fn test_byte_cap_rejects_file() {
        let content = "a,b\n1,2\n";
        let options = ParseOptions::default().with_max_file_bytes(4);
        let err = tokenize_content(content, "big.csv", &options).unwrap_err();
        assert!(err.to_string().contains("byte limit"));
    }

    #[test]
    fn test_empty_content_rejected() {
        let err = tokenize_content("", "empty.csv", &ParseOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn test_header_fields_tolerant() {
        assert_eq!(
            header_fields("\u{feff}Name,Value\nrow,1\n"),
            vec!["Name", "Value"]
        );
        assert_eq!(header_fields("\n\nName,,Status\n"), vec!["Name", "Status"]);
        assert!(header_fields("").is_empty());
    }
}
