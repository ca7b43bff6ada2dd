//! Line-oriented CSV tokenizer for published spreadsheet exports.
//!
//! Quoted fields cannot span lines. The optional column limit stops
//! scanning as soon as it is reached, so extractors see a fixed row width.

/// One tokenized spreadsheet line. Out-of-range reads yield `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }
}

impl From<Vec<&str>> for Row {
    fn from(fields: Vec<&str>) -> Self {
        Self(fields.into_iter().map(str::to_owned).collect())
    }
}

/// Tokenizes a single CSV line into trimmed fields.
///
/// When `max_columns` is given and reached, the remainder of the line is
/// discarded without emitting a trailing field.
pub fn parse_line(line: &str, max_columns: Option<usize>) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
                if max_columns.is_some_and(|max| fields.len() >= max) {
                    return fields;
                }
            }
            _ => current.push(ch),
        }
    }

    fields.push(current.trim().to_owned());
    fields
}

/// Splits a CSV export into rows, dropping blank lines and the header row.
///
/// Row indices of the result are the 0-based positions extractors use.
pub fn parse_sheet(text: &str, max_columns: Option<usize>) -> Vec<Row> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .map(|line| Row::new(parse_line(line, max_columns)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_comma_is_not_a_separator() {
        assert_eq!(parse_line(r#"a,"b,c",d"#, None), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn doubled_quote_is_literal() {
        assert_eq!(
            parse_line(r#""he said ""hi""",x"#, None),
            vec![r#"he said "hi""#, "x"]
        );
    }

    #[test]
    fn max_columns_stops_without_trailing_field() {
        assert_eq!(parse_line("a,b,c,d", Some(2)), vec!["a", "b"]);
        assert_eq!(parse_line("a,b", Some(2)), vec!["a", "b"]);
        assert_eq!(parse_line("a", Some(3)), vec!["a"]);
    }

    #[test]
    fn fields_are_trimmed() {
        assert_eq!(parse_line("  a , b ,c ", None), vec!["a", "b", "c"]);
    }

    #[test]
    fn unterminated_quote_consumes_rest_of_line() {
        assert_eq!(parse_line(r#"a,"b,c,d"#, None), vec!["a", "b,c,d"]);
    }

    #[test]
    fn short_rows_read_as_empty() {
        let row = Row::new(parse_line("only", None));
        assert_eq!(row.get(0), "only");
        assert_eq!(row.get(5), "");
    }

    #[test]
    fn parse_sheet_skips_header_and_blank_lines() {
        let text = "status,title\r\nIn progress,Dune\r\n\r\ndone,Emma\n";
        let rows = parse_sheet(text, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(1), "Dune");
        assert_eq!(rows[1].get(0), "done");
    }
}
