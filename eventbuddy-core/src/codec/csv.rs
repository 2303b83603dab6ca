//! RFC4180-style CSV encoding.
//!
//! A field is quoted when it contains a comma, a quote, or a line break;
//! embedded quotes are doubled. Column order is fixed by the caller and never
//! depends on store iteration order. Encode only: the CSV files are read-only
//! projections of the backup JSON.

use std::borrow::Cow;

/// Escape one field per RFC4180.
pub fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Builds one CSV document with a fixed column set.
pub struct CsvWriter {
    columns: usize,
    buf: String,
}

impl CsvWriter {
    pub fn with_header(columns: &[&str]) -> Self {
        let mut writer = CsvWriter {
            columns: columns.len(),
            buf: String::new(),
        };
        writer.write_row_inner(columns.iter().copied());
        writer
    }

    /// Append one row. The field count must match the header.
    pub fn write_row(&mut self, fields: &[String]) {
        debug_assert_eq!(fields.len(), self.columns);
        self.write_row_inner(fields.iter().map(String::as_str));
    }

    fn write_row_inner<'a>(&mut self, fields: impl Iterator<Item = &'a str>) {
        for (i, field) in fields.enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.buf.push_str(&escape(field));
        }
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal RFC4180 decoder, only used to close the escaping round trip.
    fn parse(content: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    other => field.push(other),
                }
            } else {
                match c {
                    '"' => in_quotes = true,
                    ',' => row.push(std::mem::take(&mut field)),
                    '\n' => {
                        row.push(std::mem::take(&mut field));
                        rows.push(std::mem::take(&mut row));
                    }
                    other => field.push(other),
                }
            }
        }
        if !field.is_empty() || !row.is_empty() {
            row.push(field);
            rows.push(row);
        }
        rows
    }

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape("hello"), "hello");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn quoting_triggers() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn hostile_field_survives_roundtrip() {
        let nasty = "met at \"the, bar\"\nwill follow up";
        let mut writer = CsvWriter::with_header(&["Name", "Notes"]);
        writer.write_row(&["Ada".to_string(), nasty.to_string()]);
        let content = writer.finish();

        let rows = parse(&content);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Ada");
        assert_eq!(rows[1][1], nasty);
    }

    #[test]
    fn header_and_column_count() {
        let mut writer = CsvWriter::with_header(&["A", "B", "C"]);
        writer.write_row(&["1".to_string(), "2".to_string(), "3".to_string()]);
        let content = writer.finish();
        assert_eq!(content, "A,B,C\n1,2,3\n");
    }
}
