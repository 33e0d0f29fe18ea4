//! CSV header extraction with encoding and delimiter detection.
//!
//! Only the first line of a CSV matters for schema matching. The header is
//! split on commas, each field trimmed and stripped of every `"` character.
//! Fields are not unquoted CSV-style: a quoted field containing a comma is
//! split like any other.

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::HeaderRow;

/// Separator used for header matching.
pub const HEADER_DELIMITER: char = ',';

/// Decoded file text with the metadata gathered while decoding.
#[derive(Debug, Clone)]
pub struct DecodedCsv {
    /// File content as text
    pub content: String,
    /// Detected encoding
    pub encoding: String,
    /// Dominant delimiter of the first line
    pub delimiter: char,
}

/// Split CSV text into lines, tolerating `\r\n`.
///
/// Blank lines at the end of the text are not rows and are dropped.
pub fn split_lines(content: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = content.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Parse one header line into a [`HeaderRow`].
///
/// # Example
/// ```
/// use ifcload::parser::parse_header_line;
///
/// let header = parse_header_line(r#" "Id", Name ,"Area""#);
/// assert_eq!(header.columns(), ["Id", "Name", "Area"]);
/// ```
pub fn parse_header_line(line: &str) -> HeaderRow {
    HeaderRow::new(
        line.split(HEADER_DELIMITER)
            .map(|field| field.trim().replace('"', "")),
    )
}

/// Header row of `content`, or `None` when there is no first line.
pub fn header_row(content: &str) -> Option<HeaderRow> {
    content.lines().next().map(parse_header_line)
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// A leading UTF-8 byte order mark is dropped so it cannot end up in the
/// first header name.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| CsvError::EncodingError {
                encoding: encoding.to_string(),
                message: e.to_string(),
            })?,
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(encoding) => encoding.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = HEADER_DELIMITER;
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode CSV bytes with encoding and delimiter auto-detection.
pub fn decode_bytes(bytes: &[u8]) -> CsvResult<DecodedCsv> {
    let encoding = detect_encoding(bytes);
    let content = match decode_content(bytes, &encoding) {
        Ok(content) => content,
        // chardet guessed UTF-8 on a short sample; fall back to Windows-1252,
        // which maps every byte.
        Err(_) => decode_content(bytes, "windows-1252")?,
    };
    let delimiter = detect_delimiter(&content);

    log::debug!("decoded {} bytes as {} (delimiter {:?})", bytes.len(), encoding, delimiter);

    Ok(DecodedCsv {
        content,
        encoding,
        delimiter,
    })
}

/// Read and decode a CSV file.
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> CsvResult<DecodedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_trims_and_strips_quotes() {
        let header = parse_header_line(r#""Id" , Name,  "Net ""Area""" "#);
        assert_eq!(header.columns(), ["Id", "Name", "Net Area"]);
    }

    #[test]
    fn test_header_is_comma_split_only() {
        let header = parse_header_line("a;b,c");
        assert_eq!(header.columns(), ["a;b", "c"]);
    }

    #[test]
    fn test_header_row_crlf() {
        let header = header_row("Id,Name\r\n1,Foo\r\n").unwrap();
        assert_eq!(header.columns(), ["Id", "Name"]);
    }

    #[test]
    fn test_split_lines_ignores_trailing_blank_lines() {
        assert_eq!(split_lines("Id,Name\n").len(), 1);
        assert_eq!(split_lines("Id,Name\n1,Foo").len(), 2);
        assert_eq!(split_lines("Id,Name\n\n").len(), 1);
        assert_eq!(split_lines("Id,Name\r\n \r\n\n").len(), 1);
        assert_eq!(split_lines("Id,Name\n\n1,Foo\n").len(), 3);
        assert!(split_lines("\n\n").is_empty());
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_single_column() {
        assert_eq!(detect_delimiter("Id\n1"), ',');
    }

    #[test]
    fn test_utf8_bom_is_dropped() {
        let bytes = b"\xEF\xBB\xBFId,Name\n1,Foo";
        let decoded = decode_bytes(bytes).unwrap();
        assert_eq!(header_row(&decoded.content).unwrap().columns(), ["Id", "Name"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Pièce" in ISO-8859-1
        let bytes: &[u8] = &[0x50, 0x69, 0xE8, 0x63, 0x65];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Pièce");
    }

    #[test]
    fn test_strict_utf8_rejects_invalid_bytes() {
        let result = decode_content(&[0x49, 0x64, 0xFF], "utf-8");
        assert!(matches!(result, Err(CsvError::EncodingError { .. })));
    }

    #[test]
    fn test_read_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.csv");
        std::fs::write(&path, "Id,Name\n1,Lobby\n").unwrap();

        let decoded = read_csv_file(&path).unwrap();
        assert_eq!(decoded.encoding, "utf-8");
        assert_eq!(decoded.delimiter, ',');
    }
}
