//! Offset conversions for document text
//!
//! Editors address documents by character offsets or by line/column pairs,
//! while the parser reports byte positions. [`SourceText`] owns a document
//! and translates between the three.

use crate::error::{CarveError, CarveResult, SourceLocation};

/// Document text with a precomputed line table
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    /// Character offset at which each line starts
    line_starts: Vec<usize>,
    char_len: usize,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        let mut char_len = 0;
        for (index, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(index + 1);
            }
            char_len = index + 1;
        }

        Self {
            text,
            line_starts,
            char_len,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the document in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of a character offset; the end of the document is a valid offset
    pub fn byte_offset(&self, char_offset: usize) -> CarveResult<usize> {
        if char_offset == self.char_len {
            return Ok(self.text.len());
        }
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(byte, _)| byte)
            .ok_or_else(|| {
                CarveError::invalid_input(format!(
                    "Offset {} is outside the document ({} characters)",
                    char_offset, self.char_len
                ))
            })
    }

    /// Character offset of a byte offset that lies on a character boundary
    pub fn char_offset(&self, byte_offset: usize) -> CarveResult<usize> {
        self.text
            .get(..byte_offset)
            .map(|prefix| prefix.chars().count())
            .ok_or_else(|| {
                CarveError::internal(format!(
                    "Byte offset {} is not a character boundary",
                    byte_offset
                ))
            })
    }

    /// Character offset of a zero-based line/column position
    pub fn offset_at(&self, line: u32, column: u32) -> CarveResult<usize> {
        let line = line as usize;
        let start = *self.line_starts.get(line).ok_or_else(|| {
            CarveError::invalid_input(format!(
                "Line {} is outside the document ({} lines)",
                line,
                self.line_starts.len()
            ))
        })?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.char_len,
        };

        let offset = start + column as usize;
        if offset > end {
            return Err(CarveError::invalid_input(format!(
                "Column {} is past the end of line {}",
                column, line
            )));
        }
        Ok(offset)
    }

    /// Zero-based line/column position of a character offset
    pub fn position_at(&self, char_offset: usize) -> SourceLocation {
        let offset = char_offset.min(self.char_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        SourceLocation {
            line: line as u32,
            column: (offset - self.line_starts[line]) as u32,
        }
    }

    /// Position of a byte offset, used for parser diagnostics
    pub fn position_at_byte(&self, byte_offset: usize) -> SourceLocation {
        let mut boundary = byte_offset.min(self.text.len());
        while !self.text.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let chars = self.text[..boundary].chars().count();
        self.position_at(chars)
    }

    /// Text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> CarveResult<&str> {
        if start > end {
            return Err(CarveError::invalid_input(format!(
                "Range start {} is after its end {}",
                start, end
            )));
        }
        let start = self.byte_offset(start)?;
        let end = self.byte_offset(end)?;
        Ok(&self.text[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_positions_round_trip_through_offsets() {
        let text = SourceText::new("const a = 1;\n  <div/>\n");
        assert_eq!(text.line_count(), 3);

        let offset = text.offset_at(1, 2).unwrap();
        assert_eq!(offset, 15);
        assert_eq!(text.position_at(offset), SourceLocation { line: 1, column: 2 });
        assert_eq!(text.slice(offset, offset + 7).unwrap(), "<div/>\n");
    }

    #[test]
    fn test_multibyte_characters_use_char_offsets() {
        let text = SourceText::new("const é = <p>ü</p>;");
        let start = 10;
        let end = 18;
        assert_eq!(text.slice(start, end).unwrap(), "<p>ü</p>");
        assert_eq!(text.byte_offset(start).unwrap(), 11);
        assert_eq!(text.char_offset(11).unwrap(), 10);
    }

    #[test]
    fn test_end_of_document_is_addressable() {
        let text = SourceText::new("abc");
        assert_eq!(text.byte_offset(3).unwrap(), 3);
        assert!(text.byte_offset(4).is_err());
        assert_eq!(text.position_at(3), SourceLocation { line: 0, column: 3 });
    }

    #[test]
    fn test_column_past_line_end_is_rejected() {
        let text = SourceText::new("ab\ncd");
        assert_eq!(text.offset_at(0, 2).unwrap(), 2);
        assert!(text.offset_at(0, 3).is_err());
        assert!(text.offset_at(5, 0).is_err());
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let text = SourceText::new("abcdef");
        assert!(matches!(
            text.slice(4, 2),
            Err(CarveError::InvalidInput { .. })
        ));
    }
}
