use crate::ast::{Position, Span};

/// Maps byte offsets to (line, column) positions.
///
/// Lines are terminated by `\n` only. Columns count Unicode scalar values,
/// so a `\r` before the `\n` of a CRLF file is the last column of its line.
/// A leading byte order mark occupies bytes but no column.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

const BOM: char = '\u{FEFF}';

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let first = if source.starts_with(BOM) { BOM.len_utf8() } else { 0 };
        let mut line_starts = vec![first];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(0) => return Position::new(1, 0, offset),
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count();
        Position::new(line + 1, column, offset)
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.position(start), self.position(end))
    }

    /// Byte offset of a (line, column) coordinate, if it exists in the source
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        let line_start = *self.line_starts.get(line.checked_sub(1)?)?;
        let line_end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        let text = &self.source[line_start..line_end];
        if column == text.chars().count() {
            return Some(line_end);
        }
        text.char_indices()
            .nth(column)
            .map(|(byte, _)| line_start + byte)
    }
}
