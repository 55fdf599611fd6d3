//! Byte offsets ↔ LSP positions (zero-based line, UTF-16 column).

use tower_lsp::lsp_types::{Position, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// `offset` must lie on a char boundary of `text`.
    pub fn position(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line];
        let character = text[start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    pub fn range(&self, text: &str, start: usize, end: usize) -> Range {
        Range::new(self.position(text, start), self.position(text, end))
    }

    /// Byte offset of `pos`. Columns past the end of a line clamp to the end
    /// of that line; lines past the end of the text give `None`.
    pub fn offset(&self, text: &str, pos: Position) -> Option<usize> {
        let start = *self.line_starts.get(pos.line as usize)?;
        let end = self
            .line_starts
            .get(pos.line as usize + 1)
            .map_or(text.len(), |&next| next - 1);
        let line = text[start..end].strip_suffix('\r').unwrap_or(&text[start..end]);

        let mut units = 0usize;
        for (i, ch) in line.char_indices() {
            if units >= pos.character as usize {
                return Some(start + i);
            }
            units += ch.len_utf16();
        }
        Some(start + line.len())
    }
}
