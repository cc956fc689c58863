//! Offset ↔ line/column conversion.
//!
//! The request layer speaks in 0-based lines and UTF-16 columns (the LSP
//! convention); the core speaks in byte offsets.

/// A 0-based line and UTF-16 column.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// Byte offsets of every line start in a text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex {
            line_starts,
            len: u32::try_from(text.len()).unwrap_or(u32::MAX),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line containing `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        u32::try_from(line).unwrap_or(u32::MAX)
    }

    /// Byte offset where `line` starts, clamped to the end of the text.
    pub fn line_start(&self, line: u32) -> u32 {
        self.line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(self.len)
    }

    /// Byte column of `offset` within its line.
    pub fn byte_column(&self, offset: u32) -> u32 {
        offset - self.line_start(self.line_of(offset))
    }

    /// Convert a byte offset into a line / UTF-16 column position.
    pub fn position(&self, text: &str, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        let start = self.line_start(line);
        let prefix = text.get(start as usize..offset as usize).unwrap_or("");
        let character = prefix.encode_utf16().count();
        Position {
            line,
            character: u32::try_from(character).unwrap_or(u32::MAX),
        }
    }

    /// Convert a line / UTF-16 column position into a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end.
    pub fn offset(&self, text: &str, position: Position) -> u32 {
        let start = self.line_start(position.line);
        let end = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let line_text = text.get(start as usize..end as usize).unwrap_or("");
        let mut utf16 = 0u32;
        for (byte_idx, ch) in line_text.char_indices() {
            if utf16 >= position.character || ch == '\n' {
                return start + u32::try_from(byte_idx).unwrap_or(0);
            }
            utf16 += u32::try_from(ch.len_utf16()).unwrap_or(1);
        }
        end
    }
}
