use std::fmt::{Debug, Display};

/// Byte offset into a source string.
pub type Cursor1 = usize;

/// One-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor2 {
    pub line: usize,
    pub column: usize,
}
impl Display for Cursor2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Cursor2 { line, column } = self;
        write!(f, "{line}:{column}",)
    }
}

/// Newline table of a source string, used to translate offsets.
#[derive(Clone, Debug)]
pub struct FileInfo {
    newlines: Vec<usize>,
    len: usize,
}
impl FileInfo {
    pub fn new(s: &str) -> Self {
        let newlines = s.char_indices().filter(|(_, c)| *c == '\n').map(|(i, _)| i).collect();
        FileInfo { newlines, len: s.len() }
    }
    pub fn trans_span2(&self, offset: Cursor1) -> Cursor2 {
        let offset = offset.min(self.len);
        // number of newlines strictly before the offset
        let idx = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = if idx == 0 { 0 } else { self.newlines[idx - 1] + 1 };
        Cursor2 { line: idx + 1, column: offset - line_start + 1 }
    }
}
