//! Positions inside catalog files.

/// A position in a catalog file (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourcePosition {
    pub line: u32,
    pub character: u32,
}

impl SourcePosition {
    /// Converts a byte offset into a line/character position.
    ///
    /// Characters are counted in Unicode scalar values. Offsets past the end of
    /// `text` resolve to the end of the text.
    #[must_use]
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut line = 0u32;
        let mut character = 0u32;
        for (index, ch) in text.char_indices() {
            if index >= offset {
                break;
            }
            if ch == '\n' {
                line = line.saturating_add(1);
                character = 0;
            } else {
                character = character.saturating_add(1);
            }
        }
        Self { line, character }
    }
}

impl std::fmt::Display for SourcePosition {
    /// Renders as a 1-indexed `line:column` pair.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line.saturating_add(1), self.character.saturating_add(1))
    }
}
