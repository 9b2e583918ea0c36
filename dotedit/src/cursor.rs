//! Text cursor over the active document's content.
//!
//! Positions are `(row, col)` in characters, not bytes. Editing helpers take
//! the current text and return the new text; the caller hands that to
//! `SessionStore::update_content` so every keystroke goes through the
//! session's history.

/// A character-based position in a text buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

fn line(text: &str, row: usize) -> &str {
    text.split('\n').nth(row).unwrap_or("")
}

fn line_len(text: &str, row: usize) -> usize {
    line(text, row).chars().count()
}

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Byte offset of `(row, col)`, clamped to the end of the line/text.
fn byte_offset(text: &str, row: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, l) in text.split('\n').enumerate() {
        if i == row {
            return offset
                + l.char_indices().nth(col).map_or(l.len(), |(b, _)| b);
        }
        offset += l.len() + 1;
    }
    text.len()
}

impl Cursor {
    /// Pulls the cursor back inside `text` after the content changed underneath it.
    pub fn clamp(&mut self, text: &str) {
        self.row = self.row.min(line_count(text) - 1);
        self.col = self.col.min(line_len(text, self.row));
    }

    pub fn left(&mut self, text: &str) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = line_len(text, self.row);
        }
    }

    pub fn right(&mut self, text: &str) {
        if self.col < line_len(text, self.row) {
            self.col += 1;
        } else if self.row + 1 < line_count(text) {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn up(&mut self, text: &str) {
        self.row = self.row.saturating_sub(1);
        self.col = self.col.min(line_len(text, self.row));
    }

    pub fn down(&mut self, text: &str) {
        if self.row + 1 < line_count(text) {
            self.row += 1;
        }
        self.col = self.col.min(line_len(text, self.row));
    }

    pub fn home(&mut self) {
        self.col = 0;
    }

    pub fn end(&mut self, text: &str) {
        self.col = line_len(text, self.row);
    }

    /// Inserts `ch` at the cursor and advances past it.
    pub fn insert(&mut self, text: &str, ch: char) -> String {
        let at = byte_offset(text, self.row, self.col);
        let mut out = String::with_capacity(text.len() + ch.len_utf8());
        out.push_str(&text[..at]);
        out.push(ch);
        out.push_str(&text[at..]);
        if ch == '\n' {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        out
    }

    /// Deletes the character before the cursor, joining lines at column 0.
    /// Returns `None` at the start of the text.
    pub fn backspace(&mut self, text: &str) -> Option<String> {
        if self.row == 0 && self.col == 0 {
            return None;
        }
        let end = byte_offset(text, self.row, self.col);
        self.left(text);
        let start = byte_offset(text, self.row, self.col);
        Some(format!("{}{}", &text[..start], &text[end..]))
    }

    /// Deletes the character under the cursor. Returns `None` at the end.
    pub fn delete(&self, text: &str) -> Option<String> {
        let start = byte_offset(text, self.row, self.col);
        let ch = text[start..].chars().next()?;
        Some(format!("{}{}", &text[..start], &text[start + ch.len_utf8()..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_newline() {
        let mut c = Cursor { row: 0, col: 3 };
        let text = c.insert("abcdef", '\n');
        assert_eq!(text, "abc\ndef");
        assert_eq!(c, Cursor { row: 1, col: 0 });
        let text = c.insert(&text, 'X');
        assert_eq!(text, "abc\nXdef");
        assert_eq!(c.col, 1);
    }

    #[test]
    fn backspace_joins_lines() {
        let mut c = Cursor { row: 1, col: 0 };
        assert_eq!(c.backspace("ab\ncd").as_deref(), Some("abcd"));
        assert_eq!(c, Cursor { row: 0, col: 2 });
        let mut start = Cursor::default();
        assert_eq!(start.backspace("ab"), None);
    }

    #[test]
    fn multibyte_characters() {
        let mut c = Cursor { row: 0, col: 1 };
        let text = c.insert("éa", 'ü');
        assert_eq!(text, "éüa");
        assert_eq!(c.backspace(&text).as_deref(), Some("éa"));
        assert_eq!(c.delete("éa").as_deref(), Some("é"));
    }

    #[test]
    fn clamp_after_shrink() {
        let mut c = Cursor { row: 4, col: 9 };
        c.clamp("one\ntwo");
        assert_eq!(c, Cursor { row: 1, col: 3 });
    }

    #[test]
    fn vertical_moves_keep_column_in_range() {
        let text = "long line\nx\nanother";
        let mut c = Cursor { row: 0, col: 8 };
        c.down(text);
        assert_eq!(c, Cursor { row: 1, col: 1 });
        c.down(text);
        c.down(text);
        assert_eq!(c.row, 2);
    }
}
