use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE_LINES: usize = 10;

/// Multi-line text buffer with a char-indexed cursor.
///
/// Always holds at least one (possibly empty) line, so `value()` of a fresh
/// buffer is `""` and a trailing newline shows up as a trailing empty line.
#[derive(Clone, Debug)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    /// Cursor column as a char index into `lines[row]`.
    col: usize,
    placeholder: String,
}

impl TextArea {
    pub fn new(placeholder: &str) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn value(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Replace the whole content; the cursor lands at the end.
    pub fn set_value(&mut self, text: &str) {
        self.lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        self.row = self.lines.len() - 1;
        self.col = self.line_len(self.row);
    }

    /// Insert text at the cursor, splitting on newlines.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                '\n' => self.newline(),
                _ => self.insert_char(ch),
            }
        }
    }

    pub fn cursor_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn cursor_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn handle(&mut self, key: KeyEvent) {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(ch) if plain => self.insert_char(ch),
            KeyCode::Enter => self.newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.line_len(self.row);
                }
            }
            KeyCode::Right => {
                if self.col < self.line_len(self.row) {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up => self.cursor_up(),
            KeyCode::Down => self.cursor_down(),
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.line_len(self.row),
            KeyCode::PageUp => {
                for _ in 0..PAGE_LINES {
                    self.cursor_up();
                }
            }
            KeyCode::PageDown => {
                for _ in 0..PAGE_LINES {
                    self.cursor_down();
                }
            }
            _ => {}
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_offset(&self, row: usize, col: usize) -> usize {
        let line = &self.lines[row];
        line.char_indices()
            .nth(col)
            .map(|(b, _)| b)
            .unwrap_or(line.len())
    }

    fn insert_char(&mut self, ch: char) {
        let at = self.byte_offset(self.row, self.col);
        self.lines[self.row].insert(at, ch);
        self.col += 1;
    }

    fn newline(&mut self) {
        let at = self.byte_offset(self.row, self.col);
        let tail = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, tail);
        self.row += 1;
        self.col = 0;
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            let start = self.byte_offset(self.row, self.col - 1);
            let end = self.byte_offset(self.row, self.col);
            self.lines[self.row].replace_range(start..end, "");
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let start = self.byte_offset(self.row, self.col);
            let end = self.byte_offset(self.row, self.col + 1);
            self.lines[self.row].replace_range(start..end, "");
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }
}
