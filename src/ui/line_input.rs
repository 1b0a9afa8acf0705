use std::path::MAIN_SEPARATOR;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Tab-completion cycle over filesystem entries.
#[derive(Clone, Debug, Default)]
struct Completion {
    candidates: Vec<String>,
    index: usize,
}

/// Single-line editor used by the save-path and sentence-count prompts.
#[derive(Clone, Debug)]
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    max_chars: Option<usize>,
    path_completion: bool,
    completion: Option<Completion>,
    /// Set when the last Tab could not read the directory.
    pub completion_error: bool,
}

impl LineInput {
    /// Path field: unbounded, Tab completes file names.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            max_chars: None,
            path_completion: true,
            completion: None,
            completion_error: false,
        }
    }

    /// Short field: at most `max_chars` characters, no completion.
    pub fn short_field(text: &str, max_chars: usize) -> Self {
        let mut input = Self::new(text);
        input.max_chars = Some(max_chars);
        input.path_completion = false;
        input
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    /// (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// `cursor_char` is `None` when the cursor sits past the end.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_at(self.cursor);
        match self.text[at..].chars().next() {
            Some(ch) => (
                &self.text[..at],
                Some(ch),
                &self.text[at + ch.len_utf8()..],
            ),
            None => (&self.text, None, ""),
        }
    }

    /// Insert pasted text at the cursor. Line breaks and other control
    /// characters are dropped; a short field stops accepting at its cap.
    pub fn insert_str(&mut self, text: &str) {
        self.completion = None;
        self.completion_error = false;
        for ch in text.chars().filter(|c| !c.is_control()) {
            if self.max_chars.is_some_and(|max| self.len() >= max) {
                break;
            }
            let at = self.byte_at(self.cursor);
            self.text.insert(at, ch);
            self.cursor += 1;
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.completion = None;
            self.completion_error = false;
        }

        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.remove_char(self.cursor - 1);
                self.cursor -= 1;
            }
            KeyCode::Delete if self.cursor < self.len() => self.remove_char(self.cursor),
            KeyCode::Tab if self.path_completion => self.tab_complete(true),
            KeyCode::BackTab if self.path_completion => self.tab_complete(false),
            KeyCode::Char(ch) if !ctrl => {
                if self.max_chars.is_some_and(|max| self.len() >= max) {
                    return InputResult::Continue;
                }
                let at = self.byte_at(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_char(&mut self, char_idx: usize) {
        let start = self.byte_at(char_idx);
        let end = self.byte_at(char_idx + 1);
        self.text.replace_range(start..end, "");
    }

    /// unix-word-rubout: skip whitespace, then non-whitespace.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let (start, end) = (self.byte_at(pos), self.byte_at(self.cursor));
        self.text.replace_range(start..end, "");
        self.cursor = pos;
    }

    fn tab_complete(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }

        let next = match self.completion.as_mut() {
            Some(c) => {
                let count = c.candidates.len();
                c.index = if forward {
                    (c.index + 1) % count
                } else {
                    (c.index + count - 1) % count
                };
                c.candidates[c.index].clone()
            }
            None => {
                let candidates = match self.scan_candidates() {
                    Some(candidates) => candidates,
                    None => {
                        self.completion_error = true;
                        return;
                    }
                };
                let Some(first) = candidates.first().cloned() else {
                    return;
                };
                self.completion = Some(Completion {
                    candidates,
                    index: 0,
                });
                first
            }
        };

        self.cursor = next.chars().count();
        self.text = next;
    }

    /// `None` when the directory cannot be read.
    fn scan_candidates(&self) -> Option<Vec<String>> {
        let seed = self.text.as_str();
        let (dir, partial) = match seed.rfind(['/', '\\']) {
            Some(pos) => (&seed[..=pos], &seed[pos + 1..]),
            None => ("", seed),
        };

        let read_from = match dir.strip_prefix('~') {
            Some(rest) => dirs::home_dir()
                .map(|home| format!("{}{rest}", home.display()))
                .unwrap_or_else(|| dir.to_string()),
            None if dir.is_empty() => ".".to_string(),
            None => dir.to_string(),
        };

        let entries = std::fs::read_dir(read_from).ok()?.map(|entry| {
            entry.map(|e| {
                let is_dir = std::fs::metadata(e.path()).is_ok_and(|m| m.is_dir());
                (e.file_name().to_string_lossy().into_owned(), is_dir)
            })
        });
        collect_candidates(entries, dir, partial)
    }
}

/// Filter and order completion candidates: directories first, then files,
/// alphabetical within each group. Hidden entries only match a `.` prefix.
fn collect_candidates(
    entries: impl Iterator<Item = std::io::Result<(String, bool)>>,
    dir: &str,
    partial: &str,
) -> Option<Vec<String>> {
    const SCAN_LIMIT: usize = 1000;
    const CANDIDATE_LIMIT: usize = 100;

    let include_hidden = partial.starts_with('.');
    let mut found: Vec<(bool, String)> = Vec::new();
    for entry in entries.take(SCAN_LIMIT) {
        let (name, is_dir) = entry.ok()?;
        if (!include_hidden && name.starts_with('.')) || !name.starts_with(partial) {
            continue;
        }
        let full = if is_dir {
            format!("{dir}{name}{MAIN_SEPARATOR}")
        } else {
            format!("{dir}{name}")
        };
        found.push((is_dir, full));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.truncate(CANDIDATE_LIMIT);
    Some(found.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn edits_default_save_name() {
        let mut input = LineInput::new("result_problem.txt");
        for _ in 0..4 {
            input.handle(key(KeyCode::Backspace));
        }
        for ch in ".md".chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
        assert_eq!(input.value(), "result_problem.md");

        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "esult_problem.md");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn boundaries_do_not_panic() {
        let mut input = LineInput::new("");
        input.handle(key(KeyCode::Backspace));
        input.handle(key(KeyCode::Delete));
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Right));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn short_field_caps_length_and_ignores_tab() {
        let mut input = LineInput::short_field("2", 2);
        input.handle(key(KeyCode::Char('5')));
        input.handle(key(KeyCode::Char('9')));
        assert_eq!(input.value(), "25");
        assert_eq!(input.handle(key(KeyCode::Tab)), InputResult::Continue);
        assert_eq!(input.value(), "25");
        assert!(!input.completion_error);
    }

    #[test]
    fn ctrl_chords() {
        let mut input = LineInput::new("out/final result.txt");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "out/final ");
        input.handle(ctrl('a'));
        assert_eq!(input.cursor, 0);
        input.handle(ctrl('e'));
        assert_eq!(input.cursor, 10);
        input.handle(ctrl('u'));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn render_parts_split_around_cursor() {
        let mut input = LineInput::new("한글");
        assert_eq!(input.render_parts(), ("한글", None, ""));
        input.handle(key(KeyCode::Left));
        assert_eq!(input.render_parts(), ("한", Some('글'), ""));
    }

    #[test]
    fn submit_and_cancel() {
        let mut input = LineInput::new("x");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
    }

    #[test]
    fn tab_cycles_directory_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "").unwrap();
        std::fs::write(dir.path().join("beta.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("gamma")).unwrap();
        let mut input = LineInput::new(&format!("{}/", dir.path().display()));

        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("gamma{MAIN_SEPARATOR}")));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("alpha.txt"));
        input.handle(key(KeyCode::BackTab));
        assert!(input.value().ends_with(&format!("gamma{MAIN_SEPARATOR}")));

        input.handle(key(KeyCode::Char('x')));
        assert!(input.completion.is_none());
    }

    #[test]
    fn paste_inserts_at_cursor_without_line_breaks() {
        let mut input = LineInput::new("out/.txt");
        for _ in 0..4 {
            input.handle(key(KeyCode::Left));
        }
        input.insert_str("week 3\r\n");
        assert_eq!(input.value(), "out/week 3.txt");
        assert_eq!(input.cursor, 10);

        let mut count = LineInput::short_field("", 2);
        count.insert_str("123");
        assert_eq!(count.value(), "12");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_completes_with_separator() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("via")).unwrap();
        let mut input = LineInput::new(&format!("{}/vi", dir.path().display()));

        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("via{MAIN_SEPARATOR}")));
    }

    #[test]
    fn unreadable_dir_flags_error_until_next_key() {
        let mut input = LineInput::new("/nonexistent_vocabq_dir/");
        input.handle(key(KeyCode::Tab));
        assert!(input.completion_error);
        input.handle(key(KeyCode::Left));
        assert!(!input.completion_error);
    }

    #[test]
    fn candidates_sort_dirs_first_and_skip_hidden() {
        let entries: Vec<std::io::Result<(String, bool)>> = vec![
            Ok(("zeta.txt".to_string(), false)),
            Ok((".secret".to_string(), false)),
            Ok(("words".to_string(), true)),
            Ok(("beta.txt".to_string(), false)),
        ];
        let result = collect_candidates(entries.into_iter(), "pfx/", "").unwrap();
        assert_eq!(
            result,
            vec![
                format!("pfx/words{MAIN_SEPARATOR}"),
                "pfx/beta.txt".to_string(),
                "pfx/zeta.txt".to_string(),
            ]
        );
    }

    #[test]
    fn candidate_read_error_aborts_scan() {
        let entries: Vec<std::io::Result<(String, bool)>> = vec![
            Ok(("a".to_string(), false)),
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock")),
        ];
        assert!(collect_candidates(entries.into_iter(), "", "").is_none());
    }

    #[test]
    fn candidates_are_capped() {
        let entries = (0..300).map(|i| Ok((format!("item_{i:03}"), false)));
        assert_eq!(collect_candidates(entries, "", "item").unwrap().len(), 100);
    }
}
