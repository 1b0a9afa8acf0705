use std::collections::VecDeque;

/// Bounded undo/redo snapshots for one text buffer.
///
/// Recording a new edit always clears the redo side. When the undo side is
/// full the oldest snapshot is dropped.
#[derive(Clone, Debug)]
pub struct EditHistory {
    undo: VecDeque<String>,
    redo: Vec<String>,
    limit: usize,
}

impl EditHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the value a buffer had before an edit.
    pub fn record(&mut self, before: String) {
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Step back. `current` is parked on the redo side and the restored value
    /// is returned; `None` when there is nothing to undo.
    pub fn undo(&mut self, current: String) -> Option<String> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: String) -> Option<String> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Apply edits through the history the way the editor does.
    fn edit(history: &mut EditHistory, buffer: &mut String, next: &str) {
        history.record(buffer.clone());
        *buffer = next.to_string();
    }

    fn undo(history: &mut EditHistory, buffer: &mut String) {
        if let Some(prev) = history.undo(buffer.clone()) {
            *buffer = prev;
        }
    }

    fn redo(history: &mut EditHistory, buffer: &mut String) {
        if let Some(next) = history.redo(buffer.clone()) {
            *buffer = next;
        }
    }

    #[test]
    fn undo_k_times_restores_earlier_state_and_redo_returns() {
        let states = ["a", "ab", "abc", "abcd", "abcde"];
        for k in 0..=states.len() {
            let mut history = EditHistory::new(100);
            let mut buffer = String::new();
            for s in states {
                edit(&mut history, &mut buffer, s);
            }

            for _ in 0..k {
                undo(&mut history, &mut buffer);
            }
            let expected = if k == states.len() { "" } else { states[states.len() - 1 - k] };
            assert_eq!(buffer, expected, "after {k} undos");

            for _ in 0..k {
                redo(&mut history, &mut buffer);
            }
            assert_eq!(buffer, "abcde", "after {k} redos");
        }
    }

    #[test]
    fn new_edit_after_undo_clears_redo() {
        let mut history = EditHistory::new(10);
        let mut buffer = String::new();
        edit(&mut history, &mut buffer, "one");
        edit(&mut history, &mut buffer, "two");
        undo(&mut history, &mut buffer);
        assert!(history.can_redo());

        edit(&mut history, &mut buffer, "three");
        assert!(!history.can_redo());
        redo(&mut history, &mut buffer);
        assert_eq!(buffer, "three");
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut history = EditHistory::new(10);
        assert_eq!(history.undo("x".to_string()), None);
        assert_eq!(history.redo("x".to_string()), None);
        assert!(!history.can_undo());
    }

    #[test]
    fn limit_drops_oldest_snapshot() {
        let mut history = EditHistory::new(3);
        let mut buffer = String::new();
        for s in ["1", "2", "3", "4", "5"] {
            edit(&mut history, &mut buffer, s);
        }
        assert_eq!(history.undo_len(), 3);
        for _ in 0..10 {
            undo(&mut history, &mut buffer);
        }
        // "" and "1" fell off the front.
        assert_eq!(buffer, "2");
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        let mut history = EditHistory::new(0);
        history.record("a".to_string());
        history.record("b".to_string());
        assert_eq!(history.undo_len(), 1);
    }
}
