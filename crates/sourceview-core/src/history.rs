//! Input-entry histories.
//!
//! Histories are keyed by the entry's placeholder text, so every "Find" prompt shares one list
//! and every "Replace" prompt another. The store is an ordinary owned value; entries hold a
//! [`SharedHistory`] handle to it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Most recent first, per placeholder.
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    histories: HashMap<String, Vec<String>>,
}

/// A history store shared between the entries of one application context.
pub type SharedHistory = Rc<RefCell<HistoryStore>>;

impl HistoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store behind a shareable handle.
    pub fn shared() -> SharedHistory {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Record `text` as the most recent entry for `key`, unless it already is.
    pub fn record(&mut self, key: &str, text: &str) {
        let history = self.histories.entry(key.to_string()).or_default();
        if history.first().is_some_and(|latest| latest == text) {
            return;
        }
        history.insert(0, text.to_string());
    }

    /// Entries for `key`, most recent first.
    pub fn entries(&self, key: &str) -> &[String] {
        self.histories.get(key).map_or(&[], Vec::as_slice)
    }
}

/// A single-line text input with history navigation.
#[derive(Debug)]
pub struct InputEntry {
    placeholder: String,
    text: String,
    selected: Option<usize>,
    history: SharedHistory,
}

impl InputEntry {
    /// Create an entry showing `content`.
    pub fn new(placeholder: impl Into<String>, content: impl Into<String>, history: SharedHistory) -> Self {
        Self {
            placeholder: placeholder.into(),
            text: content.into(),
            selected: None,
            history,
        }
    }

    /// The history key.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a typed character.
    pub fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Remove the last character.
    pub fn pop_char(&mut self) -> Option<char> {
        self.text.pop()
    }

    /// Commit the current text to the history and return it.
    pub fn activate(&mut self) -> String {
        self.history.borrow_mut().record(&self.placeholder, &self.text);
        self.selected = None;
        self.text.clone()
    }

    /// Show the next older history entry. Returns `false` if the history is empty.
    pub fn history_up(&mut self) -> bool {
        let history = self.history.borrow();
        let entries = history.entries(&self.placeholder);
        if entries.is_empty() {
            return false;
        }
        let next = match self.selected {
            Some(idx) => idx + 1,
            None if entries[0] == self.text => 1,
            None => 0,
        };
        let idx = next.min(entries.len() - 1);
        self.text = entries[idx].clone();
        self.selected = Some(idx);
        true
    }

    /// Show the next newer history entry. Returns `false` if not browsing the history.
    pub fn history_down(&mut self) -> bool {
        let Some(idx) = self.selected else {
            return false;
        };
        let history = self.history.borrow();
        let idx = idx.saturating_sub(1);
        let Some(entry) = history.entries(&self.placeholder).get(idx) else {
            return false;
        };
        self.text = entry.clone();
        self.selected = Some(idx);
        true
    }
}
