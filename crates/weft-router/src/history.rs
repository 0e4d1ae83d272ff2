#![forbid(unsafe_code)]

//! Session history: an in-crate stand-in for browser history.
//!
//! A cursor over a stack of visited paths. Pushing while the cursor sits
//! behind the top truncates the forward entries, the same way a browser
//! drops its forward list on a fresh navigation.

/// Visited-path stack with a cursor.
#[derive(Clone, Debug)]
pub struct History {
    stack: Vec<String>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// A history positioned at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec!["/".to_owned()],
            cursor: 0,
        }
    }

    /// The path under the cursor.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.stack[self.cursor]
    }

    /// Number of entries (forward entries included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Always `false`: the initial entry never leaves the stack.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Append a new entry, dropping any forward entries first.
    pub fn push(&mut self, path: impl Into<String>) {
        self.stack.truncate(self.cursor + 1);
        self.stack.push(path.into());
        self.cursor += 1;
    }

    /// Replace the entry under the cursor.
    pub fn replace(&mut self, path: impl Into<String>) {
        self.stack[self.cursor] = path.into();
    }

    /// Step back. Returns the new current path, or `None` at the oldest
    /// entry.
    pub fn back(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward. Returns the new current path, or `None` at the newest
    /// entry.
    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.stack.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }
}
