//! User-facing dialogs
//!
//! The exporter never talks to a terminal or window directly. Confirmation
//! questions and blocking notifications go through [`Prompt`].

use std::cell::RefCell;

/// Confirmation and notification sink
pub trait Prompt {
    /// Ask a yes/no question. `true` means the user accepted.
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Show a blocking notification
    fn notify(&self, title: &str, message: &str);
}

/// A notification captured by [`ScriptedPrompt`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

/// Prompt with a fixed answer that records every notification
///
/// Used for non-interactive runs and in tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answer: bool,
    notices: RefCell<Vec<Notice>>,
}

impl ScriptedPrompt {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            notices: RefCell::new(Vec::new()),
        }
    }

    /// All notifications shown so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Number of notifications with the given title
    pub fn count_titled(&self, title: &str) -> usize {
        self.notices.borrow().iter().filter(|n| n.title == title).count()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.answer
    }

    fn notify(&self, title: &str, message: &str) {
        self.notices.borrow_mut().push(Notice {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompt_records() {
        let prompt = ScriptedPrompt::new(true);
        assert!(prompt.confirm("Export Scene", "?"));

        prompt.notify("Warning", "first");
        prompt.notify("Success", "done");
        prompt.notify("Warning", "second");

        assert_eq!(prompt.notices().len(), 3);
        assert_eq!(prompt.count_titled("Warning"), 2);
    }
}
