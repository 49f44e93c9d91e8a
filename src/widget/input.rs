/// Draft text the user is composing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInput {
    draft: String,
}

impl ChatInput {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn push_str(&mut self, text: &str) {
        self.draft.push_str(text);
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }

    /// Trimmed draft, clearing the buffer. Blank drafts stay put and yield
    /// `None`.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.draft.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.draft.clear();
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_submission_trims_and_clears() {
        let mut input = ChatInput::default();
        input.set_draft("  track ");
        input.push_str("my order  ");

        assert_eq!(input.take_submission().as_deref(), Some("track my order"));
        assert_eq!(input.draft(), "");
    }

    #[test]
    fn test_blank_draft_is_not_submitted() {
        let mut input = ChatInput::default();
        input.set_draft("   \n");

        assert_eq!(input.take_submission(), None);
        assert_eq!(input.draft(), "   \n");
    }
}
