/// Title bar of the open widget. Its minimize action is
/// [`super::ChatWidget::minimize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHeader {
    title: String,
    subtitle: Option<String>,
}

impl ChatHeader {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }
}

impl Default for ChatHeader {
    fn default() -> Self {
        Self::new("Chat with us")
    }
}
