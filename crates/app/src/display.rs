//! Text display sink

/// What the display currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Empty,
    Text,
    Message,
}

/// Contents of the text area. Every `show_*` replaces what was there.
#[derive(Debug, Clone)]
pub struct TextDisplay {
    text: String,
    kind: DisplayKind,
}

impl TextDisplay {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            kind: DisplayKind::Empty,
        }
    }

    /// Recognized text
    pub fn show_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.kind = DisplayKind::Text;
    }

    /// Status or error message in place of text
    pub fn show_message(&mut self, message: impl Into<String>) {
        self.text = message.into();
        self.kind = DisplayKind::Message;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Editable buffer for the text widget
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn kind(&self) -> DisplayKind {
        self.kind
    }

    /// Holds recognized text worth copying or saving
    pub fn has_text(&self) -> bool {
        self.kind == DisplayKind::Text && !self.text.is_empty()
    }
}

impl Default for TextDisplay {
    fn default() -> Self {
        Self::new()
    }
}
