//! Plain text question, no image.

use crate::models::{CaptchaKind, CaptchaRequest};

#[derive(Debug, Clone)]
pub struct TextCaptcha {
    request: CaptchaRequest,
}

common_options!(TextCaptcha, CaptchaKind::Text);

impl TextCaptcha {
    /// The question, e.g. "If tomorrow is Saturday, what day is today?".
    pub fn text(mut self, question: impl Into<String>) -> Self {
        self.request.insert("text", question.into());
        self
    }
}
