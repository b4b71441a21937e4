//! Rotate captcha: one or more images to turn upright.

use crate::models::{CaptchaKind, CaptchaRequest, OptionValue};
use std::path::PathBuf;

/// Up to nine images, uploaded as `file_1..file_9`.
#[derive(Debug, Clone)]
pub struct RotateCaptcha {
    request: CaptchaRequest,
}

common_options!(RotateCaptcha, CaptchaKind::Rotate);

impl RotateCaptcha {
    /// Single image; expanded to `file_1` before submission.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.insert("file", OptionValue::File(path.into()));
        self
    }

    pub fn files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files = paths.into_iter().map(Into::into).collect();
        self.request.insert("files", OptionValue::Files(files));
        self
    }

    /// Rotation step in degrees (default on the service side: 40).
    pub fn angle(mut self, degrees: u32) -> Self {
        self.request.insert("angle", degrees);
        self
    }

    pub fn hint_text(mut self, text: impl Into<String>) -> Self {
        self.request.insert("hintText", text.into());
        self
    }

    pub fn hint_img(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.insert("hintImg", OptionValue::File(path.into()));
        self
    }
}
