//! Builders for captchas delivered as a single image.

use crate::models::{CaptchaKind, CaptchaRequest, OptionValue};
use std::path::PathBuf;

/// Distorted-text image captcha.
///
/// # Example
/// ```ignore
/// let request = NormalCaptcha::new()
///     .file("images/normal.jpg")
///     .numeric(4)
///     .min_len(4)
///     .max_len(20)
///     .case_sensitive()
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct NormalCaptcha {
    request: CaptchaRequest,
}

common_options!(NormalCaptcha, CaptchaKind::Normal);

impl NormalCaptcha {
    /// Image on disk, uploaded as multipart (`method=post`).
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.remove("base64");
        self.request.remove("body");
        self.request.insert("file", OptionValue::File(path.into()));
        self
    }

    /// Base64-encoded image sent inline (`method=base64`).
    pub fn base64(mut self, data: impl Into<String>) -> Self {
        self.request.remove("file");
        self.request.insert("base64", data.into());
        self
    }

    /// `post` for multipart uploads, `base64` for inline images.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.insert("method", method.into());
        self
    }

    /// 0 - not specified
    /// 1 - only numbers
    /// 2 - only letters
    /// 3 - only numbers OR only letters
    /// 4 - both numbers AND letters
    pub fn numeric(mut self, value: u32) -> Self {
        self.request.insert("numeric", value);
        self
    }

    pub fn min_len(mut self, value: u32) -> Self {
        self.request.insert("minLen", value);
        self
    }

    pub fn max_len(mut self, value: u32) -> Self {
        self.request.insert("maxLen", value);
        self
    }

    /// Answer contains two or more words.
    pub fn phrase(mut self, value: bool) -> Self {
        self.request.insert("phrase", value);
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.request.insert("caseSensitive", true);
        self
    }

    /// Answer is the result of a calculation shown on the image.
    pub fn calc(mut self) -> Self {
        self.request.insert("calc", true);
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

/// Grid of tiles; the answer lists the tiles to click.
#[derive(Debug, Clone)]
pub struct GridCaptcha {
    request: CaptchaRequest,
}

common_options!(GridCaptcha, CaptchaKind::Grid);

impl GridCaptcha {
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.remove("base64");
        self.request.insert("file", OptionValue::File(path.into()));
        self
    }

    pub fn base64(mut self, data: impl Into<String>) -> Self {
        self.request.remove("file");
        self.request.insert("base64", data.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.insert("method", method.into());
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.request.insert("rows", rows);
        self
    }

    pub fn cols(mut self, cols: u32) -> Self {
        self.request.insert("cols", cols);
        self
    }

    /// Id of an earlier captcha with the same image, for dynamic grids.
    pub fn previous_id(mut self, id: impl Into<String>) -> Self {
        self.request.insert("previousId", id.into());
        self
    }

    /// Allow workers to answer "no matching images".
    pub fn can_skip(mut self) -> Self {
        self.request.insert("canSkip", true);
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

/// Draw a shape around an object. Requires a text or image hint.
#[derive(Debug, Clone)]
pub struct CanvasCaptcha {
    request: CaptchaRequest,
}

common_options!(CanvasCaptcha, CaptchaKind::Canvas);

impl CanvasCaptcha {
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.remove("base64");
        self.request.insert("file", OptionValue::File(path.into()));
        self
    }

    pub fn base64(mut self, data: impl Into<String>) -> Self {
        self.request.remove("file");
        self.request.insert("base64", data.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.insert("method", method.into());
        self
    }

    pub fn can_skip(mut self) -> Self {
        self.request.insert("canSkip", true);
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

/// Click points on an image; the answer is a list of coordinates.
#[derive(Debug, Clone)]
pub struct CoordinatesCaptcha {
    request: CaptchaRequest,
}

common_options!(CoordinatesCaptcha, CaptchaKind::Coordinates);

impl CoordinatesCaptcha {
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.remove("base64");
        self.request.insert("file", OptionValue::File(path.into()));
        self
    }

    pub fn base64(mut self, data: impl Into<String>) -> Self {
        self.request.remove("file");
        self.request.insert("base64", data.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.insert("method", method.into());
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
