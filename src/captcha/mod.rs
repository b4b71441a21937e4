//! Request builders for every captcha kind, plus the per-kind rules run
//! right before submission.
//!
//! Builders never validate: setters only record options. [`prepare`] checks
//! the request and fills in the kind's fixed parameters (`method`, flags).

use crate::error::{Result, TwoCaptchaError};
use crate::models::{CaptchaKind, CaptchaRequest, OptionValue};
use crate::params::FILES_LIMIT;

/// Setters and conversions shared by every builder.
macro_rules! common_options {
    ($builder:ident, $kind:expr) => {
        impl $builder {
            pub fn new() -> Self {
                Self {
                    request: $crate::models::CaptchaRequest::new($kind),
                }
            }

            /// Language code of the captcha text (`en`, `ru`, ...).
            pub fn lang(mut self, value: impl Into<String>) -> Self {
                self.request.insert("lang", value.into());
                self
            }

            /// Pingback URL for this captcha only, overriding the client default.
            pub fn callback(mut self, url: impl Into<String>) -> Self {
                self.request.insert("callback", url.into());
                self
            }

            /// Opt out of the client's default pingback for this captcha.
            pub fn no_callback(mut self) -> Self {
                self.request.insert("callback", false);
                self
            }

            pub fn soft_id(mut self, id: u32) -> Self {
                self.request.insert("softId", id);
                self
            }

            /// Any other parameter the service accepts, sent as-is.
            pub fn option(
                mut self,
                key: impl Into<String>,
                value: impl Into<$crate::models::OptionValue>,
            ) -> Self {
                self.request.insert(key, value);
                self
            }

            pub fn build(self) -> $crate::models::CaptchaRequest {
                self.request
            }
        }

        impl Default for $builder {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<$builder> for $crate::models::CaptchaRequest {
            fn from(builder: $builder) -> Self {
                builder.request
            }
        }
    };
}

mod image;
mod rotate;
mod text;
mod token;

pub use image::{CanvasCaptcha, CoordinatesCaptcha, GridCaptcha, NormalCaptcha};
pub use rotate::RotateCaptcha;
pub use text::TextCaptcha;
pub use token::{Capy, FunCaptcha, GeeTest, HCaptcha, ReCaptcha};

/// Validate a request and fill in its kind-specific parameters.
///
/// Runs before anything is sent; every failure is a
/// [`TwoCaptchaError::Validation`].
pub fn prepare(mut request: CaptchaRequest) -> Result<CaptchaRequest> {
    match request.kind() {
        CaptchaKind::Normal => {
            require_file_or_base64(&request, "file")?;
            if request.method().is_none() {
                let method = if request.contains("file") { "post" } else { "base64" };
                request.insert("method", method);
            }
        }
        CaptchaKind::Grid => {
            require_file_or_base64(&request, "file")?;
            default_method(&mut request);
        }
        CaptchaKind::Canvas => {
            require_file_or_base64(&request, "file")?;
            default_method(&mut request);
            request.insert("recaptcha", 1u32);
            request.insert("canvas", 1u32);
            if !request.is_set("hintText") && !request.is_set("hintImg") {
                return Err(TwoCaptchaError::Validation(
                    "At least one of parameters: hintText or hintImg required!".into(),
                ));
            }
        }
        CaptchaKind::Coordinates => {
            require_file_or_base64(&request, "file")?;
            default_method(&mut request);
            request.insert("coordinatescaptcha", 1u32);
        }
        CaptchaKind::Rotate => {
            match request.remove("file") {
                Some(OptionValue::File(file)) => {
                    request.insert("files", OptionValue::Files(vec![file]));
                }
                Some(_) => {
                    return Err(TwoCaptchaError::Validation(
                        "Parameter file must be a file path".into(),
                    ));
                }
                None => {}
            }
            if !request.contains("files") {
                return Err(TwoCaptchaError::Validation("File required".into()));
            }
            prepare_files_list(&mut request)?;
            request.insert("method", "rotatecaptcha");
        }
        CaptchaKind::Text => {
            require_fields(&request, &["text"])?;
            request.insert("method", "post");
        }
        CaptchaKind::ReCaptcha => {
            require_fields(&request, &["sitekey", "url"])?;
            request.insert("method", "userrecaptcha");
        }
        CaptchaKind::HCaptcha => {
            require_fields(&request, &["sitekey", "url"])?;
            request.insert("method", "hcaptcha");
        }
        CaptchaKind::GeeTest => {
            require_fields(&request, &["gt", "challenge", "url"])?;
            request.insert("method", "geetest");
        }
        CaptchaKind::FunCaptcha => {
            require_fields(&request, &["sitekey", "url"])?;
            request.insert("method", "funcaptcha");
        }
        CaptchaKind::Capy => {
            require_fields(&request, &["sitekey", "url"])?;
            request.insert("method", "capy");
        }
    }

    Ok(request)
}

fn default_method(request: &mut CaptchaRequest) {
    if request.method().is_none() {
        request.insert("method", "post");
    }
}

/// Require an inline base64 body, or an existing file at `key`.
pub fn require_file_or_base64(request: &CaptchaRequest, key: &str) -> Result<()> {
    if request.is_set("base64") || request.is_set("body") {
        return Ok(());
    }

    match request.get(key) {
        Some(OptionValue::File(path)) if !path.as_os_str().is_empty() => {
            if path.exists() {
                Ok(())
            } else {
                Err(TwoCaptchaError::Validation(format!(
                    "File not found ({})",
                    path.display()
                )))
            }
        }
        _ => Err(TwoCaptchaError::Validation("File required".into())),
    }
}

/// Expand the `files` list into `file_1..file_n`, checking count and existence.
pub fn prepare_files_list(request: &mut CaptchaRequest) -> Result<()> {
    let files = match request.remove("files") {
        Some(OptionValue::Files(files)) => files,
        Some(OptionValue::File(file)) => vec![file],
        Some(_) => {
            return Err(TwoCaptchaError::Validation(
                "Parameter files must be a list of file paths".into(),
            ));
        }
        None => Vec::new(),
    };

    for (i, file) in files.into_iter().enumerate() {
        if i >= FILES_LIMIT {
            return Err(TwoCaptchaError::Validation(format!(
                "Too many files (max: {})",
                FILES_LIMIT
            )));
        }
        if !file.exists() {
            return Err(TwoCaptchaError::Validation(format!(
                "File not found ({})",
                file.display()
            )));
        }
        request.insert(format!("file_{}", i + 1), OptionValue::File(file));
    }

    Ok(())
}

fn require_fields(request: &CaptchaRequest, keys: &[&str]) -> Result<()> {
    for key in keys {
        if !request.is_set(key) {
            return Err(TwoCaptchaError::Validation(format!("Parameter {} required", key)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn images(dir: &tempfile::TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("rotate_{}.jpg", i));
                std::fs::write(&path, b"jpeg").unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_file_required() {
        let err = prepare(NormalCaptcha::new().min_len(4).build()).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: File required");
    }

    #[test]
    fn test_file_not_found() {
        let request = NormalCaptcha::new().file("/definitely/not/here.jpg").build();
        let err = prepare(request).unwrap_err();
        assert!(err.to_string().contains("File not found (/definitely/not/here.jpg)"));
    }

    #[test]
    fn test_base64_skips_file_check() {
        let request = prepare(NormalCaptcha::new().base64("R0lGODlh").build()).unwrap();
        assert_eq!(request.method(), Some("base64"));
    }

    #[test]
    fn test_normal_defaults_to_post() {
        let dir = tempfile::tempdir().unwrap();
        let file = images(&dir, 1).remove(0);
        let request = prepare(NormalCaptcha::new().file(file).build()).unwrap();
        assert_eq!(request.method(), Some("post"));
    }

    #[test]
    fn test_canvas_requires_hint() {
        let request = CanvasCaptcha::new().base64("R0lGODlh").build();
        assert!(matches!(prepare(request), Err(TwoCaptchaError::Validation(_))));

        let request = prepare(
            CanvasCaptcha::new()
                .base64("R0lGODlh")
                .hint_text("Draw around the cat")
                .build(),
        )
        .unwrap();
        assert!(request.is_set("canvas"));
        assert!(request.is_set("recaptcha"));
    }

    #[test]
    fn test_coordinates_flag() {
        let request = prepare(CoordinatesCaptcha::new().base64("R0lGODlh").build()).unwrap();
        assert!(request.is_set("coordinatescaptcha"));
        assert_eq!(request.method(), Some("post"));
    }

    #[test]
    fn test_prepare_files_list_nine() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = RotateCaptcha::new().files(images(&dir, 9)).build();

        prepare_files_list(&mut request).unwrap();

        assert!(!request.contains("files"));
        for i in 1..=9 {
            assert!(request.contains(&format!("file_{}", i)));
        }
        assert!(!request.contains("file_10"));
    }

    #[test]
    fn test_prepare_files_list_ten() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = RotateCaptcha::new().files(images(&dir, 10)).build();

        let err = prepare_files_list(&mut request).unwrap_err();
        assert!(err.to_string().contains("Too many files (max: 9)"));
    }

    #[test]
    fn test_prepare_files_list_missing() {
        let mut request = RotateCaptcha::new()
            .files(vec![PathBuf::from("/nope/rotate.jpg")])
            .build();
        let err = prepare_files_list(&mut request).unwrap_err();
        assert!(err.to_string().contains("File not found (/nope/rotate.jpg)"));
    }

    #[test]
    fn test_prepare_files_list_checks_each_file_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = vec![PathBuf::from("/nope/first.jpg")];
        files.extend(images(&dir, 9));
        let mut request = RotateCaptcha::new().files(files).build();

        let err = prepare_files_list(&mut request).unwrap_err();
        assert!(err.to_string().contains("File not found (/nope/first.jpg)"));
    }

    #[test]
    fn test_rotate_rejects_non_path_file() {
        let request = RotateCaptcha::new().option("file", "a.jpg").build();
        let err = prepare(request).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Parameter file must be a file path"
        );

        let request = RotateCaptcha::new().option("files", "a.jpg").build();
        assert!(matches!(prepare(request), Err(TwoCaptchaError::Validation(_))));
    }

    #[test]
    fn test_rotate_expands_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = images(&dir, 1).remove(0);
        let request = prepare(RotateCaptcha::new().file(file.clone()).angle(40).build()).unwrap();

        assert_eq!(request.method(), Some("rotatecaptcha"));
        assert_eq!(request.get("file_1"), Some(&OptionValue::File(file)));
        assert!(!request.contains("file"));
        assert!(!request.contains("files"));
    }

    #[test]
    fn test_token_kinds_force_method() {
        let request = prepare(
            ReCaptcha::new()
                .sitekey("6Le-wvkSVVABCPBMRTvw0Q4Muexq1bi0DJwx_mJ-")
                .url("https://example.com")
                .build(),
        )
        .unwrap();
        assert_eq!(request.method(), Some("userrecaptcha"));

        let err = prepare(HCaptcha::new().url("https://example.com").build()).unwrap_err();
        assert!(err.to_string().contains("sitekey"));
    }

    #[test]
    fn test_text_requires_question() {
        assert!(prepare(TextCaptcha::new().build()).is_err());
        let request = prepare(TextCaptcha::new().text("If tomorrow is Saturday, what day is today?").build()).unwrap();
        assert_eq!(request.method(), Some("post"));
    }
}
