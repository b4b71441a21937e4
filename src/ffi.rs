//! C FFI bindings for twocaptcha.
//!
//! Provides a simple blocking API for solving captchas from C, Python, Go, etc.
//!
//! # Example (C)
//!
//! ```c
//! #include "twocaptcha.h"
//!
//! int main() {
//!     TwoCaptchaResult result = twocaptcha_solve_image("API_KEY", "captcha.jpg");
//!     if (result.error_code == 0) {
//!         printf("Answer: %s\n", result.code);
//!     }
//!     twocaptcha_free_result(result);
//!     return 0;
//! }
//! ```

use std::ffi::{c_char, CStr, CString};
use std::path::PathBuf;
use std::ptr;

use crate::models::{CaptchaKind, CaptchaRequest, OptionValue, ProxyConfig};
use crate::{NormalCaptcha, ReCaptcha, SolveResult, TwoCaptcha};

/// Result structure returned by solve functions.
///
/// All string fields are heap-allocated and must be freed with `twocaptcha_free_result`.
#[repr(C)]
pub struct TwoCaptchaResult {
    /// 0 = success, non-zero = error
    pub error_code: i32,
    /// Error message if error_code != 0, NULL otherwise
    pub error_message: *mut c_char,
    /// Id assigned by the service
    pub captcha_id: *mut c_char,
    /// Answer, NULL when a pingback URL receives it instead
    pub code: *mut c_char,
}

impl TwoCaptchaResult {
    fn success(result: SolveResult) -> Self {
        Self {
            error_code: 0,
            error_message: ptr::null_mut(),
            captcha_id: string_to_ptr(result.captcha_id),
            code: result.code.map(string_to_ptr).unwrap_or(ptr::null_mut()),
        }
    }

    fn error(code: i32, message: String) -> Self {
        Self {
            error_code: code,
            error_message: string_to_ptr(message),
            captcha_id: ptr::null_mut(),
            code: ptr::null_mut(),
        }
    }
}

/// Convert Rust String to C string pointer.
fn string_to_ptr(s: String) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Convert C string to Rust String, returns None if null or invalid UTF-8.
unsafe fn ptr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Build a request from a JSON object of friendly option names.
///
/// `file`, `hintImg` and `file_N` become uploads, `files` a list of uploads,
/// `proxy` an `{"type": ..., "uri": ...}` object.
fn request_from_json(kind: CaptchaKind, json: &str) -> crate::Result<CaptchaRequest> {
    let options: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
    let mut request = CaptchaRequest::new(kind);

    for (key, value) in options {
        let value = match (key.as_str(), value) {
            ("proxy", value) => OptionValue::Proxy(serde_json::from_value::<ProxyConfig>(value)?),
            ("files", serde_json::Value::Array(items)) => OptionValue::Files(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(PathBuf::from))
                    .collect(),
            ),
            (k, serde_json::Value::String(s)) if k == "file" || k == "hintImg" || k.starts_with("file_") => {
                OptionValue::File(PathBuf::from(s))
            }
            (_, serde_json::Value::String(s)) => OptionValue::Text(s),
            (_, serde_json::Value::Bool(b)) => OptionValue::Bool(b),
            (_, serde_json::Value::Number(n)) => match n.as_i64() {
                Some(i) => OptionValue::Int(i),
                None => OptionValue::Float(n.as_f64().unwrap_or_default()),
            },
            (k, other) => {
                return Err(crate::TwoCaptchaError::Validation(format!(
                    "Unsupported value for '{}': {}",
                    k, other
                )))
            }
        };
        request.insert(key, value);
    }

    Ok(request)
}

/// Run one solve on a fresh current-thread runtime.
fn block_on_solve(api_key: String, request: CaptchaRequest) -> TwoCaptchaResult {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => return TwoCaptchaResult::error(4, format!("Failed to create runtime: {}", e)),
    };

    runtime.block_on(async {
        let client = match TwoCaptcha::builder(api_key).build() {
            Ok(c) => c,
            Err(e) => return TwoCaptchaResult::error(5, format!("Failed to build client: {}", e)),
        };

        match client.solve(request).await {
            Ok(result) => TwoCaptchaResult::success(result),
            Err(e) => TwoCaptchaResult::error(6, format!("Solve failed: {}", e)),
        }
    })
}

/// Solve an image captcha from a file on disk (blocking).
///
/// # Safety
///
/// - `api_key` must be a valid null-terminated C string
/// - `path` must be a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn twocaptcha_solve_image(
    api_key: *const c_char,
    path: *const c_char,
) -> TwoCaptchaResult {
    let api_key = match ptr_to_string(api_key) {
        Some(s) if !s.is_empty() => s,
        _ => return TwoCaptchaResult::error(1, "api_key is required".to_string()),
    };

    let path = match ptr_to_string(path) {
        Some(s) => s,
        None => return TwoCaptchaResult::error(2, "path is required".to_string()),
    };

    block_on_solve(api_key, NormalCaptcha::new().file(path).build())
}

/// Solve a reCAPTCHA v2 (blocking).
///
/// # Safety
///
/// - `api_key`, `sitekey` and `url` must be valid null-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn twocaptcha_solve_recaptcha(
    api_key: *const c_char,
    sitekey: *const c_char,
    url: *const c_char,
) -> TwoCaptchaResult {
    let api_key = match ptr_to_string(api_key) {
        Some(s) if !s.is_empty() => s,
        _ => return TwoCaptchaResult::error(1, "api_key is required".to_string()),
    };

    let (sitekey, url) = match (ptr_to_string(sitekey), ptr_to_string(url)) {
        (Some(k), Some(u)) => (k, u),
        _ => return TwoCaptchaResult::error(2, "sitekey and url are required".to_string()),
    };

    block_on_solve(api_key, ReCaptcha::new().sitekey(sitekey).url(url).build())
}

/// Solve any captcha kind from a JSON options object and return JSON (blocking).
///
/// # Returns
///
/// A JSON string on success:
/// ```json
/// {"success": true, "captcha_id": "...", "code": "..."}
/// ```
///
/// Or on error:
/// ```json
/// {"success": false, "error": "error message"}
/// ```
///
/// The caller must free the string with `twocaptcha_free_string`.
///
/// # Safety
///
/// - `api_key`, `kind` and `options_json` must be valid null-terminated C strings
#[no_mangle]
pub unsafe extern "C" fn twocaptcha_solve_json(
    api_key: *const c_char,
    kind: *const c_char,
    options_json: *const c_char,
) -> *mut c_char {
    let result = match (ptr_to_string(api_key), ptr_to_string(kind), ptr_to_string(options_json)) {
        (Some(api_key), Some(kind), Some(options)) => {
            match kind
                .parse::<CaptchaKind>()
                .and_then(|kind| request_from_json(kind, &options))
            {
                Ok(request) => block_on_solve(api_key, request),
                Err(e) => TwoCaptchaResult::error(3, e.to_string()),
            }
        }
        _ => TwoCaptchaResult::error(1, "api_key, kind and options_json are required".to_string()),
    };

    let json = if result.error_code == 0 {
        let captcha_id = ptr_to_string(result.captcha_id).unwrap_or_default();
        let code = ptr_to_string(result.code);

        // Free the result strings since we've copied them
        twocaptcha_free_result(result);

        serde_json::json!({
            "success": true,
            "captcha_id": captcha_id,
            "code": code
        })
        .to_string()
    } else {
        let error =
            ptr_to_string(result.error_message).unwrap_or_else(|| "Unknown error".to_string());
        twocaptcha_free_result(result);

        serde_json::json!({
            "success": false,
            "error": error
        })
        .to_string()
    };

    string_to_ptr(json)
}

/// Get the account balance (blocking).
///
/// Returns 0 and writes the balance to `out_balance` on success.
///
/// # Safety
///
/// - `api_key` must be a valid null-terminated C string
/// - `out_balance` must be a valid, writable pointer
#[no_mangle]
pub unsafe extern "C" fn twocaptcha_balance(api_key: *const c_char, out_balance: *mut f64) -> i32 {
    if out_balance.is_null() {
        return 2;
    }
    let api_key = match ptr_to_string(api_key) {
        Some(s) if !s.is_empty() => s,
        _ => return 1,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 4,
    };

    let balance = runtime.block_on(async {
        let client = TwoCaptcha::builder(api_key).build()?;
        client.balance().await
    });

    match balance {
        Ok(amount) => {
            *out_balance = amount;
            0
        }
        Err(e) => {
            tracing::error!("Balance request failed: {}", e);
            6
        }
    }
}

/// Free a TwoCaptchaResult structure.
///
/// # Safety
///
/// - `result` must be a valid TwoCaptchaResult previously returned by this library
/// - Each result must only be freed once
#[no_mangle]
pub unsafe extern "C" fn twocaptcha_free_result(result: TwoCaptchaResult) {
    if !result.error_message.is_null() {
        let _ = CString::from_raw(result.error_message);
    }
    if !result.captcha_id.is_null() {
        let _ = CString::from_raw(result.captcha_id);
    }
    if !result.code.is_null() {
        let _ = CString::from_raw(result.code);
    }
}

/// Free a string returned by twocaptcha FFI functions.
///
/// # Safety
///
/// - `s` must be NULL or a valid pointer previously returned by twocaptcha
/// - Each string must only be freed once
#[no_mangle]
pub unsafe extern "C" fn twocaptcha_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Get the library version.
///
/// # Returns
///
/// A static string with the version number. Do NOT free this string.
#[no_mangle]
pub extern "C" fn twocaptcha_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json() {
        let request = request_from_json(
            CaptchaKind::ReCaptcha,
            r#"{"sitekey":"K","url":"https://example.com","invisible":1,
                "proxy":{"type":"HTTPS","uri":"login:pass@1.2.3.4:3128"}}"#,
        )
        .unwrap();

        assert_eq!(request.get("sitekey"), Some(&OptionValue::Text("K".into())));
        assert_eq!(request.get("invisible"), Some(&OptionValue::Int(1)));
        assert!(matches!(request.get("proxy"), Some(OptionValue::Proxy(_))));
    }

    #[test]
    fn test_request_from_json_files() {
        let request = request_from_json(
            CaptchaKind::Rotate,
            r#"{"files":["a.jpg","b.jpg"],"hintImg":"hint.png"}"#,
        )
        .unwrap();

        assert_eq!(
            request.get("files"),
            Some(&OptionValue::Files(vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]))
        );
        assert_eq!(request.get("hintImg"), Some(&OptionValue::File(PathBuf::from("hint.png"))));
    }

    #[test]
    fn test_missing_api_key() {
        let result = unsafe { twocaptcha_solve_image(ptr::null(), ptr::null()) };
        assert_eq!(result.error_code, 1);
        unsafe { twocaptcha_free_result(result) };
    }
}
