//! # twocaptcha
//!
//! An async Rust client for the 2captcha solving service.
//!
//! ## Features
//!
//! - **Every Captcha Kind**: Normal images, grid, canvas, coordinates, rotate,
//!   text questions, reCAPTCHA v2/v3, hCaptcha, GeeTest, FunCaptcha and Capy.
//! - **Submit/Poll Engine**: One engine validates, submits to `in.php` and polls
//!   `res.php` until the answer is ready, the timeout is hit, or the caller cancels.
//! - **Pingbacks**: With a callback URL registered, `solve` returns right after
//!   submission and the service delivers the answer to that URL.
//! - **Pluggable Transport**: Ships an `rquest` transport with proxy support;
//!   bring your own by implementing [`Transport`].
//! - **Async/Await**: Built on Tokio; one client can drive many solves at once.
//!
//! ## Quick Start
//!
//! ```ignore
//! use twocaptcha::{NormalCaptcha, TwoCaptcha};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TwoCaptcha::builder("YOUR_API_KEY").build()?;
//!
//!     let result = client
//!         .solve(
//!             NormalCaptcha::new()
//!                 .file("images/normal.jpg")
//!                 .min_len(4)
//!                 .case_sensitive(),
//!         )
//!         .await?;
//!
//!     println!("captcha_id: {}", result.captcha_id);
//!     println!("code: {:?}", result.code);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Token Captchas
//!
//! ```ignore
//! use twocaptcha::{ProxyConfig, ProxyType, ReCaptcha};
//!
//! let result = client
//!     .solve(
//!         ReCaptcha::new()
//!             .sitekey("6Le-wvkSVVABCPBMRTvw0Q4Muexq1bi0DJwx_mJ-")
//!             .url("https://www.google.com/recaptcha/api2/demo")
//!             .proxy(ProxyConfig::new(ProxyType::Http, "login:password@1.2.3.4:3128")),
//!     )
//!     .await?;
//! ```
//!
//! ## Errors
//!
//! - `Validation` - rejected locally, nothing was sent
//! - `Api` - the service answered with an error code (kept verbatim)
//! - `Network` - transport failure; tolerated while polling
//! - `Timeout` - no answer within the wait budget

// Allow missing docs for internal types for now
#![allow(missing_docs)]

pub mod captcha;
pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod models;
pub mod params;
pub mod transport;

// Re-exports for convenience
pub use captcha::{
    CanvasCaptcha, Capy, CoordinatesCaptcha, FunCaptcha, GeeTest, GridCaptcha, HCaptcha,
    NormalCaptcha, ReCaptcha, RotateCaptcha, TextCaptcha,
};
pub use client::{TwoCaptcha, TwoCaptchaBuilder};
pub use config::ClientConfig;
pub use error::{Result, TwoCaptchaError};
pub use models::{
    CaptchaKind, CaptchaRequest, OptionValue, ProxyConfig, ProxyType, SolveResult, WaitOptions,
};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(CaptchaKind::Normal.as_str(), "normal");
        assert_eq!(CaptchaKind::ReCaptcha.as_str(), "recaptcha");
        assert_eq!(CaptchaKind::HCaptcha.to_string(), "hcaptcha");
        assert_eq!(CaptchaKind::GeeTest.to_string(), "geetest");
    }

    #[test]
    fn test_token_kinds() {
        assert!(CaptchaKind::FunCaptcha.is_token_based());
        assert!(!CaptchaKind::Rotate.is_token_based());
    }
}
