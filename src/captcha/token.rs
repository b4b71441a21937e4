//! Token-based captchas: the service loads the target page and returns a
//! response token instead of reading an uploaded image.

use crate::models::{CaptchaKind, CaptchaRequest, ProxyConfig};

/// Google reCAPTCHA v2 / v3. Polled with the longer reCAPTCHA timeout.
///
/// # Example
/// ```ignore
/// let request = ReCaptcha::new()
///     .sitekey("6Le-wvkSVVABCPBMRTvw0Q4Muexq1bi0DJwx_mJ-")
///     .url("https://www.google.com/recaptcha/api2/demo")
///     .invisible()
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ReCaptcha {
    request: CaptchaRequest,
}

common_options!(ReCaptcha, CaptchaKind::ReCaptcha);

impl ReCaptcha {
    /// Value of the `data-sitekey` attribute.
    pub fn sitekey(mut self, key: impl Into<String>) -> Self {
        self.request.insert("sitekey", key.into());
        self
    }

    /// Full URL of the page showing the captcha.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.insert("url", url.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.request.insert("version", version.into());
        self
    }

    pub fn v3(self) -> Self {
        self.version("v3")
    }

    /// reCAPTCHA v3 action name.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.request.insert("action", action.into());
        self
    }

    /// Minimum reCAPTCHA v3 score (0.3, 0.7 or 0.9).
    pub fn score(mut self, score: f64) -> Self {
        self.request.insert("score", score);
        self
    }

    pub fn invisible(mut self) -> Self {
        self.request.insert("invisible", 1u32);
        self
    }

    pub fn enterprise(mut self) -> Self {
        self.request.insert("enterprise", 1u32);
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.request.insert("proxy", proxy);
        self
    }
}

/// hCaptcha.
#[derive(Debug, Clone)]
pub struct HCaptcha {
    request: CaptchaRequest,
}

common_options!(HCaptcha, CaptchaKind::HCaptcha);

impl HCaptcha {
    pub fn sitekey(mut self, key: impl Into<String>) -> Self {
        self.request.insert("sitekey", key.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.insert("url", url.into());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.request.insert("invisible", 1u32);
        self
    }

    /// Custom `rqdata` value some sites pass to hCaptcha.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.request.insert("data", data.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.request.insert("proxy", proxy);
        self
    }
}

/// GeeTest v3 slider.
#[derive(Debug, Clone)]
pub struct GeeTest {
    request: CaptchaRequest,
}

common_options!(GeeTest, CaptchaKind::GeeTest);

impl GeeTest {
    pub fn gt(mut self, gt: impl Into<String>) -> Self {
        self.request.insert("gt", gt.into());
        self
    }

    /// Fresh challenge value; they expire quickly.
    pub fn challenge(mut self, challenge: impl Into<String>) -> Self {
        self.request.insert("challenge", challenge.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.insert("url", url.into());
        self
    }

    /// Custom GeeTest API domain, e.g. `api-na.geetest.com`.
    pub fn api_server(mut self, server: impl Into<String>) -> Self {
        self.request.insert("apiServer", server.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.request.insert("proxy", proxy);
        self
    }
}

/// Arkose Labs FunCaptcha. The public key goes in `sitekey`.
#[derive(Debug, Clone)]
pub struct FunCaptcha {
    request: CaptchaRequest,
}

common_options!(FunCaptcha, CaptchaKind::FunCaptcha);

impl FunCaptcha {
    pub fn sitekey(mut self, key: impl Into<String>) -> Self {
        self.request.insert("sitekey", key.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.insert("url", url.into());
        self
    }

    /// Service URL (`surl`) shown in the page source.
    pub fn surl(mut self, surl: impl Into<String>) -> Self {
        self.request.insert("surl", surl.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.request.insert("data", data.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.request.insert("proxy", proxy);
        self
    }
}

/// Capy puzzle. The captcha key goes in `sitekey`.
#[derive(Debug, Clone)]
pub struct Capy {
    request: CaptchaRequest,
}

common_options!(Capy, CaptchaKind::Capy);

impl Capy {
    pub fn sitekey(mut self, key: impl Into<String>) -> Self {
        self.request.insert("sitekey", key.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.insert("url", url.into());
        self
    }

    pub fn api_server(mut self, server: impl Into<String>) -> Self {
        self.request.insert("apiServer", server.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.request.insert("proxy", proxy);
        self
    }
}
