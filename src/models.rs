//! Data models shared by the request builders, the parameter mapper and the client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::TwoCaptchaError;

/// Supported captcha kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptchaKind {
    /// Distorted text on an image
    Normal,
    /// Click the matching tiles of a grid image
    Grid,
    /// Draw around an object on an image
    Canvas,
    /// Click points on an image
    Coordinates,
    /// Rotate one or more images upright
    Rotate,
    /// Text question, no image
    Text,
    /// Google reCAPTCHA v2/v3
    ReCaptcha,
    /// hCaptcha
    HCaptcha,
    /// GeeTest v3
    GeeTest,
    /// Arkose Labs FunCaptcha
    FunCaptcha,
    /// Capy puzzle
    Capy,
}

impl CaptchaKind {
    /// Returns the lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptchaKind::Normal => "normal",
            CaptchaKind::Grid => "grid",
            CaptchaKind::Canvas => "canvas",
            CaptchaKind::Coordinates => "coordinates",
            CaptchaKind::Rotate => "rotate",
            CaptchaKind::Text => "text",
            CaptchaKind::ReCaptcha => "recaptcha",
            CaptchaKind::HCaptcha => "hcaptcha",
            CaptchaKind::GeeTest => "geetest",
            CaptchaKind::FunCaptcha => "funcaptcha",
            CaptchaKind::Capy => "capy",
        }
    }

    /// Kinds solved from a site key rather than an uploaded image.
    pub fn is_token_based(&self) -> bool {
        matches!(
            self,
            CaptchaKind::ReCaptcha
                | CaptchaKind::HCaptcha
                | CaptchaKind::GeeTest
                | CaptchaKind::FunCaptcha
                | CaptchaKind::Capy
        )
    }

    /// reCAPTCHA answers take minutes, so it gets its own timeout.
    pub fn uses_recaptcha_timeout(&self) -> bool {
        matches!(self, CaptchaKind::ReCaptcha)
    }
}

impl std::fmt::Display for CaptchaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptchaKind {
    type Err = TwoCaptchaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "image" => Ok(CaptchaKind::Normal),
            "grid" => Ok(CaptchaKind::Grid),
            "canvas" => Ok(CaptchaKind::Canvas),
            "coordinates" => Ok(CaptchaKind::Coordinates),
            "rotate" => Ok(CaptchaKind::Rotate),
            "text" => Ok(CaptchaKind::Text),
            "recaptcha" | "userrecaptcha" => Ok(CaptchaKind::ReCaptcha),
            "hcaptcha" => Ok(CaptchaKind::HCaptcha),
            "geetest" => Ok(CaptchaKind::GeeTest),
            "funcaptcha" => Ok(CaptchaKind::FunCaptcha),
            "capy" => Ok(CaptchaKind::Capy),
            other => Err(TwoCaptchaError::Validation(format!(
                "Unknown captcha kind '{}'",
                other
            ))),
        }
    }
}

/// Proxy protocol understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyType {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Http => "HTTP",
            ProxyType::Https => "HTTPS",
            ProxyType::Socks4 => "SOCKS4",
            ProxyType::Socks5 => "SOCKS5",
        }
    }
}

/// Proxy the service workers should use when loading the target page.
///
/// Sent as two wire fields: `proxy=<uri>` and `proxytype=<type>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,
    /// `login:password@host:port`
    pub uri: String,
}

impl ProxyConfig {
    pub fn new(proxy_type: ProxyType, uri: impl Into<String>) -> Self {
        Self {
            proxy_type,
            uri: uri.into(),
        }
    }
}

/// One option value of a [`CaptchaRequest`].
///
/// Uploads are tagged explicitly with [`OptionValue::File`]; a text value is
/// never interpreted as a path.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    File(PathBuf),
    Files(Vec<PathBuf>),
    Proxy(ProxyConfig),
}

impl OptionValue {
    /// Whether the value counts as "set" (empty strings, zero and `false` do not).
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Text(s) => !s.is_empty() && s != "0",
            OptionValue::Int(n) => *n != 0,
            OptionValue::Float(n) => *n != 0.0,
            OptionValue::Bool(b) => *b,
            OptionValue::File(p) => !p.as_os_str().is_empty(),
            OptionValue::Files(list) => !list.is_empty(),
            OptionValue::Proxy(_) => true,
        }
    }

    /// Form-field encoding of a scalar value.
    ///
    /// Returns `None` for values that cannot be sent as one field.
    pub fn to_wire(&self) -> Option<String> {
        match self {
            OptionValue::Text(s) => Some(s.clone()),
            OptionValue::Int(n) => Some(n.to_string()),
            OptionValue::Float(n) => Some(n.to_string()),
            OptionValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            OptionValue::File(p) => Some(p.display().to_string()),
            OptionValue::Files(_) | OptionValue::Proxy(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&PathBuf> {
        match self {
            OptionValue::File(p) => Some(p),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        OptionValue::File(value)
    }
}

impl From<ProxyConfig> for OptionValue {
    fn from(value: ProxyConfig) -> Self {
        OptionValue::Proxy(value)
    }
}

/// Options of one captcha, keyed by their friendly names (`file`, `sitekey`, `minLen`, ...).
///
/// Built by the builders in [`crate::captcha`]; read-only once handed to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptchaRequest {
    kind: CaptchaKind,
    options: BTreeMap<String, OptionValue>,
}

impl CaptchaRequest {
    /// Create an empty request of the given kind.
    pub fn new(kind: CaptchaKind) -> Self {
        Self {
            kind,
            options: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> CaptchaKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Present and truthy.
    pub fn is_set(&self, key: &str) -> bool {
        self.options.get(key).is_some_and(OptionValue::is_truthy)
    }

    /// The wire-level `method` discriminator, once resolved.
    pub fn method(&self) -> Option<&str> {
        match self.options.get("method") {
            Some(OptionValue::Text(m)) => Some(m.as_str()),
            _ => None,
        }
    }

    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.options.insert(key.into(), value.into());
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.options.remove(key)
    }

    pub(crate) fn into_options(self) -> BTreeMap<String, OptionValue> {
        self.options
    }
}

/// Outcome of a solve.
///
/// `code` is `None` when a callback URL was registered: the answer is then
/// delivered to that URL instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    pub captcha_id: String,
    pub code: Option<String>,
}

/// Poll loop tuning for one call. Unset (or zero) values use the client defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Option<Duration>,
    pub polling_interval: Option<Duration>,
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = Some(interval);
        self
    }
}

/// Response envelope when the client runs with `json=1`.
#[derive(Debug, Deserialize)]
pub struct JsonResponse {
    pub status: i64,
    /// Captcha id, answer or error code (the service sometimes sends numbers)
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub request: String,
}

impl JsonResponse {
    /// Rewrite into the plain-text convention (`OK|...` on success, raw code otherwise).
    pub fn into_plain(self) -> String {
        if self.status == 1 {
            format!("OK|{}", self.request)
        } else {
            self.request
        }
    }
}

/// Helper to deserialize fields that can be either string or number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrNumberVisitor;

    impl<'de> Visitor<'de> for StringOrNumberVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }

        fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("userrecaptcha".parse::<CaptchaKind>().unwrap(), CaptchaKind::ReCaptcha);
        assert_eq!("Rotate".parse::<CaptchaKind>().unwrap(), CaptchaKind::Rotate);
        assert!("slider".parse::<CaptchaKind>().is_err());
    }

    #[test]
    fn test_truthiness_follows_service_conventions() {
        assert!(!OptionValue::Text(String::new()).is_truthy());
        assert!(!OptionValue::Text("0".into()).is_truthy());
        assert!(!OptionValue::Bool(false).is_truthy());
        assert!(!OptionValue::Int(0).is_truthy());
        assert!(OptionValue::Text("https://example.com/cb".into()).is_truthy());
    }

    #[test]
    fn test_bool_wire_encoding() {
        assert_eq!(OptionValue::Bool(true).to_wire().as_deref(), Some("1"));
        assert_eq!(OptionValue::Bool(false).to_wire().as_deref(), Some("0"));
        assert!(OptionValue::Files(vec![]).to_wire().is_none());
    }

    #[test]
    fn test_json_response_into_plain() {
        let ok: JsonResponse = serde_json::from_str(r#"{"status":1,"request":"2122988149"}"#).unwrap();
        assert_eq!(ok.into_plain(), "OK|2122988149");

        let numeric: JsonResponse = serde_json::from_str(r#"{"status":1,"request":42}"#).unwrap();
        assert_eq!(numeric.into_plain(), "OK|42");

        let err: JsonResponse =
            serde_json::from_str(r#"{"status":0,"request":"CAPCHA_NOT_READY"}"#).unwrap();
        assert_eq!(err.into_plain(), "CAPCHA_NOT_READY");
    }
}
