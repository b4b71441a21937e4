//! Main TwoCaptcha client: submits captchas and polls for their answers.

use crate::captcha;
use crate::config::{
    ClientConfig, DEFAULT_TIMEOUT_SECS, POLLING_INTERVAL_SECS, RECAPTCHA_TIMEOUT_SECS,
};
use crate::error::{Result, TwoCaptchaError};
use crate::models::{CaptchaKind, CaptchaRequest, JsonResponse, OptionValue, SolveResult, WaitOptions};
use crate::params::{extract_files, into_wire_fields, map_params, rename_keys};
use crate::transport::{HttpTransport, Transport};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Body of `res.php` while the answer is still being worked on.
const NOT_READY: &str = "CAPCHA_NOT_READY";

/// Prefix of every successful plain-text response.
const OK_PREFIX: &str = "OK|";

/// Builder for creating a TwoCaptcha client.
pub struct TwoCaptchaBuilder {
    config: ClientConfig,
    default_timeout: Duration,
    recaptcha_timeout: Duration,
    polling_interval: Duration,
    proxy: Option<String>,
    local_address: Option<IpAddr>,
    transport: Option<Arc<dyn Transport>>,
}

impl TwoCaptchaBuilder {
    /// Create a new builder with the account's API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(ClientConfig {
            api_key: api_key.into(),
            ..ClientConfig::default()
        })
    }

    /// Start from a loaded [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            default_timeout: Duration::from_secs(config.default_timeout),
            recaptcha_timeout: Duration::from_secs(config.recaptcha_timeout),
            polling_interval: Duration::from_secs(config.polling_interval),
            config,
            proxy: None,
            local_address: None,
            transport: None,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Base URL of the service (default `http://2captcha.com`).
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = server.into();
        self
    }

    /// Software attribution code added to every submission.
    pub fn soft_id(mut self, soft_id: u32) -> Self {
        self.config.soft_id = Some(soft_id);
        self
    }

    /// Pingback URL added to every submission unless the request opts out.
    ///
    /// With a pingback registered, `solve` returns right after submission
    /// and the answer is delivered to the URL.
    pub fn callback(mut self, url: impl Into<String>) -> Self {
        self.config.callback = Some(url.into());
        self
    }

    /// Zero keeps the default of 120 seconds.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Zero keeps the default of 600 seconds.
    pub fn recaptcha_timeout(mut self, timeout: Duration) -> Self {
        self.recaptcha_timeout = timeout;
        self
    }

    /// Zero keeps the default of 10 seconds.
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Ask for JSON response bodies (`json=1`).
    pub fn json(mut self) -> Self {
        self.config.json = true;
        self
    }

    /// Route this client's HTTP traffic through a proxy.
    ///
    /// Not to be confused with the per-captcha proxy the service workers use.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Bind outgoing connections to a local address.
    pub fn local_address(mut self, addr: IpAddr) -> Self {
        self.local_address = Some(addr);
        self
    }

    /// Use a custom transport instead of the built-in rquest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the TwoCaptcha client.
    pub fn build(self) -> Result<TwoCaptcha> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = HttpTransport::builder(&self.config.server);
                if let Some(proxy) = self.proxy {
                    builder = builder.proxy(proxy);
                }
                if let Some(addr) = self.local_address {
                    builder = builder.local_address(addr);
                }
                Arc::new(builder.build()?) as Arc<dyn Transport>
            }
        };

        Ok(TwoCaptcha {
            transport,
            api_key: self.config.api_key,
            soft_id: self.config.soft_id,
            callback: self.config.callback.filter(|url| !url.is_empty()),
            default_timeout: non_zero_or(self.default_timeout, DEFAULT_TIMEOUT_SECS),
            recaptcha_timeout: non_zero_or(self.recaptcha_timeout, RECAPTCHA_TIMEOUT_SECS),
            polling_interval: non_zero_or(self.polling_interval, POLLING_INTERVAL_SECS),
            json: self.config.json,
        })
    }
}

fn non_zero_or(value: Duration, default_secs: u64) -> Duration {
    if value.is_zero() {
        Duration::from_secs(default_secs)
    } else {
        value
    }
}

/// Outcome of a submission to `in.php`.
struct Submission {
    captcha_id: String,
    kind: CaptchaKind,
    has_callback: bool,
}

/// TwoCaptcha client.
///
/// Holds only read-only configuration, so one instance (or clones of it) can
/// serve any number of concurrent solves.
///
/// # Example
/// ```ignore
/// use twocaptcha::{NormalCaptcha, TwoCaptcha};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = TwoCaptcha::builder("YOUR_API_KEY").build()?;
///
///     let result = client
///         .solve(NormalCaptcha::new().file("images/normal.jpg").numeric(4))
///         .await?;
///     println!("Solved: {:?}", result.code);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct TwoCaptcha {
    transport: Arc<dyn Transport>,
    api_key: String,
    soft_id: Option<u32>,
    callback: Option<String>,
    default_timeout: Duration,
    recaptcha_timeout: Duration,
    polling_interval: Duration,
    json: bool,
}

impl TwoCaptcha {
    /// Create a builder for the TwoCaptcha client.
    pub fn builder(api_key: impl Into<String>) -> TwoCaptchaBuilder {
        TwoCaptchaBuilder::new(api_key)
    }

    /// Client configured from `TWOCAPTCHA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        TwoCaptchaBuilder::from_config(ClientConfig::from_env()?).build()
    }

    /// Submit a captcha and wait for its answer with the default wait options.
    pub async fn solve(&self, request: impl Into<CaptchaRequest>) -> Result<SolveResult> {
        self.solve_with(request, WaitOptions::default()).await
    }

    /// Submit a captcha and wait for its answer.
    ///
    /// Returns with `code: None` right after submission when a pingback URL
    /// is registered for the captcha.
    pub async fn solve_with(
        &self,
        request: impl Into<CaptchaRequest>,
        wait: WaitOptions,
    ) -> Result<SolveResult> {
        self.solve_inner(request.into(), wait, None).await
    }

    /// Like [`TwoCaptcha::solve_with`], but gives up with
    /// [`TwoCaptchaError::Cancelled`] as soon as `shutdown` fires or closes.
    pub async fn solve_with_shutdown(
        &self,
        request: impl Into<CaptchaRequest>,
        wait: WaitOptions,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<SolveResult> {
        self.solve_inner(request.into(), wait, Some(shutdown)).await
    }

    async fn solve_inner(
        &self,
        request: CaptchaRequest,
        wait: WaitOptions,
        shutdown: Option<broadcast::Receiver<()>>,
    ) -> Result<SolveResult> {
        let submission = self.submit(request).await?;

        if submission.has_callback {
            tracing::info!(
                captcha_id = %submission.captcha_id,
                "Pingback registered, not polling for the answer"
            );
            return Ok(SolveResult {
                captcha_id: submission.captcha_id,
                code: None,
            });
        }

        let (timeout, interval) = self.wait_durations(Some(submission.kind), wait);
        let code = self
            .poll(&submission.captcha_id, timeout, interval, shutdown)
            .await?;

        Ok(SolveResult {
            captcha_id: submission.captcha_id,
            code: Some(code),
        })
    }

    /// Validate and submit a captcha, returning its id without waiting.
    ///
    /// Use [`TwoCaptcha::get_result`] or [`TwoCaptcha::wait_for_result`] later.
    pub async fn send(&self, request: impl Into<CaptchaRequest>) -> Result<String> {
        Ok(self.submit(request.into()).await?.captcha_id)
    }

    async fn submit(&self, request: CaptchaRequest) -> Result<Submission> {
        let request = captcha::prepare(request)?;
        let kind = request.kind();
        let method = request.method().unwrap_or("post").to_string();

        let mut options = request.into_options();
        let has_callback = self.attach_default_params(&mut options);

        let mut files = extract_files(&mut options);
        map_params(&mut options, &method);
        rename_keys(&mut files, &method);

        tracing::debug!(
            kind = %kind,
            method = %method,
            files = files.len(),
            "Submitting captcha"
        );

        let response = self
            .transport
            .submit(into_wire_fields(options), files)
            .await?;
        let response = self.decode(&response)?;

        let captcha_id = response
            .strip_prefix(OK_PREFIX)
            .ok_or_else(|| TwoCaptchaError::unrecognised(&response))?
            .to_string();

        tracing::debug!(captcha_id = %captcha_id, "Captcha accepted");

        Ok(Submission {
            captcha_id,
            kind,
            has_callback,
        })
    }

    /// Add key, soft id, pingback and format flag. Returns whether a pingback is set.
    fn attach_default_params(
        &self,
        options: &mut std::collections::BTreeMap<String, OptionValue>,
    ) -> bool {
        options.insert("key".to_string(), OptionValue::Text(self.api_key.clone()));

        match options.get("callback") {
            None => {
                if let Some(url) = &self.callback {
                    options.insert("callback".to_string(), OptionValue::Text(url.clone()));
                }
            }
            Some(value) if !value.is_truthy() => {
                options.remove("callback");
            }
            Some(_) => {}
        }

        if let Some(soft_id) = self.soft_id {
            options
                .entry("softId".to_string())
                .or_insert(OptionValue::Int(i64::from(soft_id)));
        }

        if self.json {
            options.insert("json".to_string(), OptionValue::Int(1));
        }

        options.get("callback").is_some_and(OptionValue::is_truthy)
    }

    /// Fetch the answer once. `None` while the captcha is not solved yet.
    pub async fn get_result(&self, captcha_id: &str) -> Result<Option<String>> {
        let response = self
            .res(vec![
                ("action".to_string(), "get".to_string()),
                ("id".to_string(), captcha_id.to_string()),
            ])
            .await?;

        if response == NOT_READY {
            return Ok(None);
        }

        response
            .strip_prefix(OK_PREFIX)
            .map(|code| Some(code.to_string()))
            .ok_or_else(|| TwoCaptchaError::unrecognised(&response))
    }

    /// Poll until the answer is ready or the timeout is reached.
    pub async fn wait_for_result(&self, captcha_id: &str, wait: WaitOptions) -> Result<String> {
        let (timeout, interval) = self.wait_durations(None, wait);
        self.poll(captcha_id, timeout, interval, None).await
    }

    /// Like [`TwoCaptcha::wait_for_result`], cancellable through `shutdown`.
    pub async fn wait_for_result_with_shutdown(
        &self,
        captcha_id: &str,
        wait: WaitOptions,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<String> {
        let (timeout, interval) = self.wait_durations(None, wait);
        self.poll(captcha_id, timeout, interval, Some(shutdown)).await
    }

    /// Timeout and interval for one wait, falling back to the client defaults.
    fn wait_durations(&self, kind: Option<CaptchaKind>, wait: WaitOptions) -> (Duration, Duration) {
        let default_timeout = match kind {
            Some(kind) if kind.uses_recaptcha_timeout() => self.recaptcha_timeout,
            _ => self.default_timeout,
        };

        let timeout = wait
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(default_timeout);
        let interval = wait
            .polling_interval
            .filter(|i| !i.is_zero())
            .unwrap_or(self.polling_interval);

        (timeout, interval)
    }

    /// The poll loop.
    ///
    /// Time is only checked before each sleep, so a wait performs
    /// `ceil(timeout / interval)` attempts and may overrun by one interval.
    /// A shutdown interrupts both the sleep and an in-flight `res.php` query.
    async fn poll(
        &self,
        captcha_id: &str,
        timeout: Duration,
        interval: Duration,
        mut shutdown: Option<broadcast::Receiver<()>>,
    ) -> Result<String> {
        let started_at = Instant::now();
        let mut attempt = 0u32;

        while started_at.elapsed() < timeout {
            attempt += 1;
            let step = async {
                tokio::time::sleep(interval).await;
                self.get_result(captcha_id).await
            };

            let outcome = match shutdown.as_mut() {
                Some(shutdown) => {
                    tokio::select! {
                        outcome = step => outcome,
                        _ = shutdown.recv() => {
                            tracing::info!(captcha_id, attempt, "Stopped waiting for captcha answer");
                            return Err(TwoCaptchaError::Cancelled);
                        }
                    }
                }
                None => step.await,
            };

            match outcome {
                Ok(Some(code)) => {
                    tracing::info!(captcha_id, attempt, "Captcha solved");
                    return Ok(code);
                }
                Ok(None) => {
                    tracing::debug!(captcha_id, attempt, "Captcha not ready yet");
                }
                Err(e) if e.is_network() => {
                    tracing::warn!(captcha_id, attempt, error = %e, "Ignoring network error while polling");
                }
                Err(e) => return Err(e),
            }
        }

        Err(TwoCaptchaError::Timeout(timeout.as_secs()))
    }

    /// Get the account balance.
    pub async fn balance(&self) -> Result<f64> {
        let response = self
            .res(vec![("action".to_string(), "getbalance".to_string())])
            .await?;
        let amount = response.strip_prefix(OK_PREFIX).unwrap_or(&response);

        amount
            .trim()
            .parse::<f64>()
            .map_err(|_| TwoCaptchaError::unrecognised(&response))
    }

    /// Report whether an answer was correct (`reportgood` / `reportbad`).
    pub async fn report(&self, captcha_id: &str, correct: bool) -> Result<()> {
        let action = if correct { "reportgood" } else { "reportbad" };
        self.res(vec![
            ("action".to_string(), action.to_string()),
            ("id".to_string(), captcha_id.to_string()),
        ])
        .await?;

        tracing::debug!(captcha_id, action, "Reported captcha answer");
        Ok(())
    }

    /// GET `res.php` with the api key (and format flag) attached.
    async fn res(&self, mut query: Vec<(String, String)>) -> Result<String> {
        query.push(("key".to_string(), self.api_key.clone()));
        if self.json {
            query.push(("json".to_string(), "1".to_string()));
        }

        let response = self.transport.query(query).await?;
        self.decode(&response)
    }

    /// Normalize a response body to the plain-text convention.
    fn decode(&self, body: &str) -> Result<String> {
        let body = body.trim();
        if !self.json {
            return Ok(body.to_string());
        }

        serde_json::from_str::<JsonResponse>(body)
            .map(JsonResponse::into_plain)
            .map_err(|_| TwoCaptchaError::unrecognised(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn submit(
            &self,
            _fields: Vec<(String, String)>,
            _files: BTreeMap<String, PathBuf>,
        ) -> Result<String> {
            Ok("OK|1".to_string())
        }

        async fn query(&self, _params: Vec<(String, String)>) -> Result<String> {
            Ok("OK|1".to_string())
        }
    }

    fn client(builder: TwoCaptchaBuilder) -> TwoCaptcha {
        builder.transport(Arc::new(NullTransport)).build().unwrap()
    }

    #[test]
    fn test_wait_durations_defaults() {
        let client = client(TwoCaptcha::builder("key"));

        let (timeout, interval) = client.wait_durations(Some(CaptchaKind::Normal), WaitOptions::default());
        assert_eq!(timeout, Duration::from_secs(120));
        assert_eq!(interval, Duration::from_secs(10));

        let (timeout, _) = client.wait_durations(Some(CaptchaKind::ReCaptcha), WaitOptions::default());
        assert_eq!(timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_wait_durations_zero_means_default() {
        let client = client(TwoCaptcha::builder("key").default_timeout(Duration::from_secs(60)));
        let wait = WaitOptions::new()
            .timeout(Duration::ZERO)
            .polling_interval(Duration::from_secs(2));

        let (timeout, interval) = client.wait_durations(None, wait);
        assert_eq!(timeout, Duration::from_secs(60));
        assert_eq!(interval, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_client_durations_keep_defaults() {
        let zeroed = client(
            TwoCaptcha::builder("key")
                .default_timeout(Duration::ZERO)
                .polling_interval(Duration::ZERO),
        );
        assert_eq!(zeroed.default_timeout, Duration::from_secs(120));
        assert_eq!(zeroed.polling_interval, Duration::from_secs(10));

        let config = ClientConfig {
            polling_interval: 0,
            recaptcha_timeout: 0,
            ..ClientConfig::default()
        };
        let from_config = client(TwoCaptchaBuilder::from_config(config));
        assert_eq!(from_config.polling_interval, Duration::from_secs(10));
        assert_eq!(from_config.recaptcha_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_sub_second_interval_is_kept() {
        let client = client(TwoCaptcha::builder("key").polling_interval(Duration::from_millis(500)));
        let (_, interval) = client.wait_durations(None, WaitOptions::default());
        assert_eq!(interval, Duration::from_millis(500));
    }

    #[test]
    fn test_attach_default_params() {
        let client = client(
            TwoCaptcha::builder("secret")
                .soft_id(4580)
                .callback("https://example.com/pingback"),
        );

        let mut options = BTreeMap::new();
        assert!(client.attach_default_params(&mut options));
        assert_eq!(options.get("key"), Some(&OptionValue::Text("secret".into())));
        assert_eq!(options.get("softId"), Some(&OptionValue::Int(4580)));

        let mut options = BTreeMap::new();
        options.insert("callback".to_string(), OptionValue::Bool(false));
        options.insert("softId".to_string(), OptionValue::Int(1));
        assert!(!client.attach_default_params(&mut options));
        assert!(!options.contains_key("callback"));
        assert_eq!(options.get("softId"), Some(&OptionValue::Int(1)));
    }

    #[test]
    fn test_get_result_strips_prefix() {
        let client = client(TwoCaptcha::builder("key"));
        let code = tokio_test::block_on(client.get_result("1")).unwrap();
        assert_eq!(code.as_deref(), Some("1"));
    }

    #[test]
    fn test_decode_json_mode() {
        let client = client(TwoCaptcha::builder("key").json());
        assert_eq!(
            client.decode(r#"{"status":1,"request":"abc"}"#).unwrap(),
            "OK|abc"
        );
        assert!(client.decode("OK|abc").is_err());
    }
}
