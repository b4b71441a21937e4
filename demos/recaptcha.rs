//! Example: Solving a reCAPTCHA v2 with a cancellable wait.
//!
//! Run with: TWOCAPTCHA_API_KEY=... cargo run --example recaptcha
//! Press Ctrl-C to stop waiting.

use std::time::Duration;
use twocaptcha::{ReCaptcha, TwoCaptcha, WaitOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = TwoCaptcha::from_env()?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    let request = ReCaptcha::new()
        .sitekey("6Le-wvkSVVABCPBMRTvw0Q4Muexq1bi0DJwx_mJ-")
        .url("https://www.google.com/recaptcha/api2/demo");

    let wait = WaitOptions::new().polling_interval(Duration::from_secs(5));

    match client.solve_with_shutdown(request, wait, shutdown_rx).await {
        Ok(result) => {
            println!("=== SUCCESS ===");
            println!("captcha_id: {}", result.captcha_id);
            if let Some(token) = result.code {
                println!("token: {}...", &token[..50.min(token.len())]);
            }
        }
        Err(e) => {
            println!("=== FAILED ===");
            println!("Error: {:?}", e);
        }
    }

    Ok(())
}
