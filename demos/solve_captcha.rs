//! Example: Solving a normal image captcha.
//!
//! Run with: TWOCAPTCHA_API_KEY=... cargo run --example solve_captcha -- path/to/captcha.jpg

use twocaptcha::{NormalCaptcha, TwoCaptcha};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output (optional)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let image = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "images/normal.jpg".to_string());

    // Reads TWOCAPTCHA_API_KEY, TWOCAPTCHA_SERVER, ...
    let client = TwoCaptcha::from_env()?;

    println!("Balance: {}", client.balance().await?);

    let request = NormalCaptcha::new()
        .file(&image)
        .numeric(4)
        .min_len(4)
        .max_len(20)
        .phrase(true)
        .case_sensitive()
        .lang("en");

    match client.solve(request).await {
        Ok(result) => {
            println!("Success!");
            println!("  captcha_id: {}", result.captcha_id);
            println!("  code: {}", result.code.as_deref().unwrap_or("<sent to pingback>"));
        }
        Err(e) => {
            println!("Failed: {}", e);
        }
    }

    Ok(())
}
