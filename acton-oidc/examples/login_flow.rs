//! Interactive walkthrough of the authorization-code flow.
//!
//! Configure the provider in `config.toml` or through `ACTON_OIDC_*`
//! environment variables, run the example, open the printed URL in a
//! browser, then paste the `code` query parameter from the callback back
//! on stdin.
//!
//! Run with: `cargo run --example login_flow`

use std::io::{self, BufRead, Write};

use acton_oidc::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = OidcSettings::load()?;
    let client = Client::from_settings(&settings).await?;

    let login_url = client.authorization_url("demo-state");
    println!("Open this URL in a browser and sign in:\n\n  {login_url}\n");

    print!("Paste the code query parameter from the callback: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().lock().read_line(&mut code)?;

    let token = client.exchange_code(code.trim()).await?;
    println!("Access token: {}", token.access_token);

    let identity = client.verify_id_token(&token).await?;
    println!("Verified subject: {}", identity.subject);
    println!(
        "Claims: {}",
        serde_json::to_string_pretty(&identity.raw_claims)?
    );

    Ok(())
}
