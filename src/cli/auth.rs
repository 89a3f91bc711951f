use std::io::{self, Write};

use anyhow::{Result, anyhow};
use reqwest::Client;

use crate::core::AppConfig;
use crate::google::oauth::OAuthSession;

/// Run the consent flow without the server: print the consent URL,
/// read the code Google shows and print the resulting tokens so they
/// can be put in the environment.
pub async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let session = OAuthSession::from_config(Client::new(), &config);
    let auth_url = session.auth_url()?;

    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    print!("Paste the authorization code here: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(anyhow!("No authorization code entered"));
    }

    let tokens = session.exchange_code(code).await?;
    if tokens.refresh_token.is_none() {
        eprintln!("Warning: Google did not return a refresh token");
    }

    println!("{}", serde_json::to_string_pretty(&tokens)?);
    if let Some(access_token) = &tokens.access_token {
        println!("\nGOOGLE_OAUTH_ACCESS_TOKEN={}", access_token);
    }
    if let Some(refresh_token) = &tokens.refresh_token {
        println!("GOOGLE_OAUTH_REFRESH_TOKEN={}", refresh_token);
    }
    if let Some(expiry) = tokens.expiry_date {
        println!("GOOGLE_OAUTH_EXPIRY_DATE={}", expiry);
    }

    Ok(())
}
