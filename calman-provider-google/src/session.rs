//! Google OAuth session handling.
//!
//! Credentials and tokens live under the platform config directory:
//!   ~/.config/calman/google/credentials.json
//!   ~/.config/calman/google/tokens.json
//!
//! The interactive flow opens the consent page in a browser and waits
//! for the OAuth callback on a local port; afterwards the stored
//! refresh token keeps the session alive without user interaction.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use tracing::debug;

pub const REDIRECT_PORT: u16 = 8085;
const REDIRECT_URI: &str = "http://localhost:8085/callback";
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/tasks";

/// OAuth client credentials, supplied by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct Session {
    data: SessionData,
}

pub fn base_dir() -> Result<PathBuf> {
    let config = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config.join("calman").join("google"))
}

fn credentials_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("credentials.json"))
}

fn tokens_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("tokens.json"))
}

pub fn load_credentials() -> Result<GoogleCredentials> {
    let path = credentials_path()?;
    let contents = std::fs::read_to_string(&path).with_context(|| {
        format!(
            "No Google credentials at {}. Create the file with your OAuth client_id/client_secret.",
            path.display()
        )
    })?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials at {}", path.display()))
}

impl Session {
    /// Load the stored session, if any.
    pub fn load() -> Result<Option<Session>> {
        let path = tokens_path()?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read tokens at {}", path.display()))?;
        let data: SessionData = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse tokens at {}", path.display()))?;
        Ok(Some(Session { data }))
    }

    pub fn save(&self) -> Result<()> {
        let path = tokens_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write tokens to {}", path.display()))?;
        Ok(())
    }

    pub fn is_expired(&self) -> bool {
        // A minute of slack so a token never expires mid-request.
        Utc::now() + Duration::seconds(60) >= self.data.expires_at
    }

    /// A valid access token, refreshing first when expired.
    pub async fn access_token(&mut self, http: &reqwest::Client) -> Result<String> {
        if self.is_expired() {
            self.refresh(http).await?;
        }
        Ok(self.data.access_token.clone())
    }

    async fn refresh(&mut self, http: &reqwest::Client) -> Result<()> {
        let creds = load_credentials()?;
        debug!("refreshing Google access token");

        let response = http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", self.data.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Token refresh failed: {}", error_text);
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
            expires_in: i64,
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .context("Failed to parse refresh response")?;

        self.data.access_token = refreshed.access_token;
        self.data.expires_at = Utc::now() + Duration::seconds(refreshed.expires_in);
        self.save()?;
        Ok(())
    }
}

/// Run the interactive OAuth flow: open the consent page, wait for the
/// callback, exchange the code, store the session.
pub async fn authenticate(http: &reqwest::Client) -> Result<Session> {
    let creds = load_credentials()?;
    let state = format!("{:x}", std::process::id() as u64 ^ Utc::now().timestamp() as u64);

    let mut auth_url = url::Url::parse(AUTH_URL)?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &creds.client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("state", &state);

    eprintln!("Opening browser for Google authentication...");
    if open::that(auth_url.as_str()).is_err() {
        eprintln!("Could not open a browser. Visit:\n{}", auth_url);
    }

    let (code, returned_state) = wait_for_callback()?;
    if returned_state != state {
        bail!("OAuth state mismatch");
    }

    let response = http
        .post(TOKEN_URL)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", REDIRECT_URI),
        ])
        .send()
        .await
        .context("Failed to exchange authorization code")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        bail!("Code exchange failed: {}", error_text);
    }

    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
        refresh_token: String,
        expires_in: i64,
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    let session = Session {
        data: SessionData {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        },
    };
    session.save()?;
    Ok(session)
}

/// Start a local HTTP server to receive the OAuth callback.
fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", REDIRECT_PORT))
        .with_context(|| format!("Failed to bind to port {}", REDIRECT_PORT))?;

    eprintln!("Waiting for OAuth callback on port {}...", REDIRECT_PORT);

    let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .context("Invalid request")?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .context("No code in callback")?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .context("No state in callback")?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Authentication successful!</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    Ok((code, state))
}
