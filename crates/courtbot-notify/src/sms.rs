//! Outbound SMS through the Twilio Messages API.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use crate::config::TwilioConfig;
use crate::error::NotifyError;

pub const TWILIO_API_URL: &str = "https://api.twilio.com";

/// What Twilio reports back for an accepted message.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
struct TwilioErrorBody {
    message: Option<String>,
}

/// Async HTTP client for sending messages from one Twilio account.
pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("courtbot-notify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            base_url: TWILIO_API_URL.to_string(),
        })
    }

    pub fn from_config(config: &TwilioConfig) -> Result<Self, NotifyError> {
        if config.account_sid.is_empty() {
            return Err(NotifyError::MissingEnv("TWILIO_ACCOUNT_SID"));
        }
        if config.auth_token.is_empty() {
            return Err(NotifyError::MissingEnv("TWILIO_AUTH_TOKEN"));
        }
        let client = Self::new(&config.account_sid, &config.auth_token)?;
        Ok(match &config.api_url {
            Some(url) => client.with_base_url(url),
            None => client,
        })
    }

    /// Send to a different API host (a local stand-in in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    /// Send `body` from `from` to `to`.
    pub async fn send(&self, to: &str, from: &str, body: &str) -> Result<SentMessage, NotifyError> {
        debug!("SMS request: to={}, from={}, {} chars", to, from, body.len());
        let start = Instant::now();

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(
            "SMS response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            let message = serde_json::from_str::<TwilioErrorBody>(&text)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(NotifyError::Api {
                service: "twilio",
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| NotifyError::Api {
            service: "twilio",
            status: status.as_u16(),
            message: format!("unreadable response: {e}"),
        })
    }
}

/// Send one message with a client built from `config`.
pub async fn send(
    config: &TwilioConfig,
    to: &str,
    from: &str,
    body: &str,
) -> Result<SentMessage, NotifyError> {
    TwilioClient::from_config(config)?.send(to, from, body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_includes_account() {
        let client = TwilioClient::new("AC123", "secret")
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/");
        assert_eq!(
            client.messages_url(),
            "http://127.0.0.1:9999/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn from_config_requires_credentials() {
        let err = TwilioClient::from_config(&TwilioConfig::default()).err().unwrap();
        assert!(matches!(err, NotifyError::MissingEnv("TWILIO_ACCOUNT_SID")));

        let config = TwilioConfig {
            account_sid: "AC123".into(),
            ..Default::default()
        };
        let err = TwilioClient::from_config(&config).err().unwrap();
        assert!(matches!(err, NotifyError::MissingEnv("TWILIO_AUTH_TOKEN")));
    }

    #[test]
    fn from_config_applies_api_url() {
        let config = TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            api_url: Some("http://127.0.0.1:9999".into()),
            ..Default::default()
        };
        let client = TwilioClient::from_config(&config).unwrap();
        assert_eq!(
            client.messages_url(),
            "http://127.0.0.1:9999/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
