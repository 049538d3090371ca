//! Client for the transactional email provider.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Provider settings. `recipients` is a comma-separated address list.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
  pub api_url:    String,
  pub api_key:    String,
  pub from:       String,
  #[serde(default)]
  pub recipients: String,
}

impl EmailConfig {
  pub fn recipient_list(&self) -> Vec<String> {
    self
      .recipients
      .split(',')
      .map(str::trim)
      .filter(|r| !r.is_empty())
      .map(str::to_owned)
      .collect()
  }
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
  from:    &'a str,
  to:      Vec<String>,
  subject: &'a str,
  html:    &'a str,
}

/// Sends HTML email through the provider's JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct EmailClient {
  client: Client,
  config: EmailConfig,
}

impl EmailClient {
  pub fn new(config: EmailConfig) -> Result<Self, Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  /// Send one message to every configured recipient. Returns the number of
  /// recipients. Not retried.
  pub async fn send(&self, subject: &str, html: &str) -> Result<usize, Error> {
    let to = self.config.recipient_list();
    if to.is_empty() {
      return Err(Error::NoRecipients);
    }
    let count = to.len();

    let resp = self
      .client
      .post(&self.config.api_url)
      .bearer_auth(&self.config.api_key)
      .json(&OutgoingEmail { from: &self.config.from, to, subject, html })
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      tracing::warn!(%status, "email provider rejected the message");
      return Err(Error::MailRejected(status.as_u16()));
    }
    Ok(count)
  }
}
