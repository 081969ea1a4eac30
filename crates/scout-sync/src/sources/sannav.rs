//! Switchport inventory from the SAN management REST API.
//!
//! One fetch is a full session: login, query, logout. The session key from
//! the login response is sent as the `Authorization` header on the query and
//! logout calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scout_core::{normalize::SourceKind, record::RawRecord, source::Source};
use serde::Deserialize;
use serde_json::Value as Json;

use super::fetch_error;

const SOURCE_NAME: &str = "sannav";

/// Connection settings for the SAN management API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SanNavConfig {
  /// API root, e.g. `https://sannav.example.net/external-api/v1`.
  pub base_url: String,
  pub username: String,
  #[serde(default)]
  pub password: String,
}

pub struct SanNavClient {
  client: Client,
  config: SanNavConfig,
}

#[derive(Deserialize)]
struct Login {
  #[serde(rename = "sessionId")]
  session_id: String,
}

impl SanNavClient {
  pub fn new(config: SanNavConfig) -> crate::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn login(&self) -> crate::Result<String> {
    let resp = self
      .client
      .post(self.url("login/"))
      .header("username", &self.config.username)
      .header("password", &self.config.password)
      .header("Accept", "application/json")
      .send()
      .await?
      .error_for_status()?;
    let login: Login = resp.json().await?;
    Ok(login.session_id)
  }

  async fn switchports(&self, session: &str) -> crate::Result<Vec<RawRecord>> {
    let body: Json = self
      .client
      .get(self.url("inventory/switchports/"))
      .query(&[("basicOnly", "0")])
      .header("Authorization", session)
      .header("Accept", "application/json")
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(extract_switchports(body))
  }

  async fn logout(&self, session: &str) -> crate::Result<()> {
    self
      .client
      .post(self.url("logout/"))
      .header("Authorization", session)
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

/// Pull the switchport objects out of a query response. They sit under
/// `switchPorts`, either at the top level or inside `Response`.
pub fn extract_switchports(mut body: Json) -> Vec<RawRecord> {
  let ports = body
    .pointer_mut("/switchPorts")
    .map(Json::take)
    .or_else(|| body.pointer_mut("/Response/switchPorts").map(Json::take));
  match ports {
    Some(Json::Array(items)) => items
      .into_iter()
      .filter_map(|item| match item {
        Json::Object(map) => Some(map),
        _ => None,
      })
      .collect(),
    _ => Vec::new(),
  }
}

#[async_trait]
impl Source for SanNavClient {
  fn name(&self) -> &str { SOURCE_NAME }

  fn kind(&self) -> SourceKind { SourceKind::SanFabric }

  async fn fetch(&self) -> scout_core::Result<Vec<RawRecord>> {
    if self.config.password.trim().is_empty() {
      return Err(fetch_error(SOURCE_NAME, "password is blank"));
    }

    let session = self
      .login()
      .await
      .map_err(|e| fetch_error(SOURCE_NAME, format!("login: {e}")))?;
    let result = self.switchports(&session).await;

    if let Err(err) = self.logout(&session).await {
      tracing::warn!(error = %err, "logout failed");
    }

    let ports = result.map_err(|e| fetch_error(SOURCE_NAME, format!("switchport query: {e}")))?;
    tracing::info!(records = ports.len(), "switchports fetched");
    Ok(ports)
  }
}
