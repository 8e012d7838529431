//! Async HTTP client for the RataTutor materials API.
//!
//! [`HttpRemote`] implements [`MaterialsRemote`] over the REST endpoints
//! under `/api/materials/`, so a `rata_store::MaterialsStore` can run
//! against a live server.

pub mod error;

use std::time::Duration;

use rata_core::{Material, MaterialId, MaterialPatch, MaterialsRemote, NewMaterial};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub use error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the materials API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Sent as `Authorization: Bearer <token>` when present.
  pub token:    Option<String>,
  pub timeout:  Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      token:    None,
      timeout:  DEFAULT_TIMEOUT,
    }
  }
}

/// HTTP implementation of [`MaterialsRemote`].
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpRemote {
  client: Client,
  config: ApiConfig,
}

impl HttpRemote {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    Url::parse(&config.base_url)
      .map_err(|e| ClientError::Config(format!("base url {:?}: {e}", config.base_url)))?;
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  /// Absolute URL for `path`, relative to `/api/materials/`.
  fn url(&self, path: &str) -> String {
    format!(
      "{}/api/materials/{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send one request and turn non-2xx answers into [`ClientError::Status`].
  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<Response, ClientError> {
    let mut req = self.auth(self.client.request(method.clone(), self.url(path)));
    if let Some(body) = body {
      req = req.json(&body);
    }
    let resp = req.send().await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::debug!(%method, path, %status, "materials API rejected request");
      return Err(ClientError::Status {
        method,
        path: format!("/api/materials/{path}"),
        status,
        body,
      });
    }
    Ok(resp)
  }

  async fn json<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<T, ClientError> {
    Ok(self.send(method, path, body).await?.json().await?)
  }
}

impl MaterialsRemote for HttpRemote {
  type Error = ClientError;

  /// `GET /api/materials/`
  async fn list_materials(&self) -> Result<Vec<Material>, ClientError> {
    self.json(Method::GET, "", None).await
  }

  /// `GET /api/materials/trash/`
  async fn list_trashed(&self) -> Result<Vec<Material>, ClientError> {
    self.json(Method::GET, "trash/", None).await
  }

  /// `POST /api/materials/`
  async fn create_material(&self, input: NewMaterial) -> Result<Material, ClientError> {
    let body = serde_json::to_value(&input)?;
    self.json(Method::POST, "", Some(body)).await
  }

  /// `PATCH /api/materials/{id}/`
  async fn update_material(
    &self,
    id: MaterialId,
    patch: MaterialPatch,
  ) -> Result<Material, ClientError> {
    let body = serde_json::to_value(&patch)?;
    self.json(Method::PATCH, &format!("{id}/"), Some(body)).await
  }

  /// `POST /api/materials/{id}/toggle_pin/`
  async fn toggle_pin(&self, id: MaterialId) -> Result<Material, ClientError> {
    self.json(Method::POST, &format!("{id}/toggle_pin/"), None).await
  }

  /// `POST /api/materials/{id}/toggle_visibility/`
  async fn toggle_visibility(&self, id: MaterialId) -> Result<Material, ClientError> {
    self
      .json(Method::POST, &format!("{id}/toggle_visibility/"), None)
      .await
  }

  /// `DELETE /api/materials/{id}/`, which the server treats as a move to
  /// trash.
  async fn soft_delete(&self, id: MaterialId) -> Result<(), ClientError> {
    self.send(Method::DELETE, &format!("{id}/"), None).await?;
    Ok(())
  }

  /// `PATCH /api/materials/{id}/` with `{"status": "active"}`.
  async fn restore(&self, id: MaterialId) -> Result<Material, ClientError> {
    self
      .json(Method::PATCH, &format!("{id}/"), Some(json!({ "status": "active" })))
      .await
  }

  /// `POST /api/materials/{id}/permanent_delete/`
  async fn permanently_delete(&self, id: MaterialId) -> Result<(), ClientError> {
    self
      .send(Method::POST, &format!("{id}/permanent_delete/"), None)
      .await?;
    Ok(())
  }
}
