//! HTTP client for the ImovLocal REST API.
//!
//! Thin typed wrapper over `reqwest`. Endpoints are mounted under
//! `{base_url}/api`; the bearer token, when present, is attached to every
//! request. Multipart construction is split from request sending: the form
//! controller builds a pure [`SubmissionPayload`], and this module converts
//! it to a `reqwest::multipart::Form` at the last moment.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses are parsed for the backend's `{"detail": "..."}` shape
//! so the caller can surface the message verbatim. Transport and decode
//! failures map to string-payload variants; nothing here panics.

use async_trait::async_trait;
use reqwest::multipart;

use crate::config::ClientConfig;
use crate::model::{Banner, BannerPosition, PropertyLimits, PropertyRecord, StagedFile};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for direct user display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { detail, .. } => detail.clone(),
            _ => "Não foi possível completar a operação. Tente novamente.".to_owned(),
        }
    }
}

/// Multipart submission built by the property form controller.
///
/// `text_fields` keeps insertion order; `existing_images` is `Some` only in
/// edit mode (an empty list means "keep nothing", not "field absent").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPayload {
    pub text_fields: Vec<(&'static str, String)>,
    pub existing_images: Option<Vec<String>>,
    pub files: Vec<StagedFile>,
}

// =============================================================================
// BACKEND TRAITS
// =============================================================================

/// Banner-slot operations, kept behind a trait so engine tests can run
/// against an in-memory fake.
#[async_trait]
pub trait BannerBackend: Send + Sync + 'static {
    async fn active_banners(&self, position: BannerPosition) -> Result<Vec<Banner>, ApiError>;
    async fn record_view(&self, banner_id: &str) -> Result<(), ApiError>;
    async fn record_click(&self, banner_id: &str) -> Result<(), ApiError>;
}

/// Property CRUD and limits operations used by the form controller.
#[async_trait]
pub trait PropertyBackend: Send + Sync + 'static {
    async fn property(&self, id: &str) -> Result<PropertyRecord, ApiError>;
    async fn create_with_images(&self, payload: SubmissionPayload) -> Result<PropertyRecord, ApiError>;
    async fn update_with_images(&self, id: &str, payload: SubmissionPayload)
    -> Result<PropertyRecord, ApiError>;
    async fn my_limits(&self) -> Result<PropertyLimits, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ClientBuild` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &ClientConfig, token: Option<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, api_base: format!("{}/api", config.base_url), token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn attach_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, detail: extract_detail(status, &body) });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn read_status(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, detail: extract_detail(status, &body) })
    }

    /// Active banners for a placement slot. An empty list is a valid answer.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors; the banner engine turns these
    /// into its retry/degrade policy.
    pub async fn active_banners(&self, position: BannerPosition) -> Result<Vec<Banner>, ApiError> {
        let req = self
            .http
            .get(self.url("/banners/active"))
            .query(&[("position", position.as_str())]);
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Record an impression. Callers treat failures as best-effort loss.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn record_view(&self, banner_id: &str) -> Result<(), ApiError> {
        let req = self.http.post(self.url(&format!("/banners/{banner_id}/view")));
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_status(response).await
    }

    /// Record a click-through. Callers treat failures as best-effort loss.
    ///
    /// # Errors
    ///
    /// Returns transport or status errors.
    pub async fn record_click(&self, banner_id: &str) -> Result<(), ApiError> {
        let req = self.http.post(self.url(&format!("/banners/{banner_id}/click")));
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_status(response).await
    }

    /// Fetch a full property record (edit-mode hydration).
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn property(&self, id: &str) -> Result<PropertyRecord, ApiError> {
        let req = self.http.get(self.url(&format!("/properties/{id}")));
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Create a property with staged images (`POST /properties/with-images`).
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors; the status detail is the
    /// backend's verbatim message.
    pub async fn create_with_images(&self, payload: SubmissionPayload) -> Result<PropertyRecord, ApiError> {
        let form = build_multipart(payload, "images")?;
        let req = self.http.post(self.url("/properties/with-images")).multipart(form);
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Update a property (`PUT /properties/{id}/with-images`): surviving
    /// existing images as a JSON array plus new files.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn update_with_images(
        &self,
        id: &str,
        payload: SubmissionPayload,
    ) -> Result<PropertyRecord, ApiError> {
        let form = build_multipart(payload, "new_images")?;
        let req = self
            .http
            .put(self.url(&format!("/properties/{id}/with-images")))
            .multipart(form);
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Account limits for the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn my_limits(&self) -> Result<PropertyLimits, ApiError> {
        let req = self.http.get(self.url("/properties/my-limits"));
        let response = self
            .attach_auth(req)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl BannerBackend for ApiClient {
    async fn active_banners(&self, position: BannerPosition) -> Result<Vec<Banner>, ApiError> {
        Self::active_banners(self, position).await
    }

    async fn record_view(&self, banner_id: &str) -> Result<(), ApiError> {
        Self::record_view(self, banner_id).await
    }

    async fn record_click(&self, banner_id: &str) -> Result<(), ApiError> {
        Self::record_click(self, banner_id).await
    }
}

#[async_trait]
impl PropertyBackend for ApiClient {
    async fn property(&self, id: &str) -> Result<PropertyRecord, ApiError> {
        Self::property(self, id).await
    }

    async fn create_with_images(&self, payload: SubmissionPayload) -> Result<PropertyRecord, ApiError> {
        Self::create_with_images(self, payload).await
    }

    async fn update_with_images(
        &self,
        id: &str,
        payload: SubmissionPayload,
    ) -> Result<PropertyRecord, ApiError> {
        Self::update_with_images(self, id, payload).await
    }

    async fn my_limits(&self) -> Result<PropertyLimits, ApiError> {
        Self::my_limits(self).await
    }
}

// =============================================================================
// MULTIPART / ERROR BODIES
// =============================================================================

/// Convert a payload into a multipart form. `file_field` is `images` on
/// create and `new_images` on update, matching the backend's part names.
fn build_multipart(payload: SubmissionPayload, file_field: &'static str) -> Result<multipart::Form, ApiError> {
    let mut form = multipart::Form::new();
    for (name, value) in payload.text_fields {
        form = form.text(name, value);
    }
    if let Some(existing) = payload.existing_images {
        // Always sent in edit mode: an empty array is an explicit "keep
        // nothing", distinct from the field being absent.
        let encoded = serde_json::to_string(&existing).map_err(|e| ApiError::Request(e.to_string()))?;
        form = form.text("existing_images", encoded);
    }
    for file in payload.files {
        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::Request(format!("invalid content type: {e}")))?;
        form = form.part(file_field, part);
    }
    Ok(form)
}

/// Pull the backend's structured `detail` message out of an error body,
/// falling back to a generic message when the body is not the expected
/// shape.
fn extract_detail(status: u16, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            serde_json::Value::String(message) => return message,
            other if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }
    format!("request failed with status {status}")
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
