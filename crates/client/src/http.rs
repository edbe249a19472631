//! [`CourseBackend`] over the course HTTP API, using [`reqwest`].

use std::time::Duration;

use academy_core::course::{CourseFieldsPatch, CourseRecord, ModuleFieldsPatch};
use academy_core::types::DbId;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::backend::{CourseBackend, ModuleInsert, ResolvedCourse};
use crate::config::ClientConfig;
use crate::error::BackendError;

/// HTTP client for one course API deployment.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct DataResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct InsertedModule {
    id: DbId,
}

impl HttpBackend {
    /// Build a client from configuration. The request timeout applies to
    /// every call.
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(client, &config.api_url, config.api_token.clone())
    }

    /// Create a backend reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: &str,
        token: Option<String>,
    ) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(api_url).map_err(|e| BackendError::InvalidBaseUrl(format!("{api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl(api_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// `{base}/api/v1/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.url(segments));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map non-2xx statuses to [`BackendError`]. A 404 becomes
    /// [`BackendError::NotFound`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if status == StatusCode::NOT_FOUND {
            Err(BackendError::NotFound(body))
        } else {
            Err(BackendError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CourseBackend for HttpBackend {
    async fn resolve(&self, external_id: &str) -> Result<ResolvedCourse, BackendError> {
        let response = self
            .request(Method::GET, &["courses", "resolve", external_id])
            .send()
            .await?;
        let body: DataResponse<ResolvedCourse> = Self::parse_response(response).await?;
        Ok(body.data)
    }

    async fn fetch_course(&self, external_id: &str) -> Result<CourseRecord, BackendError> {
        let response = self
            .request(Method::GET, &["courses", external_id])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_course(
        &self,
        course: &ResolvedCourse,
        patch: &CourseFieldsPatch,
    ) -> Result<(), BackendError> {
        let response = self
            .request(Method::PATCH, &["courses", &course.external_id])
            .json(patch)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn update_module(
        &self,
        module_id: DbId,
        patch: &ModuleFieldsPatch,
    ) -> Result<(), BackendError> {
        let id = module_id.to_string();
        let response = self
            .request(Method::PATCH, &["modules", &id])
            .json(patch)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn insert_module(
        &self,
        course: &ResolvedCourse,
        module: &ModuleInsert,
    ) -> Result<DbId, BackendError> {
        let response = self
            .request(Method::POST, &["courses", &course.external_id, "modules"])
            .json(module)
            .send()
            .await?;
        let inserted: InsertedModule = Self::parse_response(response).await?;
        Ok(inserted.id)
    }

    async fn delete_module(&self, module_id: DbId) -> Result<(), BackendError> {
        let id = module_id.to_string();
        let response = self
            .request(Method::DELETE, &["modules", &id])
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
