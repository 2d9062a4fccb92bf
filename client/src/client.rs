//! HTTP implementation of [`SlugApi`].

use crate::config::{ClientConfig, ConfigError};
use crate::wire::{self, CreateSlugBody, UpdateSlugBody};
use reqwest::{Client, Response, StatusCode};
use slug_registry_core::{ApiError, ApiFuture, NewSlug, OwnerId, SlugApi, SlugId, SlugRecord};

/// Slug backend client over HTTP
///
/// Stateless apart from the pooled connection client. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct HttpSlugApi {
    client: Client,
    base_url: String,
}

impl HttpSlugApi {
    /// Create a client from explicit configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a client configured from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds invalid settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[tracing::instrument(skip_all, fields(owner = %owner))]
    async fn fetch_list(&self, owner: OwnerId) -> Result<Vec<SlugRecord>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/slugs"))
            .query(&[("userid", owner.as_str())])
            .send()
            .await
            .map_err(transport)?;

        let body = success_body(response).await?;
        let slugs = wire::decode_list(&body)?;
        tracing::debug!(count = slugs.len(), "Fetched slugs");
        Ok(slugs)
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, slug = %slug.slug))]
    async fn post_slug(&self, owner: OwnerId, slug: NewSlug) -> Result<SlugRecord, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/slugs"))
            .json(&CreateSlugBody {
                slug: &slug.slug,
                redirect: &slug.redirect,
                uid: owner.as_str(),
            })
            .send()
            .await
            .map_err(transport)?;

        let body = success_body(response).await?;
        let record = wire::decode_record(&body)?;
        tracing::debug!(id = %record.id, "Slug created");
        Ok(record)
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, id = %record.id))]
    async fn put_slug(&self, owner: OwnerId, record: SlugRecord) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.endpoint("/slugs"))
            .json(&UpdateSlugBody {
                id: record.id.as_str(),
                slug: &record.slug,
                redirect: &record.redirect,
                uid: owner.as_str(),
            })
            .send()
            .await
            .map_err(transport)?;

        // The acknowledgement body is not trusted over what the caller sent.
        success_body(response).await.map(|_| ())
    }

    #[tracing::instrument(skip_all, fields(owner = %owner, id = %id))]
    async fn delete_slug(&self, owner: OwnerId, id: SlugId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint("/slugs"))
            .query(&[("userid", owner.as_str()), ("id", id.as_str())])
            .send()
            .await
            .map_err(transport)?;

        success_body(response).await.map(|_| ())
    }

    #[tracing::instrument(skip(self))]
    async fn lookup(&self, slug: String) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/slug"))
            .query(&[("slug", slug.as_str())])
            .send()
            .await
            .map_err(transport)?;

        // The backend answers an unknown slug with 400 and an empty object.
        if matches!(response.status(), StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND) {
            return Err(ApiError::NotFound(slug));
        }

        let body = success_body(response).await?;
        wire::decode_redirect(&slug, &body)
    }
}

impl SlugApi for HttpSlugApi {
    fn list(&self, owner: OwnerId) -> ApiFuture<'_, Vec<SlugRecord>> {
        Box::pin(self.fetch_list(owner))
    }

    fn create(&self, owner: OwnerId, slug: NewSlug) -> ApiFuture<'_, SlugRecord> {
        Box::pin(self.post_slug(owner, slug))
    }

    fn update(&self, owner: OwnerId, record: SlugRecord) -> ApiFuture<'_, ()> {
        Box::pin(self.put_slug(owner, record))
    }

    fn delete(&self, owner: OwnerId, id: SlugId) -> ApiFuture<'_, ()> {
        Box::pin(self.delete_slug(owner, id))
    }

    fn resolve(&self, slug: String) -> ApiFuture<'_, String> {
        Box::pin(self.lookup(slug))
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::TransportFailure(err.to_string())
}

/// Read the body of a 2xx response, or turn the response into `ServerRejected`.
async fn success_body(response: Response) -> Result<Vec<u8>, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "Backend rejected request");
        return Err(ApiError::ServerRejected {
            status: status.as_u16(),
            body,
        });
    }

    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(transport)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::new("http://slugs.internal:8080/").unwrap();
        let client = HttpSlugApi::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://slugs.internal:8080");
        assert_eq!(client.endpoint("/slugs"), "http://slugs.internal:8080/slugs");
    }
}
