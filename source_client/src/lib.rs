pub mod paginator;

#[cfg(feature = "mocking_client")]
pub mod mocking;

use std::marker::PhantomData;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::trace;
use url::Url;

/// One page of a collection, as reported by the source.
///
/// `total` is the size of the whole collection, not of this page; the
/// paginator uses it to decide whether more pages remain.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub total: u64,
    pub items: Vec<serde_json::Value>,
}

/// Client for the source content repository.
///
/// Collections are addressed by transport-independent paths
/// (`/content_types`, `/entries`, `/assets`); the HTTP variant qualifies them
/// with the configured space. Asset bytes are fetched from the URL the source
/// declares on each asset, which may live on another host entirely.
#[derive(Debug, Clone)]
pub enum SourceClient {
    Http(HttpClient),
    #[cfg(feature = "mocking_client")]
    Mocked(mocking::MockingClient),
}

impl SourceClient {
    pub fn new_http(base_url: Url, space_id: String, access_token: String) -> Self {
        Self::Http(HttpClient {
            base_url,
            space_id,
            access_token,
            client: reqwest::Client::new(),
        })
    }

    pub async fn content_types_page(&self, skip: u64, limit: u64) -> Result<Page, Error> {
        self.fetch_page("/content_types", skip, limit, &[]).await
    }

    pub async fn entries_page(&self, skip: u64, limit: u64) -> Result<Page, Error> {
        // include=0 keeps linked entries out of the payload, links stay references
        self.fetch_page("/entries", skip, limit, &[("include", "0")])
            .await
    }

    pub async fn assets_page(&self, skip: u64, limit: u64) -> Result<Page, Error> {
        self.fetch_page("/assets", skip, limit, &[]).await
    }

    /// Fetches the raw bytes of an asset from its declared file URL.
    pub async fn download(&self, file_url: &str) -> Result<Vec<u8>, Error> {
        match self {
            SourceClient::Http(client) => client.download(file_url).await,
            #[cfg(feature = "mocking_client")]
            SourceClient::Mocked(_) => self.fetch::<Bytes>(file_url, &[]).await,
        }
    }

    async fn fetch_page(
        &self,
        path: &str,
        skip: u64,
        limit: u64,
        extra: &[(&str, &str)],
    ) -> Result<Page, Error> {
        // Creation-time ordering keeps multi-run imports deterministic
        let mut query = vec![
            ("order".to_string(), "sys.createdAt".to_string()),
            ("limit".to_string(), limit.to_string()),
            ("skip".to_string(), skip.to_string()),
        ];
        query.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self.fetch::<Json<Page>>(path, &query).await
    }

    #[tracing::instrument(target = "contentcast::source_client", name = "source:fetch", skip(self, query), err)]
    async fn fetch<R: SourceResponse>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<R::Response, Error> {
        trace!(target: "contentcast::source_client", path, "Source request");
        match self {
            SourceClient::Http(client) => client.fetch::<R>(path, query).await,
            #[cfg(feature = "mocking_client")]
            SourceClient::Mocked(client) => match client.fetch_mocked::<R>(path) {
                Ok(Some(response)) => Ok(response),
                Ok(None) => Err(Error::NoResponseContent),
                Err(mocking::MockingError { status, url }) => Err(Error::Status {
                    status: status.as_u16(),
                    path: url,
                }),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    space_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl HttpClient {
    async fn fetch<R: SourceResponse>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<R::Response, Error> {
        let url = self
            .base_url
            .join(&format!("spaces/{}{}", self.space_id, path))
            .map_err(|e| Error::ResponseFormat { msg: e.to_string() })?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|source| Error::Request {
                path: path.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        let bytes = response.bytes().await.map_err(|source| Error::Request {
            path: path.to_string(),
            source,
        })?;
        R::from_bytes(&bytes)
    }

    async fn download(&self, file_url: &str) -> Result<Vec<u8>, Error> {
        // Sources commonly declare protocol-relative file URLs
        let absolute = if file_url.starts_with("//") {
            format!("https:{file_url}")
        } else {
            file_url.to_string()
        };
        let response = self
            .client
            .get(&absolute)
            .send()
            .await
            .map_err(|e| Error::Download {
                url: file_url.to_string(),
                msg: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: file_url.to_string(),
                msg: format!("status {status}"),
            });
        }
        let bytes = response.bytes().await.map_err(|e| Error::Download {
            url: file_url.to_string(),
            msg: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// A trait meant to encapsulate the behaviour of response deserializing
pub trait SourceResponse {
    /// The type of the deserialized response
    type Response;

    /// Reads the content of `bytes` and produces the response object
    fn from_bytes(bytes: &[u8]) -> Result<Self::Response, Error>;
}

/// Indicates that the response that deserializes to `T` is expected to have a Json body
pub struct Json<T>(PhantomData<T>);

/// Forwards the response body
pub struct Bytes;

impl<T: DeserializeOwned> SourceResponse for Json<T> {
    type Response = T;

    fn from_bytes(bytes: &[u8]) -> Result<Self::Response, Error> {
        serde_json::from_slice(bytes).map_err(|err| Error::ResponseFormat {
            msg: err.to_string(),
        })
    }
}

impl SourceResponse for Bytes {
    type Response = Vec<u8>;

    fn from_bytes(bytes: &[u8]) -> Result<Self::Response, Error> {
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("source request to '{path}' failed: {source}")]
    Request {
        path: String,
        source: reqwest::Error,
    },

    #[error("source returned status {status} for '{path}'")]
    Status { status: u16, path: String },

    #[error("cannot parse source response: {msg}")]
    ResponseFormat { msg: String },

    #[error("asset download from '{url}' failed: {msg}")]
    Download { url: String, msg: String },

    #[cfg(feature = "mocking_client")]
    #[error(
        "The mocked response had no body configured - check out StubResponseBuilder::body if this is unexpected"
    )]
    NoResponseContent,
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::Error;
    use crate::SourceClient;
    use crate::mocking::MockingClient;

    #[tokio::test]
    async fn test_content_types_page() {
        let mut source = MockingClient::default();
        source
            .stub("/content_types")
            .response(StatusCode::OK)
            .json(json!({
                "total": 1,
                "items": [{"sys": {"id": "Article"}, "fields": []}],
            }))
            .finish();
        let client: SourceClient = source.into();
        let page = client.content_types_page(0, 100).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_page_fetch_error() {
        let mut source = MockingClient::default();
        source
            .stub("/entries")
            .response(StatusCode::INTERNAL_SERVER_ERROR)
            .body("")
            .finish();
        let client: SourceClient = source.into();
        let error = client.entries_page(0, 100).await.unwrap_err();
        let Error::Status { status, path } = error else {
            panic!("expected a status error, got {error:?}");
        };
        assert_eq!(status, 500);
        assert_eq!(path, "/entries");
    }

    #[tokio::test]
    async fn test_download_bytes() {
        let mut source = MockingClient::default();
        source
            .stub("//cdn.example.test/photo.jpg")
            .response(StatusCode::OK)
            .body("not JSON :)")
            .finish();
        let client: SourceClient = source.into();
        let bytes = client.download("//cdn.example.test/photo.jpg").await.unwrap();
        assert_eq!(&String::from_utf8(bytes).unwrap(), "not JSON :)");
    }
}
