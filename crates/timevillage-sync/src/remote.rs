//! Remote document stores

use crate::config::CloudConfig;
use crate::document::UserDocument;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

/// Document store keyed by user id
pub trait RemoteStore: Send + Sync {
    /// Read the user's document; `None` when it does not exist
    fn fetch(&self, user_id: &str) -> impl Future<Output = Result<Option<UserDocument>>> + Send;

    /// Overwrite the user's document unconditionally
    fn store(
        &self,
        user_id: &str,
        document: &UserDocument,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// JSON documents at `{base_url}/users/{user_id}`
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemote {
    pub fn new(config: &CloudConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, user_id: &str) -> String {
        format!("{}/users/{}", self.base_url, user_id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl RemoteStore for HttpRemote {
    async fn fetch(&self, user_id: &str) -> Result<Option<UserDocument>> {
        let url = self.url(user_id);
        let response = self.authorize(self.client.get(&url)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.text().await?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            status => Err(Error::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    async fn store(&self, user_id: &str, document: &UserDocument) -> Result<()> {
        let url = self.url(user_id);
        let response = self
            .authorize(self.client.put(&url))
            .json(document)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// In-process document store
#[derive(Debug, Default)]
pub struct MemoryRemote {
    documents: Mutex<HashMap<String, UserDocument>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document for a user
    pub fn get(&self, user_id: &str) -> Option<UserDocument> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
    }

    pub fn insert(&self, user_id: impl Into<String>, document: UserDocument) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.into(), document);
    }
}

impl RemoteStore for MemoryRemote {
    async fn fetch(&self, user_id: &str) -> Result<Option<UserDocument>> {
        Ok(self.get(user_id))
    }

    async fn store(&self, user_id: &str, document: &UserDocument) -> Result<()> {
        self.insert(user_id, document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full};
    use hyper::body::{Bytes, Incoming};
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Method, Request, Response};
    use hyper_util::rt::TokioIo;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    type Documents = Arc<Mutex<HashMap<String, Bytes>>>;

    fn reply(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
        Response::builder()
            .status(status)
            .body(Full::new(body))
            .unwrap()
    }

    /// Minimal document server: `/users/broken` always fails, everything
    /// else needs `Bearer secret`.
    async fn handle(
        documents: Documents,
        req: Request<Incoming>,
    ) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
        let path = req.uri().path().to_string();
        if path == "/users/broken" {
            return Ok(reply(StatusCode::INTERNAL_SERVER_ERROR, Bytes::new()));
        }
        let authorized = req
            .headers()
            .get("authorization")
            .is_some_and(|value| value == "Bearer secret");
        if !authorized {
            return Ok(reply(StatusCode::UNAUTHORIZED, Bytes::new()));
        }

        match *req.method() {
            Method::PUT => {
                let body = req.into_body().collect().await?.to_bytes();
                documents.lock().unwrap().insert(path, body);
                Ok(reply(StatusCode::NO_CONTENT, Bytes::new()))
            }
            Method::GET => {
                let stored = documents.lock().unwrap().get(&path).cloned();
                Ok(match stored {
                    Some(body) => reply(StatusCode::OK, body),
                    None => reply(StatusCode::NOT_FOUND, Bytes::new()),
                })
            }
            _ => Ok(reply(StatusCode::METHOD_NOT_ALLOWED, Bytes::new())),
        }
    }

    async fn serve() -> (String, Documents) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let documents = Documents::default();
        let shared = documents.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let documents = shared.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(documents.clone(), req));
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
        (format!("http://{}", addr), documents)
    }

    fn http_remote(base_url: &str, token: Option<&str>) -> HttpRemote {
        HttpRemote::new(&CloudConfig {
            base_url: base_url.to_string(),
            auth_token: token.map(str::to_string),
            ..CloudConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_remote_store_then_fetch() {
        let (base_url, documents) = serve().await;
        let remote = http_remote(&base_url, Some("secret"));

        assert!(remote.fetch("u-1").await.unwrap().is_none());

        let doc: UserDocument = serde_json::from_str(
            r#"{"accumulatedTime": 7, "globalTime": 9, "nickname": "Mira",
                "buildings": [ { "type": "MAIN", "level": 2, "x": 0, "y": 0 } ]}"#,
        )
        .unwrap();
        remote.store("u-1", &doc).await.unwrap();
        assert!(documents.lock().unwrap().contains_key("/users/u-1"));
        assert_eq!(remote.fetch("u-1").await.unwrap(), Some(doc));
    }

    #[tokio::test]
    async fn test_http_remote_error_status() {
        let (base_url, _) = serve().await;
        let remote = http_remote(&base_url, Some("secret"));
        let doc: UserDocument = serde_json::from_str("{}").unwrap();

        let result = remote.fetch("broken").await;
        assert!(matches!(result, Err(Error::Status { status: 500, .. })));
        let result = remote.store("broken", &doc).await;
        assert!(matches!(result, Err(Error::Status { status: 500, .. })));

        let anonymous = http_remote(&base_url, None);
        let result = anonymous.store("u-1", &doc).await;
        assert!(matches!(result, Err(Error::Status { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_transport_error() {
        let remote = HttpRemote::new(&CloudConfig {
            base_url: "http://127.0.0.1:1/".to_string(),
            ..CloudConfig::default()
        })
        .unwrap();
        assert_eq!(remote.url("abc"), "http://127.0.0.1:1/users/abc");

        let result = remote.fetch("abc").await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_memory_remote() {
        let remote = MemoryRemote::new();
        assert!(remote.fetch("u").await.unwrap().is_none());

        let doc: UserDocument = serde_json::from_str(r#"{"accumulatedTime": 5}"#).unwrap();
        remote.store("u", &doc).await.unwrap();
        assert_eq!(remote.fetch("u").await.unwrap(), Some(doc));
    }
}
