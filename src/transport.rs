use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, header};
use std::time::Duration;
use url::Url;

/// リクエストタイムアウト（秒）
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 認証済みJSON GET/POSTを1回実行する抽象
///
/// 型付きのデコードは呼び出し側で行う（デコードエラーを通信エラーと区別するため）。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value>;

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value>;
}

/// reqwestによるBasic認証付きトランスポート
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// `token` は `user:password` 形式の平文。Base64化してAuthorizationヘッダーに設定する
    pub fn new(base_url: &str, token: &str, extra_headers: &[(&str, &str)]) -> Result<Self> {
        let _ = Url::parse(base_url)
            .map_err(|_| Error::InvalidConfiguration(format!("Invalid base URL: {}", base_url)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let encoded = base64::engine::general_purpose::STANDARD.encode(token.as_bytes());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Basic {}", encoded))
                .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?,
        );

        for (name, value) in extra_headers {
            let name = header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidConfiguration(format!("Invalid header name: {}", name)))?;
            let value = header::HeaderValue::from_str(value)
                .map_err(|_| Error::InvalidConfiguration(format!("Invalid value for header {}", name.as_str())))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(Error::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }
}
