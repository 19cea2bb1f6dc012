use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::SearchRequest;

const OCTET_STREAM: &str = "application/octet-stream";

/// 上游搜尋介面，測試時可替換成假的實作
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// 送出搜尋表單，回傳結果頁 HTML
    async fn submit(&self, request: &SearchRequest) -> Result<String>;
}

/// 透過 HTTP 呼叫 IqDB
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
}

impl HttpFetcher {
    pub fn new(endpoint: &str, timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("無法建立 HTTP 客戶端")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn build_form(request: &SearchRequest) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }

        let image = &request.image;
        // Bytes 是引用計數，clone 不會複製內容
        let part = || {
            Part::stream_with_length(image.bytes.clone(), image.bytes.len() as u64)
                .file_name(image.file_name.clone())
        };
        let part = match image.content_type.as_deref() {
            Some(content_type) => part().mime_str(content_type).or_else(|_| {
                warn!(content_type, "無效的 Content-Type，改用 octet-stream");
                part().mime_str(OCTET_STREAM)
            })?,
            None => part().mime_str(OCTET_STREAM)?,
        };

        Ok(form.part("file", part))
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn submit(&self, request: &SearchRequest) -> Result<String> {
        let form = Self::build_form(request)?;

        debug!(
            endpoint = %self.endpoint,
            services = request.services.len(),
            discolor = request.discolor,
            bytes = request.image.bytes.len(),
            "送出搜尋"
        );

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            // 照樣解析內容，空頁面就是沒有結果
            warn!(status = status.as_u16(), "IqDB 回應非 2xx");
        }

        Ok(response.text().await?)
    }
}
