//! `reqwest`-backed transport for the CLI.

use http::StatusCode;
use std::{future::Future, time::Duration};

use super::{ApiRequest, ApiTransport, HttpResponse, RequestBody};
use crate::{config::ClientConfig, error::CatalogError};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: url::Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, CatalogError> {
        let base_url = url::Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(HttpTransport { base_url, client })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, CatalogError> {
        let url = self.base_url.join(&request.path)?;
        let builder = match request.method.as_str() {
            "GET" => self.client.get(url),
            "POST" => self.client.post(url),
            other => {
                return Err(CatalogError::Command(format!(
                    "unsupported HTTP method {other}"
                )))
            }
        };
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.form(&fields),
        };
        let response = builder.send().await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| CatalogError::Transport(format!("invalid status code: {e}")))?;
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl ApiTransport for HttpTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<HttpResponse, CatalogError>> {
        self.execute(request)
    }
}
