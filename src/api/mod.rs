//! Typed access to the catalog backend.
//!
//! [`ApiTransport`] is the only seam that performs I/O. The browser build implements it over
//! `fetch` (`crate::wasm::FetchTransport`), the CLI over `reqwest` ([`native::HttpTransport`]),
//! and tests over a scripted mock. [`ApiClient`] turns raw responses into typed payloads and
//! classifies failures into [`CatalogError`].

use http::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use url::form_urlencoded;

use crate::{
    error::CatalogError,
    model::{
        ApiMessage, BooksResponse, BorrowRequest, ChatReply, DescriptionResponse, Entity,
        EntityType, OntologyGraph, ReturnRequest, SparqlResponse,
    },
};

#[cfg(all(feature = "bin", not(target_arch = "wasm32")))]
pub mod native;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path plus query string, relative to the backend origin (`/api/entity?type=Book&id=b1`).
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: &str, query: &[(&str, &str)]) -> Self {
        let path = if query.is_empty() {
            path.to_string()
        } else {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in query {
                serializer.append_pair(key, value);
            }
            format!("{path}?{}", serializer.finish())
        };
        ApiRequest {
            method: Method::GET,
            path,
            body: RequestBody::Empty,
        }
    }

    pub fn post_json<B: Serialize>(path: &str, body: &B) -> Result<Self, CatalogError> {
        Ok(ApiRequest {
            method: Method::POST,
            path: path.to_string(),
            body: RequestBody::Json(serde_json::to_value(body)?),
        })
    }

    pub fn post_form(path: &str, fields: Vec<(String, String)>) -> Self {
        ApiRequest {
            method: Method::POST,
            path: path.to_string(),
            body: RequestBody::Form(fields),
        }
    }

    pub fn post_empty(path: &str) -> Self {
        ApiRequest {
            method: Method::POST,
            path: path.to_string(),
            body: RequestBody::Empty,
        }
    }

    /// Path without the query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: serde_json::Value) -> Self {
        HttpResponse::new(StatusCode::OK, body.to_string())
    }

    /// Classifies the response and decodes the success payload.
    ///
    /// A JSON object carrying an `error` string is a server-reported failure regardless of the
    /// status code. Otherwise a non-success status is [`CatalogError::Status`].
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, CatalogError> {
        let value = serde_json::from_str::<serde_json::Value>(&self.body);
        if let Ok(serde_json::Value::Object(map)) = &value {
            if let Some(error) = map.get("error").and_then(|e| e.as_str()) {
                let details = map
                    .get("message")
                    .or_else(|| map.get("details"))
                    .and_then(|d| d.as_str())
                    .map(|d| d.to_string());
                return Err(CatalogError::Server {
                    status: self.status.as_u16(),
                    error: error.to_string(),
                    details,
                });
            }
        }
        if !self.status.is_success() {
            return Err(CatalogError::Status(self.status.as_u16()));
        }
        Ok(serde_json::from_value(value?)?)
    }
}

pub trait ApiTransport {
    /// Issues one request. Errors are reserved for failures to obtain a response at all; any
    /// HTTP status is returned as an [`HttpResponse`].
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<HttpResponse, CatalogError>>;
}

/// Endpoint wrappers over an [`ApiTransport`].
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: ApiTransport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        ApiClient { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, CatalogError> {
        tracing::debug!("{} {}", request.method, request.path);
        let response = self.transport.send(request).await?;
        tracing::debug!("Response status: {}", response.status);
        response.into_payload()
    }

    pub async fn chat_init(&self) -> Result<ChatReply, CatalogError> {
        self.call(ApiRequest::get("/api/chat/init", &[])).await
    }

    pub async fn chat_message(&self, message: &str) -> Result<ChatReply, CatalogError> {
        self.call(ApiRequest::get(
            "/api/chat/message",
            &[("message", message)],
        ))
        .await
    }

    pub async fn books(&self) -> Result<BooksResponse, CatalogError> {
        self.call(ApiRequest::get("/api/books", &[])).await
    }

    pub async fn ontology_graph(&self) -> Result<OntologyGraph, CatalogError> {
        self.call(ApiRequest::get("/api/ontology_graph", &[])).await
    }

    pub async fn borrow(&self, request: &BorrowRequest) -> Result<ApiMessage, CatalogError> {
        self.call(ApiRequest::post_json("/api/borrow", request)?)
            .await
    }

    pub async fn return_book(&self, request: &ReturnRequest) -> Result<ApiMessage, CatalogError> {
        self.call(ApiRequest::post_json("/api/return", request)?)
            .await
    }

    pub async fn clear_borrowing_data(&self) -> Result<ApiMessage, CatalogError> {
        self.call(ApiRequest::post_empty("/api/clear_borrowing_data"))
            .await
    }

    /// `request` is built by [`crate::sparql::SparqlForm::to_request`], which picks the body
    /// encoding.
    pub async fn sparql(&self, request: ApiRequest) -> Result<SparqlResponse, CatalogError> {
        self.call(request).await
    }

    pub async fn description(
        &self,
        name: &str,
        entity_type: EntityType,
    ) -> Result<DescriptionResponse, CatalogError> {
        self.call(ApiRequest::get(
            "/api/description",
            &[("name", name), ("type", entity_type.as_str())],
        ))
        .await
    }

    pub async fn entity(&self, entity_type: EntityType, id: &str) -> Result<Entity, CatalogError> {
        self.call(ApiRequest::get(
            "/api/entity",
            &[("type", entity_type.as_str()), ("id", id)],
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_get_encodes_query() {
        let request = ApiRequest::get("/api/chat/message", &[("message", "hi there & bye")]);
        assert_eq!(request.path, "/api/chat/message?message=hi+there+%26+bye");
        assert_eq!(request.route(), "/api/chat/message");
    }

    #[test]
    fn test_error_field_wins_over_status() {
        let response = HttpResponse::new(
            StatusCode::BAD_REQUEST,
            json!({"error": "Missing required fields"}).to_string(),
        );
        let err = response.into_payload::<ApiMessage>().unwrap_err();
        assert_eq!(
            err,
            CatalogError::Server {
                status: 400,
                error: "Missing required fields".to_string(),
                details: None
            }
        );
        assert!(err.is_server_reported());
        assert_eq!(err.response_status(), Some(400));
    }

    #[test]
    fn test_error_details_are_kept() {
        let response = HttpResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to update ontology", "details": "disk full"}).to_string(),
        );
        assert!(matches!(
            response.into_payload::<ApiMessage>(),
            Err(CatalogError::Server { details: Some(d), .. }) if d == "disk full"
        ));
    }

    #[test]
    fn test_plain_failure_status() {
        let response = HttpResponse::new(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        let err = response.into_payload::<ApiMessage>().unwrap_err();
        assert_eq!(err, CatalogError::Status(502));
        assert!(!err.is_server_reported());
    }

    #[test]
    fn test_undecodable_success_body() {
        let response = HttpResponse::new(StatusCode::OK, "not json");
        assert!(matches!(
            response.into_payload::<ApiMessage>(),
            Err(CatalogError::Serialization(_))
        ));
    }
}
