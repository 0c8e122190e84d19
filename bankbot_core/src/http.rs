//! HTTP utilities for making JSON calls to external services
//!
//! The main types are:
//! - [`HttpRPCError`]: Represents possible errors during a call
//!
//! The main functions are:
//! - [`http_post_json`]: POSTs a JSON body and decodes a JSON response

use http::header;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Display;

pub static CONTENT_TYPE_JSON: &str = "application/json";

/// Possible errors when working with http_post_json
#[derive(Debug, thiserror::Error)]
pub enum HttpRPCError {
    #[error("http_rpc({endpoint:?}, {path:?}): send error: {error}")]
    RequestError {
        endpoint: String,
        path: String,
        error: String,
    },

    #[error("http_rpc({endpoint:?}, {path:?}): response status {status}, error: {error}")]
    ResponseError {
        endpoint: String,
        path: String,
        status: u16,
        error: String,
    },

    #[error("http_rpc({endpoint:?}, {path:?}): parse result error: {error}")]
    ResultError {
        endpoint: String,
        path: String,
        error: String,
    },
}

impl HttpRPCError {
    /// The HTTP status code, if the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpRPCError::ResponseError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Makes an HTTP POST call with a JSON body and returns the decoded JSON response.
/// Only HTTP 200 is treated as success.
///
/// # Arguments
/// * `client` - HTTP client to use for the request
/// * `endpoint` - Base URL of the service, e.g. "https://sandbox.plaid.com"
/// * `path` - Path appended to the endpoint, e.g. "/item/public_token/exchange"
/// * `headers` - Optional headers to include in the request
/// * `body` - Value to serialize as the JSON body
///
/// # Returns
/// Result with either the deserialized response or an HttpRPCError
pub async fn http_post_json<T>(
    client: &Client,
    endpoint: &str,
    path: impl Display,
    headers: Option<http::HeaderMap>,
    body: &impl Serialize,
) -> Result<T, HttpRPCError>
where
    T: DeserializeOwned,
{
    let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
    let mut headers = headers.unwrap_or_default();
    let ct = header::HeaderValue::from_static(CONTENT_TYPE_JSON);
    headers.insert(header::CONTENT_TYPE, ct.clone());
    headers.insert(header::ACCEPT, ct);

    let body = serde_json::to_vec(body).map_err(|e| HttpRPCError::RequestError {
        endpoint: endpoint.to_string(),
        path: path.to_string(),
        error: format!("{e:?}"),
    })?;
    let res = client
        .post(url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| HttpRPCError::RequestError {
            endpoint: endpoint.to_string(),
            path: path.to_string(),
            error: format!("{e:?}"),
        })?;
    let status = res.status().as_u16();
    if status != 200 {
        return Err(HttpRPCError::ResponseError {
            endpoint: endpoint.to_string(),
            path: path.to_string(),
            status,
            error: res.text().await.unwrap_or_default(),
        });
    }

    let data = res.bytes().await.map_err(|e| HttpRPCError::ResultError {
        endpoint: endpoint.to_string(),
        path: path.to_string(),
        error: format!("{e:?}"),
    })?;
    serde_json::from_slice(&data).map_err(|e| HttpRPCError::ResultError {
        endpoint: endpoint.to_string(),
        path: path.to_string(),
        error: format!("{e:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_http_post_json() {
        let app = Router::new()
            .route(
                "/echo",
                routing::post(|Json(body): Json<Value>| async move { Json(json!({"echo": body})) }),
            )
            .route(
                "/created",
                routing::post(|| async { (StatusCode::CREATED, Json(json!({"ok": true}))) }),
            )
            .route(
                "/bad",
                routing::post(|| async { (StatusCode::BAD_REQUEST, "invalid request") }),
            )
            .route("/text", routing::post(|| async { "not json" }));
        let endpoint = serve(app).await;
        let client = Client::new();

        let res: Value = http_post_json(&client, &endpoint, "/echo", None, &json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(res, json!({"echo": {"a": 1}}));

        let err = http_post_json::<Value>(&client, &endpoint, "/created", None, &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(201));

        let err = http_post_json::<Value>(&client, &endpoint, "/bad", None, &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("invalid request"));

        let err = http_post_json::<Value>(&client, &endpoint, "/text", None, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpRPCError::ResultError { .. }));

        let err = http_post_json::<Value>(&client, "http://127.0.0.1:1", "/echo", None, &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpRPCError::RequestError { .. }));
    }
}
