//! Typed Plaid API client
//!
//! Mirrors how Plaid's official client libraries talk to the API:
//! - credentials are sent in the `PLAID-CLIENT-ID` and `PLAID-SECRET` headers
//! - the API version is pinned with the `Plaid-Version` header
//! - non-success responses are decoded into Plaid's error object
//!
//! # API Reference
//! - https://plaid.com/docs/api/items/#itempublic_tokenexchange
//! - https://plaid.com/docs/api/products/balance/#accountsbalanceget

use bankbot_core::{BoxPinFut, CONTENT_TYPE_JSON};
use http::header;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    AccountsBalanceGetRequest, BalanceResponse, PATH_ACCOUNTS_BALANCE_GET,
    PATH_PUBLIC_TOKEN_EXCHANGE, PlaidApi, PlaidApiError, PlaidConfig, PlaidError,
    PublicTokenExchangeRequest, PublicTokenExchangeResponse,
};

pub const PLAID_VERSION: &str = "2020-09-14";

static HEADER_PLAID_CLIENT_ID: &str = "PLAID-CLIENT-ID";
static HEADER_PLAID_SECRET: &str = "PLAID-SECRET";
static HEADER_PLAID_VERSION: &str = "Plaid-Version";

/// Plaid API client
#[derive(Clone)]
pub struct Client {
    endpoint: String,
    client_id: String,
    secret: String,
    http: reqwest::Client,
}

impl Client {
    /// Creates a new client for the configured environment
    pub fn new(cfg: &PlaidConfig) -> Self {
        Self {
            endpoint: cfg.endpoint(),
            client_id: cfg.client_id.clone(),
            secret: cfg.secret.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Sets a custom HTTP client for the client
    pub fn with_client(self, http: reqwest::Client) -> Self {
        Self { http, ..self }
    }

    /// Creates a POST request builder for the given API path
    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.endpoint, path);
        self.http
            .post(url)
            .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(HEADER_PLAID_CLIENT_ID, &self.client_id)
            .header(HEADER_PLAID_SECRET, &self.secret)
            .header(HEADER_PLAID_VERSION, PLAID_VERSION)
    }

    async fn call<Req, Res>(&self, path: &str, req: &Req) -> Result<Res, PlaidError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let response = self
            .post(path)
            .json(req)
            .send()
            .await
            .map_err(|err| PlaidError::Request {
                path: path.to_string(),
                error: err.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| PlaidError::Request {
            path: path.to_string(),
            error: err.to_string(),
        })?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|err| PlaidError::Decode {
                path: path.to_string(),
                error: format!("{err}, body: {text}"),
            });
        }

        match serde_json::from_str::<PlaidApiError>(&text) {
            Ok(error) => Err(PlaidError::Api {
                path: path.to_string(),
                status: status.as_u16(),
                error,
            }),
            Err(_) => Err(PlaidError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    /// POST /item/public_token/exchange
    pub async fn item_public_token_exchange(
        &self,
        public_token: &str,
    ) -> Result<PublicTokenExchangeResponse, PlaidError> {
        self.call(
            PATH_PUBLIC_TOKEN_EXCHANGE,
            &PublicTokenExchangeRequest {
                client_id: None,
                secret: None,
                public_token,
            },
        )
        .await
    }

    /// POST /accounts/balance/get
    pub async fn accounts_balance_get(
        &self,
        access_token: &str,
    ) -> Result<BalanceResponse, PlaidError> {
        self.call(
            PATH_ACCOUNTS_BALANCE_GET,
            &AccountsBalanceGetRequest {
                client_id: None,
                secret: None,
                access_token,
            },
        )
        .await
    }
}

impl PlaidApi for Client {
    fn exchange_public_token(&self, public_token: String) -> BoxPinFut<Result<String, PlaidError>> {
        let client = self.clone();
        Box::pin(async move {
            let res = client.item_public_token_exchange(&public_token).await?;
            if res.access_token.is_empty() {
                return Err(PlaidError::Decode {
                    path: PATH_PUBLIC_TOKEN_EXCHANGE.to_string(),
                    error: "empty access_token".to_string(),
                });
            }
            Ok(res.access_token)
        })
    }

    fn accounts_balance(
        &self,
        access_token: String,
    ) -> BoxPinFut<Result<BalanceResponse, PlaidError>> {
        let client = self.clone();
        Box::pin(async move { client.accounts_balance_get(&access_token).await })
    }
}
