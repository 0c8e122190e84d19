//! Plain HTTP Plaid client.
//!
//! Sends credentials in the JSON body and treats any non-200 response as a
//! failure without looking at Plaid's error codes.

use bankbot_core::{BoxPinFut, http_post_json};

use crate::{
    AccountsBalanceGetRequest, BalanceResponse, PATH_ACCOUNTS_BALANCE_GET,
    PATH_PUBLIC_TOKEN_EXCHANGE, PlaidApi, PlaidConfig, PlaidError, PublicTokenExchangeRequest,
    PublicTokenExchangeResponse,
};

#[derive(Clone)]
pub struct Client {
    endpoint: String,
    client_id: String,
    secret: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(cfg: &PlaidConfig) -> Self {
        Self {
            endpoint: cfg.endpoint(),
            client_id: cfg.client_id.clone(),
            secret: cfg.secret.clone(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(self, http: reqwest::Client) -> Self {
        Self { http, ..self }
    }
}

impl PlaidApi for Client {
    fn exchange_public_token(&self, public_token: String) -> BoxPinFut<Result<String, PlaidError>> {
        let client = self.clone();
        Box::pin(async move {
            let res: PublicTokenExchangeResponse = http_post_json(
                &client.http,
                &client.endpoint,
                PATH_PUBLIC_TOKEN_EXCHANGE,
                None,
                &PublicTokenExchangeRequest {
                    client_id: Some(&client.client_id),
                    secret: Some(&client.secret),
                    public_token: &public_token,
                },
            )
            .await?;
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
        Box::pin(async move {
            let res = http_post_json(
                &client.http,
                &client.endpoint,
                PATH_ACCOUNTS_BALANCE_GET,
                None,
                &AccountsBalanceGetRequest {
                    client_id: Some(&client.client_id),
                    secret: Some(&client.secret),
                    access_token: &access_token,
                },
            )
            .await?;
            Ok(res)
        })
    }
}
