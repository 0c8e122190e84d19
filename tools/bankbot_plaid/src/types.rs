//! Wire types of the Plaid endpoints used by Bankbot.
//!
//! Only the fields Bankbot reads are modeled, unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::PlaidError;

pub const PATH_PUBLIC_TOKEN_EXCHANGE: &str = "/item/public_token/exchange";
pub const PATH_ACCOUNTS_BALANCE_GET: &str = "/accounts/balance/get";

/// Request body of `/item/public_token/exchange`.
/// Credentials are omitted when they are sent as headers.
#[derive(Debug, Clone, Serialize)]
pub struct PublicTokenExchangeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<&'a str>,
    pub public_token: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PublicTokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Request body of `/accounts/balance/get`.
#[derive(Debug, Clone, Serialize)]
pub struct AccountsBalanceGetRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<&'a str>,
    pub access_token: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BalanceResponse {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl BalanceResponse {
    /// The available balance of the first linked account.
    pub fn first_available(&self) -> Result<&Number, PlaidError> {
        let account = self.accounts.first().ok_or(PlaidError::NoAccounts)?;
        account
            .balances
            .available
            .as_ref()
            .ok_or_else(|| PlaidError::MissingBalance {
                account_id: account.account_id.clone(),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Account {
    #[serde(default)]
    pub account_id: String,
    pub balances: Balances,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

/// Balances are kept as JSON numbers so they render exactly as Plaid sent them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Balances {
    #[serde(default)]
    pub available: Option<Number>,
    #[serde(default)]
    pub current: Option<Number>,
    #[serde(default)]
    pub limit: Option<Number>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
    #[serde(default)]
    pub unofficial_currency_code: Option<String>,
}
