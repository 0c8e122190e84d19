//! Bankbot integration with the Plaid API
//!
//! Plaid is reached through the [`PlaidApi`] interface, with two interchangeable
//! transports selected by [`PlaidConfig::transport`]:
//! - [`sdk::Client`]: typed client authenticating with headers and decoding Plaid error objects
//! - [`raw::Client`]: plain JSON POSTs, any non-200 response is a failure
//!
//! [`CheckBalanceAction`] uses either of them to answer balance questions.

use bankbot_core::BoxPinFut;

pub mod action;
pub mod config;
pub mod error;
pub mod raw;
pub mod sdk;
pub mod types;

pub use action::*;
pub use config::*;
pub use error::*;
pub use types::*;

pub static APP_USER_AGENT: &str = concat!(
    "bankbot ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
);

/// Plaid endpoints used by Bankbot.
pub trait PlaidApi: Send + Sync {
    /// Exchanges a Link public token for an access token.
    fn exchange_public_token(&self, public_token: String) -> BoxPinFut<Result<String, PlaidError>>;

    /// Retrieves real-time balances of the accounts linked to the access token.
    fn accounts_balance(
        &self,
        access_token: String,
    ) -> BoxPinFut<Result<BalanceResponse, PlaidError>>;
}
