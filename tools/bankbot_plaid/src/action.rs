//! Lets the user ask for their bank balance
//!
//! The action exchanges the Link public token found in the conversation for an
//! access token, fetches the balances of the linked accounts and reports the
//! available balance of the first one. Every failure ends the turn with a fixed
//! message; details are only logged.

use bankbot_core::{Action, BoxError, CollectingDispatcher, Domain, Event, Tracker};
use std::sync::Arc;

use crate::{PlaidApi, PlaidConfig, PlaidError};

pub const SLOT_PUBLIC_TOKEN: &str = "public_token";
pub const SLOT_ACCESS_TOKEN: &str = "access_token";

/// Reasons a balance check ends without reporting a balance.
#[derive(Debug, thiserror::Error)]
pub enum BalanceCheckError {
    #[error("public token slot is absent")]
    MissingInput,

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(#[source] PlaidError),

    #[error("balance retrieval failed: {0}")]
    BalanceRetrievalFailed(#[source] PlaidError),
}

impl BalanceCheckError {
    /// The fixed message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            BalanceCheckError::MissingInput => "Public token not available.",
            BalanceCheckError::TokenExchangeFailed(_) => "Failed to exchange public token.",
            BalanceCheckError::BalanceRetrievalFailed(_) => "Failed to retrieve balance.",
        }
    }
}

/// Result of a successful balance check.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceCheck {
    pub access_token: String,
    /// The available balance, rendered as Plaid sent it
    pub available: String,
}

/// Custom action answering "what is my balance?"
#[derive(Clone)]
pub struct CheckBalanceAction {
    api: Arc<dyn PlaidApi>,
    persist_access_token: bool,
}

impl CheckBalanceAction {
    pub const NAME: &'static str = "action_check_balance";

    pub fn new(api: Arc<dyn PlaidApi>) -> Self {
        Self {
            api,
            persist_access_token: true,
        }
    }

    /// Builds the action with the transport selected in the config.
    pub fn from_config(cfg: &PlaidConfig) -> Result<Self, BoxError> {
        let api = cfg.build_api()?;
        Ok(Self::new(api).with_persist_access_token(cfg.persist_access_token))
    }

    pub fn with_persist_access_token(mut self, persist: bool) -> Self {
        self.persist_access_token = persist;
        self
    }

    pub async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<String, BalanceCheckError> {
        self.api
            .exchange_public_token(public_token.to_string())
            .await
            .map_err(BalanceCheckError::TokenExchangeFailed)
    }

    pub async fn available_balance(&self, access_token: &str) -> Result<String, BalanceCheckError> {
        let res = self
            .api
            .accounts_balance(access_token.to_string())
            .await
            .map_err(BalanceCheckError::BalanceRetrievalFailed)?;
        let available = res
            .first_available()
            .map_err(BalanceCheckError::BalanceRetrievalFailed)?;
        Ok(available.to_string())
    }

    /// Runs exchange then fetch for the conversation.
    pub async fn check(&self, tracker: &Tracker) -> Result<BalanceCheck, BalanceCheckError> {
        let public_token = tracker
            .get_str_slot(SLOT_PUBLIC_TOKEN)
            .ok_or(BalanceCheckError::MissingInput)?;
        let access_token = self.exchange_public_token(public_token).await?;
        let available = self.available_balance(&access_token).await?;
        Ok(BalanceCheck {
            access_token,
            available,
        })
    }
}

impl Action for CheckBalanceAction {
    fn name(&self) -> String {
        Self::NAME.to_string()
    }

    async fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        tracker: &Tracker,
        _domain: &Domain,
    ) -> Result<Vec<Event>, BoxError> {
        match self.check(tracker).await {
            Ok(res) => {
                log::info!(
                    action = Self::NAME,
                    sender = tracker.sender_id.as_str();
                    "balance retrieved",
                );
                dispatcher.utter_message(format!("Your balance is {}", res.available));
                if self.persist_access_token {
                    Ok(vec![Event::slot_set(SLOT_ACCESS_TOKEN, res.access_token)])
                } else {
                    Ok(vec![])
                }
            }
            Err(err) => {
                match &err {
                    BalanceCheckError::MissingInput => log::warn!(
                        action = Self::NAME,
                        sender = tracker.sender_id.as_str();
                        "{err}",
                    ),
                    _ => log::error!(
                        action = Self::NAME,
                        sender = tracker.sender_id.as_str();
                        "{err}",
                    ),
                }
                dispatcher.utter_message(err.user_message());
                Ok(vec![])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BalanceResponse, mock_server::serve, types::*};
    use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing};
    use bankbot_core::{ActionSet, BotMessage, BoxPinFut};
    use serde_json::{Value, json};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct MockPlaid {
        exchange: Mutex<Option<Result<String, u16>>>,
        balance: Mutex<Option<Value>>,
        exchange_calls: AtomicUsize,
        balance_calls: AtomicUsize,
        tokens_seen: Mutex<Vec<String>>,
    }

    impl MockPlaid {
        fn new(exchange: Result<&str, u16>, balance: Value) -> Arc<Self> {
            Arc::new(Self {
                exchange: Mutex::new(Some(exchange.map(|s| s.to_string()))),
                balance: Mutex::new(Some(balance)),
                ..Default::default()
            })
        }
    }

    impl PlaidApi for MockPlaid {
        fn exchange_public_token(
            &self,
            public_token: String,
        ) -> BoxPinFut<Result<String, PlaidError>> {
            self.exchange_calls.fetch_add(1, Ordering::SeqCst);
            self.tokens_seen.lock().unwrap().push(public_token);
            let res = match self.exchange.lock().unwrap().clone() {
                Some(Ok(token)) => Ok(token),
                Some(Err(status)) => Err(PlaidError::Status {
                    path: PATH_PUBLIC_TOKEN_EXCHANGE.to_string(),
                    status,
                    body: String::new(),
                }),
                None => Err(PlaidError::Request {
                    path: PATH_PUBLIC_TOKEN_EXCHANGE.to_string(),
                    error: "connection refused".to_string(),
                }),
            };
            Box::pin(async move { res })
        }

        fn accounts_balance(
            &self,
            access_token: String,
        ) -> BoxPinFut<Result<BalanceResponse, PlaidError>> {
            self.balance_calls.fetch_add(1, Ordering::SeqCst);
            self.tokens_seen.lock().unwrap().push(access_token);
            let res = match self.balance.lock().unwrap().clone() {
                Some(body) => serde_json::from_value(body).map_err(|err| PlaidError::Decode {
                    path: PATH_ACCOUNTS_BALANCE_GET.to_string(),
                    error: err.to_string(),
                }),
                None => Err(PlaidError::Request {
                    path: PATH_ACCOUNTS_BALANCE_GET.to_string(),
                    error: "connection refused".to_string(),
                }),
            };
            Box::pin(async move { res })
        }
    }

    async fn run(action: &CheckBalanceAction, tracker: &Tracker) -> (Vec<BotMessage>, Vec<Event>) {
        let mut dispatcher = CollectingDispatcher::new();
        let events = action
            .run(&mut dispatcher, tracker, &json!({}))
            .await
            .unwrap();
        (dispatcher.into_messages(), events)
    }

    fn tracker() -> Tracker {
        Tracker::new("user-1".to_string()).with_slot(SLOT_PUBLIC_TOKEN, "public-sandbox-abc")
    }

    #[tokio::test]
    async fn test_check_balance_success() {
        let mock = MockPlaid::new(
            Ok("access-sandbox-123"),
            json!({"accounts":[{"balances":{"available": 542.17}}]}),
        );
        let action = CheckBalanceAction::new(mock.clone());
        assert_eq!(action.name(), "action_check_balance");

        let (messages, events) = run(&action, &tracker()).await;
        assert_eq!(messages, vec![BotMessage::from("Your balance is 542.17")]);
        assert_eq!(
            events,
            vec![Event::slot_set("access_token", "access-sandbox-123")]
        );
        assert_eq!(
            *mock.tokens_seen.lock().unwrap(),
            vec!["public-sandbox-abc", "access-sandbox-123"]
        );

        // no hidden state between runs
        let (messages2, events2) = run(&action, &tracker()).await;
        assert_eq!(messages, messages2);
        assert_eq!(events, events2);
        assert_eq!(mock.exchange_calls.load(Ordering::SeqCst), 2);
        assert_eq!(mock.balance_calls.load(Ordering::SeqCst), 2);

        let action = action.with_persist_access_token(false);
        let (messages, events) = run(&action, &tracker()).await;
        assert_eq!(messages, vec![BotMessage::from("Your balance is 542.17")]);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_check_balance_missing_public_token() {
        let mock = MockPlaid::new(Ok("access-sandbox-123"), json!({"accounts": []}));
        let action = CheckBalanceAction::new(mock.clone());

        for tracker in [
            Tracker::new("user-1".to_string()),
            Tracker::new("user-1".to_string()).with_slot(SLOT_PUBLIC_TOKEN, Value::Null),
            Tracker::new("user-1".to_string()).with_slot(SLOT_PUBLIC_TOKEN, ""),
            Tracker::new("user-1".to_string()).with_slot(SLOT_PUBLIC_TOKEN, 42),
        ] {
            let (messages, events) = run(&action, &tracker).await;
            assert_eq!(messages, vec![BotMessage::from("Public token not available.")]);
            assert!(events.is_empty());
        }
        assert_eq!(mock.exchange_calls.load(Ordering::SeqCst), 0);
        assert_eq!(mock.balance_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_check_balance_exchange_failed() {
        for mock in [
            MockPlaid::new(Err(400), json!({"accounts": []})),
            Arc::new(MockPlaid::default()),
        ] {
            let action = CheckBalanceAction::new(mock.clone());
            let (messages, events) = run(&action, &tracker()).await;
            assert_eq!(
                messages,
                vec![BotMessage::from("Failed to exchange public token.")]
            );
            assert!(events.is_empty());
            assert_eq!(mock.exchange_calls.load(Ordering::SeqCst), 1);
            assert_eq!(mock.balance_calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_check_balance_fetch_failed() {
        for balance in [
            json!({"accounts": []}),
            json!({"accounts": [{"balances": {"current": 10}}]}),
            json!({"accounts": [{"balances": {"available": null}}]}),
            json!({"accounts": [{"name": "checking"}]}),
            json!({"error": "unexpected"}),
        ] {
            let mock = MockPlaid::new(Ok("access-sandbox-123"), balance);
            let action = CheckBalanceAction::new(mock.clone());
            let (messages, events) = run(&action, &tracker()).await;
            assert_eq!(messages, vec![BotMessage::from("Failed to retrieve balance.")]);
            assert!(events.is_empty());
            assert_eq!(mock.balance_calls.load(Ordering::SeqCst), 1);
        }

        let mock = Arc::new(MockPlaid {
            exchange: Mutex::new(Some(Ok("access-sandbox-123".to_string()))),
            ..Default::default()
        });
        let action = CheckBalanceAction::new(mock);
        let (messages, events) = run(&action, &tracker()).await;
        assert_eq!(messages, vec![BotMessage::from("Failed to retrieve balance.")]);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_check_error_kinds() {
        let mock = MockPlaid::new(Ok("access-sandbox-123"), json!({"accounts": []}));
        let action = CheckBalanceAction::new(mock);
        match action.check(&tracker()).await {
            Err(BalanceCheckError::BalanceRetrievalFailed(PlaidError::NoAccounts)) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            action.check(&Tracker::default()).await,
            Err(BalanceCheckError::MissingInput)
        ));
    }

    async fn plaid_server(exchange_status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let balance_calls = Arc::new(AtomicUsize::new(0));
        let counter = balance_calls.clone();
        let app = Router::new()
            .route(
                PATH_PUBLIC_TOKEN_EXCHANGE,
                routing::post(move |Json(body): Json<Value>| async move {
                    if exchange_status != StatusCode::OK {
                        return (exchange_status, Json(json!({"error_type": "INVALID_INPUT"})))
                            .into_response();
                    }
                    assert_eq!(body["public_token"], "public-sandbox-abc");
                    Json(json!({"access_token": "access-sandbox-123"})).into_response()
                }),
            )
            .route(
                PATH_ACCOUNTS_BALANCE_GET,
                routing::post(move |Json(body): Json<Value>| async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(body["access_token"], "access-sandbox-123");
                    Json(json!({"accounts":[{"balances":{"available": 542.17}}]}))
                }),
            );
        (serve(app).await, balance_calls)
    }

    #[tokio::test]
    async fn test_check_balance_over_http_transports() {
        for transport in [crate::Transport::Http, crate::Transport::Sdk] {
            let (endpoint, balance_calls) = plaid_server(StatusCode::OK).await;
            let mut cfg = PlaidConfig::new("cid".to_string(), "sec".to_string());
            cfg.transport = transport;
            cfg.endpoint = Some(endpoint);
            let mut actions = ActionSet::new();
            actions.add(CheckBalanceAction::from_config(&cfg).unwrap()).unwrap();

            let output = actions
                .run(CheckBalanceAction::NAME, tracker(), json!({}))
                .await
                .unwrap();
            assert_eq!(
                output.responses,
                vec![BotMessage::from("Your balance is 542.17")]
            );
            assert_eq!(
                output.events,
                vec![Event::slot_set("access_token", "access-sandbox-123")]
            );
            assert_eq!(balance_calls.load(Ordering::SeqCst), 1);

            let (endpoint, balance_calls) = plaid_server(StatusCode::BAD_REQUEST).await;
            cfg.endpoint = Some(endpoint);
            let action = CheckBalanceAction::from_config(&cfg).unwrap();
            let (messages, events) = run(&action, &tracker()).await;
            assert_eq!(
                messages,
                vec![BotMessage::from("Failed to exchange public token.")]
            );
            assert!(events.is_empty());
            assert_eq!(balance_calls.load(Ordering::SeqCst), 0);
        }
    }
}
