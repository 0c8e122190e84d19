//! Module providing the custom action contract between Bankbot and the host runtime
//!
//! The host runtime decides *when* an action runs (e.g. after the user asked for
//! their balance); the action decides *what* happens. This module provides:
//! - The [`Action`] trait for defining custom actions
//! - Dynamic dispatch capabilities through the [`ActionDyn`] trait
//! - An [`ActionSet`] collection for registering and routing actions by name
//!
//! # Reference Implementations
//! 1. [`CheckBalanceAction`](https://github.com/ldclabs/bankbot/blob/main/tools/bankbot_plaid/src/action.rs) -
//!    An action retrieving a bank balance through Plaid

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, future::Future, sync::Arc};

use crate::{
    BoxError, BoxPinFut, BotMessage, CollectingDispatcher, Domain, Event, Tracker, validate_name,
};

/// Core trait for implementing custom actions invoked by the host runtime.
pub trait Action: Send + Sync {
    /// Returns the action's name. The host runtime routes to the action by this name.
    ///
    /// # Rules
    /// - Must not be empty
    /// - Length must be ≤ 64 characters
    /// - Can only contain: lowercase letters (a-z), digits (0-9), and underscores (_)
    fn name(&self) -> String;

    /// Runs the action for one conversation turn.
    ///
    /// # Arguments
    /// - `dispatcher`: Collects the messages sent back to the user
    /// - `tracker`: The current conversation snapshot
    /// - `domain`: The host runtime's domain definition
    ///
    /// # Returns
    /// - The state-mutation instructions for the host runtime, may be empty
    /// - Returns `BoxError` for failures the action did not handle itself
    fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        tracker: &Tracker,
        domain: &Domain,
    ) -> impl Future<Output = Result<Vec<Event>, BoxError>> + Send;
}

/// The collected result of one action run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ActionOutput {
    pub events: Vec<Event>,
    pub responses: Vec<BotMessage>,
}

/// Errors when routing an action call.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("No registered action found for name '{0}'.")]
    NotFound(String),

    #[error("action {name} failed: {error}")]
    Failed { name: String, error: BoxError },
}

/// Dynamic dispatch version of the Action trait
pub trait ActionDyn: Send + Sync {
    fn name(&self) -> String;

    fn run(&self, tracker: Tracker, domain: Domain) -> BoxPinFut<Result<ActionOutput, BoxError>>;
}

/// Wrapper to convert static Action implementation to dynamic dispatch
struct ActionWrapper<T: Action + 'static>(Arc<T>);

impl<T> ActionDyn for ActionWrapper<T>
where
    T: Action + 'static,
{
    fn name(&self) -> String {
        self.0.name()
    }

    fn run(&self, tracker: Tracker, domain: Domain) -> BoxPinFut<Result<ActionOutput, BoxError>> {
        let action = self.0.clone();
        Box::pin(async move {
            let mut dispatcher = CollectingDispatcher::new();
            let events = action.run(&mut dispatcher, &tracker, &domain).await?;
            Ok(ActionOutput {
                events,
                responses: dispatcher.into_messages(),
            })
        })
    }
}

/// Collection of actions served to the host runtime
#[derive(Default)]
pub struct ActionSet {
    pub set: BTreeMap<String, Box<dyn ActionDyn>>,
}

impl ActionSet {
    /// Creates a new empty ActionSet
    pub fn new() -> Self {
        Self {
            set: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Checks if an action with the given name exists in the set
    pub fn contains(&self, name: &str) -> bool {
        self.set.contains_key(name)
    }

    /// Names of all registered actions, sorted
    pub fn names(&self) -> Vec<String> {
        self.set.keys().cloned().collect()
    }

    /// Adds a new action to the set
    pub fn add<T>(&mut self, action: T) -> Result<(), BoxError>
    where
        T: Action + 'static,
    {
        let name = action.name();
        validate_name(&name)?;
        if self.set.contains_key(&name) {
            return Err(format!("action {} already exists", name).into());
        }

        self.set
            .insert(name, Box::new(ActionWrapper(Arc::new(action))));
        Ok(())
    }

    /// Runs an action by name with the given conversation snapshot
    pub async fn run(
        &self,
        name: &str,
        tracker: Tracker,
        domain: Domain,
    ) -> Result<ActionOutput, ActionError> {
        let action = self
            .set
            .get(name)
            .ok_or_else(|| ActionError::NotFound(name.to_string()))?;
        action
            .run(tracker, domain)
            .await
            .map_err(|error| ActionError::Failed {
                name: name.to_string(),
                error,
            })
    }
}
