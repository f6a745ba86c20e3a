//! # Mock SDK & Testing Guide
//!
//! [`MockApi`] implements [`ErsApi`] entirely in memory from a FIFO queue of
//! expectations. It is meant for call-exact protocol tests: each expectation
//! names the operation and the arguments that identify the object, and the
//! reply to hand back. Every call is recorded so a test can also assert on
//! what was sent (payloads included).
//!
//! ## When to use the mock vs the in-memory store
//!
//! | Feature | MockApi | ErsStore |
//! |---------|---------|----------|
//! | **Determinism** | Exact call sequence | Behaves like a server |
//! | **State** | None (expectations) | Real objects, ids, paging |
//! | **Use Case** | "Which calls does the protocol make?" | End-to-end flows |
//! | **Error Injection** | Easy (`return_err`) | Only what the store models |
//!
//! ## Example
//!
//! ```rust
//! use ise_reconcile::api::{ErsApi, RemoteObject};
//! use ise_reconcile::error::ApiError;
//! use ise_reconcile::mock::MockApi;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockApi::new();
//!     mock.expect_get_by_name("sgt", "Employees").return_err(ApiError::NotFound);
//!
//!     let result = mock.get_by_name("sgt", "Employees").await;
//!     assert_eq!(result, Err(ApiError::NotFound));
//!     mock.verify();
//! }
//! ```
//!
//! An unexpected call, or a call whose arguments differ from the next
//! expectation, panics.

use crate::api::{CreateResponse, ErsApi, PageQuery, RemoteObject, SearchPage};
use crate::error::ApiError;
use crate::state::Attributes;
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetById { endpoint: String, id: String },
    GetByName { endpoint: String, name: String },
    GetByKeys { endpoint: String, keys: BTreeMap<String, String> },
    List { endpoint: String, query: PageQuery },
    Create { endpoint: String, payload: Attributes },
    Update { endpoint: String, id: String, payload: Attributes },
    Delete { endpoint: String, id: String },
}

/// What an expectation matches on. Payloads are not matched; inspect
/// [`MockApi::calls`] for those.
#[derive(Debug, Clone, PartialEq)]
enum Expected {
    GetById { endpoint: String, id: String },
    GetByName { endpoint: String, name: String },
    GetByKeys { endpoint: String, keys: BTreeMap<String, String> },
    List { endpoint: String, page: u32 },
    Create { endpoint: String },
    Update { endpoint: String, id: String },
    Delete { endpoint: String, id: String },
}

impl Expected {
    fn matches(&self, call: &Call) -> bool {
        match (self, call) {
            (Self::GetById { endpoint: e, id: i }, Call::GetById { endpoint, id }) => {
                e == endpoint && i == id
            }
            (Self::GetByName { endpoint: e, name: n }, Call::GetByName { endpoint, name }) => {
                e == endpoint && n == name
            }
            (Self::GetByKeys { endpoint: e, keys: k }, Call::GetByKeys { endpoint, keys }) => {
                e == endpoint && k == keys
            }
            (Self::List { endpoint: e, page }, Call::List { endpoint, query }) => {
                e == endpoint && *page == query.page
            }
            (Self::Create { endpoint: e }, Call::Create { endpoint, .. }) => e == endpoint,
            (Self::Update { endpoint: e, id: i }, Call::Update { endpoint, id, .. }) => {
                e == endpoint && i == id
            }
            (Self::Delete { endpoint: e, id: i }, Call::Delete { endpoint, id }) => {
                e == endpoint && i == id
            }
            _ => false,
        }
    }
}

#[doc(hidden)]
#[derive(Debug)]
pub enum Reply {
    Object(Result<RemoteObject, ApiError>),
    Page(Result<SearchPage, ApiError>),
    Created(Result<CreateResponse, ApiError>),
    Deleted(Result<(), ApiError>),
}

/// Reply types an expectation can carry.
pub trait MockReply: Sized {
    #[doc(hidden)]
    fn wrap(result: Result<Self, ApiError>) -> Reply;
    #[doc(hidden)]
    fn unwrap_reply(reply: Reply) -> Option<Result<Self, ApiError>>;
}

macro_rules! mock_reply {
    ($ty:ty, $variant:ident) => {
        impl MockReply for $ty {
            fn wrap(result: Result<Self, ApiError>) -> Reply {
                Reply::$variant(result)
            }

            fn unwrap_reply(reply: Reply) -> Option<Result<Self, ApiError>> {
                match reply {
                    Reply::$variant(result) => Some(result),
                    _ => None,
                }
            }
        }
    };
}

mock_reply!(RemoteObject, Object);
mock_reply!(SearchPage, Page);
mock_reply!(CreateResponse, Created);
mock_reply!((), Deleted);

struct Expectation {
    expected: Expected,
    reply: Reply,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<Call>,
}

/// A mock SDK client with expectation tracking for fluent testing.
///
/// Clones share the same expectation queue and call log.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expect<T: MockReply>(&mut self, expected: Expected) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            expected,
            state: self.state.clone(),
            _reply: PhantomData,
        }
    }

    pub fn expect_get_by_id(&mut self, endpoint: &str, id: &str) -> ExpectationBuilder<RemoteObject> {
        self.expect(Expected::GetById {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        })
    }

    pub fn expect_get_by_name(
        &mut self,
        endpoint: &str,
        name: &str,
    ) -> ExpectationBuilder<RemoteObject> {
        self.expect(Expected::GetByName {
            endpoint: endpoint.to_string(),
            name: name.to_string(),
        })
    }

    pub fn expect_get_by_keys(
        &mut self,
        endpoint: &str,
        keys: &[(&str, &str)],
    ) -> ExpectationBuilder<RemoteObject> {
        self.expect(Expected::GetByKeys {
            endpoint: endpoint.to_string(),
            keys: keys
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    /// Expects a listing call for `page`.
    pub fn expect_list(&mut self, endpoint: &str, page: u32) -> ExpectationBuilder<SearchPage> {
        self.expect(Expected::List {
            endpoint: endpoint.to_string(),
            page,
        })
    }

    pub fn expect_create(&mut self, endpoint: &str) -> ExpectationBuilder<CreateResponse> {
        self.expect(Expected::Create {
            endpoint: endpoint.to_string(),
        })
    }

    pub fn expect_update(&mut self, endpoint: &str, id: &str) -> ExpectationBuilder<RemoteObject> {
        self.expect(Expected::Update {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        })
    }

    pub fn expect_delete(&mut self, endpoint: &str, id: &str) -> ExpectationBuilder<()> {
        self.expect(Expected::Delete {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        })
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.expectations.is_empty() {
            let remaining: Vec<&Expected> = state.expectations.iter().map(|e| &e.expected).collect();
            panic!(
                "Not all expectations were met. {} remaining: {remaining:?}",
                remaining.len()
            );
        }
    }

    fn answer<T: MockReply>(&self, call: Call) -> Result<T, ApiError> {
        let mut state = self.lock();
        state.calls.push(call.clone());
        let Some(expectation) = state.expectations.pop_front() else {
            drop(state);
            panic!("Unexpected call: {call:?}");
        };
        drop(state);

        if !expectation.expected.matches(&call) {
            panic!(
                "Expectation mismatch: expected {:?}, got {call:?}",
                expectation.expected
            );
        }
        match T::unwrap_reply(expectation.reply) {
            Some(result) => result,
            None => panic!("Expectation reply type does not fit {call:?}"),
        }
    }
}

/// Builder for one expectation.
pub struct ExpectationBuilder<T> {
    expected: Expected,
    state: Arc<Mutex<MockState>>,
    _reply: PhantomData<T>,
}

impl<T: MockReply> ExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(T::wrap(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(T::wrap(Err(error)));
    }

    fn push(self, reply: Reply) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.expectations.push_back(Expectation {
            expected: self.expected,
            reply,
        });
    }
}

#[async_trait]
impl ErsApi for MockApi {
    async fn get_by_id(&self, endpoint: &str, id: &str) -> Result<RemoteObject, ApiError> {
        self.answer(Call::GetById {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        })
    }

    async fn get_by_name(&self, endpoint: &str, name: &str) -> Result<RemoteObject, ApiError> {
        self.answer(Call::GetByName {
            endpoint: endpoint.to_string(),
            name: name.to_string(),
        })
    }

    async fn get_by_keys(
        &self,
        endpoint: &str,
        keys: &BTreeMap<String, String>,
    ) -> Result<RemoteObject, ApiError> {
        self.answer(Call::GetByKeys {
            endpoint: endpoint.to_string(),
            keys: keys.clone(),
        })
    }

    async fn list(&self, endpoint: &str, query: PageQuery) -> Result<SearchPage, ApiError> {
        self.answer(Call::List {
            endpoint: endpoint.to_string(),
            query,
        })
    }

    async fn create(
        &self,
        endpoint: &str,
        payload: &Attributes,
    ) -> Result<CreateResponse, ApiError> {
        self.answer(Call::Create {
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
        })
    }

    async fn update(
        &self,
        endpoint: &str,
        id: &str,
        payload: &Attributes,
    ) -> Result<RemoteObject, ApiError> {
        self.answer(Call::Update {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
            payload: payload.clone(),
        })
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), ApiError> {
        self.answer(Call::Delete {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_and_records_calls() {
        let mut mock = MockApi::new();
        mock.expect_delete("sgt", "7").return_ok(());
        mock.expect_get_by_id("sgt", "7").return_err(ApiError::NotFound);

        assert_eq!(mock.delete("sgt", "7").await, Ok(()));
        assert_eq!(mock.get_by_id("sgt", "7").await, Err(ApiError::NotFound));
        assert_eq!(mock.calls().len(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Expectation mismatch")]
    async fn mismatched_arguments_panic() {
        let mut mock = MockApi::new();
        mock.expect_get_by_name("sgt", "a").return_err(ApiError::NotFound);
        let _ = mock.get_by_name("sgt", "b").await;
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn verify_reports_leftovers() {
        let mut mock = MockApi::new();
        mock.expect_delete("sgt", "1").return_ok(());
        mock.verify();
    }
}
