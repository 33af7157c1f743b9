//! FinanceFit client.
//!
//! The client is a thin layer over the backend REST API: it never computes
//! balances or summaries itself, it only shapes requests and keeps the
//! session.
//!
//! - [`ApiClient`] sends requests with the stored bearer token.
//! - [`SessionStore`] owns the login lifecycle and the persisted fields.
//! - [`Finance`] exposes typed operations for the pages.

pub mod api;
pub mod finance;
pub mod session;
pub mod storage;
pub mod transactions;
pub mod validation;

pub use api::{ApiClient, ApiClientBuilder, ApiError};
pub use finance::Finance;
pub use session::{
    LOGIN_ROUTE, LogNavigator, Navigator, SessionError, SessionState, SessionStore, SessionUser,
};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use transactions::{Totals, TransactionFilter};
pub use validation::{RegisterForm, TransactionDraft, TransactionForm, ValidationError};
