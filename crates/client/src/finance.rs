//! Typed operations over categories, expenses, revenues, users and summaries.
//!
//! Failure policy:
//! - reads log and degrade to an empty list or `None`;
//! - creates and updates return `None` on failure;
//! - deletes return the error so the caller never assumes success.
//!
//! Every failure is shown to the [`SessionStore`] first, so a rejected token
//! ends the session no matter which call hit it.
use std::sync::Arc;

use api_types::{
    category::{Category, CategoryNew},
    summary::FinancialSummary,
    transaction::{
        Expense, ExpenseNew, Revenue, RevenueNew, Transaction, TransactionKind, TransactionRef,
        TransactionUpdate,
    },
    user::{User, UserUpdate},
};

use crate::{
    api::{ApiClient, ApiError},
    session::SessionStore,
    transactions::merge_by_date,
    validation::TransactionDraft,
};

#[derive(Clone)]
pub struct Finance {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl Finance {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            api: session.api().clone(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn settle<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            self.session.observe(err);
        }
        result
    }

    fn or_empty<T>(&self, what: &str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
        match self.settle(result) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!("failed to fetch {what}: {err}");
                Vec::new()
            }
        }
    }

    fn or_none<T>(&self, what: &str, result: Result<T, ApiError>) -> Option<T> {
        match self.settle(result) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!("failed to {what}: {err}");
                None
            }
        }
    }

    fn logged<T>(&self, what: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        self.settle(result).inspect_err(|err| tracing::error!("failed to {what}: {err}"))
    }

    // ============= Categories =============

    pub async fn fetch_categories(&self) -> Vec<Category> {
        let result = self.api.get(&["categorias"]).await;
        self.or_empty("categories", result)
    }

    pub async fn create_category(&self, name: &str) -> Option<Category> {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("refusing to create a category without a name");
            return None;
        }
        let body = CategoryNew {
            name: name.to_string(),
        };
        let result = self.api.post(&["categorias"], &body).await;
        self.or_none("create category", result)
    }

    // ============= Expenses =============

    pub async fn create_expense(&self, user_id: &str, payload: &ExpenseNew) -> Option<Expense> {
        let result = self.api.post(&["usuarios", user_id, "despesas"], payload).await;
        self.or_none("create expense", result)
    }

    pub async fn fetch_expenses(&self, user_id: &str) -> Vec<Expense> {
        let result = self.api.get(&["usuarios", user_id, "despesas"]).await;
        self.or_empty("expenses", result)
    }

    pub async fn update_expense(&self, id: i64, partial: &TransactionUpdate) -> Option<Expense> {
        let id = id.to_string();
        let result = self.api.put(&["despesas", id.as_str()], partial).await;
        self.or_none("update expense", result)
    }

    pub async fn delete_expense(&self, id: i64) -> Result<(), ApiError> {
        let id = id.to_string();
        let result = self.api.delete(&["despesas", id.as_str()]).await;
        self.logged("delete expense", result)
    }

    // ============= Revenues =============

    pub async fn create_revenue(&self, user_id: &str, payload: &RevenueNew) -> Option<Revenue> {
        let result = self.api.post(&["usuarios", user_id, "receitas"], payload).await;
        self.or_none("create revenue", result)
    }

    pub async fn fetch_revenues(&self, user_id: &str) -> Vec<Revenue> {
        let result = self.api.get(&["usuarios", user_id, "receitas"]).await;
        self.or_empty("revenues", result)
    }

    pub async fn update_revenue(&self, id: i64, partial: &TransactionUpdate) -> Option<Revenue> {
        let id = id.to_string();
        let result = self.api.put(&["receitas", id.as_str()], partial).await;
        self.or_none("update revenue", result)
    }

    pub async fn delete_revenue(&self, id: i64) -> Result<(), ApiError> {
        let id = id.to_string();
        let result = self.api.delete(&["receitas", id.as_str()]).await;
        self.logged("delete revenue", result)
    }

    // ============= Transactions =============

    /// Creates whichever entity the draft describes.
    pub async fn create_transaction(
        &self,
        user_id: &str,
        draft: &TransactionDraft,
    ) -> Option<Transaction> {
        match draft {
            TransactionDraft::Expense(payload) => self
                .create_expense(user_id, payload)
                .await
                .map(Transaction::from),
            TransactionDraft::Revenue(payload) => self
                .create_revenue(user_id, payload)
                .await
                .map(Transaction::from),
        }
    }

    pub async fn update_transaction(
        &self,
        target: TransactionRef,
        partial: &TransactionUpdate,
    ) -> Option<Transaction> {
        match target.kind {
            TransactionKind::Expense => self
                .update_expense(target.id, partial)
                .await
                .map(Transaction::from),
            TransactionKind::Revenue => self
                .update_revenue(target.id, partial)
                .await
                .map(Transaction::from),
        }
    }

    /// Expenses and revenues of a user, newest first.
    ///
    /// Both lists are fetched concurrently and both must succeed; an empty
    /// `user_id` short-circuits without touching the network.
    pub async fn fetch_transactions(&self, user_id: &str) -> Vec<Transaction> {
        if user_id.trim().is_empty() {
            tracing::debug!("no user id, skipping transaction fetch");
            return Vec::new();
        }

        let expenses_path = ["usuarios", user_id, "despesas"];
        let revenues_path = ["usuarios", user_id, "receitas"];
        let result = tokio::try_join!(
            self.api.get::<Vec<Expense>>(&expenses_path),
            self.api.get::<Vec<Revenue>>(&revenues_path),
        );
        match self.settle(result) {
            Ok((expenses, revenues)) => merge_by_date(expenses, revenues),
            Err(err) => {
                tracing::warn!("failed to fetch transactions: {err}");
                Vec::new()
            }
        }
    }

    /// Deletes a transaction and, only if the backend agreed, drops it from
    /// `transactions`.
    pub async fn delete_transaction(
        &self,
        transactions: &mut Vec<Transaction>,
        target: TransactionRef,
    ) -> Result<(), ApiError> {
        match target.kind {
            TransactionKind::Expense => self.delete_expense(target.id).await?,
            TransactionKind::Revenue => self.delete_revenue(target.id).await?,
        }
        transactions.retain(|tx| tx.reference() != target);
        Ok(())
    }

    // ============= Summaries =============

    pub async fn fetch_general_summary(&self, user_id: &str) -> Option<FinancialSummary> {
        let result = self.api.get(&["usuarios", user_id, "resumo"]).await;
        self.or_none("fetch summary", result)
    }

    pub async fn fetch_summary_by_period(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
    ) -> Option<FinancialSummary> {
        let month = month.to_string();
        let year = year.to_string();
        let result = self
            .api
            .get(&["usuarios", user_id, "resumo", month.as_str(), year.as_str()])
            .await;
        self.or_none("fetch period summary", result)
    }

    // ============= Users =============

    pub async fn fetch_user(&self, id: &str) -> Option<User> {
        let result = self.api.get(&["usuarios", id]).await;
        self.or_none("fetch user", result)
    }

    pub async fn fetch_me(&self) -> Option<User> {
        let result = self.api.get(&["usuarios", "me"]).await;
        self.or_none("fetch current user", result)
    }

    pub async fn update_user(&self, id: &str, partial: &UserUpdate) -> Option<User> {
        let result = self.api.patch(&["usuarios", id], partial).await;
        self.or_none("update user", result)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let result = self.api.delete(&["usuarios", id]).await;
        self.logged("delete user", result)
    }
}
