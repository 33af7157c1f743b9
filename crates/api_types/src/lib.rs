//! Wire types exchanged with the FinanceFit backend.
//!
//! The backend speaks Portuguese JSON (`nome`, `valor`, `descricao`, ...);
//! the Rust side uses English names and renames at the serde boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

mod money;

pub use money::{MoneyCents, MoneyParseError};

pub mod auth {
    use std::fmt;

    use super::*;

    #[derive(Clone, Serialize, Deserialize)]
    pub struct Credentials {
        pub email: String,
        #[serde(rename = "senha")]
        pub password: String,
    }

    impl fmt::Debug for Credentials {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Credentials")
                .field("email", &self.email)
                .field("password", &"<redacted>")
                .finish()
        }
    }

    #[derive(Clone, Serialize, Deserialize)]
    pub struct Registration {
        #[serde(rename = "nome")]
        pub name: String,
        pub email: String,
        #[serde(rename = "senha")]
        pub password: String,
        #[serde(rename = "metaMensal")]
        pub monthly_goal: MoneyCents,
    }

    impl fmt::Debug for Registration {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Registration")
                .field("name", &self.name)
                .field("email", &self.email)
                .field("password", &"<redacted>")
                .field("monthly_goal", &self.monthly_goal)
                .finish()
        }
    }

    /// Body returned by both `/api/auth/login` and `/api/auth/register`.
    ///
    /// It does not carry the user id: that is resolved afterwards by email.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub token: String,
        pub email: String,
        #[serde(rename = "nome", alias = "name")]
        pub name: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct User {
        pub id: i64,
        #[serde(rename = "nome")]
        pub name: String,
        pub email: String,
        #[serde(rename = "metaMensal", default)]
        pub monthly_goal: Option<MoneyCents>,
    }

    /// Partial update body for `PATCH /usuarios/{id}`.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub email: Option<String>,
        #[serde(rename = "metaMensal", skip_serializing_if = "Option::is_none")]
        pub monthly_goal: Option<MoneyCents>,
    }

    impl UserUpdate {
        pub fn is_empty(&self) -> bool {
            self.name.is_none() && self.email.is_none() && self.monthly_goal.is_none()
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum IdValue {
        Number(i64),
        Text(String),
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserRef {
        #[serde(alias = "usuarioId")]
        pub id: IdValue,
    }

    /// Response of `GET /usuarios/email/{email}`.
    ///
    /// Depending on the backend build this is either the bare id or the user
    /// object; only the id is of interest.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum UserLookup {
        Id(IdValue),
        User(UserRef),
    }

    impl UserLookup {
        /// Returns the id as a string, `None` when the backend sent an empty one.
        pub fn into_id(self) -> Option<String> {
            let value = match self {
                Self::Id(value) => value,
                Self::User(user) => user.id,
            };
            let id = match value {
                IdValue::Number(id) => id.to_string(),
                IdValue::Text(id) => id.trim().to_string(),
            };
            (!id.is_empty()).then_some(id)
        }
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        #[serde(rename = "categoriaId")]
        pub id: i64,
        #[serde(rename = "nome")]
        pub name: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        #[serde(rename = "nome")]
        pub name: String,
    }
}

pub mod transaction {
    use std::fmt;

    use super::{category::Category, *};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionKind {
        Expense,
        Revenue,
    }

    impl TransactionKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Expense => "EXPENSE",
                Self::Revenue => "REVENUE",
            }
        }
    }

    impl fmt::Display for TransactionKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Stored amounts are never negative: the kind carries the sign.
    fn non_negative<'de, D>(deserializer: D) -> Result<MoneyCents, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = MoneyCents::deserialize(deserializer)?;
        if amount.is_negative() {
            return Err(serde::de::Error::custom(format!(
                "negative amount {}",
                amount.cents()
            )));
        }
        Ok(amount)
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: i64,
        #[serde(rename = "valor", deserialize_with = "non_negative")]
        pub amount: MoneyCents,
        /// ISO calendar date (`YYYY-MM-DD`).
        #[serde(rename = "data")]
        pub date: NaiveDate,
        #[serde(rename = "descricao", default)]
        pub description: String,
        #[serde(rename = "usuarioId", default, skip_serializing_if = "Option::is_none")]
        pub owner: Option<i64>,
        #[serde(rename = "categoria")]
        pub category: Category,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Revenue {
        pub id: i64,
        #[serde(rename = "valor", deserialize_with = "non_negative")]
        pub amount: MoneyCents,
        #[serde(rename = "data")]
        pub date: NaiveDate,
        #[serde(rename = "descricao", default)]
        pub description: String,
        #[serde(rename = "usuarioId", default, skip_serializing_if = "Option::is_none")]
        pub owner: Option<i64>,
        #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
        pub category: Option<Category>,
    }

    /// An expense or a revenue, tagged by `kind` when serialized.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "UPPERCASE")]
    pub enum Transaction {
        Expense(Expense),
        Revenue(Revenue),
    }

    impl Transaction {
        pub fn kind(&self) -> TransactionKind {
            match self {
                Self::Expense(_) => TransactionKind::Expense,
                Self::Revenue(_) => TransactionKind::Revenue,
            }
        }

        pub fn id(&self) -> i64 {
            match self {
                Self::Expense(e) => e.id,
                Self::Revenue(r) => r.id,
            }
        }

        pub fn amount(&self) -> MoneyCents {
            match self {
                Self::Expense(e) => e.amount,
                Self::Revenue(r) => r.amount,
            }
        }

        pub fn date(&self) -> NaiveDate {
            match self {
                Self::Expense(e) => e.date,
                Self::Revenue(r) => r.date,
            }
        }

        pub fn description(&self) -> &str {
            match self {
                Self::Expense(e) => &e.description,
                Self::Revenue(r) => &r.description,
            }
        }

        pub fn owner(&self) -> Option<i64> {
            match self {
                Self::Expense(e) => e.owner,
                Self::Revenue(r) => r.owner,
            }
        }

        pub fn category(&self) -> Option<&Category> {
            match self {
                Self::Expense(e) => Some(&e.category),
                Self::Revenue(r) => r.category.as_ref(),
            }
        }

        pub fn reference(&self) -> TransactionRef {
            TransactionRef {
                kind: self.kind(),
                id: self.id(),
            }
        }
    }

    impl From<Expense> for Transaction {
        fn from(value: Expense) -> Self {
            Self::Expense(value)
        }
    }

    impl From<Revenue> for Transaction {
        fn from(value: Revenue) -> Self {
            Self::Revenue(value)
        }
    }

    /// Identifies a transaction on the backend: ids are only unique per kind.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TransactionRef {
        pub kind: TransactionKind,
        pub id: i64,
    }

    /// Body for `POST /usuarios/{id}/despesas`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        #[serde(rename = "valor")]
        pub amount: MoneyCents,
        #[serde(rename = "data")]
        pub date: NaiveDate,
        #[serde(rename = "descricao")]
        pub description: String,
        #[serde(rename = "categoriaId")]
        pub category_id: i64,
    }

    /// Body for `POST /usuarios/{id}/receitas`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RevenueNew {
        #[serde(rename = "valor")]
        pub amount: MoneyCents,
        #[serde(rename = "data")]
        pub date: NaiveDate,
        #[serde(rename = "descricao")]
        pub description: String,
        #[serde(rename = "categoriaId", skip_serializing_if = "Option::is_none")]
        pub category_id: Option<i64>,
    }

    /// Partial body for `PUT /despesas/{id}` and `PUT /receitas/{id}`.
    ///
    /// Absent fields are left untouched by the backend.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        #[serde(rename = "valor", skip_serializing_if = "Option::is_none")]
        pub amount: Option<MoneyCents>,
        #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
        pub date: Option<NaiveDate>,
        #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(rename = "categoriaId", skip_serializing_if = "Option::is_none")]
        pub category_id: Option<i64>,
    }

    impl TransactionUpdate {
        pub fn is_empty(&self) -> bool {
            self.amount.is_none()
                && self.date.is_none()
                && self.description.is_none()
                && self.category_id.is_none()
        }
    }
}

pub mod summary {
    use super::*;

    /// Aggregate computed by the backend. The client only displays it.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FinancialSummary {
        #[serde(rename = "totalDespesas")]
        pub total_expenses: MoneyCents,
        #[serde(rename = "totalReceitas")]
        pub total_revenues: MoneyCents,
        #[serde(rename = "metaMensal", default)]
        pub monthly_goal: MoneyCents,
        #[serde(rename = "saldo")]
        pub balance: MoneyCents,
        #[serde(rename = "percentualGasto", default)]
        pub percent_spent: f64,
        #[serde(rename = "mes", default, skip_serializing_if = "Option::is_none")]
        pub month: Option<u32>,
        #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
        pub year: Option<i32>,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        auth::{AuthResponse, Credentials},
        transaction::{Transaction, TransactionKind},
        user::UserLookup,
        *,
    };

    #[test]
    fn stored_amounts_must_not_be_negative() {
        let negative = r#"{"kind":"REVENUE","id":1,"valor":-5.0,"data":"2024-01-10"}"#;
        assert!(serde_json::from_str::<Transaction>(negative).is_err());

        let zero = r#"{"kind":"REVENUE","id":1,"valor":0,"data":"2024-01-10"}"#;
        let tx: Transaction = serde_json::from_str(zero).unwrap();
        assert!(tx.amount().is_zero());
    }

    #[test]
    fn auth_response_accepts_both_name_spellings() {
        let pt: AuthResponse =
            serde_json::from_str(r#"{"token":"t","email":"a@b.com","nome":"Ana"}"#).unwrap();
        let en: AuthResponse =
            serde_json::from_str(r#"{"token":"t","email":"a@b.com","name":"Ana"}"#).unwrap();
        assert_eq!(pt.name, "Ana");
        assert_eq!(en.name, "Ana");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["senha"], "hunter2");
    }

    #[test]
    fn user_lookup_shapes() {
        let bare: UserLookup = serde_json::from_str("42").unwrap();
        assert_eq!(bare.into_id().as_deref(), Some("42"));
        let text: UserLookup = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(text.into_id().as_deref(), Some("42"));
        let object: UserLookup =
            serde_json::from_str(r#"{"id":7,"nome":"Ana","email":"a@b.com"}"#).unwrap();
        assert_eq!(object.into_id().as_deref(), Some("7"));
        let legacy: UserLookup = serde_json::from_str(r#"{"usuarioId":"9"}"#).unwrap();
        assert_eq!(legacy.into_id().as_deref(), Some("9"));
        let empty: UserLookup = serde_json::from_str("\"\"").unwrap();
        assert_eq!(empty.into_id(), None);
    }

    #[test]
    fn transaction_is_tagged_by_kind() {
        let raw = r#"{
            "kind": "REVENUE",
            "id": 3,
            "valor": 800,
            "data": "2024-11-12",
            "descricao": "Freelance"
        }"#;
        let tx: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.kind(), TransactionKind::Revenue);
        assert_eq!(tx.amount(), MoneyCents::new(80_000));
        assert!(tx.category().is_none());

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["kind"], "REVENUE");
    }

    #[test]
    fn expense_requires_category() {
        let raw = r#"{"id":1,"valor":10,"data":"2024-01-05","descricao":"x"}"#;
        assert!(serde_json::from_str::<transaction::Expense>(raw).is_err());
    }
}
