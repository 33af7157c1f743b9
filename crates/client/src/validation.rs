//! Client-side form checks, run before anything is sent.
use api_types::{
    MoneyCents, MoneyParseError,
    auth::Registration,
    transaction::{ExpenseNew, RevenueNew, TransactionKind},
};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] MoneyParseError),
    #[error("invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("monthly goal must not be negative")]
    NegativeGoal,
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Parses a user-typed amount and requires it to be strictly positive.
pub fn parse_amount(raw: &str) -> Result<MoneyCents, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingField("amount"));
    }
    let amount: MoneyCents = raw.parse()?;
    if !amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(amount)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Empty means no goal (0).
    pub monthly_goal: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        let monthly_goal = if self.monthly_goal.trim().is_empty() {
            MoneyCents::ZERO
        } else {
            self.monthly_goal.parse::<MoneyCents>()?
        };
        if monthly_goal.is_negative() {
            return Err(ValidationError::NegativeGoal);
        }

        Ok(Registration {
            name,
            email,
            password: self.password.clone(),
            monthly_goal,
        })
    }
}

/// A validated create request, ready for the facade.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionDraft {
    Expense(ExpenseNew),
    Revenue(RevenueNew),
}

#[derive(Clone, Debug)]
pub struct TransactionForm {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category_id: Option<i64>,
}

impl TransactionForm {
    pub fn validate(&self) -> Result<TransactionDraft, ValidationError> {
        let description = required(&self.description, "description")?;
        let amount = parse_amount(&self.amount)?;
        let date = parse_date(&self.date)?;

        Ok(match self.kind {
            TransactionKind::Expense => TransactionDraft::Expense(ExpenseNew {
                amount,
                date,
                description,
                category_id: self.category_id.ok_or(ValidationError::MissingField("category"))?,
            }),
            TransactionKind::Revenue => TransactionDraft::Revenue(RevenueNew {
                amount,
                date,
                description,
                category_id: self.category_id,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "Ana".to_string(),
            email: " a@b.com ".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
            monthly_goal: "3000".to_string(),
        }
    }

    fn expense_form() -> TransactionForm {
        TransactionForm {
            kind: TransactionKind::Expense,
            description: "Supermercado".to_string(),
            amount: "250,00".to_string(),
            date: "2024-11-15".to_string(),
            category_id: Some(2),
        }
    }

    #[test]
    fn register_form_builds_registration() {
        let registration = register_form().validate().unwrap();
        assert_eq!(registration.email, "a@b.com");
        assert_eq!(registration.monthly_goal, MoneyCents::new(300_000));
    }

    #[test]
    fn register_form_rejects_password_mismatch() {
        let mut form = register_form();
        form.confirm_password = "other".to_string();
        assert_eq!(form.validate().unwrap_err(), ValidationError::PasswordMismatch);
    }

    #[test]
    fn register_form_requires_fields() {
        let mut form = register_form();
        form.name = "   ".to_string();
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingField("name"));

        let mut form = register_form();
        form.password.clear();
        form.confirm_password.clear();
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingField("password"));
    }

    #[test]
    fn register_form_goal_defaults_to_zero() {
        let mut form = register_form();
        form.monthly_goal.clear();
        assert_eq!(form.validate().unwrap().monthly_goal, MoneyCents::ZERO);

        form.monthly_goal = "-5".to_string();
        assert_eq!(form.validate().unwrap_err(), ValidationError::NegativeGoal);
    }

    #[test]
    fn expense_needs_category() {
        let mut form = expense_form();
        assert!(matches!(form.validate().unwrap(), TransactionDraft::Expense(e) if e.category_id == 2));

        form.category_id = None;
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingField("category"));
    }

    #[test]
    fn revenue_category_is_optional() {
        let mut form = expense_form();
        form.kind = TransactionKind::Revenue;
        form.category_id = None;
        let TransactionDraft::Revenue(revenue) = form.validate().unwrap() else {
            panic!("expected revenue draft");
        };
        assert_eq!(revenue.category_id, None);
        assert_eq!(revenue.amount, MoneyCents::new(25_000));
    }

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(parse_amount("0").unwrap_err(), ValidationError::NonPositiveAmount);
        assert_eq!(parse_amount("-3").unwrap_err(), ValidationError::NonPositiveAmount);
        assert_eq!(parse_amount("").unwrap_err(), ValidationError::MissingField("amount"));
        assert!(matches!(parse_amount("1.234"), Err(ValidationError::InvalidAmount(_))));
    }

    #[test]
    fn date_must_be_iso() {
        assert_eq!(
            parse_date("15/11/2024").unwrap_err(),
            ValidationError::InvalidDate("15/11/2024".to_string())
        );
        assert_eq!(
            parse_date("2024-11-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
        );
    }
}
