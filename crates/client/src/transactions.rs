//! Client-side views over a transaction feed: merging, filtering, totals.
use api_types::{
    MoneyCents,
    transaction::{Expense, Revenue, Transaction, TransactionKind},
};
use serde::Serialize;

/// Concatenates expenses then revenues and orders the result newest first.
///
/// The sort is stable: entries sharing a date keep their fetch order.
pub fn merge_by_date(expenses: Vec<Expense>, revenues: Vec<Revenue>) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = expenses
        .into_iter()
        .map(Transaction::from)
        .chain(revenues.into_iter().map(Transaction::from))
        .collect();
    merged.sort_by(|a, b| b.date().cmp(&a.date()));
    merged
}

/// Filters shown on the transactions page. Empty criteria match everything.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    /// Case-insensitive substring of the category name.
    pub category: Option<String>,
    /// `YYYY-MM` prefix of the date.
    pub month: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(kind) = self.kind
            && tx.kind() != kind
        {
            return false;
        }

        if let Some(needle) = self.category.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let needle = needle.to_lowercase();
            let Some(category) = tx.category() else {
                return false;
            };
            if !category.name.to_lowercase().contains(&needle) {
                return false;
            }
        }

        if let Some(month) = self.month.as_deref().map(str::trim).filter(|m| !m.is_empty())
            && !tx.date().format("%Y-%m-%d").to_string().starts_with(month)
        {
            return false;
        }

        true
    }

    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: MoneyCents,
    pub expense: MoneyCents,
    pub balance: MoneyCents,
}

impl Totals {
    pub fn of<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Totals::default();
        for tx in transactions {
            match tx {
                Transaction::Expense(e) => totals.expense += e.amount,
                Transaction::Revenue(r) => totals.income += r.amount,
            }
        }
        totals.balance = totals.income - totals.expense;
        totals
    }
}

#[cfg(test)]
mod tests {
    use api_types::category::Category;
    use chrono::NaiveDate;

    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
        }
    }

    fn expense(id: i64, day: &str, cents: i64, cat: &str) -> Expense {
        Expense {
            id,
            amount: MoneyCents::new(cents),
            date: date(day),
            description: format!("expense {id}"),
            owner: Some(1),
            category: category(id, cat),
        }
    }

    fn revenue(id: i64, day: &str, cents: i64, cat: Option<&str>) -> Revenue {
        Revenue {
            id,
            amount: MoneyCents::new(cents),
            date: date(day),
            description: format!("revenue {id}"),
            owner: Some(1),
            category: cat.map(|c| category(100 + id, c)),
        }
    }

    fn sample() -> Vec<Transaction> {
        merge_by_date(
            vec![
                expense(2, "2024-11-15", 25_000, "Alimentação"),
                expense(3, "2024-11-14", 12_000, "Transporte"),
                expense(4, "2024-10-13", 18_000, "Contas"),
            ],
            vec![
                revenue(1, "2024-11-16", 500_000, Some("Salário")),
                revenue(5, "2024-11-12", 80_000, None),
            ],
        )
    }

    #[test]
    fn merge_orders_newest_first() {
        let merged = merge_by_date(
            vec![expense(1, "2024-01-05", 100, "Food")],
            vec![revenue(1, "2024-01-10", 100, None)],
        );
        assert_eq!(merged[0].kind(), TransactionKind::Revenue);
        assert_eq!(merged[1].kind(), TransactionKind::Expense);
    }

    #[test]
    fn merge_keeps_fetch_order_on_ties() {
        let merged = merge_by_date(
            vec![
                expense(1, "2024-03-01", 100, "A"),
                expense(2, "2024-03-01", 100, "B"),
            ],
            vec![revenue(9, "2024-03-01", 100, None)],
        );
        let order: Vec<_> = merged.iter().map(Transaction::reference).collect();
        assert_eq!(order[0].id, 1);
        assert_eq!(order[1].id, 2);
        assert_eq!(order[2].kind, TransactionKind::Revenue);
    }

    #[test]
    fn filter_by_kind_category_and_month() {
        let txs = sample();

        let expenses = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..Default::default()
        };
        assert_eq!(expenses.apply(&txs).len(), 3);

        let food = TransactionFilter {
            category: Some("aLiM".to_string()),
            ..Default::default()
        };
        let found = food.apply(&txs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), 2);

        let november = TransactionFilter {
            month: Some("2024-11".to_string()),
            ..Default::default()
        };
        assert_eq!(november.apply(&txs).len(), 4);

        assert_eq!(TransactionFilter::default().apply(&txs).len(), txs.len());
    }

    #[test]
    fn category_filter_skips_uncategorized_revenue() {
        let txs = sample();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Revenue),
            category: Some("sal".to_string()),
            ..Default::default()
        };
        let found = filter.apply(&txs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), 1);
    }

    #[test]
    fn totals_sum_income_and_expense() {
        let txs = sample();
        let totals = Totals::of(&txs);
        assert_eq!(totals.income, MoneyCents::new(580_000));
        assert_eq!(totals.expense, MoneyCents::new(55_000));
        assert_eq!(totals.balance, MoneyCents::new(525_000));

        let empty = Totals::of(std::iter::empty());
        assert_eq!(empty, Totals::default());
    }
}
