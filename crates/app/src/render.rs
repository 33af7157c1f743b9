use api_types::{
    category::Category,
    summary::FinancialSummary,
    transaction::{Transaction, TransactionKind},
    user::User,
};
use client::{SessionUser, Totals};
use serde::Serialize;
use serde_json::json;

use crate::error::Result;

/// Writes command results to stdout, either as text or as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn message(&self, text: &str) -> Result<()> {
        if self.json {
            return self.print_json(&json!({ "message": text }));
        }
        println!("{text}");
        Ok(())
    }

    pub fn session_user(&self, user: &SessionUser) -> Result<()> {
        if self.json {
            return self.print_json(user);
        }
        println!("Hello, {}! ({}, id {})", user.name, user.email, user.id);
        Ok(())
    }

    pub fn profile(&self, user: &User) -> Result<()> {
        if self.json {
            return self.print_json(user);
        }
        println!("Name:         {}", user.name);
        println!("Email:        {}", user.email);
        match user.monthly_goal {
            Some(goal) => println!("Monthly goal: {goal}"),
            None => println!("Monthly goal: -"),
        }
        Ok(())
    }

    pub fn categories(&self, categories: &[Category]) -> Result<()> {
        if self.json {
            return self.print_json(categories);
        }
        if categories.is_empty() {
            println!("No categories.");
            return Ok(());
        }
        for category in categories {
            println!("{:>5}  {}", category.id, category.name);
        }
        Ok(())
    }

    pub fn transaction(&self, tx: &Transaction) -> Result<()> {
        if self.json {
            return self.print_json(tx);
        }
        println!("{}", transaction_row(tx));
        Ok(())
    }

    pub fn transactions(&self, transactions: &[&Transaction], totals: &Totals) -> Result<()> {
        if self.json {
            return self.print_json(&json!({
                "transactions": transactions,
                "totals": totals,
            }));
        }
        if transactions.is_empty() {
            println!("No transactions.");
        }
        for tx in transactions {
            println!("{}", transaction_row(tx));
        }
        println!();
        print_totals(totals);
        Ok(())
    }

    pub fn dashboard(
        &self,
        summary: Option<&FinancialSummary>,
        recent: &[&Transaction],
        totals: &Totals,
    ) -> Result<()> {
        if self.json {
            return self.print_json(&json!({
                "summary": summary,
                "recent": recent,
                "totals": totals,
            }));
        }

        match summary {
            Some(summary) => {
                if let (Some(month), Some(year)) = (summary.month, summary.year) {
                    println!("Period:       {month:02}/{year}");
                }
                println!("Revenues:     {}", summary.total_revenues);
                println!("Expenses:     {}", summary.total_expenses);
                println!("Balance:      {}", summary.balance);
                println!("Monthly goal: {}", summary.monthly_goal);
                println!("Spent:        {:.1}%", summary.percent_spent);
            }
            None => {
                println!("Summary unavailable, totals from the transaction list:");
                print_totals(totals);
            }
        }

        println!();
        println!("Recent transactions:");
        if recent.is_empty() {
            println!("  none");
        }
        for tx in recent {
            println!("  {}", transaction_row(tx));
        }
        Ok(())
    }
}

fn print_totals(totals: &Totals) {
    println!("Revenues: {}", totals.income);
    println!("Expenses: {}", totals.expense);
    println!("Balance:  {}", totals.balance);
}

fn transaction_row(tx: &Transaction) -> String {
    let (label, sign) = match tx.kind() {
        TransactionKind::Expense => ("expense", "-"),
        TransactionKind::Revenue => ("revenue", "+"),
    };
    let category = tx.category().map(|c| c.name.as_str()).unwrap_or("-");
    format!(
        "{:>5}  {}  {:<7}  {}{:<14}  {:<15}  {}",
        tx.id(),
        tx.date().format("%Y-%m-%d"),
        label,
        sign,
        tx.amount().to_string(),
        category,
        tx.description()
    )
}
