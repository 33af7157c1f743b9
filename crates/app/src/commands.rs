use api_types::{
    MoneyCents,
    transaction::{TransactionKind, TransactionRef, TransactionUpdate},
    user::UserUpdate,
};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::{
    Finance, RegisterForm, SessionUser, Totals, TransactionFilter, TransactionForm,
    validation::{parse_amount, parse_date},
};

use crate::{
    error::{AppError, Result},
    prompt,
    render::Output,
};

const RECENT_TRANSACTIONS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "financefit")]
#[command(about = "Track income and expenses against a FinanceFit server")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://localhost:8080).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Override the session state file.
    #[arg(long, global = true)]
    pub state_path: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in (the password is prompted, never read from flags).
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        monthly_goal: Option<String>,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Summary and latest transactions.
    Dashboard {
        #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        #[arg(long, requires = "month")]
        year: Option<i32>,
    },
    Transactions(Transactions),
    Categories(Categories),
    Profile(Profile),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Expense,
    Revenue,
}

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Expense => TransactionKind::Expense,
            KindArg::Revenue => TransactionKind::Revenue,
        }
    }
}

#[derive(Args, Debug)]
pub struct Transactions {
    #[command(subcommand)]
    command: TransactionsCommand,
}

#[derive(Subcommand, Debug)]
enum TransactionsCommand {
    List(ListArgs),
    Add(AddArgs),
    Update(UpdateArgs),
    Delete(TargetArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    /// Case-insensitive part of the category name.
    #[arg(long)]
    category: Option<String>,
    /// Month as YYYY-MM.
    #[arg(long)]
    month: Option<String>,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long, value_enum)]
    kind: KindArg,
    #[arg(long)]
    description: String,
    #[arg(long)]
    amount: String,
    /// Defaults to today.
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    category_id: Option<i64>,
}

#[derive(Args, Debug)]
struct TargetArgs {
    #[arg(long, value_enum)]
    kind: KindArg,
    #[arg(long)]
    id: i64,
}

impl TargetArgs {
    fn reference(&self) -> TransactionRef {
        TransactionRef {
            kind: self.kind.into(),
            id: self.id,
        }
    }
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[command(flatten)]
    target: TargetArgs,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    category_id: Option<i64>,
}

#[derive(Args, Debug)]
pub struct Categories {
    #[command(subcommand)]
    command: CategoriesCommand,
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct Profile {
    #[command(subcommand)]
    command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        monthly_goal: Option<String>,
    },
    /// Delete the account and sign out.
    Delete,
}

fn require_user(finance: &Finance) -> Result<SessionUser> {
    finance.session().current_user().ok_or(AppError::NotLoggedIn)
}

pub async fn run(command: Command, finance: &Finance, out: Output) -> Result<()> {
    let session = finance.session();

    match command {
        Command::Login { email } => {
            let password = prompt::password("Password: ")?;
            let user = session.login(&email, &password).await?;
            out.session_user(&user)
        }
        Command::Register {
            name,
            email,
            monthly_goal,
        } => {
            let form = RegisterForm {
                name,
                email,
                password: prompt::password("Password: ")?,
                confirm_password: prompt::password("Confirm password: ")?,
                monthly_goal: monthly_goal.unwrap_or_default(),
            };
            let user = session.register(&form).await?;
            out.session_user(&user)
        }
        Command::Logout => {
            session.logout()?;
            out.message("Logged out.")
        }
        Command::Whoami => out.session_user(&require_user(finance)?),
        Command::Dashboard { month, year } => {
            let user = require_user(finance)?;
            dashboard(finance, &user, month.zip(year), out).await
        }
        Command::Transactions(Transactions { command }) => {
            let user = require_user(finance)?;
            transactions(finance, &user, command, out).await
        }
        Command::Categories(Categories { command }) => {
            require_user(finance)?;
            match command {
                CategoriesCommand::List => out.categories(&finance.fetch_categories().await),
                CategoriesCommand::Add { name } => {
                    let category = finance
                        .create_category(&name)
                        .await
                        .ok_or_else(|| AppError::Failed("could not create category".to_string()))?;
                    out.categories(std::slice::from_ref(&category))
                }
            }
        }
        Command::Profile(Profile { command }) => {
            let user = require_user(finance)?;
            profile(finance, &user, command, out).await
        }
    }
}

async fn dashboard(
    finance: &Finance,
    user: &SessionUser,
    period: Option<(u32, i32)>,
    out: Output,
) -> Result<()> {
    let (summary, txs) = match period {
        Some((month, year)) => tokio::join!(
            finance.fetch_summary_by_period(&user.id, month, year),
            finance.fetch_transactions(&user.id),
        ),
        None => tokio::join!(
            finance.fetch_general_summary(&user.id),
            finance.fetch_transactions(&user.id),
        ),
    };

    let filter = TransactionFilter {
        month: period.map(|(month, year)| format!("{year:04}-{month:02}")),
        ..Default::default()
    };
    let visible = filter.apply(&txs);
    let totals = Totals::of(visible.iter().copied());
    let recent: Vec<_> = visible.into_iter().take(RECENT_TRANSACTIONS).collect();

    out.dashboard(summary.as_ref(), &recent, &totals)
}

async fn transactions(
    finance: &Finance,
    user: &SessionUser,
    command: TransactionsCommand,
    out: Output,
) -> Result<()> {
    match command {
        TransactionsCommand::List(args) => {
            let txs = finance.fetch_transactions(&user.id).await;
            let filter = TransactionFilter {
                kind: args.kind.map(Into::into),
                category: args.category,
                month: args.month,
            };
            let visible = filter.apply(&txs);
            let totals = Totals::of(visible.iter().copied());
            out.transactions(&visible, &totals)
        }
        TransactionsCommand::Add(args) => {
            let today = Local::now().date_naive();
            let form = TransactionForm {
                kind: args.kind.into(),
                description: args.description,
                amount: args.amount,
                date: args
                    .date
                    .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
                category_id: args.category_id,
            };
            let draft = form.validate()?;
            let created = finance
                .create_transaction(&user.id, &draft)
                .await
                .ok_or_else(|| AppError::Failed("could not save transaction".to_string()))?;
            out.transaction(&created)
        }
        TransactionsCommand::Update(args) => {
            let partial = TransactionUpdate {
                amount: args.amount.as_deref().map(parse_amount).transpose()?,
                date: args.date.as_deref().map(parse_date).transpose()?,
                description: args.description.filter(|d| !d.trim().is_empty()),
                category_id: args.category_id,
            };
            if partial.is_empty() {
                return Err(AppError::Failed("nothing to update".to_string()));
            }
            let updated = finance
                .update_transaction(args.target.reference(), &partial)
                .await
                .ok_or_else(|| AppError::Failed("could not update transaction".to_string()))?;
            out.transaction(&updated)
        }
        TransactionsCommand::Delete(args) => {
            let target = args.reference();
            let mut txs = finance.fetch_transactions(&user.id).await;
            finance.delete_transaction(&mut txs, target).await?;
            out.message(&format!(
                "Deleted {} {}. {} transactions left.",
                target.kind.as_str().to_lowercase(),
                target.id,
                txs.len()
            ))
        }
    }
}

async fn profile(
    finance: &Finance,
    user: &SessionUser,
    command: ProfileCommand,
    out: Output,
) -> Result<()> {
    match command {
        ProfileCommand::Show => {
            let profile = finance
                .fetch_user(&user.id)
                .await
                .ok_or_else(|| AppError::Failed("could not load profile".to_string()))?;
            out.profile(&profile)
        }
        ProfileCommand::Update {
            name,
            email,
            monthly_goal,
        } => {
            let monthly_goal = monthly_goal
                .as_deref()
                .map(str::parse::<MoneyCents>)
                .transpose()
                .map_err(client::ValidationError::from)?;
            let partial = UserUpdate {
                name,
                email,
                monthly_goal,
            };
            if partial.is_empty() {
                return Err(AppError::Failed("nothing to update".to_string()));
            }
            let updated = finance
                .update_user(&user.id, &partial)
                .await
                .ok_or_else(|| AppError::Failed("could not update profile".to_string()))?;
            out.profile(&updated)
        }
        ProfileCommand::Delete => {
            finance.delete_user(&user.id).await?;
            finance.session().logout()?;
            out.message("Account deleted.")
        }
    }
}
