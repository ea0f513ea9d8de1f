//! Domain models for Spendwise

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Currency assumed for users created without one
pub const DEFAULT_CURRENCY: &str = "INR";

/// A user owning transactions, budgets, insights and badges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// ISO 4217 code; transactions in any other currency count as foreign
    pub base_currency: String,
    pub created_at: DateTime<Utc>,
}

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recurrence frequency of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Always positive; direction comes from `tx_type`
    pub amount: f64,
    pub description: Option<String>,
    pub category: Option<String>,
    /// ISO 4217 code, `None` means the user's base currency
    pub currency: Option<String>,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.tx_type == TransactionType::Expense
    }

    /// Calendar day (UTC) the transaction was made
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// A new transaction to be inserted
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub tx_type: TransactionType,
    pub amount: f64,
    pub description: Option<String>,
    pub category: Option<String>,
    pub currency: Option<String>,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
}

impl NewTransaction {
    /// Plain one-off expense
    pub fn expense(amount: f64, description: &str, date: DateTime<Utc>) -> Self {
        Self {
            tx_type: TransactionType::Expense,
            amount,
            description: Some(description.to_string()),
            category: None,
            currency: None,
            date,
            is_recurring: false,
            frequency: None,
        }
    }

    /// Plain one-off income
    pub fn income(amount: f64, description: &str, date: DateTime<Utc>) -> Self {
        Self {
            tx_type: TransactionType::Income,
            ..Self::expense(amount, description, date)
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = Some(currency.to_string());
        self
    }

    pub fn recurring(mut self, frequency: Frequency) -> Self {
        self.is_recurring = true;
        self.frequency = Some(frequency);
        self
    }
}

/// A monthly budget, either for one category or for all spending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    /// "YYYY-MM"
    pub month: String,
    pub amount: f64,
    /// `None` = whole-budget for the month
    pub category: Option<String>,
}

/// Format a date's month as "YYYY-MM"
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parse a "YYYY-MM" month key into the first day of that month
pub fn parse_month_key(month: &str) -> Option<NaiveDate> {
    let (year, month) = month.trim().split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}
