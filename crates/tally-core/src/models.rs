//! Domain models for Tally
//!
//! Amounts are carried as integer cents internally and serialized as decimal
//! numbers (`12.5`) on the wire.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity used when authentication is disabled for local development
pub const LOCAL_DEV_EMAIL: &str = "local-dev@localhost";

/// Largest amount that fits a DECIMAL(12, 2) column, in cents
pub const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;

/// Years representable as four-digit `YYYY-MM-DD` text
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Number of trailing months covered by the dashboard trend chart
pub const TREND_MONTHS: u32 = 12;

/// Transaction (and category) type
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
        match s {
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

/// A user, identified by the email supplied by the access layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user-defined income or expense category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

/// Raw category payload as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Validated category ready for insertion
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub category_type: TransactionType,
}

impl TryFrom<CategoryInput> for NewCategory {
    type Error = Error;

    fn try_from(input: CategoryInput) -> Result<Self> {
        let name = clean_text(input.name).ok_or_else(|| Error::invalid("Invalid category data"))?;
        let category_type = input
            .category_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| Error::invalid("Invalid category data"))?;
        Ok(Self {
            name,
            category_type,
        })
    }
}

/// A recorded income or expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(rename = "amount", with = "cents")]
    pub amount_cents: i64,
    /// Set when `category_name` matched one of the user's categories of the same type
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    /// Public path of an uploaded receipt image (`/uploads/<file>`)
    pub receipt_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw transaction payload as sent by clients (create and update share it)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub amount: Option<f64>,
    pub transaction_date: Option<String>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub receipt_path: Option<String>,
}

/// Validated transaction ready for insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount_cents: i64,
    pub transaction_date: NaiveDate,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub receipt_path: Option<String>,
}

impl TryFrom<TransactionInput> for NewTransaction {
    type Error = Error;

    fn try_from(input: TransactionInput) -> Result<Self> {
        let transaction_type = parse_type(
            input
                .transaction_type
                .as_deref()
                .ok_or_else(|| Error::invalid("Type must be income or expense"))?,
        )?;
        let amount_cents = parse_amount(
            input
                .amount
                .ok_or_else(|| Error::invalid("Amount must be a positive number"))?,
        )?;
        let transaction_date = parse_date(
            input
                .transaction_date
                .as_deref()
                .ok_or_else(|| Error::invalid("Transaction date is required"))?,
        )?;

        Ok(Self {
            transaction_type,
            amount_cents,
            transaction_date,
            category_name: clean_text(input.category_name),
            description: clean_text(input.description),
            receipt_path: clean_text(input.receipt_path),
        })
    }
}

/// Partial transaction update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub transaction_type: Option<TransactionType>,
    pub amount_cents: Option<i64>,
    pub transaction_date: Option<NaiveDate>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub receipt_path: Option<String>,
}

impl TryFrom<TransactionInput> for TransactionUpdate {
    type Error = Error;

    fn try_from(input: TransactionInput) -> Result<Self> {
        Ok(Self {
            transaction_type: input.transaction_type.as_deref().map(parse_type).transpose()?,
            amount_cents: input.amount.map(parse_amount).transpose()?,
            transaction_date: input.transaction_date.as_deref().map(parse_date).transpose()?,
            category_name: clean_text(input.category_name),
            description: clean_text(input.description),
            receipt_path: clean_text(input.receipt_path),
        })
    }
}

/// Filters for listing transactions
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub period: Option<MonthPeriod>,
    pub transaction_type: Option<TransactionType>,
}

/// A bill expected once per month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringBill {
    pub id: i64,
    pub user_id: i64,
    /// The user's expense category with the same name, if one exists
    pub category_id: Option<i64>,
    pub category_name: String,
    #[serde(rename = "amount", with = "cents")]
    pub amount_cents: i64,
    /// Day of month (1-31) the bill falls due
    pub due_date: u32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw recurring bill payload as sent by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecurringBillInput {
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "flexible::f64_opt")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "flexible::i64_opt")]
    pub due_date: Option<i64>,
    pub description: Option<String>,
}

/// Validated recurring bill ready for insertion
#[derive(Debug, Clone)]
pub struct NewRecurringBill {
    pub category_name: String,
    pub amount_cents: i64,
    pub due_date: u32,
    pub description: Option<String>,
}

impl TryFrom<RecurringBillInput> for NewRecurringBill {
    type Error = Error;

    fn try_from(input: RecurringBillInput) -> Result<Self> {
        let category_name = clean_text(input.category_name)
            .ok_or_else(|| Error::invalid("Category name is required"))?;
        let amount_cents = parse_amount(
            input
                .amount
                .ok_or_else(|| Error::invalid("Amount must be a positive number"))?,
        )?;
        let due_date = parse_due_date(
            input
                .due_date
                .ok_or_else(|| Error::invalid("Due date must be between 1 and 31"))?,
        )?;

        Ok(Self {
            category_name,
            amount_cents,
            due_date,
            description: clean_text(input.description),
        })
    }
}

/// Partial recurring bill update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct RecurringBillUpdate {
    pub category_name: Option<String>,
    pub amount_cents: Option<i64>,
    pub due_date: Option<u32>,
    pub description: Option<String>,
}

impl TryFrom<RecurringBillInput> for RecurringBillUpdate {
    type Error = Error;

    fn try_from(input: RecurringBillInput) -> Result<Self> {
        // A present-but-blank name is an error, not a no-op
        let category_name = match input.category_name {
            Some(name) => Some(
                clean_text(Some(name))
                    .ok_or_else(|| Error::invalid("Category name is required"))?,
            ),
            None => None,
        };

        Ok(Self {
            category_name,
            amount_cents: input.amount.map(parse_amount).transpose()?,
            due_date: input.due_date.map(parse_due_date).transpose()?,
            description: clean_text(input.description),
        })
    }
}

/// A recurring bill together with its completion state for one month
#[derive(Debug, Clone, Serialize)]
pub struct BillStatus {
    #[serde(flatten)]
    pub bill: RecurringBill,
    pub is_complete: bool,
    pub expense_count: i64,
}

/// Expense count for one (category_id, category_name) pair within a month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseGroup {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub count: i64,
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid("Month must be between 1 and 12"));
        }
        if !YEAR_RANGE.contains(&year) {
            return Err(Error::invalid("Year must be between 1 and 9999"));
        }
        Ok(Self { year, month })
    }

    /// Build from optional query parameters: both or neither must be present
    pub fn from_parts(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>> {
        match (month, year) {
            (Some(m), Some(y)) => Self::new(y, m).map(Some),
            (None, None) => Ok(None),
            _ => Err(Error::invalid("Month and year must be provided together")),
        }
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month
    pub fn end_exclusive(&self) -> NaiveDate {
        self.start()
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl std::fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// First day included in the trailing trend window ending at `today`
pub fn trend_window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(TREND_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

/// Dashboard totals for a user (optionally one month)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub summary: DashboardSummary,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_data: Vec<MonthlyTotal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    #[serde(rename = "totalIncome", with = "cents")]
    pub total_income_cents: i64,
    #[serde(rename = "totalExpenses", with = "cents")]
    pub total_expenses_cents: i64,
    #[serde(rename = "netBalance", with = "cents")]
    pub net_balance_cents: i64,
}

impl DashboardSummary {
    pub fn new(total_income_cents: i64, total_expenses_cents: i64) -> Self {
        Self {
            total_income_cents,
            total_expenses_cents,
            net_balance_cents: total_income_cents - total_expenses_cents,
        }
    }
}

/// Expense total for one category name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    #[serde(rename = "total", with = "cents")]
    pub total_cents: i64,
}

/// Income or expense total for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(rename = "total", with = "cents")]
    pub total_cents: i64,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_id: i64,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

// ============================================================================
// Parsing helpers
// ============================================================================

/// Parse a transaction type, rejecting anything but `income`/`expense`
pub fn parse_type(s: &str) -> Result<TransactionType> {
    s.parse()
        .map_err(|_| Error::invalid("Type must be income or expense"))
}

/// Convert a decimal amount to cents, requiring at least 0.01
pub fn parse_amount(amount: f64) -> Result<i64> {
    if !amount.is_finite() || amount < 0.01 {
        return Err(Error::invalid("Amount must be a positive number"));
    }
    let cents = (amount * 100.0).round();
    if cents > MAX_AMOUNT_CENTS as f64 {
        return Err(Error::invalid("Amount is too large"));
    }
    Ok(cents as i64)
}

/// Parse an ISO-8601 date (`YYYY-MM-DD`) or timestamp, keeping the date part
///
/// Years outside 1..=9999 are rejected: chrono accepts signed and five-digit
/// years, which would not sort correctly as stored `YYYY-MM-DD` text.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        });
    match date {
        Some(date) if YEAR_RANGE.contains(&date.year()) => Ok(date),
        _ => Err(Error::invalid("Invalid transaction date (use YYYY-MM-DD)")),
    }
}

fn parse_due_date(day: i64) -> Result<u32> {
    if (1..=31).contains(&day) {
        Ok(day as u32)
    } else {
        Err(Error::invalid("Due date must be between 1 and 31"))
    }
}

/// Trim free text; blank becomes `None`
pub fn clean_text(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Serialize integer cents as a decimal number
pub mod cents {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*cents as f64 / 100.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok((amount * 100.0).round() as i64)
    }
}

/// Form-style clients send numbers as strings; accept both
mod flexible {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Float(f64),
        Text(String),
    }

    pub fn f64_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(NumberOrString::Float(f)) => Ok(Some(f)),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("not a number: {}", s))),
        }
    }

    pub fn i64_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match f64_opt(deserializer)? {
            None => Ok(None),
            Some(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
            Some(f) => Err(serde::de::Error::custom(format!("not an integer: {}", f))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(12.5).unwrap(), 1250);
        assert_eq!(parse_amount(0.01).unwrap(), 1);
        assert_eq!(parse_amount(19.99).unwrap(), 1999);
        assert!(parse_amount(0.0).is_err());
        assert!(parse_amount(-5.0).is_err());
        assert!(parse_amount(0.001).is_err());
        assert!(parse_amount(f64::NAN).is_err());
        assert!(parse_amount(1e13).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15").unwrap(), expected);
        assert_eq!(parse_date("2024-03-15T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_date("2024-03-15T10:30:00.000").unwrap(), expected);
        assert!(parse_date("03/15/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_date_rejects_out_of_range_years() {
        assert!(parse_date("+10000-01-01").is_err());
        assert!(parse_date("-0001-01-01").is_err());
        assert!(parse_date("0000-12-31").is_err());
        assert!(parse_date("+10000-01-01T00:00:00Z").is_err());
        assert_eq!(
            parse_date("9999-12-31").unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()
        );
        assert_eq!(
            parse_date("0001-01-01").unwrap(),
            NaiveDate::from_ymd_opt(1, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_transaction_type_is_case_sensitive() {
        assert_eq!(parse_type("income").unwrap(), TransactionType::Income);
        assert_eq!(parse_type("expense").unwrap(), TransactionType::Expense);
        assert!(parse_type("Expense").is_err());
        assert!(parse_type("transfer").is_err());
    }

    #[test]
    fn test_new_transaction_requires_fields() {
        let input = TransactionInput {
            transaction_type: Some("expense".into()),
            amount: Some(42.0),
            transaction_date: Some("2024-01-31".into()),
            category_name: Some("  Rent  ".into()),
            description: Some("   ".into()),
            receipt_path: None,
        };
        let tx = NewTransaction::try_from(input.clone()).unwrap();
        assert_eq!(tx.amount_cents, 4200);
        assert_eq!(tx.category_name.as_deref(), Some("Rent"));
        assert_eq!(tx.description, None);

        let missing_amount = TransactionInput {
            amount: None,
            ..input.clone()
        };
        assert!(NewTransaction::try_from(missing_amount).is_err());

        let bad_type = TransactionInput {
            transaction_type: Some("transfer".into()),
            ..input
        };
        assert!(NewTransaction::try_from(bad_type).is_err());
    }

    #[test]
    fn test_transaction_update_allows_empty_patch() {
        let update = TransactionUpdate::try_from(TransactionInput::default()).unwrap();
        assert!(update.transaction_type.is_none());
        assert!(update.amount_cents.is_none());
        assert!(update.category_name.is_none());
    }

    #[test]
    fn test_bill_validation() {
        let input = RecurringBillInput {
            category_name: Some("Utilities".into()),
            amount: Some(80.0),
            due_date: Some(15),
            description: None,
        };
        assert!(NewRecurringBill::try_from(input.clone()).is_ok());

        for day in [0, 32, -1] {
            let bad = RecurringBillInput {
                due_date: Some(day),
                ..input.clone()
            };
            assert!(NewRecurringBill::try_from(bad).is_err(), "day {}", day);
        }

        let blank = RecurringBillInput {
            category_name: Some("  ".into()),
            ..input.clone()
        };
        assert!(NewRecurringBill::try_from(blank).is_err());

        // Update: blank name is rejected, missing name is fine
        let blank_update = RecurringBillInput {
            category_name: Some("".into()),
            ..Default::default()
        };
        assert!(RecurringBillUpdate::try_from(blank_update).is_err());
        assert!(RecurringBillUpdate::try_from(RecurringBillInput::default()).is_ok());
    }

    #[test]
    fn test_inputs_accept_numeric_strings() {
        let input: RecurringBillInput = serde_json::from_value(serde_json::json!({
            "category_name": "Internet",
            "amount": "59.99",
            "due_date": "3"
        }))
        .unwrap();
        assert_eq!(input.amount, Some(59.99));
        assert_eq!(input.due_date, Some(3));

        let bad: std::result::Result<RecurringBillInput, _> =
            serde_json::from_value(serde_json::json!({ "due_date": 2.5 }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_month_period_bounds() {
        let feb = MonthPeriod::new(2024, 2).unwrap();
        assert_eq!(feb.start(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(
            feb.end_exclusive(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );

        let dec = MonthPeriod::new(2023, 12).unwrap();
        assert_eq!(
            dec.end_exclusive(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );

        assert!(MonthPeriod::new(2024, 13).is_err());
        assert!(MonthPeriod::new(2024, 0).is_err());
    }

    #[test]
    fn test_month_period_from_parts() {
        assert_eq!(MonthPeriod::from_parts(None, None).unwrap(), None);
        assert_eq!(
            MonthPeriod::from_parts(Some(5), Some(2024)).unwrap(),
            Some(MonthPeriod {
                year: 2024,
                month: 5
            })
        );
        assert!(MonthPeriod::from_parts(Some(5), None).is_err());
        assert!(MonthPeriod::from_parts(None, Some(2024)).is_err());
    }

    #[test]
    fn test_trend_window_start() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            trend_window_start(today),
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap()
        );
        // Leap day clamps to the end of February
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            trend_window_start(leap),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = DashboardSummary::new(250000, 112550);
        assert_eq!(summary.net_balance_cents, 137450);
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["totalIncome"], 2500.0);
        assert_eq!(json["totalExpenses"], 1125.5);
        assert_eq!(json["netBalance"], 1374.5);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(1999), "19.99");
        assert_eq!(format_cents(-505), "-5.05");
    }
}
