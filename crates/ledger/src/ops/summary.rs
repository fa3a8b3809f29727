//! Read-only derived views over accounts, cards and transactions.
//!
//! Every view runs inside its own atomic unit for a point-in-time read; none
//! of them writes. Sums are computed by the store so the cached balances and
//! the per-kind totals come back in one statement each.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Statement, TransactionTrait};

use crate::{Amount, LedgerError, ResultLedger, TransactionKind};

use super::{Ledger, with_tx};

/// A UTC half-open interval `[from, to)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> ResultLedger<Self> {
        if from >= to {
            return Err(LedgerError::InvalidAmount(
                "invalid range: from must be < to".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    /// The calendar month `[first day, first day of the next month)`.
    pub fn calendar_month(year: i32, month: u32) -> ResultLedger<Self> {
        let invalid = || LedgerError::InvalidAmount(format!("invalid month: {year}-{month:02}"));
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;
        Self::new(
            Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)),
            Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)),
        )
    }
}

/// Per-kind transaction totals over a period. Kinds with no transactions in
/// the period report zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    pub total_income: Amount,
    pub total_expenses: Amount,
    pub total_transfers: Amount,
    /// `total_income - total_expenses`; transfers are internal moves and do
    /// not change the net.
    pub net_amount: Amount,
    pub count: u64,
}

/// Aggregate credit card position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreditOverview {
    /// Sum of each card's outstanding debt (cards in credit owe nothing).
    pub total_debt: Amount,
    pub total_limit: Amount,
    pub available_credit: Amount,
    /// `total_debt / total_limit * 100`; `0.0` when the limit sum is zero.
    pub utilization: f64,
}

impl Ledger {
    /// Sum of the user's account balances.
    pub async fn total_balance(&self, user_id: &str) -> ResultLedger<Amount> {
        with_tx!(self, |db_tx| {
            let stmt = Statement::from_sql_and_values(
                db_tx.get_database_backend(),
                "SELECT COALESCE(SUM(current_value), 0) AS sum \
                 FROM accounts WHERE owner_id = ?",
                vec![user_id.into()],
            );
            let row = db_tx.query_one(stmt).await?;
            let total: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
            Ok(Amount::new(total))
        })
    }

    /// Aggregate debt, limit and utilization across the user's credit cards.
    pub async fn credit_overview(&self, user_id: &str) -> ResultLedger<CreditOverview> {
        with_tx!(self, |db_tx| {
            let stmt = Statement::from_sql_and_values(
                db_tx.get_database_backend(),
                "SELECT COALESCE(SUM(limit_value), 0) AS total_limit, \
                 COALESCE(SUM(CASE WHEN current_value < 0 THEN -current_value ELSE 0 END), 0) \
                 AS total_debt \
                 FROM credit_cards WHERE owner_id = ?",
                vec![user_id.into()],
            );
            let row = db_tx.query_one(stmt).await?;
            let (total_limit, total_debt): (i64, i64) = match row {
                Some(row) => (
                    row.try_get("", "total_limit").unwrap_or(0),
                    row.try_get("", "total_debt").unwrap_or(0),
                ),
                None => (0, 0),
            };

            let total_limit = Amount::new(total_limit);
            let total_debt = Amount::new(total_debt);
            let utilization = if total_limit.is_zero() {
                0.0
            } else {
                total_debt.cents() as f64 / total_limit.cents() as f64 * 100.0
            };
            Ok(CreditOverview {
                total_debt,
                total_limit,
                available_credit: total_limit - total_debt,
                utilization,
            })
        })
    }

    /// Per-kind totals over an optional `[from, to)` range.
    pub async fn transaction_summary(
        &self,
        user_id: &str,
        range: Option<&DateRange>,
    ) -> ResultLedger<TransactionSummary> {
        with_tx!(self, |db_tx| {
            let (range_cond, mut values) = match range {
                Some(range) => (
                    " AND occurred_at >= ? AND occurred_at < ?",
                    vec![range.from.into(), range.to.into()],
                ),
                None => ("", Vec::new()),
            };
            values.insert(0, user_id.into());

            let stmt = Statement::from_sql_and_values(
                db_tx.get_database_backend(),
                format!(
                    "SELECT kind, COALESCE(SUM(amount_minor), 0) AS sum, COUNT(*) AS count \
                     FROM transactions WHERE owner_id = ?{range_cond} GROUP BY kind"
                ),
                values,
            );

            let mut summary = TransactionSummary::default();
            for row in db_tx.query_all(stmt).await? {
                let kind: String = row.try_get("", "kind")?;
                let sum: i64 = row.try_get("", "sum")?;
                let count: i64 = row.try_get("", "count")?;
                summary.count += count.max(0) as u64;
                match TransactionKind::try_from(kind.as_str())? {
                    TransactionKind::Income => summary.total_income = Amount::new(sum),
                    TransactionKind::Expense => summary.total_expenses = Amount::new(sum),
                    TransactionKind::Transfer => summary.total_transfers = Amount::new(sum),
                }
            }
            summary.net_amount = summary.total_income - summary.total_expenses;
            Ok(summary)
        })
    }

    /// Per-kind totals over a calendar month.
    pub async fn monthly_summary(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> ResultLedger<TransactionSummary> {
        let range = DateRange::calendar_month(year, month)?;
        self.transaction_summary(user_id, Some(&range)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_month_is_half_open() {
        let range = DateRange::calendar_month(2024, 7).unwrap();
        assert_eq!(range.from.to_rfc3339(), "2024-07-01T00:00:00+00:00");
        assert_eq!(range.to.to_rfc3339(), "2024-08-01T00:00:00+00:00");
    }

    #[test]
    fn calendar_month_rolls_over_december() {
        let range = DateRange::calendar_month(2024, 12).unwrap();
        assert_eq!(range.to.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn calendar_month_rejects_invalid_months() {
        assert!(DateRange::calendar_month(2024, 0).is_err());
        assert!(DateRange::calendar_month(2024, 13).is_err());
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let range = DateRange::calendar_month(2024, 7).unwrap();
        assert!(DateRange::new(range.to, range.from).is_err());
        assert!(DateRange::new(range.from, range.from).is_err());
    }
}
