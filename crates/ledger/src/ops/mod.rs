use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{LedgerError, ResultLedger};

mod access;
mod accounts;
mod categories;
mod credit_cards;
mod summary;
mod transactions;

pub use summary::{CreditOverview, DateRange, TransactionSummary};
pub use transactions::TransactionFilter;

/// Run a block inside a DB transaction, committing on success and rolling
/// back (on drop) on error. Every mutation of an atomic unit must go through
/// the `$tx` handle so nothing persists when the unit aborts.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let crate::LedgerError::Database(ref db_err) = err {
                    tracing::error!("atomic unit aborted: {db_err}");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine: all operations are owner-scoped and each call is one
/// atomic unit against the backing store. The struct holds nothing but the
/// connection; state lives in the database.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.nfc().collect())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub async fn build(self) -> ResultLedger<Ledger> {
        Ok(Ledger {
            database: self.database,
        })
    }
}
