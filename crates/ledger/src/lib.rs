pub use accounts::Account;
pub use categories::{Category, CategoryKind};
pub use commands::{
    CategoryPatch, CreateTransactionCmd, CreditCardPatch, Patch, UpdateTransactionCmd,
};
pub use credit_cards::CreditCard;
pub use effects::{Effect, effects_of};
pub use error::LedgerError;
pub use money::Amount;
pub use ops::{
    CreditOverview, DateRange, Ledger, LedgerBuilder, TransactionFilter, TransactionSummary,
};
pub use transactions::{BalanceTarget, Transaction, TransactionDetail, TransactionKind};

mod accounts;
mod categories;
mod commands;
mod credit_cards;
mod effects;
mod error;
mod money;
mod ops;
mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
