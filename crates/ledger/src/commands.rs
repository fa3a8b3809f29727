//! Command structs for ledger operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Update commands use explicit
//! patch fields instead of ad hoc field lists: `Option` for plain
//! overwrites, [`Patch`] where "leave unchanged" and "clear" must be
//! distinguishable.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Amount, BalanceTarget, TransactionKind};

/// A tri-state patch for a nullable field: keep the stored value, clear it,
/// or replace it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// Resolves the patch against the stored value.
    pub fn apply(self, existing: Option<T>) -> Option<T> {
        match self {
            Self::Keep => existing,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }
}

/// Create a transaction.
///
/// The references the kind requires (target account/card, category, transfer
/// target) are validated by the ledger, not here.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
    pub settled: bool,
    pub note: Option<String>,
    pub target: Option<BalanceTarget>,
    pub category_id: Option<Uuid>,
    pub transfer_target: Option<BalanceTarget>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount,
            occurred_at,
            settled: false,
            note: None,
            target: None,
            category_id: None,
            transfer_target: None,
        }
    }

    #[must_use]
    pub fn target(mut self, target: BalanceTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Shorthand for targeting a regular account.
    #[must_use]
    pub fn account(self, account_id: Uuid) -> Self {
        self.target(BalanceTarget::account(account_id))
    }

    /// Shorthand for targeting a credit card.
    #[must_use]
    pub fn card(self, card_id: Uuid) -> Self {
        self.target(BalanceTarget::card(card_id))
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn transfer_to(mut self, target: BalanceTarget) -> Self {
        self.transfer_target = Some(target);
        self
    }

    #[must_use]
    pub fn settled(mut self, settled: bool) -> Self {
        self.settled = settled;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Update an existing transaction.
///
/// Unset fields keep their stored values; the merged result is re-validated
/// as a whole, so a kind change must also patch the references the new kind
/// requires (and clear the ones it forbids).
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,

    pub kind: Option<TransactionKind>,
    pub amount: Option<Amount>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub settled: Option<bool>,
    pub note: Patch<String>,

    pub target: Option<BalanceTarget>,
    pub category_id: Patch<Uuid>,
    pub transfer_target: Patch<BalanceTarget>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            kind: None,
            amount: None,
            occurred_at: None,
            settled: None,
            note: Patch::Keep,
            target: None,
            category_id: Patch::Keep,
            transfer_target: Patch::Keep,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn settled(mut self, settled: bool) -> Self {
        self.settled = Some(settled);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Patch::Set(note.into());
        self
    }

    #[must_use]
    pub fn clear_note(mut self) -> Self {
        self.note = Patch::Clear;
        self
    }

    #[must_use]
    pub fn target(mut self, target: BalanceTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Shorthand for retargeting onto a regular account.
    #[must_use]
    pub fn account(self, account_id: Uuid) -> Self {
        self.target(BalanceTarget::account(account_id))
    }

    /// Shorthand for retargeting onto a credit card.
    #[must_use]
    pub fn card(self, card_id: Uuid) -> Self {
        self.target(BalanceTarget::card(card_id))
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Patch::Set(category_id);
        self
    }

    #[must_use]
    pub fn clear_category(mut self) -> Self {
        self.category_id = Patch::Clear;
        self
    }

    #[must_use]
    pub fn transfer_to(mut self, target: BalanceTarget) -> Self {
        self.transfer_target = Patch::Set(target);
        self
    }

    #[must_use]
    pub fn clear_transfer_target(mut self) -> Self {
        self.transfer_target = Patch::Clear;
        self
    }
}

/// Patch for credit card fields editable outside the ledger engine.
#[derive(Clone, Debug, Default)]
pub struct CreditCardPatch {
    pub name: Option<String>,
    pub limit_value: Option<Amount>,
    pub due_day: Option<u8>,
    pub closing_day: Option<u8>,
    pub paid: Option<bool>,
}

impl CreditCardPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn limit_value(mut self, limit_value: Amount) -> Self {
        self.limit_value = Some(limit_value);
        self
    }

    #[must_use]
    pub fn due_day(mut self, due_day: u8) -> Self {
        self.due_day = Some(due_day);
        self
    }

    #[must_use]
    pub fn closing_day(mut self, closing_day: u8) -> Self {
        self.closing_day = Some(closing_day);
        self
    }

    #[must_use]
    pub fn paid(mut self, paid: bool) -> Self {
        self.paid = Some(paid);
        self
    }
}

/// Patch for category fields. The kind is fixed at creation: transactions
/// referencing the category rely on it.
#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub visible: Option<bool>,
}

impl CategoryPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }
}
