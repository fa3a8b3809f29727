//! Transaction primitives.
//!
//! A `Transaction` is the source of truth for balances: every create, update
//! and delete is mirrored onto the cached `current_value` of the balance
//! targets it references, inside the same atomic unit.
//!
//! The reference structure is encoded as [`TransactionDetail`] so that
//! invalid combinations (a transfer with a category, an expense without one)
//! are unrepresentable in the domain type. Decoding a stored row into the
//! enum is the single place where an inconsistent row can surface, and it
//! does so as a database error rather than being coerced into shape.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DbErr, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "transfer" => Ok(Self::Transfer),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum BalanceTargetKind {
    Account,
    Card,
}

impl BalanceTargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Card => "card",
        }
    }
}

impl TryFrom<&str> for BalanceTargetKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "account" => Ok(Self::Account),
            "card" => Ok(Self::Card),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid balance target kind: {other}"
            ))),
        }
    }
}

/// The account-like entity a transaction moves money on: a regular account
/// or a credit card. Both carry a cached balance and receive effects the
/// same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum BalanceTarget {
    Account { account_id: Uuid },
    Card { card_id: Uuid },
}

impl BalanceTarget {
    #[must_use]
    pub fn account(account_id: Uuid) -> Self {
        Self::Account { account_id }
    }

    #[must_use]
    pub fn card(card_id: Uuid) -> Self {
        Self::Card { card_id }
    }

    pub(crate) fn kind(self) -> BalanceTargetKind {
        match self {
            Self::Account { .. } => BalanceTargetKind::Account,
            Self::Card { .. } => BalanceTargetKind::Card,
        }
    }

    pub(crate) fn id(self) -> Uuid {
        match self {
            Self::Account { account_id } => account_id,
            Self::Card { card_id } => card_id,
        }
    }

    pub(crate) fn from_parts(kind: &str, id: Uuid) -> ResultLedger<Self> {
        match BalanceTargetKind::try_from(kind)? {
            BalanceTargetKind::Account => Ok(Self::Account { account_id: id }),
            BalanceTargetKind::Card => Ok(Self::Card { card_id: id }),
        }
    }
}

/// The reference structure of a transaction, by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionDetail {
    Expense {
        target: BalanceTarget,
        category_id: Uuid,
    },
    Income {
        target: BalanceTarget,
        category_id: Uuid,
    },
    Transfer {
        from: BalanceTarget,
        to: BalanceTarget,
    },
}

impl TransactionDetail {
    /// Assembles a detail from loose references, enforcing the per-kind shape
    /// rules:
    ///
    /// - expense/income: a balance target and a category, no transfer target
    /// - transfer: two distinct balance targets, no category
    pub fn from_refs(
        kind: TransactionKind,
        target: Option<BalanceTarget>,
        category_id: Option<Uuid>,
        transfer_target: Option<BalanceTarget>,
    ) -> ResultLedger<Self> {
        let target = target.ok_or_else(|| {
            LedgerError::ReferenceNotFound("an account reference is required".to_string())
        })?;
        match kind {
            TransactionKind::Expense | TransactionKind::Income => {
                if transfer_target.is_some() {
                    return Err(LedgerError::UnexpectedReference(
                        "a transfer target is only valid on transfers".to_string(),
                    ));
                }
                let category_id = category_id.ok_or_else(|| {
                    LedgerError::ReferenceNotFound(
                        "a category reference is required".to_string(),
                    )
                })?;
                Ok(match kind {
                    TransactionKind::Expense => Self::Expense {
                        target,
                        category_id,
                    },
                    _ => Self::Income {
                        target,
                        category_id,
                    },
                })
            }
            TransactionKind::Transfer => {
                if category_id.is_some() {
                    return Err(LedgerError::UnexpectedReference(
                        "a category is only valid on expenses and incomes".to_string(),
                    ));
                }
                let to = transfer_target.ok_or_else(|| {
                    LedgerError::ReferenceNotFound(
                        "a transfer target reference is required".to_string(),
                    )
                })?;
                if target == to {
                    return Err(LedgerError::InvalidTransferTarget(
                        "a transfer must name two distinct balance targets".to_string(),
                    ));
                }
                Ok(Self::Transfer { from: target, to })
            }
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Income { .. } => TransactionKind::Income,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// The primary balance target (the `from` side of a transfer).
    pub fn target(&self) -> BalanceTarget {
        match *self {
            Self::Expense { target, .. } | Self::Income { target, .. } => target,
            Self::Transfer { from, .. } => from,
        }
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match *self {
            Self::Expense { category_id, .. } | Self::Income { category_id, .. } => {
                Some(category_id)
            }
            Self::Transfer { .. } => None,
        }
    }

    pub fn transfer_target(&self) -> Option<BalanceTarget> {
        match *self {
            Self::Transfer { to, .. } => Some(to),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: String,
    pub occurred_at: DateTime<Utc>,
    /// Strictly positive; the sign of each balance effect comes from the
    /// kind, not the amount.
    pub amount: Amount,
    pub settled: bool,
    pub note: Option<String>,
    pub detail: TransactionDetail,
}

impl Transaction {
    pub fn new(
        owner_id: String,
        detail: TransactionDetail,
        amount: Amount,
        occurred_at: DateTime<Utc>,
        settled: bool,
        note: Option<String>,
    ) -> ResultLedger<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            occurred_at,
            amount,
            settled,
            note,
            detail,
        })
    }

    pub fn kind(&self) -> TransactionKind {
        self.detail.kind()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    pub amount_minor: i64,
    pub settled: bool,
    pub note: Option<String>,
    pub target_kind: String,
    pub target_id: Uuid,
    pub category_id: Option<Uuid>,
    pub transfer_target_kind: Option<String>,
    pub transfer_target_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let target = tx.detail.target();
        let transfer_target = tx.detail.transfer_target();
        Self {
            id: ActiveValue::Set(tx.id),
            owner_id: ActiveValue::Set(tx.owner_id.clone()),
            kind: ActiveValue::Set(tx.kind().as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            settled: ActiveValue::Set(tx.settled),
            note: ActiveValue::Set(tx.note.clone()),
            target_kind: ActiveValue::Set(target.kind().as_str().to_string()),
            target_id: ActiveValue::Set(target.id()),
            category_id: ActiveValue::Set(tx.detail.category_id()),
            transfer_target_kind: ActiveValue::Set(
                transfer_target.map(|t| t.kind().as_str().to_string()),
            ),
            transfer_target_id: ActiveValue::Set(transfer_target.map(BalanceTarget::id)),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupt = |msg: &str| {
            LedgerError::Database(DbErr::Custom(format!(
                "transaction {}: {msg}",
                model.id
            )))
        };

        let kind = TransactionKind::try_from(model.kind.as_str())?;
        let target = BalanceTarget::from_parts(&model.target_kind, model.target_id)?;
        let detail = match kind {
            TransactionKind::Expense | TransactionKind::Income => {
                if model.transfer_target_kind.is_some() || model.transfer_target_id.is_some() {
                    return Err(corrupt("unexpected transfer target"));
                }
                let category_id = model
                    .category_id
                    .ok_or_else(|| corrupt("missing category reference"))?;
                match kind {
                    TransactionKind::Expense => TransactionDetail::Expense {
                        target,
                        category_id,
                    },
                    _ => TransactionDetail::Income {
                        target,
                        category_id,
                    },
                }
            }
            TransactionKind::Transfer => {
                if model.category_id.is_some() {
                    return Err(corrupt("unexpected category reference"));
                }
                let to_kind = model
                    .transfer_target_kind
                    .as_deref()
                    .ok_or_else(|| corrupt("missing transfer target kind"))?;
                let to_id = model
                    .transfer_target_id
                    .ok_or_else(|| corrupt("missing transfer target id"))?;
                TransactionDetail::Transfer {
                    from: target,
                    to: BalanceTarget::from_parts(to_kind, to_id)?,
                }
            }
        };

        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            occurred_at: model.occurred_at,
            amount: Amount::new(model.amount_minor),
            settled: model.settled,
            note: model.note,
            detail,
        })
    }
}
