//! Read-side transaction queries.

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BalanceTarget, LedgerError, ResultLedger, Transaction, TransactionKind, transactions,
};

use super::super::{Ledger, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    /// Restrict to transactions touching this balance target, as primary
    /// target or as transfer target.
    pub target: Option<BalanceTarget>,
    pub category_id: Option<Uuid>,
    pub settled: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn validate_filter(filter: &TransactionFilter) -> ResultLedger<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(LedgerError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

impl Ledger {
    /// Lists the user's transactions, newest first by `(occurred_at, id)`.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
        limit: u64,
        offset: u64,
    ) -> ResultLedger<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            validate_filter(filter)?;

            let mut query = transactions::Entity::find()
                .filter(transactions::Column::OwnerId.eq(user_id))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit)
                .offset(offset);

            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
            }
            if let Some(target) = filter.target {
                let kind = target.kind().as_str();
                let id = target.id();
                query = query.filter(
                    Condition::any()
                        .add(
                            Condition::all()
                                .add(transactions::Column::TargetKind.eq(kind))
                                .add(transactions::Column::TargetId.eq(id)),
                        )
                        .add(
                            Condition::all()
                                .add(transactions::Column::TransferTargetKind.eq(kind))
                                .add(transactions::Column::TransferTargetId.eq(id)),
                        ),
                );
            }
            if let Some(category_id) = filter.category_id {
                query = query.filter(transactions::Column::CategoryId.eq(category_id));
            }
            if let Some(settled) = filter.settled {
                query = query.filter(transactions::Column::Settled.eq(settled));
            }
            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::OccurredAt.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::OccurredAt.lt(to));
            }

            let rows = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(Transaction::try_from(model)?);
            }
            Ok(out)
        })
    }
}
