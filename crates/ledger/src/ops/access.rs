//! Owner-scoped lookups and the referential validator.
//!
//! Every read here filters by `(id, owner_id)`: a reference owned by another
//! user resolves exactly like a missing one, so existence never leaks across
//! users. Nothing in this module writes.

use sea_orm::{Condition, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    BalanceTarget, CategoryKind, LedgerError, ResultLedger, TransactionDetail, accounts,
    categories, credit_cards, transactions,
};

use super::Ledger;

/// Generates an owner-scoped fetch method for an entity.
macro_rules! impl_owned_fetch {
    ($fn_name:ident, $module:ident) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            id: Uuid,
        ) -> ResultLedger<Option<$module::Model>> {
            $module::Entity::find_by_id(id)
                .filter($module::Column::OwnerId.eq(user_id))
                .one(db)
                .await
                .map_err(Into::into)
        }
    };
}

impl Ledger {
    impl_owned_fetch!(find_account_owned, accounts);
    impl_owned_fetch!(find_card_owned, credit_cards);
    impl_owned_fetch!(find_category_owned, categories);

    /// Confirms a balance target resolves to an entity owned by the user.
    pub(super) async fn require_target_ref(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        target: BalanceTarget,
    ) -> ResultLedger<()> {
        let found = match target {
            BalanceTarget::Account { account_id } => self
                .find_account_owned(db, user_id, account_id)
                .await?
                .is_some(),
            BalanceTarget::Card { card_id } => {
                self.find_card_owned(db, user_id, card_id).await?.is_some()
            }
        };
        if !found {
            let label = match target {
                BalanceTarget::Account { .. } => "account",
                BalanceTarget::Card { .. } => "credit card",
            };
            return Err(LedgerError::ReferenceNotFound(label.to_string()));
        }
        Ok(())
    }

    /// Confirms a category resolves for the user and matches the expected
    /// kind.
    async fn require_category_ref(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
        expected: CategoryKind,
    ) -> ResultLedger<()> {
        let model = self
            .find_category_owned(db, user_id, category_id)
            .await?
            .ok_or_else(|| LedgerError::ReferenceNotFound("category".to_string()))?;
        let kind = CategoryKind::try_from(model.kind.as_str())?;
        if kind != expected {
            return Err(LedgerError::CategoryKindMismatch(format!(
                "category \"{}\" is {}, the transaction is {}",
                model.name,
                kind.as_str(),
                expected.as_str()
            )));
        }
        Ok(())
    }

    /// Returns `true` if any transaction references the target, as primary
    /// balance target or as transfer target. Deletion guards read this.
    pub(super) async fn target_in_use(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        target: BalanceTarget,
    ) -> ResultLedger<bool> {
        let kind = target.kind().as_str();
        let id = target.id();
        let reference = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(user_id))
            .filter(
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
            )
            .one(db)
            .await?;
        Ok(reference.is_some())
    }

    /// Returns `true` if any transaction references the category.
    pub(super) async fn category_in_use(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultLedger<bool> {
        let reference = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(user_id))
            .filter(transactions::Column::CategoryId.eq(category_id))
            .one(db)
            .await?;
        Ok(reference.is_some())
    }

    /// Validates every reference of a candidate transaction image against the
    /// acting user. The per-kind shape rules are already enforced by
    /// [`TransactionDetail::from_refs`]; this adds ownership and the
    /// category-kind match, all inside the caller's atomic unit.
    pub(super) async fn validate_detail(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        detail: &TransactionDetail,
    ) -> ResultLedger<()> {
        match *detail {
            TransactionDetail::Expense {
                target,
                category_id,
            } => {
                self.require_target_ref(db, user_id, target).await?;
                self.require_category_ref(db, user_id, category_id, CategoryKind::Expense)
                    .await?;
            }
            TransactionDetail::Income {
                target,
                category_id,
            } => {
                self.require_target_ref(db, user_id, target).await?;
                self.require_category_ref(db, user_id, category_id, CategoryKind::Income)
                    .await?;
            }
            TransactionDetail::Transfer { from, to } => {
                self.require_target_ref(db, user_id, from).await?;
                self.require_target_ref(db, user_id, to).await?;
            }
        }
        Ok(())
    }
}
