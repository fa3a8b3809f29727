use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    BalanceTarget, Effect, LedgerError, ResultLedger, Transaction, accounts, credit_cards,
    transactions,
};

use super::super::super::Ledger;

impl Ledger {
    /// Loads a transaction scoped by `(id, owner)` and decodes it.
    pub(super) async fn load_transaction_owned(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultLedger<Option<Transaction>> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::OwnerId.eq(user_id))
            .one(db)
            .await?;
        model.map(Transaction::try_from).transpose()
    }

    /// Applies one signed balance delta as a single
    /// `UPDATE ... SET current_value = current_value + ?` statement, so two
    /// units adjusting the same target concurrently cannot lose an update.
    ///
    /// Matching zero rows means the target vanished inside this unit; the
    /// error aborts the unit.
    async fn apply_effect(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        effect: Effect,
    ) -> ResultLedger<()> {
        let delta = effect.amount.cents();
        let rows_affected = match effect.target {
            BalanceTarget::Account { account_id } => {
                accounts::Entity::update_many()
                    .col_expr(
                        accounts::Column::CurrentValue,
                        Expr::col(accounts::Column::CurrentValue).add(delta),
                    )
                    .filter(accounts::Column::Id.eq(account_id))
                    .filter(accounts::Column::OwnerId.eq(user_id))
                    .exec(db)
                    .await?
                    .rows_affected
            }
            BalanceTarget::Card { card_id } => {
                credit_cards::Entity::update_many()
                    .col_expr(
                        credit_cards::Column::CurrentValue,
                        Expr::col(credit_cards::Column::CurrentValue).add(delta),
                    )
                    .filter(credit_cards::Column::Id.eq(card_id))
                    .filter(credit_cards::Column::OwnerId.eq(user_id))
                    .exec(db)
                    .await?
                    .rows_affected
            }
        };
        if rows_affected == 0 {
            let label = match effect.target {
                BalanceTarget::Account { .. } => "account",
                BalanceTarget::Card { .. } => "credit card",
            };
            return Err(LedgerError::ReferenceNotFound(label.to_string()));
        }
        Ok(())
    }

    /// Applies every effect in order. Nothing else may write `current_value`.
    pub(super) async fn apply_effects(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        effects: &[Effect],
    ) -> ResultLedger<()> {
        for effect in effects {
            self.apply_effect(db, user_id, *effect).await?;
        }
        Ok(())
    }
}
