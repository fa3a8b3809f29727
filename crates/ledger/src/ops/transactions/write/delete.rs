use sea_orm::{TransactionTrait, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{Effect, ResultLedger, effects_of, transactions};

use super::super::super::{Ledger, with_tx};

impl Ledger {
    /// Deletes a transaction and reverses its balance effects.
    ///
    /// Returns `Ok(false)` when no transaction matches `(id, owner)`; the
    /// delete is idempotent and touches nothing in that case.
    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            match self
                .load_transaction_owned(&db_tx, user_id, transaction_id)
                .await?
            {
                None => Ok(false),
                Some(stored) => {
                    let reversal: Vec<Effect> =
                        effects_of(&stored).into_iter().map(Effect::negated).collect();
                    self.apply_effects(&db_tx, user_id, &reversal).await?;

                    transactions::Entity::delete_by_id(stored.id)
                        .exec(&db_tx)
                        .await?;

                    debug!(transaction_id = %stored.id, "transaction deleted");
                    Ok(true)
                }
            }
        })
    }
}
