use sea_orm::{ActiveModelTrait, TransactionTrait};
use tracing::debug;

use crate::{
    Effect, LedgerError, ResultLedger, Transaction, TransactionDetail, UpdateTransactionCmd,
    effects_of, transactions,
};

use super::super::super::{Ledger, normalize_optional_text, with_tx};

impl Ledger {
    /// Updates a transaction by reversing the stored image's effects and
    /// applying the merged image's effects, in one atomic unit.
    ///
    /// Unset command fields keep their stored values. The merged result is
    /// re-validated as a whole, so a kind change must also patch the
    /// references the new kind requires and clear the ones it forbids.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultLedger<Transaction> {
        let user_id = cmd.user_id.as_str();
        with_tx!(self, |db_tx| {
            let old = self
                .load_transaction_owned(&db_tx, user_id, cmd.transaction_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("transaction".to_string()))?;

            let kind = cmd.kind.unwrap_or(old.kind());
            let target = cmd.target.or(Some(old.detail.target()));
            let category_id = cmd.category_id.apply(old.detail.category_id());
            let transfer_target = cmd.transfer_target.apply(old.detail.transfer_target());
            let detail = TransactionDetail::from_refs(kind, target, category_id, transfer_target)?;

            let amount = cmd.amount.unwrap_or(old.amount);
            if !amount.is_positive() {
                return Err(LedgerError::InvalidAmount("amount must be > 0".to_string()));
            }

            let note = normalize_optional_text(cmd.note.apply(old.note.clone()).as_deref());
            let new = Transaction {
                id: old.id,
                owner_id: old.owner_id.clone(),
                occurred_at: cmd.occurred_at.unwrap_or(old.occurred_at),
                amount,
                settled: cmd.settled.unwrap_or(old.settled),
                note,
                detail,
            };

            self.validate_detail(&db_tx, user_id, &detail).await?;

            // Reverse the stored image, then apply the merged one. The two
            // touch different targets when a reference itself changed.
            let reversal: Vec<Effect> =
                effects_of(&old).into_iter().map(Effect::negated).collect();
            self.apply_effects(&db_tx, user_id, &reversal).await?;
            self.apply_effects(&db_tx, user_id, &effects_of(&new))
                .await?;

            transactions::ActiveModel::from(&new).update(&db_tx).await?;

            debug!(transaction_id = %new.id, "transaction updated");
            Ok(new)
        })
    }
}
