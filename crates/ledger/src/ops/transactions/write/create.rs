use sea_orm::{ActiveModelTrait, TransactionTrait};
use tracing::debug;

use crate::{
    CreateTransactionCmd, ResultLedger, Transaction, TransactionDetail, effects_of, transactions,
};

use super::super::super::{Ledger, normalize_optional_text, with_tx};

impl Ledger {
    /// Creates a transaction and applies its balance effects.
    ///
    /// References are validated before any row is written; a failure at any
    /// step leaves the transaction table and every balance untouched.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCmd,
    ) -> ResultLedger<Transaction> {
        let detail = TransactionDetail::from_refs(
            cmd.kind,
            cmd.target,
            cmd.category_id,
            cmd.transfer_target,
        )?;
        let tx = Transaction::new(
            cmd.user_id.clone(),
            detail,
            cmd.amount,
            cmd.occurred_at,
            cmd.settled,
            normalize_optional_text(cmd.note.as_deref()),
        )?;

        with_tx!(self, |db_tx| {
            self.validate_detail(&db_tx, &cmd.user_id, &detail).await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.apply_effects(&db_tx, &cmd.user_id, &effects_of(&tx))
                .await?;

            debug!(transaction_id = %tx.id, kind = tx.kind().as_str(), "transaction created");
            Ok(tx)
        })
    }
}
