//! Account operations.
//!
//! Balances are never written here: an account's `current_value` moves only
//! through the transaction lifecycle. Deletion is guarded by the existing
//! transaction history.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{Account, BalanceTarget, LedgerError, ResultLedger, accounts};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    /// Return an account snapshot.
    pub async fn account(&self, user_id: &str, account_id: Uuid) -> ResultLedger<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_account_owned(&db_tx, user_id, account_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("account".to_string()))?;
            Ok(Account::from(model))
        })
    }

    /// Lists the user's accounts, sorted by name.
    pub async fn list_accounts(&self, user_id: &str) -> ResultLedger<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::OwnerId.eq(user_id))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Account::from).collect())
        })
    }

    /// Add a new account. Accounts open at zero; the balance only moves
    /// through transactions.
    pub async fn new_account(&self, user_id: &str, name: &str) -> ResultLedger<Uuid> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.ensure_account_name_free(&db_tx, user_id, &name, None)
                .await?;

            let account = Account::new(user_id.to_string(), name);
            let account_id = account.id;
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account_id)
        })
    }

    /// Renames an existing account.
    pub async fn rename_account(
        &self,
        user_id: &str,
        account_id: Uuid,
        new_name: &str,
    ) -> ResultLedger<()> {
        let new_name = normalize_required_name(new_name, "account")?;
        with_tx!(self, |db_tx| {
            self.find_account_owned(&db_tx, user_id, account_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("account".to_string()))?;
            self.ensure_account_name_free(&db_tx, user_id, &new_name, Some(account_id))
                .await?;

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes an account if no transaction references it.
    ///
    /// Returns `Ok(false)` when the account does not exist for this owner.
    pub async fn delete_account(&self, user_id: &str, account_id: Uuid) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            match self.find_account_owned(&db_tx, user_id, account_id).await? {
                None => Ok(false),
                Some(model) => {
                    let in_use = self
                        .target_in_use(&db_tx, user_id, BalanceTarget::account(account_id))
                        .await?;
                    if in_use {
                        return Err(LedgerError::EntityInUse(model.name));
                    }

                    accounts::Entity::delete_by_id(account_id)
                        .exec(&db_tx)
                        .await?;
                    Ok(true)
                }
            }
        })
    }

    async fn ensure_account_name_free(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(user_id))
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude {
            query = query.filter(accounts::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(LedgerError::ExistingName(name.to_string()));
        }
        Ok(())
    }
}
