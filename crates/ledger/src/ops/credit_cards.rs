//! Credit card operations.
//!
//! Cards follow the same rules as accounts: `current_value` moves only
//! through the transaction lifecycle, and deletion is guarded by the
//! transaction history. Limit, statement days and the paid flag are plain
//! editable fields.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Amount, BalanceTarget, CreditCard, CreditCardPatch, LedgerError, ResultLedger, credit_cards,
    credit_cards::validate_day,
};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    /// Return a credit card snapshot.
    pub async fn credit_card(&self, user_id: &str, card_id: Uuid) -> ResultLedger<CreditCard> {
        with_tx!(self, |db_tx| {
            let model = self
                .find_card_owned(&db_tx, user_id, card_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("credit card".to_string()))?;
            Ok(CreditCard::try_from(model)?)
        })
    }

    /// Lists the user's credit cards, sorted by name.
    pub async fn list_credit_cards(&self, user_id: &str) -> ResultLedger<Vec<CreditCard>> {
        with_tx!(self, |db_tx| {
            let models = credit_cards::Entity::find()
                .filter(credit_cards::Column::OwnerId.eq(user_id))
                .order_by_asc(credit_cards::Column::Name)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(CreditCard::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Add a new credit card. Cards open at zero; spending drives the value
    /// negative through transactions.
    pub async fn new_credit_card(
        &self,
        user_id: &str,
        name: &str,
        limit_value: Amount,
        due_day: u8,
        closing_day: u8,
    ) -> ResultLedger<Uuid> {
        let name = normalize_required_name(name, "credit card")?;
        let card = CreditCard::new(user_id.to_string(), name, limit_value, due_day, closing_day)?;
        with_tx!(self, |db_tx| {
            self.ensure_card_name_free(&db_tx, user_id, &card.name, None)
                .await?;

            let card_id = card.id;
            credit_cards::ActiveModel::from(&card).insert(&db_tx).await?;
            Ok(card_id)
        })
    }

    /// Applies a partial update to a card's editable fields. Unset patch
    /// fields keep their stored values; `current_value` is not editable.
    pub async fn update_credit_card(
        &self,
        user_id: &str,
        card_id: Uuid,
        patch: CreditCardPatch,
    ) -> ResultLedger<CreditCard> {
        let name = match patch.name.as_deref() {
            Some(name) => Some(normalize_required_name(name, "credit card")?),
            None => None,
        };
        if let Some(limit_value) = patch.limit_value
            && limit_value.is_negative()
        {
            return Err(LedgerError::InvalidAmount(
                "limit_value must be >= 0".to_string(),
            ));
        }
        if let Some(due_day) = patch.due_day {
            validate_day(due_day, "due_day")?;
        }
        if let Some(closing_day) = patch.closing_day {
            validate_day(closing_day, "closing_day")?;
        }

        with_tx!(self, |db_tx| {
            self.find_card_owned(&db_tx, user_id, card_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("credit card".to_string()))?;

            let mut active = credit_cards::ActiveModel {
                id: ActiveValue::Set(card_id),
                ..Default::default()
            };
            if let Some(name) = name {
                self.ensure_card_name_free(&db_tx, user_id, &name, Some(card_id))
                    .await?;
                active.name = ActiveValue::Set(name);
            }
            if let Some(limit_value) = patch.limit_value {
                active.limit_value = ActiveValue::Set(limit_value.cents());
            }
            if let Some(due_day) = patch.due_day {
                active.due_day = ActiveValue::Set(i32::from(due_day));
            }
            if let Some(closing_day) = patch.closing_day {
                active.closing_day = ActiveValue::Set(i32::from(closing_day));
            }
            if let Some(paid) = patch.paid {
                active.paid = ActiveValue::Set(paid);
            }
            active.update(&db_tx).await?;

            let model = self
                .find_card_owned(&db_tx, user_id, card_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("credit card".to_string()))?;
            Ok(CreditCard::try_from(model)?)
        })
    }

    /// Deletes a credit card if no transaction references it.
    ///
    /// Returns `Ok(false)` when the card does not exist for this owner.
    pub async fn delete_credit_card(&self, user_id: &str, card_id: Uuid) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            match self.find_card_owned(&db_tx, user_id, card_id).await? {
                None => Ok(false),
                Some(model) => {
                    let in_use = self
                        .target_in_use(&db_tx, user_id, BalanceTarget::card(card_id))
                        .await?;
                    if in_use {
                        return Err(LedgerError::EntityInUse(model.name));
                    }

                    credit_cards::Entity::delete_by_id(card_id)
                        .exec(&db_tx)
                        .await?;
                    Ok(true)
                }
            }
        })
    }

    async fn ensure_card_name_free(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = credit_cards::Entity::find()
            .filter(credit_cards::Column::OwnerId.eq(user_id))
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude {
            query = query.filter(credit_cards::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(LedgerError::ExistingName(name.to_string()));
        }
        Ok(())
    }
}
