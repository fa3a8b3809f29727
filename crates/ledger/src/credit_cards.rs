//! Credit card entity.
//!
//! Structurally parallel to an account: a card has a cached `current_value`
//! that participates in the same balance-effect model when a transaction
//! references it. Spending drives the value negative; the debt is the
//! negated negative part.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, LedgerError, ResultLedger};

/// A credit card owned by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    /// Cached net effect of every transaction referencing this card.
    pub current_value: Amount,
    pub limit_value: Amount,
    /// Day of month (1-31) the statement is due.
    pub due_day: u8,
    /// Day of month (1-31) the statement closes.
    pub closing_day: u8,
    pub paid: bool,
}

impl CreditCard {
    /// Creates a new card. Cards open at zero; the balance only moves through
    /// transactions.
    pub fn new(
        owner_id: String,
        name: String,
        limit_value: Amount,
        due_day: u8,
        closing_day: u8,
    ) -> ResultLedger<Self> {
        if limit_value.is_negative() {
            return Err(LedgerError::InvalidAmount(
                "limit_value must be >= 0".to_string(),
            ));
        }
        validate_day(due_day, "due_day")?;
        validate_day(closing_day, "closing_day")?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            current_value: Amount::ZERO,
            limit_value,
            due_day,
            closing_day,
            paid: false,
        })
    }

    /// The outstanding debt on this card: the negative part of the balance,
    /// negated. A card in credit owes nothing.
    #[must_use]
    pub fn debt(&self) -> Amount {
        if self.current_value.is_negative() {
            -self.current_value
        } else {
            Amount::ZERO
        }
    }
}

pub(crate) fn validate_day(day: u8, label: &str) -> ResultLedger<()> {
    if !(1..=31).contains(&day) {
        return Err(LedgerError::InvalidAmount(format!(
            "{label} must be between 1 and 31"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub current_value: i64,
    pub limit_value: i64,
    pub due_day: i32,
    pub closing_day: i32,
    pub paid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditCard> for ActiveModel {
    fn from(card: &CreditCard) -> Self {
        Self {
            id: ActiveValue::Set(card.id),
            owner_id: ActiveValue::Set(card.owner_id.clone()),
            name: ActiveValue::Set(card.name.clone()),
            current_value: ActiveValue::Set(card.current_value.cents()),
            limit_value: ActiveValue::Set(card.limit_value.cents()),
            due_day: ActiveValue::Set(i32::from(card.due_day)),
            closing_day: ActiveValue::Set(i32::from(card.closing_day)),
            paid: ActiveValue::Set(card.paid),
        }
    }
}

impl TryFrom<Model> for CreditCard {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let day = |value: i32, label: &str| {
            u8::try_from(value)
                .map_err(|_| LedgerError::InvalidAmount(format!("invalid {label}: {value}")))
        };
        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            current_value: Amount::new(model.current_value),
            limit_value: Amount::new(model.limit_value),
            due_day: day(model.due_day, "due_day")?,
            closing_day: day(model.closing_day, "closing_day")?,
            paid: model.paid,
        })
    }
}
