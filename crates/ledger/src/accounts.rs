//! Account entity.
//!
//! An account is a place money lives (checking account, cash, savings). Its
//! `current_value` is a cached aggregate: the source of truth is the
//! transaction history, and the lifecycle operations keep the two in step.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Amount;

/// An account owned by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, generated once and persisted so the account can be
    /// renamed without breaking references.
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    /// Cached net effect of every transaction referencing this account.
    pub current_value: Amount,
}

impl Account {
    /// Creates a new account. Accounts open at zero; the balance only moves
    /// through transactions.
    pub fn new(owner_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            current_value: Amount::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub current_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id),
            owner_id: ActiveValue::Set(account.owner_id.clone()),
            name: ActiveValue::Set(account.name.clone()),
            current_value: ActiveValue::Set(account.current_value.cents()),
        }
    }
}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            current_value: Amount::new(model.current_value),
        }
    }
}
