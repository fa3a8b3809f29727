//! Category operations.
//!
//! A category's kind is fixed at creation: expense/income transactions
//! referencing it rely on the match between their kind and the category's.
//! Deletion is guarded by the transaction history.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{Category, CategoryKind, CategoryPatch, LedgerError, ResultLedger, categories};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    /// Lists the user's categories, sorted by name, optionally restricted by
    /// kind. With `only_visible` set, hidden categories are skipped.
    pub async fn list_categories(
        &self,
        user_id: &str,
        kind: Option<CategoryKind>,
        only_visible: bool,
    ) -> ResultLedger<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(user_id))
                .order_by_asc(categories::Column::Name);
            if let Some(kind) = kind {
                query = query.filter(categories::Column::Kind.eq(kind.as_str()));
            }
            if only_visible {
                query = query.filter(categories::Column::Visible.eq(true));
            }

            let models = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Category::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Add a new category of the given kind.
    pub async fn new_category(
        &self,
        user_id: &str,
        name: &str,
        kind: CategoryKind,
        visible: bool,
    ) -> ResultLedger<Uuid> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.ensure_category_name_free(&db_tx, user_id, &name, None)
                .await?;

            let category = Category::new(user_id.to_string(), name, kind, visible);
            let category_id = category.id;
            categories::ActiveModel::from(&category).insert(&db_tx).await?;
            Ok(category_id)
        })
    }

    /// Applies a partial update to a category's name and/or visibility.
    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        patch: CategoryPatch,
    ) -> ResultLedger<Category> {
        let name = match patch.name.as_deref() {
            Some(name) => Some(normalize_required_name(name, "category")?),
            None => None,
        };
        with_tx!(self, |db_tx| {
            self.find_category_owned(&db_tx, user_id, category_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("category".to_string()))?;

            let mut active = categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                ..Default::default()
            };
            if let Some(name) = name {
                self.ensure_category_name_free(&db_tx, user_id, &name, Some(category_id))
                    .await?;
                active.name = ActiveValue::Set(name);
            }
            if let Some(visible) = patch.visible {
                active.visible = ActiveValue::Set(visible);
            }
            active.update(&db_tx).await?;

            let model = self
                .find_category_owned(&db_tx, user_id, category_id)
                .await?
                .ok_or_else(|| LedgerError::NotFound("category".to_string()))?;
            Ok(Category::try_from(model)?)
        })
    }

    /// Deletes a category if no transaction references it.
    ///
    /// Returns `Ok(false)` when the category does not exist for this owner.
    pub async fn delete_category(&self, user_id: &str, category_id: Uuid) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            match self
                .find_category_owned(&db_tx, user_id, category_id)
                .await?
            {
                None => Ok(false),
                Some(model) => {
                    if self.category_in_use(&db_tx, user_id, category_id).await? {
                        return Err(LedgerError::EntityInUse(model.name));
                    }

                    categories::Entity::delete_by_id(category_id)
                        .exec(&db_tx)
                        .await?;
                    Ok(true)
                }
            }
        })
    }

    async fn ensure_category_name_free(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        exclude: Option<Uuid>,
    ) -> ResultLedger<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(user_id))
            .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(id) = exclude {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(LedgerError::ExistingName(name.to_string()));
        }
        Ok(())
    }
}
