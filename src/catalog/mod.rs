//! Category Catalog: the global category list and each owner's
//! subscriptions to it.
//!
//! Both categories and subscriptions are soft-deleted through `deleted_at`,
//! and every read here filters on it explicitly.

use chrono::Utc;
use rusqlite::Connection;

use crate::db::{self, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Subscription, DEFAULT_SUBSCRIPTIONS};

impl Database {
    /// Categories the owner is subscribed to, by label. Unsubscribed and
    /// retired categories are left out.
    pub fn active_categories_for_owner(&self, owner_id: &str) -> Result<Vec<Category>> {
        db::list_owner_categories(self.conn(), owner_id)
    }

    /// The whole live catalog, by label.
    pub fn categories(&self) -> Result<Vec<Category>> {
        db::list_live_categories(self.conn())
    }

    pub fn category_by_key(&self, key: &str) -> Result<Category> {
        live_category_by_key(self.conn(), key)
    }

    /// Subscribe an owner to a category. Calling it again is harmless: an
    /// active subscription is returned unchanged and an unsubscribed one is
    /// brought back rather than duplicated.
    pub fn subscribe(&mut self, owner_id: &str, category_id: i64) -> Result<Subscription> {
        let tx = self.begin()?;
        let subscription = subscribe_in(&tx, owner_id, category_id)?;
        tx.commit()?;
        Ok(subscription)
    }

    /// Soft-delete the owner's subscription. Does nothing if there is none.
    pub fn unsubscribe(&mut self, owner_id: &str, category_id: i64) -> Result<()> {
        let tx = self.begin()?;
        match db::find_subscription(&tx, owner_id, category_id)? {
            Some(subscription) if subscription.is_active() => {
                db::set_subscription_deleted_at(&tx, subscription.id, Some(Utc::now()))?;
                tx.commit()?;
                tracing::info!(owner_id, category_id, "unsubscribed from category");
            }
            _ => tracing::debug!(owner_id, category_id, "no active subscription to remove"),
        }
        Ok(())
    }

    /// Subscribe a new owner to the default categories. Keys missing from
    /// the catalog (or retired) are skipped rather than failing the batch.
    pub fn seed_default_subscriptions(&mut self, owner_id: &str) -> Result<Vec<Subscription>> {
        let tx = self.begin()?;
        let mut subscriptions = Vec::with_capacity(DEFAULT_SUBSCRIPTIONS.len());
        for key in DEFAULT_SUBSCRIPTIONS {
            match db::find_category_by_key(&tx, key)?.filter(|c| !c.is_deleted()) {
                Some(category) => subscriptions.push(subscribe_in(&tx, owner_id, category.id)?),
                None => tracing::debug!(key, "default category not in catalog, skipping"),
            }
        }
        tx.commit()?;
        tracing::info!(
            owner_id,
            subscribed = subscriptions.len(),
            "seeded default categories"
        );
        Ok(subscriptions)
    }

    /// Retire a category from the global catalog. Existing transactions keep
    /// pointing at it; it just stops being offered or accepted for new ones.
    pub fn retire_category(&mut self, key: &str) -> Result<Category> {
        let tx = self.begin()?;
        let category = live_category_by_key(&tx, key)?;
        db::mark_category_deleted(&tx, category.id, Utc::now())?;
        let retired = db::find_category(&tx, category.id)?
            .ok_or_else(|| Error::not_found("category", category.id))?;
        tx.commit()?;
        tracing::info!(key = %retired.key, "retired category");
        Ok(retired)
    }
}

/// Look up a category by key, treating retired ones as missing.
pub(crate) fn live_category_by_key(conn: &Connection, key: &str) -> Result<Category> {
    db::find_category_by_key(conn, key)?
        .filter(|c| !c.is_deleted())
        .ok_or_else(|| Error::not_found("category", key.trim()))
}

fn subscribe_in(conn: &Connection, owner_id: &str, category_id: i64) -> Result<Subscription> {
    db::find_category(conn, category_id)?
        .filter(|c| !c.is_deleted())
        .ok_or_else(|| Error::not_found("category", category_id))?;

    let id = match db::find_subscription(conn, owner_id, category_id)? {
        Some(existing) if existing.is_active() => return Ok(existing),
        Some(deleted) => {
            db::set_subscription_deleted_at(conn, deleted.id, None)?;
            tracing::info!(owner_id, category_id, "resubscribed to category");
            deleted.id
        }
        None => {
            let id = db::insert_subscription(conn, owner_id, category_id, Utc::now())?;
            tracing::info!(owner_id, category_id, "subscribed to category");
            id
        }
    };
    db::find_subscription(conn, owner_id, category_id)?
        .filter(|s| s.id == id)
        .ok_or_else(|| Error::not_found("subscription", id))
}
