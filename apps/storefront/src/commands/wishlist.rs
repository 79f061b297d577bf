//! # Wishlist Operations
//!
//! One wishlist row per user, keyed by user id. Items are deduplicated by
//! id.

use tracing::debug;

use grocer_core::Item;

use crate::error::ApiResult;
use crate::storefront::{Storefront, WriteStatus};

impl Storefront {
    /// Adds the item if it is not on the user's wishlist, removes it if it
    /// is.
    pub async fn toggle_wishlist(&self, user_id: &str, item: Item) -> WriteStatus {
        let mut wishlist = self.wishlist(user_id);
        let item_id = item.id.clone();
        let added = wishlist.toggle(item);

        debug!(user_id, item_id = %item_id, added, "toggle_wishlist");
        self.persist(&self.wishlists, user_id, &wishlist).await
    }

    pub async fn remove_from_wishlist(&self, user_id: &str, item_id: &str) -> WriteStatus {
        let mut wishlist = self.wishlist(user_id);
        if !wishlist.remove(item_id) {
            return WriteStatus::Skipped;
        }

        debug!(user_id, item_id, "remove_from_wishlist");
        self.persist(&self.wishlists, user_id, &wishlist).await
    }

    /// Puts one of a wishlisted item in the basket and takes it off the
    /// wishlist.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` if the basket line is already at its maximum
    pub async fn move_wishlist_to_basket(&self, user_id: &str, item_id: &str) -> ApiResult<WriteStatus> {
        let wishlist = self.wishlist(user_id);
        let Some(item) = wishlist.items.iter().find(|i| i.id == item_id) else {
            return Ok(WriteStatus::Skipped);
        };

        self.add_to_basket(item, 1)?;
        Ok(self.remove_from_wishlist(user_id, item_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{harness, item};

    #[tokio::test]
    async fn test_toggle_dedups_by_id() {
        let h = harness().await;
        let sf = &h.storefront;

        sf.toggle_wishlist("u1", item("a", 100, "per piece")).await;
        sf.toggle_wishlist("u1", item("b", 100, "per piece")).await;
        assert_eq!(sf.wishlist("u1").items.len(), 2);

        sf.toggle_wishlist("u1", item("a", 100, "per piece")).await;
        let ids: Vec<String> = sf.wishlist("u1").items.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["b"]);

        assert!(sf.wishlist("u2").items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_move_to_basket() {
        let h = harness().await;
        let sf = &h.storefront;
        sf.toggle_wishlist("u1", item("a", 100, "per piece")).await;
        sf.toggle_wishlist("u1", item("b", 60, "per piece")).await;

        assert_eq!(sf.remove_from_wishlist("u1", "zzz").await, WriteStatus::Skipped);
        assert_eq!(sf.remove_from_wishlist("u1", "a").await, WriteStatus::Saved);

        assert_eq!(sf.move_wishlist_to_basket("u1", "b").await.unwrap(), WriteStatus::Saved);
        assert!(sf.wishlist("u1").items.is_empty());
        assert_eq!(sf.basket().subtotal, 60);

        assert_eq!(
            sf.move_wishlist_to_basket("u1", "b").await.unwrap(),
            WriteStatus::Skipped
        );
    }
}
