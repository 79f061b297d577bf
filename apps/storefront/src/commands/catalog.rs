//! Shop and item administration. Items live inside their shop record, so
//! every item edit is a shop save.

use tracing::{debug, info};

use grocer_core::validation::validate_shop;
use grocer_core::Shop;

use crate::error::ApiResult;
use crate::storefront::{Storefront, WriteStatus};

impl Storefront {
    /// Stores a shop under its id. Saving the same shop again overwrites
    /// it with identical content.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` for a shop or item that fails validation
    pub async fn add_shop(&self, shop: Shop) -> ApiResult<WriteStatus> {
        validate_shop(&shop)?;

        info!(shop_id = %shop.id, name = %shop.name, items = shop.items.len(), "Adding shop");
        Ok(self.persist(&self.shops, &shop.id, &shop).await)
    }

    /// Saves a shop over the stored one. Editing a starter shop stores it.
    pub async fn update_shop(&self, shop: Shop) -> ApiResult<WriteStatus> {
        validate_shop(&shop)?;

        debug!(shop_id = %shop.id, items = shop.items.len(), "Updating shop");
        Ok(self.persist(&self.shops, &shop.id, &shop).await)
    }

    pub async fn delete_shop(&self, shop_id: &str) -> WriteStatus {
        if self.shops.find(|s| s.id == shop_id).is_none() {
            debug!(shop_id, "delete_shop: unknown shop");
            return WriteStatus::Skipped;
        }

        info!(shop_id, "Deleting shop");
        self.erase(&self.shops, shop_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::harness;
    use crate::error::ErrorCode;
    use grocer_core::catalog::starter_shops;
    use grocer_core::UnitCategory;

    fn bakery() -> Shop {
        let mut shop = Shop::new("Bakery", "Bakery");
        let item = shop.new_item();
        item.name = "Bread".to_string();
        item.price = 120;
        item.set_unit_category(UnitCategory::Count);
        shop
    }

    #[tokio::test]
    async fn test_starter_catalog_until_first_shop() {
        let h = harness().await;
        let sf = &h.storefront;
        assert_eq!(sf.shops(), starter_shops());

        let shop = bakery();
        assert_eq!(sf.add_shop(shop.clone()).await.unwrap(), WriteStatus::Saved);
        assert_eq!(sf.shops(), vec![shop]);
    }

    #[tokio::test]
    async fn test_placeholder_item_blocks_save() {
        let h = harness().await;
        let mut shop = Shop::new("Bakery", "Bakery");
        shop.new_item();

        let err = h.storefront.add_shop(shop).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(h.storefront.shops(), starter_shops());
    }

    #[tokio::test]
    async fn test_add_same_shop_twice_is_idempotent() {
        let h = harness().await;
        let sf = &h.storefront;
        let shop = bakery();

        assert_eq!(sf.add_shop(shop.clone()).await.unwrap(), WriteStatus::Saved);
        assert_eq!(sf.add_shop(shop.clone()).await.unwrap(), WriteStatus::Saved);
        assert_eq!(sf.shops(), vec![shop]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let h = harness().await;
        let sf = &h.storefront;
        let mut shop = bakery();
        sf.add_shop(shop.clone()).await.unwrap();

        let item_id = shop.items[0].id.clone();
        let mut item = shop.items[0].clone();
        item.price = 150;
        shop.upsert_item(item);
        sf.update_shop(shop.clone()).await.unwrap();
        assert_eq!(sf.shops()[0].find_item(&item_id).map(|i| i.price), Some(150));

        assert_eq!(sf.delete_shop(&shop.id).await, WriteStatus::Saved);
        assert_eq!(sf.delete_shop(&shop.id).await, WriteStatus::Skipped);
        assert_eq!(sf.shops(), starter_shops());
    }
}
