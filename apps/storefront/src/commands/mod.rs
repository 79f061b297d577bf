//! # Storefront Operations
//!
//! Every operation a presentation layer can invoke, as `impl Storefront`
//! blocks grouped by area.
//!
//! ## Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here
//! ├── auth.rs      ◄─── login, signup, logout
//! ├── basket.rs    ◄─── basket manipulation and delivery quote
//! ├── orders.rs    ◄─── place, modify, fulfillment, admin status
//! ├── catalog.rs   ◄─── shop CRUD
//! ├── config.rs    ◄─── delivery policy, edit window, logo
//! ├── users.rs     ◄─── user administration
//! └── wishlist.rs  ◄─── per-user wishlist
//! ```
//!
//! ## Return Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Err(ApiError)          bad input or a broken rule; nothing written     │
//! │  Ok(WriteStatus::Saved)     store accepted the write                    │
//! │  Ok(WriteStatus::NotSaved)  store failed; see sync_issues()             │
//! │  Ok(WriteStatus::Skipped)   unknown id or no change                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod basket;
pub mod catalog;
pub mod config;
pub mod orders;
pub mod users;
pub mod wishlist;

pub use auth::credentials_match;
pub use basket::BasketResponse;
pub use orders::PlacedOrder;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use grocer_core::{Address, Item, Sector, UnitCategory, User, UserRole};
    use grocer_store::MemoryTableStore;
    use grocer_sync::StorefrontSettings;

    use crate::state::ManualClock;
    use crate::Storefront;

    pub const T0: i64 = 1_700_000_000_000;

    pub struct Harness {
        pub store: Arc<MemoryTableStore>,
        pub clock: Arc<ManualClock>,
        pub storefront: Storefront,
    }

    pub async fn harness() -> Harness {
        let store = Arc::new(MemoryTableStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let storefront =
            Storefront::with_clock(store.clone(), &StorefrontSettings::default(), clock.clone());
        assert!(storefront.ready(Duration::from_secs(2)).await);

        Harness {
            store,
            clock,
            storefront,
        }
    }

    pub fn new_user(name: &str, mobile: &str) -> User {
        User {
            id: String::new(),
            full_name: name.to_string(),
            mobile_number: mobile.to_string(),
            whatsapp_number: None,
            address: Address {
                sector: Sector::Sector1,
                house_number: "12".to_string(),
                street_number: "5".to_string(),
                block: None,
                lane: None,
            },
            role: UserRole::Customer,
            password: Some("secret".to_string()),
        }
    }

    pub fn item(id: &str, price: i64, unit: &str) -> Item {
        Item {
            id: id.to_string(),
            shop_id: "1".to_string(),
            name: format!("Item {}", id),
            price,
            unit: unit.to_string(),
            unit_category: UnitCategory::Count,
            image: String::new(),
        }
    }

    /// Harness with a signed-in customer (after a throwaway admin).
    pub async fn signed_in_customer() -> Harness {
        let h = harness().await;
        h.storefront
            .signup(new_user("Admin", "03000000000"))
            .await
            .unwrap();
        h.storefront.logout();
        h.storefront
            .signup(new_user("Ayesha Khan", "03001234567"))
            .await
            .unwrap();
        h
    }
}
