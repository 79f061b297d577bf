//! # Catalog Rules
//!
//! Unit category / unit coupling, shop editing helpers and the starter
//! catalog served before an admin has saved any shop.

use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{Item, Shop, UnitCategory};

/// Unit used by freshly created placeholder items.
pub const PLACEHOLDER_UNIT: &str = "per unit";

/// Image used by freshly created placeholder items.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

// =============================================================================
// Unit Coupling
// =============================================================================

impl UnitCategory {
    pub const ALL: [UnitCategory; 4] = [
        UnitCategory::Liquid,
        UnitCategory::Solid,
        UnitCategory::Count,
        UnitCategory::Other,
    ];

    /// Unit labels offered for this category. The first entry is what a
    /// category change resets the unit to.
    pub const fn unit_options(&self) -> &'static [&'static str] {
        match self {
            UnitCategory::Liquid => &["per liter", "per 500 ml", "per ml"],
            UnitCategory::Solid => &["per kg", "per 500 g", "per 250 g", "per g"],
            UnitCategory::Count => &["per piece", "per dozen", "per pack"],
            UnitCategory::Other => &[PLACEHOLDER_UNIT, "per plate"],
        }
    }

    /// Whether `unit` may be paired with this category. `Other` takes any
    /// non-empty label.
    pub fn accepts(&self, unit: &str) -> bool {
        match self {
            UnitCategory::Other => !unit.trim().is_empty(),
            category => category.unit_options().iter().any(|option| *option == unit),
        }
    }
}

impl Item {
    /// Switches category and resets the unit to the category's first option.
    pub fn set_unit_category(&mut self, category: UnitCategory) {
        self.unit_category = category;
        self.unit = category.unit_options()[0].to_string();
    }

    /// Sets the unit label, rejecting labels outside the current category.
    pub fn set_unit(&mut self, unit: &str) -> Result<(), ValidationError> {
        if !self.unit_category.accepts(unit) {
            return Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                allowed: self
                    .unit_category
                    .unit_options()
                    .iter()
                    .map(|u| u.to_string())
                    .collect(),
            });
        }
        self.unit = unit.to_string();
        Ok(())
    }
}

// =============================================================================
// Shop Editing
// =============================================================================

impl Shop {
    /// An empty shop with a fresh id.
    pub fn new(name: impl Into<String>, shop_type: impl Into<String>) -> Self {
        Shop {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            shop_type: shop_type.into(),
            image: String::new(),
            items: Vec::new(),
        }
    }

    /// Appends a placeholder item the admin fills in afterwards and returns
    /// it. Its price starts at 0, so the shop fails validation until the
    /// admin sets one.
    pub fn new_item(&mut self) -> &mut Item {
        self.items.push(Item {
            id: format!("it-{}", Uuid::new_v4()),
            shop_id: self.id.clone(),
            name: "New Item".to_string(),
            price: 0,
            unit: PLACEHOLDER_UNIT.to_string(),
            unit_category: UnitCategory::Other,
            image: PLACEHOLDER_IMAGE.to_string(),
        });
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Replaces the item with the same id, or appends it. `shop_id` is
    /// forced to this shop.
    pub fn upsert_item(&mut self, mut item: Item) {
        item.shop_id = self.id.clone();
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Removes an item by id; returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        self.items.len() != before
    }

    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

// =============================================================================
// Starter Catalog
// =============================================================================

fn starter_item(id: &str, shop_id: &str, name: &str, price: i64, unit: &str, seed: &str) -> Item {
    Item {
        id: id.to_string(),
        shop_id: shop_id.to_string(),
        name: name.to_string(),
        price,
        unit: unit.to_string(),
        unit_category: UnitCategory::Other,
        image: format!("https://picsum.photos/seed/{}/200/200", seed),
    }
}

fn starter_shop(id: &str, name: &str, shop_type: &str, seed: &str, items: Vec<Item>) -> Shop {
    Shop {
        id: id.to_string(),
        name: name.to_string(),
        shop_type: shop_type.to_string(),
        image: format!("https://picsum.photos/seed/{}/400/300", seed),
        items,
    }
}

/// The catalog shown while the shops table is empty, and what the seed
/// binary writes.
pub fn starter_shops() -> Vec<Shop> {
    vec![
        starter_shop(
            "1",
            "Grocery Shop",
            "Grocery",
            "grocery",
            vec![
                starter_item("g1", "1", "Eggs", 280, "per dozen", "eggs"),
                starter_item("g2", "1", "Cooking Oil", 550, "per liter", "oil"),
                starter_item("g3", "1", "Rice", 320, "per kg", "rice"),
            ],
        ),
        starter_shop(
            "2",
            "Meat Shop",
            "Meat",
            "meat",
            vec![
                starter_item("m1", "2", "Chicken", 650, "per kg", "chicken"),
                starter_item("m2", "2", "Mutton", 2100, "per kg", "mutton"),
                starter_item("m3", "2", "Beef", 1200, "per kg", "beef"),
            ],
        ),
        starter_shop(
            "3",
            "Refreshment Shop",
            "Refreshment",
            "refreshment",
            vec![
                starter_item("r1", "3", "Dahi Bhallay", 180, "per plate", "dahibhallay"),
                starter_item("r2", "3", "Chana Chaat", 150, "per plate", "chanachaat"),
                starter_item("r3", "3", "Samosa Chaat", 160, "per plate", "samosa"),
            ],
        ),
        starter_shop(
            "4",
            "Naan Shop",
            "Naan",
            "naan",
            vec![
                starter_item("n1", "4", "Roti", 25, "per piece", "roti"),
                starter_item("n2", "4", "Naan", 35, "per piece", "naan-item"),
            ],
        ),
    ]
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_change_resets_unit() {
        let mut item = starter_shops()[0].items[0].clone();

        item.set_unit_category(UnitCategory::Liquid);
        assert_eq!(item.unit, "per liter");

        item.set_unit_category(UnitCategory::Solid);
        assert_eq!(item.unit, "per kg");
    }

    #[test]
    fn test_every_category_accepts_its_first_option() {
        for category in UnitCategory::ALL {
            assert!(category.accepts(category.unit_options()[0]));
        }
    }

    #[test]
    fn test_set_unit_outside_category_is_rejected() {
        let mut item = starter_shops()[0].items[0].clone();
        item.set_unit_category(UnitCategory::Liquid);

        let err = item.set_unit("per kg").unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
        assert_eq!(item.unit, "per liter");

        item.set_unit("per ml").unwrap();
        assert_eq!(item.unit, "per ml");
    }

    #[test]
    fn test_other_category_accepts_free_form_units() {
        let mut item = starter_shops()[2].items[0].clone();
        assert_eq!(item.unit_category, UnitCategory::Other);
        item.set_unit("per bowl").unwrap();
        assert!(item.set_unit("  ").is_err());
    }

    #[test]
    fn test_new_item_and_upsert() {
        let mut shop = Shop::new("Fruit Shop", "Fruit");

        let id = {
            let item = shop.new_item();
            assert!(item.id.starts_with("it-"));
            assert_eq!(item.name, "New Item");
            item.id.clone()
        };

        let mut edited = shop.find_item(&id).unwrap().clone();
        edited.name = "Mango".to_string();
        edited.price = 300;
        edited.shop_id = "somewhere-else".to_string();
        shop.upsert_item(edited);

        assert_eq!(shop.items.len(), 1);
        assert_eq!(shop.items[0].name, "Mango");
        assert_eq!(shop.items[0].shop_id, shop.id);

        assert!(shop.remove_item(&id));
        assert!(!shop.remove_item(&id));
    }

    #[test]
    fn test_starter_shops() {
        let shops = starter_shops();
        assert_eq!(shops.len(), 4);
        assert_eq!(shops.iter().map(|s| s.items.len()).sum::<usize>(), 11);
        assert!(shops
            .iter()
            .all(|shop| shop.items.iter().all(|item| item.shop_id == shop.id && item.price > 0)));
    }
}
