//! # Validation Module
//!
//! Form validation for signup, catalog editing and delivery policy.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                 │
//! │  └── Required markers, pickers for sector/block/lane                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront facade                                            │
//! │  └── THIS MODULE: rejected input never reaches the store               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Table store                                                  │
//! │  └── Accepts any JSON record; no constraints                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grocer_core::validation::{validate_mobile_number, validate_price};
//!
//! assert!(validate_mobile_number("03001234567").is_ok());
//! assert!(validate_price(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Address, Item, SectorTiming, Shop, User, BLOCKS, MAX_LANE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest edit window an admin may configure, in seconds.
pub const MAX_EDIT_WINDOW_SECONDS: i64 = 3600;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Users
// =============================================================================

/// Validates a mobile number used as a login id.
///
/// Any non-blank text is accepted (`0300-1234567`, `+92 300 1234567`). The
/// facade trims it before storing and comparing.
pub fn validate_mobile_number(mobile: &str) -> ValidationResult<()> {
    required("mobileNumber", mobile)
}

/// Validates a delivery address.
///
/// Sector 4 addresses need a block (`A`-`K`) and a lane (`1`-`21`); other
/// sectors ignore both.
pub fn validate_address(address: &Address) -> ValidationResult<()> {
    required("sector", address.sector.as_str())?;
    required("houseNumber", &address.house_number)?;
    required("streetNumber", &address.street_number)?;

    if !address.sector.uses_block_and_lane() {
        return Ok(());
    }

    let block = address.block.as_deref().unwrap_or("");
    if !BLOCKS.iter().any(|b| *b == block) {
        return Err(ValidationError::NotAllowed {
            field: "block".to_string(),
            allowed: BLOCKS.iter().map(|b| b.to_string()).collect(),
        });
    }

    let lane_ok = address
        .lane
        .as_deref()
        .and_then(|lane| lane.trim().parse::<u32>().ok())
        .map(|lane| (1..=MAX_LANE).contains(&lane))
        .unwrap_or(false);
    if !lane_ok {
        return Err(ValidationError::OutOfRange {
            field: "lane".to_string(),
            min: 1,
            max: i64::from(MAX_LANE),
        });
    }

    Ok(())
}

/// Validates a signup form. Uniqueness of the mobile number is checked by
/// the caller against the users it knows about. Password and WhatsApp number
/// are optional.
pub fn validate_new_user(user: &User) -> ValidationResult<()> {
    required("fullName", &user.full_name)?;
    validate_mobile_number(&user.mobile_number)?;
    validate_address(&user.address)
}

// =============================================================================
// Catalog
// =============================================================================

/// Prices are positive integers in the smallest currency unit.
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

pub fn validate_item(item: &Item) -> ValidationResult<()> {
    required("name", &item.name)?;
    validate_price(item.price)?;
    if !item.unit_category.accepts(&item.unit) {
        return Err(ValidationError::NotAllowed {
            field: "unit".to_string(),
            allowed: item
                .unit_category
                .unit_options()
                .iter()
                .map(|u| u.to_string())
                .collect(),
        });
    }
    Ok(())
}

/// Validates a shop and every item in it.
pub fn validate_shop(shop: &Shop) -> ValidationResult<()> {
    required("id", &shop.id)?;
    required("name", &shop.name)?;
    required("type", &shop.shop_type)?;

    for item in &shop.items {
        validate_item(item)?;
        if item.shop_id != shop.id {
            return Err(ValidationError::InvalidFormat {
                field: "shopId".to_string(),
                reason: format!("item {} belongs to shop {}", item.id, item.shop_id),
            });
        }
    }

    let mut ids: Vec<&str> = shop.items.iter().map(|i| i.id.as_str()).collect();
    ids.sort_unstable();
    if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ValidationError::Duplicate {
            field: "item id".to_string(),
            value: pair[0].to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Delivery Policy
// =============================================================================

/// Validates one zone group's timing.
pub fn validate_timing(timing: &SectorTiming) -> ValidationResult<()> {
    for (field, value) in [
        ("baseCharge", timing.base_charge),
        ("baseMin", timing.base_min),
        ("threshold", timing.threshold),
        ("additionalPerItem", timing.additional_per_item),
    ] {
        if value < 0 {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    if timing.base_max < timing.base_min {
        return Err(ValidationError::OutOfRange {
            field: "baseMax".to_string(),
            min: timing.base_min,
            max: i64::MAX,
        });
    }

    Ok(())
}

pub fn validate_street_charge(charge: i64) -> ValidationResult<()> {
    if charge < 0 {
        return Err(ValidationError::OutOfRange {
            field: "streetCharge".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

pub fn validate_edit_window(seconds: i64) -> ValidationResult<()> {
    if !(0..=MAX_EDIT_WINDOW_SECONDS).contains(&seconds) {
        return Err(ValidationError::OutOfRange {
            field: "editWindowSeconds".to_string(),
            min: 0,
            max: MAX_EDIT_WINDOW_SECONDS,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::starter_shops;
    use crate::types::{Sector, UserRole};

    fn address(sector: Sector) -> Address {
        Address {
            sector,
            house_number: "7".to_string(),
            street_number: "3".to_string(),
            block: None,
            lane: None,
        }
    }

    fn user() -> User {
        User {
            id: String::new(),
            full_name: "Bilal Ahmed".to_string(),
            mobile_number: "03111234567".to_string(),
            whatsapp_number: None,
            address: address(Sector::Sector2),
            role: UserRole::Customer,
            password: Some("pw".to_string()),
        }
    }

    #[test]
    fn test_validate_mobile_number() {
        assert!(validate_mobile_number("03001234567").is_ok());
        assert!(validate_mobile_number("+923001234567").is_ok());
        assert!(validate_mobile_number("0300-1234567").is_ok());
        assert!(validate_mobile_number("0300 123 4567").is_ok());
        assert!(validate_mobile_number("").is_err());
        assert!(validate_mobile_number("   ").is_err());
    }

    #[test]
    fn test_sector_four_needs_block_and_lane() {
        let mut addr = address(Sector::Sector4);
        assert!(matches!(
            validate_address(&addr),
            Err(ValidationError::NotAllowed { .. })
        ));

        addr.block = Some("C".to_string());
        addr.lane = Some("22".to_string());
        assert!(matches!(
            validate_address(&addr),
            Err(ValidationError::OutOfRange { .. })
        ));

        addr.lane = Some("21".to_string());
        assert!(validate_address(&addr).is_ok());
    }

    #[test]
    fn test_other_sectors_ignore_block_and_lane() {
        assert!(validate_address(&address(Sector::VipProper)).is_ok());
    }

    #[test]
    fn test_validate_new_user_required_fields() {
        assert!(validate_new_user(&user()).is_ok());

        let mut missing_name = user();
        missing_name.full_name = "  ".to_string();
        assert!(matches!(
            validate_new_user(&missing_name),
            Err(ValidationError::Required { field }) if field == "fullName"
        ));

        let mut no_password = user();
        no_password.password = None;
        no_password.whatsapp_number = Some("whatsapp me".to_string());
        assert!(validate_new_user(&no_password).is_ok());

        let mut missing_house = user();
        missing_house.address.house_number.clear();
        assert!(validate_new_user(&missing_house).is_err());
    }

    #[test]
    fn test_validate_shop() {
        for shop in starter_shops() {
            assert!(validate_shop(&shop).is_ok());
        }

        let mut shop = starter_shops().remove(0);
        shop.new_item();
        assert!(matches!(
            validate_shop(&shop),
            Err(ValidationError::MustBePositive { .. })
        ));

        let mut dup = starter_shops().remove(0);
        let copy = dup.items[0].clone();
        dup.items.push(copy);
        assert!(matches!(
            validate_shop(&dup),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_validate_timing() {
        let mut timing = crate::pricing::ZoneGroup::Sector3.default_timing();
        assert!(validate_timing(&timing).is_ok());

        timing.base_max = timing.base_min - 1;
        assert!(validate_timing(&timing).is_err());

        let mut negative = crate::pricing::ZoneGroup::Vip.default_timing();
        negative.additional_per_item = -1;
        assert!(validate_timing(&negative).is_err());
    }

    #[test]
    fn test_validate_edit_window_and_street_charge() {
        assert!(validate_edit_window(45).is_ok());
        assert!(validate_edit_window(-1).is_err());
        assert!(validate_edit_window(MAX_EDIT_WINDOW_SECONDS + 1).is_err());
        assert!(validate_street_charge(0).is_ok());
        assert!(validate_street_charge(-5).is_err());
    }
}
