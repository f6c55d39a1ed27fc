use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// What kind of physical piece an item is. `Combination` marks a virtual
/// bundle composed from existing pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub enum ItemCategory {
    Flap,
    Body,
    Handle,
    Accessory,
    Combination,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Flap => "Flap",
            ItemCategory::Body => "Body",
            ItemCategory::Handle => "Handle",
            ItemCategory::Accessory => "Accessory",
            ItemCategory::Combination => "Combination",
        }
    }

    /// Shape is meaningless for handles and accessories; the data shape
    /// still allows it (legacy looseness, preserved on purpose).
    pub fn uses_shape(&self) -> bool {
        !matches!(self, ItemCategory::Handle | ItemCategory::Accessory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub enum ItemShape {
    Square,
    Round,
    Mini,
}

impl ItemShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemShape::Square => "Square",
            ItemShape::Round => "Round",
            ItemShape::Mini => "Mini",
        }
    }
}

/// One physical piece or composed bundle. The camelCase aliases accept
/// records exported by earlier versions of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub owner_id: Option<String>,
    pub name: String,
    #[serde(alias = "type")]
    pub category: ItemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub shape: Option<ItemShape>,
    #[serde(alias = "color")]
    pub colors: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, alias = "purchasePrice", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub purchase_price: Option<f64>,
    #[serde(default, alias = "usageCount")]
    #[ts(type = "number")]
    pub usage_count: i64,
    #[serde(default, alias = "isSold")]
    pub is_sold: bool,
    #[serde(default, alias = "sellingPrice", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub selling_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notes: Option<String>,
    #[serde(default, alias = "photo", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub photo_url: Option<String>,
    #[serde(default)]
    #[ts(type = "number")]
    pub created_at: i64,
    #[serde(default)]
    #[ts(type = "number")]
    pub updated_at: i64,
}

/// User-editable fields, as the UI submits them. Identity, owner and
/// timestamps are assigned by the service layer, never by the caller.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../ui/bindings/")]
pub struct ItemDraft {
    pub name: String,
    #[serde(alias = "type")]
    pub category: ItemCategory,
    #[serde(default)]
    #[ts(optional)]
    pub shape: Option<ItemShape>,
    #[serde(alias = "color")]
    pub colors: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, alias = "purchasePrice")]
    #[ts(optional)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    #[ts(optional)]
    pub notes: Option<String>,
    #[serde(default, alias = "photo")]
    #[ts(optional)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidItem {
    #[error("item name must not be empty")]
    EmptyName,
    #[error("price must be a non-negative number")]
    NegativePrice,
    #[error("purchase price must be a non-negative number")]
    NegativePurchasePrice,
    #[error("usage count must not be negative")]
    NegativeUsageCount,
    #[error("a sold item requires a positive selling price")]
    MissingSellingPrice,
    #[error("selling price is only valid on sold items")]
    UnexpectedSellingPrice,
}

impl Item {
    /// Enforce the model invariants: non-empty name, non-negative money
    /// fields, and a positive selling price present iff the item is sold.
    pub fn validate(&self) -> Result<(), InvalidItem> {
        if self.name.trim().is_empty() {
            return Err(InvalidItem::EmptyName);
        }
        if !(self.price >= 0.0) {
            return Err(InvalidItem::NegativePrice);
        }
        if let Some(p) = self.purchase_price {
            if !(p >= 0.0) {
                return Err(InvalidItem::NegativePurchasePrice);
            }
        }
        if self.usage_count < 0 {
            return Err(InvalidItem::NegativeUsageCount);
        }
        match (self.is_sold, self.selling_price) {
            (true, Some(p)) if p > 0.0 => {}
            (true, _) => return Err(InvalidItem::MissingSellingPrice),
            (false, Some(_)) => return Err(InvalidItem::UnexpectedSellingPrice),
            (false, None) => {}
        }
        Ok(())
    }
}

impl From<ItemDraft> for Item {
    fn from(draft: ItemDraft) -> Self {
        Item {
            id: String::new(),
            owner_id: None,
            name: draft.name,
            category: draft.category,
            shape: draft.shape,
            colors: draft.colors,
            price: draft.price,
            purchase_price: draft.purchase_price,
            usage_count: 0,
            is_sold: false,
            selling_price: None,
            notes: draft.notes,
            photo_url: draft.photo_url,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Starter data offered when the collection is empty.
pub fn sample_items() -> Vec<Item> {
    let piece = |name: &str, category: ItemCategory, shape: Option<ItemShape>, color: &str, price: f64| Item {
        id: String::new(),
        owner_id: None,
        name: name.to_string(),
        category,
        shape,
        colors: vec![color.to_string()],
        price,
        purchase_price: None,
        usage_count: 0,
        is_sold: false,
        selling_price: None,
        notes: None,
        photo_url: None,
        created_at: 0,
        updated_at: 0,
    };
    vec![
        piece("Rosa Klappe", ItemCategory::Flap, Some(ItemShape::Square), "Pink", 49.0),
        piece("Schwarzer Körper", ItemCategory::Body, Some(ItemShape::Square), "Black", 89.0),
        piece("Goldener Henkel", ItemCategory::Handle, None, "Gold", 29.0),
        piece("Blümchen Anhänger", ItemCategory::Accessory, None, "White", 12.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_legacy_camel_case_records() {
        let payload = json!({
            "id": "i1",
            "name": "Rosa Klappe",
            "type": "Flap",
            "shape": "Square",
            "color": ["Pink"],
            "price": 49.0,
            "purchasePrice": 39.0,
            "usageCount": 3,
            "isSold": false
        });
        let item: Item = serde_json::from_value(payload).unwrap();
        assert_eq!(item.category, ItemCategory::Flap);
        assert_eq!(item.colors, vec!["Pink".to_string()]);
        assert_eq!(item.purchase_price, Some(39.0));
        assert_eq!(item.usage_count, 3);
    }

    #[test]
    fn sold_item_requires_positive_selling_price() {
        let mut item = sample_items().remove(0);
        item.is_sold = true;
        assert_eq!(item.validate(), Err(InvalidItem::MissingSellingPrice));

        item.selling_price = Some(0.0);
        assert_eq!(item.validate(), Err(InvalidItem::MissingSellingPrice));

        item.selling_price = Some(25.0);
        assert_eq!(item.validate(), Ok(()));
    }

    #[test]
    fn selling_price_rejected_on_unsold_item() {
        let mut item = sample_items().remove(0);
        item.selling_price = Some(10.0);
        assert_eq!(item.validate(), Err(InvalidItem::UnexpectedSellingPrice));
    }

    #[test]
    fn nan_price_is_rejected() {
        let mut item = sample_items().remove(0);
        item.price = f64::NAN;
        assert_eq!(item.validate(), Err(InvalidItem::NegativePrice));
    }

    #[test]
    fn shape_semantics_follow_category() {
        assert!(ItemCategory::Flap.uses_shape());
        assert!(ItemCategory::Combination.uses_shape());
        assert!(!ItemCategory::Handle.uses_shape());
        assert!(!ItemCategory::Accessory.uses_shape());
    }
}
