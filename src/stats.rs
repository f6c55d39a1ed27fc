use serde::Serialize;
use ts_rs::TS;

use crate::model::{Item, ItemCategory, ItemShape};

/// Figures for the statistics panel. Pure summary over the item list; sold
/// revenue is deducted from both current value and current cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/bindings/")]
pub struct CollectionStats {
    pub flaps_square: usize,
    pub flaps_round: usize,
    pub flaps_mini: usize,
    pub bodies_square: usize,
    pub bodies_round: usize,
    pub bodies_mini: usize,
    pub handles: usize,
    pub accessories: usize,
    pub combinations: usize,
    pub current_count: usize,
    pub total_purchased: usize,
    pub total_sold: usize,
    pub sales_revenue: f64,
    pub total_value: f64,
    pub total_cost: f64,
}

pub fn collection_stats(items: &[Item]) -> CollectionStats {
    let mut stats = CollectionStats::default();

    let shape_slot = |stats: &mut CollectionStats, category: ItemCategory, shape: Option<ItemShape>| {
        match (category, shape) {
            (ItemCategory::Flap, Some(ItemShape::Square)) => stats.flaps_square += 1,
            (ItemCategory::Flap, Some(ItemShape::Round)) => stats.flaps_round += 1,
            (ItemCategory::Flap, Some(ItemShape::Mini)) => stats.flaps_mini += 1,
            (ItemCategory::Body, Some(ItemShape::Square)) => stats.bodies_square += 1,
            (ItemCategory::Body, Some(ItemShape::Round)) => stats.bodies_round += 1,
            (ItemCategory::Body, Some(ItemShape::Mini)) => stats.bodies_mini += 1,
            _ => {}
        }
    };

    for item in items {
        match item.category {
            ItemCategory::Handle => stats.handles += 1,
            ItemCategory::Accessory => stats.accessories += 1,
            ItemCategory::Combination => stats.combinations += 1,
            category => shape_slot(&mut stats, category, item.shape),
        }
        if item.is_sold {
            stats.total_sold += 1;
            stats.sales_revenue += item.selling_price.unwrap_or(0.0);
        }
        stats.total_value += item.price;
        stats.total_cost += item.purchase_price.unwrap_or(item.price);
    }

    stats.total_purchased = items.len();
    stats.current_count = items.len() - stats.total_sold;
    stats.total_value -= stats.sales_revenue;
    stats.total_cost -= stats.sales_revenue;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_items;

    #[test]
    fn counts_and_totals_follow_the_collection() {
        let mut items = sample_items();
        // samples: flap/square 49, body/square 89, handle 29, accessory 12
        items[2].is_sold = true;
        items[2].selling_price = Some(20.0);
        items[1].purchase_price = Some(70.0);

        let stats = collection_stats(&items);
        assert_eq!(stats.flaps_square, 1);
        assert_eq!(stats.bodies_square, 1);
        assert_eq!(stats.handles, 1);
        assert_eq!(stats.accessories, 1);
        assert_eq!(stats.total_purchased, 4);
        assert_eq!(stats.total_sold, 1);
        assert_eq!(stats.current_count, 3);
        assert_eq!(stats.sales_revenue, 20.0);
        // value: 49 + 89 + 29 + 12 - 20 sold revenue
        assert!((stats.total_value - 159.0).abs() < 1e-9);
        // cost: 49 + 70 + 29 + 12 - 20
        assert!((stats.total_cost - 140.0).abs() < 1e-9);
    }

    #[test]
    fn empty_collection_is_all_zeroes() {
        assert_eq!(collection_stats(&[]), CollectionStats::default());
    }
}
