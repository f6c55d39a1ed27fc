use thiserror::Error;

use crate::model::{Item, ItemCategory, ItemShape};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombineError {
    #[error("a combination needs at least one piece")]
    NoParts,
    #[error("a combination cannot contain another combination")]
    NestedCombination,
    #[error("combination name must not be empty")]
    EmptyName,
}

/// Compose a virtual `Combination` item from existing pieces.
///
/// Colors are the sorted distinct union of the parts' colors. Shape is
/// inherited from the flap/body parts: any Mini piece makes the whole
/// combination Mini, a uniform Square or Round carries over, and mixed
/// shapes leave it unset. Prices stay off combinations even though the
/// data shape would allow them.
pub fn compose(name: &str, parts: &[Item]) -> Result<Item, CombineError> {
    if name.trim().is_empty() {
        return Err(CombineError::EmptyName);
    }
    if parts.is_empty() {
        return Err(CombineError::NoParts);
    }
    if parts.iter().any(|p| p.category == ItemCategory::Combination) {
        return Err(CombineError::NestedCombination);
    }

    let mut colors: Vec<String> = parts.iter().flat_map(|p| p.colors.clone()).collect();
    colors.sort();
    colors.dedup();

    Ok(Item {
        id: String::new(),
        owner_id: None,
        name: name.to_string(),
        category: ItemCategory::Combination,
        shape: inherited_shape(parts),
        colors,
        price: 0.0,
        purchase_price: None,
        usage_count: 0,
        is_sold: false,
        selling_price: None,
        notes: None,
        photo_url: None,
        created_at: 0,
        updated_at: 0,
    })
}

fn inherited_shape(parts: &[Item]) -> Option<ItemShape> {
    let shaped: Vec<ItemShape> = parts
        .iter()
        .filter(|p| p.category.uses_shape())
        .filter_map(|p| p.shape)
        .collect();
    if shaped.is_empty() {
        return None;
    }
    if shaped.contains(&ItemShape::Mini) {
        return Some(ItemShape::Mini);
    }
    let first = shaped[0];
    shaped.iter().all(|s| *s == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_items;

    fn piece(category: ItemCategory, shape: Option<ItemShape>, colors: &[&str]) -> Item {
        let mut item = sample_items().remove(0);
        item.category = category;
        item.shape = shape;
        item.colors = colors.iter().map(|c| c.to_string()).collect();
        item
    }

    #[test]
    fn colors_are_a_sorted_distinct_union() {
        let parts = [
            piece(ItemCategory::Flap, Some(ItemShape::Square), &["Pink", "Gold"]),
            piece(ItemCategory::Body, Some(ItemShape::Square), &["Black", "Pink"]),
        ];
        let kombi = compose("Abendtasche", &parts).unwrap();
        assert_eq!(kombi.category, ItemCategory::Combination);
        assert_eq!(
            kombi.colors,
            vec!["Black".to_string(), "Gold".to_string(), "Pink".to_string()]
        );
    }

    #[test]
    fn mini_part_makes_a_mini_combination() {
        let parts = [
            piece(ItemCategory::Flap, Some(ItemShape::Mini), &["Pink"]),
            piece(ItemCategory::Body, Some(ItemShape::Square), &["Black"]),
        ];
        assert_eq!(compose("Mini", &parts).unwrap().shape, Some(ItemShape::Mini));
    }

    #[test]
    fn uniform_shape_is_inherited_and_mixed_is_dropped() {
        let square = [
            piece(ItemCategory::Flap, Some(ItemShape::Square), &["Pink"]),
            piece(ItemCategory::Body, Some(ItemShape::Square), &["Black"]),
        ];
        assert_eq!(
            compose("Eckig", &square).unwrap().shape,
            Some(ItemShape::Square)
        );

        let mixed = [
            piece(ItemCategory::Flap, Some(ItemShape::Square), &["Pink"]),
            piece(ItemCategory::Body, Some(ItemShape::Round), &["Black"]),
        ];
        assert_eq!(compose("Gemischt", &mixed).unwrap().shape, None);
    }

    #[test]
    fn handle_shapes_are_ignored() {
        let mut handle = piece(ItemCategory::Handle, Some(ItemShape::Round), &["Gold"]);
        handle.shape = Some(ItemShape::Round); // legacy looseness
        let parts = [
            piece(ItemCategory::Flap, Some(ItemShape::Square), &["Pink"]),
            handle,
        ];
        assert_eq!(
            compose("Mit Henkel", &parts).unwrap().shape,
            Some(ItemShape::Square)
        );
    }

    #[test]
    fn nested_combinations_are_rejected() {
        let parts = [piece(ItemCategory::Combination, None, &["Pink"])];
        assert_eq!(
            compose("Nested", &parts).unwrap_err(),
            CombineError::NestedCombination
        );
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(compose("X", &[]).unwrap_err(), CombineError::NoParts);
        let parts = [piece(ItemCategory::Flap, None, &["Pink"])];
        assert_eq!(compose("  ", &parts).unwrap_err(), CombineError::EmptyName);
    }
}
