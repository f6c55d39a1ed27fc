use crate::model::{Item, ItemCategory, ItemShape};

/// Derive the content-identity key used to detect logical duplicates
/// independent of assigned identity: `name|category|shape|colors`, with
/// colors sorted so their order never affects identity.
///
/// Comparison is exact, with no case or whitespace normalization. "Pink" and
/// "pink " are distinct items. An absent shape contributes an empty
/// segment.
pub fn fingerprint(
    name: &str,
    category: ItemCategory,
    shape: Option<ItemShape>,
    colors: &[String],
) -> String {
    let mut sorted: Vec<&str> = colors.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!(
        "{}|{}|{}|{}",
        name,
        category.as_str(),
        shape.map(|s| s.as_str()).unwrap_or(""),
        sorted.join(",")
    )
}

impl Item {
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.name, self.category, self.shape, &self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn colors(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn color_order_does_not_matter() {
        let a = fingerprint("Tasche", ItemCategory::Combination, Some(ItemShape::Square), &colors(&["Red", "Blue"]));
        let b = fingerprint("Tasche", ItemCategory::Combination, Some(ItemShape::Square), &colors(&["Blue", "Red"]));
        assert_eq!(a, b);
    }

    #[test]
    fn each_component_changes_the_key() {
        let base = fingerprint("Rosa Klappe", ItemCategory::Flap, Some(ItemShape::Square), &colors(&["Pink"]));
        assert_ne!(
            base,
            fingerprint("Rosa Klappe 2", ItemCategory::Flap, Some(ItemShape::Square), &colors(&["Pink"]))
        );
        assert_ne!(
            base,
            fingerprint("Rosa Klappe", ItemCategory::Body, Some(ItemShape::Square), &colors(&["Pink"]))
        );
        assert_ne!(
            base,
            fingerprint("Rosa Klappe", ItemCategory::Flap, Some(ItemShape::Round), &colors(&["Pink"]))
        );
        assert_ne!(
            base,
            fingerprint("Rosa Klappe", ItemCategory::Flap, Some(ItemShape::Square), &colors(&["Rose"]))
        );
    }

    #[test]
    fn case_and_whitespace_are_significant() {
        let a = fingerprint("Klappe", ItemCategory::Flap, None, &colors(&["Pink"]));
        let b = fingerprint("klappe", ItemCategory::Flap, None, &colors(&["Pink"]));
        let c = fingerprint("Klappe", ItemCategory::Flap, None, &colors(&["pink "]));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn absent_shape_is_an_empty_segment() {
        let fp = fingerprint("Henkel", ItemCategory::Handle, None, &colors(&["Gold"]));
        assert_eq!(fp, "Henkel|Handle||Gold");
    }

    proptest! {
        #[test]
        fn permutations_share_a_fingerprint(mut cs in proptest::collection::vec("[A-Za-z ]{1,8}", 1..6)) {
            let forward = fingerprint("Teil", ItemCategory::Flap, Some(ItemShape::Round), &cs);
            cs.reverse();
            let backward = fingerprint("Teil", ItemCategory::Flap, Some(ItemShape::Round), &cs);
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn deterministic(name in "[a-zA-Z|, ]{0,12}", cs in proptest::collection::vec("[a-z]{1,6}", 0..4)) {
            let a = fingerprint(&name, ItemCategory::Accessory, None, &cs);
            let b = fingerprint(&name, ItemCategory::Accessory, None, &cs);
            prop_assert_eq!(a, b);
        }
    }
}
