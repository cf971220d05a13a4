//! Unit area resolution for size keys.

use crate::domain::aggregates::Product;
use crate::domain::value_objects::SizeKey;

/// Per-unit area in mm² for `size_key`.
///
/// Priority: the first bound product carrying its own area (catalog order),
/// then the `chico`/`grande` defaults, then a literal `WxH` key. `None`
/// means the plate falls back to count-based costing.
pub fn resolve_unit_area(size_key: &SizeKey, candidates: &[&Product]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|p| p.effective_area())
        .or_else(|| size_key.default_area())
        .or_else(|| size_key.dimensions().map(|d| d.area_mm2()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Category;

    fn key(s: &str) -> SizeKey { SizeKey::new(s).unwrap() }

    #[test]
    fn test_catalog_area_beats_defaults() {
        let bare = Product::new(1, "A", Category::Sticker, 0.0).with_size(key("chico"));
        let mut sized = Product::new(2, "B", Category::Sticker, 0.0).with_size(key("chico"));
        sized.width_mm = Some(40.0);
        sized.height_mm = Some(40.0);
        assert_eq!(resolve_unit_area(&key("chico"), &[&bare, &sized]), Some(1600.0));
        assert_eq!(resolve_unit_area(&key("chico"), &[&bare]), Some(2500.0));
    }

    #[test]
    fn test_first_match_wins() {
        let mut a = Product::new(1, "A", Category::Sticker, 0.0);
        a.area_mm2 = Some(900.0);
        let mut b = Product::new(2, "B", Category::Sticker, 0.0);
        b.area_mm2 = Some(400.0);
        assert_eq!(resolve_unit_area(&key("x"), &[&a, &b]), Some(900.0));
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(resolve_unit_area(&key("GRANDE"), &[]), Some(10000.0));
        assert_eq!(resolve_unit_area(&key("70X40"), &[]), Some(2800.0));
        assert_eq!(resolve_unit_area(&key("mediano"), &[]), None);
    }
}
