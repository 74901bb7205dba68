//! Which category owns a well, and what the well looks like because of it.
//!
//! The first category in insertion order that lists a well owns it. Later
//! categories claiming the same well are ignored for display.

use crate::registry::{Category, CategoryRegistry};
use plate_protocol::{PlateColor, WellId};
use plate_render::{WellAppearance, WellSource};

pub fn owner(registry: &CategoryRegistry, well: WellId) -> Option<&Category> {
    registry.iter().find(|category| category.contains(well))
}

/// Owner's color and name, or white with an empty label for a free well.
pub fn resolve(registry: &CategoryRegistry, well: WellId) -> WellAppearance {
    match owner(registry, well) {
        Some(category) => WellAppearance::new(category.color(), category.name()),
        None => WellAppearance::new(PlateColor::WHITE, ""),
    }
}

impl WellSource for CategoryRegistry {
    fn appearance(&self, well: WellId) -> WellAppearance {
        resolve(self, well)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn well(label: &str) -> WellId {
        WellId::parse(label).unwrap()
    }

    #[test]
    fn test_resolve_assigned_and_free_wells() {
        let mut registry = CategoryRegistry::new();
        let red = PlateColor::parse("#FF0000").unwrap();
        registry.add_category("X", red, &[well("A1"), well("A2")]);

        assert_eq!(resolve(&registry, well("A1")), WellAppearance::new(red, "X"));
        assert_eq!(resolve(&registry, well("A2")), WellAppearance::new(red, "X"));
        assert_eq!(resolve(&registry, well("A3")), WellAppearance::empty());
    }

    #[test]
    fn test_first_inserted_category_wins() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("early", PlateColor::BLACK, &[well("B5")]);
        registry.add_category("late", PlateColor::WHITE, &[well("B5")]);
        assert_eq!(owner(&registry, well("B5")).unwrap().name(), "early");
    }

    #[test]
    fn test_registry_is_a_well_source() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("X", PlateColor::BLACK, &[well("H12")]);
        assert_eq!(registry.appearance(well("H12")).label, "X");
    }

    fn arb_well() -> impl Strategy<Value = WellId> {
        (0usize..8, 0usize..12).prop_map(|(r, c)| WellId::from_indices(r, c).unwrap())
    }

    proptest! {
        #[test]
        fn prop_resolve_matches_earliest_claim(
            assignments in prop::collection::vec(prop::collection::vec(arb_well(), 1..6), 0..6),
            probe in arb_well(),
        ) {
            let mut registry = CategoryRegistry::new();
            for (idx, wells) in assignments.iter().enumerate() {
                let shade = (idx * 40) as u8;
                registry.add_category(&format!("cat{idx}"), PlateColor::rgb(shade, 0, 0), wells);
            }
            let expected = assignments
                .iter()
                .position(|wells| wells.contains(&probe))
                .map(|idx| WellAppearance::new(PlateColor::rgb((idx * 40) as u8, 0, 0), format!("cat{idx}")))
                .unwrap_or_else(WellAppearance::empty);
            prop_assert_eq!(resolve(&registry, probe), expected);
        }
    }
}
