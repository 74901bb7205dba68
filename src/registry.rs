use itertools::Itertools;
use plate_protocol::{PlateColor, WellId};
use serde::{Deserialize, Serialize};

/// A named, colored group of wells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    name: String,
    color: PlateColor,
    wells: Vec<WellId>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> PlateColor {
        self.color
    }

    /// Wells in the order they were selected.
    pub fn wells(&self) -> &[WellId] {
        &self.wells
    }

    pub fn contains(&self, well: WellId) -> bool {
        self.wells.contains(&well)
    }

    pub fn is_stale(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn well_labels(&self) -> Vec<String> {
        self.wells.iter().map(|w| w.label()).collect()
    }

    pub fn display_line(&self) -> String {
        format!(
            "Category: {}, Color: {}, Wells: {}",
            self.name,
            self.color,
            self.wells.iter().join(", ")
        )
    }

    fn remove(&mut self, well: WellId) -> bool {
        let before = self.wells.len();
        self.wells.retain(|w| *w != well);
        self.wells.len() != before
    }
}

/// Insertion-ordered categories. Order decides precedence and display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a category; a no-op when the trimmed name or the well list is
    /// empty. Wells already owned elsewhere are not checked here.
    pub fn add_category(&mut self, name: &str, color: PlateColor, wells: &[WellId]) -> bool {
        let name = name.trim();
        if name.is_empty() || wells.is_empty() {
            return false;
        }
        let mut unique: Vec<WellId> = Vec::with_capacity(wells.len());
        for well in wells {
            if !unique.contains(well) {
                unique.push(*well);
            }
        }
        self.categories.push(Category {
            name: name.to_string(),
            color,
            wells: unique,
        });
        true
    }

    /// Removes `well` from the first category holding it, then drops every
    /// category left without wells. Returns the name it was removed from.
    pub fn remove_well_from_all(&mut self, well: WellId) -> Option<String> {
        let removed_from = self
            .categories
            .iter_mut()
            .find(|category| category.contains(well))
            .map(|category| {
                category.remove(well);
                category.name.clone()
            });
        self.prune();
        removed_from
    }

    /// Removes each well from every category holding it, then prunes.
    /// Returns how many (category, well) claims were dropped.
    pub fn release_wells(&mut self, wells: &[WellId]) -> usize {
        let mut released = 0;
        for category in self.categories.iter_mut() {
            for well in wells {
                if category.remove(*well) {
                    released += 1;
                }
            }
        }
        self.prune();
        released
    }

    /// The subset of `wells` that some category already owns.
    pub fn claimed_wells(&self, wells: &[WellId]) -> Vec<WellId> {
        wells
            .iter()
            .copied()
            .filter(|well| self.categories.iter().any(|c| c.contains(*well)))
            .collect()
    }

    pub fn list_active(&self) -> Vec<&Category> {
        self.categories.iter().filter(|c| !c.is_stale()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Distinct wells owned by at least one category.
    pub fn assigned_well_count(&self) -> usize {
        WellId::all()
            .filter(|well| self.categories.iter().any(|c| c.contains(*well)))
            .count()
    }

    fn prune(&mut self) {
        self.categories.retain(|c| !c.is_stale());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wells(labels: &[&str]) -> Vec<WellId> {
        labels.iter().map(|l| WellId::parse(l).unwrap()).collect()
    }

    #[test]
    fn test_add_category_preconditions() {
        let mut registry = CategoryRegistry::new();
        assert!(!registry.add_category("", PlateColor::WHITE, &wells(&["A1"])));
        assert!(!registry.add_category("   ", PlateColor::WHITE, &wells(&["A1"])));
        assert!(!registry.add_category("X", PlateColor::WHITE, &[]));
        assert!(registry.is_empty());
        assert!(registry.add_category(" X ", PlateColor::WHITE, &wells(&["A1"])));
        assert_eq!(registry.list_active()[0].name(), "X");
    }

    #[test]
    fn test_add_category_drops_duplicate_wells() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("X", PlateColor::BLACK, &wells(&["B2", "A1", "B2"]));
        assert_eq!(registry.list_active()[0].well_labels(), vec!["B2", "A1"]);
    }

    #[test]
    fn test_remove_well_stops_at_first_match() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("first", PlateColor::BLACK, &wells(&["A1", "A2"]));
        registry.add_category("second", PlateColor::WHITE, &wells(&["A1"]));
        assert_eq!(
            registry.remove_well_from_all(WellId::parse("A1").unwrap()),
            Some("first".to_string())
        );
        let active = registry.list_active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].well_labels(), vec!["A2"]);
        assert_eq!(active[1].well_labels(), vec!["A1"]);
    }

    #[test]
    fn test_remove_last_well_prunes_category() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("only", PlateColor::BLACK, &wells(&["C3"]));
        registry.remove_well_from_all(WellId::parse("C3").unwrap());
        assert!(registry.list_active().is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("X", PlateColor::BLACK, &wells(&["A1", "A2"]));
        let a1 = WellId::parse("A1").unwrap();
        registry.remove_well_from_all(a1);
        let once = registry.clone();
        assert_eq!(registry.remove_well_from_all(a1), None);
        assert_eq!(registry, once);
    }

    #[test]
    fn test_release_wells_clears_every_claim() {
        let mut registry = CategoryRegistry::new();
        registry.add_category("a", PlateColor::BLACK, &wells(&["A1", "A2"]));
        registry.add_category("b", PlateColor::WHITE, &wells(&["A1"]));
        assert_eq!(registry.release_wells(&wells(&["A1", "H12"])), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.claimed_wells(&wells(&["A1"])).is_empty());
        assert_eq!(registry.claimed_wells(&wells(&["A1", "A2"])), wells(&["A2"]));
    }

    #[test]
    fn test_display_line() {
        let mut registry = CategoryRegistry::new();
        registry.add_category(
            "Control",
            PlateColor::parse("#FF0000").unwrap(),
            &wells(&["A1", "B1"]),
        );
        assert_eq!(
            registry.list_active()[0].display_line(),
            "Category: Control, Color: #ff0000, Wells: A1, B1"
        );
        assert_eq!(registry.assigned_well_count(), 2);
    }
}
