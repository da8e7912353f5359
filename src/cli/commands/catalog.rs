use anyhow::Result;

use super::print_json;
use crate::catalog::{Catalog, Facility};
use crate::cli::{CatalogKind, FacilitySort};

pub struct CatalogCommand {
    pub kind: CatalogKind,
    pub json: bool,
    pub sort: FacilitySort,
}

impl CatalogCommand {
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            kind,
            json: false,
            sort: FacilitySort::default(),
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_sort(mut self, sort: FacilitySort) -> Self {
        self.sort = sort;
        self
    }

    pub fn execute(&self, catalog: &dyn Catalog) -> Result<()> {
        match self.kind {
            CatalogKind::Facilities => self.show_facilities(catalog),
            CatalogKind::Departments => self.show_departments(catalog),
            CatalogKind::Slots => self.show_slots(catalog),
        }
    }

    fn show_facilities(&self, catalog: &dyn Catalog) -> Result<()> {
        let facilities = sorted_facilities(catalog.list_facilities(), self.sort);
        if self.json {
            return print_json(&facilities);
        }

        println!("🏨 NEARBY HOSPITALS:");
        for facility in facilities {
            let emergency = if facility.can_admit_emergency() { "🚑" } else { "  " };
            println!(
                "   {} [{}] {} - {:.1} km",
                emergency, facility.id, facility.name, facility.distance_km
            );
            println!("        📍 {}", facility.address);
            println!("        📞 {}  🕒 {}", facility.phone, facility.open_hours);
            println!(
                "        🛏️  {}/{} beds available",
                facility.beds.available, facility.beds.total
            );
            if !facility.specialties.is_empty() {
                println!("        🩺 {}", facility.specialties.join(", "));
            }
        }
        if let Some(nearest) = catalog.nearest_emergency_facility() {
            println!();
            println!("🚑 Nearest emergency admission: {} ({})", nearest.name, nearest.id);
        }
        Ok(())
    }

    fn show_departments(&self, catalog: &dyn Catalog) -> Result<()> {
        if self.json {
            return print_json(&catalog.list_departments());
        }

        println!("🩺 DEPARTMENTS:");
        for department in catalog.list_departments() {
            println!("   [{}] {}", department.id, department.name);
        }
        Ok(())
    }

    fn show_slots(&self, catalog: &dyn Catalog) -> Result<()> {
        if self.json {
            return print_json(&catalog.list_time_slots());
        }

        println!("🕒 APPOINTMENT SLOTS:");
        for slot in catalog.list_time_slots() {
            println!("   [{}] {}", slot.id, slot.label);
        }
        Ok(())
    }
}

fn sorted_facilities(facilities: &[Facility], sort: FacilitySort) -> Vec<&Facility> {
    let mut sorted: Vec<&Facility> = facilities.iter().collect();
    match sort {
        FacilitySort::Catalog => {}
        FacilitySort::Distance => sorted.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km)),
        // stable sort keeps catalog order among equal bed counts
        FacilitySort::Availability => sorted.sort_by(|a, b| b.beds.available.cmp(&a.beds.available)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    fn ids(facilities: &[&Facility]) -> Vec<String> {
        facilities.iter().map(|f| f.id.to_string()).collect()
    }

    #[test]
    fn test_facility_sort_orders() {
        let catalog = StaticCatalog::seeded();
        let facilities = catalog.list_facilities();

        assert_eq!(
            ids(&sorted_facilities(facilities, FacilitySort::Catalog)),
            vec!["h1", "h2", "h3", "h4", "h5"]
        );
        assert_eq!(
            ids(&sorted_facilities(facilities, FacilitySort::Distance)),
            vec!["h3", "h1", "h2", "h4", "h5"]
        );
        assert_eq!(
            ids(&sorted_facilities(facilities, FacilitySort::Availability)),
            vec!["h2", "h5", "h1", "h3", "h4"]
        );
    }
}
