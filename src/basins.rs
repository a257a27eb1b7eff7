/// Watershed catalog for the Rio de Janeiro state monitoring network.
///
/// Defines the 7 environmental macro-regions and the 30 hydrographic
/// sub-basins analyzed by the service, with their main river, size,
/// population and mean risk. This is the single source of truth for
/// sub-basin ids; the engine itself never consults it, callers look a
/// unit up here and hand it to the engine.
///
/// Sources:
///   - Regions and sub-basins: SEMADS/INEA state water resources plan
///   - Centroids: approximate, used only for nearest-basin location

use crate::model::{RiskLevel, WatershedUnit};

// ---------------------------------------------------------------------------
// Macro-regions
// ---------------------------------------------------------------------------

/// An environmental macro-region (MRA) grouping several sub-basins.
pub struct MacroRegion {
    pub id: &'static str,
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub area_km2: f64,
}

pub static MACRO_REGIONS: &[MacroRegion] = &[
    MacroRegion {
        id: "mra-1",
        code: "MRA-1",
        name: "Baía de Guanabara",
        description: "Guanabara Bay and the rivers draining into it. \
                      Rio de Janeiro metropolitan area.",
        area_km2: 4125.0,
    },
    MacroRegion {
        id: "mra-2",
        code: "MRA-2",
        name: "Baía de Sepetiba",
        description: "Sepetiba Bay and adjacent basins along the western coast.",
        area_km2: 2650.0,
    },
    MacroRegion {
        id: "mra-3",
        code: "MRA-3",
        name: "Litoral Norte",
        description: "Northern coast, from Macaé to the Espírito Santo border.",
        area_km2: 3100.0,
    },
    MacroRegion {
        id: "mra-4",
        code: "MRA-4",
        name: "Serrana",
        description: "Mountain region; rivers rising in the Serra do Mar.",
        area_km2: 4200.0,
    },
    MacroRegion {
        id: "mra-5",
        code: "MRA-5",
        name: "Baixadas Litorâneas",
        description: "Coastal lowlands, including the Macaé and Ostras basins.",
        area_km2: 5800.0,
    },
    MacroRegion {
        id: "mra-6",
        code: "MRA-6",
        name: "Vale do Paraíba",
        description: "Paraíba do Sul basin, the state's main river, and its tributaries.",
        area_km2: 14200.0,
    },
    MacroRegion {
        id: "mra-7",
        code: "MRA-7",
        name: "Noroeste Fluminense",
        description: "North-west region, middle Paraíba and tributaries.",
        area_km2: 8900.0,
    },
];

// ---------------------------------------------------------------------------
// Sub-basins
// ---------------------------------------------------------------------------

/// Static metadata for one hydrographic sub-basin.
pub struct Basin {
    /// Stable id, `sb-NN`.
    pub id: &'static str,
    /// Public code, `RJ-NN`.
    pub code: &'static str,
    pub name: &'static str,
    pub macro_region_id: &'static str,
    pub river_name: &'static str,
    pub area_km2: f64,
    pub estimated_population: u64,
    pub mean_risk: RiskLevel,
    /// Approximate centroid, WGS84.
    pub latitude: f64,
    pub longitude: f64,
}

impl Basin {
    /// Owned record handed to the convergence engine.
    pub fn to_unit(&self) -> WatershedUnit {
        WatershedUnit {
            id: self.id.to_string(),
            code: self.code.to_string(),
            name: self.name.to_string(),
            river_name: Some(self.river_name.to_string()).filter(|r| !r.is_empty()),
            mean_risk: self.mean_risk,
            macro_region_id: self.macro_region_id.to_string(),
            area_km2: self.area_km2,
            estimated_population: self.estimated_population,
        }
    }
}

/// All monitored sub-basins, grouped by macro-region.
pub static BASIN_REGISTRY: &[Basin] = &[
    Basin {
        id: "sb-01",
        code: "RJ-01",
        name: "Rio Guandu",
        macro_region_id: "mra-1",
        river_name: "Rio Guandu",
        area_km2: 1480.0,
        estimated_population: 850_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.75,
        longitude: -43.55,
    },
    Basin {
        id: "sb-02",
        code: "RJ-02",
        name: "Rio Iguaçu/Sarapuí",
        macro_region_id: "mra-1",
        river_name: "Rio Iguaçu",
        area_km2: 1150.0,
        estimated_population: 1_200_000,
        mean_risk: RiskLevel::High,
        latitude: -22.80,
        longitude: -43.45,
    },
    Basin {
        id: "sb-03",
        code: "RJ-03",
        name: "Rio Meriti/Acari",
        macro_region_id: "mra-1",
        river_name: "Rio Meriti",
        area_km2: 420.0,
        estimated_population: 950_000,
        mean_risk: RiskLevel::High,
        latitude: -22.87,
        longitude: -43.35,
    },
    Basin {
        id: "sb-04",
        code: "RJ-04",
        name: "Rio Macacu/Guapiaçu",
        macro_region_id: "mra-1",
        river_name: "Rio Macacu",
        area_km2: 980.0,
        estimated_population: 320_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.65,
        longitude: -42.95,
    },
    Basin {
        id: "sb-05",
        code: "RJ-05",
        name: "Rio Caceribu/Iguaçu",
        macro_region_id: "mra-1",
        river_name: "Rio Caceribu",
        area_km2: 760.0,
        estimated_population: 480_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.75,
        longitude: -42.85,
    },
    Basin {
        id: "sb-06",
        code: "RJ-06",
        name: "Rio Magé/Saracuruna",
        macro_region_id: "mra-1",
        river_name: "Rio Magé",
        area_km2: 540.0,
        estimated_population: 380_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.65,
        longitude: -43.10,
    },
    Basin {
        id: "sb-07",
        code: "RJ-07",
        name: "Rio Guandu/Santa Cruz",
        macro_region_id: "mra-2",
        river_name: "Rio Guandu",
        area_km2: 850.0,
        estimated_population: 420_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.85,
        longitude: -43.65,
    },
    Basin {
        id: "sb-08",
        code: "RJ-08",
        name: "Rio Piracão/Mendes",
        macro_region_id: "mra-2",
        river_name: "Rio Piracão",
        area_km2: 380.0,
        estimated_population: 85_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.70,
        longitude: -43.90,
    },
    Basin {
        id: "sb-09",
        code: "RJ-09",
        name: "Rio Piraquê/Maricá",
        macro_region_id: "mra-2",
        river_name: "Rio Piraquê",
        area_km2: 290.0,
        estimated_population: 150_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.90,
        longitude: -42.80,
    },
    Basin {
        id: "sb-10",
        code: "RJ-10",
        name: "Rio Macabu",
        macro_region_id: "mra-3",
        river_name: "Rio Macabu",
        area_km2: 720.0,
        estimated_population: 125_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -21.95,
        longitude: -41.90,
    },
    Basin {
        id: "sb-11",
        code: "RJ-11",
        name: "Rio São João",
        macro_region_id: "mra-3",
        river_name: "Rio São João",
        area_km2: 1680.0,
        estimated_population: 180_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.50,
        longitude: -42.20,
    },
    Basin {
        id: "sb-12",
        code: "RJ-12",
        name: "Rio Itabapoana",
        macro_region_id: "mra-3",
        river_name: "Rio Itabapoana",
        area_km2: 2340.0,
        estimated_population: 210_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -21.75,
        longitude: -41.33,
    },
    Basin {
        id: "sb-13",
        code: "RJ-13",
        name: "Rio Piabanha",
        macro_region_id: "mra-4",
        river_name: "Rio Piabanha",
        area_km2: 420.0,
        estimated_population: 180_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.40,
        longitude: -43.10,
    },
    Basin {
        id: "sb-14",
        code: "RJ-14",
        name: "Rio Preto",
        macro_region_id: "mra-4",
        river_name: "Rio Preto",
        area_km2: 680.0,
        estimated_population: 95_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.20,
        longitude: -43.70,
    },
    Basin {
        id: "sb-15",
        code: "RJ-15",
        name: "Rio Bonito/Aldeia",
        macro_region_id: "mra-4",
        river_name: "Rio Bonito",
        area_km2: 380.0,
        estimated_population: 72_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.55,
        longitude: -42.60,
    },
    Basin {
        id: "sb-16",
        code: "RJ-16",
        name: "Rio Macaé",
        macro_region_id: "mra-5",
        river_name: "Rio Macaé",
        area_km2: 1260.0,
        estimated_population: 280_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.37,
        longitude: -41.78,
    },
    Basin {
        id: "sb-17",
        code: "RJ-17",
        name: "Rio das Ostras",
        macro_region_id: "mra-5",
        river_name: "Rio das Ostras",
        area_km2: 480.0,
        estimated_population: 185_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.52,
        longitude: -41.95,
    },
    Basin {
        id: "sb-18",
        code: "RJ-18",
        name: "Rio Una",
        macro_region_id: "mra-5",
        river_name: "Rio Una",
        area_km2: 520.0,
        estimated_population: 95_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.60,
        longitude: -42.05,
    },
    Basin {
        id: "sb-19",
        code: "RJ-19",
        name: "Lagunas de Araruama",
        macro_region_id: "mra-5",
        river_name: "Canal de Itajuru",
        area_km2: 620.0,
        estimated_population: 320_000,
        mean_risk: RiskLevel::Low,
        latitude: -22.85,
        longitude: -42.20,
    },
    Basin {
        id: "sb-20",
        code: "RJ-20",
        name: "Paraíba do Sul - Alto Curso",
        macro_region_id: "mra-6",
        river_name: "Rio Paraíba do Sul",
        area_km2: 3200.0,
        estimated_population: 680_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.50,
        longitude: -44.20,
    },
    Basin {
        id: "sb-21",
        code: "RJ-21",
        name: "Rio Paraibuna",
        macro_region_id: "mra-6",
        river_name: "Rio Paraibuna",
        area_km2: 1180.0,
        estimated_population: 125_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.35,
        longitude: -43.80,
    },
    Basin {
        id: "sb-22",
        code: "RJ-22",
        name: "Rio Pomba",
        macro_region_id: "mra-6",
        river_name: "Rio Pomba",
        area_km2: 2150.0,
        estimated_population: 185_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -21.90,
        longitude: -43.10,
    },
    Basin {
        id: "sb-23",
        code: "RJ-23",
        name: "Rio Muriaé",
        macro_region_id: "mra-6",
        river_name: "Rio Muriaé",
        area_km2: 1580.0,
        estimated_population: 145_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -21.60,
        longitude: -42.35,
    },
    Basin {
        id: "sb-24",
        code: "RJ-24",
        name: "Paraíba do Sul - Médio Curso",
        macro_region_id: "mra-6",
        river_name: "Rio Paraíba do Sul",
        area_km2: 2800.0,
        estimated_population: 520_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -22.30,
        longitude: -43.55,
    },
    Basin {
        id: "sb-25",
        code: "RJ-25",
        name: "Rio Dois Rios",
        macro_region_id: "mra-6",
        river_name: "Rio Dois Rios",
        area_km2: 920.0,
        estimated_population: 78_000,
        mean_risk: RiskLevel::Low,
        latitude: -21.75,
        longitude: -42.60,
    },
    Basin {
        id: "sb-26",
        code: "RJ-26",
        name: "Rio Carangola",
        macro_region_id: "mra-7",
        river_name: "Rio Carangola",
        area_km2: 850.0,
        estimated_population: 68_000,
        mean_risk: RiskLevel::Low,
        latitude: -20.95,
        longitude: -42.05,
    },
    Basin {
        id: "sb-27",
        code: "RJ-27",
        name: "Rio Itaperuna",
        macro_region_id: "mra-7",
        river_name: "Rio Itaperuna",
        area_km2: 720.0,
        estimated_population: 125_000,
        mean_risk: RiskLevel::Low,
        latitude: -21.20,
        longitude: -41.90,
    },
    Basin {
        id: "sb-28",
        code: "RJ-28",
        name: "Rio Bom Jardim",
        macro_region_id: "mra-7",
        river_name: "Rio Bom Jardim",
        area_km2: 580.0,
        estimated_population: 85_000,
        mean_risk: RiskLevel::Low,
        latitude: -21.95,
        longitude: -42.40,
    },
    Basin {
        id: "sb-29",
        code: "RJ-29",
        name: "Paraíba do Sul - Baixo Curso",
        macro_region_id: "mra-7",
        river_name: "Rio Paraíba do Sul",
        area_km2: 1850.0,
        estimated_population: 210_000,
        mean_risk: RiskLevel::Moderate,
        latitude: -21.65,
        longitude: -41.55,
    },
    Basin {
        id: "sb-30",
        code: "RJ-30",
        name: "Rio Itabapoana - Alto",
        macro_region_id: "mra-7",
        river_name: "Rio Itabapoana",
        area_km2: 980.0,
        estimated_population: 75_000,
        mean_risk: RiskLevel::Low,
        latitude: -21.10,
        longitude: -41.45,
    },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Looks up a sub-basin by id (`sb-NN`). Returns `None` if not found.
pub fn find_basin(id: &str) -> Option<&'static Basin> {
    BASIN_REGISTRY.iter().find(|b| b.id == id)
}

/// Looks up a sub-basin by public code (`RJ-NN`), case-insensitively.
pub fn find_basin_by_code(code: &str) -> Option<&'static Basin> {
    BASIN_REGISTRY.iter().find(|b| b.code.eq_ignore_ascii_case(code))
}

/// Looks up a macro-region by id (`mra-N`).
pub fn find_region(id: &str) -> Option<&'static MacroRegion> {
    MACRO_REGIONS.iter().find(|r| r.id == id)
}

/// Sub-basins belonging to a macro-region, in registry order.
pub fn basins_in_region(region_id: &str) -> Vec<&'static Basin> {
    BASIN_REGISTRY
        .iter()
        .filter(|b| b.macro_region_id == region_id)
        .collect()
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Result of placing a point on the watershed map.
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub basin: &'static Basin,
    pub region: &'static MacroRegion,
}

impl Location {
    /// Short coordinate label, e.g. `-22.9068, -43.1729`.
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Finds the sub-basin whose centroid is closest to the given point.
///
/// Distance is planar in degrees, which is good enough at the scale of one
/// state. Returns `None` only for non-finite coordinates.
pub fn locate(latitude: f64, longitude: f64) -> Option<Location> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }

    let basin = BASIN_REGISTRY.iter().min_by(|a, b| {
        let da = (a.latitude - latitude).powi(2) + (a.longitude - longitude).powi(2);
        let db = (b.latitude - latitude).powi(2) + (b.longitude - longitude).powi(2);
        da.total_cmp(&db)
    })?;
    let region = find_region(basin.macro_region_id)?;

    Some(Location {
        latitude,
        longitude,
        basin,
        region,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_thirty_basins_and_seven_regions() {
        assert_eq!(BASIN_REGISTRY.len(), 30);
        assert_eq!(MACRO_REGIONS.len(), 7);
    }

    #[test]
    fn test_no_duplicate_basin_ids_or_codes() {
        let mut ids = std::collections::HashSet::new();
        let mut codes = std::collections::HashSet::new();
        for basin in BASIN_REGISTRY {
            assert!(ids.insert(basin.id), "duplicate id '{}'", basin.id);
            assert!(codes.insert(basin.code), "duplicate code '{}'", basin.code);
        }
    }

    #[test]
    fn test_ids_and_codes_share_a_number() {
        for basin in BASIN_REGISTRY {
            let id_num = basin.id.strip_prefix("sb-").expect("id should start with sb-");
            let code_num = basin.code.strip_prefix("RJ-").expect("code should start with RJ-");
            assert_eq!(id_num, code_num, "id/code mismatch for '{}'", basin.name);
        }
    }

    #[test]
    fn test_every_basin_belongs_to_a_known_region() {
        for basin in BASIN_REGISTRY {
            assert!(
                find_region(basin.macro_region_id).is_some(),
                "'{}' references unknown region '{}'",
                basin.name,
                basin.macro_region_id
            );
        }
    }

    #[test]
    fn test_every_region_has_basins() {
        for region in MACRO_REGIONS {
            assert!(
                !basins_in_region(region.id).is_empty(),
                "region '{}' has no sub-basins",
                region.name
            );
        }
        assert_eq!(basins_in_region("mra-1").len(), 6);
    }

    #[test]
    fn test_find_basin_returns_correct_entry() {
        let basin = find_basin("sb-02").expect("sb-02 should be in registry");
        assert_eq!(basin.code, "RJ-02");
        assert_eq!(basin.river_name, "Rio Iguaçu");
        assert_eq!(basin.mean_risk, RiskLevel::High);
        assert!(find_basin("sb-99").is_none());
    }

    #[test]
    fn test_find_basin_by_code_is_case_insensitive() {
        let basin = find_basin_by_code("rj-16").expect("RJ-16 should resolve");
        assert_eq!(basin.id, "sb-16");
    }

    #[test]
    fn test_to_unit_copies_metadata() {
        let unit = find_basin("sb-19").unwrap().to_unit();
        assert_eq!(unit.id, "sb-19");
        assert_eq!(unit.name, "Lagunas de Araruama");
        assert_eq!(unit.river_name.as_deref(), Some("Canal de Itajuru"));
        assert_eq!(unit.macro_region_id, "mra-5");
    }

    #[test]
    fn test_centroids_fall_inside_rio_de_janeiro_state() {
        for basin in BASIN_REGISTRY {
            assert!(
                (-23.5..=-20.5).contains(&basin.latitude),
                "latitude out of range for '{}'",
                basin.name
            );
            assert!(
                (-45.0..=-40.9).contains(&basin.longitude),
                "longitude out of range for '{}'",
                basin.name
            );
        }
    }

    #[test]
    fn test_locate_exact_centroid_returns_that_basin() {
        let loc = locate(-22.37, -41.78).expect("finite point should locate");
        assert_eq!(loc.basin.id, "sb-16");
        assert_eq!(loc.region.id, "mra-5");
        assert_eq!(loc.label(), "-22.3700, -41.7800");
    }

    #[test]
    fn test_locate_downtown_rio_picks_nearest_basin() {
        // Centro station coordinates; nearest centroid is Rio Meriti/Acari.
        let loc = locate(-22.9068, -43.1729).unwrap();
        assert_eq!(loc.basin.id, "sb-03");
        assert_eq!(loc.region.id, "mra-1");
    }

    #[test]
    fn test_locate_rejects_non_finite_coordinates() {
        assert!(locate(f64::NAN, -43.0).is_none());
        assert!(locate(-22.0, f64::INFINITY).is_none());
    }
}
