use serde::{Deserialize, Serialize};

/// CBAM product categories per EU Regulation 2023/956.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CbamCategory {
    Cement,
    IronSteel,
    Aluminium,
    Fertilizers,
    Hydrogen,
    Electricity,
}

impl CbamCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CbamCategory::Cement => "cement",
            CbamCategory::IronSteel => "iron_steel",
            CbamCategory::Aluminium => "aluminium",
            CbamCategory::Fertilizers => "fertilizers",
            CbamCategory::Hydrogen => "hydrogen",
            CbamCategory::Electricity => "electricity",
        }
    }

    /// Tolerant parse: case-insensitive, accepts "iron steel" and the
    /// British "fertilisers" spelling seen in registry exports.
    pub fn parse(text: &str) -> Option<CbamCategory> {
        match text.to_lowercase().trim().replace(' ', "_").as_str() {
            "cement" => Some(CbamCategory::Cement),
            "iron_steel" => Some(CbamCategory::IronSteel),
            "aluminium" | "aluminum" => Some(CbamCategory::Aluminium),
            "fertilizers" | "fertilisers" => Some(CbamCategory::Fertilizers),
            "hydrogen" => Some(CbamCategory::Hydrogen),
            "electricity" => Some(CbamCategory::Electricity),
            _ => None,
        }
    }
}

/// Default emission intensities for a CBAM category (EU default values).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub category: CbamCategory,
    /// tCO2e per tonne of product, direct.
    pub direct_tco2_per_tonne: f64,
    /// tCO2e per tonne of product, indirect (purchased electricity).
    pub indirect_tco2_per_tonne: f64,
    /// MWh of electricity per tonne of product.
    pub electricity_mwh_per_tonne: f64,
}

static DEFAULT_EMISSION_FACTORS: &[EmissionFactor] = &[
    EmissionFactor { category: CbamCategory::IronSteel, direct_tco2_per_tonne: 1.9, indirect_tco2_per_tonne: 0.3, electricity_mwh_per_tonne: 0.5 },
    EmissionFactor { category: CbamCategory::Aluminium, direct_tco2_per_tonne: 8.0, indirect_tco2_per_tonne: 6.5, electricity_mwh_per_tonne: 14.0 },
    EmissionFactor { category: CbamCategory::Cement, direct_tco2_per_tonne: 0.65, indirect_tco2_per_tonne: 0.08, electricity_mwh_per_tonne: 0.1 },
    EmissionFactor { category: CbamCategory::Fertilizers, direct_tco2_per_tonne: 2.5, indirect_tco2_per_tonne: 0.2, electricity_mwh_per_tonne: 0.3 },
    EmissionFactor { category: CbamCategory::Hydrogen, direct_tco2_per_tonne: 9.0, indirect_tco2_per_tonne: 3.0, electricity_mwh_per_tonne: 50.0 },
    EmissionFactor { category: CbamCategory::Electricity, direct_tco2_per_tonne: 0.0, indirect_tco2_per_tonne: 0.5, electricity_mwh_per_tonne: 1.0 },
];

/// Default emission factor for a category.
pub fn default_emission_factor(category: CbamCategory) -> &'static EmissionFactor {
    DEFAULT_EMISSION_FACTORS
        .iter()
        .find(|f| f.category == category)
        .expect("every category has a default factor")
}

/// CBAM category for a 2-digit CN chapter, if the chapter is covered.
/// Chapter 26 (ores) maps to iron_steel as a precursor chapter.
pub fn category_for_chapter(chapter: &str) -> Option<CbamCategory> {
    match chapter {
        "25" => Some(CbamCategory::Cement),
        "26" => Some(CbamCategory::IronSteel),
        "27" => Some(CbamCategory::Electricity),
        "28" => Some(CbamCategory::Hydrogen),
        "31" => Some(CbamCategory::Fertilizers),
        "72" | "73" => Some(CbamCategory::IronSteel),
        "76" => Some(CbamCategory::Aluminium),
        _ => None,
    }
}

/// Human-readable description of a CN chapter.
pub fn chapter_description(chapter: &str) -> Option<&'static str> {
    match chapter {
        "25" => Some("Salt; sulphur; earths and stone; plastering materials, lime and cement"),
        "26" => Some("Ores, slag and ash"),
        "27" => Some("Mineral fuels, mineral oils and products of their distillation"),
        "28" => Some("Inorganic chemicals; organic or inorganic compounds of precious metals"),
        "31" => Some("Fertilizers"),
        "72" => Some("Iron and steel"),
        "73" => Some("Articles of iron or steel"),
        "76" => Some("Aluminium and articles thereof"),
        "84" => Some("Nuclear reactors, boilers, machinery and mechanical appliances"),
        "85" => Some("Electrical machinery and equipment and parts thereof"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steel_chapters_map_to_iron_steel() {
        assert_eq!(category_for_chapter("72"), Some(CbamCategory::IronSteel));
        assert_eq!(category_for_chapter("73"), Some(CbamCategory::IronSteel));
    }

    #[test]
    fn uncovered_chapter_is_none() {
        assert_eq!(category_for_chapter("84"), None);
        assert_eq!(category_for_chapter("99"), None);
    }

    #[test]
    fn every_category_has_a_factor() {
        for cat in [
            CbamCategory::Cement,
            CbamCategory::IronSteel,
            CbamCategory::Aluminium,
            CbamCategory::Fertilizers,
            CbamCategory::Hydrogen,
            CbamCategory::Electricity,
        ] {
            let f = default_emission_factor(cat);
            assert_eq!(f.category, cat);
            assert!(f.direct_tco2_per_tonne >= 0.0);
        }
    }

    #[test]
    fn aluminium_is_electricity_intensive() {
        let f = default_emission_factor(CbamCategory::Aluminium);
        assert!(f.electricity_mwh_per_tonne > 10.0);
    }

    #[test]
    fn parse_accepts_spelling_variants() {
        assert_eq!(CbamCategory::parse("IRON STEEL"), Some(CbamCategory::IronSteel));
        assert_eq!(CbamCategory::parse("fertilisers"), Some(CbamCategory::Fertilizers));
        assert_eq!(CbamCategory::parse("Aluminium"), Some(CbamCategory::Aluminium));
        assert_eq!(CbamCategory::parse("plastics"), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&CbamCategory::IronSteel).unwrap();
        assert_eq!(json, "\"iron_steel\"");
    }
}
