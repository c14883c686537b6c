use std::collections::HashMap;
use std::sync::LazyLock;

/// Keyword → candidate CN codes. A 2-digit entry means the keyword matches
/// the whole chapter rather than a specific code ("steel" → 72, 73).
/// Candidate order within an entry reflects match specificity.
static KEYWORD_CODES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        // Iron & steel products
        m.insert("screw", &["73181500", "73181590", "73181400", "73181300", "73181200", "73181100"]);
        m.insert("screws", &["73181500", "73181590", "73181400"]);
        m.insert("bolt", &["73181500", "73181590", "73181900"]);
        m.insert("bolts", &["73181500", "73181590"]);
        m.insert("nut", &["73181600", "73181691"]);
        m.insert("nuts", &["73181600", "73181691"]);
        m.insert("fastener", &["73181500", "73181600", "73181900"]);
        m.insert("fasteners", &["73181500", "73181600"]);
        m.insert("washer", &["73182100", "73182200"]);
        m.insert("washers", &["73182100", "73182200"]);
        m.insert("nail", &["73170000"]);
        m.insert("nails", &["73170000"]);
        m.insert("spring", &["73202000", "73182100"]);
        m.insert("pipe", &["73041900", "73051100", "73063000"]);
        m.insert("pipes", &["73041900", "73063000"]);
        m.insert("tube", &["73041900", "73063000", "73066100"]);
        m.insert("tubes", &["73063000", "73066100"]);
        m.insert("tank", &["73101000", "73110000"]);
        m.insert("container", &["73110000", "73101000"]);
        m.insert("structure", &["73089000"]);
        m.insert("beam", &["72163100", "72163300"]);
        m.insert("section", &["72163100", "72163300"]);
        m.insert("coil", &["72081000", "72082500", "72083600"]);
        m.insert("coils", &["72081000", "72082500"]);
        m.insert("sheet", &["72085191", "72091500", "72091690", "76061191", "76061291"]);
        m.insert("sheets", &["72085191", "72091500", "76061291"]);
        m.insert("plate", &["72085191", "76061191", "76061291"]);
        m.insert("plates", &["72085191", "76061191"]);
        m.insert("flat-rolled", &["72081000", "72085191", "72091500", "72104100"]);
        m.insert("hot-rolled", &["72081000", "72082500", "72083600", "72085191"]);
        m.insert("cold-rolled", &["72091500", "72091690"]);
        m.insert("galvanized", &["72104100", "72104900", "72103000"]);
        m.insert("zinc", &["72103000", "72104100", "72104900"]);
        m.insert("tin", &["72101100"]);
        m.insert("wire", &["72139100", "76051100", "76052100"]);
        m.insert("rod", &["72139100", "72142000"]);
        m.insert("bar", &["72142000", "76041010", "76042900"]);
        m.insert("ingot", &["72061000", "76011000"]);
        // Aluminium products
        m.insert("aluminum", &["76061191", "76061291", "76011000", "76012000", "76071100"]);
        m.insert("aluminium", &["76061191", "76061291", "76011000", "76012000", "76071100"]);
        m.insert("foil", &["76071100", "76071900"]);
        m.insert("profile", &["76042100", "76042900"]);
        m.insert("profiles", &["76042100", "76042900"]);
        m.insert("extrusion", &["76042100", "76042900"]);
        m.insert("window", &["76101000"]);
        m.insert("door", &["76101000"]);
        // Cement products
        m.insert("cement", &["25232900", "25232100", "25231000", "25233000"]);
        m.insert("portland", &["25232900", "25232100"]);
        m.insert("clinker", &["25231000"]);
        m.insert("hydraulic", &["25239000"]);
        // Fertilizers
        m.insert("fertilizer", &["31052000", "31021000", "31023000"]);
        m.insert("fertiliser", &["31052000", "31021000"]);
        m.insert("urea", &["31021000", "31028000"]);
        m.insert("ammonium", &["31022100", "31023000", "31024000", "31028000"]);
        m.insert("nitrate", &["31023000", "31024000", "31025000"]);
        m.insert("phosphate", &["31031100", "31039000"]);
        m.insert("npk", &["31052000"]);
        // Hydrogen
        m.insert("hydrogen", &["28041000"]);
        // Material modifiers (chapter-level)
        m.insert("steel", &["72", "73"]);
        m.insert("iron", &["72", "73"]);
        m.insert("stainless", &["73041100", "73042300", "72"]);
        m.insert("alloy", &["76012000", "76042100", "76061291"]);
        m
    });

/// Candidate codes for a keyword, if the keyword is known.
pub fn keyword_codes(keyword: &str) -> Option<&'static [&'static str]> {
    KEYWORD_CODES.get(keyword).copied()
}

/// Number of known keywords (exposed for diagnostics).
pub fn keyword_count() -> usize {
    KEYWORD_CODES.len()
}
