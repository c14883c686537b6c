use serde::Serialize;

/// One entry of the EU Combined Nomenclature taxonomy.
///
/// Invariant: `code` is always 8 ASCII digits; `chapter` is `code[0..2]`
/// and `heading` is `code[0..4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommodityCode {
    pub code: &'static str,
    pub description: &'static str,
    pub chapter: &'static str,
    pub heading: &'static str,
}

impl CommodityCode {
    /// Group the 8 digits as "NNNN NN NN" for display.
    pub fn format_grouped(&self) -> String {
        format_cn_grouped(self.code)
    }
}

/// Group an 8-digit CN code as "NNNN NN NN". Anything other than 8+
/// ASCII characters is returned as-is.
pub fn format_cn_grouped(code: &str) -> String {
    if code.len() < 8 || !code.is_ascii() {
        return code.to_string();
    }
    format!("{} {} {}", &code[..4], &code[4..6], &code[6..8])
}

/// Look up a CN code in the taxonomy.
pub fn find_code(code: &str) -> Option<&'static CommodityCode> {
    CN_CODES.iter().find(|c| c.code == code)
}

/// Full taxonomy, in regulatory listing order.
///
/// Order matters: classification ties break toward the first-listed code.
pub fn cn_codes() -> &'static [CommodityCode] {
    CN_CODES
}

macro_rules! cn {
    ($code:literal, $desc:literal, $chapter:literal, $heading:literal) => {
        CommodityCode {
            code: $code,
            description: $desc,
            chapter: $chapter,
            heading: $heading,
        }
    };
}

static CN_CODES: &[CommodityCode] = &[
    // Chapter 72 — iron and steel
    cn!("72061000", "Iron; ingots and other primary forms", "72", "7206"),
    cn!("72071100", "Semi-finished products of iron; containing by weight less than 0.25% carbon", "72", "7207"),
    cn!("72071200", "Semi-finished products of iron; containing by weight 0.25% or more of carbon", "72", "7207"),
    cn!("72081000", "Flat-rolled products of iron, in coils, hot-rolled, width >= 600mm", "72", "7208"),
    cn!("72082500", "Flat-rolled products, hot-rolled, width >= 600mm, thickness >= 4.75mm", "72", "7208"),
    cn!("72083600", "Flat-rolled products, hot-rolled, width >= 600mm, thickness > 1mm but < 3mm", "72", "7208"),
    cn!("72085191", "Flat-rolled products, hot-rolled, not in coils, width >= 600mm, thickness > 10mm", "72", "7208"),
    cn!("72091500", "Flat-rolled products, cold-rolled, width >= 600mm, thickness >= 3mm", "72", "7209"),
    cn!("72091690", "Flat-rolled products, cold-rolled, width >= 600mm, thickness > 1mm but < 3mm", "72", "7209"),
    cn!("72101100", "Flat-rolled products, plated or coated with tin, width >= 600mm", "72", "7210"),
    cn!("72103000", "Flat-rolled products, electrolytically plated with zinc", "72", "7210"),
    cn!("72104100", "Flat-rolled products, zinc coated, corrugated", "72", "7210"),
    cn!("72104900", "Flat-rolled products, zinc coated, other", "72", "7210"),
    cn!("72106100", "Flat-rolled products, plated with aluminium-zinc alloys", "72", "7210"),
    cn!("72139100", "Wire rod, of iron or non-alloy steel, circular cross-section, diameter < 14mm", "72", "7213"),
    cn!("72142000", "Bars and rods, of iron or non-alloy steel, not further worked than hot-rolled", "72", "7214"),
    cn!("72163100", "U, I or H sections of iron or steel, not further worked, height < 80mm", "72", "7216"),
    cn!("72163300", "H sections of iron or steel, height >= 80mm", "72", "7216"),
    // Chapter 73 — articles of iron or steel
    cn!("73041100", "Line pipe, seamless, of stainless steel", "73", "7304"),
    cn!("73041900", "Line pipe, seamless, of iron or steel (excluding stainless)", "73", "7304"),
    cn!("73042300", "Drill pipe, seamless, of stainless steel", "73", "7304"),
    cn!("73042900", "Casing and tubing, seamless, of iron or steel", "73", "7304"),
    cn!("73051100", "Line pipe, welded, longitudinally submerged arc welded", "73", "7305"),
    cn!("73063000", "Tubes, welded, of iron or non-alloy steel, circular cross-section", "73", "7306"),
    cn!("73066100", "Tubes and hollow profiles, welded, of iron or steel, square or rectangular", "73", "7306"),
    cn!("73071100", "Cast fittings of non-malleable cast iron", "73", "7307"),
    cn!("73089000", "Structures and parts of structures, of iron or steel, n.e.s.", "73", "7308"),
    cn!("73101000", "Tanks, casks, drums, of iron or steel, capacity 50-300 litres", "73", "7310"),
    cn!("73110000", "Containers for compressed or liquefied gas, of iron or steel", "73", "7311"),
    cn!("73170000", "Nails, tacks, drawing pins, corrugated nails, staples", "73", "7317"),
    cn!("73181100", "Coach screws of iron or steel", "73", "7318"),
    cn!("73181200", "Wood screws (other than coach screws) of iron or steel", "73", "7318"),
    cn!("73181300", "Screw hooks and screw rings of iron or steel", "73", "7318"),
    cn!("73181400", "Self-tapping screws of iron or steel", "73", "7318"),
    cn!("73181500", "Threaded screws of iron or steel, n.e.s.", "73", "7318"),
    cn!("73181590", "Other screws, fully threaded, of iron or steel", "73", "7318"),
    cn!("73181600", "Nuts of iron or steel", "73", "7318"),
    cn!("73181691", "Nuts, internally threaded, of iron or steel", "73", "7318"),
    cn!("73181900", "Threaded articles of iron or steel, n.e.s.", "73", "7318"),
    cn!("73182100", "Spring washers and other lock washers of iron or steel", "73", "7318"),
    cn!("73182200", "Washers (other than spring washers) of iron or steel", "73", "7318"),
    cn!("73182400", "Cotters and cotter pins of iron or steel", "73", "7318"),
    cn!("73194000", "Safety pins and other pins of iron or steel, n.e.s.", "73", "7319"),
    cn!("73202000", "Helical springs of iron or steel", "73", "7320"),
    // Chapter 76 — aluminium
    cn!("76011000", "Aluminium, not alloyed, unwrought", "76", "7601"),
    cn!("76012000", "Aluminium alloys, unwrought", "76", "7601"),
    cn!("76020000", "Aluminium waste and scrap", "76", "7602"),
    cn!("76031000", "Aluminium powders, non-lamellar structure", "76", "7603"),
    cn!("76041010", "Aluminium bars and rods, not alloyed", "76", "7604"),
    cn!("76042100", "Aluminium alloy hollow profiles", "76", "7604"),
    cn!("76042900", "Aluminium alloy bars, rods and profiles, n.e.s.", "76", "7604"),
    cn!("76051100", "Aluminium wire, not alloyed, max cross-sectional dimension > 7mm", "76", "7605"),
    cn!("76052100", "Aluminium alloy wire, max cross-sectional dimension > 7mm", "76", "7605"),
    cn!("76061100", "Aluminium plates and sheets, not alloyed, thickness > 0.2mm, rectangular", "76", "7606"),
    cn!("76061191", "Aluminium plates, not alloyed, thickness > 0.2mm, width > 1000mm", "76", "7606"),
    cn!("76061200", "Aluminium alloy plates and sheets, rectangular, thickness > 0.2mm", "76", "7606"),
    cn!("76061291", "Aluminium alloy plates, thickness > 0.2mm, width > 1000mm", "76", "7606"),
    cn!("76061299", "Other aluminium alloy plates and sheets, thickness > 0.2mm", "76", "7606"),
    cn!("76071100", "Aluminium foil, not backed, rolled, thickness <= 0.2mm", "76", "7607"),
    cn!("76071900", "Aluminium foil, backed, thickness <= 0.2mm", "76", "7607"),
    cn!("76081000", "Aluminium tubes and pipes, not alloyed", "76", "7608"),
    cn!("76082000", "Aluminium alloy tubes and pipes", "76", "7608"),
    cn!("76090000", "Aluminium tube or pipe fittings", "76", "7609"),
    cn!("76101000", "Aluminium doors, windows and their frames", "76", "7610"),
    cn!("76109000", "Aluminium structures and parts of structures, n.e.s.", "76", "7610"),
    // Chapter 25 — cement
    cn!("25231000", "Cement clinkers", "25", "2523"),
    cn!("25232100", "White Portland cement, whether or not artificially coloured", "25", "2523"),
    cn!("25232900", "Other Portland cement", "25", "2523"),
    cn!("25233000", "Aluminous cement", "25", "2523"),
    cn!("25239000", "Other hydraulic cements", "25", "2523"),
    // Chapter 31 — fertilizers
    cn!("31021000", "Urea, whether or not in aqueous solution", "31", "3102"),
    cn!("31022100", "Ammonium sulphate", "31", "3102"),
    cn!("31023000", "Ammonium nitrate, whether or not in aqueous solution", "31", "3102"),
    cn!("31024000", "Mixtures of ammonium nitrate with calcium carbonate or other substances", "31", "3102"),
    cn!("31025000", "Sodium nitrate", "31", "3102"),
    cn!("31028000", "Mixtures of urea and ammonium nitrate in aqueous or ammoniacal solution", "31", "3102"),
    cn!("31031100", "Superphosphates, containing by weight 35% or more of diphosphorus pentaoxide", "31", "3103"),
    cn!("31039000", "Other mineral or chemical fertilizers, phosphatic", "31", "3103"),
    cn!("31052000", "Mineral or chemical fertilizers containing NPK", "31", "3105"),
    // Chapter 28 — hydrogen
    cn!("28041000", "Hydrogen", "28", "2804"),
];
