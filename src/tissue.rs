use serde::Serialize;

/// One row of a sample-type reference table: the two-digit code carried in a
/// barcode, its short letter code and the human-readable tissue definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TissueType {
    pub code: &'static str,
    pub short_letter_code: &'static str,
    pub definition: &'static str,
}

const fn row(
    code: &'static str,
    short_letter_code: &'static str,
    definition: &'static str,
) -> TissueType {
    TissueType {
        code,
        short_letter_code,
        definition,
    }
}

/// Sample types for TCGA (long-form) barcodes.
pub static TCGA_TISSUE_TYPES: &[TissueType] = &[
    row("01", "TP", "Primary solid Tumor"),
    row("02", "TR", "Recurrent Solid Tumor"),
    row("03", "TB", "Primary Blood Derived Cancer - Peripheral Blood"),
    row("04", "TRBM", "Recurrent Blood Derived Cancer - Bone Marrow"),
    row("05", "TAP", "Additional - New Primary"),
    row("06", "TM", "Metastatic"),
    row("07", "TAM", "Additional Metastatic"),
    row("08", "THOC", "Human Tumor Original Cells"),
    row("09", "TBM", "Primary Blood Derived Cancer - Bone Marrow"),
    row("10", "NB", "Blood Derived Normal"),
    row("11", "NT", "Solid Tissue Normal"),
    row("12", "NBC", "Buccal Cell Normal"),
    row("13", "NEBV", "EBV Immortalized Normal"),
    row("14", "NBM", "Bone Marrow Normal"),
    row("15", "NFBM", "Fibroblasts from Bone Marrow Normal"),
    row("16", "NMCBM", "Mononuclear Cells from Bone Marrow Normal"),
    row("20", "CELLC", "Control Analyte"),
    row("40", "TRB", "Recurrent Blood Derived Cancer - Peripheral Blood"),
    row("50", "CELL", "Cell Lines"),
    row("60", "XP", "Primary Xenograft Tissue"),
    row("61", "XCL", "Cell Line Derived Xenograft Tissue"),
];

/// Sample types for TARGET (short-form) barcodes.
pub static TARGET_TISSUE_TYPES: &[TissueType] = &[
    row("01", "TP", "Primary solid Tumor"),
    row("02", "TR", "Recurrent Solid Tumor"),
    row("03", "TB", "Primary Blood Derived Cancer - Peripheral Blood"),
    row("04", "TRBM", "Recurrent Blood Derived Cancer - Bone Marrow"),
    row("05", "TAP", "Additional - New Primary"),
    row("06", "TM", "Metastatic"),
    row("07", "TAM", "Additional Metastatic"),
    row("08", "THOC", "Human Tumor Original Cells"),
    row("09", "TBM", "Primary Blood Derived Cancer - Bone Marrow"),
    row("10", "NB", "Blood Derived Normal"),
    row("11", "NT", "Solid Tissue Normal"),
    row("12", "NBC", "Buccal Cell Normal"),
    row("13", "NEBV", "EBV Immortalized Normal"),
    row("14", "NBM", "Bone Marrow Normal"),
    row("15", "NFBM", "Fibroblasts from Bone Marrow Normal"),
    row("20", "CELLC", "Control Analyte"),
    row("40", "TRB", "Recurrent Blood Derived Cancer - Peripheral Blood"),
    row("41", "TBMPT", "Blood Derived Cancer - Bone Marrow, Post-treatment"),
    row("42", "TBPPT", "Blood Derived Cancer - Peripheral Blood, Post-treatment"),
    row("50", "CELL", "Cell Lines"),
    row("60", "XP", "Primary Xenograft Tissue"),
    row("61", "XCL", "Cell Line Derived Xenograft Tissue"),
    row("99", "CELLNOS", "Granulocytes"),
];

pub fn lookup(table: &'static [TissueType], code: &str) -> Option<&'static TissueType> {
    table.iter().find(|row| row.code == code)
}

/// Every tissue definition known to either table, in table order without
/// repeats. Sample-type arguments are validated against this vocabulary.
pub fn known_definitions() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for row in TCGA_TISSUE_TYPES.iter().chain(TARGET_TISSUE_TYPES) {
        if !seen.contains(&row.definition) {
            seen.push(row.definition);
        }
    }
    seen
}

pub fn is_known_definition(value: &str) -> bool {
    TCGA_TISSUE_TYPES
        .iter()
        .chain(TARGET_TISSUE_TYPES)
        .any(|row| row.definition.eq_ignore_ascii_case(value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_two_digit() {
        for table in [TCGA_TISSUE_TYPES, TARGET_TISSUE_TYPES] {
            for (idx, row) in table.iter().enumerate() {
                assert_eq!(row.code.len(), 2);
                assert!(row.code.chars().all(|ch| ch.is_ascii_digit()));
                assert!(table[idx + 1..].iter().all(|other| other.code != row.code));
            }
        }
    }

    #[test]
    fn lookup_by_code() {
        assert_eq!(
            lookup(TCGA_TISSUE_TYPES, "11").map(|row| row.definition),
            Some("Solid Tissue Normal")
        );
        assert_eq!(
            lookup(TARGET_TISSUE_TYPES, "42").map(|row| row.short_letter_code),
            Some("TBPPT")
        );
        assert!(lookup(TCGA_TISSUE_TYPES, "42").is_none());
    }

    #[test]
    fn definitions_are_case_insensitive() {
        assert!(is_known_definition("primary solid tumor"));
        assert!(!is_known_definition("Primary Liquid Tumor"));
        assert!(known_definitions().contains(&"Granulocytes"));
    }
}
