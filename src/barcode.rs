use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::domain::CategoryClass;
use crate::error::GdcError;
use crate::gdc::RawHit;
use crate::tissue::{self, TARGET_TISSUE_TYPES, TCGA_TISSUE_TYPES, TissueType};

static CASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"TCGA-[[:alnum:]]{2}-[[:alnum:]]{4}|TARGET-[[:alnum:]]{2}-[[:alnum:]]{6}")
        .expect("case barcode pattern")
});

static ALIQUOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"TCGA-[[:alnum:]]{2}-[[:alnum:]]{4}-[[:alnum:]]{3}-[[:alnum:]]{3}-[[:alnum:]]{4}-[[:alnum:]]{2}",
        r"|TARGET-[[:alnum:]]{2}-[[:alnum:]]{6}-[[:alnum:]]{3}-[[:alnum:]]{3}",
    ))
    .expect("aliquot barcode pattern")
});

/// How much of a barcode is searched for in a hit's case records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPattern {
    /// Patient/case identifier only (`TCGA-OR-A5J1`, `TARGET-20-PADZCG`).
    Case,
    /// Full specimen/aliquot identifier.
    Aliquot,
}

impl ExtractionPattern {
    pub fn for_category(category: &str) -> Self {
        match CategoryClass::of(category) {
            CategoryClass::ClinicalOrBiospecimen => ExtractionPattern::Case,
            CategoryClass::ProteinExpression | CategoryClass::Other => ExtractionPattern::Aliquot,
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            ExtractionPattern::Case => LazyLock::force(&CASE_PATTERN),
            ExtractionPattern::Aliquot => LazyLock::force(&ALIQUOT_PATTERN),
        }
    }
}

/// The two barcode layouts. A batch is decoded with exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// `TCGA-02-0001-01C-01D-0182-01`
    Tcga,
    /// `TARGET-20-PADZCG-04A-01R`
    Target,
}

impl Grammar {
    pub fn detect(barcode: &str) -> Option<Self> {
        if barcode.starts_with("TCGA-") {
            Some(Grammar::Tcga)
        } else if barcode.starts_with("TARGET-") {
            Some(Grammar::Target)
        } else {
            None
        }
    }

    pub fn table(self) -> &'static [TissueType] {
        match self {
            Grammar::Tcga => TCGA_TISSUE_TYPES,
            Grammar::Target => TARGET_TISSUE_TYPES,
        }
    }

    /// Byte ranges of (case id, sample id, tissue code) and the offset of the
    /// nucleic-acid letter.
    fn layout(self) -> Layout {
        match self {
            Grammar::Tcga => Layout {
                case_id: 0..12,
                sample_id: 0..16,
                tissue_code: 13..15,
                nucleic_acid: 19,
            },
            Grammar::Target => Layout {
                case_id: 0..16,
                sample_id: 0..20,
                tissue_code: 17..19,
                nucleic_acid: 23,
            },
        }
    }
}

struct Layout {
    case_id: std::ops::Range<usize>,
    sample_id: std::ops::Range<usize>,
    tissue_code: std::ops::Range<usize>,
    nucleic_acid: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedBarcode {
    pub barcode: String,
    pub grammar: Grammar,
    pub case_id: String,
    pub sample_id: Option<String>,
    pub tissue_code: Option<String>,
    pub short_letter_code: Option<String>,
    pub tissue_definition: Option<String>,
    pub nucleic_acid: Option<char>,
}

/// What to do with a barcode whose tissue code is absent from the reference
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTissuePolicy {
    #[default]
    Fail,
    /// Drop the hit silently, as an inner join against the table would.
    DropHit,
}

/// A file record together with the barcode decoded from its case data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    pub data_category: Option<String>,
    pub data_type: Option<String>,
    pub access: Option<String>,
    pub experimental_strategy: Option<String>,
    pub workflow_type: Option<String>,
    pub platform: Option<String>,
    pub barcode: Option<DecodedBarcode>,
    #[serde(skip)]
    pub cases: Vec<Value>,
}

impl Hit {
    pub fn barcode_id(&self) -> Option<&str> {
        self.barcode.as_ref().map(|barcode| barcode.barcode.as_str())
    }

    pub fn case_id(&self) -> Option<&str> {
        self.barcode.as_ref().map(|barcode| barcode.case_id.as_str())
    }

    pub fn tissue_definition(&self) -> Option<&str> {
        self.barcode
            .as_ref()
            .and_then(|barcode| barcode.tissue_definition.as_deref())
    }
}

impl From<RawHit> for Hit {
    fn from(raw: RawHit) -> Self {
        Self {
            file_id: raw.id.or(raw.file_id),
            file_name: raw.file_name,
            data_category: raw.data_category,
            data_type: raw.data_type,
            access: raw.access,
            experimental_strategy: raw.experimental_strategy,
            workflow_type: raw.analysis.and_then(|analysis| analysis.workflow_type),
            platform: raw.platform,
            barcode: None,
            cases: raw.cases,
        }
    }
}

/// First barcode found anywhere in a hit's case records.
pub fn extract_barcode(cases: &[Value], pattern: ExtractionPattern) -> Option<String> {
    let regex = pattern.regex();
    cases.iter().find_map(|case| first_match(case, regex))
}

fn first_match(value: &Value, regex: &Regex) -> Option<String> {
    match value {
        Value::String(text) => regex.find(text).map(|found| found.as_str().to_string()),
        Value::Array(items) => items.iter().find_map(|item| first_match(item, regex)),
        Value::Object(map) => map.values().find_map(|item| first_match(item, regex)),
        _ => None,
    }
}

/// Picks the grammar shared by every barcode of a batch. An empty batch has
/// no grammar; a batch mixing layouts is rejected.
pub fn dispatch<'a, I>(barcodes: I) -> Result<Option<Grammar>, GdcError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    let mut grammar = None;
    let mut uniform = true;
    for barcode in barcodes {
        let detected = Grammar::detect(barcode);
        match (grammar, detected) {
            (_, None) => uniform = false,
            (None, Some(found)) if seen.is_empty() => grammar = Some(found),
            (Some(current), Some(found)) if current == found => {}
            _ => uniform = false,
        }
        seen.push(barcode.to_string());
    }
    if !uniform {
        return Err(GdcError::UnrecognizedBarcodeGrammar { barcodes: seen });
    }
    Ok(grammar)
}

pub fn decode(barcode: &str, grammar: Grammar) -> Result<DecodedBarcode, GdcError> {
    let layout = grammar.layout();
    let case_id = barcode
        .get(layout.case_id)
        .ok_or_else(|| GdcError::UnrecognizedBarcodeGrammar {
            barcodes: vec![barcode.to_string()],
        })?
        .to_string();
    let sample_id = barcode.get(layout.sample_id).map(str::to_string);
    let tissue_code = barcode.get(layout.tissue_code).map(str::to_string);
    let nucleic_acid = barcode.chars().nth(layout.nucleic_acid);

    let tissue = match &tissue_code {
        Some(code) => Some(tissue::lookup(grammar.table(), code).ok_or_else(|| {
            GdcError::UnknownTissueCode {
                barcode: barcode.to_string(),
                code: code.clone(),
            }
        })?),
        None => None,
    };

    Ok(DecodedBarcode {
        barcode: barcode.to_string(),
        grammar,
        case_id,
        sample_id,
        tissue_code,
        short_letter_code: tissue.map(|row| row.short_letter_code.to_string()),
        tissue_definition: tissue.map(|row| row.definition.to_string()),
        nucleic_acid,
    })
}

/// Turns raw hits into annotated hits, keeping their order. Hits without a
/// recognizable barcode are kept with `barcode: None`.
pub fn decode_hits(
    raw: Vec<RawHit>,
    category: &str,
    policy: UnknownTissuePolicy,
) -> Result<Vec<Hit>, GdcError> {
    let pattern = ExtractionPattern::for_category(category);
    let mut hits = raw.into_iter().map(Hit::from).collect::<Vec<_>>();
    let extracted = hits
        .iter()
        .map(|hit| extract_barcode(&hit.cases, pattern))
        .collect::<Vec<_>>();

    let Some(grammar) = dispatch(extracted.iter().flatten().map(String::as_str))? else {
        return Ok(hits);
    };

    let mut keep = vec![true; hits.len()];
    for (idx, barcode) in extracted.into_iter().enumerate() {
        let Some(barcode) = barcode else {
            continue;
        };
        match decode(&barcode, grammar) {
            Ok(decoded) => hits[idx].barcode = Some(decoded),
            Err(GdcError::UnknownTissueCode { barcode, code })
                if policy == UnknownTissuePolicy::DropHit =>
            {
                tracing::debug!("dropping {barcode}: tissue code {code} not in reference table");
                keep[idx] = false;
            }
            Err(err) => return Err(err),
        }
    }

    let mut flags = keep.into_iter();
    hits.retain(|_| flags.next().unwrap_or(true));
    Ok(hits)
}
