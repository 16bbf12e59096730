//! Disease Category - class code → label table

use std::fmt;

use serde::{Deserialize, Serialize};

/// Predicted disease category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiseaseCategory {
    Infectious,
    Metabolic,
    Healthy,
    /// Class code outside the trained label set
    Unknown,
}

/// Display language for category labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Tr,
}

impl DiseaseCategory {
    pub const KNOWN: [DiseaseCategory; 3] = [
        DiseaseCategory::Infectious,
        DiseaseCategory::Metabolic,
        DiseaseCategory::Healthy,
    ];

    /// Map a classifier code; anything outside 0..=2 is `Unknown`
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => DiseaseCategory::Infectious,
            1 => DiseaseCategory::Metabolic,
            2 => DiseaseCategory::Healthy,
            _ => DiseaseCategory::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != DiseaseCategory::Unknown
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (DiseaseCategory::Infectious, Locale::En) => "Infectious",
            (DiseaseCategory::Metabolic, Locale::En) => "Metabolic",
            (DiseaseCategory::Healthy, Locale::En) => "Healthy",
            (DiseaseCategory::Unknown, Locale::En) => "Unknown",
            (DiseaseCategory::Infectious, Locale::Tr) => "Enfeksiyöz",
            (DiseaseCategory::Metabolic, Locale::Tr) => "Metabolik",
            (DiseaseCategory::Healthy, Locale::Tr) => "Sağlıklı",
            (DiseaseCategory::Unknown, Locale::Tr) => "Bilinmeyen Durum",
        }
    }
}

impl fmt::Display for DiseaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::En))
    }
}
