//! Variant classifications and their display categories.

use indexmap::IndexMap;

/// The variant classifications considered for the landscape.
///
/// MAF files use more classifications (e.g. `3'UTR`, `Intron`); records
/// with a classification that does not parse into this enum are excluded
/// from the landscape.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumString,
    strum::Display,
)]
pub enum VariantClassification {
    #[strum(serialize = "Missense_Mutation")]
    MissenseMutation,
    #[strum(serialize = "In_Frame_Del")]
    InFrameDel,
    #[strum(serialize = "In_Frame_Ins")]
    InFrameIns,
    #[strum(serialize = "Splice_Site")]
    SpliceSite,
    #[strum(serialize = "Translation_Start_Site")]
    TranslationStartSite,
    #[strum(serialize = "Nonstop_Mutation")]
    NonstopMutation,
    #[strum(serialize = "Frame_Shift_Del")]
    FrameShiftDel,
    #[strum(serialize = "Frame_Shift_Ins")]
    FrameShiftIns,
    #[strum(serialize = "Nonsense_Mutation")]
    NonsenseMutation,
    #[strum(serialize = "Silent")]
    Silent,
}

/// Display category of a variant classification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum MutationCategory {
    Missense,
    Inframe,
    #[strum(serialize = "Critical Site")]
    CriticalSite,
    Frameshift,
    Nonsense,
    Synonymous,
}

impl MutationCategory {
    /// Human-readable label used in the plot legend.
    pub fn label(&self) -> &'static str {
        match self {
            MutationCategory::Missense => "Missense",
            MutationCategory::Inframe => "Inframe",
            MutationCategory::CriticalSite => "Critical Site",
            MutationCategory::Frameshift => "Frameshift",
            MutationCategory::Nonsense => "Nonsense",
            MutationCategory::Synonymous => "Synonymous",
        }
    }

    /// Cell color used in the plot.
    pub fn color(&self) -> &'static str {
        match self {
            MutationCategory::Missense => "#336699",
            MutationCategory::Inframe => "#009999",
            MutationCategory::CriticalSite => "#cc9933",
            MutationCategory::Frameshift => "#ff6600",
            MutationCategory::Nonsense => "#cc0033",
            MutationCategory::Synonymous => "#d2dae2",
        }
    }
}

/// Configuration of the classification/category mapping and the dominant
/// type priority.
///
/// Passed explicitly into the matrix builder so tests can substitute a
/// reduced configuration.
#[derive(Debug, Clone)]
pub struct CategoryConfig {
    /// Mapping from classification to display category; classifications
    /// absent from this map are excluded from the landscape.
    pub categories: IndexMap<VariantClassification, MutationCategory>,
    /// Priority order for dominant type resolution; earlier entries win.
    pub priority: Vec<VariantClassification>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        use MutationCategory::*;
        use VariantClassification::*;

        let categories = IndexMap::from([
            (MissenseMutation, Missense),
            (InFrameDel, Inframe),
            (InFrameIns, Inframe),
            (SpliceSite, CriticalSite),
            (TranslationStartSite, CriticalSite),
            (NonstopMutation, CriticalSite),
            (FrameShiftDel, Frameshift),
            (FrameShiftIns, Frameshift),
            (NonsenseMutation, Nonsense),
            (Silent, Synonymous),
        ]);
        let priority = vec![
            NonsenseMutation,
            FrameShiftDel,
            FrameShiftIns,
            SpliceSite,
            TranslationStartSite,
            NonstopMutation,
            InFrameDel,
            InFrameIns,
            MissenseMutation,
            Silent,
        ];

        Self {
            categories,
            priority,
        }
    }
}

impl CategoryConfig {
    /// Return the display category of a classification, if mapped.
    pub fn category(&self, classification: VariantClassification) -> Option<MutationCategory> {
        self.categories.get(&classification).copied()
    }

    /// Whether the classification takes part in the landscape.
    pub fn contains(&self, classification: VariantClassification) -> bool {
        self.categories.contains_key(&classification)
    }
}
