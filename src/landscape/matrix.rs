//! Construction of the gene-by-sample mutation matrix.
//!
//! This is the computational core of the landscape: filter the mutation
//! records down to the configured classifications, rank genes by the
//! fraction of distinct samples they are mutated in, cross-tabulate the
//! top genes against all samples, and resolve one dominant classification
//! per mutated (gene, sample) pair.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use thousands::Separable;

use super::categories::{CategoryConfig, VariantClassification};
use super::maf::MutationRecord;
use crate::common::round1;

/// Gene-by-sample matrix of mutation counts.
///
/// Rows are the selected genes in descending frequency order, columns are
/// all distinct samples of the filtered input in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationMatrix {
    /// Row labels (gene symbols).
    pub genes: Vec<String>,
    /// Column labels (sample barcodes).
    pub samples: Vec<String>,
    /// Cell values in row-major order.
    counts: Vec<u32>,
}

impl MutationMatrix {
    /// Number of gene rows.
    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    /// Number of sample columns.
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Whether the matrix has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() || self.samples.is_empty()
    }

    /// Mutation count of the cell at (gene row, sample column).
    pub fn count(&self, gene_idx: usize, sample_idx: usize) -> u32 {
        self.counts[gene_idx * self.samples.len() + sample_idx]
    }

    /// Whether the cell at (gene row, sample column) carries a mutation.
    pub fn present(&self, gene_idx: usize, sample_idx: usize) -> bool {
        self.count(gene_idx, sample_idx) > 0
    }
}

/// The derived landscape tables: matrix, dominant types, frequencies.
#[derive(Debug, Clone)]
pub struct LandscapeTables {
    /// The gene-by-sample count matrix.
    pub matrix: MutationMatrix,
    /// Dominant classification per mutated (gene, sample) pair.
    dominant_types: HashMap<(String, String), VariantClassification>,
    /// Percentage of samples mutated per gene, for all genes in rank order.
    pub gene_frequencies: IndexMap<String, f64>,
}

impl LandscapeTables {
    /// Dominant classification for a (gene, sample) pair, if the pair is
    /// mutated.
    pub fn dominant_type(&self, gene: &str, sample: &str) -> Option<VariantClassification> {
        self.dominant_types
            .get(&(gene.to_string(), sample.to_string()))
            .copied()
    }

    /// Frequency percentage of a gene, if it carries any mutation.
    pub fn gene_frequency(&self, gene: &str) -> Option<f64> {
        self.gene_frequencies.get(gene).copied()
    }
}

/// Build the landscape tables from the raw mutation records.
///
/// Records whose classification is not part of `config` are dropped before
/// any frequency or matrix computation.  Gene ranking ties are broken by
/// ascending gene symbol.  If fewer than `top_n_genes` genes remain, all
/// genes are selected.  An input without any qualifying record yields
/// empty tables.
pub fn build_tables(
    records: &[MutationRecord],
    top_n_genes: usize,
    config: &CategoryConfig,
) -> LandscapeTables {
    // Step 1: drop records with unknown or unmapped classifications.
    let filtered: Vec<(&str, VariantClassification, &str)> = records
        .iter()
        .filter_map(|record| {
            VariantClassification::from_str(&record.variant_classification)
                .ok()
                .filter(|classification| config.contains(*classification))
                .map(|classification| {
                    (
                        record.gene.as_str(),
                        classification,
                        record.sample_id.as_str(),
                    )
                })
        })
        .collect();
    tracing::debug!(
        "{} of {} mutation records have a qualifying classification",
        filtered.len().separate_with_commas(),
        records.len().separate_with_commas()
    );

    // Column ordering contract: samples appear in first-seen order.
    let samples: IndexSet<&str> = filtered.iter().map(|(_, _, sample)| *sample).collect();
    let total_samples = samples.len();
    if total_samples == 0 {
        return LandscapeTables {
            matrix: MutationMatrix {
                genes: vec![],
                samples: vec![],
                counts: vec![],
            },
            dominant_types: HashMap::new(),
            gene_frequencies: IndexMap::new(),
        };
    }

    // Step 2: per-gene distinct-sample percentage, ranked descending with
    // alphabetical tie-break.
    let mut samples_by_gene: IndexMap<&str, HashSet<&str>> = IndexMap::new();
    for &(gene, _, sample) in &filtered {
        samples_by_gene.entry(gene).or_default().insert(sample);
    }
    let ranked: Vec<(&str, f64)> = samples_by_gene
        .iter()
        .map(|(gene, gene_samples)| {
            (
                *gene,
                round1(gene_samples.len() as f64 / total_samples as f64 * 100.0),
            )
        })
        .sorted_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        })
        .collect();
    let gene_frequencies: IndexMap<String, f64> = ranked
        .iter()
        .map(|(gene, pct)| (gene.to_string(), *pct))
        .collect();

    let top_genes: Vec<&str> = ranked
        .iter()
        .take(top_n_genes)
        .map(|(gene, _)| *gene)
        .collect();
    let gene_rows: HashMap<&str, usize> = top_genes
        .iter()
        .enumerate()
        .map(|(idx, gene)| (*gene, idx))
        .collect();

    // Step 3 + 4: cross-tabulate the top genes against all samples and
    // collect the classifications seen per cell.
    let mut counts = vec![0u32; top_genes.len() * total_samples];
    let mut cell_classifications: HashMap<(usize, usize), HashSet<VariantClassification>> =
        HashMap::new();
    for (gene, classification, sample) in &filtered {
        let Some(&gene_idx) = gene_rows.get(gene) else {
            continue;
        };
        let sample_idx = samples
            .get_index_of(sample)
            .expect("sample must be indexed");
        counts[gene_idx * total_samples + sample_idx] += 1;
        cell_classifications
            .entry((gene_idx, sample_idx))
            .or_default()
            .insert(*classification);
    }

    // Dominant type: first match in the configured priority order.
    let sample_names: Vec<&str> = samples.iter().copied().collect();
    let mut dominant_types = HashMap::new();
    for ((gene_idx, sample_idx), classifications) in &cell_classifications {
        if let Some(winner) = config
            .priority
            .iter()
            .find(|classification| classifications.contains(*classification))
        {
            dominant_types.insert(
                (
                    top_genes[*gene_idx].to_string(),
                    sample_names[*sample_idx].to_string(),
                ),
                *winner,
            );
        }
    }

    LandscapeTables {
        matrix: MutationMatrix {
            genes: top_genes.iter().map(|gene| gene.to_string()).collect(),
            samples: sample_names.iter().map(|s| s.to_string()).collect(),
            counts,
        },
        dominant_types,
        gene_frequencies,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::landscape::categories::{CategoryConfig, VariantClassification};
    use crate::landscape::maf::MutationRecord;

    fn record(gene: &str, classification: &str, sample: &str) -> MutationRecord {
        MutationRecord {
            gene: gene.to_string(),
            variant_classification: classification.to_string(),
            sample_id: sample.to_string(),
        }
    }

    #[test]
    fn scenario_two_genes_two_samples() {
        let records = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneA", "Nonsense_Mutation", "S2"),
            record("GeneB", "Silent", "S1"),
        ];

        let tables = super::build_tables(&records, 2, &CategoryConfig::default());

        assert_eq!(Some(100.0), tables.gene_frequency("GeneA"));
        assert_eq!(Some(50.0), tables.gene_frequency("GeneB"));
        assert_eq!(vec!["GeneA", "GeneB"], tables.matrix.genes);
        assert_eq!(vec!["S1", "S2"], tables.matrix.samples);
        assert_eq!(
            Some(VariantClassification::NonsenseMutation),
            tables.dominant_type("GeneA", "S2")
        );
        assert_eq!(
            Some(VariantClassification::MissenseMutation),
            tables.dominant_type("GeneA", "S1")
        );
        assert_eq!(
            Some(VariantClassification::Silent),
            tables.dominant_type("GeneB", "S1")
        );
        assert_eq!(None, tables.dominant_type("GeneB", "S2"));
    }

    #[test]
    fn unknown_classifications_do_not_influence_result() {
        let base = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneB", "Silent", "S2"),
        ];
        let mut noisy = base.clone();
        noisy.push(record("GeneC", "3'UTR", "S1"));
        noisy.push(record("GeneA", "Intron", "S3"));
        noisy.push(record("GeneB", "RNA", "S2"));

        let config = CategoryConfig::default();
        let clean_tables = super::build_tables(&base, 10, &config);
        let noisy_tables = super::build_tables(&noisy, 10, &config);

        assert_eq!(clean_tables.matrix, noisy_tables.matrix);
        assert_eq!(clean_tables.gene_frequencies, noisy_tables.gene_frequencies);
        assert_eq!(
            clean_tables.dominant_type("GeneA", "S1"),
            noisy_tables.dominant_type("GeneA", "S1")
        );
    }

    #[test]
    fn top_n_limits_rows_but_not_columns() {
        let records = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneA", "Missense_Mutation", "S2"),
            record("GeneB", "Missense_Mutation", "S1"),
            // S3 only carries a GeneC mutation; GeneC is ranked out.
            record("GeneC", "Silent", "S3"),
        ];

        let tables = super::build_tables(&records, 2, &CategoryConfig::default());

        assert_eq!(vec!["GeneA", "GeneB"], tables.matrix.genes);
        // Column completeness: S3 appears as an all-zero column.
        assert_eq!(vec!["S1", "S2", "S3"], tables.matrix.samples);
        assert!(!tables.matrix.present(0, 2));
        assert!(!tables.matrix.present(1, 2));
        // GeneC is still reported in the frequency table.
        assert_eq!(Some(33.3), tables.gene_frequency("GeneC"));
    }

    #[test]
    fn top_n_larger_than_gene_count_returns_all_genes() {
        let records = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneB", "Silent", "S2"),
        ];

        let tables = super::build_tables(&records, 50, &CategoryConfig::default());

        assert_eq!(2, tables.matrix.n_genes());
    }

    #[test]
    fn gene_ranking_ties_break_alphabetically() {
        let records = vec![
            record("Zeta", "Missense_Mutation", "S1"),
            record("Alpha", "Missense_Mutation", "S2"),
            record("Beta", "Missense_Mutation", "S1"),
            record("Beta", "Missense_Mutation", "S2"),
        ];

        let tables = super::build_tables(&records, 3, &CategoryConfig::default());

        assert_eq!(vec!["Beta", "Alpha", "Zeta"], tables.matrix.genes);
    }

    #[test]
    fn recurrent_mutations_count_once_for_frequency() {
        let records = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneA", "Nonsense_Mutation", "S1"),
            record("GeneB", "Missense_Mutation", "S1"),
            record("GeneB", "Missense_Mutation", "S2"),
        ];

        let tables = super::build_tables(&records, 10, &CategoryConfig::default());

        // GeneA is mutated twice but only in one of two samples.
        assert_eq!(Some(50.0), tables.gene_frequency("GeneA"));
        assert_eq!(Some(100.0), tables.gene_frequency("GeneB"));
        // The cell still counts both records.
        assert_eq!(vec!["GeneB", "GeneA"], tables.matrix.genes);
        assert_eq!(2, tables.matrix.count(1, 0));
    }

    #[rstest::rstest]
    #[case("Silent", "Missense_Mutation", VariantClassification::MissenseMutation)]
    #[case(
        "Missense_Mutation",
        "Nonsense_Mutation",
        VariantClassification::NonsenseMutation
    )]
    #[case(
        "In_Frame_Del",
        "Frame_Shift_Ins",
        VariantClassification::FrameShiftIns
    )]
    fn dominant_type_priority(
        #[case] first: &str,
        #[case] second: &str,
        #[case] expected: VariantClassification,
    ) {
        // Priority decides, not record order or frequency.
        let records = vec![
            record("GeneA", first, "S1"),
            record("GeneA", first, "S1"),
            record("GeneA", second, "S1"),
        ];

        let tables = super::build_tables(&records, 1, &CategoryConfig::default());

        assert_eq!(Some(expected), tables.dominant_type("GeneA", "S1"));
    }

    #[test]
    fn empty_filtered_input_yields_empty_tables() {
        let records = vec![record("GeneA", "3'UTR", "S1"), record("GeneB", "RNA", "S2")];

        let tables = super::build_tables(&records, 10, &CategoryConfig::default());

        assert!(tables.matrix.is_empty());
        assert_eq!(0, tables.matrix.n_genes());
        assert_eq!(0, tables.matrix.n_samples());
        assert!(tables.gene_frequencies.is_empty());
    }

    #[test]
    fn reduced_config_restricts_the_landscape() {
        use indexmap::IndexMap;

        use crate::landscape::categories::MutationCategory;

        // A configuration that only considers missense mutations.
        let config = CategoryConfig {
            categories: IndexMap::from([(
                VariantClassification::MissenseMutation,
                MutationCategory::Missense,
            )]),
            priority: vec![VariantClassification::MissenseMutation],
        };
        let records = vec![
            record("GeneA", "Missense_Mutation", "S1"),
            record("GeneB", "Nonsense_Mutation", "S2"),
        ];

        let tables = super::build_tables(&records, 10, &config);

        assert_eq!(vec!["GeneA"], tables.matrix.genes);
        assert_eq!(vec!["S1"], tables.matrix.samples);
        assert_eq!(Some(100.0), tables.gene_frequency("GeneA"));
    }
}
