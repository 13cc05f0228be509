//! Code for ordering the sample columns of a `MutationMatrix`.

use std::cmp::Ordering;

use super::matrix::MutationMatrix;

/// Compute a column permutation that clusters co-mutated samples.
///
/// Each column's presence pattern is treated as a binary number with the
/// top-frequency gene as the most significant bit and columns are ordered
/// by descending value.  Instead of accumulating `2^row` weights (which
/// overflows for deep matrices) the comparison is done lexicographically
/// row by row, which yields the identical order.  Columns with equal
/// patterns keep their relative input order.
pub fn sort_samples(matrix: &MutationMatrix) -> Vec<usize> {
    let mut order: Vec<usize> = (0..matrix.n_samples()).collect();
    order.sort_by(|&a, &b| compare_columns(matrix, a, b));
    order
}

/// Compare two columns by presence pattern, top gene first, mutated
/// before unmutated.
fn compare_columns(matrix: &MutationMatrix, a: usize, b: usize) -> Ordering {
    for gene_idx in 0..matrix.n_genes() {
        match (matrix.present(gene_idx, a), matrix.present(gene_idx, b)) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => continue,
        }
    }
    Ordering::Equal
}
