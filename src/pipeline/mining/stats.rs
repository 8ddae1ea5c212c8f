//! Contingency-table statistics used by the baseline miner

use std::collections::HashMap;

/// Chi-square summary of one cross-classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContingencyStat {
    pub chi_square: f64,
    pub df: usize,
    /// Non-empty row cells (distinct joint predictor levels)
    pub rows: usize,
    /// Non-empty outcome levels
    pub cols: usize,
    pub n: usize,
}

impl ContingencyStat {
    /// Cross-tabulate `keys` against `classes` over the selected rows
    pub fn from_rows(keys: &[u64], classes: &[u32], n_classes: usize, rows: &[usize]) -> Self {
        let mut table: HashMap<u64, Vec<f64>> = HashMap::new();
        let mut col_totals = vec![0.0; n_classes];
        for &row in rows {
            let class = classes[row] as usize;
            table.entry(keys[row]).or_insert_with(|| vec![0.0; n_classes])[class] += 1.0;
            col_totals[class] += 1.0;
        }

        let n = rows.len();
        let total = n as f64;
        let cols = col_totals.iter().filter(|&&c| c > 0.0).count();
        let mut chi_square = 0.0;
        for counts in table.values() {
            let row_total: f64 = counts.iter().sum();
            for (observed, col_total) in counts.iter().zip(&col_totals) {
                if *col_total > 0.0 {
                    let expected = row_total * col_total / total;
                    chi_square += (observed - expected).powi(2) / expected;
                }
            }
        }

        let rows_used = table.len();
        Self {
            chi_square,
            df: rows_used.saturating_sub(1) * cols.saturating_sub(1),
            rows: rows_used,
            cols,
            n,
        }
    }
}

/// Bias-corrected Cramér's V (Bergsma 2013), 0 when undefined
pub fn bias_corrected_cramers_v(stat: &ContingencyStat) -> f64 {
    if stat.n < 2 || stat.df == 0 {
        return 0.0;
    }
    let n = stat.n as f64;
    let r = stat.rows as f64;
    let k = stat.cols as f64;

    let phi2 = stat.chi_square / n;
    let phi2_corrected = (phi2 - (k - 1.0) * (r - 1.0) / (n - 1.0)).max(0.0);
    let r_corrected = r - (r - 1.0).powi(2) / (n - 1.0);
    let k_corrected = k - (k - 1.0).powi(2) / (n - 1.0);
    let denom = (k_corrected - 1.0).min(r_corrected - 1.0);
    if denom <= 0.0 {
        return 0.0;
    }
    (phi2_corrected / denom).sqrt().min(1.0)
}

/// Wilson–Hilferty normal approximation of a chi-square statistic
pub fn chi_square_z(chi_square: f64, df: usize) -> f64 {
    if df == 0 {
        return 0.0;
    }
    let k = df as f64;
    let v = 2.0 / (9.0 * k);
    ((chi_square / k).cbrt() - (1.0 - v)) / v.sqrt()
}

/// P(Z > z) for a standard normal
pub fn normal_upper_tail(z: f64) -> f64 {
    0.5 * libm::erfc(z / std::f64::consts::SQRT_2)
}
