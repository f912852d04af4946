use crate::data_handler::ReturnTable;
use analytics::metrics::pearson_correlation;
use serde::Serialize;

/// Pairwise Pearson correlations of daily returns.
///
/// Symmetric. The diagonal is exactly 1.0, except for a symbol whose returns
/// never vary: its whole row and column are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn from_returns(returns: &ReturnTable) -> Self {
        let n = returns.symbols.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            let column = &returns.columns[i];
            if pearson_correlation(column, column).is_finite() {
                values[i][i] = 1.0;
            }
            for j in i + 1..n {
                let c = pearson_correlation(&returns.columns[i], &returns.columns[j]);
                values[i][j] = c;
                values[j][i] = c;
            }
        }
        Self {
            symbols: returns.symbols.clone(),
            values,
        }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: Vec<Vec<f64>>) -> ReturnTable {
        ReturnTable {
            dates: Vec::new(),
            symbols: (0..columns.len()).map(|i| format!("S{i}")).collect(),
            columns,
        }
    }

    #[test]
    fn diagonal_is_one_and_matrix_is_symmetric() {
        let m = CorrelationMatrix::from_returns(&table(vec![
            vec![0.01, -0.02, 0.03, 0.0, 0.01],
            vec![0.02, -0.01, 0.01, 0.01, -0.01],
            vec![-0.01, 0.02, -0.02, 0.0, 0.005],
        ]));
        for i in 0..3 {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m.values[i][j], m.values[j][i]);
                assert!(m.values[i][j].abs() <= 1.0 + 1e-12);
            }
        }
        assert_eq!(m.get("S0", "S1"), Some(m.values[0][1]));
    }

    #[test]
    fn constant_symbol_is_nan_across_its_row() {
        let m = CorrelationMatrix::from_returns(&table(vec![
            vec![0.01, -0.02, 0.03],
            vec![0.0, 0.0, 0.0],
            vec![0.02, 0.01, -0.01],
        ]));
        assert!(m.values[1].iter().all(|v| v.is_nan()));
        assert!(m.values[0][1].is_nan() && m.values[2][1].is_nan());
        assert_eq!(m.values[0][0], 1.0);
    }
}
