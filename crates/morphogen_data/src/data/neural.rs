use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Fixed-topology controller: one hidden layer, dense weights.
///
/// `weights_ih` is `hidden_size` rows of `input_size` columns and
/// `weights_ho` is `output_size` rows of `hidden_size` columns. The shape
/// must hold after every mutation and crossover.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct NeuralGenome {
    #[serde(alias = "input_size")]
    pub input_size: usize,
    #[serde(alias = "hidden_size")]
    pub hidden_size: usize,
    #[serde(alias = "output_size")]
    pub output_size: usize,
    #[serde(default, alias = "weights_ih")]
    pub weights_ih: Vec<Vec<f64>>,
    #[serde(default, alias = "weights_ho")]
    pub weights_ho: Vec<Vec<f64>>,
    #[serde(default, alias = "biases_h")]
    pub biases_h: Vec<f64>,
    #[serde(default, alias = "biases_o")]
    pub biases_o: Vec<f64>,
}

impl NeuralGenome {
    /// All-zero genome with the declared shape.
    #[must_use]
    pub fn zeros(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            hidden_size,
            output_size,
            weights_ih: vec![vec![0.0; input_size]; hidden_size],
            weights_ho: vec![vec![0.0; hidden_size]; output_size],
            biases_h: vec![0.0; hidden_size],
            biases_o: vec![0.0; output_size],
        }
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.hidden_size * self.input_size
            + self.hidden_size
            + self.output_size * self.hidden_size
            + self.output_size
    }

    /// Whether every matrix and vector matches the declared sizes.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.weights_ih.len() == self.hidden_size
            && self.weights_ih.iter().all(|r| r.len() == self.input_size)
            && self.weights_ho.len() == self.output_size
            && self.weights_ho.iter().all(|r| r.len() == self.hidden_size)
            && self.biases_h.len() == self.hidden_size
            && self.biases_o.len() == self.output_size
    }

    /// Whether `other` has the same declared shape.
    #[must_use]
    pub fn same_shape(&self, other: &NeuralGenome) -> bool {
        self.input_size == other.input_size
            && self.hidden_size == other.hidden_size
            && self.output_size == other.output_size
    }

    /// Parameters in canonical order: input→hidden weights, hidden biases,
    /// hidden→output weights, output biases.
    pub fn params(&self) -> impl Iterator<Item = &f64> + '_ {
        self.weights_ih
            .iter()
            .flatten()
            .chain(self.biases_h.iter())
            .chain(self.weights_ho.iter().flatten())
            .chain(self.biases_o.iter())
    }

    /// Mutable parameters in the same order as [`NeuralGenome::params`].
    pub fn params_mut(&mut self) -> impl Iterator<Item = &mut f64> + '_ {
        self.weights_ih
            .iter_mut()
            .flatten()
            .chain(self.biases_h.iter_mut())
            .chain(self.weights_ho.iter_mut().flatten())
            .chain(self.biases_o.iter_mut())
    }

    /// Pads with zeros or truncates so that the genome matches its declared
    /// shape. Returns `true` if anything changed.
    pub fn conform_shape(&mut self) -> bool {
        if self.is_well_formed() {
            return false;
        }
        self.weights_ih.resize(self.hidden_size, Vec::new());
        for row in &mut self.weights_ih {
            row.resize(self.input_size, 0.0);
        }
        self.weights_ho.resize(self.output_size, Vec::new());
        for row in &mut self.weights_ho {
            row.resize(self.hidden_size, 0.0);
        }
        self.biases_h.resize(self.hidden_size, 0.0);
        self.biases_o.resize(self.output_size, 0.0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_is_well_formed() {
        let g = NeuralGenome::zeros(3, 4, 2);
        assert!(g.is_well_formed());
        assert_eq!(g.param_count(), 3 * 4 + 4 + 4 * 2 + 2);
        assert_eq!(g.params().count(), g.param_count());
    }

    #[test]
    fn test_conform_shape_repairs_truncated_payload() {
        let mut g = NeuralGenome::zeros(3, 4, 2);
        g.weights_ih[1].pop();
        g.biases_o.clear();
        assert!(!g.is_well_formed());
        assert!(g.conform_shape());
        assert!(g.is_well_formed());
        assert!(!g.conform_shape());
    }
}
