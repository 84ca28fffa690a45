//! Fixed-parameter layered transform (55 -> 30 -> 15 -> 5, sigmoid after every layer).

use std::sync::{Arc, OnceLock};

use super::features::{FeatureVector, FEATURE_COUNT};
use super::mt19937::Mt19937;
use super::roles::{RoleId, ROLE_COUNT};

pub const DEFAULT_SEED: u32 = 42;
pub const HIDDEN_WIDTHS: [usize; 2] = [30, 15];

const PARAMETER_SCALE: f64 = 0.1;
const SIGMOID_INPUT_LIMIT: f64 = 500.0;

/// Logistic activation with the input clamped to avoid overflow in `exp`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x.clamp(-SIGMOID_INPUT_LIMIT, SIGMOID_INPUT_LIMIT)).exp())
}

/// Dense layer stored as an `inputs x outputs` row-major weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl DenseLayer {
    fn draw(rng: &mut Mt19937, inputs: usize, outputs: usize) -> Self {
        let weights = (0..inputs * outputs)
            .map(|_| rng.standard_normal() * PARAMETER_SCALE)
            .collect();
        let biases = (0..outputs)
            .map(|_| rng.standard_normal() * PARAMETER_SCALE)
            .collect();

        Self {
            inputs,
            outputs,
            weights,
            biases,
        }
    }

    pub fn weight(&self, input: usize, output: usize) -> f64 {
        self.weights[input * self.outputs + output]
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.inputs);
        (0..self.outputs)
            .map(|output| {
                let z: f64 = input
                    .iter()
                    .enumerate()
                    .map(|(row, value)| value * self.weight(row, output))
                    .sum();
                sigmoid(z + self.biases[output])
            })
            .collect()
    }
}

/// Per-role transform output in `(0, 100)`, indexed by catalog position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawScores([f64; ROLE_COUNT]);

impl RawScores {
    pub fn get(&self, role: RoleId) -> f64 {
        self.0[role.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Immutable parameter bundle for the three layers.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParameters {
    seed: u32,
    layers: [DenseLayer; 3],
}

impl TransformParameters {
    /// Draw every layer from a generator seeded with `seed`.
    ///
    /// Draw order is W1, b1, W2, b2, W3, b3.
    pub fn from_seed(seed: u32) -> Self {
        let mut rng = Mt19937::new(seed);
        let [first, second] = HIDDEN_WIDTHS;
        let layers = [
            DenseLayer::draw(&mut rng, FEATURE_COUNT, first),
            DenseLayer::draw(&mut rng, first, second),
            DenseLayer::draw(&mut rng, second, ROLE_COUNT),
        ];

        Self { seed, layers }
    }

    /// Process-wide parameters for [`DEFAULT_SEED`], built on first use.
    pub fn shared() -> Arc<TransformParameters> {
        static SHARED: OnceLock<Arc<TransformParameters>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Self::from_seed(DEFAULT_SEED)))
            .clone()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn layers(&self) -> &[DenseLayer; 3] {
        &self.layers
    }

    pub fn transform(&self, features: &FeatureVector) -> RawScores {
        let activations = self
            .layers
            .iter()
            .fold(features.as_slice().to_vec(), |input, layer| {
                layer.forward(&input)
            });

        let mut scores = [0.0; ROLE_COUNT];
        for (score, activation) in scores.iter_mut().zip(activations) {
            *score = activation * 100.0;
        }
        RawScores(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::features::{encode, LengthPolicy};
    use crate::scoring::questionnaire::QuestionnaireResponse;

    #[test]
    fn sigmoid_clamps_extreme_inputs() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(1e6).is_finite());
        assert_eq!(sigmoid(1e6), sigmoid(500.0));
        assert_eq!(sigmoid(-1e6), sigmoid(-500.0));
        assert!(sigmoid(-1e6) >= 0.0);
    }

    #[test]
    fn layer_shapes_follow_architecture() {
        let parameters = TransformParameters::from_seed(DEFAULT_SEED);
        let shapes: Vec<(usize, usize)> = parameters
            .layers()
            .iter()
            .map(|layer| (layer.inputs, layer.outputs))
            .collect();
        assert_eq!(shapes, vec![(55, 30), (30, 15), (15, 5)]);
        assert_eq!(parameters.layers()[0].weights.len(), 55 * 30);
        assert_eq!(parameters.layers()[2].biases().len(), 5);
    }

    #[test]
    fn first_weights_come_from_seeded_normals() {
        let parameters = TransformParameters::from_seed(DEFAULT_SEED);
        let first = &parameters.layers()[0];
        assert!((first.weight(0, 0) - 0.049_671_415_301_123_27).abs() < 1e-12);
        assert!((first.weight(0, 1) + 0.013_826_430_117_118_466).abs() < 1e-12);
    }

    #[test]
    fn shared_parameters_are_built_once() {
        let a = TransformParameters::shared();
        let b = TransformParameters::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, TransformParameters::from_seed(DEFAULT_SEED));
    }

    #[test]
    fn different_seeds_give_different_parameters() {
        assert_ne!(
            TransformParameters::from_seed(1),
            TransformParameters::from_seed(2)
        );
    }

    #[test]
    fn outputs_stay_strictly_inside_percentage_range() {
        let parameters = TransformParameters::shared();
        for fill in [0.0, 1.0, 1e9, -1e9] {
            let features = FeatureVector::from_slots(vec![fill; FEATURE_COUNT], LengthPolicy::Strict)
                .expect("exact length");
            let raw = parameters.transform(&features);
            for score in raw.as_slice() {
                assert!(*score > 0.0 && *score < 100.0, "{score}");
            }
        }

        let raw = parameters.transform(&encode(&QuestionnaireResponse::default()));
        assert_eq!(raw.as_slice().len(), ROLE_COUNT);
    }

    #[test]
    fn last_biases_and_empty_response_match_reference_draws() {
        let parameters = TransformParameters::from_seed(DEFAULT_SEED);
        let expected_biases = [
            -0.035_834_015_202_122_226,
            -0.064_754_180_563_515_92,
            0.074_419_197_149_993_68,
            -0.018_122_417_321_810_3,
            -0.064_937_303_832_142_6,
        ];
        for (actual, expected) in parameters.layers()[2].biases().iter().zip(expected_biases) {
            assert!((actual - expected).abs() < 1e-15, "{actual} vs {expected}");
        }

        let raw = parameters.transform(&encode(&QuestionnaireResponse::default()));
        let expected_raw = [
            51.690_966_170_963_89,
            46.027_723_460_316_054,
            53.678_923_494_127_915,
            54.356_041_493_478_32,
            42.730_774_254_675_42,
        ];
        for (actual, expected) in raw.as_slice().iter().zip(expected_raw) {
            assert!((actual - expected).abs() < 1e-9, "{actual} vs {expected}");
        }
    }
}
