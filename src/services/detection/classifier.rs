// Toy Trainable Classifier
// Small feed-forward net trained at runtime on the embedded SMS dataset

use ndarray::{Array, Array1, Array2, Axis, Dimension};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

use crate::models::{FeatureVector, FEATURE_COUNT};
use crate::services::detection::features::{extract_features, MinMaxBasis};

/// Labeled demo messages. Deliberately tiny: the classifier exists to show
/// how a model reaches a verdict, not to be production-accurate.
pub const TRAIN_SET: &[(&str, f64)] = &[
    // Scams
    ("Gagnez 100000 FCFA avec Wave cliquez ici", 1.0),
    ("Votre compte Orange Money sera suspendu, vérifiez maintenant", 1.0),
    ("Félicitations vous avez gagné un iPhone gratuit", 1.0),
    ("Cliquez sur ce lien pour recevoir votre prix", 1.0),
    ("Votre compte bancaire est bloqué, connectez-vous ici", 1.0),
    // Legitimate
    ("Salut on se voit demain à la réunion", 0.0),
    ("Ton colis est arrivé au bureau de poste", 0.0),
    ("Rappel de ta facture Senelec", 0.0),
    ("Je t'appelle après le travail", 0.0),
    ("RDV à 18h au restaurant", 0.0),
];

const HIDDEN_ONE: usize = 12;
const HIDDEN_TWO: usize = 8;
const EPOCHS: usize = 40;
const BATCH_SIZE: usize = 4;
const LEARNING_RATE: f64 = 0.01;
const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPS: f64 = 1e-8;

/// Fixed default seed so two runs on the same build score identically.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("training diverged: non-finite loss at epoch {epoch}")]
    Diverged { epoch: usize },
    #[error("training task failed: {0}")]
    TrainingTask(String),
}

// ============ Network ============

struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl DenseLayer {
    /// Glorot-uniform initialization, the default of the original demo's
    /// dense layers.
    fn glorot(rng: &mut StdRng, fan_in: usize, fan_out: usize) -> Self {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let weights =
            Array2::from_shape_fn((fan_in, fan_out), |_| rng.gen_range(-limit..limit));
        let bias = Array1::zeros(fan_out);
        Self { weights, bias }
    }
}

fn relu(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| v.max(0.0))
}

fn relu_mask(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })
}

fn sigmoid(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

struct AdamState<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> AdamState<D> {
    fn zeros_like(param: &Array<f64, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }

    fn update(&mut self, param: &mut Array<f64, D>, grad: &Array<f64, D>, step: i32) {
        self.m = &self.m * ADAM_BETA1 + grad * (1.0 - ADAM_BETA1);
        self.v = &self.v * ADAM_BETA2 + &grad.mapv(|g| g * g) * (1.0 - ADAM_BETA2);
        let m_hat = &self.m / (1.0 - ADAM_BETA1.powi(step));
        let v_hat = &self.v / (1.0 - ADAM_BETA2.powi(step));
        *param -= &(m_hat / (v_hat.mapv(f64::sqrt) + ADAM_EPS) * LEARNING_RATE);
    }
}

/// A trained network plus the scaling basis its inputs were fitted with.
pub struct TrainedModel {
    layers: [DenseLayer; 3],
    basis: MinMaxBasis,
}

impl TrainedModel {
    fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let z1 = x.dot(&self.layers[0].weights) + &self.layers[0].bias;
        let a1 = relu(&z1);
        let z2 = a1.dot(&self.layers[1].weights) + &self.layers[1].bias;
        let a2 = relu(&z2);
        let z3 = a2.dot(&self.layers[2].weights) + &self.layers[2].bias;
        sigmoid(&z3)
    }

    /// Suspicion probability in [0, 1] for one message's features.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let scaled = self.basis.apply(&features.to_array());
        let x = Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| scaled[j]);
        let p = self.forward(&x);
        p[[0, 0]].clamp(0.0, 1.0)
    }
}

fn batch_loss(p: &Array2<f64>, y: &Array2<f64>) -> f64 {
    let n = p.nrows() as f64;
    let mut total = 0.0;
    for (pi, yi) in p.iter().zip(y.iter()) {
        let pc = pi.clamp(1e-7, 1.0 - 1e-7);
        total -= yi * pc.ln() + (1.0 - yi) * (1.0 - pc).ln();
    }
    total / n.max(1.0)
}

/// Train the 7 -> 12 -> 8 -> 1 network on the embedded dataset. Runs the
/// full fixed schedule (40 epochs, batches of 4, Adam at 0.01) every call;
/// callers cache the result.
pub fn train_model(seed: u64) -> Result<TrainedModel, ClassifierError> {
    let rows: Vec<[f64; FEATURE_COUNT]> = TRAIN_SET
        .iter()
        .map(|(text, _)| extract_features(text).to_array())
        .collect();
    let basis = MinMaxBasis::fit(&rows);

    let n = rows.len();
    let x = Array2::from_shape_fn((n, FEATURE_COUNT), |(i, j)| basis.apply(&rows[i])[j]);
    let y = Array2::from_shape_fn((n, 1), |(i, _)| TRAIN_SET[i].1);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut layers = [
        DenseLayer::glorot(&mut rng, FEATURE_COUNT, HIDDEN_ONE),
        DenseLayer::glorot(&mut rng, HIDDEN_ONE, HIDDEN_TWO),
        DenseLayer::glorot(&mut rng, HIDDEN_TWO, 1),
    ];

    let mut w_states: Vec<AdamState<ndarray::Ix2>> =
        layers.iter().map(|l| AdamState::zeros_like(&l.weights)).collect();
    let mut b_states: Vec<AdamState<ndarray::Ix1>> =
        layers.iter().map(|l| AdamState::zeros_like(&l.bias)).collect();

    let mut step = 0;
    for epoch in 0..EPOCHS {
        let mut epoch_loss = 0.0;
        let mut batches: f64 = 0.0;

        let mut start = 0;
        while start < n {
            let end = (start + BATCH_SIZE).min(n);
            let xb = x.slice(ndarray::s![start..end, ..]).to_owned();
            let yb = y.slice(ndarray::s![start..end, ..]).to_owned();
            let batch_n = (end - start) as f64;

            // Forward pass, keeping pre-activations for the backward pass.
            let z1 = xb.dot(&layers[0].weights) + &layers[0].bias;
            let a1 = relu(&z1);
            let z2 = a1.dot(&layers[1].weights) + &layers[1].bias;
            let a2 = relu(&z2);
            let z3 = a2.dot(&layers[2].weights) + &layers[2].bias;
            let p = sigmoid(&z3);

            epoch_loss += batch_loss(&p, &yb);
            batches += 1.0;

            // Backward pass: binary cross-entropy through sigmoid.
            let dz3 = (&p - &yb) / batch_n;
            let dw3 = a2.t().dot(&dz3);
            let db3 = dz3.sum_axis(Axis(0));

            let dz2 = dz3.dot(&layers[2].weights.t()) * relu_mask(&z2);
            let dw2 = a1.t().dot(&dz2);
            let db2 = dz2.sum_axis(Axis(0));

            let dz1 = dz2.dot(&layers[1].weights.t()) * relu_mask(&z1);
            let dw1 = xb.t().dot(&dz1);
            let db1 = dz1.sum_axis(Axis(0));

            step += 1;
            w_states[0].update(&mut layers[0].weights, &dw1, step);
            b_states[0].update(&mut layers[0].bias, &db1, step);
            w_states[1].update(&mut layers[1].weights, &dw2, step);
            b_states[1].update(&mut layers[1].bias, &db2, step);
            w_states[2].update(&mut layers[2].weights, &dw3, step);
            b_states[2].update(&mut layers[2].bias, &db3, step);

            start = end;
        }

        let avg = epoch_loss / batches.max(1.0);
        if !avg.is_finite() {
            return Err(ClassifierError::Diverged { epoch });
        }
    }

    info!(seed, epochs = EPOCHS, "classifier trained");
    Ok(TrainedModel { layers, basis })
}

// ============ Cached Engine ============

/// Owns the trained model across calls. Training happens at most once per
/// engine unless `invalidate` is called; the fit loop runs on a blocking
/// worker so async callers are never stalled by it.
pub struct NeuralEngine {
    seed: u64,
    model: Option<TrainedModel>,
}

impl NeuralEngine {
    pub fn new(seed: u64) -> Self {
        Self { seed, model: None }
    }

    pub fn with_default_seed() -> Self {
        Self::new(DEFAULT_SEED)
    }

    /// Drop the cached model; the next score call retrains.
    pub fn invalidate(&mut self) {
        self.model = None;
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Train if needed, then predict for the given features.
    pub async fn score(
        &mut self,
        features: &FeatureVector,
    ) -> Result<f64, ClassifierError> {
        if self.model.is_none() {
            let seed = self.seed;
            let model = tokio::task::spawn_blocking(move || train_model(seed))
                .await
                .map_err(|e| ClassifierError::TrainingTask(e.to_string()))??;
            self.model = Some(model);
        }
        match &self.model {
            Some(model) => Ok(model.predict(features)),
            None => Err(ClassifierError::TrainingTask(
                "model missing after training".to_string(),
            )),
        }
    }
}

impl Default for NeuralEngine {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

// ============ Fallback Rule Score ============

/// Deterministic substitute used when training or prediction fails: a
/// weighted, per-term-capped sum over the raw feature vector.
pub fn fallback_rule_score(f: &FeatureVector) -> f64 {
    let mut score = 0.0;
    score += (f.keyword_hits * 0.18).min(0.54);
    score += f.url_flag * 0.25;
    score += (f.digit_count * 0.02).min(0.12);
    score += (f.exclamation_count * 0.05).min(0.15);
    score += (f.caps_token_count * 0.05).min(0.10);
    // Short message leaning on a scare word reads as more suspicious.
    if f.token_count < 8.0 && f.keyword_hits > 0.0 {
        score += 0.10;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_is_reproducible() {
        let a = train_model(DEFAULT_SEED).unwrap();
        let b = train_model(DEFAULT_SEED).unwrap();
        let features = extract_features("Gagnez un iPhone gratuit cliquez ici");
        assert_eq!(a.predict(&features), b.predict(&features));
    }

    #[test]
    fn test_predictions_are_probabilities() {
        let model = train_model(DEFAULT_SEED).unwrap();
        for (text, _) in TRAIN_SET {
            let p = model.predict(&extract_features(text));
            assert!((0.0..=1.0).contains(&p), "out of range for {text}: {p}");
        }
    }

    #[test]
    fn test_scam_scores_above_benign() {
        let model = train_model(DEFAULT_SEED).unwrap();
        let scam = model.predict(&extract_features(
            "Gagnez 100000 FCFA avec Wave cliquez ici",
        ));
        let benign = model.predict(&extract_features("Salut on se voit demain à la réunion"));
        assert!(scam > benign, "scam {scam} <= benign {benign}");
    }

    #[tokio::test]
    async fn test_engine_caches_and_invalidates() {
        let mut engine = NeuralEngine::with_default_seed();
        let features = extract_features("Cliquez sur ce lien pour recevoir votre prix");
        let first = engine.score(&features).await.unwrap();
        assert!(engine.is_trained());
        let second = engine.score(&features).await.unwrap();
        assert_eq!(first, second);
        engine.invalidate();
        assert!(!engine.is_trained());
        let third = engine.score(&features).await.unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn test_fallback_score_caps_at_one() {
        let loud = FeatureVector {
            token_count: 4.0,
            char_count: 60.0,
            digit_count: 12.0,
            url_flag: 1.0,
            exclamation_count: 6.0,
            caps_token_count: 4.0,
            keyword_hits: 5.0,
        };
        assert_eq!(fallback_rule_score(&loud), 1.0);
    }

    #[test]
    fn test_fallback_score_on_quiet_message() {
        let quiet = FeatureVector {
            token_count: 5.0,
            char_count: 24.0,
            ..Default::default()
        };
        assert_eq!(fallback_rule_score(&quiet), 0.0);
    }
}
