//! Feed-forward network with stochastic back-propagation training.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::artifact;

/// Neuron weight rows are padded to this many floats so reductions can use
/// full SIMD lanes.
pub(crate) const WEIGHT_ALIGN: usize = 8;

pub(crate) fn pad_to_align(len: usize) -> usize {
    len.div_ceil(WEIGHT_ALIGN) * WEIGHT_ALIGN
}

/// One labelled training tile: a binarized input vector and its digit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSample {
    pub input: Vec<f32>,
    pub label: u8,
}

/// Training controls. Defaults match the production training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Upper bound on training epochs.
    pub epochs: u32,
    /// Per-update learning rate.
    pub learning_rate: f32,
    /// Where the training artifact is persisted.
    pub artifact_path: PathBuf,
    /// Cooperative stop: when set, training saves after the current epoch
    /// and exits.
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 1500,
            learning_rate: 0.005,
            artifact_path: PathBuf::from(artifact::DEFAULT_PATH),
            stop_flag: None,
        }
    }
}

/// One fully-connected layer. Each neuron row holds `inputs + 1` logical
/// weights (bias last) padded out to a multiple of [`WEIGHT_ALIGN`];
/// padding stays zero.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Layer {
    pub neurons: Vec<Vec<f32>>,
    pub inputs: usize,
}

impl Layer {
    pub fn random(neuron_count: usize, inputs: usize, rng: &mut StdRng) -> Self {
        let padded = pad_to_align(inputs + 1);
        let neurons = (0..neuron_count)
            .map(|_| {
                let mut weights: Vec<f32> =
                    (0..inputs + 1).map(|_| rng.gen_range(-0.5..0.5)).collect();
                weights.resize(padded, 0.0);
                weights
            })
            .collect();
        Self {
            neurons,
            inputs,
        }
    }

    /// Forward the layer; each neuron sums in index order so a given input
    /// always produces the same output.
    fn forward_into(&self, input: &[f32], output: &mut Vec<f32>) {
        let inputs = self.inputs;
        self.neurons
            .par_iter()
            .map(|weights| run_neuron(weights, input, inputs))
            .collect_into_vec(output);
    }
}

fn sigmoid(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}

/// Derivative of the sigmoid expressed through its output value.
fn sigmoid_diff(sigmoid_value: f32) -> f32 {
    sigmoid_value * (1.0 - sigmoid_value)
}

fn run_neuron(weights: &[f32], input: &[f32], inputs: usize) -> f32 {
    debug_assert!(weights.len() > inputs);
    debug_assert!(input.len() >= inputs);

    let mut sum = weights[inputs]; // bias
    for i in 0..inputs {
        sum += weights[i] * input[i];
    }
    sigmoid(sum)
}

fn update_weights(input: &[f32], multiplier: f32, weights: &mut [f32], inputs: usize) {
    for i in 0..inputs {
        weights[i] += input[i] * multiplier;
    }
    weights[inputs] += multiplier; // bias input is 1
}

/// Mutable training state; becomes a [`NeuralNetwork`] once training ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NetworkState {
    pub input_size: usize,
    pub output_choices: Vec<u8>,
    pub layers: Vec<Layer>,
    pub training_data: Vec<TrainingSample>,
}

impl NetworkState {
    fn initialize(training_data: Vec<TrainingSample>, rng: &mut StdRng) -> Self {
        let input_size = training_data[0].input.len();

        let mut output_choices: Vec<u8> =
            training_data.iter().map(|sample| sample.label).collect();
        output_choices.sort_unstable();
        output_choices.dedup();

        // One hidden layer of half the input size, one output layer with a
        // neuron per distinct label.
        let hidden = input_size / 2;
        let layers = vec![
            Layer::random(hidden, input_size, rng),
            Layer::random(output_choices.len(), hidden, rng),
        ];

        Self {
            input_size,
            output_choices,
            layers,
            training_data,
        }
    }

    fn forward(&self, input: &[f32], layer_outputs: &mut [Vec<f32>]) {
        debug_assert_eq!(layer_outputs.len(), self.layers.len());
        for l in 0..self.layers.len() {
            let (previous, current) = layer_outputs.split_at_mut(l);
            let source: &[f32] = if l == 0 { input } else { &previous[l - 1] };
            self.layers[l].forward_into(source, &mut current[0]);
        }
    }
}

/// A saved session can only continue if its shape matches the two-layer
/// topology the training loop assumes.
fn resumable(saved: &NetworkState) -> bool {
    saved.layers.len() == 2 && saved.layers[1].neurons.len() == saved.output_choices.len()
}

/// Feed-forward digit classifier.
///
/// The weight storage is immutable after construction, so inference may be
/// called from several threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    state: NetworkState,
}

impl NeuralNetwork {
    /// Train a new network by stochastic back-propagation.
    ///
    /// If an artifact with unconsumed training data exists at
    /// `config.artifact_path` the session resumes from it; otherwise a
    /// fresh network is initialized from `training_data` with weights
    /// drawn uniformly from [−0.5, 0.5). The artifact is persisted every
    /// 25 epochs and whenever the summed |δ| of an epoch drops below 1.
    /// The training set is dropped once training completes.
    pub fn train(training_data: Vec<TrainingSample>, config: &TrainConfig) -> Self {
        if training_data.is_empty() {
            return Self {
                state: NetworkState::default(),
            };
        }

        let mut state = match artifact::load(&config.artifact_path) {
            Ok(Some(saved)) if resumable(&saved) => {
                if saved.training_data.is_empty() {
                    // A finished session: nothing left to train on.
                    tracing::info!("artifact already trained; skipping training");
                    return Self { state: saved };
                }
                tracing::info!(
                    samples = saved.training_data.len(),
                    "resuming training from saved artifact"
                );
                saved
            }
            Ok(_) => {
                let mut rng = StdRng::from_entropy();
                NetworkState::initialize(training_data, &mut rng)
            }
            Err(error) => {
                tracing::warn!(%error, "ignoring malformed artifact; training fresh");
                let mut rng = StdRng::from_entropy();
                NetworkState::initialize(training_data, &mut rng)
            }
        };

        let mut layer_outputs: Vec<Vec<f32>> = vec![Vec::new(); state.layers.len()];
        let mut expected = vec![0.0f32; state.output_choices.len()];
        let mut hidden_deltas = vec![0.0f32; state.layers[0].neurons.len()];
        let mut output_deltas = vec![0.0f32; state.layers[1].neurons.len()];
        let learning_rate = config.learning_rate;

        for epoch in 0..config.epochs {
            let mut total_error = 0.0f32;

            // The training set is immutable during the epoch; samples are
            // swapped out one at a time so the layers can borrow mutably.
            for sample_index in 0..state.training_data.len() {
                let sample = std::mem::take(&mut state.training_data[sample_index]);
                state.forward(&sample.input, &mut layer_outputs);

                for (slot, &choice) in expected.iter_mut().zip(state.output_choices.iter()) {
                    *slot = if choice == sample.label { 1.0 } else { 0.0 };
                }

                // Output layer first.
                let hidden_outputs = &layer_outputs[0];
                let output_outputs = &layer_outputs[1];
                {
                    let output_layer = &mut state.layers[1];
                    for (y, weights) in output_layer.neurons.iter_mut().enumerate() {
                        let delta =
                            (expected[y] - output_outputs[y]) * sigmoid_diff(output_outputs[y]);
                        output_deltas[y] = delta;
                        total_error += delta.abs();
                        update_weights(
                            hidden_outputs,
                            learning_rate * delta,
                            weights,
                            output_layer.inputs,
                        );
                    }
                }

                // Hidden layer, fanned out per neuron.
                let (hidden_layer, output_layer) = {
                    let (head, tail) = state.layers.split_at_mut(1);
                    (&mut head[0], &tail[0])
                };
                let hidden_inputs = hidden_layer.inputs;
                hidden_deltas
                    .par_iter_mut()
                    .zip(hidden_layer.neurons.par_iter_mut())
                    .enumerate()
                    .for_each(|(y, (delta_slot, weights))| {
                        let mut delta = 0.0f32;
                        for (z, &output_delta) in output_deltas.iter().enumerate() {
                            delta += output_delta * output_layer.neurons[z][y];
                        }
                        delta *= sigmoid_diff(hidden_outputs[y]);
                        update_weights(
                            &sample.input,
                            learning_rate * delta,
                            weights,
                            hidden_inputs,
                        );
                        *delta_slot = delta;
                    });

                state.training_data[sample_index] = sample;
            }

            tracing::info!(epoch, total_error, "trained epoch");

            let stop = config
                .stop_flag
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed));
            if total_error < 1.0 || (epoch != 0 && epoch % 25 == 0) || stop {
                if let Err(error) = artifact::save(&config.artifact_path, &state) {
                    tracing::warn!(%error, "could not persist classifier artifact");
                }
                if stop {
                    tracing::info!(epoch, "stop requested; saved and exiting training");
                    break;
                }
            }
        }

        state.training_data.clear();
        state.training_data.shrink_to_fit();
        Self { state }
    }

    /// Load a previously trained network from its artifact.
    ///
    /// `Ok(None)` means no artifact exists and the caller should train
    /// from scratch; errors indicate a malformed artifact.
    pub fn load(path: &std::path::Path) -> std::io::Result<Option<Self>> {
        Ok(artifact::load(path)?.map(|mut state| {
            state.training_data.clear();
            Self { state }
        }))
    }

    /// Persist the trained network (without training data).
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        artifact::save(path, &self.state)
    }

    /// Classify one input vector; the label of the arg-max output neuron.
    ///
    /// Returns 0 when the input length does not match the trained topology.
    pub fn run(&self, input: &[f32]) -> u8 {
        if input.len() != self.state.input_size || self.state.layers.is_empty() {
            return 0;
        }

        let mut layer_outputs: Vec<Vec<f32>> = vec![Vec::new(); self.state.layers.len()];
        self.state.forward(input, &mut layer_outputs);

        let outputs = match layer_outputs.last() {
            Some(outputs) if !outputs.is_empty() => outputs,
            _ => return 0,
        };
        let mut best = 0usize;
        for (i, &value) in outputs.iter().enumerate() {
            if value > outputs[best] {
                best = i;
            }
        }
        self.state.output_choices.get(best).copied().unwrap_or(0)
    }

    /// The input vector length this network was trained for.
    pub fn input_size(&self) -> usize {
        self.state.input_size
    }

    /// The labels this network can produce, ascending.
    pub fn output_choices(&self) -> &[u8] {
        &self.state.output_choices
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &NetworkState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(input: &[f32], label: u8) -> TrainingSample {
        TrainingSample {
            input: input.to_vec(),
            label,
        }
    }

    fn temp_artifact(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("sudogrid-net-{name}-{}.dat", std::process::id()));
        path
    }

    #[test]
    fn padding_rounds_up_to_eight() {
        assert_eq!(pad_to_align(1), 8);
        assert_eq!(pad_to_align(8), 8);
        assert_eq!(pad_to_align(9), 16);
        assert_eq!(pad_to_align(257), 264);
    }

    #[test]
    fn layer_rows_are_padded_and_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = Layer::random(4, 10, &mut rng);
        assert_eq!(layer.neurons.len(), 4);
        for weights in &layer.neurons {
            assert_eq!(weights.len(), 16);
            for &w in &weights[..11] {
                assert!((-0.5..0.5).contains(&w));
            }
            assert!(weights[11..].iter().all(|&w| w == 0.0));
        }
    }

    #[test]
    fn learns_a_linearly_separable_toy_problem() {
        let path = temp_artifact("toy");
        let _ = std::fs::remove_file(&path);

        let mut data = Vec::new();
        for _ in 0..40 {
            data.push(sample(&[1.0, 0.0, 1.0, 0.0], 1));
            data.push(sample(&[0.0, 1.0, 0.0, 1.0], 2));
        }
        let config = TrainConfig {
            epochs: 400,
            artifact_path: path.clone(),
            ..TrainConfig::default()
        };
        let network = NeuralNetwork::train(data, &config);

        assert_eq!(network.run(&[1.0, 0.0, 1.0, 0.0]), 1);
        assert_eq!(network.run(&[0.0, 1.0, 0.0, 1.0]), 2);
        // Wrong input size falls back to 0.
        assert_eq!(network.run(&[1.0, 0.0]), 0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn inference_is_deterministic() {
        let path = temp_artifact("det");
        let _ = std::fs::remove_file(&path);

        let data = vec![
            sample(&[0.0, 0.0, 1.0, 1.0], 3),
            sample(&[1.0, 1.0, 0.0, 0.0], 7),
        ];
        let config = TrainConfig {
            epochs: 50,
            artifact_path: path.clone(),
            ..TrainConfig::default()
        };
        let network = NeuralNetwork::train(data, &config);

        let first = network.run(&[0.0, 0.0, 1.0, 1.0]);
        for _ in 0..10 {
            assert_eq!(network.run(&[0.0, 0.0, 1.0, 1.0]), first);
        }

        let _ = std::fs::remove_file(&path);
    }
}
