// MotionCoach — Embedded Feed-Forward Network
//
// Fixed-topology network trained online on the device: forward pass,
// backpropagation, and gradient steps with momentum on the weights. Each layer
// transition owns its weight, momentum and bias storage; nothing is indexed
// through a shared flat array after construction.

use anyhow::{bail, ensure};

use crate::config::*;

// ---------------------------------------------------------------------------
// Activation functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Identity,
    Relu,
    /// Bounded leaky ReLU: identity on `[0, 1]`, slope [`RELU2_LEAK`] outside.
    Relu2,
    Sigmoid,
}

impl Activation {
    pub fn apply(self, z: f32) -> f32 {
        match self {
            Self::Identity => z,
            Self::Relu => z.max(0.0),
            Self::Relu2 => {
                if z > 1.0 {
                    1.0 + RELU2_LEAK * (z - 1.0)
                } else if z < 0.0 {
                    RELU2_LEAK * z
                } else {
                    z
                }
            }
            Self::Sigmoid => 1.0 / (1.0 + (-z).exp()),
        }
    }

    /// Derivative with respect to the pre-activation `z`.
    pub fn derivative(self, z: f32) -> f32 {
        match self {
            Self::Identity => 1.0,
            Self::Relu => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Relu2 => {
                if (0.0..=1.0).contains(&z) {
                    1.0
                } else {
                    RELU2_LEAK
                }
            }
            Self::Sigmoid => {
                let s = self.apply(z);
                s * (1.0 - s)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dense row-major matrix (rows = units of the next layer)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn from_row_major(rows: usize, cols: usize, data: &[f32]) -> anyhow::Result<Self> {
        ensure!(
            data.len() == rows * cols,
            "matrix {}x{} needs {} values, got {}",
            rows,
            cols,
            rows * cols,
            data.len()
        );
        Ok(Self {
            rows,
            cols,
            data: data.to_vec(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }
}

// ---------------------------------------------------------------------------
// Layer transition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Layer {
    weights: Matrix,
    /// Previous weight change, reused as the momentum term.
    dedw: Matrix,
    bias: Vec<f32>,
    activation: Activation,
    // Forward scratch
    pre: Vec<f32>,
    post: Vec<f32>,
}

impl Layer {
    fn new(weights: Matrix, bias: f32, activation: Activation) -> Self {
        let units = weights.rows();
        Self {
            dedw: Matrix::zeros(weights.rows(), weights.cols()),
            weights,
            bias: vec![bias; units],
            activation,
            pre: vec![0.0; units],
            post: vec![0.0; units],
        }
    }

    fn forward(&mut self, input: &[f32]) {
        for unit in 0..self.weights.rows() {
            let z: f32 = self
                .weights
                .row(unit)
                .iter()
                .zip(input)
                .map(|(w, a)| w * a)
                .sum::<f32>()
                + self.bias[unit];
            self.pre[unit] = z;
            self.post[unit] = self.activation.apply(z);
        }
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

pub struct Ann {
    topology: Vec<usize>,
    layers: Vec<Layer>,
    input: Vec<f32>,
    output: Vec<f32>,
    rates: LearningRates,
}

impl Ann {
    /// Build a network from a flattened weight preset: one row-major
    /// `next × prev` block per layer transition, in order. All biases start at
    /// `bias`; momentum and outputs start at zero.
    pub fn new(
        topology: &[usize],
        weights: &[f32],
        bias: f32,
        hidden: Activation,
        output: Activation,
        rates: LearningRates,
    ) -> anyhow::Result<Self> {
        ensure!(topology.len() >= 2, "topology needs at least 2 layers, got {}", topology.len());
        if let Some(i) = topology.iter().position(|&n| n == 0) {
            bail!("layer {} has no units", i);
        }

        let n_weights: usize = topology.windows(2).map(|w| w[0] * w[1]).sum();
        ensure!(
            weights.len() == n_weights,
            "topology {:?} needs {} weights, got {}",
            topology,
            n_weights,
            weights.len()
        );

        let transitions = topology.len() - 1;
        let mut layers = Vec::with_capacity(transitions);
        let mut offset = 0;
        for (t, pair) in topology.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            let block = Matrix::from_row_major(next, prev, &weights[offset..offset + prev * next])?;
            offset += prev * next;
            let activation = if t + 1 == transitions { output } else { hidden };
            layers.push(Layer::new(block, bias, activation));
        }

        let outputs = topology[topology.len() - 1];
        Ok(Self {
            topology: topology.to_vec(),
            layers,
            input: vec![0.0; topology[0]],
            output: vec![0.0; outputs],
            rates,
        })
    }

    /// The firmware network: `[6, 9, 6]`, preset weights, bias 0.5.
    pub fn preset(options: &SessionOptions) -> anyhow::Result<Self> {
        Self::new(
            &NETWORK_TOPOLOGY,
            &PRESET_WEIGHTS,
            INITIAL_BIAS,
            options.hidden_activation,
            options.output_activation,
            options.rates,
        )
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn inputs(&self) -> usize {
        self.topology[0]
    }

    pub fn outputs(&self) -> usize {
        self.output.len()
    }

    pub fn layer_count(&self) -> usize {
        self.topology.len()
    }

    pub fn rates(&self) -> LearningRates {
        self.rates
    }

    /// Output of the last forward pass.
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Weight from unit `col` of layer `transition` to unit `row` of layer
    /// `transition + 1`.
    pub fn weight(&self, transition: usize, row: usize, col: usize) -> Option<f32> {
        self.layers.get(transition)?.weights.get(row, col)
    }

    pub fn bias(&self, transition: usize, unit: usize) -> Option<f32> {
        self.layers.get(transition)?.bias.get(unit).copied()
    }

    /// Forward pass. Missing inputs read as zero, extra ones are ignored.
    pub fn run(&mut self, input: &[f32]) -> &[f32] {
        for (slot, v) in self.input.iter_mut().zip(input.iter().chain(std::iter::repeat(&0.0))) {
            *slot = *v;
        }

        for i in 0..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            let source: &[f32] = match done.last() {
                Some(prev) => &prev.post,
                None => &self.input,
            };
            rest[0].forward(source);
        }

        if let Some(last) = self.layers.last() {
            self.output.copy_from_slice(&last.post);
        }
        &self.output
    }

    /// One backpropagation step towards `target`.
    pub fn train(&mut self, input: &[f32], target: &[f32]) {
        self.run(input);

        // Deltas for every transition, computed against the pre-update weights.
        let mut deltas: Vec<Vec<f32>> = self.layers.iter().map(|l| vec![0.0; l.post.len()]).collect();

        let last = self.layers.len() - 1;
        {
            let layer = &self.layers[last];
            for (unit, delta) in deltas[last].iter_mut().enumerate() {
                let t = target.get(unit).copied().unwrap_or(0.0);
                *delta = (t - layer.post[unit]) * layer.activation.derivative(layer.pre[unit]);
            }
        }

        for l in (0..last).rev() {
            let (lower, upper) = deltas.split_at_mut(l + 1);
            let next = &self.layers[l + 1];
            let layer = &self.layers[l];
            for (unit, delta) in lower[l].iter_mut().enumerate() {
                let downstream: f32 = upper[0]
                    .iter()
                    .enumerate()
                    .map(|(k, d)| next.weights.row(k)[unit] * d)
                    .sum();
                *delta = layer.activation.derivative(layer.pre[unit]) * downstream;
            }
        }

        let LearningRates { eta, beta, alpha } = self.rates;
        for l in 0..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(l);
            let source: &[f32] = match done.last() {
                Some(prev) => &prev.post,
                None => &self.input,
            };
            let layer = &mut rest[0];

            for (unit, &delta) in deltas[l].iter().enumerate() {
                let momentum = layer.dedw.row_mut(unit);
                let weights = layer.weights.row_mut(unit);
                for ((w, m), &a) in weights.iter_mut().zip(momentum.iter_mut()).zip(source) {
                    let change = eta * delta * a + alpha * *m;
                    *w += change;
                    *m = change;
                }
                layer.bias[unit] += beta * delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tiny(hidden: Activation, output: Activation) -> Ann {
        // 2 -> 2 -> 1
        Ann::new(
            &[2, 2, 1],
            &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
            0.5,
            hidden,
            output,
            LearningRates { eta: 0.5, beta: 0.1, alpha: 0.25 },
        )
        .unwrap()
    }

    #[test]
    fn relu2_pairs_with_its_derivative() {
        let f = Activation::Relu2;
        assert_relative_eq!(f.apply(0.5), 0.5);
        assert_relative_eq!(f.apply(-2.0), -0.2);
        assert_relative_eq!(f.apply(3.0), 1.2);
        assert_relative_eq!(f.derivative(0.5), 1.0);
        assert_relative_eq!(f.derivative(-2.0), RELU2_LEAK);
        assert_relative_eq!(f.derivative(3.0), RELU2_LEAK);

        // Numeric check of the sigmoid pair.
        let s = Activation::Sigmoid;
        let h = 1e-3;
        let numeric = (s.apply(0.3 + h) - s.apply(0.3 - h)) / (2.0 * h);
        assert_relative_eq!(s.derivative(0.3), numeric, epsilon = 1e-3);
    }

    #[test]
    fn rejects_malformed_topology() {
        let rates = LearningRates::default();
        let a = Activation::Relu2;
        assert!(Ann::new(&[6], &[], 0.5, a, a, rates).is_err());
        assert!(Ann::new(&[6, 0, 6], &[], 0.5, a, a, rates).is_err());
        assert!(Ann::new(&[6, 9, 6], &[0.1; 100], 0.5, a, a, rates).is_err());
    }

    #[test]
    fn preset_has_firmware_shape() {
        let net = Ann::preset(&SessionOptions::default()).unwrap();
        assert_eq!(net.topology(), &[6, 9, 6]);
        assert_eq!(net.layer_count(), 3);
        assert_eq!(net.inputs(), 6);
        assert_eq!(net.outputs(), 6);
        assert_eq!(net.weight(0, 0, 0), Some(0.9829));
        assert_eq!(net.weight(0, 0, 5), Some(0.1269));
        assert_eq!(net.weight(0, 1, 0), Some(0.8128));
        assert_eq!(net.weight(1, 5, 8), Some(0.0));
        assert_eq!(net.weight(1, 6, 0), None);
        assert_eq!(net.weight(2, 0, 0), None);
        assert_eq!(net.bias(1, 5), Some(0.5));
        assert!(net.output().iter().all(|&o| o == 0.0));
    }

    #[test]
    fn forward_pass_matches_hand_computation() {
        let mut net = tiny(Activation::Identity, Activation::Identity);
        let out = net.run(&[1.0, 2.0]).to_vec();
        // hidden: [0.1+0.4+0.5, 0.3+0.8+0.5] = [1.0, 1.6]
        // output: 0.5*1.0 + 0.6*1.6 + 0.5 = 1.96
        assert_relative_eq!(out[0], 1.96, epsilon = 1e-6);
    }

    #[test]
    fn forward_pass_is_deterministic() {
        let mut net = Ann::preset(&SessionOptions::default()).unwrap();
        let input = [0.3, -0.5, 0.81, -0.2, 0.9, 0.38];
        let first = net.run(&input).to_vec();
        for _ in 0..5 {
            let again = net.run(&input).to_vec();
            assert_eq!(
                first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                again.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn single_step_applies_gradient_and_momentum() {
        let mut net = tiny(Activation::Identity, Activation::Identity);
        net.train(&[1.0, 2.0], &[1.0]);

        // Output delta = 1.0 - 1.96 = -0.96; hidden deltas = w * delta.
        let d_out = -0.96f32;
        let d_h0 = 0.5 * d_out;
        assert_relative_eq!(net.weight(1, 0, 0).unwrap(), 0.5 + 0.5 * d_out * 1.0, epsilon = 1e-5);
        assert_relative_eq!(net.weight(1, 0, 1).unwrap(), 0.6 + 0.5 * d_out * 1.6, epsilon = 1e-5);
        assert_relative_eq!(net.weight(0, 0, 1).unwrap(), 0.2 + 0.5 * d_h0 * 2.0, epsilon = 1e-5);
        assert_relative_eq!(net.bias(1, 0).unwrap(), 0.5 + 0.1 * d_out, epsilon = 1e-5);

        // Second step with a zero input: the gradient term vanishes for the
        // first layer and only momentum moves the weight.
        let before = net.weight(0, 0, 1).unwrap();
        let first_change = 0.5 * d_h0 * 2.0;
        net.train(&[0.0, 0.0], &[1.0]);
        assert_relative_eq!(net.weight(0, 0, 1).unwrap(), before + 0.25 * first_change, epsilon = 1e-5);
    }

    #[test]
    fn training_reduces_error() {
        let mut net = tiny(Activation::Relu2, Activation::Sigmoid);
        let input = [0.6, -0.8];
        let error = |net: &mut Ann| (0.9 - net.run(&input)[0]).abs();
        let before = error(&mut net);
        for _ in 0..200 {
            net.train(&input, &[0.9]);
        }
        assert!(error(&mut net) < before * 0.1);
    }
}
