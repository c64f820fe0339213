//! Feed-forward activation network.
//!
//! Every neuron uses the same bipolar sigmoid. Parameters are exposed as one
//! flat vector (per layer: weights row by row, then biases) so second-order
//! optimizers can treat the network as a plain least-squares model.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayViewMut1};
use rand::Rng;

/// `f(x) = 2 / (1 + e^(-alpha x)) - 1`, with outputs in `(-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BipolarSigmoid {
    pub alpha: f64,
}

impl BipolarSigmoid {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn apply(&self, x: f64) -> f64 {
        2.0 / (1.0 + (-self.alpha * x).exp()) - 1.0
    }

    /// Derivative expressed through the function value `y = f(x)`.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        self.alpha * (1.0 - y * y) / 2.0
    }
}

/// Fully connected layer; `weights` is `(outputs, inputs)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

impl DenseLayer {
    pub fn zeros(inputs: usize, outputs: usize) -> Self {
        Self {
            weights: Array2::zeros((outputs, inputs)),
            biases: Array1::zeros(outputs),
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<DenseLayer>,
    activation: BipolarSigmoid,
}

impl Network {
    /// Builds a zero-initialised network, e.g. `Network::new(10, &[20], 2, ..)`.
    pub fn new(inputs: usize, hidden: &[usize], outputs: usize, activation: BipolarSigmoid) -> Self {
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(inputs);
        widths.extend_from_slice(hidden);
        widths.push(outputs);

        let layers = widths
            .windows(2)
            .map(|pair| DenseLayer::zeros(pair[0], pair[1]))
            .collect();

        Self { layers, activation }
    }

    /// Nguyen–Widrow initialisation.
    ///
    /// Weights are drawn from `[-0.5, 0.5)` and rescaled per neuron to norm
    /// `beta = 0.7 * outputs^(1 / inputs)`; biases are drawn from `[-beta, beta)`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for layer in &mut self.layers {
            let beta = 0.7 * (layer.outputs() as f64).powf(1.0 / layer.inputs() as f64);
            for (mut row, bias) in layer.weights.rows_mut().into_iter().zip(layer.biases.iter_mut()) {
                row.mapv_inplace(|_| rng.gen_range(-0.5..0.5));
                let norm = row.dot(&row).sqrt();
                if norm > 0.0 {
                    row.mapv_inplace(|w| beta * w / norm);
                }
                *bias = rng.gen_range(-beta..beta);
            }
        }
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn activation(&self) -> BipolarSigmoid {
        self.activation
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::inputs)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::outputs)
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(DenseLayer::parameter_count).sum()
    }

    pub fn compute(&self, input: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut activations = self.forward(input);
        activations.pop().unwrap_or_default()
    }

    /// Outputs of every layer, preceded by the input itself.
    pub fn forward(&self, input: ArrayView1<'_, f64>) -> Vec<Array1<f64>> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.to_owned());
        for layer in &self.layers {
            let net = match activations.last() {
                Some(previous) => layer.weights.dot(previous) + &layer.biases,
                None => layer.weights.dot(&input) + &layer.biases,
            };
            activations.push(net.mapv(|x| self.activation.apply(x)));
        }
        activations
    }

    /// Writes `d output[k] / d parameters` into `row`, given `forward` activations.
    pub fn output_gradient(
        &self,
        activations: &[Array1<f64>],
        output: usize,
        mut row: ArrayViewMut1<'_, f64>,
    ) {
        let last = self.layers.len() - 1;
        let mut delta = Array1::<f64>::zeros(self.layers[last].outputs());
        delta[output] = self
            .activation
            .derivative_from_output(activations[last + 1][output]);

        let mut end = self.parameter_count();
        for (index, layer) in self.layers.iter().enumerate().rev() {
            let start = end - layer.parameter_count();
            let split = start + layer.weights.len();
            let input = &activations[index];

            let mut weight_grad = row.slice_mut(s![start..split]);
            for (j, &d) in delta.iter().enumerate() {
                let offset = j * layer.inputs();
                for (i, &x) in input.iter().enumerate() {
                    weight_grad[offset + i] = d * x;
                }
            }
            row.slice_mut(s![split..end]).assign(&delta);

            if index > 0 {
                let back = layer.weights.t().dot(&delta);
                delta = back
                    * &activations[index].mapv(|y| self.activation.derivative_from_output(y));
            }
            end = start;
        }
    }

    pub fn parameters(&self) -> Array1<f64> {
        let mut flat = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
            flat.extend(layer.biases.iter().copied());
        }
        Array1::from(flat)
    }

    pub fn set_parameters(&mut self, params: ArrayView1<'_, f64>) {
        debug_assert_eq!(params.len(), self.parameter_count());
        let mut start = 0;
        for layer in &mut self.layers {
            let split = start + layer.weights.len();
            let end = split + layer.biases.len();
            for (w, &p) in layer.weights.iter_mut().zip(params.slice(s![start..split])) {
                *w = p;
            }
            layer.biases.assign(&params.slice(s![split..end]));
            start = end;
        }
    }
}
