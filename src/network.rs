//! Fixed-topology convolutional network and its forward-pass executor.
//!
//! The topology is declared as a table of [`LayerDesc`] entries rather
//! than imperative per-layer setup: each entry names the layer kind, its
//! shape, the activation, and where in the weight blob its parameters
//! live. One generic executor walks the table, so the topology can be
//! inspected and tested in isolation from the trained blob.
//!
//! Activation buffers use the channel-planar layout of the trained model:
//! `[channel][row][col]`, with `row_stride = width` and
//! `image_stride = width * height`. Convolution kernels are stored as
//! `[out_channel][in_channel][ky][kx]` and fully-connected weights as
//! `[output][input]` over the channel-planar flattening.

use crate::error::{RecognizerError, Result};
use crate::weights::{
    ParamView, WeightStore, CONV1_BIAS, CONV1_WEIGHTS, CONV2_BIAS, CONV2_WEIGHTS, FC1_BIAS,
    FC1_WEIGHTS, FC2_BIAS, FC2_WEIGHTS,
};

/// Side length of the square input image.
pub const INPUT_DIM: usize = 28;

/// Number of output classes.
pub const CLASS_COUNT: usize = 10;

/// Per-class raw scores (logits, no softmax).
pub type ScoreVector = [f32; CLASS_COUNT];

/// Activation applied to a layer's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// `max(0, x)`.
    Relu,
    /// Pass-through.
    Identity,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Identity => x,
        }
    }
}

/// What a layer computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// 2D convolution with explicit zero padding, stride 1.
    Conv {
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        padding: usize,
    },
    /// Non-overlapping max pooling.
    MaxPool { channels: usize, window: usize },
    /// Dense matrix-vector product plus bias.
    FullyConnected { in_size: usize, out_size: usize },
}

/// One entry of the declarative topology table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerDesc {
    pub kind: LayerKind,
    pub activation: Activation,
    /// Weight blob views; pooling layers carry no parameters.
    pub params: Option<(ParamView, ParamView)>,
}

/// The trained model's fixed six-layer topology.
pub const TOPOLOGY: [LayerDesc; 6] = [
    LayerDesc {
        kind: LayerKind::Conv {
            in_channels: 1,
            out_channels: 32,
            kernel: 5,
            padding: 2,
        },
        activation: Activation::Relu,
        params: Some((CONV1_WEIGHTS, CONV1_BIAS)),
    },
    LayerDesc {
        kind: LayerKind::MaxPool {
            channels: 32,
            window: 2,
        },
        activation: Activation::Identity,
        params: None,
    },
    LayerDesc {
        kind: LayerKind::Conv {
            in_channels: 32,
            out_channels: 64,
            kernel: 5,
            padding: 2,
        },
        activation: Activation::Relu,
        params: Some((CONV2_WEIGHTS, CONV2_BIAS)),
    },
    LayerDesc {
        kind: LayerKind::MaxPool {
            channels: 64,
            window: 2,
        },
        activation: Activation::Identity,
        params: None,
    },
    LayerDesc {
        kind: LayerKind::FullyConnected {
            in_size: 7 * 7 * 64,
            out_size: 1024,
        },
        activation: Activation::Relu,
        params: Some((FC1_WEIGHTS, FC1_BIAS)),
    },
    LayerDesc {
        kind: LayerKind::FullyConnected {
            in_size: 1024,
            out_size: CLASS_COUNT,
        },
        activation: Activation::Identity,
        params: Some((FC2_WEIGHTS, FC2_BIAS)),
    },
];

/// A layer with its parameters decoded out of the blob.
#[derive(Debug, Clone)]
struct CompiledLayer {
    desc: LayerDesc,
    weights: Vec<f32>,
    bias: Vec<f32>,
    /// Input plane side length for conv/pool layers.
    in_dim: usize,
}

/// Largest activation anywhere in the chain: conv1 output, 28×28×32.
const SCRATCH_LEN: usize = INPUT_DIM * INPUT_DIM * 32;

/// The compiled network plus its reusable scratch buffers.
///
/// Inference takes `&mut self` because the two ping-pong buffers are
/// reused across calls; exclusive access per instance is the concurrency
/// contract. Clone the network (weights are owned) for parallel callers.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<CompiledLayer>,
    scratch_a: Vec<f32>,
    scratch_b: Vec<f32>,
}

impl Network {
    /// Compile the fixed topology against a validated weight store.
    ///
    /// All parameter decoding happens here, once; inference never touches
    /// the blob again.
    ///
    /// # Errors
    ///
    /// Returns [`RecognizerError::DimensionMismatch`] if a decoded
    /// parameter array does not match the size its layer shape implies.
    pub fn compile(store: &WeightStore) -> Result<Self> {
        let mut layers = Vec::with_capacity(TOPOLOGY.len());
        let mut dim = INPUT_DIM;
        for desc in TOPOLOGY {
            let (weights, bias) = match desc.params {
                Some((weight_view, bias_view)) => {
                    (store.decode(weight_view), store.decode(bias_view))
                }
                None => (Vec::new(), Vec::new()),
            };
            check_param_sizes(&desc, &weights, &bias)?;
            layers.push(CompiledLayer {
                desc,
                weights,
                bias,
                in_dim: dim,
            });
            if let LayerKind::MaxPool { window, .. } = desc.kind {
                dim /= window;
            }
        }
        Ok(Self {
            layers,
            scratch_a: vec![0.0; SCRATCH_LEN],
            scratch_b: vec![0.0; SCRATCH_LEN],
        })
    }

    /// Run the forward pass over a 28×28 input in [0, 1].
    ///
    /// Deterministic and pure given fixed weights. The input length is a
    /// structural invariant of the pipeline; violating it means the
    /// deployment is broken, so it is asserted rather than surfaced as a
    /// per-call error.
    #[must_use]
    pub fn infer(&mut self, input: &[f32]) -> ScoreVector {
        assert_eq!(
            input.len(),
            INPUT_DIM * INPUT_DIM,
            "network input must be a 28x28 plane"
        );
        self.scratch_a[..input.len()].copy_from_slice(input);
        let mut current_len = input.len();
        let (mut source, mut target) = (&mut self.scratch_a, &mut self.scratch_b);

        for layer in &self.layers {
            current_len = run_layer(layer, &source[..current_len], &mut target[..]);
            std::mem::swap(&mut source, &mut target);
        }

        // After the final swap `source` holds the last layer's output.
        let mut scores = [0.0; CLASS_COUNT];
        scores.copy_from_slice(&source[..CLASS_COUNT]);
        scores
    }
}

fn check_param_sizes(desc: &LayerDesc, weights: &[f32], bias: &[f32]) -> Result<()> {
    let (expected_weights, expected_bias) = match desc.kind {
        LayerKind::Conv {
            in_channels,
            out_channels,
            kernel,
            ..
        } => (out_channels * in_channels * kernel * kernel, out_channels),
        LayerKind::MaxPool { .. } => (0, 0),
        LayerKind::FullyConnected { in_size, out_size } => (in_size * out_size, out_size),
    };
    if weights.len() != expected_weights {
        return Err(RecognizerError::DimensionMismatch {
            expected: expected_weights,
            actual: weights.len(),
        });
    }
    if bias.len() != expected_bias {
        return Err(RecognizerError::DimensionMismatch {
            expected: expected_bias,
            actual: bias.len(),
        });
    }
    Ok(())
}

/// Apply one layer, returning the number of valid output values.
fn run_layer(layer: &CompiledLayer, input: &[f32], output: &mut [f32]) -> usize {
    match layer.desc.kind {
        LayerKind::Conv {
            in_channels,
            out_channels,
            kernel,
            padding,
        } => conv2d(
            input,
            output,
            layer.in_dim,
            in_channels,
            out_channels,
            kernel,
            padding,
            &layer.weights,
            &layer.bias,
            layer.desc.activation,
        ),
        LayerKind::MaxPool { channels, window } => {
            max_pool(input, output, layer.in_dim, channels, window)
        }
        LayerKind::FullyConnected { in_size, out_size } => fully_connected(
            &input[..in_size],
            output,
            out_size,
            &layer.weights,
            &layer.bias,
            layer.desc.activation,
        ),
    }
}

/// Same-size 2D convolution with explicit zero padding, stride 1.
#[allow(clippy::too_many_arguments)]
fn conv2d(
    input: &[f32],
    output: &mut [f32],
    dim: usize,
    in_channels: usize,
    out_channels: usize,
    kernel: usize,
    padding: usize,
    weights: &[f32],
    bias: &[f32],
    activation: Activation,
) -> usize {
    let plane = dim * dim;
    for oc in 0..out_channels {
        for oy in 0..dim {
            for ox in 0..dim {
                let mut sum = bias[oc];
                for ic in 0..in_channels {
                    let in_plane = &input[ic * plane..(ic + 1) * plane];
                    let kernel_base = (oc * in_channels + ic) * kernel * kernel;
                    for ky in 0..kernel {
                        let iy = oy + ky;
                        if iy < padding || iy - padding >= dim {
                            continue;
                        }
                        let row = (iy - padding) * dim;
                        let kernel_row = kernel_base + ky * kernel;
                        for kx in 0..kernel {
                            let ix = ox + kx;
                            if ix < padding || ix - padding >= dim {
                                continue;
                            }
                            sum += in_plane[row + (ix - padding)] * weights[kernel_row + kx];
                        }
                    }
                }
                output[(oc * dim + oy) * dim + ox] = activation.apply(sum);
            }
        }
    }
    out_channels * plane
}

/// Non-overlapping max pooling over `window`×`window` blocks.
fn max_pool(input: &[f32], output: &mut [f32], dim: usize, channels: usize, window: usize) -> usize {
    let out_dim = dim / window;
    for c in 0..channels {
        for oy in 0..out_dim {
            for ox in 0..out_dim {
                let mut max_value = f32::NEG_INFINITY;
                for dy in 0..window {
                    for dx in 0..window {
                        let idx = (c * dim + oy * window + dy) * dim + ox * window + dx;
                        max_value = max_value.max(input[idx]);
                    }
                }
                output[(c * out_dim + oy) * out_dim + ox] = max_value;
            }
        }
    }
    channels * out_dim * out_dim
}

/// Dense matrix-vector product plus bias.
fn fully_connected(
    input: &[f32],
    output: &mut [f32],
    out_size: usize,
    weights: &[f32],
    bias: &[f32],
    activation: Activation,
) -> usize {
    let in_size = input.len();
    for (o, out_value) in output[..out_size].iter_mut().enumerate() {
        let row = &weights[o * in_size..(o + 1) * in_size];
        let mut sum = bias[o];
        for (value, weight) in input.iter().zip(row) {
            sum += value * weight;
        }
        *out_value = activation.apply(sum);
    }
    out_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::WEIGHT_BLOB_LEN;

    fn zero_store() -> WeightStore {
        WeightStore::from_bytes(vec![0u8; WEIGHT_BLOB_LEN]).unwrap()
    }

    /// Write one f32 into a raw blob at a view's element index.
    fn poke(blob: &mut [u8], view: ParamView, index: usize, value: f32) {
        let at = view.offset + index * 4;
        blob[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn test_topology_shape_chain() {
        // 28x28x1 -> 28x28x32 -> 14x14x32 -> 14x14x64 -> 7x7x64 -> 1024 -> 10
        let descs = TOPOLOGY;
        assert_eq!(descs.len(), 6);
        assert!(matches!(
            descs[4].kind,
            LayerKind::FullyConnected {
                in_size: 3136,
                out_size: 1024,
            }
        ));
        assert!(matches!(
            descs[5].kind,
            LayerKind::FullyConnected {
                in_size: 1024,
                out_size: CLASS_COUNT,
            }
        ));
        assert!(descs.iter().all(|d| {
            matches!(d.kind, LayerKind::MaxPool { .. }) == d.params.is_none()
        }));
    }

    #[test]
    fn test_zero_weights_yield_fc2_biases() {
        let mut blob = vec![0u8; WEIGHT_BLOB_LEN];
        for class in 0..CLASS_COUNT {
            poke(&mut blob, FC2_BIAS, class, class as f32 * 0.5);
        }
        let store = WeightStore::from_bytes(blob).unwrap();
        let mut network = Network::compile(&store).unwrap();
        let scores = network.infer(&vec![0.5; INPUT_DIM * INPUT_DIM]);
        for (class, &score) in scores.iter().enumerate() {
            assert!(
                (score - class as f32 * 0.5).abs() < 1e-6,
                "class {class} got {score}"
            );
        }
    }

    #[test]
    fn test_inference_is_deterministic() {
        let mut network = Network::compile(&zero_store()).unwrap();
        let input = vec![0.25; INPUT_DIM * INPUT_DIM];
        assert_eq!(network.infer(&input), network.infer(&input));
    }

    #[test]
    fn test_conv2d_identity_kernel_with_padding() {
        // A single 5x5 kernel with only the center tap set copies the
        // input plane through unchanged on a same-size output.
        let dim = 6;
        let input: Vec<f32> = (0..dim * dim).map(|i| i as f32).collect();
        let mut output = vec![0.0; dim * dim];
        let mut weights = vec![0.0; 25];
        weights[12] = 1.0; // center of the 5x5 kernel
        let produced = conv2d(
            &input,
            &mut output,
            dim,
            1,
            1,
            5,
            2,
            &weights,
            &[0.0],
            Activation::Identity,
        );
        assert_eq!(produced, dim * dim);
        assert_eq!(output, input);
    }

    #[test]
    fn test_conv2d_zero_padding_at_border() {
        // An off-center tap reads past the edge at the border and must
        // see zero there, not wraparound.
        let dim = 4;
        let input = vec![1.0; dim * dim];
        let mut output = vec![0.0; dim * dim];
        let mut weights = vec![0.0; 25];
        weights[0] = 1.0; // top-left tap: reads (y-2, x-2)
        conv2d(
            &input,
            &mut output,
            dim,
            1,
            1,
            5,
            2,
            &weights,
            &[0.0],
            Activation::Identity,
        );
        assert_eq!(output[0], 0.0, "corner reads entirely into the padding");
        assert_eq!(output[(2 * dim) + 2], 1.0, "interior reads the plane");
    }

    #[test]
    fn test_relu_clamps_negatives() {
        let dim = 2;
        let input = vec![1.0; dim * dim];
        let mut output = vec![0.0; dim * dim];
        let mut weights = vec![0.0; 25];
        weights[12] = -3.0;
        conv2d(
            &input,
            &mut output,
            dim,
            1,
            1,
            5,
            2,
            &weights,
            &[0.0],
            Activation::Relu,
        );
        assert!(output.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_max_pool_picks_window_maximum() {
        // One 4x4 channel pooled 2x2.
        let input = vec![
            1.0, 2.0, 5.0, 0.0, //
            3.0, 4.0, 1.0, 1.0, //
            0.0, 0.0, 9.0, 8.0, //
            0.0, 7.0, 6.0, 9.5, //
        ];
        let mut output = vec![0.0; 4];
        let produced = max_pool(&input, &mut output, 4, 1, 2);
        assert_eq!(produced, 4);
        assert_eq!(output, vec![4.0, 5.0, 7.0, 9.5]);
    }

    #[test]
    fn test_fully_connected_matrix_vector() {
        let input = [1.0, 2.0];
        let weights = [
            1.0, 0.0, // output 0 = x
            0.0, 1.0, // output 1 = y
            1.0, 1.0, // output 2 = x + y
        ];
        let bias = [0.0, 10.0, -5.0];
        let mut output = vec![0.0; 3];
        fully_connected(&input, &mut output, 3, &weights, &bias, Activation::Identity);
        assert_eq!(output, vec![1.0, 12.0, -2.0]);
    }

    #[test]
    fn test_fully_connected_relu() {
        let input = [1.0];
        let mut output = vec![0.0; 2];
        fully_connected(
            &input,
            &mut output,
            2,
            &[-4.0, 2.0],
            &[0.0, 0.0],
            Activation::Relu,
        );
        assert_eq!(output, vec![0.0, 2.0]);
    }

    #[test]
    fn test_compile_rejects_bad_view_size() {
        // A layer whose decoded parameters disagree with its shape is a
        // broken deployment and must fail compilation.
        let mut desc = TOPOLOGY[0];
        desc.params = Some((ParamView::new(0, 16), CONV1_BIAS));
        let store = zero_store();
        let weights = store.decode(ParamView::new(0, 16));
        let bias = store.decode(CONV1_BIAS);
        assert!(check_param_sizes(&desc, &weights, &bias).is_err());
    }

    #[test]
    fn test_single_bright_pixel_propagates() {
        // With an all-ones conv1 kernel on one channel, a lone bright
        // pixel must survive pooling as a positive activation.
        let mut blob = vec![0u8; WEIGHT_BLOB_LEN];
        for tap in 0..25 {
            poke(&mut blob, CONV1_WEIGHTS, tap, 1.0);
        }
        let store = WeightStore::from_bytes(blob).unwrap();
        let mut network = Network::compile(&store).unwrap();
        let mut input = vec![0.0; INPUT_DIM * INPUT_DIM];
        input[14 * INPUT_DIM + 14] = 1.0;
        // FC weights are all zero, so logits are all zero, but the run
        // must complete without NaN or panic.
        let scores = network.infer(&input);
        assert!(scores.iter().all(|s| s.is_finite()));
    }
}
