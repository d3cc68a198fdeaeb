//! Three-pass box blur approximating a Gaussian.
//!
//! The graph is smoothed with three successive box blurs. The same passes
//! applied to a unit impulse give the equivalent convolution kernel, which
//! the querier uses to recover how much one sample adds to one pixel.

/// Radii of the successive box-blur passes.
pub const BOX_BLUR_RADII: [usize; 3] = [3, 2, 2];

/// Combined radius of the box-blur passes, in device pixels.
pub const SMOOTHING_RADIUS: usize = 3 + 2 + 2;

/// Fixed convolution kernel equivalent to a sequence of box blurs.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingKernel {
    radius: usize,
    weights: Vec<f32>,
}

impl SmoothingKernel {
    /// Kernel for blur passes of the given radii. Its radius is their sum.
    pub fn new(box_blur_radii: &[usize]) -> Self {
        let radius: usize = box_blur_radii.iter().sum();
        let mut weights = vec![0.0; radius * 2 + 1];
        weights[radius] = 1.0;
        let mut scratch = vec![0.0; weights.len()];
        box_blur_passes(&mut weights, &mut scratch, box_blur_radii);
        Self { radius, weights }
    }

    /// Kernel of the blur applied to the activity graph.
    pub fn graph() -> Self {
        Self::new(&BOX_BLUR_RADII)
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weighted sum of `window` against the kernel. `window[k]` is the value
    /// `k - radius` pixels away from the pixel being evaluated.
    #[inline]
    pub fn dot(&self, window: &[f32]) -> f32 {
        self.weights
            .iter()
            .zip(window)
            .map(|(w, v)| w * v)
            .sum()
    }
}

/// Box-blur `src` into `dst` with a window of `2 * radius + 1`.
///
/// Values outside the slice count as zero, so pixels near either end lose
/// weight. Slices shorter than `radius` are copied unchanged.
pub fn box_blur_1d(src: &[f32], dst: &mut [f32], radius: usize) {
    debug_assert_eq!(src.len(), dst.len());
    if src.is_empty() {
        return;
    }
    if src.len() < radius {
        dst.copy_from_slice(src);
        return;
    }

    let diameter = (radius * 2 + 1) as f32;
    let mut total: f32 = src.iter().take(radius + 1).sum();
    dst[0] = total / diameter;

    for x in 1..src.len() {
        if x > radius {
            total -= src[x - radius - 1];
        }
        if let Some(entering) = src.get(x + radius) {
            total += entering;
        }
        dst[x] = total / diameter;
    }
}

/// Run one box blur per radius over `buffer`, ping-ponging with `scratch`.
/// The result always ends up in `buffer`.
pub fn box_blur_passes(buffer: &mut [f32], scratch: &mut [f32], radii: &[usize]) {
    let mut in_scratch = false;
    for &radius in radii {
        if in_scratch {
            box_blur_1d(scratch, buffer, radius);
        } else {
            box_blur_1d(buffer, scratch, radius);
        }
        in_scratch = !in_scratch;
    }
    if in_scratch {
        buffer.copy_from_slice(scratch);
    }
}
