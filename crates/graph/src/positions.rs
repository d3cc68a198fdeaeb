/// Gap kept between the last position and the canvas width, so that
/// truncating any position yields an in-bounds pixel index.
pub const LAST_PIXEL_MARGIN: f64 = 0.1;

/// Linear map from time to device-pixel x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMapping {
    pub range_start: f64,
    pub x_pixels_per_ms: f64,
    pub canvas_pixel_width: usize,
}

impl PixelMapping {
    /// Device-pixel x of `time`, clamped to `[0, width - LAST_PIXEL_MARGIN]`.
    #[inline]
    pub fn position(&self, time: f64) -> f64 {
        let last = self.canvas_pixel_width as f64 - LAST_PIXEL_MARGIN;
        ((time - self.range_start) * self.x_pixels_per_ms)
            .min(last)
            .max(0.0)
    }
}

/// Device-pixel positions of the visible samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecomputedPositions {
    /// Position of each visible sample.
    pub sample_positions: Vec<f64>,
    /// `halfway_positions[i]` sits halfway in time between sample `i - 1`
    /// and sample `i`; the extra trailing entry sits after the last sample.
    pub halfway_positions: Vec<f64>,
}

impl PrecomputedPositions {
    /// Compute positions for `sample_count` samples of `full_times`
    /// starting at `sample_index_offset`.
    ///
    /// Missing neighbours at either end of the full thread are synthesized
    /// one `interval` away.
    pub fn compute(
        full_times: &[f64],
        sample_index_offset: usize,
        sample_count: usize,
        interval: f64,
        mapping: &PixelMapping,
    ) -> Self {
        if sample_count == 0 {
            return Self::default();
        }

        let visible = &full_times[sample_index_offset..sample_index_offset + sample_count];
        let mut sample_positions = Vec::with_capacity(sample_count);
        let mut halfway_positions = Vec::with_capacity(sample_count + 1);

        let mut previous_time = match sample_index_offset {
            0 => visible[0] - interval,
            offset => full_times[offset - 1],
        };
        for &time in visible {
            halfway_positions.push(mapping.position((previous_time + time) / 2.0));
            sample_positions.push(mapping.position(time));
            previous_time = time;
        }

        let next_time = full_times
            .get(sample_index_offset + sample_count)
            .copied()
            .unwrap_or(previous_time + interval);
        halfway_positions.push(mapping.position((previous_time + next_time) / 2.0));

        Self {
            sample_positions,
            halfway_positions,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sample_positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sample_positions.is_empty()
    }
}
