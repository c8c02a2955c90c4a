//! Separable uniform (box) filter with reflected borders.
//!
//! Borders use half-sample symmetric reflection (`d c b a | a b c d`), which
//! keeps the filtered mean of a constant plane exactly constant.

/// Maps a possibly out-of-range index onto `[0, len)` by reflection.
///
/// Valid for offsets up to `len` past either edge.
fn reflect(idx: isize, len: usize) -> usize {
    let n = len as isize;
    let mut i = idx;
    if i < 0 {
        i = -i - 1;
    }
    if i >= n {
        i = 2 * n - i - 1;
    }
    i.clamp(0, n - 1) as usize
}

/// Averages `data` over a `size`×`size` window centered on every pixel.
///
/// `size` must be odd and no larger than either dimension.
pub(crate) fn uniform_filter(data: &[f64], width: usize, height: usize, size: usize) -> Vec<f64> {
    debug_assert_eq!(data.len(), width * height);
    debug_assert!(size % 2 == 1);
    let radius = (size / 2) as isize;
    let inv = 1.0 / size as f64;

    let mut horizontal = vec![0.0f64; data.len()];
    for y in 0..height {
        let row = &data[y * width..(y + 1) * width];
        let out = &mut horizontal[y * width..(y + 1) * width];
        for (x, slot) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for k in -radius..=radius {
                acc += row[reflect(x as isize + k, width)];
            }
            *slot = acc * inv;
        }
    }

    let mut out = vec![0.0f64; data.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for k in -radius..=radius {
                acc += horizontal[reflect(y as isize + k, height) * width + x];
            }
            out[y * width + x] = acc * inv;
        }
    }
    out
}
