//! 1D difference profiles and the flat-window scan.

use image::GrayImage;

/// Sums a binary map over rows, one value per column.
pub fn column_profile(binary: &GrayImage) -> Vec<u32> {
    let mut out = vec![0u32; binary.width() as usize];
    for (x, _, p) in binary.enumerate_pixels() {
        out[x as usize] += p.0[0] as u32;
    }
    out
}

/// Sums a binary map over columns, one value per row.
pub fn row_profile(binary: &GrayImage) -> Vec<u32> {
    let mut out = vec![0u32; binary.height() as usize];
    for (_, y, p) in binary.enumerate_pixels() {
        out[y as usize] += p.0[0] as u32;
    }
    out
}

/// Predicate marking entry into the gap interior.
///
/// A window qualifies when all its values are at least `min_height` and they
/// differ by no more than `max_spread`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatWindow {
    /// Number of consecutive profile values inspected.
    pub window: usize,
    /// Smallest value every sample must reach.
    pub min_height: u32,
    /// Largest allowed `max - min` inside the window.
    pub max_spread: u32,
}

impl FlatWindow {
    fn qualifies(&self, values: &[u32]) -> bool {
        let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
            return false;
        };
        min >= self.min_height && max - min <= self.max_spread
    }

    /// Start index of the first qualifying window scanning forward.
    pub fn scan_forward(&self, profile: &[u32]) -> Option<usize> {
        if self.window == 0 {
            return None;
        }
        profile
            .windows(self.window)
            .position(|w| self.qualifies(w))
    }

    /// End index of the first qualifying window scanning backward.
    pub fn scan_backward(&self, profile: &[u32]) -> Option<usize> {
        if self.window == 0 {
            return None;
        }
        profile
            .windows(self.window)
            .rposition(|w| self.qualifies(w))
            .map(|start| start + self.window - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    const FLAT: FlatWindow = FlatWindow {
        window: 4,
        min_height: 7,
        max_spread: 7,
    };

    #[test]
    fn profiles_sum_binary_map() {
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(1, 0, Luma([1]));
        img.put_pixel(1, 2, Luma([1]));
        img.put_pixel(3, 2, Luma([1]));
        assert_eq!(column_profile(&img), vec![0, 2, 0, 1]);
        assert_eq!(row_profile(&img), vec![1, 0, 2]);
    }

    #[test]
    fn forward_scan_skips_ramps() {
        let profile = [0, 2, 5, 8, 20, 30, 31, 32, 33, 30, 4, 0];
        // The window starting at 4 spans 20..=32, too steep to count as flat.
        assert_eq!(FLAT.scan_forward(&profile), Some(5));
        assert_eq!(FLAT.scan_backward(&profile), Some(9));
    }

    #[test]
    fn low_plateau_does_not_qualify() {
        let profile = [6, 6, 6, 6, 6, 6];
        assert_eq!(FLAT.scan_forward(&profile), None);
        assert_eq!(FLAT.scan_backward(&profile), None);
    }

    #[test]
    fn short_profile_has_no_window() {
        assert_eq!(FLAT.scan_forward(&[40, 40, 40]), None);
        assert_eq!(FLAT.scan_backward(&[]), None);
    }

    #[test]
    fn single_window_profile_reports_both_edges() {
        let profile = [10, 12, 14, 16];
        assert_eq!(FLAT.scan_forward(&profile), Some(0));
        assert_eq!(FLAT.scan_backward(&profile), Some(3));
    }
}
