//! Rectangles in background coordinates.

/// Inclusive pixel rectangle `[left, right] × [up, down]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Leftmost column.
    pub left: u32,
    /// Topmost row.
    pub up: u32,
    /// Rightmost column.
    pub right: u32,
    /// Bottom row.
    pub down: u32,
}

impl BoundingBox {
    /// Box covering a whole `width`×`height` image (both must be non-zero).
    pub fn full(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self {
            left: 0,
            up: 0,
            right: width - 1,
            down: height - 1,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.down - self.up + 1
    }

    /// Returns true if `(x, y)` lies inside the box.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x <= self.right && y >= self.up && y <= self.down
    }

    /// Returns true if the box fits a `width`×`height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.left <= self.right && self.up <= self.down && self.right < width && self.down < height
    }

    /// Grows the box by `step` on every side, clamped to the image.
    pub fn expand(&self, step: u32, width: u32, height: u32) -> Self {
        Self {
            left: self.left.saturating_sub(step),
            up: self.up.saturating_sub(step),
            right: self.right.saturating_add(step).min(width.saturating_sub(1)),
            down: self.down.saturating_add(step).min(height.saturating_sub(1)),
        }
    }

    /// Top-left offsets at which a `piece_w`×`piece_h` piece fits entirely
    /// inside the box, x-major in ascending order.
    pub fn placements(&self, piece_w: u32, piece_h: u32) -> Placements {
        let x_range = axis_range(self.left, self.right, piece_w);
        let y_range = axis_range(self.up, self.down, piece_h);
        Placements {
            x_range,
            y_range,
            next: x_range.zip(y_range).map(|((x0, _), (y0, _))| (x0, y0)),
        }
    }
}

/// Inclusive range of start positions for a span of `len` inside `[lo, hi]`.
fn axis_range(lo: u32, hi: u32, len: u32) -> Option<(u32, u32)> {
    if len == 0 || hi < lo || hi - lo + 1 < len {
        return None;
    }
    Some((lo, hi + 1 - len))
}

/// Iterator over candidate placements produced by [`BoundingBox::placements`].
#[derive(Clone, Debug)]
pub struct Placements {
    x_range: Option<(u32, u32)>,
    y_range: Option<(u32, u32)>,
    next: Option<(u32, u32)>,
}

impl Placements {
    /// Number of placements remaining.
    pub fn count_remaining(&self) -> usize {
        let (Some((_, x1)), Some((y0, y1)), Some((x, y))) = (self.x_range, self.y_range, self.next)
        else {
            return 0;
        };
        let per_column = (y1 - y0 + 1) as usize;
        (x1 - x) as usize * per_column + (y1 - y + 1) as usize
    }
}

impl Iterator for Placements {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let (_, x1) = self.x_range?;
        let (y0, y1) = self.y_range?;
        let (x, y) = current;
        self.next = if y < y1 {
            Some((x, y + 1))
        } else if x < x1 {
            Some((x + 1, y0))
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count_remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Placements {}

/// Raw sides reported by the rough profile scan.
///
/// A side is `None` when no qualifying window was found for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoughBounds {
    /// First qualifying column from the left.
    pub left: Option<u32>,
    /// First qualifying row from the top.
    pub up: Option<u32>,
    /// First qualifying column from the right.
    pub right: Option<u32>,
    /// First qualifying row from the bottom.
    pub down: Option<u32>,
}

impl RoughBounds {
    /// Returns true if every side was found.
    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.up.is_some() && self.right.is_some() && self.down.is_some()
    }

    /// Resolves the sides into a box inside a `width`×`height` image.
    ///
    /// Missing sides fall back to the image edge. An axis whose found sides
    /// are inverted spans the whole image.
    pub fn clamp(&self, width: u32, height: u32) -> BoundingBox {
        let (left, right) = clamp_axis(self.left, self.right, width);
        let (up, down) = clamp_axis(self.up, self.down, height);
        BoundingBox {
            left,
            up,
            right,
            down,
        }
    }
}

fn clamp_axis(lo: Option<u32>, hi: Option<u32>, len: u32) -> (u32, u32) {
    let max = len.saturating_sub(1);
    let lo = lo.unwrap_or(0).min(max);
    let hi = hi.unwrap_or(max).min(max);
    if lo > hi {
        (0, max)
    } else {
        (lo, hi)
    }
}
