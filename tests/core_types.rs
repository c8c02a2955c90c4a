use gapmatch::piece::trim_piece_rgba;
use gapmatch::{
    rough_locate, trim_piece, BoundingBox, GapMatchError, RoughBounds, RoughConfig,
    DEFAULT_ALPHA_THRESHOLD,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_side(rng: &mut StdRng, len: u32) -> Option<u32> {
    if rng.random_bool(0.25) {
        None
    } else {
        Some(rng.random_range(0..len + 10))
    }
}

#[test]
fn clamped_rough_bounds_stay_inside_image() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let width = rng.random_range(1..200);
        let height = rng.random_range(1..120);
        let rough = RoughBounds {
            left: random_side(&mut rng, width),
            up: random_side(&mut rng, height),
            right: random_side(&mut rng, width),
            down: random_side(&mut rng, height),
        };
        let b = rough.clamp(width, height);
        assert!(b.is_within(width, height), "{rough:?} -> {b:?}");

        let step = rng.random_range(0..30);
        assert!(b.expand(step, width, height).is_within(width, height));
    }
}

#[test]
fn rough_locator_output_clamps_inside_image() {
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..4 {
        let width = rng.random_range(20..60);
        let height = rng.random_range(20..50);
        let full = RgbImage::from_fn(width, height, |_, _| {
            Rgb([rng.random(), rng.random(), rng.random()])
        });
        let mut gap = full.clone();
        let (bx, by) = (rng.random_range(0..width - 10), rng.random_range(0..height - 10));
        for y in by..by + 10 {
            for x in bx..bx + 10 {
                gap.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let rough = rough_locate(&full, &gap, &RoughConfig::default()).unwrap();
        assert!(rough.clamp(width, height).is_within(width, height));
    }
}

#[test]
fn trimming_random_pieces_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let width = rng.random_range(1..24);
        let height = rng.random_range(1..24);
        let piece = RgbaImage::from_fn(width, height, |_, _| {
            let alpha = if rng.random_bool(0.2) { 255 } else { 0 };
            Rgba([rng.random(), rng.random(), rng.random(), alpha])
        });
        let Ok((left, up, once)) = trim_piece_rgba(&piece, DEFAULT_ALPHA_THRESHOLD) else {
            continue;
        };
        assert!(once.width() <= piece.width() && once.height() <= piece.height());
        assert!(left + once.width() <= piece.width());
        assert!(up + once.height() <= piece.height());

        let (left2, up2, twice) = trim_piece_rgba(&once, DEFAULT_ALPHA_THRESHOLD).unwrap();
        assert_eq!((left2, up2), (0, 0));
        assert_eq!(once, twice);

        let trimmed = trim_piece(&piece, DEFAULT_ALPHA_THRESHOLD).unwrap();
        assert_eq!(trimmed.mask.width(), trimmed.rgb.width());
        assert_eq!(trimmed.mask.height(), trimmed.rgb.height());
    }
}

#[test]
fn degenerate_piece_reports_original_size() {
    let piece = RgbaImage::from_pixel(7, 3, Rgba([10, 10, 10, 100]));
    assert_eq!(
        trim_piece(&piece, DEFAULT_ALPHA_THRESHOLD).err(),
        Some(GapMatchError::DegeneratePiece {
            width: 7,
            height: 3
        })
    );
}

#[test]
fn bounding_box_accessors() {
    let b = BoundingBox {
        left: 3,
        up: 4,
        right: 12,
        down: 6,
    };
    assert_eq!((b.width(), b.height()), (10, 3));
    assert!(b.contains(3, 6));
    assert!(!b.contains(13, 5));
    assert!(!b.is_within(12, 10));
}
