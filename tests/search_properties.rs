//! Properties of the refined search on a fixed synthetic scene.

use gapmatch::{
    refine_search, trim_piece, BoundingBox, ScoreCache, SearchConfig, DEFAULT_ALPHA_THRESHOLD,
};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noisy_scene(seed: u64, width: u32, height: u32) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([
            rng.random_range(0..=255),
            rng.random_range(0..=255),
            rng.random_range(0..=255),
        ])
    })
}

/// Cuts an opaque piece out of `scene` with a transparent one-pixel frame.
fn framed_piece(scene: &RgbImage, x0: u32, y0: u32, size: u32) -> RgbaImage {
    RgbaImage::from_fn(size + 2, size + 2, |x, y| {
        if x == 0 || y == 0 || x == size + 1 || y == size + 1 {
            return Rgba([0, 0, 0, 0]);
        }
        let [r, g, b] = scene.get_pixel(x0 + x - 1, y0 + y - 1).0;
        Rgba([r, g, b, 255])
    })
}

fn exact_box(x0: u32, y0: u32, size: u32) -> BoundingBox {
    BoundingBox {
        left: x0,
        up: y0,
        right: x0 + size - 1,
        down: y0 + size - 1,
    }
}

#[test]
fn success_in_first_round_leaves_larger_radii_untouched() {
    let scene = noisy_scene(1, 90, 60);
    let piece = trim_piece(&framed_piece(&scene, 30, 20, 14), DEFAULT_ALPHA_THRESHOLD).unwrap();
    assert_eq!((piece.left, piece.up), (1, 1));
    let rough = exact_box(30, 20, 14);
    let cfg = SearchConfig::default();

    let mut cache = ScoreCache::new();
    let outcome = refine_search(&piece, &scene, rough, &cfg, &mut cache).unwrap();

    let best = outcome.best.expect("piece is in the scene");
    assert_eq!((best.x, best.y, best.radius), (30, 20, 3));
    assert!(best.score >= cfg.accept_score);
    assert_eq!(outcome.rounds(), 1);

    let first_window = rough.expand(3, 90, 60);
    assert_eq!(cache.len(), first_window.placements(14, 14).len());
    assert_eq!(outcome.evaluated, cache.len());
    assert!(cache.iter().all(|((x, y), _)| first_window.contains(x, y)));
}

#[test]
fn cache_is_reused_across_calls() {
    let scene = noisy_scene(2, 80, 50);
    let piece = trim_piece(&framed_piece(&scene, 25, 15, 12), DEFAULT_ALPHA_THRESHOLD).unwrap();
    let rough = exact_box(25, 15, 12);
    let cfg = SearchConfig::default();

    let mut cache = ScoreCache::new();
    let first = refine_search(&piece, &scene, rough, &cfg, &mut cache).unwrap();
    let snapshot = cache.clone();
    let second = refine_search(&piece, &scene, rough, &cfg, &mut cache).unwrap();

    assert_eq!(first.best, second.best);
    assert_eq!(second.evaluated, 0);
    assert_eq!(cache, snapshot);
}

#[test]
fn search_is_deterministic() {
    let scene = noisy_scene(3, 70, 50);
    let piece = trim_piece(&framed_piece(&scene, 40, 10, 10), DEFAULT_ALPHA_THRESHOLD).unwrap();
    let rough = BoundingBox {
        left: 36,
        up: 9,
        right: 52,
        down: 22,
    };
    let cfg = SearchConfig::default();

    let mut cache_a = ScoreCache::new();
    let mut cache_b = ScoreCache::new();
    let a = refine_search(&piece, &scene, rough, &cfg, &mut cache_a).unwrap();
    let b = refine_search(&piece, &scene, rough, &cfg, &mut cache_b).unwrap();
    assert_eq!(a, b);
    assert_eq!(cache_a, cache_b);
    assert_eq!(a.best.map(|c| (c.x, c.y)), Some((40, 10)));
}

#[test]
fn offset_rough_box_escalates_radius() {
    let scene = noisy_scene(4, 100, 70);
    let piece = trim_piece(&framed_piece(&scene, 50, 30, 12), DEFAULT_ALPHA_THRESHOLD).unwrap();
    // Shifted 8 px right and 6 px down: radius 3 and 5 windows miss the piece.
    let rough = exact_box(58, 36, 12);
    let cfg = SearchConfig::default();

    let mut cache = ScoreCache::new();
    let outcome = refine_search(&piece, &scene, rough, &cfg, &mut cache).unwrap();
    let best = outcome.best.expect("found after widening");
    assert_eq!((best.x, best.y, best.radius), (50, 30, 9));
    assert_eq!(outcome.rounds(), 3);
    // The third window is a superset of the first two, so nothing is scored twice.
    assert_eq!(outcome.evaluated, cache.len());
    assert_eq!(cache.len(), rough.expand(9, 100, 70).placements(12, 12).len());
}

#[test]
fn piece_absent_from_noise_exhausts_schedule() {
    let scene = noisy_scene(5, 60, 40);
    let piece = trim_piece(
        &RgbaImage::from_pixel(8, 8, Rgba([12, 200, 90, 255])),
        DEFAULT_ALPHA_THRESHOLD,
    )
    .unwrap();
    let rough = exact_box(20, 10, 8);
    let cfg = SearchConfig::default();

    let mut cache = ScoreCache::new();
    let outcome = refine_search(&piece, &scene, rough, &cfg, &mut cache).unwrap();
    assert!(outcome.best.is_none());
    assert_eq!(outcome.rounds(), cfg.radius_steps.len());
    assert!(cache.iter().all(|(_, score)| score < cfg.accept_score));
}

#[test]
fn piece_larger_than_background_finds_nothing() {
    let scene = noisy_scene(6, 10, 10);
    let piece = trim_piece(
        &RgbaImage::from_pixel(12, 4, Rgba([1, 1, 1, 255])),
        DEFAULT_ALPHA_THRESHOLD,
    )
    .unwrap();
    let mut cache = ScoreCache::new();
    let outcome = refine_search(
        &piece,
        &scene,
        BoundingBox::full(10, 10),
        &SearchConfig::default(),
        &mut cache,
    )
    .unwrap();
    assert!(outcome.best.is_none());
    assert!(cache.is_empty());
}

#[test]
fn custom_schedule_and_threshold_are_honored() {
    let scene = noisy_scene(7, 60, 40);
    let piece = trim_piece(&framed_piece(&scene, 20, 12, 10), DEFAULT_ALPHA_THRESHOLD).unwrap();
    let rough = exact_box(30, 12, 10);
    let cfg = SearchConfig {
        radius_steps: vec![2, 12],
        accept_score: 0.9,
        ..SearchConfig::default()
    };
    let mut cache = ScoreCache::new();
    let outcome = refine_search(&piece, &scene, rough, &cfg, &mut cache).unwrap();
    let best = outcome.best.expect("found in the wider window");
    assert_eq!((best.x, best.y, best.radius), (20, 12, 12));
}
