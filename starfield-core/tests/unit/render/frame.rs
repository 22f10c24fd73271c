use super::*;

fn small_config() -> StarfieldConfig {
    StarfieldConfig {
        output: Resolution::new(32, 24),
        canvas: Resolution::new(64, 48),
        ..StarfieldConfig::default()
    }
}

fn star(x: f64, y: f64, z: f64) -> Star {
    Star { x, y, z, size: 1.0 }
}

#[test]
fn viewer_offset_wraps_at_tunnel_length() {
    let r = FrameRenderer::new(&StarfieldConfig::default());
    assert_eq!(r.viewer_offset(FrameIndex(0)), 0.0);
    assert_eq!(r.viewer_offset(FrameIndex(3)), 1.5);
    assert_eq!(r.viewer_offset(FrameIndex(3000)), 0.0);
    assert_eq!(r.viewer_offset(FrameIndex(3001)), 0.5);
    assert_eq!(viewer_offset(FrameIndex(7), 100.0, 250.0), 200.0);
}

#[test]
fn stars_at_or_ahead_of_viewer_wrap_behind() {
    let r = FrameRenderer::new(&StarfieldConfig::default());
    let behind = r.project(&star(100.0, 0.0, 40.0), 50.0);
    assert_eq!(behind.depth, 50.0 - 40.0 + 10.0);

    let level = r.project(&star(100.0, 0.0, 50.0), 50.0);
    assert_eq!(level.depth, 1500.0 + 10.0);

    let ahead = r.project(&star(100.0, 0.0, 60.0), 50.0);
    assert_eq!(ahead.depth, 50.0 - (60.0 - 1500.0) + 10.0);
}

#[test]
fn axis_star_projects_to_canvas_center() {
    let r = FrameRenderer::new(&StarfieldConfig::default());
    let p = r.project(&star(0.0, 0.0, 10.0), 20.0);
    assert_eq!((p.x, p.y), (1536.0, 1152.0));
    assert_eq!(p.distance, p.depth);
}

#[test]
fn corridor_wall_star_at_view_edge_hits_max_size() {
    let cfg = StarfieldConfig::default();
    let r = FrameRenderer::new(&cfg);
    let edge_depth = 10.0 * 100.0 / 7.5;
    let viewer = 200.0;
    let z = viewer + 10.0 - edge_depth;
    let p = r.project(&star(0.0, 50.0, z), viewer);

    assert!((p.depth - edge_depth).abs() < 1e-9);
    assert!((p.apparent_size - cfg.max_star_size).abs() < 1e-9);
    assert!((p.y - 1728.0).abs() < 1e-9);
    assert_eq!(p.x, 1536.0);
}

#[test]
fn apparent_size_falls_with_distance() {
    let r = FrameRenderer::new(&StarfieldConfig::default());
    let near = r.project(&star(60.0, 0.0, 95.0), 100.0);
    let far = r.project(&star(60.0, 0.0, 5.0), 100.0);
    assert!(near.apparent_size > far.apparent_size);
    assert!((near.apparent_size * near.distance - far.apparent_size * far.distance).abs() < 1e-6);
}

#[test]
fn culling_uses_half_the_apparent_size() {
    let p = Projection {
        x: -4.0,
        y: 10.0,
        depth: 1.0,
        distance: 1.0,
        apparent_size: 10.0,
    };
    assert!(p.is_visible(64.0, 48.0));
    let p = Projection { x: -5.5, ..p };
    assert!(!p.is_visible(64.0, 48.0));
    let p = Projection { x: 68.0, ..p };
    assert!(p.is_visible(64.0, 48.0));
    let p = Projection { y: 53.5, ..p };
    assert!(!p.is_visible(64.0, 48.0));
}

#[test]
fn single_star_lights_the_canvas_center_only() {
    let cfg = small_config();
    let r = FrameRenderer::new(&cfg);
    let sprites = SpriteCache::new(cfg.disc_canvas_size, cfg.disc_size);
    // On the axis, 300 units in front of the eye at frame 0.
    let field = StarField::from_stars(vec![star(0.0, 0.0, 1500.0 - 290.0)]);

    let (canvas, stats) = r.render_canvas(&field, &sprites, FrameIndex(0));
    assert_eq!(stats, FrameStats { drawn: 1, culled: 0 });
    assert_eq!(canvas.dimensions(), (64, 48));
    assert!(canvas.get_pixel(32, 24).0[0] > 200);
    assert_eq!(canvas.get_pixel(0, 0).0[0], 0);
    assert_eq!(canvas.get_pixel(63, 47).0[0], 0);

    let out = r.render(&field, &sprites, FrameIndex(0));
    assert_eq!(out.dimensions(), (32, 24));
    assert!(out.get_pixel(16, 12).0[0] > 100);
    assert_eq!(out.get_pixel(0, 0).0[0], 0);
}

#[test]
fn off_screen_star_is_culled() {
    let cfg = small_config();
    let r = FrameRenderer::new(&cfg);
    let sprites = SpriteCache::new(cfg.disc_canvas_size, cfg.disc_size);
    let field = StarField::from_stars(vec![star(400.0, 0.0, 1499.0)]);

    let (canvas, stats) = r.render_canvas(&field, &sprites, FrameIndex(0));
    assert_eq!(stats, FrameStats { drawn: 0, culled: 1 });
    assert!(canvas.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn overlapping_stars_saturate() {
    let cfg = small_config();
    let r = FrameRenderer::new(&cfg);
    let sprites = SpriteCache::new(cfg.disc_canvas_size, cfg.disc_size);
    let one = StarField::from_stars(vec![star(0.0, 0.0, 1210.0)]);
    let many = StarField::from_stars(vec![star(0.0, 0.0, 1210.0); 4]);

    let (a, _) = r.render_canvas(&one, &sprites, FrameIndex(0));
    let (b, _) = r.render_canvas(&many, &sprites, FrameIndex(0));
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        assert_eq!(u32::from(pb.0[0]), (u32::from(pa.0[0]) * 4).min(255));
    }
}

#[test]
fn empty_field_renders_black() {
    let cfg = small_config();
    let r = FrameRenderer::new(&cfg);
    let sprites = SpriteCache::new(cfg.disc_canvas_size, cfg.disc_size);
    let out = r.render(&StarField::default(), &sprites, FrameIndex(12));
    assert_eq!(out.dimensions(), (32, 24));
    assert!(out.pixels().all(|p| p.0[0] == 0));
}
