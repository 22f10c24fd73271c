use super::*;
use crate::foundation::core::Resolution;

fn small_config() -> StarfieldConfig {
    StarfieldConfig {
        output: Resolution::new(64, 48),
        canvas: Resolution::new(128, 96),
        star_count: 200,
        tunnel_length: 150.0,
        frame_count: 6,
        seed: 11,
        ..StarfieldConfig::default()
    }
}

struct FailingSink {
    fail_at: u64,
    pushed: Vec<u64>,
    ended: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> StarfieldResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &Frame) -> StarfieldResult<()> {
        if idx.0 == self.fail_at {
            return Err(StarfieldError::encode("disk full"));
        }
        self.pushed.push(idx.0);
        Ok(())
    }

    fn end(&mut self) -> StarfieldResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[test]
fn invalid_config_is_rejected_before_generation() {
    let cfg = StarfieldConfig {
        corridor_diameter: 2000.0,
        ..small_config()
    };
    assert!(Simulation::new(cfg).is_err());
}

#[test]
fn seeded_simulations_render_identical_frames() {
    let a = Simulation::new(small_config()).unwrap();
    let b = Simulation::new(small_config()).unwrap();
    assert_eq!(a.stars(), b.stars());

    let fa = a.render_frame(FrameIndex(0));
    let fb = b.render_frame(FrameIndex(0));
    assert_eq!(fa.as_raw(), fb.as_raw());
    assert!(fa.pixels().any(|p| p.0[0] > 0));
}

#[test]
fn injected_rng_matches_seeded_constructor() {
    let cfg = small_config();
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let injected = Simulation::with_rng(cfg.clone(), &mut rng).unwrap();
    let seeded = Simulation::new(cfg).unwrap();
    assert_eq!(injected.stars(), seeded.stars());
}

#[test]
fn frames_repeat_after_one_tunnel_period() {
    let sim = Simulation::new(small_config()).unwrap();
    let period = sim.config().period_frames().unwrap();
    assert_eq!(period, 300);

    for f in [0u64, 5, 17] {
        let a = sim.render_frame(FrameIndex(f));
        let b = sim.render_frame(FrameIndex(f + period));
        assert_eq!(a, b, "frame {f}");
    }
}

#[test]
fn consecutive_frames_differ() {
    let sim = Simulation::new(small_config()).unwrap();
    assert_ne!(
        sim.render_frame(FrameIndex(0)),
        sim.render_frame(FrameIndex(20))
    );
}

#[test]
fn sequential_and_parallel_ranges_match() {
    let sim = Simulation::new(small_config()).unwrap();
    let range = sim.full_range();

    let mut seq = crate::InMemorySink::new();
    let stats = sim
        .render_range(range, &RenderOpts::default(), &mut seq)
        .unwrap();
    assert_eq!(stats.frames_rendered, 6);
    assert!(seq.is_finished());

    let mut par = crate::InMemorySink::new();
    let opts = RenderOpts {
        parallel: true,
        chunk_size: 4,
        threads: Some(2),
    };
    sim.render_range(range, &opts, &mut par).unwrap();

    assert_eq!(seq.frames().len(), par.frames().len());
    for ((ia, a), (ib, b)) in seq.frames().iter().zip(par.frames()) {
        assert_eq!(ia, ib);
        assert_eq!(a, b);
    }
    assert_eq!(
        seq.config().map(|c| (c.width, c.height, c.frame_count)),
        Some((64, 48, 6))
    );
}

#[test]
fn sink_failure_stops_production() {
    let sim = Simulation::new(small_config()).unwrap();
    for opts in [
        RenderOpts::default(),
        RenderOpts {
            parallel: true,
            chunk_size: 2,
            threads: Some(2),
        },
    ] {
        let mut sink = FailingSink {
            fail_at: 2,
            pushed: Vec::new(),
            ended: false,
        };
        let err = sim
            .render_range(sim.full_range(), &opts, &mut sink)
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert_eq!(sink.pushed, vec![0, 1]);
        assert!(!sink.ended);
    }
}

#[test]
fn empty_range_and_zero_threads_are_rejected() {
    let sim = Simulation::new(small_config()).unwrap();
    let mut sink = crate::InMemorySink::new();
    assert!(
        sim.render_range(FrameRange::first(0), &RenderOpts::default(), &mut sink)
            .is_err()
    );

    let opts = RenderOpts {
        parallel: true,
        threads: Some(0),
        ..RenderOpts::default()
    };
    assert!(sim.render_range(sim.full_range(), &opts, &mut sink).is_err());
}
