use std::io::Write;

use veld::{ChunkCoord, ChunkMeshCPU, Engine, FeatureInstance, RenderHandle, RenderSink, Vec3};

#[derive(Default)]
struct NullSink {
    next: RenderHandle,
    uploads: usize,
    disposals: usize,
}

impl RenderSink for NullSink {
    fn upload_chunk(
        &mut self,
        _coord: ChunkCoord,
        _mesh: &ChunkMeshCPU,
        _features: &[FeatureInstance],
    ) -> RenderHandle {
        self.next += 1;
        self.uploads += 1;
        self.next
    }

    fn dispose_chunk(&mut self, _coord: ChunkCoord, _handle: RenderHandle) {
        self.disposals += 1;
    }
}

fn write_config(name: &str, body: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn default_engine_streams_the_full_window() {
    let mut engine = Engine::new(7);
    let mut sink = NullSink::default();
    engine.tick(Vec3::ZERO, &mut sink);

    // Default render distance is 4, a 9x9 window.
    assert_eq!(engine.streaming().store().len(), 81);
    assert_eq!(sink.uploads, 81);
    assert_eq!(sink.disposals, 0);
}

#[test]
fn same_seed_same_ground() {
    let a = Engine::new(1234);
    let b = Engine::new(1234);
    for i in 0..32 {
        let (wx, wz) = (i as f32 * 19.5, i as f32 * -41.0);
        assert_eq!(a.elevation_at(wx, wz).to_bits(), b.elevation_at(wx, wz).to_bits());
        assert_eq!(a.biome_name_at(wx, wz), b.biome_name_at(wx, wz));
    }

    let c = Engine::new(1235);
    let diverged = (0..32).any(|i| {
        let (wx, wz) = (i as f32 * 19.5, i as f32 * -41.0);
        a.elevation_at(wx, wz).to_bits() != c.elevation_at(wx, wz).to_bits()
    });
    assert!(diverged);
}

#[test]
fn forest_world_stays_within_its_height_bound() {
    let path = write_config(
        "veld-forest-test.toml",
        r#"
        [[biomes]]
        name = "Forest"
        code = "Cfb"
        "#,
    );
    let engine = Engine::from_config(99, &path).unwrap();

    assert_eq!(engine.biome_name_at(16.0, 16.0), "Forest");
    // Forest defaults: scale 1.0, amplitude 10.
    for j in 0..16 {
        for i in 0..16 {
            let h = engine.elevation_at(i as f32 * 7.0, j as f32 * 7.0);
            assert!((-10.0..=10.0).contains(&h), "elevation {h} out of bound");
        }
    }
}

#[test]
fn missing_config_is_an_error() {
    assert!(Engine::from_config(1, "/nonexistent/veld-worldgen.toml").is_err());
}

#[test]
fn watcher_winds_down_on_stop_and_drop() {
    let path = write_config(
        "veld-watch-test.toml",
        r#"
        [[biomes]]
        name = "Uniform"
        code = "Cfb"
        "#,
    );
    let mut engine = Engine::from_config(3, &path).unwrap();
    let mut sink = NullSink::default();

    engine.watch_config();
    // Re-watching replaces the previous watcher instead of stacking threads.
    engine.watch_config();
    engine.stop_watching();
    // With no live watcher there is no event channel to drain.
    assert!(!engine.process_config_events(&mut sink));

    engine.watch_config();
    drop(engine); // signals the remaining watcher thread
}

#[test]
fn preload_then_tick_consumes_the_cache() {
    let path = write_config(
        "veld-preload-test.toml",
        r#"
        [streaming]
        render_distance = 2

        [preload]
        radius = 2

        [[biomes]]
        name = "Uniform"
        code = "Cfb"
        "#,
    );
    let mut engine = Engine::from_config(5, &path).unwrap();
    let mut last = (0, 0);
    engine.preload_around(Vec3::ZERO, |done, total| last = (done, total));
    assert_eq!(last, (25, 25));

    let mut sink = NullSink::default();
    engine.tick(Vec3::ZERO, &mut sink);
    assert_eq!(engine.streaming().store().len(), 25);
    assert_eq!(engine.streaming().preloaded_remaining(), 0);
}
