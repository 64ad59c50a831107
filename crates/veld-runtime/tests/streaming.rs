use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use veld_geom::Vec3;
use veld_mesh_cpu::ChunkMeshCPU;
use veld_runtime::{RenderHandle, RenderSink, StreamingManager, preload};
use veld_scatter::FeatureInstance;
use veld_world::{ChunkCoord, World, WorldGenConfig, WorldGenParams};

/// Records every upload and disposal so tests can assert the exactly-once
/// resource contract.
#[derive(Default)]
struct CountingSink {
    next: RenderHandle,
    uploads: Vec<ChunkCoord>,
    disposed: HashMap<RenderHandle, u32>,
    live: HashSet<RenderHandle>,
}

impl RenderSink for CountingSink {
    fn upload_chunk(
        &mut self,
        coord: ChunkCoord,
        _mesh: &ChunkMeshCPU,
        _features: &[FeatureInstance],
    ) -> RenderHandle {
        self.next += 1;
        self.uploads.push(coord);
        self.live.insert(self.next);
        self.next
    }

    fn dispose_chunk(&mut self, _coord: ChunkCoord, handle: RenderHandle) {
        *self.disposed.entry(handle).or_insert(0) += 1;
        self.live.remove(&handle);
    }
}

fn test_world(preload_section: &str) -> Arc<World> {
    let cfg: WorldGenConfig = toml::from_str(&format!(
        r#"
        [streaming]
        render_distance = 2

        {preload_section}

        [[biomes]]
        name = "Uniform"
        code = "Cfb"
        "#
    ))
    .unwrap();
    Arc::new(World::with_params(42, WorldGenParams::from_config(&cfg)))
}

const PRELOAD_NEAR: &str = "[preload]\nradius = 1";

#[test]
fn first_tick_loads_full_window() {
    let world = test_world("");
    let mut mgr = StreamingManager::new(Arc::clone(&world));
    let mut sink = CountingSink::default();

    mgr.tick(Vec3::new(0.0, 0.0, 0.0), &mut sink);

    assert_eq!(mgr.store().len(), 25);
    assert_eq!(sink.uploads.len(), 25);
    for coord in mgr.store().coords() {
        assert_eq!(coord.cy, 0);
        assert!(coord.cx.abs() <= 2 && coord.cz.abs() <= 2);
        let chunk = mgr.store().get(coord).unwrap();
        assert!(chunk.loaded);
        assert!(chunk.handle.is_some());
    }
}

#[test]
fn repeated_ticks_are_idempotent() {
    let world = test_world("");
    let mut mgr = StreamingManager::new(Arc::clone(&world));
    let mut sink = CountingSink::default();

    let pos = Vec3::new(10.0, 0.0, -7.0);
    mgr.tick(pos, &mut sink);
    let uploads_after_first = sink.uploads.len();
    mgr.tick(pos, &mut sink);
    mgr.tick(pos, &mut sink);

    assert_eq!(sink.uploads.len(), uploads_after_first);
    assert!(sink.disposed.is_empty());
}

#[test]
fn moving_unloads_stale_chunks_exactly_once() {
    let world = test_world("");
    let chunk_size = world.chunk_size as f32;
    let mut mgr = StreamingManager::new(Arc::clone(&world));
    let mut sink = CountingSink::default();

    mgr.tick(Vec3::new(0.0, 0.0, 0.0), &mut sink);
    // Step one chunk east: column cx = -2 leaves the window, cx = 3 enters.
    mgr.tick(Vec3::new(chunk_size, 0.0, 0.0), &mut sink);

    assert_eq!(mgr.store().len(), 25);
    assert_eq!(sink.uploads.len(), 30);
    assert_eq!(sink.disposed.len(), 5);
    for count in sink.disposed.values() {
        assert_eq!(*count, 1);
    }
    for coord in mgr.store().coords() {
        assert!((-1..=3).contains(&coord.cx));
    }
}

#[test]
fn missing_chunks_load_nearest_first() {
    let world = test_world("");
    let mut mgr = StreamingManager::new(Arc::clone(&world));
    let mut sink = CountingSink::default();

    mgr.tick(Vec3::new(0.0, 0.0, 0.0), &mut sink);

    let center = ChunkCoord::new(0, 0, 0);
    assert_eq!(sink.uploads[0], center);
    let mut last = 0i64;
    for coord in &sink.uploads {
        let d = coord.distance_sq(center);
        assert!(d >= last, "chunk {coord:?} uploaded out of distance order");
        last = d;
    }
}

#[test]
fn invalidate_all_disposes_every_resident_chunk() {
    let world = test_world("");
    let mut mgr = StreamingManager::new(Arc::clone(&world));
    let mut sink = CountingSink::default();

    mgr.tick(Vec3::new(0.0, 0.0, 0.0), &mut sink);
    mgr.invalidate_all(&mut sink);

    assert!(mgr.store().is_empty());
    assert!(sink.live.is_empty());
    assert_eq!(sink.disposed.len(), sink.uploads.len());
    for count in sink.disposed.values() {
        assert_eq!(*count, 1);
    }
}

#[test]
fn scatter_into_unloaded_chunk_is_refused() {
    let world = test_world("");
    let mut mgr = StreamingManager::new(world);
    assert!(!mgr.scatter_into(ChunkCoord::new(9, 0, 9)));
}

#[test]
fn preload_reports_progress_and_warms_streaming() {
    let world = test_world(PRELOAD_NEAR);
    let mut ticks = Vec::new();
    let cache = preload(&world, Vec3::ZERO, |done, total| ticks.push((done, total)));

    // Radius 1 around the spawn chunk is a 3x3 block.
    assert_eq!(ticks.len(), 9);
    assert_eq!(*ticks.last().unwrap(), (9, 9));
    assert_eq!(cache.len(), 9);
    for pre in cache.chunks.values() {
        assert_eq!(pre.worldgen_rev, world.worldgen_rev());
    }

    let mut mgr = StreamingManager::new(Arc::clone(&world));
    mgr.set_preloaded(cache);
    let mut sink = CountingSink::default();
    mgr.tick(Vec3::ZERO, &mut sink);

    // Every preloaded chunk sits inside the streaming window, so all of
    // them are claimed on the first tick.
    assert_eq!(mgr.preloaded_remaining(), 0);
    assert_eq!(mgr.store().len(), 25);
}

#[test]
fn preload_skips_uninteresting_biomes() {
    let world = test_world("[preload]\nradius = 1\ncodes = [\"ET\"]");
    let mut calls = 0;
    let cache = preload(&world, Vec3::ZERO, |_, _| calls += 1);

    // Progress still counts filtered chunks; the cache holds none of them.
    assert_eq!(calls, 9);
    assert!(cache.is_empty());
}

#[test]
fn preloaded_chunks_match_live_synthesis() {
    let world = test_world(PRELOAD_NEAR);
    let cache = preload(&world, Vec3::ZERO, |_, _| {});
    let sampler = world.make_sampler();

    for (coord, pre) in &cache.chunks {
        let live = veld_chunk::generate_chunk_terrain(&sampler, *coord, world.chunk_size);
        for (a, b) in pre.terrain.grid.raw().iter().zip(live.grid.raw().iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(pre.terrain.biome.name, live.biome.name);
    }
}
