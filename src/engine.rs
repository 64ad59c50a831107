use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, channel};

use veld_geom::Vec3;
use veld_runtime::{PreloadCache, RenderSink, StreamingManager, preload};
use veld_world::{ChunkCoord, World, load_params_from_path};

/// Top-level handle a host application drives once per frame. Owns the world
/// and the streaming manager, and optionally watches the worldgen config
/// file so edits reload without a restart.
pub struct Engine {
    world: Arc<World>,
    streaming: StreamingManager,
    config_path: Option<PathBuf>,
    config_events: Option<Receiver<()>>,
    watch_stop: Option<Arc<AtomicBool>>,
}

impl Engine {
    /// Engine over default worldgen parameters.
    pub fn new(seed: i32) -> Self {
        let world = Arc::new(World::new(seed));
        let streaming = StreamingManager::new(Arc::clone(&world));
        Self {
            world,
            streaming,
            config_path: None,
            config_events: None,
            watch_stop: None,
        }
    }

    /// Engine over parameters loaded from a TOML config file. The path is
    /// remembered for [`Engine::watch_config`].
    pub fn from_config(seed: i32, path: impl Into<PathBuf>) -> Result<Self, Box<dyn Error>> {
        let path = path.into();
        let params = load_params_from_path(&path)?;
        let world = Arc::new(World::with_params(seed, params));
        let streaming = StreamingManager::new(Arc::clone(&world));
        Ok(Self {
            world,
            streaming,
            config_path: Some(path),
            config_events: None,
            watch_stop: None,
        })
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn streaming(&self) -> &StreamingManager {
        &self.streaming
    }

    /// Builds the spawn-area chunks on a worker pool and hands them to the
    /// streaming manager so the first ticks serve from the warm cache.
    pub fn preload_around<F>(&mut self, spawn: Vec3, progress: F)
    where
        F: FnMut(usize, usize),
    {
        let cache: PreloadCache = preload(&self.world, spawn, progress);
        self.streaming.set_preloaded(cache);
    }

    /// One frame step: apply any pending config reload, then reconcile the
    /// resident chunk set around the player.
    pub fn tick(&mut self, player_pos: Vec3, sink: &mut dyn RenderSink) {
        self.process_config_events(sink);
        self.streaming.tick(player_pos, sink);
    }

    /// Spawns a watcher thread on the config file given at construction.
    /// Events are drained on the next [`Engine::tick`]. Replaces (and winds
    /// down) any previous watcher.
    pub fn watch_config(&mut self) {
        let Some(path) = self.config_path.clone() else {
            log::warn!("no worldgen config path to watch");
            return;
        };
        self.stop_watching();
        let (tx, rx) = channel::<()>();
        self.config_events = Some(rx);
        let stop = Arc::new(AtomicBool::new(false));
        self.watch_stop = Some(Arc::clone(&stop));
        std::thread::spawn(move || {
            use notify::{EventKind, RecursiveMode, Watcher};
            if let Ok(mut watcher) =
                notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                    if let Ok(event) = res {
                        match event.kind {
                            EventKind::Modify(_)
                            | EventKind::Create(_)
                            | EventKind::Remove(_)
                            | EventKind::Any => {
                                let _ = tx.send(());
                            }
                            _ => {}
                        }
                    }
                })
            {
                let _ = watcher.watch(&path, RecursiveMode::NonRecursive);
                while !stop.load(Ordering::Acquire) {
                    std::thread::sleep(std::time::Duration::from_millis(200));
                }
            }
        });
    }

    /// Signals the watcher thread (if any) to exit and detaches its event
    /// channel. Called automatically on drop.
    pub fn stop_watching(&mut self) {
        if let Some(stop) = self.watch_stop.take() {
            stop.store(true, Ordering::Release);
        }
        self.config_events = None;
    }

    /// Drains watcher events; on a change, reloads params, bumps the world
    /// revision, and disposes every resident chunk so the next tick rebuilds
    /// them under the new parameters. Returns true when a reload happened.
    pub fn process_config_events(&mut self, sink: &mut dyn RenderSink) -> bool {
        let changed = match &self.config_events {
            Some(rx) => rx.try_iter().count() > 0,
            None => false,
        };
        if !changed {
            return false;
        }
        let Some(path) = &self.config_path else {
            return false;
        };
        match load_params_from_path(path) {
            Ok(params) => {
                self.world.update_worldgen_params(params);
                self.streaming.invalidate_all(sink);
                log::info!("worldgen config reloaded from {}", path.display());
                true
            }
            Err(e) => {
                log::warn!("worldgen config reload failed ({}): {e}", path.display());
                false
            }
        }
    }

    /// Ground elevation under a world point (player ground clamping).
    pub fn elevation_at(&self, wx: f32, wz: f32) -> f32 {
        self.world.elevation_at(wx, wz)
    }

    /// Name of the biome governing a world point. Debug/HUD query.
    pub fn biome_name_at(&self, wx: f32, wz: f32) -> String {
        self.world.biome_at(wx, wz).name.clone()
    }

    pub fn chunk_at(&self, wx: f32, wz: f32) -> ChunkCoord {
        self.world.chunk_at(wx, wz)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_watching();
    }
}
