//! Debounced background pre-rendering.
//!
//! Parameter changes arrive faster than renders complete while the user is
//! dragging a slider. A single worker thread absorbs the stream: it waits
//! for a quiet period before rendering, and a generation counter lets it
//! discard results that newer changes have already obsoleted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use log::{debug, warn};
use parking_lot::Mutex;
use waveclip_core::{AudioData, EffectParameters};
use waveclip_render::render;

use crate::cache::RenderCache;

/// Quiet period before a scheduled render is started.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

enum Msg {
    Changed {
        generation: u64,
        params: EffectParameters,
    },
    Shutdown,
}

/// Worker thread that keeps the render cache warm.
///
/// At most one render runs at a time: the worker owns the rendering loop,
/// so a burst of schedule calls collapses into a single render of the
/// latest parameters once the debounce window closes.
pub struct BackgroundRenderer {
    tx: Sender<Msg>,
    generation: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl BackgroundRenderer {
    /// Spawns the worker with the default debounce window.
    pub fn spawn(source: Arc<AudioData>, cache: Arc<Mutex<RenderCache>>) -> Self {
        Self::spawn_with_debounce(source, cache, DEBOUNCE)
    }

    /// Spawns the worker with an explicit debounce window.
    pub fn spawn_with_debounce(
        source: Arc<AudioData>,
        cache: Arc<Mutex<RenderCache>>,
        debounce: Duration,
    ) -> Self {
        let (tx, rx) = unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let latest = Arc::clone(&generation);

        let thread = thread::Builder::new()
            .name("waveclip-prerender".to_string())
            .spawn(move || {
                let mut pending: Option<(u64, EffectParameters)> = None;
                loop {
                    let msg = match pending {
                        // A change is waiting: give newer ones a chance to
                        // supersede it before rendering.
                        Some(_) => match rx.recv_timeout(debounce) {
                            Ok(msg) => Some(msg),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        },
                        None => match rx.recv() {
                            Ok(msg) => Some(msg),
                            Err(_) => break,
                        },
                    };

                    match msg {
                        Some(Msg::Changed { generation, params }) => {
                            pending = Some((generation, params));
                        }
                        Some(Msg::Shutdown) => break,
                        None => {
                            // Debounce window elapsed without newer changes.
                            let (scheduled, params) = pending.take().unwrap();
                            if latest.load(Ordering::Acquire) != scheduled {
                                continue;
                            }
                            match render(&source, &params) {
                                Ok(buffer) => {
                                    // A change that arrived mid-render makes
                                    // this buffer stale; don't publish it.
                                    if latest.load(Ordering::Acquire) == scheduled {
                                        debug!("background render complete (generation {scheduled})");
                                        cache.lock().install(params, Arc::new(buffer));
                                    } else {
                                        debug!("discarding stale background render (generation {scheduled})");
                                    }
                                }
                                Err(err) => {
                                    warn!("background render failed: {err}");
                                }
                            }
                        }
                    }
                }
            })
            .expect("failed to spawn background render thread");

        Self {
            tx,
            generation,
            thread: Some(thread),
        }
    }

    /// Schedules a render of `params` after the debounce window.
    pub fn schedule(&self, params: EffectParameters) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let _ = self.tx.send(Msg::Changed { generation, params });
    }
}

impl Drop for BackgroundRenderer {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use waveclip_core::Region;

    fn source() -> Arc<AudioData> {
        Arc::new(AudioData::mono(8_000, vec![0.2; 8_000]).unwrap())
    }

    fn wait_for_render(cache: &Arc<Mutex<RenderCache>>, params: &EffectParameters) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cache.lock().lookup(params).is_some() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn renders_after_quiet_period() {
        let cache = Arc::new(Mutex::new(RenderCache::new()));
        let worker =
            BackgroundRenderer::spawn_with_debounce(source(), Arc::clone(&cache), Duration::from_millis(20));
        let params = EffectParameters::flat(Region::new(0.0, 1.0));
        worker.schedule(params.clone());
        assert!(wait_for_render(&cache, &params));
    }

    #[test]
    fn burst_of_changes_renders_only_latest() {
        let cache = Arc::new(Mutex::new(RenderCache::new()));
        let worker =
            BackgroundRenderer::spawn_with_debounce(source(), Arc::clone(&cache), Duration::from_millis(30));

        let mut last = EffectParameters::flat(Region::new(0.0, 1.0));
        for volume in [20.0, 40.0, 60.0, 80.0] {
            last.exported_volume_percent = volume;
            worker.schedule(last.clone());
        }
        assert!(wait_for_render(&cache, &last));

        // Intermediate values were superseded inside the debounce window.
        let mut intermediate = last.clone();
        intermediate.exported_volume_percent = 40.0;
        assert!(cache.lock().lookup(&intermediate).is_none());
    }

    #[test]
    fn shutdown_joins_cleanly() {
        let cache = Arc::new(Mutex::new(RenderCache::new()));
        let worker =
            BackgroundRenderer::spawn_with_debounce(source(), cache, Duration::from_millis(10));
        worker.schedule(EffectParameters::flat(Region::new(0.0, 0.5)));
        drop(worker);
    }
}
