//! Export orchestration.
//!
//! The [`Exporter`] ties the pieces together: it owns the render cache and
//! the debounced background renderer, and serves export requests from the
//! cache wherever possible. An export with parameters the background worker
//! already rendered costs only the encode; one whose artifact is still
//! cached costs nothing at all.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use log::{debug, info, warn};
use parking_lot::Mutex;
use waveclip_core::{AudioData, EffectParameters};
use waveclip_render::RenderedBuffer;

use crate::background::BackgroundRenderer;
use crate::cache::{ArtifactKey, EncodedArtifact, RenderCache};
use crate::error::Result;
use crate::format::{mp3, wav};
use crate::handle::ExportHandle;
use crate::options::{derive_filename, Container};

/// Orchestrates rendering, caching, encoding, and delivery.
pub struct Exporter {
    source: Arc<AudioData>,
    source_name: String,
    cache: Arc<Mutex<RenderCache>>,
    background: BackgroundRenderer,
}

impl Exporter {
    /// Creates an exporter for a decoded source track.
    ///
    /// `source_name` seeds output filename derivation; it is usually the
    /// source file's name.
    pub fn new(source: Arc<AudioData>, source_name: impl Into<String>) -> Self {
        Self::with_debounce(source, source_name, crate::background::DEBOUNCE)
    }

    /// Creates an exporter with an explicit pre-render debounce window.
    pub fn with_debounce(
        source: Arc<AudioData>,
        source_name: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let cache = Arc::new(Mutex::new(RenderCache::new()));
        let background =
            BackgroundRenderer::spawn_with_debounce(Arc::clone(&source), Arc::clone(&cache), debounce);
        Self {
            source,
            source_name: source_name.into(),
            cache,
            background,
        }
    }

    pub fn source(&self) -> &Arc<AudioData> {
        &self.source
    }

    /// Notifies the exporter that edit parameters changed.
    ///
    /// Schedules a debounced background render so a subsequent export of
    /// the same parameters finds the buffer already cached.
    pub fn params_changed(&self, params: &EffectParameters) {
        self.background.schedule(params.clone());
    }

    /// Renders `params` synchronously (or returns the cached buffer).
    pub fn render_now(&self, params: &EffectParameters) -> Result<Arc<RenderedBuffer>> {
        let buffer = self.cache.lock().get_or_render(&self.source, params)?;
        Ok(buffer)
    }

    /// Exports synchronously, handing the encoded bytes and the derived
    /// filename to `deliver`. Returns the filename.
    pub fn export(
        &self,
        params: &EffectParameters,
        container: Container,
        override_name: Option<&str>,
        deliver: impl FnOnce(&[u8], &str),
    ) -> Result<String> {
        let (artifact, filename) = perform_export(
            &self.source,
            &self.cache,
            &self.source_name,
            params,
            container,
            override_name,
            &|_| {},
        )?;
        deliver(&artifact.bytes, &filename);
        Ok(filename)
    }

    /// Exports synchronously into `dir`, returning the written path.
    pub fn export_to_file(
        &self,
        params: &EffectParameters,
        container: Container,
        dir: &Path,
    ) -> Result<PathBuf> {
        let (artifact, filename) = perform_export(
            &self.source,
            &self.cache,
            &self.source_name,
            params,
            container,
            None,
            &|_| {},
        )?;
        let path = dir.join(filename);
        std::fs::write(&path, &artifact.bytes)?;
        info!("exported {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(path)
    }

    /// Starts a non-blocking export on a dedicated thread.
    ///
    /// Poll the returned handle for progress, or call
    /// [`ExportHandle::wait()`] to block for the output filename. `deliver`
    /// runs on the export thread once encoding finishes.
    pub fn export_async(
        &self,
        params: &EffectParameters,
        container: Container,
        override_name: Option<&str>,
        deliver: impl FnOnce(&[u8], &str) + Send + 'static,
    ) -> ExportHandle {
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let source_name = self.source_name.clone();
        let params = params.clone();
        let override_name = override_name.map(str::to_string);
        let (tx, rx) = bounded(64);

        let thread = thread::Builder::new()
            .name("waveclip-export".into())
            .spawn(move || {
                let (artifact, filename) = perform_export(
                    &source,
                    &cache,
                    &source_name,
                    &params,
                    container,
                    override_name.as_deref(),
                    &|fraction| {
                        let _ = tx.try_send(fraction); // drop if full, the poller will catch up
                    },
                )?;
                deliver(&artifact.bytes, &filename);
                Ok(filename)
            })
            .expect("failed to spawn export thread");

        ExportHandle::new(rx, thread)
    }
}

/// Share of the overall progress fraction attributed to rendering; the
/// remainder is encoding, which dominates on anything but a cache hit.
const RENDER_SPAN: f32 = 0.1;

fn perform_export(
    source: &Arc<AudioData>,
    cache: &Arc<Mutex<RenderCache>>,
    source_name: &str,
    params: &EffectParameters,
    container: Container,
    override_name: Option<&str>,
    on_progress: &dyn Fn(f32),
) -> Result<(Arc<EncodedArtifact>, String)> {
    params.validate(source.duration_seconds())?;
    let filename = derive_filename(source_name, override_name, container);

    on_progress(0.0);
    let buffer = cache.lock().get_or_render(source, params)?;
    on_progress(RENDER_SPAN);

    let key = ArtifactKey::new(container, params.bitrate_kbps);
    if let Some(artifact) = cache.lock().artifact(&key) {
        debug!("serving {} export of {filename} from artifact cache", container);
        on_progress(1.0);
        return Ok((artifact, filename));
    }

    let bytes = match container {
        Container::Wav => wav::encode_wav_memory(&buffer.audio)?,
        Container::Mp3 => encode_mp3_resilient(&buffer, params.bitrate_kbps, &|p| {
            on_progress(RENDER_SPAN + (1.0 - RENDER_SPAN) * p)
        })?,
    };
    on_progress(1.0);

    let artifact = Arc::new(EncodedArtifact {
        bytes,
        container,
        params_fingerprint: buffer.params_fingerprint,
    });
    cache.lock().store_artifact(key, Arc::clone(&artifact));
    Ok((artifact, filename))
}

/// Encodes MP3 on a dedicated thread, falling back to an in-place encode
/// if the thread cannot be spawned or dies mid-encode.
fn encode_mp3_resilient(
    buffer: &Arc<RenderedBuffer>,
    bitrate_kbps: u32,
    on_progress: &dyn Fn(f32),
) -> Result<Vec<u8>> {
    let (tx, rx) = bounded::<f32>(64);
    let worker_buffer = Arc::clone(buffer);
    let spawned = thread::Builder::new()
        .name("waveclip-mp3-encode".into())
        .spawn(move || {
            mp3::encode_mp3_memory(&worker_buffer.audio, bitrate_kbps, &|p| {
                let _ = tx.try_send(p);
            })
        });

    match spawned {
        Ok(handle) => {
            // The channel closes when the encoder thread exits, panicking
            // included, so this loop cannot outlive the encode.
            for p in rx.iter() {
                on_progress(p);
            }
            match handle.join() {
                Ok(result) => result,
                Err(_) => {
                    warn!("MP3 encode thread panicked, retrying synchronously");
                    mp3::encode_mp3_memory(&buffer.audio, bitrate_kbps, on_progress)
                }
            }
        }
        Err(err) => {
            warn!("could not spawn MP3 encode thread ({err}), encoding in place");
            mp3::encode_mp3_memory(&buffer.audio, bitrate_kbps, on_progress)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ExportStatus;
    use std::time::Instant;
    use waveclip_core::Region;

    fn source() -> Arc<AudioData> {
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44_100.0).sin() * 0.4)
            .collect();
        Arc::new(AudioData::mono(44_100, samples).unwrap())
    }

    fn exporter() -> Exporter {
        Exporter::with_debounce(source(), "take.flac", Duration::from_millis(10))
    }

    fn params() -> EffectParameters {
        EffectParameters::flat(Region::new(0.0, 1.0))
    }

    #[test]
    fn wav_export_delivers_bytes_and_filename() {
        let exporter = exporter();
        let mut delivered: Option<(usize, String)> = None;
        let filename = exporter
            .export(&params(), Container::Wav, None, |bytes, name| {
                delivered = Some((bytes.len(), name.to_string()));
            })
            .unwrap();
        assert_eq!(filename, "take.wav");
        let (len, name) = delivered.unwrap();
        assert_eq!(name, "take.wav");
        assert_eq!(len, 44 + 44_100 * 2);
    }

    #[test]
    fn repeated_export_reuses_render_and_artifact() {
        let exporter = exporter();
        let mut first = Vec::new();
        exporter
            .export(&params(), Container::Wav, None, |bytes, _| {
                first = bytes.to_vec();
            })
            .unwrap();
        let mut second = Vec::new();
        exporter
            .export(&params(), Container::Wav, None, |bytes, _| {
                second = bytes.to_vec();
            })
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(exporter.cache.lock().renders_performed(), 1);
    }

    #[test]
    fn params_changed_warms_cache_before_export() {
        let exporter = exporter();
        let params = params();
        exporter.params_changed(&params);

        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if exporter.cache.lock().lookup(&params).is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(exporter.cache.lock().lookup(&params).is_some());

        exporter
            .export(&params, Container::Wav, None, |_, _| {})
            .unwrap();
        // The export rode on the background render; no synchronous render
        // was needed.
        assert_eq!(exporter.cache.lock().renders_performed(), 0);
    }

    #[test]
    fn mp3_export_produces_stream() {
        let exporter = exporter();
        let mut bytes = Vec::new();
        let filename = exporter
            .export(&params(), Container::Mp3, None, |b, _| bytes = b.to_vec())
            .unwrap();
        assert_eq!(filename, "take.mp3");
        assert!(!bytes.is_empty());
        assert_eq!(bytes[0], 0xFF);
    }

    #[test]
    fn export_to_file_writes_derived_name() {
        let exporter = exporter();
        let dir = tempfile::tempdir().unwrap();
        let path = exporter
            .export_to_file(&params(), Container::Wav, dir.path())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "take.wav");
        assert!(path.exists());
    }

    #[test]
    fn render_now_returns_the_cached_buffer_on_repeat() {
        let exporter = exporter();
        let first = exporter.render_now(&params()).unwrap();
        let second = exporter.render_now(&params()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A subsequent export rides on the same render.
        exporter
            .export(&params(), Container::Wav, None, |_, _| {})
            .unwrap();
        assert_eq!(exporter.cache.lock().renders_performed(), 1);
    }

    #[test]
    fn async_export_completes_with_filename() {
        let exporter = exporter();
        let mut handle =
            exporter.export_async(&params(), Container::Wav, Some("mixdown"), |_, _| {});
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match handle.progress() {
                ExportStatus::Complete(name) => {
                    assert_eq!(name, "mixdown.wav");
                    break;
                }
                ExportStatus::Failed(e) => panic!("export failed: {e}"),
                _ if Instant::now() > deadline => panic!("export timed out"),
                _ => thread::sleep(Duration::from_millis(5)),
            }
        }
        // The terminal status sticks on later polls.
        assert_eq!(handle.progress(), ExportStatus::Complete("mixdown.wav".into()));
    }

    #[test]
    fn async_export_wait_returns_filename() {
        let exporter = exporter();
        let handle = exporter.export_async(&params(), Container::Mp3, None, |_, _| {});
        assert_eq!(handle.wait().unwrap(), "take.mp3");
    }

    #[test]
    fn invalid_region_is_rejected_before_encoding() {
        let exporter = exporter();
        let bad = EffectParameters::flat(Region::new(0.5, 9.0));
        assert!(exporter
            .export(&bad, Container::Wav, None, |_, _| {})
            .is_err());
    }
}
