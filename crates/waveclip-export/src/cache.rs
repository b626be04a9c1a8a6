//! Render and artifact caching.
//!
//! The cache holds at most one rendered buffer: the one matching the most
//! recent parameter set. Encoded artifacts (WAV/MP3 bytes) hang off that
//! buffer, keyed by container and bitrate, and are dropped wholesale the
//! moment a render with different parameters lands.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use waveclip_core::{AudioData, EffectParameters};
use waveclip_render::{render, RenderedBuffer};

use crate::error::Result;
use crate::options::Container;

/// Cache key for an encoded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub container: Container,
    /// Bitrate in kbps; 0 for lossless containers.
    pub bitrate_kbps: u32,
}

impl ArtifactKey {
    pub fn new(container: Container, bitrate_kbps: u32) -> Self {
        let bitrate_kbps = match container {
            Container::Wav => 0,
            Container::Mp3 => bitrate_kbps,
        };
        Self {
            container,
            bitrate_kbps,
        }
    }
}

/// Encoded bytes tied to the render they were produced from.
#[derive(Debug)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub container: Container,
    /// Fingerprint of the parameters the underlying render used.
    pub params_fingerprint: u64,
}

/// Single-entry render cache with attached encoded artifacts.
#[derive(Debug, Default)]
pub struct RenderCache {
    last_params: Option<EffectParameters>,
    rendered: Option<Arc<RenderedBuffer>>,
    artifacts: HashMap<ArtifactKey, Arc<EncodedArtifact>>,
    renders_performed: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached render if `params` deep-equals the parameters it
    /// was produced with.
    pub fn lookup(&self, params: &EffectParameters) -> Option<Arc<RenderedBuffer>> {
        match (&self.last_params, &self.rendered) {
            (Some(cached), Some(buffer)) if cached == params => Some(Arc::clone(buffer)),
            _ => None,
        }
    }

    /// Installs a freshly rendered buffer.
    ///
    /// A buffer for a new parameter set supersedes the previous one and
    /// drops every artifact encoded from it. Re-installing a render of the
    /// parameters already cached keeps the artifacts, since they still
    /// describe the same audio.
    pub fn install(&mut self, params: EffectParameters, buffer: Arc<RenderedBuffer>) {
        if self.last_params.as_ref() != Some(&params) {
            if !self.artifacts.is_empty() {
                debug!("dropping {} stale encoded artifact(s)", self.artifacts.len());
            }
            self.artifacts.clear();
        }
        self.last_params = Some(params);
        self.rendered = Some(buffer);
    }

    /// Returns the cached render for `params`, rendering on a miss.
    ///
    /// On render failure the cache is left untouched, so the previous
    /// render (if any) stays valid.
    pub fn get_or_render(
        &mut self,
        source: &AudioData,
        params: &EffectParameters,
    ) -> Result<Arc<RenderedBuffer>> {
        if let Some(hit) = self.lookup(params) {
            debug!("render cache hit (fingerprint {:#018x})", hit.params_fingerprint);
            return Ok(hit);
        }
        let buffer = Arc::new(render(source, params)?);
        self.renders_performed += 1;
        debug!(
            "render cache miss, rendered {} frames (render #{})",
            buffer.audio.frame_count(),
            self.renders_performed
        );
        self.install(params.clone(), Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Looks up an encoded artifact for the current render.
    pub fn artifact(&self, key: &ArtifactKey) -> Option<Arc<EncodedArtifact>> {
        let current = self.rendered.as_ref()?;
        self.artifacts
            .get(key)
            .filter(|artifact| artifact.params_fingerprint == current.params_fingerprint)
            .map(Arc::clone)
    }

    /// Stores encoded bytes for the current render.
    ///
    /// Bytes produced from a render that has since been superseded are
    /// discarded rather than cached against the wrong audio.
    pub fn store_artifact(&mut self, key: ArtifactKey, artifact: Arc<EncodedArtifact>) {
        match &self.rendered {
            Some(current) if current.params_fingerprint == artifact.params_fingerprint => {
                self.artifacts.insert(key, artifact);
            }
            _ => debug!("discarding artifact encoded from a superseded render"),
        }
    }

    /// Number of actual renders performed (cache hits excluded).
    pub fn renders_performed(&self) -> u64 {
        self.renders_performed
    }
}
