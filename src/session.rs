//! Editing session: one decoded source track plus its export pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use waveclip_core::{AudioData, EffectParameters, EnvelopeSource, Region, RegionSource};
use waveclip_decode::Decoder;
use waveclip_export::{Container, ExportHandle, Exporter};

use crate::error::Result;

/// A clip-editing session over a single decoded track.
///
/// The session owns the decoded buffer and an [`Exporter`], so parameter
/// changes reported while editing keep the render cache warm for the
/// eventual export.
pub struct EditSession {
    source_name: String,
    source: Arc<AudioData>,
    exporter: Exporter,
}

impl EditSession {
    /// Decodes `path` and opens a session on it.
    pub fn load(path: &Path) -> Result<Self> {
        let mut decoder = Decoder::new();
        let source = decoder.decode(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        info!(
            "opened session on {name}: {:.2}s, {} Hz, {} channel(s)",
            source.duration_seconds(),
            source.sample_rate(),
            source.channel_count()
        );
        Ok(Self::from_decoded(name, source))
    }

    /// Opens a session on an already-decoded buffer.
    pub fn from_decoded(source_name: impl Into<String>, source: Arc<AudioData>) -> Self {
        let source_name = source_name.into();
        let exporter = Exporter::new(Arc::clone(&source), source_name.clone());
        Self {
            source_name,
            source,
            exporter,
        }
    }

    /// Like [`from_decoded`](Self::from_decoded) with an explicit
    /// pre-render debounce window. Mainly for tests.
    pub fn with_debounce(
        source_name: impl Into<String>,
        source: Arc<AudioData>,
        debounce: Duration,
    ) -> Self {
        let source_name = source_name.into();
        let exporter = Exporter::with_debounce(Arc::clone(&source), source_name.clone(), debounce);
        Self {
            source_name,
            source,
            exporter,
        }
    }

    pub fn source(&self) -> &Arc<AudioData> {
        &self.source
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn duration_seconds(&self) -> f64 {
        self.source.duration_seconds()
    }

    /// Parameters that export the whole track unchanged.
    pub fn default_parameters(&self) -> EffectParameters {
        EffectParameters::flat(Region::new(0.0, self.duration_seconds()))
    }

    /// Builds parameters from the display surface's current state.
    ///
    /// Reads the selected region and the fade envelope through the
    /// collaborator traits; everything else starts from the flat defaults
    /// and is adjusted by the caller.
    pub fn parameters_from(
        &self,
        region: &impl RegionSource,
        envelope: &impl EnvelopeSource,
    ) -> EffectParameters {
        let mut params = EffectParameters::flat(region.region());
        params.envelope = envelope.points();
        params
    }

    /// Reports an edit so the background renderer can pre-render it.
    pub fn params_changed(&self, params: &EffectParameters) {
        self.exporter.params_changed(params);
    }

    /// Exports synchronously; `deliver` gets the encoded bytes and the
    /// derived filename. Returns the filename.
    pub fn export(
        &self,
        params: &EffectParameters,
        container: Container,
        override_name: Option<&str>,
        deliver: impl FnOnce(&[u8], &str),
    ) -> Result<String> {
        Ok(self.exporter.export(params, container, override_name, deliver)?)
    }

    /// Exports into `dir`, returning the written path.
    pub fn export_to_file(
        &self,
        params: &EffectParameters,
        container: Container,
        dir: &Path,
    ) -> Result<PathBuf> {
        Ok(self.exporter.export_to_file(params, container, dir)?)
    }

    /// Starts a non-blocking export on a dedicated thread.
    pub fn export_async(
        &self,
        params: &EffectParameters,
        container: Container,
        override_name: Option<&str>,
    ) -> ExportHandle {
        self.exporter
            .export_async(params, container, override_name, |_, _| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveclip_core::EnvelopePoint;

    struct FakeWaveform {
        region: Region,
        duration: f64,
        points: Vec<EnvelopePoint>,
    }

    impl RegionSource for FakeWaveform {
        fn region(&self) -> Region {
            self.region
        }

        fn duration(&self) -> f64 {
            self.duration
        }
    }

    impl EnvelopeSource for FakeWaveform {
        fn points(&self) -> Vec<EnvelopePoint> {
            self.points.clone()
        }
    }

    #[test]
    fn parameters_from_reads_the_display_surface() {
        let source = Arc::new(AudioData::mono(8_000, vec![0.1; 40_000]).unwrap());
        let session =
            EditSession::with_debounce("clip.wav", source, Duration::from_millis(10));

        let surface = FakeWaveform {
            region: Region::new(1.0, 4.0),
            duration: 5.0,
            points: vec![
                EnvelopePoint::new(1.0, 0.0),
                EnvelopePoint::new(4.0, 1.0),
            ],
        };

        let params = session.parameters_from(&surface, &surface);
        assert_eq!(params.region, Region::new(1.0, 4.0));
        assert_eq!(params.envelope.len(), 2);
        assert!(params.validate(surface.duration()).is_ok());
    }

    #[test]
    fn default_parameters_span_the_track() {
        let source = Arc::new(AudioData::mono(8_000, vec![0.1; 16_000]).unwrap());
        let session =
            EditSession::with_debounce("clip.wav", source, Duration::from_millis(10));
        let params = session.default_parameters();
        assert_eq!(params.region, Region::new(0.0, 2.0));
        assert!(params.validate(session.duration_seconds()).is_ok());
    }
}
