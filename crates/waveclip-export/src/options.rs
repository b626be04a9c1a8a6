/// Output container for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// 16-bit PCM WAV.
    Wav,
    /// MPEG-1 layer III at a fixed bitrate.
    Mp3,
}

impl Container {
    /// Canonical file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Wav => "wav",
            Container::Mp3 => "mp3",
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Derives the output filename for an export.
///
/// The caller-supplied override wins over the source name hint. Whichever
/// base is chosen, its extension is replaced by the container's canonical
/// one; a base that already carries the right extension is kept as-is.
pub fn derive_filename(source_hint: &str, override_name: Option<&str>, container: Container) -> String {
    let base = override_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(source_hint);
    let suffix = format!(".{}", container.extension());
    if base.to_ascii_lowercase().ends_with(&suffix) {
        return base.to_string();
    }
    // Strip a trailing extension, if any, but keep dotfile-style names whole.
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    format!("{stem}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_replaces_source_extension() {
        assert_eq!(derive_filename("song.flac", None, Container::Wav), "song.wav");
        assert_eq!(derive_filename("song.flac", None, Container::Mp3), "song.mp3");
    }

    #[test]
    fn matching_extension_kept() {
        assert_eq!(derive_filename("take.wav", None, Container::Wav), "take.wav");
        assert_eq!(derive_filename("Take.WAV", None, Container::Wav), "Take.WAV");
    }

    #[test]
    fn override_wins_over_hint() {
        assert_eq!(
            derive_filename("song.flac", Some("mixdown"), Container::Mp3),
            "mixdown.mp3"
        );
        assert_eq!(
            derive_filename("song.flac", Some("mixdown.mp3"), Container::Mp3),
            "mixdown.mp3"
        );
    }

    #[test]
    fn blank_override_falls_back_to_hint() {
        assert_eq!(derive_filename("song.ogg", Some("   "), Container::Wav), "song.wav");
    }

    #[test]
    fn extensionless_base_gets_suffix() {
        assert_eq!(derive_filename("session", None, Container::Mp3), "session.mp3");
    }
}
