//! Restoration submission entities

use relume_works::WorkKind;

/// What kind of artifact a restoration run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorationMode {
    /// Restore the source into a cleaned-up still photo.
    Photo,
    /// Restore the photo, then animate it into a short clip.
    Video,
}

impl RestorationMode {
    /// Credit cost charged up front for a run of this mode.
    pub fn cost(&self) -> u32 {
        match self {
            Self::Photo => 2,
            Self::Video => 5,
        }
    }

    /// The gallery kind a successful run of this mode stores.
    pub fn work_kind(&self) -> WorkKind {
        match self {
            Self::Photo => WorkKind::Photo,
            Self::Video => WorkKind::Video,
        }
    }

    /// Title used for a finished work of this mode.
    pub fn work_title(&self) -> &'static str {
        match self {
            Self::Photo => "Restored Memory",
            Self::Video => "Living Memory",
        }
    }
}

impl std::fmt::Display for RestorationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// An uploaded source image, held as raw base64 plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub base64: String,
    pub mime_type: String,
}

impl SourceImage {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Render the image as a data URL suitable for display.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// A submission parked while waiting for a credential.
///
/// Stashed when a run cannot start (or is bounced) for credential
/// reasons, and replayed verbatim once a key is supplied.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub source: SourceImage,
    pub mode: RestorationMode,
}
