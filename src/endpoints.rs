//! Remote endpoints consumed by the client

use crate::config::ObjectRemovalMode;

/// A SnapEdit API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    BackgroundRemoval,
    Enhance,
    AutoSuggest,
    ObjectErase,
    ObjectSuperErase,
}

impl Endpoint {
    /// Path relative to the service origin
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::BackgroundRemoval => "/api/background_removal/v1/erase",
            Self::Enhance => "/api/image_enhancement/v1/enhance",
            Self::AutoSuggest => "/api/object_removal/v1/auto_suggest",
            Self::ObjectErase => "/api/object_removal/v1/erase",
            Self::ObjectSuperErase => "/api/object_removal/v1/super_erase",
        }
    }

    /// Name used for this endpoint's operation in logs
    #[must_use]
    pub fn operation_name(self) -> &'static str {
        match self {
            Self::BackgroundRemoval => "remove_background",
            Self::Enhance => "enhance_image",
            Self::AutoSuggest => "detect_objects",
            Self::ObjectErase | Self::ObjectSuperErase => "remove_object",
        }
    }

    /// Object removal endpoint for the configured mode
    #[must_use]
    pub fn for_object_removal(mode: ObjectRemovalMode) -> Self {
        match mode {
            ObjectRemovalMode::Erase => Self::ObjectErase,
            ObjectRemovalMode::SuperErase => Self::ObjectSuperErase,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
