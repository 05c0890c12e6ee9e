//! Failures surfaced by a build.
//!
//! A build either completes or aborts on the first error; there is no partial tree.

use thiserror::Error;

/// Boxed error raised by handler factories and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
/// The document does not have a shape the engine can resolve.
pub enum StructureError {
    /// A section's content is not a mapping, a sequence of mappings, or empty.
    #[error("undefined override '{path}': expected a mapping, sequence or nothing, found {found}")]
    UnsupportedContent {
        /// Dotted path of the section.
        path: String,
        /// Shape that was found instead.
        found: &'static str,
    },
    /// A mapped override's content is of a type it cannot hold.
    #[error("override '{path}' cannot hold {found} content")]
    UnsupportedMappedContent {
        /// Dotted path of the override.
        path: String,
        /// Shape that was found instead.
        found: &'static str,
    },
    /// A mapping inside a mapped override mixes member keys with unknown keys.
    #[error("override '{path}' has no member matching key '{key}'")]
    UnclassifiedMember {
        /// Dotted path of the override.
        path: String,
        /// The key that matched no member.
        key: String,
    },
    /// Short-form content was given to a mapped override with no free-form member.
    #[error("override '{path}' has no member that accepts short-form content")]
    NoImplicitMember {
        /// Dotted path of the override.
        path: String,
    },
    /// Bare scalars were given to a mapped override that does not admit raw members.
    #[error("override '{path}' does not accept bare scalar members")]
    RawNotAdmitted {
        /// Dotted path of the override.
        path: String,
    },
}

#[derive(Debug, Error)]
/// Any failure that aborts a build.
pub enum Error {
    /// The document's structure could not be resolved.
    #[error(transparent)]
    Structure(#[from] StructureError),
    /// A handler factory rejected its content.
    #[error("handler for '{path}' failed: {source}")]
    Handler {
        /// Dotted path of the override being constructed.
        path: String,
        /// Error raised by the factory.
        source: BoxError,
    },
    /// A construction hook failed.
    #[error("hook failed at '{path}': {source}")]
    Hook {
        /// Dotted path of the section the hook ran for.
        path: String,
        /// Error raised by the hook.
        source: BoxError,
    },
}

/// Result alias for build operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
