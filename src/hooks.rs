//! Construction lifecycle callbacks.
//!
//! When hooks are enabled, every section gets `pre_section` before any of its overrides or
//! children are resolved and `post_section` once they all are. Across the tree that is top-down
//! pre, depth-first build, and bottom-up post per node.

use crate::context::Context;
use crate::error::BoxError;
use crate::overrides::Overrides;
use crate::section::SectionId;

#[derive(Debug, Clone, Copy)]
/// What a hook sees of the section being built.
pub struct HookSection<'a> {
    /// Arena id of the section.
    pub id: SectionId,
    /// Name within its parent.
    pub name: &'a str,
    /// Dotted path from the root.
    pub path: &'a str,
    /// Parent section, `None` for the root.
    pub parent: Option<SectionId>,
    /// Children built so far; empty in `pre_section`.
    pub children: &'a [SectionId],
    /// Overrides bound so far; empty in `pre_section`.
    pub overrides: &'a Overrides,
    /// The tree's shared context.
    pub context: Option<&'a Context>,
}

/// Extension points invoked once per section. Both default to doing nothing.
///
/// An error aborts the build and is returned to the caller.
pub trait Hooks {
    /// Runs before the section's content is resolved.
    ///
    /// # Errors
    ///
    /// Any error aborts the build.
    fn pre_section(&mut self, _section: &HookSection<'_>) -> Result<(), BoxError> {
        Ok(())
    }

    /// Runs after the section's overrides and children are final.
    ///
    /// # Errors
    ///
    /// Any error aborts the build.
    fn post_section(&mut self, _section: &HookSection<'_>) -> Result<(), BoxError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Hooks that do nothing.
pub struct NoHooks;

impl Hooks for NoHooks {}

#[derive(Debug, Clone, Copy, Default)]
/// Hooks that trace every section through the `log` facade.
pub struct LogHooks;

impl Hooks for LogHooks {
    fn pre_section(&mut self, section: &HookSection<'_>) -> Result<(), BoxError> {
        log::trace!("pre {}", section.path);
        Ok(())
    }

    fn post_section(&mut self, section: &HookSection<'_>) -> Result<(), BoxError> {
        log::trace!(
            "post {} ({} overrides, {} children)",
            section.path,
            section.overrides.len(),
            section.children.len()
        );
        Ok(())
    }
}
