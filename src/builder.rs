//! Section tree construction.
//!
//! The builder walks a document once, top-down and depth-first. At every mapping it classifies
//! each key: a key one of the root handlers answers to is bound as an override on the current
//! section, any other key opens a child section that is built recursively. A sequence
//! contributes each of its mappings to the section that owns it, which is how a key repeated
//! across list items ends up stacked in one slot.

use crate::context::Context;
use crate::error::{Error, Result, StructureError};
use crate::handler::{HandlerId, Registry};
use crate::hooks::{HookSection, Hooks, LogHooks};
use crate::mapped::{Resolver, Site};
use crate::overrides::Overrides;
use crate::section::{SectionId, SectionNode, SectionTree};
use crate::value::{kind_name, Map, Value};

/// Build a tree from `content` with `handlers` as the root vocabulary.
///
/// With `run_hooks`, every section is traced through [`LogHooks`].
///
/// # Errors
///
/// Returns [`Error::Structure`] when the document has a shape the engine cannot resolve, and
/// [`Error::Handler`] when a handler factory rejects its content.
pub fn build_root(
    name: &str,
    content: &Value,
    registry: &Registry,
    handlers: &[HandlerId],
    context: Option<Context>,
    run_hooks: bool,
) -> Result<SectionTree> {
    let mut builder = Builder::new(registry, handlers).run_hooks(run_hooks);
    if let Some(context) = context {
        builder = builder.context(context);
    }
    builder.build(name, content)
}

#[derive(Debug, Clone)]
/// Reusable build configuration: registry, root vocabulary, context and hook switch.
pub struct Builder<'r> {
    registry: &'r Registry,
    vocabulary: Vec<HandlerId>,
    context: Option<Context>,
    run_hooks: bool,
}

impl<'r> Builder<'r> {
    #[must_use]
    /// A builder recognising `handlers` at every section level.
    pub fn new(registry: &'r Registry, handlers: &[HandlerId]) -> Self {
        Self {
            registry,
            vocabulary: handlers.to_vec(),
            context: None,
            run_hooks: false,
        }
    }

    #[must_use]
    /// Share `context` with every section and override of the trees built.
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    /// Trace every section through [`LogHooks`] in [`Self::build`].
    pub fn run_hooks(mut self, run_hooks: bool) -> Self {
        self.run_hooks = run_hooks;
        self
    }

    /// Build a tree rooted at a section called `name`.
    ///
    /// # Errors
    ///
    /// See [`build_root`].
    pub fn build(&self, name: &str, content: &Value) -> Result<SectionTree> {
        if self.run_hooks {
            self.build_with_hooks(name, content, &mut LogHooks)
        } else {
            self.construct(name, content, None)
        }
    }

    /// Build a tree, calling `hooks` before and after every section.
    ///
    /// # Errors
    ///
    /// As [`Self::build`], plus [`Error::Hook`] when a hook fails.
    pub fn build_with_hooks(
        &self,
        name: &str,
        content: &Value,
        hooks: &mut dyn Hooks,
    ) -> Result<SectionTree> {
        self.construct(name, content, Some(hooks))
    }

    fn construct(
        &self,
        name: &str,
        content: &Value,
        hooks: Option<&mut dyn Hooks>,
    ) -> Result<SectionTree> {
        let mut pass = Pass {
            resolver: Resolver::new(self.registry, self.context.clone()),
            vocabulary: &self.vocabulary,
            context: self.context.as_ref(),
            hooks,
            nodes: Vec::new(),
        };
        pass.section(name, content, None, name.to_string())?;
        log::debug!("built '{name}' with {} sections", pass.nodes.len());

        Ok(SectionTree {
            nodes: pass.nodes,
            context: self.context.clone(),
        })
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Pre,
    Post,
}

/// State of one build pass.
struct Pass<'b, 'h, 'r> {
    resolver: Resolver<'r>,
    vocabulary: &'b [HandlerId],
    context: Option<&'b Context>,
    hooks: Option<&'h mut dyn Hooks>,
    nodes: Vec<SectionNode>,
}

impl Pass<'_, '_, '_> {
    fn section(
        &mut self,
        name: &str,
        content: &Value,
        parent: Option<SectionId>,
        path: String,
    ) -> Result<SectionId> {
        let id = SectionId(self.nodes.len());
        self.nodes.push(SectionNode {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            overrides: Overrides::new(),
        });
        self.hook(id, &path, Phase::Pre)?;

        match content {
            Value::Null => {}
            Value::Object(map) => self.absorb(id, map, &path)?,
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Null => {}
                        Value::Object(map) => self.absorb(id, map, &path)?,
                        other => {
                            return Err(StructureError::UnsupportedContent {
                                path,
                                found: kind_name(other),
                            }
                            .into())
                        }
                    }
                }
            }
            other => {
                return Err(StructureError::UnsupportedContent {
                    path,
                    found: kind_name(other),
                }
                .into())
            }
        }

        self.hook(id, &path, Phase::Post)?;
        Ok(id)
    }

    /// Bind override keys of `map` onto section `id`, and build a child for every other key.
    fn absorb(&mut self, id: SectionId, map: &Map<String, Value>, path: &str) -> Result<()> {
        let vocabulary = self.vocabulary;
        for (key, value) in map {
            if let Some(handler) = self.resolver.registry().find(vocabulary, key) {
                let site = Site {
                    owner: id,
                    path,
                    lineage: &[],
                    vocabulary,
                    implicit: &[],
                };
                let overrides = &mut self.nodes[id.0].overrides;
                self.resolver.bind(overrides, handler, key, value, &site)?;
            } else {
                let child = self.section(key, value, Some(id), format!("{path}.{key}"))?;
                self.nodes[id.0].children.push(child);
            }
        }
        Ok(())
    }

    fn hook(&mut self, id: SectionId, path: &str, phase: Phase) -> Result<()> {
        let Some(hooks) = self.hooks.as_deref_mut() else {
            return Ok(());
        };
        let node = &self.nodes[id.0];
        let view = HookSection {
            id,
            name: &node.name,
            path,
            parent: node.parent,
            children: &node.children,
            overrides: &node.overrides,
            context: self.context,
        };
        let outcome = match phase {
            Phase::Pre => hooks.pre_section(&view),
            Phase::Post => hooks.post_section(&view),
        };
        outcome.map_err(|source| Error::Hook {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/builder.rs"]
mod tests;
