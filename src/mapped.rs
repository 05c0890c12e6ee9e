//! Mapped overrides and the resolver that binds handler instances.
//!
//! A mapped override resolves its own content against a restricted member vocabulary and groups
//! what it finds into states. How the content is read depends on its shape:
//!
//! ```text
//! null                         -> no states
//! {member: .., member: ..}     -> one state
//! {attr: .., attr: ..}         -> one state holding the implicit member (short form)
//! [scalar, scalar, ..]         -> one state, scalars stacked under `raw`
//! [{member: ..}, {member: ..}] -> one state, single-key fragments stacked per member
//! [{member: .., member: ..}]   -> one state per element
//! [{attr: ..}, {member: ..}]   -> one state per element
//! ```
//!
//! Anything else is a [`StructureError`].

use crate::context::Context;
use crate::error::{Error, Result, StructureError};
use crate::handler::{HandlerDef, HandlerId, HandlerKind, Registry, RAW_KEY};
use crate::overrides::{Override, OverrideValue, Overrides};
use crate::section::SectionId;
use crate::stack::Stack;
use crate::value::{is_scalar, kind_name, normalize_key, Map, Value};

#[derive(Debug, Default)]
/// One grouping unit of a mapped override: a stack per member key seen.
pub struct MappedState {
    members: Overrides,
}

impl MappedState {
    #[must_use]
    /// Number of distinct member keys bound in this state.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    /// Whether no member was bound.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    /// The stack under member `name` (normalized).
    pub fn stack(&self, name: &str) -> Option<&Stack<Override>> {
        self.members.get(&normalize_key(name))
    }

    #[must_use]
    /// The latest instance of member `name`.
    pub fn get(&self, name: &str) -> Option<&Override> {
        self.stack(name).and_then(Stack::latest)
    }

    #[must_use]
    /// Every member stack keyed by normalized name, in first-binding order.
    pub fn members(&self) -> &Overrides {
        &self.members
    }

    /// Member stacks in first-binding order.
    pub fn iter(&self) -> impl Iterator<Item = &Stack<Override>> {
        self.members.values()
    }
}

#[derive(Debug, Default)]
/// The resolved form of a mapped handler: its states in document order.
pub struct MappedOverride {
    states: Vec<MappedState>,
}

impl MappedOverride {
    #[must_use]
    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    /// Whether the content produced no state (null or an empty sequence).
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    /// All states in document order.
    pub fn states(&self) -> &[MappedState] {
        &self.states
    }

    /// States in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, MappedState> {
        self.states.iter()
    }

    #[must_use]
    /// The state at `index`.
    pub fn state(&self, index: usize) -> Option<&MappedState> {
        self.states.get(index)
    }

    #[must_use]
    /// Shortcut for the latest instance of member `name` in the last state.
    ///
    /// Only meaningful when there is a single state holding a single instance of `name`.
    pub fn member(&self, name: &str) -> Option<&Override> {
        self.states.last().and_then(|state| state.get(name))
    }
}

impl<'a> IntoIterator for &'a MappedOverride {
    type Item = &'a MappedState;
    type IntoIter = std::slice::Iter<'a, MappedState>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Where an instance is being bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site<'a> {
    pub owner: SectionId,
    /// Path of the section, extended by every enclosing member key.
    pub path: &'a str,
    pub lineage: &'a [String],
    /// Vocabulary the instance's key was matched against.
    pub vocabulary: &'a [HandlerId],
    /// Handler types already bound implicitly on the way here.
    pub implicit: &'a [HandlerId],
}

enum Shape<'m> {
    Members,
    ShortForm,
    Mixed(&'m str),
}

/// Binds handler instances for one build.
pub(crate) struct Resolver<'r> {
    registry: &'r Registry,
    context: Option<Context>,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r Registry, context: Option<Context>) -> Self {
        Self { registry, context }
    }

    pub(crate) fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolve `id` for one occurrence of `matched_key` and push it onto `into`.
    pub(crate) fn bind(
        &self,
        into: &mut Overrides,
        id: HandlerId,
        matched_key: &str,
        content: &Value,
        site: &Site<'_>,
    ) -> Result<()> {
        let Some(def) = self.registry.get(id) else {
            return Ok(());
        };
        let instance = self.resolve(id, def, matched_key, content, site)?;
        log::debug!("bound {}", instance.path);
        into.entry(instance.key.clone()).or_default().push(instance);
        Ok(())
    }

    fn resolve(
        &self,
        id: HandlerId,
        def: &HandlerDef,
        matched_key: &str,
        content: &Value,
        site: &Site<'_>,
    ) -> Result<Override> {
        let path = format!("{}.{matched_key}", site.path);
        let value = match def.kind() {
            HandlerKind::Raw => OverrideValue::Raw,
            HandlerKind::Plain(factory) => {
                let object = factory(content).map_err(|source| Error::Handler {
                    path: path.clone(),
                    source,
                })?;
                OverrideValue::Plain(object)
            }
            HandlerKind::Mapped { .. } => {
                let mut lineage = site.lineage.to_vec();
                lineage.push(matched_key.to_string());
                let vocabulary = self.registry.member_vocabulary(id, site.vocabulary);
                let inner = Site {
                    owner: site.owner,
                    path: &path,
                    lineage: &lineage,
                    vocabulary: &vocabulary,
                    implicit: site.implicit,
                };
                OverrideValue::Mapped(self.resolve_mapped(content, &inner)?)
            }
        };

        Ok(Override {
            key: normalize_key(matched_key),
            matched_key: matched_key.to_string(),
            content: content.clone(),
            owner: site.owner,
            path,
            lineage: site.lineage.to_vec(),
            context: self.context.clone(),
            value,
        })
    }

    /// `site` here is the mapped override's own site: its path, and its member vocabulary.
    fn resolve_mapped(&self, content: &Value, site: &Site<'_>) -> Result<MappedOverride> {
        let states = match content {
            Value::Null => Vec::new(),
            Value::Object(map) => {
                let mut state = MappedState::default();
                self.absorb(&mut state.members, map, site)?;
                vec![state]
            }
            Value::Array(items) => self.resolve_sequence(items, site)?,
            other => {
                return Err(StructureError::UnsupportedMappedContent {
                    path: site.path.to_string(),
                    found: kind_name(other),
                }
                .into())
            }
        };
        Ok(MappedOverride { states })
    }

    fn resolve_sequence(&self, items: &[Value], site: &Site<'_>) -> Result<Vec<MappedState>> {
        let items: Vec<&Value> = items.iter().filter(|item| !item.is_null()).collect();
        if items.is_empty() {
            return Ok(Vec::new());
        }

        if items.iter().all(|item| is_scalar(item)) {
            let mut state = MappedState::default();
            for item in items {
                self.bind_raw(&mut state.members, item, site)?;
            }
            return Ok(vec![state]);
        }

        // one member key per element: fragments of a single definition
        let fragments = items.iter().all(|item| {
            item.as_object().is_some_and(|map| {
                map.len() == 1 && matches!(self.classify(map, site.vocabulary), Shape::Members)
            })
        });
        if fragments {
            let mut state = MappedState::default();
            for map in items.iter().filter_map(|item| item.as_object()) {
                self.absorb(&mut state.members, map, site)?;
            }
            return Ok(vec![state]);
        }

        let mut states = Vec::with_capacity(items.len());
        for item in items {
            let mut state = MappedState::default();
            match item {
                Value::Object(map) => self.absorb(&mut state.members, map, site)?,
                Value::Array(_) => {
                    return Err(StructureError::UnsupportedMappedContent {
                        path: site.path.to_string(),
                        found: "nested sequence",
                    }
                    .into())
                }
                scalar => self.bind_raw(&mut state.members, scalar, site)?,
            }
            states.push(state);
        }
        Ok(states)
    }

    /// Bind every entry of `map` into `into`, or the whole map to the implicit member when none
    /// of its keys is a member key.
    fn absorb(
        &self,
        into: &mut Overrides,
        map: &Map<String, Value>,
        site: &Site<'_>,
    ) -> Result<()> {
        match self.classify(map, site.vocabulary) {
            Shape::Members => {
                let explicit = Site {
                    implicit: &[],
                    ..*site
                };
                for (key, value) in map {
                    if let Some(id) = self.registry.find(site.vocabulary, key) {
                        self.bind(into, id, key, value, &explicit)?;
                    }
                }
                Ok(())
            }
            Shape::ShortForm => {
                let Some((id, def)) = self.implicit_member(site) else {
                    return Err(StructureError::NoImplicitMember {
                        path: site.path.to_string(),
                    }
                    .into());
                };
                let mut implicit = site.implicit.to_vec();
                implicit.push(id);
                let inner = Site {
                    implicit: &implicit,
                    ..*site
                };
                let key = def.primary_key().to_string();
                self.bind(into, id, &key, &Value::Object(map.clone()), &inner)
            }
            Shape::Mixed(key) => Err(StructureError::UnclassifiedMember {
                path: site.path.to_string(),
                key: key.to_string(),
            }
            .into()),
        }
    }

    fn bind_raw(&self, into: &mut Overrides, scalar: &Value, site: &Site<'_>) -> Result<()> {
        if !site.vocabulary.contains(&HandlerId::RAW) {
            return Err(StructureError::RawNotAdmitted {
                path: site.path.to_string(),
            }
            .into());
        }
        self.bind(into, HandlerId::RAW, RAW_KEY, scalar, site)
    }

    fn classify<'m>(&self, map: &'m Map<String, Value>, vocabulary: &[HandlerId]) -> Shape<'m> {
        let mut unmatched = None;
        let mut matched = 0usize;
        for key in map.keys() {
            if self.registry.find(vocabulary, key).is_some() {
                matched += 1;
            } else if unmatched.is_none() {
                unmatched = Some(key.as_str());
            }
        }
        match unmatched {
            None => Shape::Members,
            Some(_) if matched == 0 => Shape::ShortForm,
            Some(key) => Shape::Mixed(key),
        }
    }

    /// The first member type that takes a whole mapping and is not already being bound
    /// implicitly further up.
    fn implicit_member(&self, site: &Site<'_>) -> Option<(HandlerId, &'r HandlerDef)> {
        site.vocabulary
            .iter()
            .filter(|id| !site.implicit.contains(id))
            .find_map(|id| {
                let def = self.registry.get(*id)?;
                def.accepts_free_form().then_some((*id, def))
            })
    }
}

#[cfg(test)]
#[path = "tests/mapped.rs"]
mod tests;
