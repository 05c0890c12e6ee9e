//! The override handler protocol and the registry that holds handler types.
//!
//! A handler type declares the document keys it answers to and how it is resolved. There are
//! three kinds:
//!
//! - **Plain**: a factory turns the key's raw value into a domain object.
//! - **Mapped**: the value is resolved recursively against a restricted member vocabulary,
//!   producing one or more states. A mapped type flagged as a combinator (`and`/`or`/`not`)
//!   additionally inherits the vocabulary of whatever group it appears in.
//! - **Raw**: the built-in wrapper for bare scalars inside mapped groups. It has no keys and is
//!   only reachable by listing [`HandlerId::RAW`] among a mapped type's members.
//!
//! Members refer to other handler types by [`HandlerId`], so a mapped type may list itself.

use crate::error::BoxError;
use crate::value::{keys_match, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Member key under which raw-wrapped scalars are stacked.
pub const RAW_KEY: &str = "raw";

/// Capability interface implemented by every plain handler's domain object.
///
/// Both methods default to "nothing", in which case attribute lookups fall through to the raw
/// content and display falls back to the content itself.
pub trait OverrideObject: Any + fmt::Debug + Send + Sync {
    /// A computed attribute, consulted before the raw content.
    ///
    /// `name` arrives normalized (`message_alt`, never `message-alt`).
    fn attr(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Display form, if the handler defines one.
    fn display(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Domain object for handlers that only expose their content.
pub struct Generic;

impl OverrideObject for Generic {}

/// Constructs a plain handler's domain object from one raw value.
pub type Factory = Arc<dyn Fn(&Value) -> Result<Box<dyn OverrideObject>, BoxError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Index of a handler type in its [`Registry`].
pub struct HandlerId(usize);

impl HandlerId {
    /// The built-in raw-type wrapper, present in every registry.
    pub const RAW: Self = Self(0);

    #[must_use]
    /// Position in the registry.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone)]
/// How a handler type resolves its content.
pub enum HandlerKind {
    /// Wraps a bare scalar as-is.
    Raw,
    /// Builds one domain object from the content.
    Plain(Factory),
    /// Resolves the content against a member vocabulary.
    Mapped {
        /// Member types legal inside this handler.
        members: Vec<HandlerId>,
        /// Whether the enclosing group's vocabulary (and this type) is also legal inside it.
        combinator: bool,
    },
}

impl fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("Raw"),
            Self::Plain(_) => f.write_str("Plain(..)"),
            Self::Mapped {
                members,
                combinator,
            } => f
                .debug_struct("Mapped")
                .field("members", members)
                .field("combinator", combinator)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
/// One registered handler type.
pub struct HandlerDef {
    keys: Vec<String>,
    kind: HandlerKind,
}

impl HandlerDef {
    #[must_use]
    /// Key aliases this type answers to, as declared.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[must_use]
    /// The first declared key, used when the type is bound implicitly.
    pub fn primary_key(&self) -> &str {
        self.keys.first().map_or(RAW_KEY, String::as_str)
    }

    #[must_use]
    /// How this type resolves its content.
    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    #[must_use]
    /// Whether `key` is one of this type's aliases, after normalization.
    pub fn matches(&self, key: &str) -> bool {
        self.keys.iter().any(|alias| keys_match(alias, key))
    }

    #[must_use]
    /// Whether this type can be bound implicitly to a whole free-form mapping.
    ///
    /// The raw wrapper and logical combinators never can.
    pub fn accepts_free_form(&self) -> bool {
        !matches!(
            self.kind,
            HandlerKind::Raw
                | HandlerKind::Mapped {
                    combinator: true,
                    ..
                }
        )
    }
}

#[derive(Debug, Clone)]
/// Every handler type known to a build, addressed by [`HandlerId`].
pub struct Registry {
    defs: Vec<HandlerDef>,
}

impl Registry {
    #[must_use]
    /// A registry holding only the raw-type wrapper.
    pub fn new() -> Self {
        Self {
            defs: vec![HandlerDef {
                keys: Vec::new(),
                kind: HandlerKind::Raw,
            }],
        }
    }

    /// Register a plain handler type whose factory builds the domain object.
    pub fn plain<F>(&mut self, keys: &[&str], factory: F) -> HandlerId
    where
        F: Fn(&Value) -> Result<Box<dyn OverrideObject>, BoxError> + Send + Sync + 'static,
    {
        self.push(keys, HandlerKind::Plain(Arc::new(factory)))
    }

    /// Register a plain handler type that only exposes its content.
    pub fn generic(&mut self, keys: &[&str]) -> HandlerId {
        self.plain(keys, |_| Ok(Box::new(Generic)))
    }

    /// Register a mapped handler type with a fixed member vocabulary.
    pub fn mapped(&mut self, keys: &[&str], members: &[HandlerId]) -> HandlerId {
        self.push(
            keys,
            HandlerKind::Mapped {
                members: members.to_vec(),
                combinator: false,
            },
        )
    }

    /// Register a logical combinator: a mapped type that also admits the vocabulary of the group
    /// it appears in, plus itself.
    pub fn combinator(&mut self, keys: &[&str], members: &[HandlerId]) -> HandlerId {
        self.push(
            keys,
            HandlerKind::Mapped {
                members: members.to_vec(),
                combinator: true,
            },
        )
    }

    /// Append members to an already registered mapped type, e.g. to let it nest itself.
    ///
    /// Has no effect on plain or raw types.
    pub fn add_members(&mut self, id: HandlerId, extra: &[HandlerId]) {
        if let Some(HandlerKind::Mapped { members, .. }) =
            self.defs.get_mut(id.0).map(|def| &mut def.kind)
        {
            for member in extra {
                if !members.contains(member) {
                    members.push(*member);
                }
            }
        }
    }

    #[must_use]
    /// The handler type registered under `id`.
    pub fn get(&self, id: HandlerId) -> Option<&HandlerDef> {
        self.defs.get(id.0)
    }

    #[must_use]
    /// Number of registered types, including the raw wrapper.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    /// Whether only the raw wrapper is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.len() == 1
    }

    #[must_use]
    /// The first type in `vocabulary` answering to `key`.
    pub fn find(&self, vocabulary: &[HandlerId], key: &str) -> Option<HandlerId> {
        vocabulary
            .iter()
            .copied()
            .find(|id| self.get(*id).is_some_and(|def| def.matches(key)))
    }

    #[must_use]
    /// The member vocabulary a mapped type resolves against when nested in `enclosing`.
    ///
    /// Combinators take the enclosing vocabulary, their own members, and themselves. Plain and
    /// raw types have no members.
    pub fn member_vocabulary(&self, id: HandlerId, enclosing: &[HandlerId]) -> Vec<HandlerId> {
        let Some(HandlerKind::Mapped {
            members,
            combinator,
        }) = self.get(id).map(HandlerDef::kind)
        else {
            return Vec::new();
        };

        if !*combinator {
            return members.clone();
        }

        let mut vocabulary: Vec<HandlerId> =
            Vec::with_capacity(enclosing.len() + members.len() + 1);
        for candidate in enclosing.iter().chain(members).chain(std::iter::once(&id)) {
            if !vocabulary.contains(candidate) {
                vocabulary.push(*candidate);
            }
        }
        vocabulary
    }

    fn push(&mut self, keys: &[&str], kind: HandlerKind) -> HandlerId {
        let id = HandlerId(self.defs.len());
        self.defs.push(HandlerDef {
            keys: keys.iter().map(ToString::to_string).collect(),
            kind,
        });
        id
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/handler.rs"]
mod tests;
