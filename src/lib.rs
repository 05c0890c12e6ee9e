//! structr: resolve untyped YAML/JSON documents into typed section trees.
//!
//! Callers register handler types for the keys they care about. The engine walks a decoded
//! document, binds an override instance wherever one of those keys appears, and treats every
//! other key as a named sub-section, recursing until it reaches leaves.
//!
//! ```
//! use serde_json::json;
//! use structr::{build_root, Registry};
//!
//! let mut registry = Registry::new();
//! let settings = registry.generic(&["settings"]);
//! let action = registry.generic(&["action"]);
//! let group = registry.mapped(&["group"], &[settings, action]);
//!
//! let doc = json!({"item1": {"group": {"settings": {"plum": "pie"}, "action": {"eat": "now"}}}});
//! let tree = build_root("root", &doc, &registry, &[group], None, false).unwrap();
//!
//! let leaf = tree.leaf_sections()[0];
//! assert_eq!(leaf.name(), "item1");
//! let group = leaf.get("group").and_then(|o| o.as_mapped()).unwrap();
//! assert_eq!(group.len(), 1);
//! assert_eq!(group.member("settings").unwrap().get_str("plum").as_deref(), Some("pie"));
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod mapped;
pub mod overrides;
pub mod report;
pub mod section;
pub mod stack;
pub mod value;

pub use builder::{build_root, Builder};
pub use context::Context;
pub use error::{BoxError, Error, Result, StructureError};
pub use handler::{Generic, HandlerId, HandlerKind, OverrideObject, Registry, RAW_KEY};
pub use hooks::{HookSection, Hooks, LogHooks, NoHooks};
pub use mapped::{MappedOverride, MappedState};
pub use overrides::{Override, OverrideValue, Overrides};
pub use section::{Section, SectionId, SectionTree};
pub use stack::Stack;
pub use value::{normalize_key, Value};
