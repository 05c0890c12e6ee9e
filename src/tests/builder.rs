use crate::builder::{build_root, Builder};
use crate::context::Context;
use crate::error::{BoxError, Error, StructureError};
use crate::handler::{HandlerId, Registry};
use crate::hooks::{HookSection, Hooks};
use crate::report::SectionReport;
use serde_json::json;

fn registry() -> (Registry, Vec<HandlerId>) {
    let mut registry = Registry::new();
    let settings = registry.generic(&["settings"]);
    let action = registry.generic(&["action"]);
    let group = registry.mapped(&["group"], &[settings, action]);
    let handlers = vec![settings, group];
    (registry, handlers)
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl Hooks for Recorder {
    fn pre_section(&mut self, section: &HookSection<'_>) -> Result<(), BoxError> {
        assert!(section.overrides.is_empty());
        assert!(section.children.is_empty());
        self.events.push(format!("pre {}", section.path));
        Ok(())
    }

    fn post_section(&mut self, section: &HookSection<'_>) -> Result<(), BoxError> {
        self.events.push(format!(
            "post {} {}/{}",
            section.path,
            section.overrides.len(),
            section.children.len()
        ));
        Ok(())
    }
}

struct Counter;

impl Hooks for Counter {
    fn post_section(&mut self, section: &HookSection<'_>) -> Result<(), BoxError> {
        if let Some(context) = section.context {
            context.update("sections", |count| {
                *count = json!(count.as_u64().unwrap_or(0) + 1);
            });
        }
        Ok(())
    }
}

struct Refuse(&'static str);

impl Hooks for Refuse {
    fn pre_section(&mut self, section: &HookSection<'_>) -> Result<(), BoxError> {
        if section.name == self.0 {
            return Err(format!("refusing {}", section.name).into());
        }
        Ok(())
    }
}

#[test]
fn test_build_example_tree() {
    let (registry, handlers) = registry();
    let doc = json!({
        "item1": {"group": {"settings": {"plum": "pie"}, "action": {"eat": "now"}}},
        "item2": {"settings": {"plum": "tart"}}
    });
    let tree = build_root("root", &doc, &registry, &handlers, None, false).unwrap();

    assert_eq!(tree.len(), 3);
    let leaves: Vec<String> = tree
        .leaf_sections()
        .iter()
        .map(|leaf| leaf.resolve_path())
        .collect();
    assert_eq!(leaves, vec!["root.item1", "root.item2"]);

    let item2 = tree.root().children().nth(1).unwrap();
    let settings = item2.get("settings").unwrap();
    assert_eq!(settings.owner(), item2.id());
    assert_eq!(settings.path(), "root.item2.settings");
    assert!(settings.lineage().is_empty());
}

#[test]
fn test_sequence_items_stack_on_owner() {
    let (registry, handlers) = registry();
    let doc = json!({"item": [
        {"settings": {"n": 1}},
        null,
        {"settings": {"n": 2}},
        {"settings": {"n": 3}}
    ]});
    let tree = build_root("root", &doc, &registry, &handlers, None, false).unwrap();

    let item = tree.root().children().next().unwrap();
    assert!(item.is_leaf());
    let stack = item.stack("settings").unwrap();
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.latest().unwrap().get("n").unwrap().into_owned(), json!(3));
    let ns: Vec<_> = stack
        .iter()
        .map(|settings| settings.get("n").unwrap().into_owned())
        .collect();
    assert_eq!(ns, vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_plain_override_content_is_not_sectioned() {
    let (registry, handlers) = registry();
    let doc = json!({"item": {"settings": {"nested": [{"a": 1}, {"a": 2}], "other": {"b": 1}}}});
    let tree = build_root("root", &doc, &registry, &handlers, None, false).unwrap();

    assert_eq!(tree.len(), 2);
    let settings = tree.root().children().next().unwrap().get("settings").unwrap();
    assert_eq!(settings.get("nested").unwrap().into_owned(), json!([{"a": 1}, {"a": 2}]));
}

#[test]
fn test_builds_are_deterministic() {
    let (registry, handlers) = registry();
    let doc = json!({
        "b": {"settings": {"x": 1}, "deeper": {"group": {"action": {"go": true}}}},
        "a": [{"settings": {"y": 2}}, {"leaf": null}]
    });
    let builder = Builder::new(&registry, &handlers);
    let first = SectionReport::from_tree(&builder.build("root", &doc).unwrap());
    let second = SectionReport::from_tree(&builder.build("root", &doc).unwrap());
    assert_eq!(first, second);
    assert_eq!(first.leaf_paths(), vec!["root.b.deeper", "root.a.leaf"]);
}

#[test]
fn test_scalar_section_content_is_rejected() {
    let (registry, handlers) = registry();
    let err = build_root("root", &json!({"item": 5}), &registry, &handlers, None, false)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Structure(StructureError::UnsupportedContent { ref path, found: "number" })
            if path == "root.item"
    ));

    let doc = json!({"item": [{"x": null}, "y"]});
    let err = build_root("root", &doc, &registry, &handlers, None, false).unwrap_err();
    assert!(matches!(
        err,
        Error::Structure(StructureError::UnsupportedContent { found: "string", .. })
    ));
    assert!(err.to_string().contains("root.item"));
}

#[test]
fn test_handler_errors_carry_path() {
    let mut registry = Registry::new();
    let strict = registry.plain(&["strict"], |content| {
        if content.is_object() {
            Ok(Box::new(crate::handler::Generic))
        } else {
            Err("strict wants a mapping".into())
        }
    });
    let doc = json!({"a": {"b": {"strict": "nope"}}});
    let err = build_root("root", &doc, &registry, &[strict], None, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "handler for 'root.a.b.strict' failed: strict wants a mapping"
    );
}

#[test]
fn test_hooks_run_top_down_then_bottom_up() {
    let (registry, handlers) = registry();
    let doc = json!({
        "a": {"settings": {"x": 1}, "a1": null},
        "b": null
    });
    let mut recorder = Recorder::default();
    Builder::new(&registry, &handlers)
        .build_with_hooks("root", &doc, &mut recorder)
        .unwrap();

    assert_eq!(
        recorder.events,
        vec![
            "pre root",
            "pre root.a",
            "pre root.a.a1",
            "post root.a.a1 0/0",
            "post root.a 1/1",
            "pre root.b",
            "post root.b 0/0",
            "post root 0/2",
        ]
    );
}

#[test]
fn test_hook_failure_aborts_build() {
    let (registry, handlers) = registry();
    let doc = json!({"a": {"b": null}, "c": null});
    let err = Builder::new(&registry, &handlers)
        .build_with_hooks("root", &doc, &mut Refuse("b"))
        .unwrap_err();
    match err {
        Error::Hook { path, source } => {
            assert_eq!(path, "root.a.b");
            assert_eq!(source.to_string(), "refusing b");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_context_is_shared_through_tree() {
    let (registry, handlers) = registry();
    let context = Context::new();
    context.set("env", "test");
    let doc = json!({"a": {"settings": {"x": 1}}, "b": {"c": null}});

    let tree = Builder::new(&registry, &handlers)
        .context(context.clone())
        .build_with_hooks("root", &doc, &mut Counter)
        .unwrap();

    assert_eq!(context.get("sections"), Some(json!(4)));
    let shared = tree.context().unwrap();
    assert!(shared.ptr_eq(&context));

    let settings = tree.root().children().next().unwrap().get("settings").unwrap();
    assert_eq!(settings.context().unwrap().get("env"), Some(json!("test")));
    context.set("env", "changed");
    assert_eq!(settings.context().unwrap().get("env"), Some(json!("changed")));
    assert_eq!(tree.leaf_sections()[1].context().unwrap().len(), 2);
}

#[test]
fn test_build_root_with_hooks_matches_plain_build() {
    let (registry, handlers) = registry();
    let doc = json!({"a": [{"settings": {"x": 1}}, {"b": null}]});
    let traced = build_root("root", &doc, &registry, &handlers, None, true).unwrap();
    let plain = build_root("root", &doc, &registry, &handlers, None, false).unwrap();
    assert_eq!(SectionReport::from_tree(&traced), SectionReport::from_tree(&plain));
    assert!(traced.context().is_none());
}

#[test]
fn test_empty_vocabulary_sections_every_key() {
    let registry = Registry::new();
    let doc = json!({"settings": {"x": null}});
    let tree = build_root("root", &doc, &registry, &[], None, false).unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.leaf_sections()[0].resolve_path(), "root.settings.x");
}
