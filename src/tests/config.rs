use crate::config::{Config, ConfigError};
use crate::handler::{HandlerId, HandlerKind};
use crate::Builder;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const CHECKS: &str = r#"
root_name = "checks"

[[handlers]]
keys = ["message", "message-alt"]

[[handlers]]
keys = ["assertions"]
kind = "mapped"
members = ["assertion", "and", "raw"]

[[handlers]]
keys = ["assertion"]
kind = "mapped"
members = ["key", "ops"]
root = false

[[handlers]]
keys = ["key", "ops"]
root = false

[[handlers]]
keys = ["and", "or", "not"]
kind = "combinator"
root = false
"#;

#[test]
fn test_empty_config_uses_defaults() {
    let cfg = Config::parse("").unwrap();
    assert_eq!(cfg.root_name, "root");
    assert!(!cfg.run_hooks);
    assert!(cfg.handlers.is_empty());

    let (registry, roots) = cfg.registry().unwrap();
    assert!(registry.is_empty());
    assert!(roots.is_empty());
}

#[test]
fn test_handler_defaults() {
    let cfg = Config::parse("[[handlers]]\nkeys = [\"settings\"]\n").unwrap();
    let spec = &cfg.handlers[0];
    assert_eq!(spec.kind, "plain");
    assert!(spec.members.is_empty());
    assert!(spec.root);
}

#[test]
fn test_registry_from_declarations() {
    let cfg = Config::parse(CHECKS).unwrap();
    assert_eq!(cfg.root_name, "checks");
    assert_eq!(cfg.handlers.len(), 5);

    let (registry, roots) = cfg.registry().unwrap();
    assert_eq!(registry.len(), 6);
    assert_eq!(roots.len(), 2);

    let message = registry.get(roots[0]).unwrap();
    assert_eq!(message.primary_key(), "message");
    assert!(message.matches("message_alt"));

    let assertions = registry.get(roots[1]).unwrap();
    let HandlerKind::Mapped { members, combinator } = assertions.kind() else {
        panic!("assertions should be mapped");
    };
    assert!(!combinator);
    assert_eq!(members.len(), 3);
    assert_eq!(members[2], HandlerId::RAW);
    assert!(matches!(
        registry.get(members[1]).unwrap().kind(),
        HandlerKind::Mapped { combinator: true, .. }
    ));
}

#[test]
fn test_declared_registry_resolves_documents() {
    let cfg = Config::parse(CHECKS).unwrap();
    let (registry, roots) = cfg.registry().unwrap();
    let doc = json!({"fruit": {
        "message-alt": "careful",
        "assertions": [{"key": "k1", "ops": ["gt"]}, "loose"]
    }});

    let tree = Builder::new(&registry, &roots)
        .build(&cfg.root_name, &doc)
        .unwrap();
    let fruit = tree.leaf_sections()[0];
    assert_eq!(fruit.resolve_path(), "checks.fruit");
    assert!(fruit.get("message").is_none());
    assert_eq!(fruit.get("message-alt").unwrap().matched_key(), "message-alt");

    let assertions = fruit.get("assertions").unwrap().as_mapped().unwrap();
    assert_eq!(assertions.len(), 2);
    let assertion = assertions.state(0).unwrap().get("assertion").unwrap();
    let key = assertion.as_mapped().unwrap().member("key").unwrap();
    assert_eq!(key.to_string(), "k1");
    assert!(assertions.state(1).unwrap().get("raw").unwrap().is_raw());
}

#[test]
fn test_unknown_member_is_rejected() {
    let cfg = Config::parse(
        "[[handlers]]\nkeys = [\"group\"]\nkind = \"mapped\"\nmembers = [\"missing\"]\n",
    )
    .unwrap();
    let err = cfg.registry().unwrap_err();
    let ConfigError::UnknownMember { handler, member } = err else {
        panic!("expected an unknown member error");
    };
    assert_eq!(handler, "group");
    assert_eq!(member, "missing");
}

#[test]
fn test_unknown_kind_is_rejected() {
    let cfg = Config::parse("[[handlers]]\nkeys = [\"group\"]\nkind = \"fancy\"\n").unwrap();
    let err = cfg.registry().unwrap_err();
    assert_eq!(err.to_string(), "handler 'group' has unknown kind 'fancy'");
}

#[test]
fn test_empty_keys_are_rejected() {
    let cfg = Config::parse("[[handlers]]\nkeys = [\"a\"]\n\n[[handlers]]\nkeys = []\n").unwrap();
    let err = cfg.registry().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyKeys { index: 1 }));
}

#[test]
fn test_from_path_reads_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "root_name = \"doc\"\nrun_hooks = true").unwrap();

    let cfg = Config::from_path(file.path()).unwrap();
    assert_eq!(cfg.root_name, "doc");
    assert!(cfg.run_hooks);
}

#[test]
fn test_from_path_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("structr.toml");
    let err = Config::from_path(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { ref config_path, .. } if *config_path == missing));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "root_name = [").unwrap();
    let err = Config::from_path(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config file at"));
}
