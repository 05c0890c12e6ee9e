//! Configuration to declare handler types without writing Rust, and to set build defaults.
//!
//! We look for a structr.toml, and if present load settings from there. Handlers declared this
//! way only expose their content; handlers with domain logic are registered in code.
//!
//! ```toml
//! root_name = "checks"
//!
//! [[handlers]]
//! keys = ["message", "message-alt"]
//!
//! [[handlers]]
//! keys = ["assertions"]
//! kind = "mapped"
//! members = ["assertion", "and"]
//! ```

use crate::handler::{HandlerId, Registry};
use facet::Facet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File read by [`Config::load`].
pub const CONFIG_FILE: &str = "structr.toml";

/// Member name that admits bare scalars.
pub const RAW_MEMBER: &str = "raw";

#[derive(Debug, Error)]
/// A configuration file could not be turned into a registry.
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        /// Location of the file.
        config_path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid for this schema.
    #[error("Failed to parse config file at {config_path}: {message}")]
    Parse {
        /// Location of the file.
        config_path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// A handler declares no keys.
    #[error("handler #{index} declares no keys")]
    EmptyKeys {
        /// Position of the handler in the file.
        index: usize,
    },
    /// A handler's kind is not `plain`, `mapped` or `combinator`.
    #[error("handler '{handler}' has unknown kind '{kind}'")]
    UnknownKind {
        /// Primary key of the handler.
        handler: String,
        /// The kind that was given.
        kind: String,
    },
    /// A member names no declared handler.
    #[error("handler '{handler}' lists unknown member '{member}'")]
    UnknownMember {
        /// Primary key of the handler.
        handler: String,
        /// The member that was given.
        member: String,
    },
}

#[derive(Facet, Clone, Debug)]
/// One declared handler type.
pub struct HandlerSpec {
    /// Key aliases, primary key first.
    pub keys: Vec<String>,
    #[facet(default = String::from("plain"))]
    /// `plain`, `mapped` or `combinator`.
    pub kind: String,
    #[facet(default = Vec::new())]
    /// Members of a mapped or combinator handler, by any of their keys, or `raw`.
    pub members: Vec<String>,
    #[facet(default = true)]
    /// Whether the handler is recognised at section level.
    pub root: bool,
}

#[derive(Facet, Clone, Debug)]
/// Build defaults and declared handlers loaded from structr.toml or falling back to defaults.
pub struct Config {
    #[facet(default = String::from("root"))]
    /// Name given to the root section.
    pub root_name: String,
    #[facet(default = false)]
    /// Whether sections are traced through construction hooks.
    pub run_hooks: bool,
    #[facet(default = Vec::new())]
    /// Declared handler types.
    pub handlers: Vec<HandlerSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_name: String::from("root"),
            run_hooks: false,
            handlers: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from structr.toml in the working directory if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from `config_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|message| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the parser diagnostic if the text does not match the schema.
    pub fn parse(contents: &str) -> Result<Self, String> {
        facet_toml::from_str::<Self>(contents).map_err(|e| e.to_string())
    }

    /// Register every declared handler and return the root vocabulary.
    ///
    /// Members are resolved after all handlers are registered, so handlers may refer to each
    /// other (or themselves) in any order.
    ///
    /// # Errors
    ///
    /// Returns an error for handlers without keys, unknown kinds and unknown members.
    pub fn registry(&self) -> Result<(Registry, Vec<HandlerId>), ConfigError> {
        let mut registry = Registry::new();
        let mut ids = Vec::with_capacity(self.handlers.len());

        for (index, spec) in self.handlers.iter().enumerate() {
            let keys: Vec<&str> = spec.keys.iter().map(String::as_str).collect();
            let Some(primary) = keys.first() else {
                return Err(ConfigError::EmptyKeys { index });
            };
            let id = match spec.kind.as_str() {
                "plain" => registry.generic(&keys),
                "mapped" => registry.mapped(&keys, &[]),
                "combinator" => registry.combinator(&keys, &[]),
                other => {
                    return Err(ConfigError::UnknownKind {
                        handler: (*primary).to_string(),
                        kind: other.to_string(),
                    })
                }
            };
            ids.push(id);
        }

        for (spec, id) in self.handlers.iter().zip(&ids) {
            let mut members = Vec::with_capacity(spec.members.len());
            for member in &spec.members {
                if member == RAW_MEMBER {
                    members.push(HandlerId::RAW);
                    continue;
                }
                let Some(found) = registry.find(&ids, member) else {
                    return Err(ConfigError::UnknownMember {
                        handler: spec.keys.first().cloned().unwrap_or_default(),
                        member: member.clone(),
                    });
                };
                members.push(found);
            }
            registry.add_members(*id, &members);
        }

        let roots = self
            .handlers
            .iter()
            .zip(&ids)
            .filter(|(spec, _)| spec.root)
            .map(|(_, id)| *id)
            .collect();
        Ok((registry, roots))
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
