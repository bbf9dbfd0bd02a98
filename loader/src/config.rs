//! Build configuration.
//!
//! A build is described in the same surface syntax as the model sources,
//! under its own vocabulary:
//!
//! ```text
//! config<mylib> {
//!     domain<core;path=model/core> {
//!         feature<base> {
//!             include<dir=setup;ext=modl;stage=pre>
//!             include<dir=classes;ext=modl;stage=load>
//!             include<dir=finish;ext=modl;stage=post>
//!         }
//!     }
//!     output<dest=gen>
//! }
//! ```
//!
//! The tree is small and fixed, so it is walked directly off the parsed
//! document rather than going through a dispatch schema.

use std::path::PathBuf;
use std::str::FromStr;

use modl_core::ModlResult;
use modl_parser::DocNode;
use thiserror::Error;
use tracing::debug;

/// Structural faults in a build configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config node found")]
    NoConfigNode,

    #[error("no domains declared")]
    NoDomains,

    #[error("unknown stage '{0}', legal set: [pre, load, post]")]
    UnknownStage(String),
}

/// Pipeline stage an include group is loaded in.
///
/// PRE and POST includes are processed serially in configuration order;
/// LOAD includes are fanned out across the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pre,
    Load,
    Post,
}

impl Stage {
    pub fn parse(node: &DocNode, text: &str) -> ModlResult<Stage> {
        text.parse()
            .map_err(|err: ConfigError| node.fatal("parse stage", err.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Pre => "pre",
            Stage::Load => "load",
            Stage::Post => "post",
        }
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Stage, ConfigError> {
        match text {
            "pre" => Ok(Stage::Pre),
            "load" => Ok(Stage::Load),
            "post" => Ok(Stage::Post),
            other => Err(ConfigError::UnknownStage(other.to_string())),
        }
    }
}

/// One directory of source files, loaded at a given stage.
#[derive(Debug, Clone)]
pub struct Include {
    pub dir: PathBuf,
    pub ext: String,
    pub stage: Stage,
}

/// A named group of includes inside a domain.
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub includes: Vec<Include>,
}

/// A source domain: a named root directory holding feature trees.
#[derive(Debug, Clone)]
pub struct Domain {
    pub name: String,
    pub path: PathBuf,
    pub features: Vec<Feature>,
}

/// A complete build configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub domains: Vec<Domain>,
    /// Destination directory for generated artifacts. Recorded for
    /// consumers of the compiled model; the loader itself never writes it.
    pub output: Option<PathBuf>,
}

impl Config {
    /// Builds a configuration from a parsed document root.
    pub fn from_doc(root: &DocNode) -> ModlResult<Config> {
        let config = root
            .first_child("config")
            .ok_or_else(|| root.fatal("read config", ConfigError::NoConfigNode.to_string()))?;
        let name = config.require_named_value("name")?.to_string();

        let mut domains = Vec::new();
        for node in config.children("domain") {
            domains.push(Self::read_domain(node)?);
        }
        if domains.is_empty() {
            return Err(config.fatal("read config", ConfigError::NoDomains.to_string()));
        }

        let output = match config.first_child("output") {
            Some(node) => Some(PathBuf::from(node.require_named_value("dest")?)),
            None => None,
        };

        Ok(Config {
            name,
            domains,
            output,
        })
    }

    fn read_domain(node: &DocNode) -> ModlResult<Domain> {
        let name = node.require_named_value("name")?.to_string();
        let path = PathBuf::from(node.require_named_value("path")?);

        let mut features = Vec::new();
        for child in node.children("feature") {
            features.push(Self::read_feature(child)?);
        }
        Ok(Domain {
            name,
            path,
            features,
        })
    }

    fn read_feature(node: &DocNode) -> ModlResult<Feature> {
        let name = node.require_named_value("name")?.to_string();

        let mut includes = Vec::new();
        for child in node.children("include") {
            includes.push(Self::read_include(child)?);
        }
        Ok(Feature { name, includes })
    }

    fn read_include(node: &DocNode) -> ModlResult<Include> {
        let dir = PathBuf::from(node.require_named_value("dir")?);
        let ext = match node.named_value("ext") {
            Some(ext) => ext.to_string(),
            None => {
                debug!(dir = %dir.display(), "include has no ext, defaulting to 'modl'");
                "modl".to_string()
            }
        };
        let stage = match node.named_value("stage") {
            Some(text) => Stage::parse(node, text)?,
            None => {
                debug!(dir = %dir.display(), "include has no stage, defaulting to load");
                Stage::Load
            }
        };
        Ok(Include { dir, ext, stage })
    }
}
