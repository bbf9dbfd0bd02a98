//! Scenario fixture builder.
//!
//! A fixture materializes an in-memory description of a source tree into
//! a temporary directory, writes a matching build configuration, and
//! runs the full pipeline over it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use modl_core::{Fatal, ModlResult};
use modl_loader::{compile, Stage};
use modl_model::ModelCtx;

/// A buildable source tree: named files assigned to pipeline stages.
pub struct Fixture {
    name: String,
    files: Vec<(Stage, String, String)>,
}

impl Fixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Adds a source file to the serial PRE stage.
    pub fn pre(self, file: impl Into<String>, source: impl Into<String>) -> Self {
        self.file(Stage::Pre, file, source)
    }

    /// Adds a source file to the parallel LOAD stage.
    pub fn load(self, file: impl Into<String>, source: impl Into<String>) -> Self {
        self.file(Stage::Load, file, source)
    }

    /// Adds a source file to the serial POST stage.
    pub fn post(self, file: impl Into<String>, source: impl Into<String>) -> Self {
        self.file(Stage::Post, file, source)
    }

    fn file(mut self, stage: Stage, file: impl Into<String>, source: impl Into<String>) -> Self {
        self.files.push((stage, file.into(), source.into()));
        self
    }

    /// Writes the tree out and compiles it, returning the populated model.
    pub fn compile(&self) -> ModlResult<Arc<ModelCtx>> {
        init_logging();
        let tmp = tempfile::tempdir()
            .map_err(|e| Fatal::new("fixture", "create temp dir", e.to_string()))?;
        let root = tmp.path();

        for stage in [Stage::Pre, Stage::Load, Stage::Post] {
            let dir = root.join("model").join(stage.name());
            fs::create_dir_all(&dir)
                .map_err(|e| Fatal::new("fixture", "create stage dir", e.to_string()))?;
        }
        for (stage, file, source) in &self.files {
            let path = root.join("model").join(stage.name()).join(file);
            write(&path, source)?;
        }

        let config = format!(
            r#"
config<{}> {{
    domain<main;path=model> {{
        feature<all> {{
            include<dir=pre;ext=modl;stage=pre>
            include<dir=load;ext=modl;stage=load>
            include<dir=post;ext=modl;stage=post>
        }}
    }}
}}
"#,
            self.name
        );
        let config_path = root.join("build.modl");
        write(&config_path, &config)?;

        compile(&config_path)
    }
}

/// Honors `RUST_LOG`; repeated calls are no-ops (one subscriber per
/// test binary).
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write(path: &Path, text: &str) -> ModlResult<()> {
    fs::write(path, text)
        .map_err(|e| Fatal::new(format!("file[{}]", path.display()), "write", e.to_string()))
}
