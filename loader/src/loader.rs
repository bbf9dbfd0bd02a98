//! Staged compilation pipeline.
//!
//! Source files flow through three stages. PRE includes are loaded
//! serially in configuration order, with a pool drain after each include
//! so later files may depend on earlier ones. LOAD includes are fanned
//! out across the worker pool. POST includes are serial again. The pool
//! is drained unconditionally at the end of every stage, so stage
//! boundaries are hard barriers even for empty stages. After POST the
//! model is tagged with ownership and validated as a whole.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modl_core::{Fatal, ModlResult};
use modl_model::{tag_all, validate, ModelCtx};
use modl_parser::parse_str;
use modl_schema::{dispatch, Schema};
use tracing::{debug, info};

use crate::config::{Config, Stage};
use crate::pool::Pool;

/// Workers in the parallel load stage.
const WORKERS: usize = 4;

/// Compiles the model described by a configuration file and returns the
/// populated context.
pub fn compile(config_path: &Path) -> ModlResult<Arc<ModelCtx>> {
    let text = fs::read_to_string(config_path).map_err(|err| {
        Fatal::new(
            format!("file[{}]", config_path.display()),
            "read configuration",
            err.to_string(),
        )
    })?;
    let root = parse_str(&text, &config_path.display().to_string())
        .map_err(|err| parse_fatal(config_path, err))?;
    let config = Config::from_doc(&root)?;

    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let ctx = Arc::new(ModelCtx::default());
    run(Arc::clone(&ctx), &config, base)?;
    Ok(ctx)
}

/// Runs the full pipeline against an existing context. Domain paths are
/// resolved relative to `base`.
pub fn run(ctx: Arc<ModelCtx>, config: &Config, base: &Path) -> ModlResult<()> {
    info!(library = %config.name, "compiling model");
    let schema = Arc::new(modl_dialect::schema()?);
    let pool = Pool::new(WORKERS);

    for stage in [Stage::Pre, Stage::Load, Stage::Post] {
        run_stage(&ctx, config, base, &schema, &pool, stage)?;
        // Hard barrier between stages, even when the stage queued nothing.
        pool.drain()?;
        debug!(stage = stage.name(), "stage complete");
    }

    tag_all(&ctx)?;
    validate(&ctx)?;
    info!(
        library = %config.name,
        classes = ctx.classes.len(),
        types = ctx.types.len(),
        "model compiled"
    );
    Ok(())
}

fn run_stage(
    ctx: &Arc<ModelCtx>,
    config: &Config,
    base: &Path,
    schema: &Arc<Schema>,
    pool: &Pool,
    stage: Stage,
) -> ModlResult<()> {
    for domain in &config.domains {
        let domain_path = base.join(&domain.path);
        for feature in &domain.features {
            for include in &feature.includes {
                if include.stage != stage {
                    continue;
                }
                let dir = domain_path.join(&include.dir);
                let files = discover(&dir, &include.ext)?;
                debug!(
                    stage = stage.name(),
                    domain = %domain.name,
                    feature = %feature.name,
                    dir = %dir.display(),
                    files = files.len(),
                    "loading include"
                );
                for file in files {
                    if stage == Stage::Load {
                        let ctx = Arc::clone(ctx);
                        let schema = Arc::clone(schema);
                        pool.submit(move || load_file(&ctx, &schema, &file));
                    } else {
                        load_file(ctx, schema, &file)?;
                    }
                }
                if stage != Stage::Load {
                    // Serial stages settle after each include so later
                    // includes see everything earlier ones created.
                    pool.drain()?;
                }
            }
        }
    }
    Ok(())
}

/// Lists the files in `dir` carrying extension `ext`, sorted by path for
/// deterministic serial-stage order.
fn discover(dir: &Path, ext: &str) -> ModlResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| {
        Fatal::new(
            format!("dir[{}]", dir.display()),
            "list source files",
            err.to_string(),
        )
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Fatal::new(
                format!("dir[{}]", dir.display()),
                "list source files",
                err.to_string(),
            )
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_file(ctx: &ModelCtx, schema: &Schema, path: &Path) -> ModlResult<()> {
    debug!(file = %path.display(), "loading");
    let text = fs::read_to_string(path).map_err(|err| {
        Fatal::new(
            format!("file[{}]", path.display()),
            "read source",
            err.to_string(),
        )
    })?;
    let root =
        parse_str(&text, &path.display().to_string()).map_err(|err| parse_fatal(path, err))?;
    dispatch(schema, ctx, &root)
}

fn parse_fatal(path: &Path, err: modl_parser::ParseError) -> Fatal {
    Fatal::new(
        format!("file[{}]", path.display()),
        "parse",
        err.to_string(),
    )
}
