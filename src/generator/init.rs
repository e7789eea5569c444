use crate::config::{self, DEFAULT_CONFIG_FILE};
use crate::error::{HviError, Result};
use crate::store::{seed, Store};
use crate::types::dimension::DimensionScheme;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeAction {
    Create,
    Overwrite,
    Keep,
}

impl ChangeAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::Keep => "keep",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub name: String,
    pub scheme: DimensionScheme,
    pub dry_run: bool,
    pub no_overwrite: bool,
}

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub config_path: PathBuf,
    pub config_written: bool,
    pub seeded_questions: usize,
}

pub fn render_config(name: &str, scheme: DimensionScheme) -> String {
    let scheme = match scheme {
        DimensionScheme::Capability => "capability",
        DimensionScheme::Exposure => "exposure",
    };
    format!(
        r#"# Generated by hvi init
[workspace]
name = "{name}"
dimension_scheme = "{scheme}"

[scoring]
min_completion = 0.5
trend_epsilon = 2.0

[scoring.weights]
d1 = 0.25
d2 = 0.25
d3 = 0.25
d4 = 0.25

[recommendations]
threshold = 60.0
max_items = 5

[store]
data_dir = ".hvi/data"

[server]
bind = "127.0.0.1"
port = 8080

[journal]
log_sampling = "milestones"
"#,
        name = name.replace('"', "'")
    )
}

/// Writes `hvi.toml` and seeds the default question bank.
pub fn execute_init(root: &Path, options: &InitOptions) -> Result<InitOutcome> {
    let config_path = root.join(DEFAULT_CONFIG_FILE);
    let action = match (config_path.exists(), options.no_overwrite) {
        (false, _) => ChangeAction::Create,
        (true, false) => ChangeAction::Overwrite,
        (true, true) => ChangeAction::Keep,
    };
    println!("{}: {}", action.as_str(), DEFAULT_CONFIG_FILE);

    let questions = seed::default_questions(options.scheme);
    if options.dry_run {
        println!(
            "seed: up to {} default question(s) for the {:?} scheme",
            questions.len(),
            options.scheme
        );
        println!("dry run: no files were written");
        return Ok(InitOutcome {
            config_path,
            config_written: false,
            seeded_questions: 0,
        });
    }

    fs::create_dir_all(root).map_err(HviError::Io)?;
    let config_written = action != ChangeAction::Keep;
    if config_written {
        fs::write(&config_path, render_config(&options.name, options.scheme))
            .map_err(HviError::Io)?;
    }

    let config = config::require_config(root)?;
    let mut store = Store::open(&config.data_dir(root))?;
    let seeded_questions = store.seed_questions(questions)?;
    store.save()?;
    info!(seeded_questions, dir = %store.dir().display(), "workspace initialized");

    Ok(InitOutcome {
        config_path,
        config_written,
        seeded_questions,
    })
}
