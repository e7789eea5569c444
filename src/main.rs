mod analyze;
mod cli;
mod config;
mod error;
mod generator;
mod http;
mod intake;
mod journal;
mod report;
mod scoring;
mod store;
mod types;

use crate::analyze::ReportOptions;
use crate::error::{HviError, Result};
use crate::journal::{Activity, ActivityJournal};
use crate::store::Store;
use crate::types::config::HviConfig;
use crate::types::model::{
    AssessmentStatus, OrganizationInput, QuestionInput, Subject, UserInput,
};
use crate::types::report::Finding;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const BLOCKING: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hvi={level},tower_http={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// A configured workspace: validated config, opened store and journal.
struct Workspace {
    root: PathBuf,
    config: HviConfig,
    store: Store,
    journal: ActivityJournal,
}

impl Workspace {
    fn open(root: &Path) -> Result<Self> {
        let config = config::require_config(root)?;
        let store = Store::open(&config.data_dir(root))?;
        let journal = ActivityJournal::new(root, &config);
        debug!(root = %root.display(), "workspace opened");
        Ok(Self {
            root: root.to_path_buf(),
            config,
            store,
            journal,
        })
    }

    /// Persists the store, then journals the change.
    fn commit(&mut self, milestone: bool, activity: Activity) -> Result<()> {
        self.store.save()?;
        if milestone {
            self.journal.milestone(activity)
        } else {
            self.journal.record(activity)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", report::json::to_json(value)?);
    Ok(())
}

fn print_findings(findings: &[Finding]) {
    for finding in findings {
        let level = if finding.blocking { "BLOCKING" } else { "WARN" };
        println!("[{}] {}: {}", level, finding.id, finding.title);
        println!("  {}", finding.body);
    }
}

fn workspace_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "workspace".to_string())
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let root = cli.root;

    match cli.command {
        cli::Commands::Init(cmd) => {
            let options = generator::init::InitOptions {
                name: cmd.name.unwrap_or_else(|| workspace_name(&root)),
                scheme: cmd.scheme.into(),
                dry_run: cmd.dry_run,
                no_overwrite: cmd.no_overwrite,
            };
            let outcome = generator::init::execute_init(&root, &options)?;
            if !options.dry_run {
                println!(
                    "init: {} {}, {} question(s) seeded",
                    outcome.config_path.display(),
                    if outcome.config_written { "written" } else { "kept" },
                    outcome.seeded_questions
                );
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Org(cmd) => run_org(&root, cmd),
        cli::Commands::User(cmd) => run_user(&root, cmd),
        cli::Commands::Question(cmd) => run_question(&root, cmd),
        cli::Commands::Assess(cmd) => run_assess(&root, cmd),
        cli::Commands::Import(cmd) => {
            let mut ws = Workspace::open(&root)?;
            let outcomes = intake::import_dir(&mut ws.store, &cmd.dir, &ws.config)?;
            ws.store.save()?;
            let mut imported = 0usize;
            let mut skipped = 0usize;
            for outcome in &outcomes {
                match &outcome.status {
                    intake::ImportStatus::Imported(id) => {
                        imported += 1;
                        println!("imported {} -> {}", outcome.path.display(), id);
                        let subject = ws.store.assessment(id)?.subject.clone();
                        ws.journal.milestone(
                            Activity::new("assessment.submitted", id.as_str())
                                .with_subject(&subject)
                                .with_detail(format!("source={}", outcome.path.display())),
                        )?;
                    }
                    intake::ImportStatus::Duplicate(existing) => {
                        skipped += 1;
                        println!(
                            "duplicate {} (matches {})",
                            outcome.path.display(),
                            existing
                        );
                    }
                    intake::ImportStatus::Failed(message) => {
                        skipped += 1;
                        println!("failed {}: {}", outcome.path.display(), message);
                    }
                }
            }
            info!(imported, skipped, "import finished");
            println!("import: {imported} imported, {skipped} skipped");
            Ok(if skipped > 0 {
                exit_code::WARNINGS
            } else {
                exit_code::SUCCESS
            })
        }
        cli::Commands::Report(cmd) => {
            let ws = Workspace::open(&root)?;
            let options = ReportOptions {
                with_trend: cmd.with_trend,
                with_peers: cmd.with_peers,
            };
            let assessment_report = analyze::build_report(&ws.store, &cmd.id, &ws.config, options)?;
            let output_format = match cmd.format {
                cli::ReportFormat::Json => report::OutputFormat::Json,
                cli::ReportFormat::Md => report::OutputFormat::Md,
                cli::ReportFormat::Csv => report::OutputFormat::Csv,
            };
            println!("{}", report::render(&assessment_report, output_format)?);

            let has_blocking = assessment_report.has_blocking();
            let has_warnings = !assessment_report.findings.is_empty();
            if has_blocking {
                Ok(exit_code::BLOCKING)
            } else if has_warnings {
                Ok(exit_code::WARNINGS)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
        cli::Commands::Trend(cmd) => {
            let ws = Workspace::open(&root)?;
            let subject = cmd
                .subject
                .subject()
                .ok_or_else(|| {
                    HviError::InvalidInput("one of --user or --org is required".into())
                })?;
            ws.store.subject_exists(&subject)?;
            let history = ws.store.history(&subject);
            let trend = analyze::trend::trend(&subject, &history, ws.config.trend_epsilon());
            match cmd.format {
                cli::ViewFormat::Json => print_json(&trend)?,
                cli::ViewFormat::Md => {
                    let names = ws.config.dimension_names().into_array();
                    println!("{}", report::md::trend_markdown(&trend, &names));
                }
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Compare(cmd) => {
            let ws = Workspace::open(&root)?;
            let options = ReportOptions {
                with_trend: false,
                with_peers: true,
            };
            let assessment_report = analyze::build_report(&ws.store, &cmd.id, &ws.config, options)?;
            let Some(peers) = assessment_report.peers else {
                return Ok(exit_code::SUCCESS);
            };
            match cmd.format {
                cli::ViewFormat::Json => print_json(&peers)?,
                cli::ViewFormat::Md => println!(
                    "{}",
                    report::md::peers_markdown(&peers, &assessment_report.dimension_names)
                ),
            }
            Ok(if peers.peer_count == 0 {
                exit_code::WARNINGS
            } else {
                exit_code::SUCCESS
            })
        }
        cli::Commands::Recommend(cmd) => {
            let ws = Workspace::open(&root)?;
            let assessment_report =
                analyze::build_report(&ws.store, &cmd.id, &ws.config, ReportOptions::default())?;
            let recommendations = assessment_report.recommendations;
            match cmd.format {
                cli::ViewFormat::Json => print_json(&recommendations)?,
                cli::ViewFormat::Md if recommendations.is_empty() => {
                    println!("recommend: no recommendations");
                }
                cli::ViewFormat::Md => {
                    println!("recommendations:");
                    for recommendation in &recommendations {
                        println!(
                            "- {} [{} {:?}/{:?}] priority {:.1}",
                            recommendation.id,
                            recommendation.title,
                            recommendation.impact,
                            recommendation.effort,
                            recommendation.priority
                        );
                        println!("  {}", recommendation.summary);
                    }
                }
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Lint => {
            if !root.exists() {
                return Err(HviError::PathNotFound(root.display().to_string()));
            }
            let loaded = config::load_config(&root)?
                .ok_or_else(|| HviError::NotInitialized(root.display().to_string()))?;
            let store = Store::open(&loaded.data_dir(&root))?;
            let journal = ActivityJournal::new(&root, &loaded);
            let mut findings = analyze::lint::lint_findings(&store, &loaded);
            findings.extend(analyze::lint::journal_findings(&store, &journal));

            if findings.is_empty() {
                println!("lint: no findings");
                return Ok(exit_code::SUCCESS);
            }
            print_findings(&findings);
            if findings.iter().any(|finding| finding.blocking) {
                Ok(exit_code::BLOCKING)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::Export => {
            let ws = Workspace::open(&root)?;
            let activity = ws.journal.entries()?;
            let bundle = generator::export::ExportBundle::new(
                &ws.config.workspace.name,
                &ws.store,
                &activity,
            );
            let path = generator::export::write_export(&ws.root, &bundle)?;
            ws.journal.milestone(
                Activity::new("store.exported", path.display().to_string())
                    .with_detail(format!("activity={}", activity.len())),
            )?;
            println!("export: {}", path.display());
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Serve(cmd) => {
            let ws = Workspace::open(&root)?;
            let bind = cmd.bind.unwrap_or_else(|| ws.config.bind_address());
            let port = cmd.port.unwrap_or_else(|| ws.config.port());
            let state = http::AppState::shared(ws.store, ws.journal, ws.config);
            let server = http::HttpServer::new(state, bind, port);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server.start())?;
            Ok(exit_code::SUCCESS)
        }
    }
}

fn run_org(root: &Path, cmd: cli::OrgCommand) -> Result<i32> {
    let mut ws = Workspace::open(root)?;
    match cmd {
        cli::OrgCommand::Add {
            name,
            sector,
            employees,
        } => {
            let organization = ws.store.create_organization(OrganizationInput {
                name,
                sector,
                employees,
            })?;
            ws.commit(
                false,
                Activity::new("organization.created", organization.id.as_str())
                    .with_detail(organization.name.as_str()),
            )?;
            println!("created organization {}", organization.id);
        }
        cli::OrgCommand::List => {
            for organization in ws.store.organizations() {
                println!(
                    "{}  {}  sector={}",
                    organization.id,
                    organization.name,
                    organization.sector.as_deref().unwrap_or("-")
                );
            }
        }
        cli::OrgCommand::Show { id } => print_json(ws.store.organization(&id)?)?,
        cli::OrgCommand::Remove { id } => {
            ws.store.remove_organization(&id)?;
            ws.commit(true, Activity::new("organization.removed", id.as_str()))?;
            println!("removed organization {id}");
        }
    }
    Ok(exit_code::SUCCESS)
}

fn run_user(root: &Path, cmd: cli::UserCommand) -> Result<i32> {
    let mut ws = Workspace::open(root)?;
    match cmd {
        cli::UserCommand::Add {
            name,
            email,
            role,
            org,
        } => {
            let user = ws.store.create_user(UserInput {
                name,
                email,
                role: role.into(),
                organization_id: org,
            })?;
            ws.commit(false, Activity::new("user.created", user.id.as_str()))?;
            println!("created user {}", user.id);
        }
        cli::UserCommand::List { org } => {
            let users = ws.store.users().iter().filter(|user| {
                org.as_deref()
                    .map_or(true, |org| user.organization_id.as_deref() == Some(org))
            });
            for user in users {
                println!("{}  {}  <{}>  {:?}", user.id, user.name, user.email, user.role);
            }
        }
        cli::UserCommand::Show { id } => print_json(ws.store.user(&id)?)?,
        cli::UserCommand::Remove { id } => {
            ws.store.remove_user(&id)?;
            ws.commit(true, Activity::new("user.removed", id.as_str()))?;
            println!("removed user {id}");
        }
    }
    Ok(exit_code::SUCCESS)
}

fn run_question(root: &Path, cmd: cli::QuestionCommand) -> Result<i32> {
    let mut ws = Workspace::open(root)?;
    match cmd {
        cli::QuestionCommand::Add {
            dimension,
            text,
            scale,
            weight,
            reverse,
        } => {
            let question = ws.store.create_question(QuestionInput {
                dimension,
                text,
                scale: scale.into(),
                weight,
                reverse,
                active: true,
            })?;
            ws.commit(false, Activity::new("question.created", question.id.as_str()))?;
            println!("created question {}", question.id);
        }
        cli::QuestionCommand::List { all } => {
            let names = ws.config.dimension_names();
            for question in ws.store.questions().iter().filter(|q| all || q.active) {
                println!(
                    "{}  [{}]  {:?}{}{}  {}",
                    question.id,
                    names.get(question.dimension),
                    question.scale,
                    if question.reverse { " reverse" } else { "" },
                    if question.active { "" } else { " inactive" },
                    question.text
                );
            }
        }
        cli::QuestionCommand::Show { id } => print_json(ws.store.question(&id)?)?,
        cli::QuestionCommand::Activate { id } => {
            ws.store.set_question_active(&id, true)?;
            ws.commit(false, Activity::new("question.activated", id.as_str()))?;
            println!("activated question {id}");
        }
        cli::QuestionCommand::Deactivate { id } => {
            ws.store.set_question_active(&id, false)?;
            ws.commit(false, Activity::new("question.deactivated", id.as_str()))?;
            println!("deactivated question {id}");
        }
        cli::QuestionCommand::Remove { id } => {
            ws.store.remove_question(&id)?;
            ws.commit(true, Activity::new("question.removed", id.as_str()))?;
            println!("removed question {id}");
        }
    }
    Ok(exit_code::SUCCESS)
}

fn run_assess(root: &Path, cmd: cli::AssessCommand) -> Result<i32> {
    let mut ws = Workspace::open(root)?;
    match cmd {
        cli::AssessCommand::Submit { file, draft } => {
            let mut submission = intake::read_submission(&file)?;
            if draft {
                submission.status = AssessmentStatus::Draft;
            }
            let assessment = ws.store.submit(submission, &ws.config)?;
            let source = format!("source={}", file.display());
            match &assessment.score {
                Some(card) => {
                    ws.commit(
                        true,
                        Activity::new("assessment.submitted", assessment.id.as_str())
                            .with_subject(&assessment.subject)
                            .with_detail(source),
                    )?;
                    println!(
                        "submitted {} hvi={:.2} maturity={:.2} ({}, risk {})",
                        assessment.id,
                        card.hvi,
                        card.maturity_score,
                        card.maturity_level,
                        card.risk_level
                    );
                }
                None => {
                    ws.commit(
                        false,
                        Activity::new("assessment.drafted", assessment.id.as_str())
                            .with_subject(&assessment.subject)
                            .with_detail(source),
                    )?;
                    println!("draft {}", assessment.id);
                }
            }
        }
        cli::AssessCommand::List { user, org } => {
            let filter = match (user, org) {
                (Some(user), _) => Some(Subject::user(user)),
                (None, Some(org)) => Some(Subject::organization(org)),
                (None, None) => None,
            };
            let assessments = ws
                .store
                .assessments()
                .iter()
                .filter(|assessment| filter.as_ref().map_or(true, |s| &assessment.subject == s));
            for assessment in assessments {
                let hvi = assessment
                    .score
                    .as_ref()
                    .map(|card| format!("{:.2}", card.hvi))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {:?}  {}  hvi={}",
                    assessment.id,
                    assessment.subject,
                    assessment.status,
                    assessment.submitted_at.to_rfc3339(),
                    hvi
                );
            }
        }
        cli::AssessCommand::Show { id } => print_json(ws.store.assessment(&id)?)?,
        cli::AssessCommand::Remove { id } => {
            let assessment = ws.store.remove_assessment(&id)?;
            ws.commit(
                true,
                Activity::new("assessment.removed", id.as_str()).with_subject(&assessment.subject),
            )?;
            println!("removed assessment {id}");
        }
        cli::AssessCommand::Finalize { id } => {
            let assessment = ws.store.finalize(&id, &ws.config)?;
            ws.commit(
                true,
                Activity::new("assessment.submitted", assessment.id.as_str())
                    .with_subject(&assessment.subject)
                    .with_detail("finalized"),
            )?;
            println!("finalized {}", assessment.id);
        }
        cli::AssessCommand::Rescore => {
            let count = ws.store.rescore(&ws.config)?;
            ws.commit(
                true,
                Activity::new("assessments.rescored", "*").with_detail(format!("count={count}")),
            )?;
            println!("rescored {count} assessment(s)");
        }
    }
    Ok(exit_code::SUCCESS)
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
