use crate::types::dimension::{Dimension, DimensionScheme};
use crate::types::model::{Role, Scale, Subject};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hvi",
    version,
    about = "Human-risk and digital-continuity assessment CLI"
)]
pub struct Cli {
    /// Workspace directory containing hvi.toml
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create hvi.toml and seed the default question bank
    Init(InitCommand),
    /// Manage organizations
    #[command(subcommand)]
    Org(OrgCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage the question bank
    #[command(subcommand)]
    Question(QuestionCommand),
    /// Submit and inspect assessments
    #[command(subcommand)]
    Assess(AssessCommand),
    /// Submit every *.json file under a directory
    Import(ImportCommand),
    /// Render the report for one assessment
    Report(ReportCommand),
    /// Score history for one subject
    Trend(TrendCommand),
    /// Compare an assessment against the subject's peers
    Compare(CompareCommand),
    /// Recommendations for one assessment
    Recommend(RecommendCommand),
    /// Check configuration and store integrity
    Lint,
    /// Write a checksummed JSON export of the store
    Export,
    /// Serve the REST API
    Serve(ServeCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Scheme {
    Capability,
    Exposure,
}

impl From<Scheme> for DimensionScheme {
    fn from(value: Scheme) -> Self {
        match value {
            Scheme::Capability => Self::Capability,
            Scheme::Exposure => Self::Exposure,
        }
    }
}

#[derive(Args)]
pub struct InitCommand {
    /// Workspace name, defaults to the directory name
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_enum, default_value = "capability")]
    pub scheme: Scheme,
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long)]
    pub no_overwrite: bool,
}

#[derive(Subcommand)]
pub enum OrgCommand {
    Add {
        name: String,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        employees: Option<u32>,
    },
    List,
    Show {
        id: String,
    },
    Remove {
        id: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Admin,
    Assessor,
    Respondent,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Self::Admin,
            RoleArg::Assessor => Self::Assessor,
            RoleArg::Respondent => Self::Respondent,
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value = "respondent")]
        role: RoleArg,
        /// Organization id
        #[arg(long)]
        org: Option<String>,
    },
    List {
        /// Only users of this organization
        #[arg(long)]
        org: Option<String>,
    },
    Show {
        id: String,
    },
    Remove {
        id: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScaleArg {
    Likert,
    Percent,
    Binary,
}

impl From<ScaleArg> for Scale {
    fn from(value: ScaleArg) -> Self {
        match value {
            ScaleArg::Likert => Self::Likert,
            ScaleArg::Percent => Self::Percent,
            ScaleArg::Binary => Self::Binary,
        }
    }
}

#[derive(Subcommand)]
pub enum QuestionCommand {
    Add {
        /// d1..d4 or a dimension name
        #[arg(long)]
        dimension: Dimension,
        #[arg(long)]
        text: String,
        #[arg(long, value_enum, default_value = "likert")]
        scale: ScaleArg,
        #[arg(long, default_value_t = 1.0)]
        weight: f64,
        /// Higher answers mean more risk
        #[arg(long)]
        reverse: bool,
    },
    List {
        /// Include inactive questions
        #[arg(long)]
        all: bool,
    },
    Show {
        id: String,
    },
    Activate {
        id: String,
    },
    Deactivate {
        id: String,
    },
    Remove {
        id: String,
    },
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SubjectArgs {
    /// User id
    #[arg(long)]
    pub user: Option<String>,
    /// Organization id
    #[arg(long)]
    pub org: Option<String>,
}

impl SubjectArgs {
    pub fn subject(&self) -> Option<Subject> {
        match (&self.user, &self.org) {
            (Some(user), _) => Some(Subject::user(user)),
            (None, Some(org)) => Some(Subject::organization(org)),
            (None, None) => None,
        }
    }
}

#[derive(Subcommand)]
pub enum AssessCommand {
    /// Submit one submission file
    Submit {
        file: PathBuf,
        /// Store as a draft without scoring
        #[arg(long)]
        draft: bool,
    },
    List {
        #[arg(long, conflicts_with = "org")]
        user: Option<String>,
        #[arg(long)]
        org: Option<String>,
    },
    Show {
        id: String,
    },
    Remove {
        id: String,
    },
    /// Score a draft and mark it submitted
    Finalize {
        id: String,
    },
    /// Recompute every stored score with the current configuration
    Rescore,
}

#[derive(Args)]
pub struct ImportCommand {
    pub dir: PathBuf,
}

#[derive(Args)]
pub struct ReportCommand {
    pub id: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
    #[arg(long)]
    pub with_trend: bool,
    #[arg(long)]
    pub with_peers: bool,
}

#[derive(Args)]
pub struct TrendCommand {
    #[command(flatten)]
    pub subject: SubjectArgs,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ViewFormat,
}

#[derive(Args)]
pub struct CompareCommand {
    pub id: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ViewFormat,
}

#[derive(Args)]
pub struct RecommendCommand {
    pub id: String,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ViewFormat,
}

#[derive(Args)]
pub struct ServeCommand {
    /// Overrides [server].port
    #[arg(long)]
    pub port: Option<u16>,
    /// Overrides [server].bind
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ViewFormat {
    Json,
    Md,
}
