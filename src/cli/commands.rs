use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bridge", about = concat!("bridge v", env!("CARGO_PKG_VERSION"), " - from PRD to plan"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend base URL including the API prefix (overrides the config file)
    #[arg(long, global = true, env = "BRIDGE_API_URL")]
    pub api_url: Option<String>,

    /// Project id to work on
    #[arg(short = 'p', long, global = true)]
    pub project: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a PRD and create a project from it
    Prd(PrdCmd),
    /// List, summarize or add project tasks
    Tasks(TasksCmd),
    /// Generate or show the project's Gantt chart
    Gantt(GanttCmd),
    /// List team members, optionally by discipline
    Users(UsersArgs),
    /// Show or edit the config file
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// PRD
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PrdCmd {
    #[command(subcommand)]
    pub action: PrdAction,
}

#[derive(Subcommand)]
pub enum PrdAction {
    /// Create a project from a PRD document
    Submit(PrdSubmitArgs),
}

#[derive(Args)]
pub struct PrdSubmitArgs {
    /// Project title
    #[arg(long)]
    pub title: String,
    /// Markdown file with the PRD text ("-" reads stdin)
    pub file: PathBuf,
    /// Mark the PRD as exported from this Confluence page
    #[arg(long)]
    pub confluence_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TasksCmd {
    #[command(subcommand)]
    pub action: TasksAction,
}

#[derive(Subcommand)]
pub enum TasksAction {
    /// List tasks with their subtasks
    List,
    /// Show task counts and total effort
    Stats,
    /// Create a task
    Add(TaskAddArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Task title
    pub title: String,
    /// Task description
    #[arg(short, long)]
    pub description: String,
    /// Effort in days (default: 1)
    #[arg(short, long)]
    pub estimate: Option<String>,
    /// Discipline: general, fe or be
    #[arg(short = 't', long = "type")]
    pub task_type: Option<String>,
    /// Team member id to assign
    #[arg(short, long)]
    pub assignee: Option<u64>,
}

// ---------------------------------------------------------------------------
// Gantt
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GanttCmd {
    #[command(subcommand)]
    pub action: GanttAction,
}

#[derive(Subcommand)]
pub enum GanttAction {
    /// Ask the backend to schedule the project
    Generate,
    /// Print the scheduled bars
    Show,
}

// ---------------------------------------------------------------------------
// Users & config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct UsersArgs {
    /// Discipline filter: general, fe or be
    #[arg(short = 't', long = "type")]
    pub task_type: Option<String>,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config path and effective settings
    Show,
    /// Store the backend base URL in the config file
    SetUrl(SetUrlArgs),
}

#[derive(Args)]
pub struct SetUrlArgs {
    /// Base URL, e.g. http://localhost:8000/api
    pub url: String,
}
