mod tasks;

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::api::{Backend, BridgeClient};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::logging::{self, LogTarget};
use crate::model::config::BridgeConfig;
use crate::model::project::PrdSource;
use crate::model::task::TaskType;
use crate::ops::prd::PrdForm;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config_path = config_io::config_path();
    let config = config_io::load_config(&config_path)?;
    logging::init(&config.log, LogTarget::Stderr)?;
    debug!(path = %config_path.display(), "config loaded");

    let Some(command) = cli.command else {
        return Err("no command given (try `bridge --help`)".into());
    };

    let api_url = cli.api_url.as_deref();
    match command {
        // Config commands work without a reachable backend
        Commands::Config(args) => match args.action {
            ConfigAction::Show => cmd_config_show(&config_path, &config, api_url, json),
            ConfigAction::SetUrl(a) => cmd_config_set_url(&config_path, a),
        },
        Commands::Prd(args) => {
            let backend = connect(&config, api_url)?;
            match args.action {
                PrdAction::Submit(a) => cmd_prd_submit(&backend, a, json),
            }
        }
        Commands::Tasks(args) => {
            let project = require_project(cli.project)?;
            let backend = connect(&config, api_url)?;
            match args.action {
                TasksAction::List => tasks::cmd_list(&backend, project, json),
                TasksAction::Stats => tasks::cmd_stats(&backend, project, json),
                TasksAction::Add(a) => tasks::cmd_add(&backend, project, a, json),
            }
        }
        Commands::Gantt(args) => {
            let project = require_project(cli.project)?;
            let backend = connect(&config, api_url)?;
            match args.action {
                GanttAction::Generate => tasks::cmd_gantt_generate(&backend, project, json),
                GanttAction::Show => tasks::cmd_gantt_show(&backend, project, json),
            }
        }
        Commands::Users(args) => cmd_users(&connect(&config, api_url)?, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Backend client for the effective base URL: flag or env first, then config
pub fn connect(config: &BridgeConfig, api_url: Option<&str>) -> Result<BridgeClient, Box<dyn std::error::Error>> {
    let base_url = api_url.unwrap_or(&config.api.base_url);
    let client = BridgeClient::new(base_url, Duration::from_secs(config.api.timeout_secs))?;
    Ok(client)
}

fn require_project(project: Option<u64>) -> Result<u64, Box<dyn std::error::Error>> {
    project.ok_or_else(|| "no project given (use -p <ID>)".into())
}

fn parse_task_type(s: &str) -> Result<TaskType, String> {
    TaskType::parse(s).ok_or_else(|| {
        format!("unknown task type '{}' (expected: general, fe, be)", s)
    })
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_show(
    path: &Path,
    config: &BridgeConfig,
    api_url: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut effective = config.clone();
    if let Some(url) = api_url {
        effective.api.base_url = url.to_string();
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&config_to_json(path, &effective))?);
    } else {
        println!("config:   {}", path.display());
        println!("base_url: {}", effective.api.base_url);
        println!("timeout:  {}s", effective.api.timeout_secs);
        println!("log:      {}", effective.log.level);
    }
    Ok(())
}

fn cmd_config_set_url(path: &Path, args: SetUrlArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Validate before touching the file
    BridgeClient::new(&args.url, Duration::from_secs(1))?;
    let (_, mut doc) = config_io::read_config(path)?;
    config_io::set_base_url(&mut doc, &args.url);
    config_io::write_config(path, &doc)?;
    println!("base_url = {}", args.url);
    Ok(())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn cmd_users(backend: &dyn Backend, args: UsersArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let task_type = args
        .task_type
        .as_deref()
        .map(parse_task_type)
        .transpose()?
        .unwrap_or_default();
    let users = backend.list_users(task_type)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else {
        for member in &users {
            println!("{}", format_member_line(member));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PRD
// ---------------------------------------------------------------------------

fn read_prd_text(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(file)
        .map_err(|e| format!("could not read {}: {}", file.display(), e).into())
}

fn prd_form(args: &PrdSubmitArgs, text: String) -> PrdForm {
    match &args.confluence_url {
        Some(url) => PrdForm {
            title: args.title.clone(),
            source: PrdSource::Confluence,
            confluence_url: url.clone(),
            fetched_content: Some(text),
            ..Default::default()
        },
        None => PrdForm {
            title: args.title.clone(),
            manual_content: text,
            ..Default::default()
        },
    }
}

fn cmd_prd_submit(backend: &dyn Backend, args: PrdSubmitArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_prd_text(&args.file)?;
    let form = prd_form(&args, text);
    let submission = form
        .submission()
        .ok_or("a non-blank title and PRD text are required")?;
    let created = backend.create_project(&submission)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!(
            "created project {} (~{} features)",
            created.id, submission.estimated_features
        );
    }
    Ok(())
}
