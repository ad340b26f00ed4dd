use tracing::info;

use crate::api::{Backend, created_task};
use crate::cli::commands::TaskAddArgs;
use crate::cli::output::*;
use crate::model::task::TaskDraft;
use crate::ops::estimates;
use crate::ops::gantt;
use crate::ops::task_tree::{TaskTreeEditor, tasks_from_remote};

use super::parse_task_type;

fn load_editor(backend: &dyn Backend, project: u64) -> Result<TaskTreeEditor, Box<dyn std::error::Error>> {
    let remote = backend.list_tasks(project)?;
    Ok(TaskTreeEditor::new(tasks_from_remote(remote)))
}

pub fn cmd_list(backend: &dyn Backend, project: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let editor = load_editor(backend, project)?;
    if json {
        let tasks: Vec<TaskJson> = editor.tasks().iter().map(task_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if editor.task_count() == 0 {
        println!("no tasks");
    } else {
        for task in editor.tasks() {
            for line in format_task_tree(task, 0) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn cmd_stats(backend: &dyn Backend, project: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let editor = load_editor(backend, project)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats_to_json(&editor))?);
    } else {
        for line in format_stats(&editor) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Build the draft for `tasks add`, resolving the assignee id against the
/// directory of the task's discipline
fn draft_from_args(backend: &dyn Backend, args: TaskAddArgs) -> Result<TaskDraft, Box<dyn std::error::Error>> {
    let mut draft = TaskDraft::new(args.title, args.description);
    let task_type = args
        .task_type
        .as_deref()
        .map(parse_task_type)
        .transpose()?;
    draft.task_type = task_type;

    if let Some(raw) = args.estimate {
        let normalized = estimates::normalize_input(&raw)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("invalid estimate '{}' (expected whole days)", raw))?;
        draft.estimates = Some(normalized);
    }

    if let Some(id) = args.assignee {
        let members = backend.list_users(task_type.unwrap_or_default())?;
        let member = members
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| format!("no team member {} for this task type", id))?;
        draft.assignee = Some(member.as_assignee());
    }
    Ok(draft)
}

pub fn cmd_add(
    backend: &dyn Backend,
    project: u64,
    args: TaskAddArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut draft = draft_from_args(backend, args)?;
    let mut editor = TaskTreeEditor::default();
    let task = editor
        .add_task(&mut draft)
        .ok_or("title and description are required")?;

    let envelope = backend.create_task(project, &task)?;
    let server_id = created_task(&envelope).map(|c| c.id);
    info!(code = %envelope.code, ?server_id, "task created");

    if json {
        let out = CreatedJson {
            id: server_id,
            code: envelope.code.into(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if envelope.is_success() {
        match server_id {
            Some(id) => println!("created task {}: {}", id, task.title),
            None => println!("created task: {}", task.title),
        }
    } else {
        return Err(format!("backend did not accept the task: {}", envelope.code).into());
    }
    Ok(())
}

pub fn cmd_gantt_generate(backend: &dyn Backend, project: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    backend.generate_gantt(project)?;
    if json {
        println!("{}", serde_json::json!({ "generated": true }));
    } else {
        println!("gantt chart generated for project {}", project);
    }
    Ok(())
}

pub fn cmd_gantt_show(backend: &dyn Backend, project: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let chart = backend.gantt_chart(project)?;
    let today = chrono::Local::now().date_naive();
    let view = gantt::prepare(chart, today);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in format_gantt(&view) {
            println!("{}", line);
        }
    }
    Ok(())
}
