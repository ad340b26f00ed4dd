use std::path::Path;

use serde::Serialize;

use crate::model::config::BridgeConfig;
use crate::model::member::TeamMember;
use crate::model::task::Task;
use crate::ops::estimates;
use crate::ops::gantt::GanttView;
use crate::ops::task_tree::TaskTreeEditor;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub estimates: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub priority: &'static str,
    pub task_type: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub tasks: usize,
    pub subtasks: usize,
    pub high_priority: usize,
    pub total_effort: i64,
    /// Sum of subtask estimates, reported apart from `total_effort`
    pub subtask_effort: i64,
}

#[derive(Serialize)]
pub struct CreatedJson {
    pub id: Option<u64>,
    pub code: i64,
}

#[derive(Serialize)]
pub struct ConfigJson {
    pub path: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub log_level: String,
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        estimates: task.estimates.clone(),
        assignee: task.assignee.as_ref().map(|a| a.name.clone()),
        priority: task.priority.label(),
        task_type: task.task_type.label(),
        pending: task.is_pending(),
        subtasks: task.children.iter().map(task_to_json).collect(),
    }
}

pub fn stats_to_json(editor: &TaskTreeEditor) -> StatsJson {
    StatsJson {
        tasks: editor.task_count(),
        subtasks: editor.subtask_count(),
        high_priority: editor.high_priority_count(),
        total_effort: editor.total_effort(),
        subtask_effort: subtask_effort(editor),
    }
}

fn subtask_effort(editor: &TaskTreeEditor) -> i64 {
    editor
        .tasks()
        .iter()
        .map(|t| editor.subtask_effort(t.id))
        .sum()
}

pub fn config_to_json(path: &Path, config: &BridgeConfig) -> ConfigJson {
    ConfigJson {
        path: path.display().to_string(),
        base_url: config.api.base_url.clone(),
        timeout_secs: config.api.timeout_secs,
        log_level: config.log.level.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn effort_str(estimates: &str) -> String {
    if estimates.is_empty() {
        "-".to_string()
    } else {
        format!("{}d", estimates::effort_days(estimates))
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let assignee = task
        .assignee
        .as_ref()
        .map(|a| format!(" @{}", a.name))
        .unwrap_or_default();
    format!(
        "[{}] {} {} ({}){}",
        task.task_type.label(),
        task.id,
        task.title,
        effort_str(&task.estimates),
        assignee
    )
}

/// Format a task with its subtasks, indented
pub fn format_task_tree(task: &Task, indent: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let prefix = "  ".repeat(indent);
    lines.push(format!("{}{}", prefix, format_task_line(task)));

    for sub in &task.children {
        lines.extend(format_task_tree(sub, indent + 1));
    }
    lines
}

pub fn format_stats(editor: &TaskTreeEditor) -> Vec<String> {
    vec![
        format!("tasks:         {}", editor.task_count()),
        format!("subtasks:      {}", editor.subtask_count()),
        format!("high priority: {}", editor.high_priority_count()),
        format!("total effort:  {}d", editor.total_effort()),
        format!("in subtasks:   {}d (not in total)", subtask_effort(editor)),
    ]
}

/// One line per bar: dates, title and owner
pub fn format_gantt(view: &GanttView) -> Vec<String> {
    let mut lines = vec![format!("window: {} .. {}", view.start, view.end)];
    for task in &view.tasks {
        let end = task.end.unwrap_or(task.start);
        let title = task.text.as_deref().unwrap_or("(untitled)");
        let user = task
            .user
            .as_ref()
            .map(|u| format!("  @{}", u))
            .unwrap_or_default();
        lines.push(format!("{} .. {}  {}{}", task.start, end, title, user));
    }
    lines
}

pub fn format_member_line(member: &TeamMember) -> String {
    if member.email.is_empty() {
        format!("{:>4}  {}", member.id, member.name)
    } else {
        format!("{:>4}  {} <{}>", member.id, member.name, member.email)
    }
}
