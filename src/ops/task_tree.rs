use std::collections::HashSet;

use crate::model::task::{
    Assignee, MAX_DEPTH, Priority, RemoteTask, SyncState, Task, TaskDraft, TaskId, TaskPatch,
    TaskType,
};
use crate::ops::estimates;

/// Callback invoked with the whole forest after every mutation
pub type UpdateCallback = Box<dyn FnMut(&[Task])>;

/// Address of a node: a top-level task, or one of its subtasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub task: TaskId,
    pub subtask: Option<TaskId>,
}

impl NodeRef {
    pub fn task(task: TaskId) -> Self {
        NodeRef {
            task,
            subtask: None,
        }
    }

    pub fn subtask(task: TaskId, subtask: TaskId) -> Self {
        NodeRef {
            task,
            subtask: Some(subtask),
        }
    }

    pub fn depth(&self) -> usize {
        if self.subtask.is_some() { 1 } else { 0 }
    }
}

/// Field edited in place on a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    Estimate,
}

/// Per-row edit state. At most one row is being edited at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowEdit {
    #[default]
    Display,
    Editing { node: NodeRef, field: EditField },
}

/// In-memory editable forest of tasks and subtasks.
///
/// Owned by the task-list page. Every mutation notifies the optional
/// `on_update` callback with the new forest. Validation failures are silent:
/// the operation does nothing and reports `None`/`false`.
pub struct TaskTreeEditor {
    tasks: Vec<Task>,
    expanded: HashSet<TaskId>,
    row_edit: RowEdit,
    on_update: Option<UpdateCallback>,
}

impl Default for TaskTreeEditor {
    fn default() -> Self {
        TaskTreeEditor::new(Vec::new())
    }
}

impl std::fmt::Debug for TaskTreeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTreeEditor")
            .field("tasks", &self.tasks)
            .field("expanded", &self.expanded)
            .field("row_edit", &self.row_edit)
            .finish_non_exhaustive()
    }
}

impl TaskTreeEditor {
    /// Seed the editor. Every initial task starts expanded.
    pub fn new(initial: Vec<Task>) -> Self {
        let expanded = initial.iter().map(|t| t.id).collect();
        TaskTreeEditor {
            tasks: initial,
            expanded,
            row_edit: RowEdit::Display,
            on_update: None,
        }
    }

    pub fn with_on_update(mut self, f: impl FnMut(&[Task]) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn expanded(&self) -> &HashSet<TaskId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: TaskId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find(&self, node: NodeRef) -> Option<&Task> {
        let task = self.find_task(node.task)?;
        match node.subtask {
            None => Some(task),
            Some(sub_id) => task.children.iter().find(|s| s.id == sub_id),
        }
    }

    fn notify(&mut self) {
        if let Some(cb) = self.on_update.as_mut() {
            cb(&self.tasks);
        }
    }

    // -----------------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------------

    /// Show or hide the subtask list of a task
    pub fn toggle_expansion(&mut self, id: TaskId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    // -----------------------------------------------------------------------
    // Point edits
    // -----------------------------------------------------------------------

    /// Apply `patch` to the top-level task `id`. Unknown ids change nothing,
    /// but listeners are still notified.
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.apply(patch);
        }
        self.notify();
    }

    /// Apply `patch` to subtask `subtask_id` of task `task_id`
    pub fn update_subtask(&mut self, task_id: TaskId, subtask_id: TaskId, patch: &TaskPatch) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id)
            && let Some(sub) = task.children.iter_mut().find(|s| s.id == subtask_id)
        {
            sub.apply(patch);
        }
        self.notify();
    }

    pub fn update_node(&mut self, node: NodeRef, patch: &TaskPatch) {
        match node.subtask {
            None => self.update_task(node.task, patch),
            Some(sub) => self.update_subtask(node.task, sub, patch),
        }
    }

    // -----------------------------------------------------------------------
    // Insertion and removal
    // -----------------------------------------------------------------------

    /// Append a new task built from `draft`.
    ///
    /// Title and description are required. On success the draft is reset and
    /// a copy of the new (pending) task is returned for submission.
    pub fn add_task(&mut self, draft: &mut TaskDraft) -> Option<Task> {
        if draft.title.is_empty() || draft.description.is_empty() {
            return None;
        }
        let task = build_node(draft, draft.assignee.clone());
        self.tasks.push(task.clone());
        self.notify();
        *draft = TaskDraft::default();
        Some(task)
    }

    /// Append a subtask to `parent_id`. Title is required and the parent
    /// must be a top-level task. Subtasks start unassigned.
    pub fn add_subtask(&mut self, draft: &mut TaskDraft, parent_id: TaskId) -> Option<Task> {
        if draft.title.is_empty() {
            return None;
        }
        // Only top-level tasks are searched, so subtasks never get children
        let parent = self.tasks.iter_mut().find(|t| t.id == parent_id)?;
        let subtask = build_node(draft, None);
        parent.children.push(subtask.clone());
        self.notify();
        *draft = TaskDraft::default();
        Some(subtask)
    }

    pub fn delete_task(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
        self.expanded.remove(&id);
        self.clear_edit_on(|node| node.task == id);
        self.notify();
    }

    pub fn delete_subtask(&mut self, task_id: TaskId, subtask_id: TaskId) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.children.retain(|s| s.id != subtask_id);
        }
        self.clear_edit_on(|node| node.subtask == Some(subtask_id));
        self.notify();
    }

    pub fn delete_node(&mut self, node: NodeRef) {
        match node.subtask {
            None => self.delete_task(node.task),
            Some(sub) => self.delete_subtask(node.task, sub),
        }
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn subtask_count(&self) -> usize {
        self.tasks.iter().map(|t| t.children.len()).sum()
    }

    /// Top-level tasks at `Priority::High`. Shown as the "completed" card
    /// on the task page header.
    pub fn high_priority_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.priority == Priority::High)
            .count()
    }

    /// Total effort in days across top-level tasks only. Subtask estimates
    /// are not rolled up.
    pub fn total_effort(&self) -> i64 {
        self.tasks
            .iter()
            .map(|t| estimates::effort_days(&t.estimates))
            .fold(0, i64::saturating_add)
    }

    /// Sum of the subtask estimates under one task (informational)
    pub fn subtask_effort(&self, id: TaskId) -> i64 {
        self.find_task(id).map_or(0, |t| {
            t.children
                .iter()
                .map(|s| estimates::effort_days(&s.estimates))
                .fold(0, i64::saturating_add)
        })
    }

    // -----------------------------------------------------------------------
    // Reconciliation with the backend
    // -----------------------------------------------------------------------

    /// Replace a placeholder id with the id the backend assigned.
    /// Returns false when no pending node carries `local`.
    pub fn confirm(&mut self, local: TaskId, server_id: u64) -> bool {
        let server = TaskId::Server(server_id);
        let mut found = false;
        for task in &mut self.tasks {
            if task.id == local {
                task.id = server;
                task.sync = SyncState::Confirmed;
                found = true;
                break;
            }
            if let Some(sub) = task.children.iter_mut().find(|s| s.id == local) {
                sub.id = server;
                sub.sync = SyncState::Confirmed;
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
        if self.expanded.remove(&local) {
            self.expanded.insert(server);
        }
        if let RowEdit::Editing { node, field } = self.row_edit {
            let remap = |id: TaskId| if id == local { server } else { id };
            self.row_edit = RowEdit::Editing {
                node: NodeRef {
                    task: remap(node.task),
                    subtask: node.subtask.map(remap),
                },
                field,
            };
        }
        self.notify();
        true
    }

    /// Re-seed from a fresh backend listing. Remote tasks replace everything
    /// confirmed; nodes still pending are kept after them so an in-flight
    /// creation neither duplicates nor disappears.
    pub fn merge_remote(&mut self, remote: Vec<Task>) {
        let mut merged = remote;
        let remote_ids: HashSet<TaskId> = merged.iter().map(|t| t.id).collect();

        for old in std::mem::take(&mut self.tasks) {
            if old.is_pending() {
                merged.push(old);
                continue;
            }
            // Pending subtasks under a confirmed parent follow the parent
            if remote_ids.contains(&old.id) {
                let pending_subs: Vec<Task> =
                    old.children.into_iter().filter(|s| s.is_pending()).collect();
                if let Some(target) = merged.iter_mut().find(|t| t.id == old.id) {
                    target.children.extend(pending_subs);
                }
            }
        }

        let known: HashSet<TaskId> = merged.iter().map(|t| t.id).collect();
        let newly_seen: Vec<TaskId> = merged
            .iter()
            .map(|t| t.id)
            .filter(|id| !self.expanded.contains(id))
            .collect();
        self.expanded.retain(|id| known.contains(id));
        // Tasks appearing for the first time start expanded, like a fresh load
        self.expanded.extend(newly_seen);

        self.tasks = merged;
        if let RowEdit::Editing { node, .. } = self.row_edit
            && self.find(node).is_none()
        {
            self.row_edit = RowEdit::Display;
        }
        self.notify();
    }

    // -----------------------------------------------------------------------
    // Row edit state machine
    // -----------------------------------------------------------------------

    pub fn row_edit(&self) -> RowEdit {
        self.row_edit
    }

    /// Enter editing for one field of a row. Switching rows or fields
    /// simply moves the edit; there is nothing to revert.
    pub fn begin_edit(&mut self, node: NodeRef, field: EditField) -> bool {
        if self.find(node).is_none() {
            return false;
        }
        self.row_edit = RowEdit::Editing { node, field };
        true
    }

    /// Bind new text to the field being edited. Estimates go through
    /// [`estimates::normalize_input`]; rejected input leaves the value as is.
    /// Returns whether the value was stored.
    pub fn set_edit_value(&mut self, value: &str) -> bool {
        let RowEdit::Editing { node, field } = self.row_edit else {
            return false;
        };
        let patch = match field {
            EditField::Title => TaskPatch::title(value),
            EditField::Description => TaskPatch::description(value),
            EditField::Estimate => match estimates::normalize_input(value) {
                Some(v) => TaskPatch::estimates(v),
                None => return false,
            },
        };
        self.update_node(node, &patch);
        true
    }

    /// Leave editing (Enter or focus loss). Whatever is bound stays.
    pub fn finish_edit(&mut self) {
        self.row_edit = RowEdit::Display;
    }

    fn clear_edit_on(&mut self, hit: impl Fn(&NodeRef) -> bool) {
        if let RowEdit::Editing { node, .. } = &self.row_edit
            && hit(node)
        {
            self.row_edit = RowEdit::Display;
        }
    }
}

/// Build a pending node from a form draft with the form's defaults
fn build_node(draft: &TaskDraft, assignee: Option<Assignee>) -> Task {
    let mut task = Task::new(TaskId::new_local(), draft.title.clone());
    task.description = draft.description.clone();
    task.estimates = draft.estimates.clone().unwrap_or_else(|| "1".to_string());
    task.assignee = assignee;
    task.priority = draft.priority.unwrap_or_default();
    task.task_type = draft.task_type.unwrap_or(TaskType::General);
    task.sync = SyncState::Pending;
    task
}

/// Convert the backend listing into the editable model. Nodes nested deeper
/// than [`MAX_DEPTH`] are dropped.
pub fn tasks_from_remote(remote: Vec<RemoteTask>) -> Vec<Task> {
    remote.into_iter().map(|r| node_from_remote(r, 0)).collect()
}

fn node_from_remote(r: RemoteTask, depth: usize) -> Task {
    let mut task = Task::new(TaskId::Server(r.id), r.title);
    task.description = r.description.unwrap_or_default();
    task.estimates = estimates::from_backend(r.estimates.as_ref());
    task.assignee = r.assignee;
    task.priority = r.priority.unwrap_or_default();
    task.task_type = r.task_type.unwrap_or_default();
    if depth < MAX_DEPTH {
        task.children = r
            .children
            .into_iter()
            .map(|c| node_from_remote(c, depth + 1))
            .collect();
    }
    task
}
