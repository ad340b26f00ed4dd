//! End-to-end scenarios over the public library API: backend payloads are
//! decoded, edited in the task tree and shaped for the timeline, without a
//! network or a terminal.

use std::cell::RefCell;
use std::rc::Rc;

use bridge::api::{Envelope, ErrorCode};
use bridge::model::{GanttChartResponse, RemoteTask, Task, TaskDraft, TaskId, TaskPatch, TaskType};
use bridge::ops::gantt::prepare;
use bridge::ops::task_tree::{EditField, NodeRef, RowEdit, TaskTreeEditor, tasks_from_remote};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

const LISTING: &str = r#"{
  "code": 0,
  "data": [
    {
      "id": 1,
      "title": "Auth",
      "description": "Sign-in and sessions",
      "estimates": 5,
      "assignee": {"id": 3, "name": "Ana"},
      "priority": 1,
      "task_type": 2,
      "children": [
        {"id": 11, "title": "Login form", "estimates": "2", "task_type": 1},
        {"id": 12, "title": "Session store", "estimates": null}
      ]
    },
    {"id": 2, "title": "Billing", "estimates": 3.7, "priority": 2}
  ]
}"#;

fn load_listing() -> Vec<Task> {
    let envelope: Envelope = serde_json::from_str(LISTING).unwrap();
    assert_eq!(envelope.code, ErrorCode::Success);
    let remote: Vec<RemoteTask> = envelope.into_data().unwrap();
    tasks_from_remote(remote)
}

#[test]
fn listing_seeds_an_expanded_tree() {
    let editor = TaskTreeEditor::new(load_listing());

    assert_eq!(editor.task_count(), 2);
    assert_eq!(editor.subtask_count(), 2);
    assert_eq!(editor.high_priority_count(), 1);
    assert_eq!(editor.total_effort(), 8);
    assert_eq!(editor.subtask_effort(TaskId::Server(1)), 2);

    let auth = editor.find_task(TaskId::Server(1)).unwrap();
    assert_eq!(auth.task_type, TaskType::Be);
    assert_eq!(auth.assignee.as_ref().unwrap().name, "Ana");
    assert_eq!(auth.children[1].estimates, "0");
    assert!(editor.is_expanded(TaskId::Server(1)));
    assert!(editor.is_expanded(TaskId::Server(2)));
}

#[test]
fn create_confirm_and_reload() {
    let updates = Rc::new(RefCell::new(0));
    let seen = updates.clone();
    let mut editor =
        TaskTreeEditor::new(load_listing()).with_on_update(move |_| *seen.borrow_mut() += 1);

    // A new task gets a placeholder id and the form defaults
    let mut draft = TaskDraft::new("Search", "Full text search");
    let created = editor.add_task(&mut draft).unwrap();
    assert_eq!(draft, TaskDraft::default());
    assert!(created.id.is_local());
    assert!(created.is_pending());
    assert_eq!(created.estimates, "1");

    // A reload that races the creation keeps the pending row
    editor.merge_remote(load_listing());
    assert_eq!(editor.task_count(), 3);
    assert!(editor.find_task(created.id).is_some());

    // The backend answer swaps in the real id
    assert!(editor.confirm(created.id, 40));
    let search = editor.find_task(TaskId::Server(40)).unwrap();
    assert!(!search.is_pending());
    assert!(!editor.confirm(created.id, 41));

    // add, merge, confirm
    assert_eq!(*updates.borrow(), 3);
}

#[test]
fn row_edit_binds_and_survives_deletion_of_other_rows() {
    let mut editor = TaskTreeEditor::new(load_listing());
    let login = NodeRef::subtask(TaskId::Server(1), TaskId::Server(11));

    assert!(editor.begin_edit(login, EditField::Estimate));
    assert!(editor.set_edit_value("4"));
    assert!(!editor.set_edit_value("four"));
    assert_eq!(editor.find(login).unwrap().estimates, "4");

    editor.delete_task(TaskId::Server(2));
    assert_eq!(
        editor.row_edit(),
        RowEdit::Editing {
            node: login,
            field: EditField::Estimate
        }
    );

    editor.delete_subtask(TaskId::Server(1), TaskId::Server(11));
    assert_eq!(editor.row_edit(), RowEdit::Display);
    assert_eq!(editor.subtask_count(), 1);
}

#[test]
fn subtasks_stay_one_level_deep() {
    let mut editor = TaskTreeEditor::new(load_listing());
    let mut draft = TaskDraft::new("Nested", "");
    assert!(editor.add_subtask(&mut draft, TaskId::Server(11)).is_none());
    assert_eq!(draft.title, "Nested");

    let sub = editor.add_subtask(&mut draft, TaskId::Server(2)).unwrap();
    assert_eq!(sub.assignee, None);
    editor.update_subtask(TaskId::Server(2), sub.id, &TaskPatch::title("Refunds"));
    assert_eq!(editor.find_task(TaskId::Server(2)).unwrap().children[0].title, "Refunds");
}

#[test]
fn gantt_payload_is_shaped_for_display() {
    let body = r#"{
      "code": 0,
      "data": {
        "gantt_chart": {
          "tasks": [
            {"id": 1, "text": "Auth", "start": "2024-06-10", "duration": 5, "user": "Ana", "type": "task"},
            {"id": 2, "text": "Login", "start": "2024-06-12T00:00:00Z", "end": "2024-06-14", "parent": 1, "user": "Ben"},
            {"id": "m1", "text": "Launch", "start": "2024-06-20", "user": "Ana"}
          ],
          "links": [{"id": 1, "source": 1, "target": 2, "type": "e2s"}]
        }
      }
    }"#;
    let envelope: Envelope = serde_json::from_str(body).unwrap();
    let chart = envelope.into_data::<GanttChartResponse>().unwrap().gantt_chart;
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let view = prepare(chart, today);

    let kinds: Vec<Option<&str>> = view.tasks.iter().map(|t| t.kind.as_deref()).collect();
    assert_eq!(kinds, vec![Some("wx-user-1"), Some("wx-user-2"), Some("wx-user-1")]);
    assert_eq!(view.tasks[0].end, NaiveDate::from_ymd_opt(2024, 6, 15));
    assert_eq!(view.start, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    assert_eq!(view.end, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
    let legend: Vec<&str> = view.task_types.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(legend, vec!["Ana", "Ben"]);
    assert_eq!(view.links.len(), 1);
}
