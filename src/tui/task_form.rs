use crate::model::task::{Assignee, TaskDraft, TaskId, TaskType};
use crate::ops::estimates;
use crate::util::unicode::LineInput;

/// What the form creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Task,
    Subtask { parent: TaskId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Estimate,
    Type,
    Assignee,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Estimate => "Estimate",
            FormField::Type => "Type",
            FormField::Assignee => "Assignee",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            FormField::Title | FormField::Description | FormField::Estimate
        )
    }
}

const TASK_FIELDS: [FormField; 5] = [
    FormField::Title,
    FormField::Description,
    FormField::Estimate,
    FormField::Type,
    FormField::Assignee,
];

// Subtasks start unassigned
const SUBTASK_FIELDS: [FormField; 4] = [
    FormField::Title,
    FormField::Description,
    FormField::Estimate,
    FormField::Type,
];

/// The add task / add subtask popup
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub kind: FormKind,
    pub focus: FormField,
    pub title: LineInput,
    pub description: LineInput,
    pub estimate: LineInput,
    pub task_type: TaskType,
    pub assignee: Option<Assignee>,
    /// Why the last submit was refused
    pub error: Option<String>,
}

impl TaskForm {
    pub fn new(kind: FormKind) -> Self {
        TaskForm {
            kind,
            focus: FormField::Title,
            title: LineInput::default(),
            description: LineInput::default(),
            estimate: LineInput::default(),
            task_type: TaskType::General,
            assignee: None,
            error: None,
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self.kind {
            FormKind::Task => &TASK_FIELDS,
            FormKind::Subtask { .. } => &SUBTASK_FIELDS,
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
    }

    /// Buffer of the focused field, if it is a text field
    pub fn focused_input(&mut self) -> Option<&mut LineInput> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Estimate => Some(&mut self.estimate),
            FormField::Type | FormField::Assignee => None,
        }
    }

    pub fn cycle_type(&mut self) {
        self.task_type = self.task_type.cycle();
    }

    /// Draft for the editor. An empty estimate falls back to the editor's
    /// default.
    pub fn draft(&self) -> TaskDraft {
        let estimates = estimates::normalize_input(self.estimate.text()).filter(|e| !e.is_empty());
        TaskDraft {
            title: self.title.text().to_string(),
            description: self.description.text().to_string(),
            estimates,
            assignee: match self.kind {
                FormKind::Task => self.assignee.clone(),
                FormKind::Subtask { .. } => None,
            },
            priority: None,
            task_type: Some(self.task_type),
        }
    }

    /// Message for a draft the editor will refuse
    pub fn missing_fields(&self) -> Option<&'static str> {
        match self.kind {
            FormKind::Task if self.title.is_empty() || self.description.is_empty() => {
                Some("title and description are required")
            }
            FormKind::Subtask { .. } if self.title.is_empty() => Some("title is required"),
            _ => None,
        }
    }
}
