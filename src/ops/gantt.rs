use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::gantt::{GanttChart, GanttLink, GanttTask};

/// Class attached to weekend cells of the day scale
pub const WEEKEND_CLASS: &str = "wx-weekend";

/// Days shown after today when the chart has no tasks
pub const EMPTY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Month,
    Day,
}

/// One header row of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scale {
    pub unit: TimeUnit,
    pub step: u32,
    /// strftime pattern for the cell label
    pub format: &'static str,
}

impl Scale {
    pub fn label(&self, date: NaiveDate) -> String {
        date.format(self.format).to_string()
    }

    /// Whether a new cell of this scale begins on `date`
    pub fn starts_cell(&self, date: NaiveDate) -> bool {
        match self.unit {
            TimeUnit::Year => date.ordinal() == 1,
            TimeUnit::Month => date.day() == 1 && date.month0() % self.step == 0,
            TimeUnit::Day => true,
        }
    }
}

/// Year over two-month blocks over days
pub const SCALES: [Scale; 3] = [
    Scale {
        unit: TimeUnit::Year,
        step: 1,
        format: "%Y",
    },
    Scale {
        unit: TimeUnit::Month,
        step: 2,
        format: "%B %Y",
    },
    Scale {
        unit: TimeUnit::Day,
        step: 1,
        format: "%-d",
    },
];

/// Legend entry: a user class and the user it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTypeLabel {
    pub id: String,
    pub label: String,
}

/// A chart shaped for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttView {
    pub tasks: Vec<GanttTask>,
    pub links: Vec<GanttLink>,
    pub task_types: Vec<TaskTypeLabel>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// End date of a bar: `start + duration` days when a duration is given,
/// otherwise the explicit end, otherwise the start itself.
pub fn derive_end(task: &GanttTask) -> NaiveDate {
    if let Some(days) = task.duration
        && let Some(delta) = TimeDelta::try_days(days)
        && let Some(end) = task.start.checked_add_signed(delta)
    {
        return end;
    }
    task.end.unwrap_or(task.start)
}

/// Map each distinct user to `wx-user-N`, numbered from 1 in order of first
/// appearance. Tasks without a user get no class.
pub fn user_classes(tasks: &[GanttTask]) -> IndexMap<String, String> {
    let mut classes = IndexMap::new();
    for user in tasks.iter().filter_map(|t| t.user.as_ref()) {
        if !classes.contains_key(user) {
            let class = format!("wx-user-{}", classes.len() + 1);
            classes.insert(user.clone(), class);
        }
    }
    classes
}

/// 1-based number of a `wx-user-N` class
pub fn user_class_index(class: &str) -> Option<usize> {
    class.strip_prefix("wx-user-")?.parse().ok()
}

/// Earliest start to latest end over bars and baselines.
/// With no tasks the window is today through today + 30 days.
pub fn timeline_window(tasks: &[GanttTask], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let starts = tasks
        .iter()
        .flat_map(|t| std::iter::once(t.start).chain(t.base_start));
    let ends = tasks
        .iter()
        .flat_map(|t| std::iter::once(derive_end(t)).chain(t.base_end));
    match (starts.min(), ends.max()) {
        (Some(start), Some(end)) => (start, end.max(start)),
        _ => (
            today,
            today + TimeDelta::days(EMPTY_WINDOW_DAYS),
        ),
    }
}

pub fn is_day_off(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Cell class for the timeline background
pub fn highlight(date: NaiveDate, unit: TimeUnit) -> &'static str {
    if unit == TimeUnit::Day && is_day_off(date) {
        WEEKEND_CLASS
    } else {
        ""
    }
}

/// Shape a backend chart for display: fill in end dates, replace each task's
/// type with its user class, build the legend and the visible window.
pub fn prepare(chart: GanttChart, today: NaiveDate) -> GanttView {
    let classes = user_classes(&chart.tasks);
    let tasks: Vec<GanttTask> = chart
        .tasks
        .into_iter()
        .map(|mut t| {
            t.end = Some(derive_end(&t));
            t.kind = t.user.as_ref().and_then(|u| classes.get(u).cloned());
            t
        })
        .collect();
    let (start, end) = timeline_window(&tasks, today);
    let task_types = classes
        .into_iter()
        .map(|(label, id)| TaskTypeLabel { id, label })
        .collect();
    GanttView {
        tasks,
        links: chart.links,
        task_types,
        start,
        end,
    }
}
