use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gantt ids may be numbers or strings depending on the backend record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GanttId {
    Num(i64),
    Str(String),
}

impl fmt::Display for GanttId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GanttId::Num(n) => write!(f, "{}", n),
            GanttId::Str(s) => f.write_str(s),
        }
    }
}

/// A bar on the timeline. `start` is mandatory; the bar length comes from
/// `end` or `duration` (days).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttTask {
    pub id: GanttId,
    #[serde(with = "wire_date")]
    pub start: NaiveDate,
    #[serde(default, with = "wire_date::option", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<GanttId>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(default, with = "wire_date::option", skip_serializing_if = "Option::is_none")]
    pub base_start: Option<NaiveDate>,
    #[serde(default, with = "wire_date::option", skip_serializing_if = "Option::is_none")]
    pub base_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Dependency between two bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// start-to-start
    S2s,
    /// start-to-end
    S2e,
    /// end-to-start
    E2s,
    /// end-to-end
    E2e,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttLink {
    pub id: GanttId,
    pub source: GanttId,
    pub target: GanttId,
    #[serde(rename = "type")]
    pub kind: LinkType,
}

/// The `gantt_chart` payload of `GET /projects/:id/gantt-chart/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GanttChart {
    #[serde(default)]
    pub tasks: Vec<GanttTask>,
    #[serde(default)]
    pub links: Vec<GanttLink>,
}

/// Envelope data wrapper: the chart arrives as `data.gantt_chart`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GanttChartResponse {
    pub gantt_chart: GanttChart,
}

/// Dates arrive either as `YYYY-MM-DD` or as full timestamps; only the
/// calendar day matters to the timeline.
mod wire_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(s: &str) -> Option<NaiveDate> {
        let day = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(day, FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            let raw = Option::<String>::deserialize(d)?;
            match raw {
                None => Ok(None),
                Some(r) => parse(&r)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", r))),
            }
        }
    }
}
