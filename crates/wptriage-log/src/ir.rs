use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label used for errors that cannot be attributed to a plugin or theme.
pub const CORE_COMPONENT: &str = "WordPress Core";

/// Error level recorded when a line carries no `[<token>:error]` marker.
pub const UNKNOWN_LEVEL: &str = "Unknown";

/// Column names of the CSV report, in output order.
pub const FIELD_NAMES: [&str; 10] = [
    "source_id",
    "timestamp",
    "error_level",
    "component_type",
    "component_name",
    "error_message",
    "file_path",
    "line_number",
    "suggested_resolution",
    "priority",
];

/// Where an error most likely originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Plugin,
    Theme,
    Core,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Plugin => "plugin",
            ComponentType::Theme => "theme",
            ComponentType::Core => "core",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plugin" => Ok(ComponentType::Plugin),
            "theme" => Ok(ComponentType::Theme),
            "core" => Ok(ComponentType::Core),
            other => Err(format!("unknown component type `{other}`")),
        }
    }
}

/// Severity bucket. Ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            other => Err(format!("unknown priority `{other}`")),
        }
    }
}

/// One analysed error line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub source_id: String,
    pub timestamp: Option<NaiveDateTime>,
    pub error_level: String,
    pub component_type: ComponentType,
    pub component_name: String,
    pub error_message: String,
    pub file_path: Option<String>,
    pub line_number: Option<String>,
    pub suggested_resolution: String,
    pub priority: Priority,
}

/// Aggregate counts over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub by_priority: BTreeMap<Priority, usize>,
    pub by_component: BTreeMap<String, usize>,
}

impl Summary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        let mut summary = Summary::default();
        for record in records {
            summary.total += 1;
            *summary.by_priority.entry(record.priority).or_insert(0) += 1;
            *summary
                .by_component
                .entry(record.component_name.clone())
                .or_insert(0) += 1;
        }
        summary
    }

    /// Component counts, most frequent first. Ties are broken by name.
    pub fn top_components(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .by_component
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
