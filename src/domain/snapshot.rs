// Dashboard snapshot domain model - defensive access over loosely typed JSON
use serde_json::Value;
use std::fmt;
use thiserror::Error;

const TREND_WINDOW: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("dashboard snapshot must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// The dashboard state the UI sends along with an insights request.
///
/// No schema is enforced. Lookups fall back to zero/empty values when a key is
/// missing or has an unexpected shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub conversions: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleShare {
    pub role: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueTrend {
    Up,
    NeedsAttention,
    Indeterminate,
}

impl DashboardSnapshot {
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        if value.is_object() {
            Ok(Self { value })
        } else {
            Err(SnapshotError::NotAnObject(json_kind(&value)))
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    fn list(&self, key: &str) -> &[Value] {
        self.value
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Value of the first entry in `metrics` whose `label` matches exactly.
    pub fn metric(&self, label: &str) -> MetricValue {
        self.list("metrics")
            .iter()
            .find(|m| m.get("label").and_then(Value::as_str) == Some(label))
            .and_then(|m| m.get("value"))
            .map(MetricValue::from_json)
            .unwrap_or(MetricValue::Missing)
    }

    /// Channel with the most conversions; ties keep the earliest entry.
    pub fn best_channel(&self) -> Option<Channel> {
        let mut best: Option<Channel> = None;
        for entry in self.list("channelData") {
            let candidate = Channel {
                name: text_field(entry, &["channel", "name"]),
                conversions: number_field(entry, &["conversions"]),
            };
            match &best {
                Some(current) if candidate.conversions <= current.conversions => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Compares the last revenue point of the trailing window against the first.
    pub fn revenue_trend(&self) -> RevenueTrend {
        let series = self.list("revenueData");
        let window = &series[series.len().saturating_sub(TREND_WINDOW)..];
        match (window.first(), window.last()) {
            (Some(first), Some(last)) if window.len() >= 2 => {
                if number_field(last, &["revenue"]) > number_field(first, &["revenue"]) {
                    RevenueTrend::Up
                } else {
                    RevenueTrend::NeedsAttention
                }
            }
            _ => RevenueTrend::Indeterminate,
        }
    }

    pub fn leading_role(&self) -> Option<RoleShare> {
        let mut leading: Option<RoleShare> = None;
        for entry in self.list("userRoles") {
            let candidate = RoleShare {
                role: text_field(entry, &["role", "name"]),
                value: number_field(entry, &["value", "count"]),
            };
            match &leading {
                Some(current) if candidate.value <= current.value => {}
                _ => leading = Some(candidate),
            }
        }
        leading
    }
}

impl MetricValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Missing),
            Value::String(s) if !s.is_empty() => Self::Text(s.clone()),
            _ => Self::Missing,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .trim_start_matches('$')
                .trim_end_matches('%')
                .replace(',', "")
                .parse()
                .unwrap_or(0.0),
            Self::Missing => 0.0,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str("0"),
        }
    }
}

/// en-US grouping with at most three fraction digits: `1234567.5` -> `1,234,567.5`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn text_field(entry: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| entry.get(*k))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn number_field(entry: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|k| entry.get(*k).and_then(Value::as_f64))
        .unwrap_or(0.0)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
