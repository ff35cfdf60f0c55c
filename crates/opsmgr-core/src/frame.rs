//! Column-typed result frames.
//!
//! Query results are shaped into frames: a named set of equally long,
//! homogeneously typed columns. The hosting side consumes these as
//! opaque serialized data.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rendering hint attached to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visualization {
    Graph,
    Table,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMeta {
    pub preferred_visualization: Visualization,
}

/// One column of a frame.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    pub values: FieldValues,
}

/// Column values, one variant per supported column type.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Time(Vec<DateTime<Utc>>),
    Float(Vec<f64>),
    Int(Vec<i64>),
    Str(Vec<String>),
}

impl Field {
    pub fn time(name: impl Into<String>, values: Vec<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Time(values),
        }
    }

    pub fn float(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Float(values),
        }
    }

    pub fn int(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Int(values),
        }
    }

    pub fn str(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: FieldValues::Str(values),
        }
    }

    /// Number of values in this column.
    pub fn len(&self) -> usize {
        match &self.values {
            FieldValues::Time(v) => v.len(),
            FieldValues::Float(v) => v.len(),
            FieldValues::Int(v) => v.len(),
            FieldValues::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named collection of columns.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FrameMeta>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            meta: None,
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_visualization(mut self, visualization: Visualization) -> Self {
        self.meta = Some(FrameMeta {
            preferred_visualization: visualization,
        });
        self
    }

    /// Number of rows, taken from the first column.
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, Field::len)
    }
}
