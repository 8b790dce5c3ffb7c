use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::value::GradeValue;

pub type GradeId = u64;

/// One scored assessment for a student in a subject.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    #[serde(default)]
    pub student: String,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: GradeValue,
    pub timestamp: DateTime<Utc>,
}

/// The whole persisted document: id counter plus records in insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDocument {
    pub next_id: GradeId,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Default for GradeDocument {
    fn default() -> Self {
        Self { next_id: 1, grades: Vec::new() }
    }
}

impl GradeDocument {
    pub fn position(&self, id: GradeId) -> Option<usize> {
        self.grades.iter().position(|g| g.id == id)
    }

    pub fn find(&self, id: GradeId) -> Option<&Grade> {
        self.grades.iter().find(|g| g.id == id)
    }

    /// Append a new record under `next_id` and advance the counter. Fails
    /// without touching the document when the counter cannot advance.
    pub fn insert(&mut self, fields: GradeFields, now: DateTime<Utc>) -> Result<Grade, ModelError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(ModelError::IdsExhausted(id))?;
        let grade = fields.into_grade(id, now);
        self.grades.push(grade.clone());
        Ok(grade)
    }

    /// Overwrite every field of the record with `id` in place. The id itself
    /// and the record's position are kept.
    pub fn replace(&mut self, id: GradeId, fields: GradeFields, now: DateTime<Utc>) -> Option<Grade> {
        let idx = self.position(id)?;
        let grade = fields.into_grade(id, now);
        self.grades[idx] = grade.clone();
        Some(grade)
    }

    /// Remove the first record with `id`. `next_id` never moves backwards.
    pub fn remove(&mut self, id: GradeId) -> Option<Grade> {
        let idx = self.position(id)?;
        Some(self.grades.remove(idx))
    }
}

/// Create/update payload as received; every field optional so that missing
/// input is reported as a validation error instead of a parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GradeInput {
    #[serde(default)]
    pub id: Option<GradeId>,
    #[serde(default)]
    pub student: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<GradeValue>,
}

/// Validated record fields, everything except `id` and `timestamp`.
#[derive(Clone, Debug, PartialEq)]
pub struct GradeFields {
    pub student: String,
    pub subject: String,
    pub kind: String,
    pub value: GradeValue,
}

impl GradeInput {
    pub fn validate(self) -> Result<GradeFields, ModelError> {
        let student = self.student.ok_or_else(|| ModelError::required("student"))?;
        let subject = self.subject.ok_or_else(|| ModelError::required("subject"))?;
        let kind = self.kind.ok_or_else(|| ModelError::required("type"))?;
        let value = match self.value {
            Some(v) if !v.is_null() => v,
            _ => return Err(ModelError::required("value")),
        };
        if !matches!(value.0, serde_json::Value::Number(_) | serde_json::Value::String(_)) {
            return Err(ModelError::Validation("value must be a number or a string".into()));
        }
        Ok(GradeFields { student, subject, kind, value })
    }
}

impl GradeFields {
    pub fn new(student: &str, subject: &str, kind: &str, value: impl Into<GradeValue>) -> Self {
        Self {
            student: student.to_string(),
            subject: subject.to_string(),
            kind: kind.to_string(),
            value: value.into(),
        }
    }

    fn into_grade(self, id: GradeId, now: DateTime<Utc>) -> Grade {
        Grade {
            id,
            student: self.student,
            subject: self.subject,
            kind: self.kind,
            value: self.value,
            timestamp: now,
        }
    }
}
