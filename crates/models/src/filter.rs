//! Exact-match filter criteria used by the aggregate queries.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::grade::Grade;

/// Criteria for the per-student total: `student` and `subject`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentSubjectQuery {
    #[serde(default)]
    pub student: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Criteria for average and top-3: `subject` and `type`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SubjectTypeQuery {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentSubject {
    pub student: String,
    pub subject: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectType {
    pub subject: String,
    pub kind: String,
}

impl StudentSubjectQuery {
    pub fn is_empty(&self) -> bool {
        self.student.is_none() && self.subject.is_none()
    }

    pub fn validate(self) -> Result<StudentSubject, ModelError> {
        Ok(StudentSubject {
            student: self.student.ok_or_else(|| ModelError::required("student"))?,
            subject: self.subject.ok_or_else(|| ModelError::required("subject"))?,
        })
    }
}

impl SubjectTypeQuery {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.kind.is_none()
    }

    pub fn validate(self) -> Result<SubjectType, ModelError> {
        Ok(SubjectType {
            subject: self.subject.ok_or_else(|| ModelError::required("subject"))?,
            kind: self.kind.ok_or_else(|| ModelError::required("type"))?,
        })
    }
}

impl StudentSubject {
    pub fn new(student: &str, subject: &str) -> Self {
        Self { student: student.into(), subject: subject.into() }
    }

    pub fn matches(&self, grade: &Grade) -> bool {
        grade.student == self.student && grade.subject == self.subject
    }
}

impl SubjectType {
    pub fn new(subject: &str, kind: &str) -> Self {
        Self { subject: subject.into(), kind: kind.into() }
    }

    pub fn matches(&self, grade: &Grade) -> bool {
        grade.subject == self.subject && grade.kind == self.kind
    }
}
