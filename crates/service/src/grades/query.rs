//! Aggregations over an in-memory grade document. No I/O here.

use std::cmp::Ordering;

use models::filter::{StudentSubject, SubjectType};
use models::{Grade, GradeDocument};
use serde::Serialize;

/// Number of records returned by [`top`].
pub const TOP_LIMIT: usize = 3;

/// Response shape of the top-3 query: the document minus its counter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TopGrades {
    pub grades: Vec<Grade>,
}

/// Sum of the integer readings of every matching `value`. Zero when nothing
/// matches; NaN as soon as one matching value has no integer reading.
pub fn total(doc: &GradeDocument, filter: &StudentSubject) -> f64 {
    doc.grades
        .iter()
        .filter(|g| filter.matches(g))
        .map(|g| g.value.as_integer())
        .sum()
}

/// Mean of the integer readings of every matching `value`. NaN when nothing
/// matches (0 / 0).
pub fn average(doc: &GradeDocument, filter: &SubjectType) -> f64 {
    let (sum, count) = doc
        .grades
        .iter()
        .filter(|g| filter.matches(g))
        .fold((0f64, 0usize), |(sum, count), g| (sum + g.value.as_integer(), count + 1));
    sum / count as f64
}

/// Up to `limit` matching records, highest value first. The sort is stable,
/// so equal values keep their document order. Values without a numeric
/// reading rank below every numeric one.
pub fn top(doc: &GradeDocument, filter: &SubjectType, limit: usize) -> TopGrades {
    let mut matched: Vec<Grade> = doc.grades.iter().filter(|g| filter.matches(g)).cloned().collect();
    matched.sort_by(|a, b| match (a.value.as_number(), b.value.as_number()) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    matched.truncate(limit);
    TopGrades { grades: matched }
}

/// Render an aggregate the way it goes out on the wire: integral values
/// without a fraction, `NaN` for undefined results.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}
