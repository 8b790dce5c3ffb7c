use std::sync::Arc;

use chrono::Utc;
use models::filter::{StudentSubjectQuery, SubjectTypeQuery};
use models::{Grade, GradeDocument, GradeId, GradeInput};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::errors::ServiceError;
use crate::grades::query::{self, TopGrades, TOP_LIMIT};
use crate::storage::DocumentStore;

/// Application service for the grade collection.
///
/// Every call loads the document fresh from the store. Mutations run their
/// whole load-mutate-save cycle under one async mutex, so writers going
/// through the same service never interleave and ids stay unique. Readers
/// take no lock.
pub struct GradeService<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: DocumentStore + ?Sized> GradeService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn load(&self) -> Result<GradeDocument, ServiceError> {
        self.store.load().await.map_err(|e| {
            error!(error = %e, "grades document load failed");
            ServiceError::from(e)
        })
    }

    async fn mutate<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut GradeDocument) -> Result<T, ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.store.save(&doc).await.map_err(|e| {
            error!(error = %e, "grades document save failed");
            ServiceError::from(e)
        })?;
        Ok(out)
    }

    /// Append a new grade under the next id.
    #[instrument(skip_all)]
    pub async fn create(&self, input: GradeInput) -> Result<Grade, ServiceError> {
        let fields = input.validate()?;
        let grade = self.mutate(|doc| Ok(doc.insert(fields, Utc::now())?)).await?;
        info!(grade_id = grade.id, student = %grade.student, subject = %grade.subject, "grade_created");
        Ok(grade)
    }

    /// Replace every field of grade `id` and refresh its timestamp.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: GradeId, input: GradeInput) -> Result<Grade, ServiceError> {
        let fields = input.validate()?;
        let grade = self
            .mutate(|doc| doc.replace(id, fields, Utc::now()).ok_or_else(|| ServiceError::grade_not_found(id)))
            .await
            .inspect_err(|e| log_not_found(e, id))?;
        info!(grade_id = id, "grade_updated");
        Ok(grade)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: GradeId) -> Result<(), ServiceError> {
        self.mutate(|doc| doc.remove(id).map(|_| ()).ok_or_else(|| ServiceError::grade_not_found(id)))
            .await
            .inspect_err(|e| log_not_found(e, id))?;
        info!(grade_id = id, "grade_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: GradeId) -> Result<Grade, ServiceError> {
        let doc = self.load().await?;
        doc.find(id).cloned().ok_or_else(|| {
            let e = ServiceError::grade_not_found(id);
            log_not_found(&e, id);
            e
        })
    }

    /// Sum of `value` over grades matching `student` and `subject`.
    pub async fn total(&self, filter: StudentSubjectQuery) -> Result<f64, ServiceError> {
        let filter = filter.validate()?;
        let doc = self.load().await?;
        Ok(query::total(&doc, &filter))
    }

    /// Mean `value` over grades matching `subject` and `type`; NaN when none match.
    pub async fn average(&self, filter: SubjectTypeQuery) -> Result<f64, ServiceError> {
        let filter = filter.validate()?;
        let doc = self.load().await?;
        Ok(query::average(&doc, &filter))
    }

    /// Three best grades matching `subject` and `type`.
    pub async fn top3(&self, filter: SubjectTypeQuery) -> Result<TopGrades, ServiceError> {
        let filter = filter.validate()?;
        let doc = self.load().await?;
        Ok(query::top(&doc, &filter, TOP_LIMIT))
    }
}

fn log_not_found(e: &ServiceError, id: GradeId) {
    if let ServiceError::NotFound(_) = e {
        debug!(grade_id = id, "grade not found");
    }
}
