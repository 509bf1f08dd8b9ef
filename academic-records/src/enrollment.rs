//! Learner registration, enrollment and module completion.
//!
//! Every change is persisted immediately and, when an audit log is attached,
//! recorded there. A change whose write fails is undone in memory. Audit
//! failures are logged and otherwise ignored.

use tracing::{info, warn};

use crate::audit::{self, AuditLog};
use crate::catalog::CourseCatalog;
use crate::error::{RecordKind, RecordsError};
use crate::learners::LearnerRepository;
use crate::types::LearnerRecord;

/// Outcome of an enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrollment {
    Enrolled,
    AlreadyEnrolled,
}

/// Mutates learner records against the catalog.
pub struct Registrar<'a, L: LearnerRepository> {
    catalog: &'a CourseCatalog,
    learners: &'a mut L,
    audit: Option<&'a mut AuditLog>,
}

impl<'a, L: LearnerRepository> Registrar<'a, L> {
    pub fn new(catalog: &'a CourseCatalog, learners: &'a mut L) -> Self {
        Self {
            catalog,
            learners,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: &'a mut AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Add a learner with no enrollments.
    pub fn register_learner(&mut self, name: &str) -> Result<(), RecordsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecordsError::Invalid("learner name is required".to_string()));
        }
        if !self.learners.insert(LearnerRecord::new(name)) {
            return Err(RecordsError::already_exists(RecordKind::Learner, name));
        }

        if let Err(e) = self.learners.save() {
            self.learners.remove(name);
            warn!(learner = %name, error = %e, "Registration not persisted");
            return Err(e.into());
        }
        info!(learner = %name, "Registered learner");
        self.record(audit::LEARNER_REGISTERED, format!("Aluno: {name}"));
        Ok(())
    }

    /// Enroll a learner in a catalog course.
    pub fn enroll(&mut self, learner_name: &str, course_id: &str) -> Result<Enrollment, RecordsError> {
        self.catalog.require(course_id)?;
        let learner = self.learners.require_mut(learner_name)?;
        if learner.is_enrolled(course_id) {
            return Ok(Enrollment::AlreadyEnrolled);
        }
        let before = learner.clone();
        learner.enrolled.push(course_id.to_string());

        self.persist_or_restore(before)?;
        info!(learner = %learner_name, course_id = %course_id, "Enrolled learner");
        self.record(
            audit::ENROLLMENT,
            format!("Aluno: {learner_name} | Curso: {course_id}"),
        );
        Ok(Enrollment::Enrolled)
    }

    /// Mark a module complete. Returns `false` if it already was.
    pub fn complete_module(
        &mut self,
        learner_name: &str,
        course_id: &str,
        module: &str,
    ) -> Result<bool, RecordsError> {
        let course = self.catalog.require(course_id)?;
        if !course.has_module(module) {
            return Err(RecordsError::not_found(
                RecordKind::Module,
                format!("{course_id}/{module}"),
            ));
        }

        let learner = self.learners.require_mut(learner_name)?;
        if !learner.is_enrolled(course_id) {
            return Err(RecordsError::NotEnrolled {
                learner: learner_name.to_string(),
                course_id: course_id.to_string(),
            });
        }
        if learner.completed_in(course_id).iter().any(|m| m == module) {
            return Ok(false);
        }
        let before = learner.clone();
        learner
            .completed_modules
            .entry(course_id.to_string())
            .or_default()
            .push(module.to_string());

        self.persist_or_restore(before)?;
        info!(
            learner = %learner_name,
            course_id = %course_id,
            module = %module,
            "Completed module"
        );
        self.record(
            audit::MODULE_COMPLETED,
            format!("Aluno: {learner_name} | Curso: {course_id} | Módulo: {module}"),
        );
        Ok(true)
    }

    /// Save the store, putting `before` back in memory if the write fails.
    fn persist_or_restore(&mut self, before: LearnerRecord) -> Result<(), RecordsError> {
        let Err(e) = self.learners.save() else {
            return Ok(());
        };
        warn!(learner = %before.name, error = %e, "Learner change not persisted");
        if let Some(record) = self.learners.get_mut(&before.name) {
            *record = before;
        }
        Err(e.into())
    }

    fn record(&mut self, action: &str, details: String) {
        if let Some(log) = self.audit.as_deref_mut() {
            if let Err(e) = log.log_event(action, &details) {
                warn!(action = %action, error = %e, "Failed to write audit event");
            }
        }
    }
}
