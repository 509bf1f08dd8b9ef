//! Certificate ledger.
//!
//! Issuance runs in a fixed order: check eligibility, mint a code, render the
//! document, append to the learner's history, persist, audit. A render
//! failure leaves the records untouched. A persistence failure after a
//! successful render leaves the document on disk without a history entry;
//! the store has no transactions to prevent that.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::{self, AuditLog};
use crate::catalog::CourseCatalog;
use crate::error::{RecordKind, RecordsError};
use crate::identity;
use crate::learners::LearnerRepository;
use crate::progress::ProgressEvaluator;
use crate::render::CertificateRenderer;
use crate::types::IssuedCertificate;

/// Shown in listings for certificates whose course left the catalog.
pub const REMOVED_COURSE_NAME: &str = "Curso Removido";

/// Re-mint attempts before giving up on a taken code.
const MAX_MINT_ATTEMPTS: u32 = 16;

/// A certificate together with the learner holding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedCertificate {
    pub learner: String,
    pub certificate: IssuedCertificate,
}

/// A certificate with its course name resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateListing {
    pub course_name: String,
    pub certificate: IssuedCertificate,
}

/// Issues and looks up certificates over injected repositories.
pub struct CertificateLedger<'a, L: LearnerRepository> {
    catalog: &'a CourseCatalog,
    learners: &'a mut L,
    renderer: &'a CertificateRenderer,
    audit: Option<&'a mut AuditLog>,
}

impl<'a, L: LearnerRepository> CertificateLedger<'a, L> {
    pub fn new(
        catalog: &'a CourseCatalog,
        learners: &'a mut L,
        renderer: &'a CertificateRenderer,
    ) -> Self {
        Self {
            catalog,
            learners,
            renderer,
            audit: None,
        }
    }

    /// Record successful issuances in an audit log.
    pub fn with_audit(mut self, audit: &'a mut AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Issue a certificate stamped with the current time.
    pub fn issue(
        &mut self,
        learner_name: &str,
        course_id: &str,
    ) -> Result<IssuedCertificate, RecordsError> {
        self.issue_at(learner_name, course_id, Utc::now())
    }

    /// Issue a certificate stamped with `issued_at`.
    ///
    /// Fails with [`RecordsError::Ineligible`] unless every module of the
    /// course is complete; nothing is written in that case. Issuing again for
    /// a course already certified adds a second entry with a new code.
    pub fn issue_at(
        &mut self,
        learner_name: &str,
        course_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedCertificate, RecordsError> {
        // Stores keep microseconds; mint from the value that will be read back.
        let issued_at = issued_at.trunc_subsecs(6);
        let catalog = self.catalog;
        let learner = self.learners.require(learner_name)?;
        let progress = ProgressEvaluator::new(catalog).module_progress(learner, course_id)?;
        if !progress.is_complete() {
            debug!(
                learner = %learner_name,
                course_id = %course_id,
                completed = progress.completed,
                total = progress.total,
                "Certificate refused, course not complete"
            );
            return Err(RecordsError::Ineligible {
                learner: learner_name.to_string(),
                course_id: course_id.to_string(),
                completed: progress.completed,
                total: progress.total,
            });
        }
        let course = catalog.require(course_id)?;

        let (code, issued_at) = self.mint_unique(learner_name, &course.name, issued_at)?;
        let artifact =
            self.renderer
                .render(learner_name, &course.name, &course.workload, &code, issued_at)?;

        let certificate = IssuedCertificate {
            course_id: course_id.to_string(),
            code,
            issued_at,
            artifact,
        };
        self.learners
            .require_mut(learner_name)?
            .certificates
            .push(certificate.clone());

        if let Err(e) = self.learners.save() {
            if let Some(record) = self.learners.get_mut(learner_name) {
                record.certificates.pop();
            }
            warn!(
                code = %certificate.code,
                artifact = %certificate.artifact.display(),
                error = %e,
                "Certificate rendered but not recorded"
            );
            return Err(RecordsError::Persistence(e));
        }

        info!(
            learner = %learner_name,
            course_id = %course_id,
            code = %certificate.code,
            "Issued certificate"
        );

        if let Some(log) = self.audit.as_deref_mut() {
            let details = format!("Aluno: {learner_name} | Curso: {course_id}");
            if let Err(e) = log.log_event(audit::CERTIFICATE_ISSUED, &details) {
                warn!(error = %e, "Failed to write audit event");
            }
        }

        Ok(certificate)
    }

    /// Mint a code no learner holds yet, nudging the timestamp on collision.
    fn mint_unique(
        &self,
        learner_name: &str,
        course_name: &str,
        mut issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), RecordsError> {
        for _ in 0..MAX_MINT_ATTEMPTS {
            let code = identity::mint_code(learner_name, course_name, issued_at);
            if !self.code_taken(&code) {
                return Ok((code, issued_at));
            }
            debug!(code = %code, "Certificate code taken, re-minting");
            issued_at += Duration::microseconds(1);
        }
        Err(RecordsError::DuplicateCode(format!(
            "{learner_name} / {course_name}"
        )))
    }

    fn code_taken(&self, code: &str) -> bool {
        self.renderer.artifact_path(code).exists()
            || self
                .learners
                .learners()
                .any(|l| l.certificates.iter().any(|c| c.code == code))
    }

    /// A learner's certificates in issuance order.
    pub fn list(&self, learner_name: &str) -> Result<&[IssuedCertificate], RecordsError> {
        Ok(&self.learners.require(learner_name)?.certificates)
    }

    /// A learner's certificates with course names resolved.
    pub fn list_with_course_names(
        &self,
        learner_name: &str,
    ) -> Result<Vec<CertificateListing>, RecordsError> {
        Ok(self
            .list(learner_name)?
            .iter()
            .map(|certificate| CertificateListing {
                course_name: self
                    .catalog
                    .get_course(&certificate.course_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| REMOVED_COURSE_NAME.to_string()),
                certificate: certificate.clone(),
            })
            .collect())
    }

    /// Look a code up across every learner.
    pub fn find_by_code(&self, code: &str) -> Result<LocatedCertificate, RecordsError> {
        self.learners
            .learners()
            .find_map(|learner| {
                learner
                    .certificates
                    .iter()
                    .find(|c| c.code == code)
                    .map(|certificate| LocatedCertificate {
                        learner: learner.name.clone(),
                        certificate: certificate.clone(),
                    })
            })
            .ok_or_else(|| RecordsError::not_found(RecordKind::Certificate, code))
    }

    /// Look a code up in one learner's history.
    pub fn find_for_learner(
        &self,
        learner_name: &str,
        code: &str,
    ) -> Result<&IssuedCertificate, RecordsError> {
        self.list(learner_name)?
            .iter()
            .find(|c| c.code == code)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Certificate, code))
    }
}
