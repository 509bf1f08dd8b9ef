//! Completion tracking for (learner, course) pairs.

use serde::Serialize;

use crate::catalog::CourseCatalog;
use crate::error::{RecordKind, RecordsError};
use crate::types::LearnerRecord;

/// Completed vs. total modules for one learner in one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleProgress {
    pub completed: usize,
    pub total: usize,
}

impl ModuleProgress {
    /// Fraction in `[0, 1]`. A course without modules counts as 0.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fraction() == 1.0
    }
}

/// One row of a learner's "my courses" view.
#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub course_id: String,
    pub course_name: String,
    pub workload: String,
    pub completed: usize,
    pub total: usize,
    pub fraction: f64,
    /// Every module done: a certificate can be issued
    pub eligible: bool,
}

/// Computes completion against the catalog. Has no side effects.
pub struct ProgressEvaluator<'a> {
    catalog: &'a CourseCatalog,
}

impl<'a> ProgressEvaluator<'a> {
    pub fn new(catalog: &'a CourseCatalog) -> Self {
        Self { catalog }
    }

    /// Count completed modules for an enrolled course.
    ///
    /// Only names of modules the course currently defines are counted, so a
    /// stale or duplicated entry never pushes progress past 100%.
    pub fn module_progress(
        &self,
        learner: &LearnerRecord,
        course_id: &str,
    ) -> Result<ModuleProgress, RecordsError> {
        let course = self
            .catalog
            .get_course(course_id)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Course, course_id))?;
        if !learner.is_enrolled(course_id) {
            return Err(RecordsError::NotEnrolled {
                learner: learner.name.clone(),
                course_id: course_id.to_string(),
            });
        }

        let done = learner.completed_in(course_id);
        let completed = course
            .modules
            .iter()
            .filter(|module| done.contains(&module.name))
            .count();

        Ok(ModuleProgress {
            completed,
            total: course.module_count(),
        })
    }

    pub fn completion_fraction(
        &self,
        learner: &LearnerRecord,
        course_id: &str,
    ) -> Result<f64, RecordsError> {
        Ok(self.module_progress(learner, course_id)?.fraction())
    }

    pub fn is_complete(&self, learner: &LearnerRecord, course_id: &str) -> Result<bool, RecordsError> {
        Ok(self.completion_fraction(learner, course_id)? == 1.0)
    }

    /// Progress for every enrolled course that is still in the catalog.
    pub fn progress_report(&self, learner: &LearnerRecord) -> Vec<CourseProgress> {
        learner
            .enrolled
            .iter()
            .filter_map(|course_id| {
                let course = self.catalog.get_course(course_id)?;
                let progress = self.module_progress(learner, course_id).ok()?;
                Some(CourseProgress {
                    course_id: course_id.clone(),
                    course_name: course.name.clone(),
                    workload: course.workload.clone(),
                    completed: progress.completed,
                    total: progress.total,
                    fraction: progress.fraction(),
                    eligible: progress.is_complete(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CourseDefinition;

    fn catalog_with_modules(modules: &[&str]) -> CourseCatalog {
        let mut catalog = CourseCatalog::in_memory();
        catalog.insert(CourseDefinition::new("1", "Introdução à Programação", "40h", "Sistema"));
        for module in modules {
            catalog.add_module("1", module, "admin").unwrap();
        }
        catalog
    }

    fn enrolled_learner(done: &[&str]) -> LearnerRecord {
        let mut learner = LearnerRecord::new("Ana");
        learner.enrolled.push("1".to_string());
        learner.completed_modules.insert(
            "1".to_string(),
            done.iter().map(|m| m.to_string()).collect(),
        );
        learner
    }

    #[test]
    fn test_fraction_counts_completed_modules() {
        let catalog = catalog_with_modules(&["A", "B", "C", "D"]);
        let evaluator = ProgressEvaluator::new(&catalog);

        let learner = enrolled_learner(&["A"]);
        assert_eq!(evaluator.completion_fraction(&learner, "1").unwrap(), 0.25);
        assert!(!evaluator.is_complete(&learner, "1").unwrap());

        let learner = enrolled_learner(&["A", "B", "C", "D"]);
        assert_eq!(evaluator.completion_fraction(&learner, "1").unwrap(), 1.0);
        assert!(evaluator.is_complete(&learner, "1").unwrap());
    }

    #[test]
    fn test_zero_modules_is_zero_not_error() {
        let catalog = catalog_with_modules(&[]);
        let evaluator = ProgressEvaluator::new(&catalog);
        let learner = enrolled_learner(&[]);

        assert_eq!(evaluator.completion_fraction(&learner, "1").unwrap(), 0.0);
        assert!(!evaluator.is_complete(&learner, "1").unwrap());
    }

    #[test]
    fn test_unknown_modules_are_ignored() {
        let catalog = catalog_with_modules(&["A", "B"]);
        let evaluator = ProgressEvaluator::new(&catalog);
        let learner = enrolled_learner(&["A", "Removed", "Other"]);

        assert_eq!(evaluator.completion_fraction(&learner, "1").unwrap(), 0.5);
    }

    #[test]
    fn test_not_enrolled_and_unknown_course() {
        let catalog = catalog_with_modules(&["A"]);
        let evaluator = ProgressEvaluator::new(&catalog);
        let learner = LearnerRecord::new("Ana");

        assert!(matches!(
            evaluator.completion_fraction(&learner, "1"),
            Err(RecordsError::NotEnrolled { .. })
        ));
        assert!(matches!(
            evaluator.completion_fraction(&learner, "42"),
            Err(RecordsError::NotFound { kind: RecordKind::Course, .. })
        ));
    }

    #[test]
    fn test_progress_report_skips_removed_courses() {
        let catalog = catalog_with_modules(&["A", "B"]);
        let evaluator = ProgressEvaluator::new(&catalog);
        let mut learner = enrolled_learner(&["A", "B"]);
        learner.enrolled.push("7".to_string());

        let report = evaluator.progress_report(&learner);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].course_name, "Introdução à Programação");
        assert!(report[0].eligible);
    }
}
