//! Subcommands - one per records operation
//!
//! Each command runs against a [`Session`] and returns the text to print.

use std::fmt::Write as _;

use academic_records::audit;
use academic_records::{
    AuditLog, CertificateLedger, CertificateRenderer, CourseCatalog, Enrollment,
    LearnerRepository, LearnerStore, ProgressEvaluator, RecordsConfig, RecordsError, Registrar,
};
use clap::Subcommand;
use tracing::{info, warn};

/// Records CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List catalog courses
    Courses,

    /// Course administration
    #[command(subcommand)]
    Course(CourseCommands),

    /// Register a learner
    Register {
        /// Learner name
        name: String,
    },

    /// Enroll a learner in a course
    Enroll {
        /// Learner name
        learner: String,
        /// Course id
        course: String,
    },

    /// Mark a module as completed
    Complete {
        /// Learner name
        learner: String,
        /// Course id
        course: String,
        /// Module name
        module: String,
    },

    /// Show progress in every enrolled course
    Progress {
        /// Learner name
        learner: String,
    },

    /// Issue a completion certificate
    Issue {
        /// Learner name
        learner: String,
        /// Course id
        course: String,
    },

    /// List a learner's certificates
    Certificates {
        /// Learner name
        learner: String,
    },

    /// Look up a certificate by validation code
    Find {
        /// Certificate code (CERT-...)
        code: String,
        /// Restrict the search to one learner
        #[arg(short, long)]
        learner: Option<String>,
    },
}

/// Catalog administration
#[derive(Debug, Subcommand)]
pub enum CourseCommands {
    /// Create a course with the next free id
    Add {
        /// Course name
        #[arg(short, long)]
        name: String,
        /// Workload label, e.g. "40h"
        #[arg(short, long)]
        workload: String,
        /// Author recorded on the course
        #[arg(long, default_value = "admin")]
        by: String,
    },

    /// Rename a course or change its workload
    Edit {
        /// Course id
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New workload label
        #[arg(short, long)]
        workload: Option<String>,
        /// Editor recorded on the course
        #[arg(long, default_value = "admin")]
        by: String,
    },

    /// Append a module to a course
    AddModule {
        /// Course id
        course: String,
        /// Module name
        module: String,
        /// Author recorded on the module
        #[arg(long, default_value = "admin")]
        by: String,
    },

    /// Delete a course. Issued certificates keep their records.
    Remove {
        /// Course id
        id: String,
    },
}

/// Loaded stores for one invocation.
pub struct Session {
    pub catalog: CourseCatalog,
    pub learners: LearnerStore,
    pub renderer: CertificateRenderer,
    pub audit: AuditLog,
}

impl Session {
    /// Load the stores named by `config`, creating the data directory if needed.
    pub fn open(config: &RecordsConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let catalog = CourseCatalog::load(config.courses_path())?;
        let learners = LearnerStore::load(config.learners_path())?;
        let renderer = CertificateRenderer::new(config.certificates_path());
        let audit = if config.audit_enabled {
            AuditLog::open(config.audit_path())
        } else {
            AuditLog::in_memory()
        };

        info!(
            courses = catalog.len(),
            learners = learners.len(),
            "Opened records session"
        );
        Ok(Self {
            catalog,
            learners,
            renderer,
            audit,
        })
    }

    fn ledger(&mut self) -> CertificateLedger<'_, LearnerStore> {
        CertificateLedger::new(&self.catalog, &mut self.learners, &self.renderer)
            .with_audit(&mut self.audit)
    }

    fn registrar(&mut self) -> Registrar<'_, LearnerStore> {
        Registrar::new(&self.catalog, &mut self.learners).with_audit(&mut self.audit)
    }

    /// Apply an admin change to the catalog, persist it and audit it.
    ///
    /// `change` returns its result and the audit details. The in-memory
    /// catalog is put back as it was when the save fails.
    fn update_catalog<T>(
        &mut self,
        action: &str,
        change: impl FnOnce(&mut CourseCatalog) -> Result<(T, String), RecordsError>,
    ) -> Result<T, RecordsError> {
        let before = self.catalog.clone();
        let (value, details) = change(&mut self.catalog)?;

        if let Err(e) = self.catalog.save() {
            warn!(action = %action, error = %e, "Catalog change not persisted");
            self.catalog = before;
            return Err(e.into());
        }
        if let Err(e) = self.audit.log_event(action, &details) {
            warn!(action = %action, error = %e, "Failed to write audit event");
        }
        Ok(value)
    }
}

/// Execute a command and return its output.
pub fn execute(session: &mut Session, command: Commands) -> Result<String, RecordsError> {
    match command {
        Commands::Courses => Ok(list_courses(&session.catalog)),

        Commands::Course(cmd) => execute_course(session, cmd),

        Commands::Register { name } => {
            session.registrar().register_learner(&name)?;
            Ok(format!("Registered learner {}", name.trim()))
        }

        Commands::Enroll { learner, course } => {
            match session.registrar().enroll(&learner, &course)? {
                Enrollment::Enrolled => Ok(format!("Enrolled {learner} in course {course}")),
                Enrollment::AlreadyEnrolled => {
                    Ok(format!("{learner} is already enrolled in course {course}"))
                }
            }
        }

        Commands::Complete {
            learner,
            course,
            module,
        } => {
            if session.registrar().complete_module(&learner, &course, &module)? {
                Ok(format!("Module '{module}' completed"))
            } else {
                Ok(format!("Module '{module}' was already completed"))
            }
        }

        Commands::Progress { learner } => {
            let record = session.learners.require(&learner)?;
            Ok(progress_report(&session.catalog, record))
        }

        Commands::Issue { learner, course } => {
            let cert = session.ledger().issue(&learner, &course)?;
            Ok(format!(
                "Certificate issued\n   Code: {}\n   File: {}",
                cert.code,
                cert.artifact.display()
            ))
        }

        Commands::Certificates { learner } => {
            let listing = session.ledger().list_with_course_names(&learner)?;
            if listing.is_empty() {
                return Ok(format!("No certificates for {learner}"));
            }
            let mut out = String::new();
            for (idx, entry) in listing.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", idx + 1, entry.course_name);
                let _ = writeln!(out, "   Code: {}", entry.certificate.code);
                let _ = writeln!(
                    out,
                    "   Date: {}",
                    entry.certificate.issued_at.format("%Y-%m-%d")
                );
            }
            Ok(out.trim_end().to_string())
        }

        Commands::Find { code, learner } => {
            let ledger = session.ledger();
            let (holder, cert) = match learner {
                Some(name) => {
                    let cert = ledger.find_for_learner(&name, &code)?.clone();
                    (name, cert)
                }
                None => {
                    let found = ledger.find_by_code(&code)?;
                    (found.learner, found.certificate)
                }
            };
            Ok(format!(
                "{}\n   Learner: {}\n   Course: {}\n   Issued: {}\n   File: {}",
                cert.code,
                holder,
                cert.course_id,
                academic_records::timestamp::format(&cert.issued_at),
                cert.artifact.display()
            ))
        }
    }
}

fn execute_course(session: &mut Session, command: CourseCommands) -> Result<String, RecordsError> {
    match command {
        CourseCommands::Add { name, workload, by } => {
            let id = session.update_catalog(audit::COURSE_CREATED, |catalog| {
                let id = catalog.create_course(&name, &workload, &by)?;
                let details = format!("ID: {id} | Nome: {}", name.trim());
                Ok((id, details))
            })?;
            Ok(format!("Created course {id}"))
        }

        CourseCommands::Edit {
            id,
            name,
            workload,
            by,
        } => {
            session.update_catalog(audit::COURSE_EDITED, |catalog| {
                catalog.edit_course(&id, name.as_deref(), workload.as_deref(), &by)?;
                Ok(((), format!("ID: {id}")))
            })?;
            Ok(format!("Updated course {id}"))
        }

        CourseCommands::AddModule { course, module, by } => {
            session.update_catalog(audit::MODULE_ADDED, |catalog| {
                catalog.add_module(&course, &module, &by)?;
                Ok(((), format!("Curso: {course} | Módulo: {}", module.trim())))
            })?;
            Ok(format!("Added module '{}' to course {course}", module.trim()))
        }

        CourseCommands::Remove { id } => {
            let removed = session.update_catalog(audit::COURSE_REMOVED, |catalog| {
                let removed = catalog.remove_course(&id)?;
                let details = format!("ID: {id} | Nome: {}", removed.name);
                Ok((removed, details))
            })?;
            Ok(format!("Removed course {id} ({})", removed.name))
        }
    }
}

fn list_courses(catalog: &CourseCatalog) -> String {
    let mut out = String::new();
    for course in catalog.courses() {
        let _ = writeln!(out, "{}. {} ({})", course.id, course.name, course.workload);
        let _ = writeln!(out, "   Created by: {}", course.created_by);
        let _ = writeln!(out, "   Date: {}", course.created_at.format("%Y-%m-%d"));
        if course.modules.is_empty() {
            let _ = writeln!(out, "   No modules yet");
        } else {
            for module in &course.modules {
                let _ = writeln!(out, "     - {} (by {})", module.name, module.created_by);
            }
        }
    }
    out.trim_end().to_string()
}

fn progress_report(catalog: &CourseCatalog, learner: &academic_records::LearnerRecord) -> String {
    let report = ProgressEvaluator::new(catalog).progress_report(learner);
    if report.is_empty() {
        return format!("{} is not enrolled in any course", learner.name);
    }

    let mut out = String::new();
    for row in report {
        let _ = writeln!(out, "{} ({})", row.course_name, row.course_id);
        let _ = writeln!(
            out,
            "   Progress: {:.0}% ({}/{})",
            row.fraction * 100.0,
            row.completed,
            row.total
        );
        let _ = writeln!(out, "   Workload: {}", row.workload);
        if row.eligible {
            let _ = writeln!(out, "   Ready for certificate");
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(temp_dir: &TempDir) -> Session {
        Session::open(&RecordsConfig::with_data_dir(temp_dir.path())).unwrap()
    }

    fn run(session: &mut Session, command: Commands) -> String {
        execute(session, command).unwrap()
    }

    #[test]
    fn test_issue_flow() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        run(
            &mut session,
            Commands::Course(CourseCommands::AddModule {
                course: "1".into(),
                module: "A".into(),
                by: "admin".into(),
            }),
        );
        run(&mut session, Commands::Register { name: "Ana".into() });
        run(
            &mut session,
            Commands::Enroll {
                learner: "Ana".into(),
                course: "1".into(),
            },
        );

        let refused = execute(
            &mut session,
            Commands::Issue {
                learner: "Ana".into(),
                course: "1".into(),
            },
        )
        .unwrap_err();
        assert!(refused.is_routine());

        run(
            &mut session,
            Commands::Complete {
                learner: "Ana".into(),
                course: "1".into(),
                module: "A".into(),
            },
        );
        let progress = run(&mut session, Commands::Progress { learner: "Ana".into() });
        assert!(progress.contains("100%"));
        assert!(progress.contains("Ready for certificate"));

        let issued = run(
            &mut session,
            Commands::Issue {
                learner: "Ana".into(),
                course: "1".into(),
            },
        );
        assert!(issued.contains("CERT-"));

        let listing = run(&mut session, Commands::Certificates { learner: "Ana".into() });
        assert!(listing.starts_with("1. Introdução à Programação"));
    }

    #[test]
    fn test_catalog_changes_persist() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        let out = run(
            &mut session,
            Commands::Course(CourseCommands::Add {
                name: "Redes".into(),
                workload: "20h".into(),
                by: "admin".into(),
            }),
        );
        assert_eq!(out, "Created course 2");

        let reopened = self::session(&temp_dir);
        let courses = list_courses(&reopened.catalog);
        assert!(courses.contains("2. Redes (20h)"));
    }

    #[test]
    fn test_find_unknown_code() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        let err = execute(
            &mut session,
            Commands::Find {
                code: "CERT-000000000000".into(),
                learner: None,
            },
        )
        .unwrap_err();
        assert!(!err.is_routine());
    }

    #[test]
    fn test_failed_catalog_save_is_rolled_back() {
        let temp_dir = TempDir::new().unwrap();
        let config = RecordsConfig::with_data_dir(temp_dir.path());
        let mut session = Session::open(&config).unwrap();
        // A directory squatting on the catalog path makes the write fail.
        std::fs::create_dir(config.courses_path()).unwrap();

        let add = Commands::Course(CourseCommands::Add {
            name: "Redes".into(),
            workload: "20h".into(),
            by: "admin".into(),
        });
        let err = execute(&mut session, add).unwrap_err();
        assert!(matches!(err, RecordsError::Persistence(_)));
        assert_eq!(session.catalog.len(), 1);
        assert_eq!(session.catalog.next_id(), "2");

        let add_module = Commands::Course(CourseCommands::AddModule {
            course: "1".into(),
            module: "A".into(),
            by: "admin".into(),
        });
        assert!(execute(&mut session, add_module).is_err());
        assert!(!session.catalog.require("1").unwrap().has_module("A"));
        assert_eq!(session.audit.count(), 0);
    }

    #[test]
    fn test_removed_course_keeps_certificates() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        run(
            &mut session,
            Commands::Course(CourseCommands::AddModule {
                course: "1".into(),
                module: "A".into(),
                by: "admin".into(),
            }),
        );
        run(&mut session, Commands::Register { name: "Ana".into() });
        run(
            &mut session,
            Commands::Enroll {
                learner: "Ana".into(),
                course: "1".into(),
            },
        );
        run(
            &mut session,
            Commands::Complete {
                learner: "Ana".into(),
                course: "1".into(),
                module: "A".into(),
            },
        );
        run(
            &mut session,
            Commands::Issue {
                learner: "Ana".into(),
                course: "1".into(),
            },
        );

        let out = run(
            &mut session,
            Commands::Course(CourseCommands::Remove { id: "1".into() }),
        );
        assert_eq!(out, "Removed course 1 (Introdução à Programação)");

        let reopened = self::session(&temp_dir);
        assert!(reopened.catalog.is_empty());
        let listing = run(&mut session, Commands::Certificates { learner: "Ana".into() });
        assert!(listing.starts_with("1. Curso Removido"));
    }
}
