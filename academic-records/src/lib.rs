//! Academic records: course progress and certificate issuance.
//!
//! Learners, courses and certificates live in flat JSON files. This crate
//! owns the part of the system with real invariants:
//!
//! - [`ProgressEvaluator`]: completion fraction per (learner, course)
//! - [`identity::mint_code`]: `CERT-` codes derived from a SHA-256 digest
//! - [`CertificateRenderer`]: one Markdown document per certificate
//! - [`CertificateLedger`]: eligibility-gated issuance, listing and lookup
//!
//! Repositories ([`CourseCatalog`], [`LearnerStore`]) are plain values handed
//! to the components; nothing is global.
//!
//! # Example
//!
//! ```no_run
//! use academic_records::{CertificateLedger, CertificateRenderer, CourseCatalog, LearnerStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = CourseCatalog::load("cursos.json")?;
//! let mut learners = LearnerStore::load("usuarios.json")?;
//! let renderer = CertificateRenderer::new("certificados");
//!
//! let mut ledger = CertificateLedger::new(&catalog, &mut learners, &renderer);
//! let certificate = ledger.issue("Ana", "1")?;
//! println!("{}", certificate.code);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod catalog;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod identity;
pub mod learners;
pub mod ledger;
pub mod progress;
pub mod render;
pub mod timestamp;
pub mod types;

mod persist;

// Re-export main types
pub use audit::{AuditEntry, AuditLog};
pub use catalog::CourseCatalog;
pub use config::{ConfigError, RecordsConfig};
pub use enrollment::{Enrollment, Registrar};
pub use error::{RecordKind, RecordsError, RenderError, StoreError};
pub use learners::{LearnerRepository, LearnerStore};
pub use ledger::{CertificateLedger, CertificateListing, LocatedCertificate};
pub use progress::{CourseProgress, ModuleProgress, ProgressEvaluator};
pub use render::CertificateRenderer;
pub use types::*;
