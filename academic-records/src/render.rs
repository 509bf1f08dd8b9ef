//! Certificate documents.
//!
//! Each issuance is written as a single-page Markdown document named after
//! its code (`<dir>/<code>.md`). The directory is created on first use.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::RenderError;

/// File extension of rendered certificates.
pub const ARTIFACT_EXTENSION: &str = "md";

const FOOTER: &str = "Este certificado pode ser validado em nossa plataforma";

/// Writes certificate documents into a dedicated directory.
#[derive(Debug, Clone)]
pub struct CertificateRenderer {
    output_dir: PathBuf,
}

impl CertificateRenderer {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the document for `code` lives.
    pub fn artifact_path(&self, code: &str) -> PathBuf {
        self.output_dir
            .join(code)
            .with_extension(ARTIFACT_EXTENSION)
    }

    /// Write the certificate document and return its location.
    pub fn render(
        &self,
        learner_name: &str,
        course_name: &str,
        workload: &str,
        code: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.artifact_path(code);
        let document = Self::to_markdown(learner_name, course_name, workload, code, issued_at);
        std::fs::write(&path, document).map_err(|source| RenderError::Write {
            path: path.clone(),
            source,
        })?;

        info!(code = %code, path = %path.display(), "Rendered certificate");
        Ok(path)
    }

    /// The document body.
    pub fn to_markdown(
        learner_name: &str,
        course_name: &str,
        workload: &str,
        code: &str,
        issued_at: DateTime<Utc>,
    ) -> String {
        format!(
            r#"# CERTIFICADO

Certificamos que **{learner_name}** concluiu com êxito o curso **'{course_name}'** com carga horária de **{workload}**.

Data de emissão: {date}

Código de validação: `{code}`

---

*{FOOTER}*
"#,
            date = issued_at.format("%d/%m/%Y"),
        )
    }
}
