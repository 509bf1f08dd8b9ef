//! Course catalog backed by `cursos.json`.
//!
//! The issuance path only reads from the catalog. Course and module
//! administration mutate it in memory; callers persist with [`CourseCatalog::save`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{RecordKind, RecordsError, StoreError};
use crate::persist;
use crate::types::{CourseDefinition, EditStamp, ModuleDefinition};

/// Id of the course seeded into an empty catalog.
pub const DEFAULT_COURSE_ID: &str = "1";

/// Course id → course definition.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    /// Backing file; `None` for a catalog that never touches disk
    path: Option<PathBuf>,
    courses: BTreeMap<String, CourseDefinition>,
}

impl CourseCatalog {
    /// Load the catalog, seeding the default course when the file is absent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let courses = match persist::read_document::<BTreeMap<String, CourseDefinition>>(&path)? {
            Some(mut courses) => {
                for (id, course) in courses.iter_mut() {
                    course.id = id.clone();
                }
                courses
            }
            None => {
                info!(path = %path.display(), "Catalog file not found, seeding default course");
                Self::seed()
            }
        };

        debug!(path = %path.display(), courses = courses.len(), "Loaded course catalog");
        Ok(Self {
            path: Some(path),
            courses,
        })
    }

    /// An empty catalog with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn seed() -> BTreeMap<String, CourseDefinition> {
        let course = CourseDefinition::new(
            DEFAULT_COURSE_ID,
            "Introdução à Programação",
            "40h",
            "Sistema",
        );
        BTreeMap::from([(DEFAULT_COURSE_ID.to_string(), course)])
    }

    /// Write the whole catalog back to its file.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        persist::write_document(path, &self.courses)?;
        debug!(path = %path.display(), "Saved course catalog");
        Ok(())
    }

    pub fn get_course(&self, id: &str) -> Option<&CourseDefinition> {
        self.courses.get(id)
    }

    /// Like [`get_course`](Self::get_course), but unknown ids are an error.
    pub fn require(&self, id: &str) -> Result<&CourseDefinition, RecordsError> {
        self.get_course(id)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Course, id))
    }

    /// Courses ordered by numeric id, non-numeric ids last.
    pub fn courses(&self) -> Vec<&CourseDefinition> {
        let mut courses: Vec<_> = self.courses.values().collect();
        courses.sort_by_key(|c| (c.id.parse::<u64>().unwrap_or(u64::MAX), c.id.clone()));
        courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Insert or replace a course under its own id.
    pub fn insert(&mut self, course: CourseDefinition) {
        self.courses.insert(course.id.clone(), course);
    }

    /// Next free numeric id: one past the highest numeric id in use.
    pub fn next_id(&self) -> String {
        let highest = self
            .courses
            .keys()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (highest + 1).to_string()
    }

    /// Create a course with an automatically assigned id.
    pub fn create_course(
        &mut self,
        name: &str,
        workload: &str,
        created_by: &str,
    ) -> Result<String, RecordsError> {
        let name = name.trim();
        let workload = workload.trim();
        if name.is_empty() || workload.is_empty() {
            return Err(RecordsError::Invalid(
                "course name and workload are required".to_string(),
            ));
        }

        let id = self.next_id();
        self.insert(CourseDefinition::new(id.clone(), name, workload, created_by));
        info!(course_id = %id, name = %name, "Created course");
        Ok(id)
    }

    /// Change a course's name and/or workload. Blank values keep the current one.
    pub fn edit_course(
        &mut self,
        id: &str,
        name: Option<&str>,
        workload: Option<&str>,
        edited_by: &str,
    ) -> Result<(), RecordsError> {
        let course = self
            .courses
            .get_mut(id)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Course, id))?;

        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            course.name = name.to_string();
        }
        if let Some(workload) = workload.map(str::trim).filter(|w| !w.is_empty()) {
            course.workload = workload.to_string();
        }
        course.last_edit = Some(EditStamp {
            by: edited_by.to_string(),
            at: Utc::now(),
        });

        info!(course_id = %id, "Edited course");
        Ok(())
    }

    /// Delete a course. Enrollments, progress and certificates that name it
    /// are left in the learner store.
    pub fn remove_course(&mut self, id: &str) -> Result<CourseDefinition, RecordsError> {
        let removed = self
            .courses
            .remove(id)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Course, id))?;
        info!(course_id = %id, name = %removed.name, "Removed course");
        Ok(removed)
    }

    /// Append a module to a course.
    pub fn add_module(
        &mut self,
        course_id: &str,
        module_name: &str,
        created_by: &str,
    ) -> Result<(), RecordsError> {
        let module_name = module_name.trim();
        if module_name.is_empty() {
            return Err(RecordsError::Invalid("module name is required".to_string()));
        }

        let course = self
            .courses
            .get_mut(course_id)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Course, course_id))?;
        if course.has_module(module_name) {
            return Err(RecordsError::already_exists(RecordKind::Module, module_name));
        }

        course.modules.push(ModuleDefinition {
            name: module_name.to_string(),
            created_by: created_by.to_string(),
        });
        info!(course_id = %course_id, module = %module_name, "Added module");
        Ok(())
    }
}
