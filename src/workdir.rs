//! Locating the course and its exercises on disk.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

/// File marking the root directory of a downloaded course.
pub const COURSE_MARKER: &str = ".tmc.json";
/// File marking a testable exercise directory.
const EXERCISE_MARKER: &str = "Cargo.toml";

/// One exercise selected for testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseRef {
    pub name: String,
    pub course_name: Option<String>,
    pub path: PathBuf,
}

/// Maps command line arguments to exercises of the current course.
pub trait WorkspaceResolver {
    /// Resolve a path argument (relative to the working directory).
    fn resolve(&self, argument: &str) -> Option<ExerciseRef>;

    /// Exercises tested when no argument is given.
    fn exercises_in_scope(&self) -> Vec<ExerciseRef>;

    fn course_name(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct WorkDir {
    current_dir: PathBuf,
    course_dir: Option<PathBuf>,
}

impl WorkDir {
    pub fn new(current_dir: impl AsRef<Path>) -> Self {
        let current_dir = current_dir.as_ref();
        let current_dir = current_dir
            .canonicalize()
            .unwrap_or_else(|_| current_dir.to_path_buf());
        let course_dir = Self::find_course_directory(&current_dir);
        Self {
            current_dir,
            course_dir,
        }
    }

    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn course_directory(&self) -> Option<&Path> {
        self.course_dir.as_deref()
    }

    fn find_course_directory(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(COURSE_MARKER).is_file())
            .map(Path::to_path_buf)
    }

    fn exercise_containing(&self, path: &Path) -> Option<ExerciseRef> {
        let course_dir = self.course_dir.as_ref()?;
        let relative = path.strip_prefix(course_dir).ok()?;
        match relative.components().next()? {
            Component::Normal(name) => self.exercise_at(&course_dir.join(name)),
            _ => None,
        }
    }

    fn exercise_at(&self, dir: &Path) -> Option<ExerciseRef> {
        if !dir.join(EXERCISE_MARKER).is_file() {
            return None;
        }
        Some(ExerciseRef {
            name: dir.file_name()?.to_string_lossy().into_owned(),
            course_name: self.course_name(),
            path: dir.to_path_buf(),
        })
    }
}

impl WorkspaceResolver for WorkDir {
    fn resolve(&self, argument: &str) -> Option<ExerciseRef> {
        let path = self.current_dir.join(argument).canonicalize().ok()?;
        self.exercise_containing(&path)
    }

    fn exercises_in_scope(&self) -> Vec<ExerciseRef> {
        if let Some(exercise) = self.exercise_containing(&self.current_dir) {
            return vec![exercise];
        }
        let Some(course_dir) = &self.course_dir else {
            return Vec::new();
        };

        let entries = match std::fs::read_dir(course_dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(
                    dir = %course_dir.display(),
                    error = %err,
                    "cannot list course directory"
                );
                return Vec::new();
            }
        };
        let mut exercises: Vec<ExerciseRef> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|e| self.exercise_at(&e.path()))
            .collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        exercises
    }

    fn course_name(&self) -> Option<String> {
        self.course_dir
            .as_ref()?
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}
