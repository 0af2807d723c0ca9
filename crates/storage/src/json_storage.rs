//! JSON file storage implementation.
//!
//! Stores catalog courses and progress records as JSON files under a data
//! directory and keeps small per-object meta markers (version + updated_at).
//!
//! ```text
//! <root>/courses/<course>.json
//! <root>/progress/<user>/<course>.json
//! <root>/meta/courses/<course>.meta.json
//! <root>/meta/progress/<user>/<course>.meta.json
//! ```

use std::path::{Path, PathBuf};

use eduhub_core::{Course, CourseId, UserCourseProgress, UserId};
use tokio::fs;
use tracing::{debug, warn};

use super::{Catalog, EnrollmentStore, Result, StorageError};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the directories it needs.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("courses")).await?;
        fs::create_dir_all(root.join("progress")).await?;
        fs::create_dir_all(root.join("meta").join("courses")).await?;
        fs::create_dir_all(root.join("meta").join("progress")).await?;

        Ok(Self { root })
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn course_path(&self, id: &CourseId) -> PathBuf {
        self.root.join("courses").join(format!("{}.json", file_stem(id.as_str())))
    }

    fn user_dir(&self, user: &UserId) -> PathBuf {
        self.root.join("progress").join(file_stem(user.as_str()))
    }

    fn progress_path(&self, user: &UserId, course: &CourseId) -> PathBuf {
        self.user_dir(user).join(format!("{}.json", file_stem(course.as_str())))
    }

    fn meta_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join("meta").join(kind).join(format!("{}.meta.json", id))
    }

    /// Read and increment per-object version, return new version.
    async fn bump_version(&self, kind: &str, id: &str) -> Result<u64> {
        let path = self.meta_path(kind, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    /// Current version of a stored course, 0 if never written.
    pub async fn course_version(&self, id: &CourseId) -> Result<u64> {
        let meta: Option<serde_json::Value> =
            read_json(&self.meta_path("courses", &file_stem(id.as_str()))).await?;
        Ok(meta
            .and_then(|m| m.get("version").and_then(|v| v.as_u64()))
            .unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl Catalog for JsonStorage {
    async fn save_course(&mut self, course: &Course) -> Result<()> {
        let path = self.course_path(&course.id);
        let json = serde_json::to_string_pretty(course)?;
        fs::write(&path, json.as_bytes()).await?;

        let version = self.bump_version("courses", &file_stem(course.id.as_str())).await?;
        debug!(course = %course.id, version, "saved course");
        Ok(())
    }

    async fn load_course(&self, id: &CourseId) -> Result<Option<Course>> {
        let path = self.course_path(id);
        let course: Option<Course> = read_json(&path).await?;
        if let Some(course) = &course {
            ensure_key(&path, id.as_str(), course.id.as_str())?;
        }
        Ok(course)
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let mut courses = Vec::new();
        for (path, course) in read_records::<Course>(&self.root.join("courses")).await? {
            match course {
                Ok(Some(course)) => courses.push(course),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable course"),
            }
        }
        courses.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(courses)
    }
}

#[async_trait::async_trait]
impl EnrollmentStore for JsonStorage {
    async fn save_progress(&mut self, progress: &UserCourseProgress) -> Result<()> {
        fs::create_dir_all(self.user_dir(&progress.user_id)).await?;

        let path = self.progress_path(&progress.user_id, &progress.course_id);
        let json = serde_json::to_string_pretty(progress)?;
        fs::write(&path, json.as_bytes()).await?;

        let meta_id = Path::new(&file_stem(progress.user_id.as_str()))
            .join(file_stem(progress.course_id.as_str()));
        let version = self
            .bump_version("progress", &meta_id.to_string_lossy())
            .await?;
        debug!(
            user = %progress.user_id,
            course = %progress.course_id,
            version,
            "saved progress"
        );
        Ok(())
    }

    async fn load_progress(
        &self,
        user: &UserId,
        course: &CourseId,
    ) -> Result<Option<UserCourseProgress>> {
        let path = self.progress_path(user, course);
        let progress: Option<UserCourseProgress> = read_json(&path).await?;
        if let Some(progress) = &progress {
            ensure_key(&path, user.as_str(), progress.user_id.as_str())?;
            ensure_key(&path, course.as_str(), progress.course_id.as_str())?;
        }
        Ok(progress)
    }

    async fn list_progress(&self, user: &UserId) -> Result<Vec<UserCourseProgress>> {
        let dir = self.user_dir(user);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for (path, progress) in read_records::<UserCourseProgress>(&dir).await? {
            if let Some(progress) = progress? {
                ensure_key(&path, user.as_str(), progress.user_id.as_str())?;
                records.push(progress);
            }
        }
        records.sort_by(|a, b| a.course_id.cmp(&b.course_id));
        Ok(records)
    }
}

/// Map an id to a file name. Bytes outside `[A-Za-z0-9_-]` are written as
/// `%XX`, so distinct ids never share a file.
fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Reject a record stored under a key other than the one it claims.
fn ensure_key(path: &Path, expected: &str, found: &str) -> Result<()> {
    if expected == found {
        return Ok(());
    }
    warn!(path = %path.display(), expected, found, "record key mismatch");
    Err(StorageError::Mismatch {
        path: path.display().to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read every `.json` record in `dir`, paired with its path. Callers decide
/// what a bad record means.
async fn read_records<T: serde::de::DeserializeOwned>(
    dir: &Path,
) -> Result<Vec<(PathBuf, Result<Option<T>>)>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let item = read_json(&path).await;
        items.push((path, item));
    }
    Ok(items)
}
