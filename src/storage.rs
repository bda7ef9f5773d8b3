use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use crate::cninfo::Announcement;

/// Output directory for downloaded reports
#[derive(Debug, Clone)]
pub struct Storage {
    output_dir: PathBuf,
}

impl Storage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Cannot create output directory: {}", output_dir.display()))?;
        Ok(Storage { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Local path the announcement's PDF is stored under
    pub fn path_for(&self, announcement: &Announcement) -> PathBuf {
        self.output_dir.join(file_name_for(announcement))
    }

    pub fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// `{code}_{name}_{title}_{id}.pdf`, reduced to alphanumerics and `._-`
pub fn file_name_for(announcement: &Announcement) -> String {
    let sec_name = announcement.sec_name.replace('*', "s").replace('/', "-");
    let title = announcement.announcement_title.replace(['/', '\\'], "-");

    let raw = format!(
        "{}_{}_{}_{}.pdf",
        announcement.sec_code, sec_name, title, announcement.announcement_id
    );
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}
