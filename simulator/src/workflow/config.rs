use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_port: u16,
    pub upload_dir: PathBuf,
    pub result_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub seed: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_port: 5000,
            upload_dir: PathBuf::from("static/uploads"),
            result_dir: PathBuf::from("static/results"),
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: ["png", "jpg", "jpeg", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            seed: 0,
        }
    }
}

impl ServiceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading service config {}", path_ref.display()))?;
        let config: ServiceConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing service config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(bind_port: u16, data_dir: &Path, seed: u64) -> Self {
        Self {
            bind_port,
            upload_dir: data_dir.join("uploads"),
            result_dir: data_dir.join("results"),
            seed,
            ..Default::default()
        }
    }

    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.upload_dir)
            .with_context(|| format!("creating upload dir {}", self.upload_dir.display()))?;
        fs::create_dir_all(&self.result_dir)
            .with_context(|| format!("creating result dir {}", self.result_dir.display()))?;
        Ok(())
    }

    /// Checks the upload filename against the allowed extension list.
    pub fn is_allowed_filename(&self, filename: &str) -> bool {
        extension_of(filename)
            .map(|ext| self.allowed_extensions.iter().any(|allowed| *allowed == ext))
            .unwrap_or(false)
    }
}

pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_places_dirs_under_data_dir() {
        let cfg = ServiceConfig::from_args(8080, Path::new("data"), 7);
        assert_eq!(cfg.bind_port, 8080);
        assert_eq!(cfg.upload_dir, PathBuf::from("data/uploads"));
        assert_eq!(cfg.result_dir, PathBuf::from("data/results"));
        assert_eq!(cfg.seed, 7);
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"bind_port: 9100\nseed: 3\n").unwrap();
        let path = temp.into_temp_path();
        let cfg = ServiceConfig::load(&path).unwrap();
        assert_eq!(cfg.bind_port, 9100);
        assert_eq!(cfg.seed, 3);
        assert_eq!(cfg.max_upload_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn filename_filter_is_case_insensitive_and_rejects_bare_names() {
        let cfg = ServiceConfig::default();
        assert!(cfg.is_allowed_filename("lot.JPG"));
        assert!(cfg.is_allowed_filename("scan.png"));
        assert!(!cfg.is_allowed_filename("notes.txt"));
        assert!(!cfg.is_allowed_filename("noextension"));
        assert!(!cfg.is_allowed_filename("trailingdot."));
    }
}
