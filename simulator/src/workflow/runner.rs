use crate::generator::scene::{self, SceneConfig};
use crate::workflow::config::{extension_of, ServiceConfig};
use anyhow::Context;
use parkcore::detection::{DetectionDetails, DetectionResult};
use parkcore::render::{codec, BoxAnnotator};
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub detection: DetectionResult,
}

/// Input errors are the caller's fault and map to HTTP 400; everything
/// else is an internal failure.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    Input(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Executes one synthetic analysis: decode the upload, invent a detection
/// scene, draw the annotated result, and persist both images so the
/// dashboard can fetch them back over `/static/`.
#[derive(Clone)]
pub struct Runner {
    config: ServiceConfig,
    scene: SceneConfig,
}

impl Runner {
    pub fn new(config: ServiceConfig, scene: SceneConfig) -> Self {
        Self { config, scene }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        if !self.config.is_allowed_filename(original_filename) {
            return Err(AnalyzeError::Input(
                "unsupported file type (PNG, JPG, JPEG, WEBP only)".into(),
            ));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(AnalyzeError::Input(format!(
                "upload exceeds {} byte limit",
                self.config.max_upload_bytes
            )));
        }

        let source = codec::decode_bytes(bytes)
            .map_err(|err| AnalyzeError::Input(format!("decoding upload: {err}")))?;
        let (width, height) = (source.width(), source.height());

        // Scene seed mixes in the image dimensions so distinct uploads get
        // distinct but replayable layouts.
        let mut scene_config = self.scene.clone();
        scene_config.seed ^= ((width as u64) << 32) | height as u64;
        let objects = scene::place_objects(width, height, &scene_config);

        let annotated = BoxAnnotator::new().annotate(&source, &objects);

        let tag = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let ext = extension_of(original_filename).unwrap_or_else(|| "png".into());
        let upload_name = format!("{tag}_original.{ext}");
        let result_name = format!("{tag}_result.png");

        fs::write(self.config.upload_dir.join(&upload_name), bytes)
            .with_context(|| format!("storing upload {upload_name}"))?;
        let result_bytes = codec::encode_png(&annotated)
            .map_err(|err| anyhow::anyhow!("encoding result image: {err}"))?;
        fs::write(self.config.result_dir.join(&result_name), result_bytes)
            .with_context(|| format!("storing result {result_name}"))?;

        let details = DetectionDetails::from_objects(objects);
        let detection = DetectionResult {
            id: 0, // assigned by the history store
            original_filename: original_filename.to_string(),
            car_count: details.breakdown.vehicle_total(),
            detected_at: chrono::Utc::now().to_rfc3339(),
            upload_path: format!("/static/uploads/{upload_name}"),
            result_path: format!("/static/results/{result_name}"),
            details: Some(details),
        };

        Ok(AnalysisOutcome { detection })
    }

    /// Best-effort removal of the stored image pair for a deleted record.
    pub fn remove_stored_files(&self, detection: &DetectionResult) {
        for path in [
            self.stored_path(&detection.upload_path, &self.config.upload_dir),
            self.stored_path(&detection.result_path, &self.config.result_dir),
        ]
        .into_iter()
        .flatten()
        {
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("could not remove {}: {}", path.display(), err);
            }
        }
    }

    fn stored_path(&self, public_path: &str, dir: &PathBuf) -> Option<PathBuf> {
        public_path
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(|name| dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::Path;
    use tempfile::TempDir;

    fn test_runner(dir: &TempDir) -> Runner {
        let mut config = ServiceConfig::from_args(0, dir.path(), 5);
        config.max_upload_bytes = 1024 * 1024;
        config.ensure_dirs().unwrap();
        let scene = SceneConfig {
            vehicles: 4,
            pedestrians: 1,
            seed: 5,
            ..Default::default()
        };
        Runner::new(config, scene)
    }

    fn sample_png() -> Vec<u8> {
        let image = RgbaImage::from_pixel(64, 48, Rgba([30, 30, 30, 255]));
        codec::encode_png(&image).unwrap()
    }

    #[test]
    fn analyze_produces_complete_detection_with_details() {
        let dir = TempDir::new().unwrap();
        let runner = test_runner(&dir);

        let outcome = runner.analyze("lot.png", &sample_png()).unwrap();
        let detection = outcome.detection;

        let details = detection.details.as_ref().unwrap();
        assert_eq!(details.objects.len(), 5);
        assert_eq!(detection.car_count, details.breakdown.vehicle_total());
        assert!(detection.upload_path.starts_with("/static/uploads/"));
        assert!(detection.result_path.ends_with("_result.png"));

        // Both image files must exist on disk.
        let upload_name = detection.upload_path.rsplit('/').next().unwrap();
        let result_name = detection.result_path.rsplit('/').next().unwrap();
        assert!(dir.path().join("uploads").join(upload_name).exists());
        assert!(dir.path().join("results").join(result_name).exists());
    }

    #[test]
    fn analyze_rejects_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let runner = test_runner(&dir);
        let err = runner.analyze("scan.gif", &sample_png()).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[test]
    fn analyze_rejects_oversized_upload() {
        let dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::from_args(0, dir.path(), 1);
        config.max_upload_bytes = 16;
        config.ensure_dirs().unwrap();
        let runner = Runner::new(config, SceneConfig::default());
        let err = runner.analyze("lot.png", &sample_png()).unwrap_err();
        assert!(err.to_string().contains("byte limit"));
    }

    #[test]
    fn analyze_rejects_undecodable_bytes() {
        let dir = TempDir::new().unwrap();
        let runner = test_runner(&dir);
        assert!(runner.analyze("lot.png", &[0, 1, 2, 3]).is_err());
    }

    #[test]
    fn remove_stored_files_deletes_image_pair() {
        let dir = TempDir::new().unwrap();
        let runner = test_runner(&dir);
        let detection = runner.analyze("lot.png", &sample_png()).unwrap().detection;

        let upload_name = detection.upload_path.rsplit('/').next().unwrap().to_string();
        runner.remove_stored_files(&detection);
        assert!(!Path::new(dir.path()).join("uploads").join(upload_name).exists());
    }
}
