use parkcore::detection::{DetectionDetails, DetectionResult};
use serde::Deserialize;

/// Address of the analysis backend (the simulator in local runs).
pub const BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub detection: DetectionResult,
    #[serde(default)]
    pub details: Option<DetectionDetails>,
}

#[derive(Debug, Clone, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    detections: Vec<DetectionResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Reads the backend's `{error}` body, falling back to the status line.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string())
}

pub async fn upload_image(filename: String, bytes: Vec<u8>) -> Result<UploadResponse, String> {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
    let form = reqwest::multipart::Form::new().part("image", part);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{BASE_URL}/api/upload"))
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| e.to_string())
    } else {
        Err(error_message(response).await)
    }
}

pub async fn fetch_history() -> Result<Vec<DetectionResult>, String> {
    let response = reqwest::get(format!("{BASE_URL}/api/history"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<HistoryResponse>()
        .await
        .map(|body| body.detections)
        .map_err(|e| e.to_string())
}

pub async fn delete_detection(id: i64) -> Result<i64, String> {
    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{BASE_URL}/api/detection/{id}"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(id)
    } else {
        Err(error_message(response).await)
    }
}

/// Fetches raw image bytes for a backend-relative path such as
/// `/static/uploads/ab12_original.jpg`.
pub async fn fetch_image_bytes(path: String) -> Result<Vec<u8>, String> {
    let response = reqwest::get(format!("{BASE_URL}{path}"))
        .await
        .map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(response.status().to_string());
    }
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| e.to_string())
}
