use crate::api::store::HistoryStore;
use crate::workflow::runner::{AnalyzeError, Runner};
use bytes::Buf;
use futures_util::TryStreamExt;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, thread};
use tokio::runtime::Builder;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

/// Bridge that hosts the analysis HTTP contract consumed by the dashboard.
///
/// Routes run on a dedicated thread with a current-thread runtime so the
/// driver keeps its synchronous shape.
pub struct ApiBridge {
    store: HistoryStore,
}

impl ApiBridge {
    pub fn new(runner: Arc<Runner>, store: HistoryStore) -> Self {
        let bind = SocketAddr::from(([127, 0, 0, 1], runner.config().bind_port));
        let routes = build_routes(runner, store.clone());

        thread::spawn(move || {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(bind).await;
            });
        });

        Self { store }
    }

    pub fn publish_status(&self, message: &str) {
        println!("[API] {}", message);
    }

    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.store.len()
    }
}

fn build_routes(
    runner: Arc<Runner>,
    store: HistoryStore,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let max_upload = runner.config().max_upload_bytes as u64;
    let upload_dir = runner.config().upload_dir.clone();
    let result_dir = runner.config().result_dir.clone();

    let store_filter = warp::any().map(move || store.clone());
    let runner_filter = warp::any().map(move || runner.clone());

    let upload_route = warp::path!("api" / "upload")
        .and(warp::post())
        // Multipart framing overhead on top of the image payload.
        .and(warp::multipart::form().max_length(max_upload + 64 * 1024))
        .and(store_filter.clone())
        .and(runner_filter.clone())
        .and_then(handle_upload);

    let history_route = warp::path!("api" / "history")
        .and(warp::get())
        .and(store_filter.clone())
        .map(|store: HistoryStore| warp::reply::json(&json!({ "detections": store.list() })));

    let detail_route = warp::path!("api" / "detection" / i64)
        .and(warp::get())
        .and(store_filter.clone())
        .map(|id: i64, store: HistoryStore| match store.get(id) {
            Some(detection) => warp::reply::with_status(
                warp::reply::json(&json!({ "detection": detection })),
                StatusCode::OK,
            ),
            None => error_reply(StatusCode::NOT_FOUND, "detection not found"),
        });

    let model_route = warp::path!("api" / "model-info").and(warp::get()).map(|| {
        warp::reply::json(&json!({
            "name": "synthetic-scene",
            "version": env!("CARGO_PKG_VERSION"),
            "classes": ["car", "bus", "truck", "motorcycle", "person", "other"],
        }))
    });

    let delete_route = warp::path!("api" / "detection" / i64)
        .and(warp::delete())
        .and(store_filter)
        .and(runner_filter)
        .and_then(handle_delete);

    let upload_files = warp::path("static")
        .and(warp::path("uploads"))
        .and(warp::fs::dir(upload_dir));
    let result_files = warp::path("static")
        .and(warp::path("results"))
        .and(warp::fs::dir(result_dir));

    upload_route
        .or(history_route)
        .or(detail_route)
        .or(model_route)
        .or(delete_route)
        .or(upload_files)
        .or(result_files)
        .recover(recover_rejection)
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

/// Turns warp's internal rejections into the contract's `{error}` JSON
/// replies, keeping oversize bodies and unknown routes on-format.
async fn recover_rejection(rejection: Rejection) -> Result<impl Reply, Rejection> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "upload exceeds size limit")
    } else {
        (StatusCode::BAD_REQUEST, "invalid request")
    };
    Ok(error_reply(status, message))
}

async fn handle_upload(
    form: FormData,
    store: HistoryStore,
    runner: Arc<Runner>,
) -> Result<impl Reply, warp::Rejection> {
    let (filename, bytes) = match read_image_part(form).await {
        Ok(part) => part,
        Err(err) => return Ok(error_reply(StatusCode::BAD_REQUEST, &err.to_string())),
    };

    match runner.analyze(&filename, &bytes) {
        Ok(outcome) => {
            let stored = store.insert(outcome.detection);
            let details = stored.details.clone();
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "detection": stored, "details": details })),
                StatusCode::OK,
            ))
        }
        Err(AnalyzeError::Input(message)) => {
            log::warn!("upload rejected: {}", message);
            Ok(error_reply(StatusCode::BAD_REQUEST, &message))
        }
        Err(AnalyzeError::Internal(err)) => {
            log::error!("analysis failed: {:#}", err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis failed",
            ))
        }
    }
}

async fn handle_delete(
    id: i64,
    store: HistoryStore,
    runner: Arc<Runner>,
) -> Result<impl Reply, warp::Rejection> {
    match store.remove(id) {
        Some(detection) => {
            runner.remove_stored_files(&detection);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "success": true, "message": "detection deleted" })),
                StatusCode::OK,
            ))
        }
        None => Ok(error_reply(StatusCode::NOT_FOUND, "detection not found")),
    }
}

/// Pulls the `image` field out of the multipart body.
async fn read_image_part(form: FormData) -> anyhow::Result<(String, Vec<u8>)> {
    let parts: Vec<Part> = form
        .try_collect()
        .await
        .map_err(|err| anyhow::anyhow!("reading multipart body: {err}"))?;

    for part in parts {
        if part.name() != "image" {
            continue;
        }
        let filename = part
            .filename()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no file selected"))?;
        let bytes = part
            .stream()
            .try_fold(Vec::new(), |mut acc, mut buf| async move {
                while buf.has_remaining() {
                    let chunk = buf.chunk();
                    acc.extend_from_slice(chunk);
                    let advanced = chunk.len();
                    buf.advance(advanced);
                }
                Ok(acc)
            })
            .await
            .map_err(|err| anyhow::anyhow!("reading image part: {err}"))?;
        if bytes.is_empty() {
            anyhow::bail!("no file selected");
        }
        return Ok((filename, bytes));
    }

    anyhow::bail!("multipart field 'image' is required")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::scene::SceneConfig;
    use crate::workflow::config::ServiceConfig;
    use parkcore::detection::DetectionResult;
    use parkcore::render::codec;
    use tempfile::TempDir;

    fn test_runner(dir: &TempDir, max_upload_bytes: usize) -> Arc<Runner> {
        let mut config = ServiceConfig::from_args(0, dir.path(), 1);
        config.max_upload_bytes = max_upload_bytes;
        config.ensure_dirs().unwrap();
        Arc::new(Runner::new(config, SceneConfig::default()))
    }

    fn record(id_hint: &str) -> DetectionResult {
        DetectionResult {
            id: 0,
            original_filename: format!("{id_hint}.png"),
            car_count: 2,
            detected_at: "2025-11-02T10:15:00Z".into(),
            upload_path: format!("/static/uploads/{id_hint}.png"),
            result_path: format!("/static/results/{id_hint}.png"),
            details: None,
        }
    }

    #[test]
    fn bridge_serves_inserted_history() {
        let dir = TempDir::new().unwrap();
        // Port 0 lets the kernel pick a free port for the test server.
        let config = ServiceConfig::from_args(0, dir.path(), 1);
        config.ensure_dirs().unwrap();
        let runner = Arc::new(Runner::new(config, SceneConfig::default()));
        let store = HistoryStore::new();
        let bridge = ApiBridge::new(runner.clone(), store.clone());

        let image = image::RgbaImage::from_pixel(32, 32, image::Rgba([40, 40, 40, 255]));
        let bytes = codec::encode_png(&image).unwrap();
        let outcome = runner.analyze("lot.png", &bytes).unwrap();
        store.insert(outcome.detection);

        assert_eq!(bridge.history_len(), 1);
    }

    #[tokio::test]
    async fn oversized_upload_gets_json_error_reply() {
        let dir = TempDir::new().unwrap();
        let routes = build_routes(test_runner(&dir, 16), HistoryStore::new());

        let response = warp::test::request()
            .method("POST")
            .path("/api/upload")
            .header("content-type", "multipart/form-data; boundary=sep")
            .body(vec![0u8; 128 * 1024])
            .reply(&routes)
            .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn detail_route_returns_record_or_json_not_found() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new();
        let stored = store.insert(record("ab12"));
        let routes = build_routes(test_runner(&dir, 1024), store);

        let found = warp::test::request()
            .path(&format!("/api/detection/{}", stored.id))
            .reply(&routes)
            .await;
        assert_eq!(found.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(found.body()).unwrap();
        assert_eq!(body["detection"]["id"], stored.id);

        let missing = warp::test::request()
            .path("/api/detection/999")
            .reply(&routes)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(missing.body()).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn model_info_route_describes_the_backend() {
        let dir = TempDir::new().unwrap();
        let routes = build_routes(test_runner(&dir, 1024), HistoryStore::new());

        let response = warp::test::request().path("/api/model-info").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["classes"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn unknown_route_rejections_stay_on_the_json_format() {
        let dir = TempDir::new().unwrap();
        let routes = build_routes(test_runner(&dir, 1024), HistoryStore::new());

        let response = warp::test::request().path("/api/nothing").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert!(body["error"].is_string());
    }
}
