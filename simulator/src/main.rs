use anyhow::Context;
use api::bridge::ApiBridge;
use api::store::HistoryStore;
use clap::Parser;
use generator::scene::{self, SceneConfig};
use parkcore::render::codec;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ServiceConfig;
use workflow::runner::Runner;

mod api;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic analysis backend for the drone parking monitor")]
struct Args {
    /// Run a single offline analysis over a generated lot image
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a service config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 5000)]
    port: u16,
    /// Directory for stored upload/result images
    #[arg(long, default_value = "static")]
    data_dir: PathBuf,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Synthetic vehicles per scene
    #[arg(long, default_value_t = 12)]
    vehicles: usize,
    /// Keep the API bridge alive for dashboard requests
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let service_config = if let Some(path) = args.config {
        ServiceConfig::load(path)?
    } else {
        ServiceConfig::from_args(args.port, &args.data_dir, args.seed)
    };
    service_config.ensure_dirs()?;

    let scene_config = SceneConfig {
        vehicles: args.vehicles,
        seed: service_config.seed,
        ..Default::default()
    };

    let runner = Runner::new(service_config.clone(), scene_config);
    let store = HistoryStore::new();
    let bridge = ApiBridge::new(Arc::new(runner.clone()), store.clone());

    if args.offline {
        let lot = scene::build_lot_image(960, 540);
        let bytes =
            codec::encode_png(&lot).map_err(|err| anyhow::anyhow!("encoding lot image: {err}"))?;
        let outcome = runner
            .analyze("offline_lot.png", &bytes)
            .context("running offline analysis")?;
        let stored = store.insert(outcome.detection);

        let object_count = stored
            .details
            .as_ref()
            .map(|details| details.objects.len())
            .unwrap_or(0);
        println!(
            "Offline run -> vehicles {}, objects {}, result {}",
            stored.car_count, object_count, stored.result_path
        );
        bridge.publish_status("Offline analysis stored.");

        let report = format!(
            "id={} vehicles={} objects={} result={}\n",
            stored.id, stored.car_count, object_count, stored.result_path
        );
        let report_path = PathBuf::from("tools/data/offline_analysis.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        bridge.publish_status("API bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
