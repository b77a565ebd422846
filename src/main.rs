use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use landmark_extract::batch::BatchRunner;
use landmark_extract::config::Config;
use landmark_extract::detector::OnnxModelLoader;
use landmark_extract::pipeline::OpenCvOpener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("landmark_extract=debug".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::info!(
        input = %config.batch.input_dir.display(),
        output = %config.batch.output_dir.display(),
        mode = ?config.batch.mode,
        "loaded config"
    );

    let loader = Arc::new(OnnxModelLoader::new(config.models.clone()));
    let runner = BatchRunner::new(config.batch, loader, Arc::new(OpenCvOpener));

    let handle = tokio::task::spawn_blocking(move || {
        let result = runner.run();
        (result, runner.output_dir().to_path_buf())
    });

    tokio::select! {
        joined = handle => {
            let (result, output_dir) = joined?;
            let report = result?;
            for failure in &report.failed {
                tracing::warn!(video = %failure.video.display(), reason = %failure.reason, "video skipped");
            }
            tracing::info!(
                output = %output_dir.display(),
                written = report.written.len(),
                failed = report.failed.len(),
                "done"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            // The runtime would otherwise wait on the blocking batch thread.
            tracing::info!("shutdown signal received");
            std::process::exit(130);
        }
    }

    Ok(())
}
