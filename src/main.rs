//! Vet DX - Main Entry Point
//!
//! Loads both artifacts, then answers one JSON prediction request per stdin
//! line with one JSON response per stdout line.
//!
//! `vet-dx layout` prints the feature layout the artifacts must be fitted on.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use vet_dx_core::api;
use vet_dx_core::constants::{APP_NAME, APP_VERSION};
use vet_dx_core::logic::config::AppConfig;
use vet_dx_core::logic::model::LoadedArtifacts;
use vet_dx_core::logic::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if std::env::args().nth(1).as_deref() == Some("layout") {
        println!("{}", serde_json::to_string_pretty(&api::get_feature_layout())?);
        return Ok(());
    }

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = AppConfig::from_env();
    log::info!("Artifact directory: {}", config.artifact_dir.display());

    // No artifacts, no service
    let artifacts = LoadedArtifacts::load(&config).with_context(|| {
        format!("failed to load artifacts from {}", config.artifact_dir.display())
    })?;
    log::info!(
        "Artifacts loaded (layout v{}, hash {:08x})",
        artifacts.metadata.feature_version,
        artifacts.metadata.layout_hash
    );

    let pipeline = Pipeline::from_artifacts(artifacts);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(serve_stdin(pipeline.clone()))?;

    let status = api::get_engine_status(&pipeline);
    log::info!(
        "Shutting down: {} prediction(s), {} rejected, {} artifact failure(s), avg {:.3} ms",
        status.predictions,
        status.missing_field_rejections,
        status.scaling_failures + status.inference_failures,
        status.avg_latency_ms
    );

    Ok(())
}

/// Request loop: a bad line never stops the loop
async fn serve_stdin(pipeline: Pipeline) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match api::predict_async(pipeline.clone(), line).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Request task failed: {}", e);
                continue;
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}
