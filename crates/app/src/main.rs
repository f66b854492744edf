use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use spamscan_classify::{StubClassifier, TextClassifier};
use spamscan_core::Acquisition;
use spamscan_ocr::{OcrBackend, TextExtractor};

mod commands;
mod config;
mod picker;

use commands::App;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let project_dirs = directories::ProjectDirs::from("com", "anomalyco", "SpamScan")
        .expect("Failed to get app directory");

    let cfg = config::AppConfig::load(&project_dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|e| {
            tracing::warn!("config unusable, using defaults: {e}");
            config::AppConfig::default()
        });

    let intake_dir = cfg
        .intake_dir
        .clone()
        .unwrap_or_else(|| project_dirs.data_dir().join("intake"));
    std::fs::create_dir_all(&intake_dir).expect("Failed to create intake directory");

    let app = App::new(
        TextExtractor::new(build_recognizer(&cfg)),
        TextClassifier::new(Arc::new(StubClassifier)),
    );

    // ── Intake folder ─────────────────────────────────────────────────────────
    // The channel bridges the notify watcher thread and the async session:
    // dropping an image file into the intake dir acquires and extracts it.
    let (intake_tx, mut intake_rx) = mpsc::channel::<PathBuf>(16);

    let app_for_intake = app.clone();
    tokio::spawn(async move {
        while let Some(path) = intake_rx.recv().await {
            tracing::info!("intake: {}", path.display());
            let acquisition = match picker::pick_from_library(&path) {
                Ok(a) => a,
                Err(e) => {
                    tracing::warn!("intake file unreadable: {e}");
                    continue;
                }
            };
            if let Err(e) = commands::acquire(&app_for_intake, acquisition).await {
                tracing::warn!("intake acquisition rejected: {e}");
                continue;
            }
            if let Err(e) = commands::extract(&app_for_intake).await {
                tracing::warn!("intake extraction rejected: {e}");
            }
        }
    });

    // Must stay alive for the duration of the app.
    let _watcher = picker::spawn_intake_watcher(&intake_dir, intake_tx)
        .expect("Failed to start intake folder watcher");
    tracing::info!("Watching intake folder: {}", intake_dir.display());

    // ── Interactive driver ────────────────────────────────────────────────────
    print_help(&cfg);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "pick" => {
                let acquisition = if arg.is_empty() {
                    // Closing the dialog without choosing a file.
                    Ok(Acquisition::Cancelled)
                } else {
                    picker::pick_from_library(Path::new(arg))
                };
                match acquisition {
                    Ok(a) => run_and_print(commands::acquire(&app, a).await),
                    Err(e) => println!("error: {e}"),
                }
            }
            "camera" => {
                if !picker::camera_available(&cfg.camera) {
                    println!("camera is not available on this machine");
                    continue;
                }
                match picker::capture_from_camera(&cfg.camera) {
                    Ok(a) => run_and_print(commands::acquire(&app, a).await),
                    Err(e) => println!("error: {e}"),
                }
            }
            "extract" => {
                let app = app.clone();
                tokio::spawn(async move { run_and_print(commands::extract(&app).await) });
            }
            "classify" => {
                let app = app.clone();
                tokio::spawn(async move { run_and_print(commands::classify(&app).await) });
            }
            "status" => print_status(&commands::status(&app).await),
            "help" => print_help(&cfg),
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }
    }
}

#[cfg(feature = "tesseract")]
fn build_recognizer(cfg: &config::AppConfig) -> Arc<dyn OcrBackend> {
    Arc::new(spamscan_ocr::TesseractRecognizer::new(
        cfg.ocr.tessdata_path.clone(),
        &cfg.ocr.lang,
    ))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_cfg: &config::AppConfig) -> Arc<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature; recognition returns no text");
    Arc::new(spamscan_ocr::MockRecognizer::new(""))
}

fn run_and_print(result: Result<commands::StatusOutput, commands::CommandError>) {
    match result {
        Ok(status) => print_status(&status),
        Err(e) => println!("error: {e}"),
    }
}

fn print_status(status: &commands::StatusOutput) {
    match serde_json::to_string_pretty(status) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("error rendering status: {e}"),
    }
}

fn print_help(cfg: &config::AppConfig) {
    println!("commands:");
    println!("  pick <path>   select a photo or screenshot (no path: cancel the dialog)");
    if picker::camera_available(&cfg.camera) {
        println!("  camera        capture a photo");
    }
    println!("  extract       recognize text in the current image");
    println!("  classify      ask the classifier about the recognized text");
    println!("  status        show the session");
    println!("  quit          leave");
}
