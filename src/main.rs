// SPDX-License-Identifier: MPL-2.0
//! Headless front end: frames one photo under an overlay template and writes
//! the composited profile picture.

use profile_frame::app::{paths, CaptureOutcome, CaptureSession, SessionSettings};
use profile_frame::config;
use profile_frame::domain::Vector;
use profile_frame::error::{AcquisitionError, Error, Result};
use profile_frame::media::{
    spawn_decode_source, spawn_load_overlay, suggested_file_name, ExportFormat, SourceKind,
};
use profile_frame::ui::state::{ControlAction, SizePreset};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
profile-frame: compose a circular profile picture

USAGE:
  profile-frame [OPTIONS] SOURCE

OPTIONS:
  --overlay PATH       Overlay template (PNG, JPEG, WebP or SVG)
  --preset NAME        Size preset: small, medium or large
  --scale S            Absolute zoom, clamped to 0.5..3.0
  --rotate DEG         Clockwise rotation in degrees
  --pan X,Y            Pan in preview units
  --mirror             Treat SOURCE as a mirrored camera frame
  --format FMT         png, jpeg or webp
  --output PATH        Output file (default: profile-<millis>.<ext>)
  --preview PATH       Also write the on-screen preview frame as PNG
  --config-dir DIR     Directory holding settings.toml
  --camera INDEX       Grab SOURCE from a camera (requires the camera feature)
  -v, --verbose        Debug logging
  -h, --help           Print this help
";

#[derive(Debug)]
struct Args {
    source: Option<PathBuf>,
    overlay: Option<PathBuf>,
    preset: Option<SizePreset>,
    scale: Option<f32>,
    rotate: Option<f32>,
    pan: Option<Vector>,
    mirror: bool,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    preview: Option<PathBuf>,
    config_dir: Option<String>,
    camera: Option<u32>,
    verbose: bool,
}

fn parse_pan(value: &str) -> std::result::Result<Vector, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad pan x: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad pan y: {e}"))?;
    Ok(Vector::new(x, y))
}

fn parse_format(value: &str) -> std::result::Result<ExportFormat, String> {
    ExportFormat::from_extension(value).ok_or_else(|| format!("unknown format '{value}'"))
}

fn parse_args(mut args: pico_args::Arguments) -> Result<Option<Args>> {
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let parsed = Args {
        verbose: args.contains(["-v", "--verbose"]),
        mirror: args.contains("--mirror"),
        overlay: args.opt_value_from_str("--overlay")?,
        preset: args.opt_value_from_str("--preset")?,
        scale: args.opt_value_from_str("--scale")?,
        rotate: args.opt_value_from_str("--rotate")?,
        pan: args.opt_value_from_fn("--pan", parse_pan)?,
        format: args.opt_value_from_fn("--format", parse_format)?,
        output: args.opt_value_from_str("--output")?,
        preview: args.opt_value_from_str("--preview")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        camera: args.opt_value_from_str("--camera")?,
        source: None,
    };

    let mut free: Vec<OsString> = args.finish();
    if free.len() > 1 {
        return Err(Error::Usage(format!(
            "unexpected arguments: {:?}",
            &free[1..]
        )));
    }
    let source = free.pop().map(PathBuf::from);
    if source.is_none() && parsed.camera.is_none() {
        return Err(Error::Usage("missing SOURCE (see --help)".into()));
    }

    Ok(Some(Args { source, ..parsed }))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "camera")]
fn attach_camera(session: &mut CaptureSession, index: u32) -> Result<()> {
    use profile_frame::media::CameraGrabber;

    const REQUESTED_WIDTH: u32 = 1280;
    const REQUESTED_HEIGHT: u32 = 720;

    let mirrored = session.settings().mirror_camera;
    let grabber = CameraGrabber::open(index, REQUESTED_WIDTH, REQUESTED_HEIGHT, mirrored)?;
    session.attach_camera(Box::new(grabber));
    session.grab_camera_frame()
}

#[cfg(not(feature = "camera"))]
fn attach_camera(_session: &mut CaptureSession, _index: u32) -> Result<()> {
    Err(Error::Usage(
        "this build has no camera support (enable the `camera` feature)".into(),
    ))
}

async fn run(args: Args) -> Result<()> {
    paths::init_cli_overrides(args.config_dir.clone());
    let (config, warning) = config::load();
    if let Some(key) = warning {
        tracing::warn!(key = %key, "using default settings");
    }

    let overlay_path = args
        .overlay
        .clone()
        .or_else(|| config.capture.overlay_path.clone())
        .ok_or_else(|| Error::Usage("no overlay template (use --overlay)".into()))?;

    let mut session = CaptureSession::new(
        SessionSettings::from(&config),
        spawn_load_overlay(overlay_path),
    );

    if let Some(index) = args.camera {
        attach_camera(&mut session, index)?;
    } else if let Some(path) = &args.source {
        let bytes = std::fs::read(path).map_err(|e| {
            AcquisitionError::UnreadableFile(format!("{}: {e}", path.display()))
        })?;
        let kind = if args.mirror {
            SourceKind::Camera { mirrored: true }
        } else {
            SourceKind::File
        };
        session.begin_source_load(spawn_decode_source(bytes, kind));
    }
    session.settle().await?;

    let actions = [
        args.preset.map(ControlAction::Preset),
        args.scale.map(ControlAction::ScaleTo),
        args.rotate.map(ControlAction::RotateBy),
        args.pan.map(ControlAction::PanBy),
    ];
    for action in actions.into_iter().flatten() {
        session.apply_control(action);
    }
    tracing::debug!(transform = ?session.transform(), "framing applied");

    if let Some(path) = &args.preview {
        if let Some(frame) = session.render_preview()? {
            frame
                .save(path)
                .map_err(|e| Error::Encode(format!("Failed to save preview: {e}")))?;
            tracing::info!(path = %path.display(), "preview written");
        }
    }

    match session.capture()? {
        CaptureOutcome::Captured => {}
        CaptureOutcome::NotReady(reason) => {
            return Err(Error::Usage(format!("cannot capture: {reason:?}")));
        }
    }

    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or_else(|| config.export_format());
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(suggested_file_name(format)));

    if let Some(result) = session.result() {
        result.save_to_file(&output, Some(format))?;
        tracing::info!(path = %output.display(), ?format, "result written");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args(pico_args::Arguments::from_env()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}\n\n{HELP}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "profile-frame failed");
            ExitCode::FAILURE
        }
    }
}
