// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zory_camera::backends::camera::FacingMode;
use zory_camera::config::{InsetPosition, InsetShape};

mod cli;

#[derive(Parser)]
#[command(name = "zory-camera")]
#[command(about = "Composite square photos from camera streams or uploaded images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Still images standing in for the device's cameras
#[derive(Args)]
struct DeviceArgs {
    /// Image shown by the environment-facing (back) camera
    #[arg(long)]
    back: Option<PathBuf>,

    /// Image shown by the user-facing (front) camera
    #[arg(long)]
    front: Option<PathBuf>,

    /// Report a mobile user agent
    #[arg(long)]
    mobile: bool,

    /// Run as if embedded in a host with this platform type (e.g. web, mobile)
    #[arg(long)]
    host_platform: Option<String>,

    /// Host has already granted camera access
    #[arg(long)]
    host_granted: bool,

    /// Host denies the camera permission prompt
    #[arg(long)]
    host_deny: bool,
}

impl From<DeviceArgs> for cli::DeviceOptions {
    fn from(args: DeviceArgs) -> Self {
        Self {
            back: args.back,
            front: args.front,
            mobile: args.mobile,
            host_platform: args.host_platform,
            host_granted: args.host_granted,
            host_deny: args.host_deny,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the cameras of the simulated device
    Devices {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Take a composited photo
    Photo {
        #[command(flatten)]
        device: DeviceArgs,

        /// Settings JSON file (camelCase keys, as stored)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Main camera
        #[arg(long, value_enum)]
        main_camera: Option<CameraChoice>,

        /// Leave the picture-in-picture inset out
        #[arg(long)]
        hide_inset: bool,

        /// Inset corner
        #[arg(long, value_enum)]
        position: Option<PositionChoice>,

        /// Inset shape
        #[arg(long, value_enum)]
        shape: Option<ShapeChoice>,

        /// Output file path (default: ~/Pictures/zory/zory_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the photo as a data URI instead of saving it
        #[arg(long)]
        data_uri: bool,
    },

    /// Position an image file and capture it
    Upload {
        /// Image file to upload
        image: PathBuf,

        /// Left edge in preview pixels (480 wide)
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,

        /// Top edge in preview pixels (480 high)
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,

        /// Scale from image pixels to preview pixels (0.1 - 3.0)
        #[arg(long)]
        scale: Option<f64>,

        /// Drag by DX,DY preview pixels
        #[arg(long, value_parser = parse_offset, allow_negative_numbers = true)]
        drag: Option<(f64, f64)>,

        /// Wheel steps; positive zooms in, negative zooms out
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        zoom: i32,

        /// Output file path (default: ~/Pictures/zory/zory_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the photo as a data URI instead of saving it
        #[arg(long)]
        data_uri: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CameraChoice {
    User,
    Environment,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PositionChoice {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeChoice {
    Round,
    Rounded,
    Square,
}

impl From<CameraChoice> for FacingMode {
    fn from(choice: CameraChoice) -> Self {
        match choice {
            CameraChoice::User => FacingMode::User,
            CameraChoice::Environment => FacingMode::Environment,
        }
    }
}

impl From<PositionChoice> for InsetPosition {
    fn from(choice: PositionChoice) -> Self {
        match choice {
            PositionChoice::TopLeft => InsetPosition::TopLeft,
            PositionChoice::TopRight => InsetPosition::TopRight,
            PositionChoice::BottomLeft => InsetPosition::BottomLeft,
            PositionChoice::BottomRight => InsetPosition::BottomRight,
        }
    }
}

impl From<ShapeChoice> for InsetShape {
    fn from(choice: ShapeChoice) -> Self {
        match choice {
            ShapeChoice::Round => InsetShape::Round,
            ShapeChoice::Rounded => InsetShape::Rounded,
            ShapeChoice::Square => InsetShape::Square,
        }
    }
}

fn parse_offset(raw: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = raw
        .split_once(',')
        .ok_or_else(|| format!("Expected DX,DY, got {}", raw))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("Invalid offset {}: {}", v, e))
    };
    Ok((parse(dx)?, parse(dy)?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=zory_camera=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Devices { device } => cli::list_devices(device.into()),
        Commands::Photo {
            device,
            settings,
            main_camera,
            hide_inset,
            position,
            shape,
            output,
            data_uri,
        } => cli::take_photo(
            device.into(),
            cli::SettingsOptions {
                settings_file: settings,
                main_camera: main_camera.map(Into::into),
                hide_inset,
                position: position.map(Into::into),
                shape: shape.map(Into::into),
            },
            output,
            data_uri,
        ),
        Commands::Upload {
            image,
            x,
            y,
            scale,
            drag,
            zoom,
            output,
            data_uri,
        } => cli::upload_photo(
            image,
            cli::PlacementOptions {
                x,
                y,
                scale,
                drag,
                zoom_steps: zoom,
            },
            output,
            data_uri,
        ),
    };
    result?;
    Ok(())
}
