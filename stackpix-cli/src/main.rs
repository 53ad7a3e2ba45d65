//! stackpix CLI - Command-line interface for TIFF stacks.
//!
//! Inspects multi-page TIFF files and concatenates them into HDF5 datasets.
#![allow(clippy::uninlined_format_args, clippy::needless_pass_by_value)]

use clap::{Parser, Subcommand};
use log::info;
use serde_json::json;
use stackpix_core::AxisOrder;
use stackpix_io::{
    concatenate_tiffs, expand_paths, inspect_tiff_transformed, ConcatOptions, Hdf5Location,
};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    StackpixIo(#[from] stackpix_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] stackpix_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Multi-page TIFF inspection and HDF5 conversion.
#[derive(Parser, Debug)]
#[command(name = "stackpix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log progress at info level (`RUST_LOG` takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the shape and dtype of TIFF files
    Inspect {
        /// Input TIFF file(s) or glob patterns
        #[arg(required = true)]
        input: Vec<String>,

        /// Axis order to report the shape in
        #[arg(long, default_value = "zyxtc")]
        axis_order: AxisOrder,

        /// Consecutive pages folded into channels
        #[arg(long, default_value = "1")]
        pages_to_channel: usize,

        /// Print one JSON object per file
        #[arg(long)]
        json: bool,
    },

    /// Concatenate TIFF files into one HDF5 dataset
    Convert {
        /// Input TIFF file(s) or glob patterns
        #[arg(required = true)]
        input: Vec<String>,

        /// Destination as `file.h5/group/dataset`
        #[arg(short, long, value_parser = parse_location)]
        output: Hdf5Location,

        /// Axis of `(t, y, x)` to concatenate along
        #[arg(long, default_value = "0")]
        axis: usize,

        /// Channel kept from every file
        #[arg(long, default_value = "0")]
        channel: usize,

        /// Z-slice kept from every file
        #[arg(long, default_value = "0")]
        z_index: usize,

        /// Consecutive pages folded into channels
        #[arg(long, default_value = "1")]
        pages_to_channel: usize,
    },
}

fn parse_location(value: &str) -> std::result::Result<Hdf5Location, String> {
    value
        .parse()
        .map_err(|e: stackpix_io::Error| e.to_string())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn inspect(
    input: Vec<String>,
    axis_order: AxisOrder,
    pages_to_channel: usize,
    json: bool,
) -> Result<()> {
    for path in expand_paths(&input)? {
        let info = inspect_tiff_transformed(&path, &axis_order, pages_to_channel)?;
        if json {
            let line = json!({
                "path": path,
                "axis_order": axis_order,
                "shape": info.shape,
                "dtype": info.dtype,
            });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!(
                "{}: shape {:?} ({}), dtype {}",
                path.display(),
                info.shape,
                axis_order,
                info.dtype
            );
        }
    }
    Ok(())
}

fn convert(input: Vec<String>, output: Hdf5Location, options: ConcatOptions) -> Result<()> {
    info!("converting {} input(s) into {output}", input.len());
    let plan = concatenate_tiffs(&input, &output, &options)?;
    println!(
        "Wrote {} file(s) to {}: shape {:?}, dtype {}",
        plan.blocks, output, plan.shape, plan.dtype
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect {
            input,
            axis_order,
            pages_to_channel,
            json,
        } => inspect(input, axis_order, pages_to_channel, json),
        Commands::Convert {
            input,
            output,
            axis,
            channel,
            z_index,
            pages_to_channel,
        } => convert(
            input,
            output,
            ConcatOptions {
                axis,
                channel,
                z_index,
                pages_to_channel,
            },
        ),
    }
}
