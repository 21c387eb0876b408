use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use icontrace::TracingOptions;

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trace an image and print its vector paths
    Trace(TraceCommand),
    /// Print the quantized palette of an image with pixel counts
    Palette(PaletteCommand),
}

#[derive(Args, Debug)]
pub struct TraceCommand {
    /// Input image path
    pub input: PathBuf,
    #[command(flatten)]
    pub trace_options: TraceOptionsArgs,
}

#[derive(Args, Debug)]
pub struct PaletteCommand {
    /// Input image path
    pub input: PathBuf,
    #[command(flatten)]
    pub trace_options: TraceOptionsArgs,
}

#[derive(Args, Debug)]
pub struct TraceOptionsArgs {
    /// Maximum deviation of a straight segment (ltres)
    #[arg(long = "ltres", default_value_t = 1.0, allow_negative_numbers = true)]
    pub line_tolerance: f64,
    /// Maximum deviation of a quadratic segment (qtres)
    #[arg(long = "qtres", default_value_t = 1.0, allow_negative_numbers = true)]
    pub quad_tolerance: f64,
    /// Drop regions and holes smaller than this many pixels
    #[arg(long = "path-omit", default_value_t = 8)]
    pub path_omit: usize,
    /// Number of palette colors
    #[arg(short = 'c', long = "colors", env = "ICONTRACE_COLORS", default_value_t = 16)]
    pub palette_size: usize,
    /// Quantization refinement passes
    #[arg(long = "cycles", default_value_t = 3)]
    pub quantize_cycles: usize,
    /// Re-seed palette entries holding less than this share of the pixels
    #[arg(long = "min-color-ratio", default_value_t = 0.0)]
    pub min_color_ratio: f64,
    /// Seed for the random palette entries
    #[arg(long = "seed", default_value_t = 0)]
    pub palette_seed: u64,
    /// Output coordinate scale
    #[arg(long = "scale", default_value_t = 1.0)]
    pub scale: f64,
    /// Decimal places kept in output coordinates
    #[arg(long = "precision", default_value_t = 1)]
    pub precision: u32,
    /// Keep full coordinate precision
    #[arg(long = "no-precision")]
    pub no_precision: bool,
    /// Selective blur radius (0-5, 0 disables)
    #[arg(long = "blur-radius", default_value_t = 0)]
    pub blur_radius: u32,
    /// Selective blur edge threshold (0-1024)
    #[arg(long = "blur-delta", default_value_t = 20)]
    pub blur_delta: u32,
}

impl From<&TraceOptionsArgs> for TracingOptions {
    fn from(args: &TraceOptionsArgs) -> Self {
        let precision = if args.no_precision {
            None
        } else {
            Some(args.precision)
        };
        TracingOptions::default()
            .with_tolerances(args.line_tolerance, args.quad_tolerance)
            .with_path_omit(args.path_omit)
            .with_palette_size(args.palette_size)
            .with_quantize_cycles(args.quantize_cycles)
            .with_min_color_ratio(args.min_color_ratio)
            .with_palette_seed(args.palette_seed)
            .with_scale(args.scale)
            .with_precision(precision)
            .with_blur(args.blur_radius, args.blur_delta)
    }
}
