use icontrace::{TraceResult, Tracer, TracingOptions};
use image::{Rgb, Rgba};

use crate::cli::TraceOptionsArgs;

/// The convenience function to build a validated Tracer from the command line options.
pub fn build_tracer(args: &TraceOptionsArgs) -> TraceResult<Tracer> {
    let options: TracingOptions = args.into();
    Tracer::new(options)
}

/// Format a color as `#rrggbb`.
pub fn hex_color(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Format a palette entry as `#rrggbbaa`.
pub fn hex_color_alpha(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}
