use icontrace::TraceResult;

use crate::cli::TraceCommand;

use super::utils::{build_tracer, hex_color};

/// The main function to run the trace command.
pub fn run(cmd: TraceCommand) -> TraceResult<()> {
    let tracer = build_tracer(&cmd.trace_options)?;
    let graphic = tracer.trace_file(&cmd.input)?;

    println!("viewport {} {}", graphic.width(), graphic.height());
    for path in graphic.paths() {
        println!(
            "fill={} fill-opacity={:.3} stroke={} stroke-opacity={:.3} stroke-width={} d=\"{}\"",
            hex_color(path.fill()),
            path.fill_alpha(),
            hex_color(path.stroke()),
            path.stroke_alpha(),
            path.stroke_width(),
            path.path_data()
        );
    }
    if graphic.is_empty() {
        eprintln!(
            "Warning: no regions survived --path-omit {}; the graphic is empty.",
            cmd.trace_options.path_omit
        );
    }

    Ok(())
}
