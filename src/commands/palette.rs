use icontrace::{PixelBuffer, TraceResult};

use crate::cli::PaletteCommand;

use super::utils::{build_tracer, hex_color_alpha};

/// The main function to run the palette command.
pub fn run(cmd: PaletteCommand) -> TraceResult<()> {
    let tracer = build_tracer(&cmd.trace_options)?;
    let pixels = PixelBuffer::open(&cmd.input)?;
    let (palette, indexed) = tracer.quantize(&pixels);
    let counts = indexed.counts();

    for (index, color) in palette.colors().iter().enumerate() {
        let count = counts.get(index).copied().unwrap_or(0);
        println!("{index:>3} {} {count}", hex_color_alpha(*color));
    }

    Ok(())
}
