use icontrace::TraceError;

pub fn report_error(err: &TraceError) {
    match err {
        TraceError::InvalidOption { name, .. } => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("Check the value passed for `{name}`:");
            eprintln!("  - tolerances must be finite and >= 0");
            eprintln!("  - --colors must be at least 1");
            eprintln!("  - --blur-radius accepts 0-5 and --blur-delta 0-1024");
            eprintln!("  - --precision accepts 0-15");
        }
        _ => {
            eprintln!("{err}");
        }
    }
}
