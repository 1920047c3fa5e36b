use std::io::{self, Write};

/// Install the panic hook for the command-line binary.
///
/// Debug builds print a full backtrace through better-panic; release builds
/// write a crash report through human-panic.
pub fn initialize_panic_handler() {
    #[cfg(debug_assertions)]
    better_panic::Settings::debug()
        .most_recent_first(false)
        .lineno_suffix(true)
        .install();

    #[cfg(not(debug_assertions))]
    human_panic::setup_panic!();

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        log::error!("Panic: {panic_info}");
        previous_hook(panic_info);
        flush_output();
        std::process::exit(1);
    }));
}

/// Flush stdout and stderr so a partial summary is not lost on exit
pub fn flush_output() {
    let _ = io::stdout().flush();
    let _ = writeln!(io::stderr());
}
