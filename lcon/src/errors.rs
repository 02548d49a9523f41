use lcon_types::ConsoleError;
use tracing::debug;

/// Print a top-level error without the anyhow chain noise.
///
/// Console errors carry their own message; anything else is shown with its
/// context chain on one line.
pub fn display_user_error(err: &anyhow::Error) {
    match err.downcast_ref::<ConsoleError>() {
        Some(console_err) if console_err.is_silent() => {
            debug!("suppressed: {}", console_err);
        }
        Some(console_err) => eprintln!("lcon: {console_err}"),
        None => eprintln!("lcon: {err:#}"),
    }
}
