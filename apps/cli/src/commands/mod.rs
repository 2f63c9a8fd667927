pub mod available;
pub mod clean;
pub mod clone;
pub mod config;
pub mod exec;
pub mod install;
pub mod off;
pub mod remove;
pub mod switch;

use strawbrew_core::Error;

/// Environment-store writes rejected for lack of privilege are reported but
/// never crash the command; everything else propagates.
pub fn tolerate_permission_denied<T>(
    result: strawbrew_core::Result<T>,
) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::PermissionDenied { message }) => {
            eprintln!("\n{message}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
