//! Launch command implementation.

use crate::error::Result;
use crate::launcher;

/// Execute launch command; only returns on failure
pub(super) fn execute_launch(args: Vec<String>) -> Result<i32> {
    match launcher::run(args) {
        Ok(never) => match never {},
        Err(e) => Err(e),
    }
}
