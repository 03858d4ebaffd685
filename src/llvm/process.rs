use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

use crate::error::{PipexploreError, Result};

/// Run a configured command to completion, killing it once `timeout`
/// elapses. A timed-out or unspawnable command surfaces as
/// `PipexploreError::ToolFailure`; callers inside an evaluation step remap
/// that to the non-fatal rejection variants.
pub(crate) fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<ExitStatus> {
    let mut child = command.spawn().map_err(|err| {
        PipexploreError::ToolFailure(format!("failed to spawn {:?}: {}", command.get_program(), err))
    })?;

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PipexploreError::ToolFailure(format!(
                "{:?} timed out after {:?}",
                command.get_program(),
                timeout
            )));
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
