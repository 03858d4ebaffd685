use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PipexploreError, Result};
use crate::llvm::process::run_with_timeout;
use crate::llvm::scratch_path;

use super::experiment::{BasicProfile, Experiment, ExperimentFactory, Profile};

/// Built-in experiment: compile one source file with the candidate wrapper
/// and score the resulting object by size (smaller is fitter, always
/// admissible). Each instance works on its own scratch object file, so
/// instances are independent and the factory enables parallel evaluation.
pub struct SizeExperiment {
    source: PathBuf,
    tmp: PathBuf,
    timeout: Duration,
    object: Option<PathBuf>,
}

impl Experiment for SizeExperiment {
    fn compile(&mut self, compiler: &Path) -> Result<()> {
        let object = scratch_path(&self.tmp, "o");
        let mut cmd = Command::new(compiler);
        cmd.arg("-c")
            .arg(&self.source)
            .arg("-o")
            .arg(&object)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Every wrapper failure, including a timeout, rejects this candidate
        // rather than aborting the search.
        let status = match run_with_timeout(&mut cmd, self.timeout) {
            Ok(status) => status,
            Err(err) => {
                let _ = fs::remove_file(&object);
                return Err(PipexploreError::CannotCompile(err.to_string()));
            }
        };
        if !status.success() {
            let _ = fs::remove_file(&object);
            return Err(PipexploreError::CannotCompile(format!(
                "wrapper compiler exited with {}",
                status
            )));
        }

        self.object = Some(object);
        Ok(())
    }

    fn run(&mut self) -> Result<Arc<dyn Profile>> {
        let object = self.object.take().ok_or_else(|| {
            PipexploreError::Miscompilation("run invoked without a compiled object".to_string())
        })?;
        let measured = fs::metadata(&object).map(|meta| meta.len());
        let _ = fs::remove_file(&object);
        let size = measured.map_err(|err| {
            PipexploreError::Miscompilation(format!("compiled object unreadable: {}", err))
        })?;

        Ok(Arc::new(BasicProfile {
            fitness: -(size as f64),
            admissible: true,
        }))
    }
}

pub struct SizeExperimentFactory {
    source: PathBuf,
    tmp: PathBuf,
    timeout: Duration,
}

impl SizeExperimentFactory {
    pub fn new(source: PathBuf, tmp: PathBuf, timeout: Duration) -> Self {
        Self { source, tmp, timeout }
    }
}

impl ExperimentFactory for SizeExperimentFactory {
    fn experiment(&self, _pipeline: &str) -> Box<dyn Experiment> {
        Box::new(SizeExperiment {
            source: self.source.clone(),
            tmp: self.tmp.clone(),
            timeout: self.timeout,
            object: None,
        })
    }

    fn independent(&self) -> bool {
        true
    }
}
