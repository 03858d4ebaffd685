use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::{PipexploreError, Result};
use crate::eval::Materialize;
use crate::pipeline::{atomize, parse, ApplyPass};

use super::process::run_with_timeout;
use super::wrapper::{scratch_path, wrapper_script};

/// Handle to an LLVM installation: `clang` for IR emission and code
/// generation, `opt` for pipeline application, plus the scratch directory
/// and the wall-clock bound applied to every tool invocation.
pub struct Toolchain {
    clang: PathBuf,
    opt: PathBuf,
    tmp: PathBuf,
    timeout: Duration,
}

impl Toolchain {
    /// Locate `clang` on PATH (falling back to /usr/bin/clang) and `opt`
    /// next to it, falling back to `llvm-config --bindir`. Both binaries are
    /// probed with `--version`; a missing or broken installation is a
    /// `ToolFailure`.
    pub fn discover(tmp: PathBuf, timeout: Duration) -> Result<Self> {
        let clang = which("clang").unwrap_or_else(|| PathBuf::from("/usr/bin/clang"));
        probe(&clang, timeout).map_err(|err| {
            PipexploreError::ToolFailure(format!(
                "no working clang installation found: {}",
                err
            ))
        })?;

        let sibling = clang
            .parent()
            .map(|dir| dir.join("opt"))
            .filter(|path| path.exists());
        let opt = match sibling {
            Some(path) => path,
            None => llvm_bindir(timeout)?.join("opt"),
        };
        probe(&opt, timeout).map_err(|err| {
            PipexploreError::ToolFailure(format!("no working opt installation found: {}", err))
        })?;

        log::info!("using clang at {}, opt at {}", clang.display(), opt.display());
        Ok(Self { clang, opt, tmp, timeout })
    }

    /// Build a toolchain from explicit binary paths, without probing.
    pub fn from_paths(clang: PathBuf, opt: PathBuf, tmp: PathBuf, timeout: Duration) -> Self {
        Self { clang, opt, tmp, timeout }
    }

    pub fn clang(&self) -> &Path {
        &self.clang
    }

    pub fn opt(&self) -> &Path {
        &self.opt
    }

    pub fn tmp(&self) -> &Path {
        &self.tmp
    }

    /// Textual description of the default pipeline at the given optimization
    /// level, as reported by `opt --print-pipeline-passes`.
    pub fn default_pipeline(&self, opt_level: &str) -> Result<String> {
        let stdout = scratch_path(&self.tmp, "txt");
        let mut cmd = Command::new(&self.opt);
        cmd.arg(format!("-{}", opt_level))
            .arg("--print-pipeline-passes");
        let result = self.run_tool(&mut cmd, Some(stdout.as_path()));
        let text = result.and_then(|()| Ok(fs::read_to_string(&stdout)?));
        let _ = fs::remove_file(&stdout);
        text
    }

    /// The immutable pass universe: the default pipeline at `opt_level`,
    /// parsed and flattened into atomic passes. Computed once at startup and
    /// passed into the population; it only changes when the underlying
    /// optimizer's default pipeline does.
    pub fn pass_universe(&self, opt_level: &str) -> Result<Vec<String>> {
        let pipeline = self.default_pipeline(opt_level)?;
        let atoms = atomize(&parse(&pipeline)?);
        if atoms.is_empty() {
            return Err(PipexploreError::ToolFailure(format!(
                "default -{} pipeline reported by opt is empty",
                opt_level
            )));
        }
        Ok(atoms)
    }

    /// Emit unoptimized textual IR for a source file: `-O3` analysis
    /// settings with the optimization pipeline itself disabled, so every
    /// candidate pipeline starts from the same raw module.
    pub fn emit_unoptimized_ir(&self, source: &Path) -> Result<String> {
        let output = scratch_path(&self.tmp, "ll");
        let mut cmd = Command::new(&self.clang);
        cmd.arg("-g")
            .arg("-O3")
            .arg("-mllvm")
            .arg("-disable-llvm-optzns")
            .arg("-S")
            .arg("-emit-llvm")
            .arg(source)
            .arg("-o")
            .arg(&output);
        let result = self.run_tool(&mut cmd, None);
        let text = result.and_then(|()| Ok(fs::read_to_string(&output)?));
        let _ = fs::remove_file(&output);
        text
    }

    /// Apply a pass pipeline to a textual module via `opt -passes=...`.
    pub fn apply_pipeline(&self, module: &str, passes: &str) -> Result<String> {
        let input = scratch_path(&self.tmp, "ll");
        let output = scratch_path(&self.tmp, "ll");
        fs::write(&input, module)?;

        let mut cmd = Command::new(&self.opt);
        cmd.arg(&input)
            .arg(format!("-passes={}", passes))
            .arg("-S")
            .arg("-o")
            .arg(&output);
        let result = self.run_tool(&mut cmd, None);
        let text = result.and_then(|()| Ok(fs::read_to_string(&output)?));
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
        text
    }

    /// Strip debug info and incidental metadata from a module so two
    /// optimized modules can be compared for semantic-text equality.
    pub fn strip(&self, module: &str) -> Result<String> {
        let input = scratch_path(&self.tmp, "ll");
        let output = scratch_path(&self.tmp, "ll");
        fs::write(&input, module)?;

        let mut cmd = Command::new(&self.opt);
        cmd.arg(&input)
            .arg("-strip-debug")
            .arg("-passes=strip")
            .arg("-S")
            .arg("-o")
            .arg(&output);
        let result = self.run_tool(&mut cmd, None);
        let text = result.and_then(|()| Ok(fs::read_to_string(&output)?));
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
        Ok(strip_text(&text?))
    }

    /// Write the wrapper compiler for `pipeline` to a fresh scratch path and
    /// return it.
    pub fn write_wrapper(&self, pipeline: &str) -> Result<PathBuf> {
        let path = scratch_path(&self.tmp, "");
        self.write_wrapper_to(pipeline, &path)?;
        Ok(path)
    }

    /// Write the wrapper compiler for `pipeline` to `path` and mark it
    /// executable.
    pub fn write_wrapper_to(&self, pipeline: &str, path: &Path) -> Result<()> {
        fs::write(path, wrapper_script(&self.clang, &self.opt, &self.tmp, pipeline))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        }
        Ok(())
    }

    fn run_tool(&self, cmd: &mut Command, stdout_to: Option<&Path>) -> Result<()> {
        let stderr_path = scratch_path(&self.tmp, "err");
        cmd.stdin(Stdio::null());
        cmd.stderr(Stdio::from(File::create(&stderr_path)?));
        match stdout_to {
            Some(path) => cmd.stdout(Stdio::from(File::create(path)?)),
            None => cmd.stdout(Stdio::null()),
        };

        let status = match run_with_timeout(cmd, self.timeout) {
            Ok(status) => status,
            Err(err) => {
                let _ = fs::remove_file(&stderr_path);
                return Err(err);
            }
        };

        let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
        let _ = fs::remove_file(&stderr_path);

        if status.success() {
            if !stderr.trim().is_empty() {
                log::debug!("{:?}: {}", cmd.get_program(), stderr.trim());
            }
            Ok(())
        } else {
            Err(PipexploreError::ToolFailure(format!(
                "{:?} exited with {}: {}",
                cmd.get_program(),
                status,
                stderr.trim()
            )))
        }
    }
}

impl ApplyPass for Toolchain {
    fn apply(&self, module: &str, passes: &str) -> Result<String> {
        self.apply_pipeline(module, passes)
    }
}

impl Materialize for Toolchain {
    fn materialize(&self, pipeline: &str) -> Result<PathBuf> {
        self.write_wrapper(pipeline)
    }
}

/// Textual post-processing applied after `opt -strip-debug -passes=strip`:
/// drops comments, filename/target/attribute metadata, attribute references,
/// metadata records and debug intrinsics, leaving only the semantic body.
pub fn strip_text(module: &str) -> String {
    let mut lines = Vec::new();
    for raw in module.lines() {
        if raw.starts_with(';') {
            continue;
        }
        let line = raw.split(';').next().unwrap_or("");
        if line.starts_with("source_filename")
            || line.starts_with("target datalayout")
            || line.starts_with("target triple")
            || line.starts_with("attributes #")
        {
            continue;
        }
        let line = line
            .split_whitespace()
            .filter(|word| !word.starts_with('#'))
            .collect::<Vec<_>>()
            .join(" ");
        if line.starts_with('!') {
            continue;
        }
        let line = line.split(", !").next().unwrap_or("").to_string();
        if line.contains("llvm.dbg.") || line.contains("llvm.lifetime.") {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn which(binary: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(binary).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn probe(binary: &Path, timeout: Duration) -> Result<()> {
    let mut cmd = Command::new(binary);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    let status = run_with_timeout(&mut cmd, timeout)?;
    if status.success() {
        Ok(())
    } else {
        Err(PipexploreError::ToolFailure(format!(
            "{} --version exited with {}",
            binary.display(),
            status
        )))
    }
}

fn llvm_bindir(timeout: Duration) -> Result<PathBuf> {
    let stdout = scratch_path(&std::env::temp_dir(), "txt");
    let mut cmd = Command::new("llvm-config");
    cmd.arg("--bindir")
        .stdin(Stdio::null())
        .stdout(Stdio::from(File::create(&stdout)?))
        .stderr(Stdio::null());
    let status = run_with_timeout(&mut cmd, timeout);
    let text = fs::read_to_string(&stdout).unwrap_or_default();
    let _ = fs::remove_file(&stdout);
    match status {
        Ok(status) if status.success() && !text.trim().is_empty() => {
            Ok(PathBuf::from(text.trim()))
        }
        _ => Err(PipexploreError::ToolFailure(
            "opt is not next to clang and llvm-config --bindir failed".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_text_drops_metadata() {
        let module = "\
; ModuleID = '/tmp/abc.c'
source_filename = \"abc.c\"
target datalayout = \"e-m:e\"
target triple = \"x86_64-unknown-linux-gnu\"
define i32 @f() #0 {
  ret i32 0 ; trailing comment
}
attributes #0 = { nounwind }
!0 = !{i32 1}";
        assert_eq!(strip_text(module), "define i32 @f() {\nret i32 0\n}");
    }

    #[test]
    fn test_strip_text_drops_debug_intrinsics() {
        let module = "\
call void @llvm.dbg.declare(metadata ptr %x)
call void @llvm.lifetime.start.p0(i64 4, ptr %x)
ret void";
        assert_eq!(strip_text(module), "ret void");
    }

    #[test]
    fn test_strip_text_drops_inline_metadata_suffix() {
        assert_eq!(strip_text("br label %loop, !llvm.loop !5"), "br label %loop");
    }
}
