use std::path::{Path, PathBuf};

use rand::distributions::{Alphanumeric, DistString};

/// A fresh random file path under `tmp`. Concurrent evaluations each get
/// their own scratch files, so collisions must be vanishingly unlikely.
pub(crate) fn scratch_path(tmp: &Path, extension: &str) -> PathBuf {
    let name = Alphanumeric.sample_string(&mut rand::thread_rng(), 32);
    if extension.is_empty() {
        tmp.join(name)
    } else {
        tmp.join(format!("{}.{}", name, extension))
    }
}

/// Render the standalone wrapper-compiler script for a fixed pipeline.
///
/// CLI contract: `-o <path>` is required, `-c` is required, an optional
/// `-O<level>` is forwarded to the final code-generation step (default 0),
/// and every remaining argument is forwarded verbatim to the unoptimized-IR
/// emission step. The script deletes its own intermediates, tolerating
/// deletion failure.
pub(crate) fn wrapper_script(clang: &Path, opt: &Path, tmp: &Path, pipeline: &str) -> String {
    format!(
        r#"#!/bin/sh
# Wrapper compiler generated by pipexplore. Compile-only; the optimization
# pipeline below is fixed at generation time.
clang="{clang}"
opt="{opt}"
tmp="{tmp}"
passes="{pipeline}"

out=""
compile_only=0
level="0"
fwd=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o)
      out="$2"
      shift 2
      ;;
    -c)
      compile_only=1
      shift
      ;;
    -O*)
      level="${{1#-O}}"
      shift
      ;;
    *)
      fwd="$fwd $1"
      shift
      ;;
  esac
done

if [ -z "$out" ]; then
  echo "error: -o not specified; output name deduction is unsupported" >&2
  exit 1
fi
if [ "$compile_only" -ne 1 ]; then
  echo "error: -c not specified; this compiler supports compiling only" >&2
  exit 1
fi

step1="$tmp/pipexplore_wrap.$$.1.bc"
step2="$tmp/pipexplore_wrap.$$.2.bc"

"$clang" -O3 -mllvm -disable-llvm-optzns -emit-llvm -o "$step1" $fwd || exit 1
"$opt" "$step1" -passes="$passes" -o "$step2" || {{ rm -f "$step1"; exit 1; }}
"$clang" -c "$step2" -o "$out" "-O$level" || {{ rm -f "$step1" "$step2"; exit 1; }}

rm -f "$step1" "$step2" 2>/dev/null
exit 0
"#,
        clang = clang.display(),
        opt = opt.display(),
        tmp = tmp.display(),
        pipeline = pipeline,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_embeds_pipeline_and_tools() {
        let script = wrapper_script(
            Path::new("/usr/bin/clang"),
            Path::new("/usr/bin/opt"),
            Path::new("/tmp"),
            "sroa,simplifycfg,adce",
        );
        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("passes=\"sroa,simplifycfg,adce\""));
        assert!(script.contains("clang=\"/usr/bin/clang\""));
        assert!(script.contains("opt=\"/usr/bin/opt\""));
        assert!(script.contains("-disable-llvm-optzns"));
    }

    #[test]
    fn test_scratch_paths_are_unique() {
        let a = scratch_path(Path::new("/tmp"), "ll");
        let b = scratch_path(Path::new("/tmp"), "ll");
        assert_ne!(a, b);
        assert!(a.extension().is_some());
        assert!(scratch_path(Path::new("/tmp"), "").extension().is_none());
    }
}
