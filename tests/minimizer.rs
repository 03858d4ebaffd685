use pipexplore::pipeline::{minimize, minimize_atoms, text_equivalent, ApplyPass};

/// Simulates `opt` on a toy module: every application rewrites the
/// module-identifier comment (as the real tool does when fed a fresh temp
/// file), listed passes append a marker instruction, and everything else
/// leaves the body alone.
struct StubOpt {
    effective: Vec<&'static str>,
}

impl ApplyPass for StubOpt {
    fn apply(&self, module: &str, passes: &str) -> pipexplore::Result<String> {
        let mut lines: Vec<String> = module
            .lines()
            .filter(|line| !line.starts_with("; ModuleID = "))
            .map(|line| line.to_string())
            .collect();
        if self.effective.contains(&passes) {
            lines.push(format!("{} = applied", passes));
        }
        let mut out = format!("; ModuleID = '/tmp/{}-{}.ll'\n", passes, lines.len());
        out.push_str(&lines.join("\n"));
        Ok(out)
    }
}

const MODULE: &str = "; ModuleID = '/tmp/seed.ll'\ndefine i32 @f() {\nret i32 0\n}";

#[test]
fn test_noop_tail_pass_is_dropped() {
    let opt = StubOpt {
        effective: vec!["sroa", "simplifycfg"],
    };
    let minimized = minimize(&opt, MODULE, "sroa,simplifycfg,adce").unwrap();
    assert_eq!(minimized, "sroa,simplifycfg");
}

#[test]
fn test_noop_passes_dropped_anywhere() {
    let opt = StubOpt {
        effective: vec!["gvn"],
    };
    let minimized = minimize(&opt, MODULE, "sroa,gvn,adce").unwrap();
    assert_eq!(minimized, "gvn");
}

#[test]
fn test_all_effective_pipeline_is_unchanged() {
    let opt = StubOpt {
        effective: vec!["sroa", "simplifycfg", "adce"],
    };
    let minimized = minimize(&opt, MODULE, "sroa,simplifycfg,adce").unwrap();
    assert_eq!(minimized, "sroa,simplifycfg,adce");
}

#[test]
fn test_manager_pipelines_are_atomized_first() {
    let opt = StubOpt {
        effective: vec!["function(sroa)", "function(adce)"],
    };
    let minimized = minimize(&opt, MODULE, "function(sroa,adce),instcombine").unwrap();
    assert_eq!(minimized, "function(sroa),function(adce)");
}

/// A dropped no-op still advances the working module, because later passes
/// may depend on changes the normalization hides.
struct StatefulOpt;

impl ApplyPass for StatefulOpt {
    fn apply(&self, module: &str, passes: &str) -> pipexplore::Result<String> {
        match passes {
            // Adds only normalization-invisible metadata.
            "annotate" => Ok(format!("{}\nsource_filename = \"tagged.c\"", module)),
            // Transforms only modules the annotator has touched.
            "lower" if module.contains("source_filename") => {
                Ok(format!("{}\nlower = applied", module))
            }
            _ => Ok(module.to_string()),
        }
    }
}

#[test]
fn test_dropped_noop_output_becomes_the_new_baseline() {
    let atoms = vec!["annotate".to_string(), "lower".to_string()];
    let kept = minimize_atoms(&StatefulOpt, "define void @f()", &atoms).unwrap();
    // `annotate` is classified a no-op and dropped, but `lower` must still
    // have seen its output.
    assert_eq!(kept, vec!["lower"]);
}

#[test]
fn test_text_equivalence_ignores_path_metadata_only() {
    assert!(text_equivalent(
        "; ModuleID = 'a'\nret void",
        "; ModuleID = 'b'\nret void"
    ));
    assert!(!text_equivalent("ret void", "unreachable"));
}
