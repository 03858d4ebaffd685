use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

use pipexplore::config::SearchConfig;
use pipexplore::eval::SizeExperimentFactory;
use pipexplore::llvm::Toolchain;
use pipexplore::runner::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let source = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: pipexplore <source.c> [output-compiler] [config.toml]"),
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ga-compiler"));
    let config_path = args.next().map(PathBuf::from);

    let config =
        SearchConfig::load(config_path.as_deref()).context("loading search configuration")?;
    let toolchain = Arc::new(
        Toolchain::discover(config.tmp_dir.clone(), config.tool_timeout())
            .context("locating clang and opt")?,
    );
    let factory = Arc::new(SizeExperimentFactory::new(
        source,
        config.tmp_dir.clone(),
        config.tool_timeout(),
    ));

    let runner = Runner::new(config, toolchain, factory, output);
    let pipeline = runner.run()?;
    println!("{}", pipeline);
    Ok(())
}
