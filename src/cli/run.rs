use anyhow::{Context, Result};
use log::info;

use pta_viewer::pipeline;
use pta_viewer::render;

use super::config::{Config, ViewerConfig};
use super::RunArgs;

/// Load and plot a random batch
pub fn run(args: RunArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?.viewer,
        None => ViewerConfig::default(),
    };
    let (config, output_dir) = file_config.merged_with(args.overrides()).resolve()?;

    info!("Data directory: {}", config.data_dir.display());
    info!("Annotations: {}", config.annotations.display());
    info!("Mode: {}", config.mode);

    let report = match pipeline::run(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", notice(&e.to_string()));
            std::process::exit(1);
        }
    };

    println!("{}", report.format_colored());

    let written = render::write_report(&report, &output_dir, !args.no_html)
        .with_context(|| format!("Failed to write report to {}", output_dir.display()))?;
    for name in &written.failed {
        eprintln!("{}", notice(&format!("figure for {} could not be drawn", name)));
    }
    match &written.index {
        Some(index) => println!("Report: {}", index.display()),
        None => println!("Summary: {}", written.summary.display()),
    }

    Ok(())
}

fn notice(message: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        format!("{}: {}", console::style("ERROR").red().bold(), message)
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        format!("ERROR: {}", message)
    }
}
