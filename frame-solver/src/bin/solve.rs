//! Frame Solver command line: solve a JSON request and print the results
//!
//! Usage: `frame-solve <request.json> [output.json]`
//!
//! The input is either a full request (`{"model": {...}, "options": ...,
//! "combinations": ..., "points": ...}`) or a bare model bundle.

use anyhow::{bail, Context, Result};
use std::path::Path;

use frame_solver::prelude::*;

fn read_request(path: &Path) -> Result<SolveRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if value.get("model").is_some() {
        Ok(serde_json::from_value(value).context("invalid solve request")?)
    } else {
        let model: ModelBundle = serde_json::from_value(value).context("invalid model bundle")?;
        Ok(SolveRequest {
            model,
            options: AnalysisOptions::default(),
            combinations: Default::default(),
            points: Vec::new(),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: {} <request.json> [output.json]", args[0]);
    }

    let request = read_request(Path::new(&args[1]))?;
    let response = request.run().context("analysis failed")?;

    for warning in &response.warnings {
        eprintln!("warning: {}", warning);
    }
    for (name, summary) in &response.summaries {
        eprintln!(
            "{}: max |d| = {:.6e}, max |N| = {:.6e}, max |M| = {:.6e}",
            name, summary.max_displacement, summary.max_normal_force, summary.max_moment
        );
    }

    let json = serde_json::to_string_pretty(&response)?;
    match args.get(2) {
        Some(output) => {
            std::fs::write(output, json).with_context(|| format!("failed to write {}", output))?;
        }
        None => println!("{}", json),
    }
    Ok(())
}
