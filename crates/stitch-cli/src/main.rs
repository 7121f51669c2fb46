use std::{error::Error, fs, path::Path};

use clap::Parser;
use serde::{Deserialize, Serialize};

use stitch_core::{PairKey, StitchingProject};
use stitch_pipeline::{enumerate_pairs, group_views, RunConfig};

/// Stitching CLI for planning pairwise registration runs.
#[derive(Debug, Parser)]
#[command(author, version, about = "Pairwise registration planner for multiview stitching")]
struct Args {
    /// Path to JSON file containing a StitchingProject.
    #[arg(long)]
    project: String,

    /// Optional path to a JSON RunConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<String>,
}

/// What a run with this configuration would compute.
#[derive(Debug, Serialize, Deserialize)]
struct PlanReport {
    views: usize,
    buckets: usize,
    groups: usize,
    candidate_pairs: usize,
    existing_results: usize,
    pairs: Vec<PlannedPair>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PlannedPair {
    key: PairKey,
    /// Whether the store already holds a result for this pair.
    known: bool,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

fn plan_from_files(
    project_path: &str,
    config_path: Option<&str>,
) -> Result<String, Box<dyn Error>> {
    let project: StitchingProject = load_json_file(Path::new(project_path))?;

    let config = if let Some(cfg_path) = config_path {
        load_json_file::<RunConfig>(Path::new(cfg_path))?
    } else {
        RunConfig::default()
    };
    config.validate()?;

    let catalog = project.catalog();
    let views = match &config.filter {
        Some(filter) => catalog.views(filter),
        None => catalog.all_views(),
    };
    let grouped = group_views(catalog, &views, &config.grouping)?;
    let batch = enumerate_pairs(catalog, &grouped, &config.grouping, config.downsampling)?;

    let pairs = batch
        .pairs
        .iter()
        .map(|pair| {
            let key = pair.key();
            let known = project.results().contains(&key);
            PlannedPair { key, known }
        })
        .collect();
    let report = PlanReport {
        views: views.len(),
        buckets: grouped.buckets.len(),
        groups: grouped.num_groups(),
        candidate_pairs: batch.len(),
        existing_results: project.results().len(),
        pairs,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    env_logger::init();
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let json = plan_from_files(&args.project, args.config.as_deref())?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
    use stitch_core::{Downsampling, Factor, ViewFilter};
    use std::{fs, path::Path};
    use tempfile::NamedTempFile;

    fn write_json<T: serde::Serialize>(value: &T, path: &Path) {
        serde_json::to_writer_pretty(fs::File::create(path).unwrap(), value).unwrap();
    }

    fn synthetic_project() -> StitchingProject {
        let catalog = tile_grid_catalog(&TileGridConfig {
            tiles_x: 2,
            tiles_y: 2,
            channels: 2,
            ..TileGridConfig::default()
        })
        .unwrap();
        StitchingProject::new(catalog)
    }

    #[test]
    fn plans_a_grid_with_default_config() {
        let project = synthetic_project();
        let project_file = NamedTempFile::new().unwrap();
        write_json(&project, project_file.path());

        let json = plan_from_files(project_file.path().to_str().unwrap(), None)
            .expect("cli helper should succeed");

        let report: PlanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.views, 8);
        assert_eq!(report.buckets, 1);
        assert_eq!(report.groups, 4);
        assert_eq!(report.candidate_pairs, 6);
        assert_eq!(report.existing_results, 0);
        assert!(report.pairs.iter().all(|p| !p.known));
    }

    #[test]
    fn honors_a_config_file() {
        let project = synthetic_project();
        let config = RunConfig {
            downsampling: Downsampling::uniform(2),
            filter: Some(ViewFilter::all().restrict(Factor::Channel, &[0])),
            ..RunConfig::default()
        };

        let project_file = NamedTempFile::new().unwrap();
        let config_file = NamedTempFile::new().unwrap();
        write_json(&project, project_file.path());
        write_json(&config, config_file.path());

        let json = plan_from_files(
            project_file.path().to_str().unwrap(),
            Some(config_file.path().to_str().unwrap()),
        )
        .expect("cli helper should succeed");

        let report: PlanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.views, 4);
        assert_eq!(report.groups, 4);
        assert_eq!(report.candidate_pairs, 6);
    }

    #[test]
    fn rejects_an_invalid_config() {
        let project = synthetic_project();
        let config = RunConfig {
            downsampling: Downsampling { x: 0, y: 1, z: 1 },
            ..RunConfig::default()
        };

        let project_file = NamedTempFile::new().unwrap();
        let config_file = NamedTempFile::new().unwrap();
        write_json(&project, project_file.path());
        write_json(&config, config_file.path());

        let err = plan_from_files(
            project_file.path().to_str().unwrap(),
            Some(config_file.path().to_str().unwrap()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("downsampling"));
    }
}
