use anyhow::Result;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

use toolcore::scene::Scene;
use toolcore::settings::Settings;
use toolcore::MetricsLog;
use toolcore_grid::BlockQuery;
use toolcore_util::Timings;

#[derive(Debug, StructOpt)]
struct Opts {
    #[structopt(short, long)]
    settings: Option<PathBuf>,
    #[structopt(subcommand)]
    action: Action,
}

#[derive(Debug, StructOpt)]
enum Action {
    /// Run the queries of a scene file and log what they hit.
    Query {
        #[structopt(flatten)]
        options: QueryOpts,
    },
}

#[derive(Debug, StructOpt)]
struct QueryOpts {
    #[structopt(short = "f", long)]
    scene: PathBuf,
    /// Number of times to run every query, for timing.
    #[structopt(short, long, default_value = "1")]
    repeat: u64,
}

fn run(opt: Opts) -> Result<()> {
    let settings = Settings::load(opt.settings.as_deref())?;

    match &opt.action {
        Action::Query { options } => run_query(&settings, &options.scene, options.repeat),
    }
}

fn run_query(settings: &Settings, scene_path: &Path, repeat: u64) -> Result<()> {
    let mut metrics = MetricsLog::install()?;
    let scene = Scene::load(scene_path)?;

    let mut query = BlockQuery::new();
    let mut timings = Timings::new();
    let mut reports = Vec::new();
    for tick in 0..repeat.max(1) {
        reports = scene.run(settings, &mut query, &mut timings, tick);
    }

    for (index, report) in reports.iter().enumerate() {
        info!(
            "{} {}: {} blocks {:?}",
            report.kind,
            index,
            report.hits.len(),
            report.hits
        );
        if !report.within_limits {
            warn!(
                "{} {}: building {} blocks would exceed the world limits",
                report.kind,
                index,
                report.hits.len()
            );
        }
        if let Some(draw) = &report.draw {
            info!(
                "{} {}: {} debug primitives",
                report.kind,
                index,
                draw.commands.len()
            );
        }
    }

    let mut names: Vec<String> = timings.names().map(str::to_string).collect();
    names.sort();
    for name in &names {
        info!("[{}] min : median : max ms = {}", name, timings.value(name));
    }

    info!("Final metrics: {}", metrics.drain());
    Ok(())
}

fn main() {
    env_logger::init();

    match run(Opts::from_args()) {
        Ok(()) => (),
        Err(end_error) => {
            for error in end_error.chain() {
                error!("{}", error);
                error!("========");
            }
        }
    }
}
