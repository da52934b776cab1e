use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shaving::{AggregationPass, Job, JobTree, PassConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shaving", about = "Job-tree statistics for single-machine scheduling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a balanced job tree and compute tau, sigma and xi for every job.
    Init {
        /// Jobs file (`<p> <q>` per line, `#` starts a comment).
        jobs: PathBuf,
        /// Print visit order and work-queue usage.
        #[arg(long)]
        profile: bool,
        /// Re-check every node's invariants after the pass.
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            jobs,
            profile,
            verify,
        } => run_init(jobs, profile, verify)?,
    }

    Ok(())
}

fn run_init(jobs_path: PathBuf, profile: bool, verify: bool) -> Result<()> {
    let jobs = read_jobs_file(&jobs_path)
        .with_context(|| format!("failed to read jobs from {}", jobs_path.display()))?;
    let mut tree = JobTree::build_and_set_leaves(&jobs).context("failed to build job tree")?;

    let config = PassConfig::default()
        .with_profiling(profile)
        .with_verification(verify);
    let mut pass = AggregationPass::new(config);
    pass.run(&mut tree).context("aggregation pass failed")?;

    for id in tree.sequence() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let path = tree
            .path_to(id)
            .map(|path| path.to_string())
            .unwrap_or_else(|| "?".to_string());
        match node.aggregates {
            Some(agg) => println!(
                "job {}\tp={}\tq={}\tpath={}\ttau={}\tsigma={}\txi={}",
                node.job.index, node.job.p, node.job.q, path, agg.tau, agg.sigma, agg.xi
            ),
            None => println!(
                "job {}\tp={}\tq={}\tpath={}\t(not computed)",
                node.job.index, node.job.p, node.job.q, path
            ),
        }
    }

    if let Some(root) = tree.root_aggregates() {
        println!("root xi={}", root.xi);
    }

    if let Some(profile) = pass.take_profile() {
        println!("{}", profile.report());
    }

    Ok(())
}

fn read_jobs_file(path: &PathBuf) -> Result<Vec<Job>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut jobs = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let mut fields = content.split_whitespace();
        let p_str = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing processing time on line {}", line_no + 1))?;
        let q_str = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing penalty on line {}", line_no + 1))?;

        let p: f64 = p_str.parse().with_context(|| {
            format!("invalid processing time '{}' on line {}", p_str, line_no + 1)
        })?;
        let q: f64 = q_str
            .parse()
            .with_context(|| format!("invalid penalty '{}' on line {}", q_str, line_no + 1))?;

        jobs.push(Job::new(jobs.len(), p, q)?);
    }

    Ok(jobs)
}
