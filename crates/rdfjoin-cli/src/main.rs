//! rdfjoin driver
//!
//! Loads a tab-separated triple dataset, runs a chain of two-table joins
//! under a chosen algorithm, and reports per-stage timing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use rdfjoin_core::join::{
    HashJoin, JoinAlgorithm, JoinKey, JoinSide, ParallelHashJoin, SortMergeJoin, DEFAULT_WORKERS,
};
use rdfjoin_core::loader::load_file;
use rdfjoin_core::table::RowTable;
use rdfjoin_core::timing::measure;

/// rdfjoin driver
#[derive(Parser, Debug)]
#[command(name = "rdfjoin")]
#[command(version, about = "Join-chain driver for tab-separated triple datasets")]
pub struct Args {
    /// Dataset file, one `subject<TAB>property<TAB>object .` fact per line
    pub dataset: PathBuf,

    /// Join steps as `propR.sideR=propS.sideS`, applied left to right;
    /// each step joins the running result against the named relation
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "wsdbm:follows.object=wsdbm:likes.subject"
    )]
    pub steps: Vec<String>,

    /// Join algorithm
    #[arg(long, value_enum, default_value = "hash")]
    pub algorithm: Algorithm,

    /// Worker threads for the parallel algorithm
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Print the result rows as JSON
    #[arg(long)]
    pub dump: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Algorithm {
    Hash,
    SortMerge,
    ParallelHash,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rdfjoin_core=info".parse().unwrap())
                .add_directive("rdfjoin_cli=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (db, _) = measure("load", || load_file(&args.dataset));
    let db = db?;
    println!(
        "loaded {} triples across {} relations",
        db.triple_count(),
        db.relation_count()
    );

    let algorithm: Box<dyn JoinAlgorithm> = match args.algorithm {
        Algorithm::Hash => Box::new(HashJoin),
        Algorithm::SortMerge => Box::new(SortMergeJoin),
        Algorithm::ParallelHash => Box::new(ParallelHashJoin::with_workers(args.workers)),
    };

    let mut current: Option<RowTable> = None;
    for step in &args.steps {
        let (left, right) = parse_step(step)?;
        let left_table = match current.take() {
            Some(table) => table,
            None => db.row_table(left.property)?,
        };
        let right_table = db.row_table(right.property)?;
        let (joined, elapsed) = measure(step, || {
            algorithm.join(
                &left_table,
                JoinKey {
                    property: left.property,
                    side: left.side,
                },
                &right_table,
                JoinKey {
                    property: right.property,
                    side: right.side,
                },
            )
        });
        let joined = joined?;
        println!(
            "{} [{}]: {} rows in {:?}",
            step,
            algorithm.name(),
            joined.len(),
            elapsed
        );
        current = Some(joined);
    }

    if args.dump {
        if let Some(result) = &current {
            let rows = result.decoded_rows()?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

struct Side<'a> {
    property: &'a str,
    side: JoinSide,
}

fn parse_step(step: &str) -> Result<(Side<'_>, Side<'_>), String> {
    let (left, right) = step
        .split_once('=')
        .ok_or_else(|| format!("step '{step}' is not of the form propR.sideR=propS.sideS"))?;
    Ok((parse_side(left)?, parse_side(right)?))
}

fn parse_side(token: &str) -> Result<Side<'_>, String> {
    let (property, side) = token
        .rsplit_once('.')
        .ok_or_else(|| format!("'{token}' is missing a .subject or .object suffix"))?;
    let side = match side {
        "subject" => JoinSide::Subject,
        "object" => JoinSide::Object,
        other => return Err(format!("unknown join side '{other}'")),
    };
    Ok(Side { property, side })
}
