//! Reads the stanzas under `demos/` through every composition pattern.
//!
//! This example demonstrates:
//! - Single fetches observed as a callback and as a deferred value
//! - Chaining fetches so the next starts only after the previous settled
//! - Fanning out fetches in any order and joining on all of them
//! - Walking stanzas in order, fail-fast and fail-tolerant
//!
//! Usage: `cargo run --example poems -- [POEM_DIR] [--fail N]...`
//!
//! `--fail N` makes stanza N of poem two fail in the ordered runs. Set
//! `RUST_LOG=fetchflow=debug` to watch dispatch and settlement.

use clap::Parser;
use fetchflow::prelude::*;
use fetchflow::{BatchReport, FaultInjector};
use std::path::PathBuf;
use std::sync::Arc;

fn poem_one(n: usize) -> Identifier {
    Identifier::from(format!("poem-one/stanza-0{}.txt", n))
}

fn poem_two() -> Vec<Identifier> {
    (1..=8)
        .map(|n| Identifier::from(format!("poem-two/stanza-0{}.txt", n)))
        .collect()
}

fn console(heading: &str) -> Arc<dyn Observer> {
    Arc::new(ConsoleObserver::with_heading(heading))
}

/// Reads the bundled poems through every composition pattern.
#[derive(Debug, Parser)]
#[command(name = "poems")]
struct Args {
    /// Directory holding `poem-one/` and `poem-two/`. Defaults to the bundled stanzas.
    root: Option<PathBuf>,

    /// Make stanza N of poem two fail in the ordered runs. Repeatable.
    #[arg(long = "fail", value_name = "N", value_parser = clap::value_parser!(u8).range(1..=8))]
    failing: Vec<u8>,
}

impl Args {
    fn root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos"))
    }
}

fn print_report(report: &BatchReport<String>) {
    report.print_summary();
    match report.summary().to_json() {
        Ok(json) => println!("{}", json),
        Err(err) => log::warn!("could not render summary: {}", err),
    }
}

// ============================================================================
// Single reads and fixed chains
// ============================================================================

async fn single_reads(fetcher: &Arc<dyn Fetch>) {
    println!("\n=== A. stanza one ===");
    fetch_with(fetcher, poem_one(1), |err, stanza| match (err, stanza) {
        (Some(err), _) => println!("callback error: {}", err),
        (None, stanza) => println!("-- A. callback version --\n{}", stanza.unwrap_or_default()),
    })
    .await;

    let observer = console("A. promise version");
    Deferred::fetch(fetcher, poem_one(1))
        .on_settled(
            |stanza| observer.on_success(&poem_one(1), &stanza),
            |err| observer.on_failure(&err),
        )
        .await;

    println!("\n=== D. a stanza that does not exist ===");
    let observer = console("D. promise version");
    Deferred::fetch(fetcher, "poem-one/wrong-file-name.txt")
        .on_settled(|_| {}, |err| observer.on_failure(&err))
        .await;
}

async fn chains(fetcher: &Arc<dyn Fetch>) {
    println!("\n=== C. stanza two *then* stanza three, then done ===");
    Sequencer::new(fetcher.clone(), [poem_one(2), poem_one(3)])
        .with_label("C")
        .with_observer(console("C"))
        .run()
        .await;

    println!("\n=== E. stanza three then a missing stanza, or an error ===");
    Sequencer::new(
        fetcher.clone(),
        [poem_one(3), Identifier::from("poem-one/wrong-file-name.txt")],
    )
    .with_label("E")
    .with_observer(console("E"))
    .with_completion(Completion::Silent)
    .run()
    .await;

    println!("\n=== F. as E, but always log done ===");
    let chain = Sequencer::new(
        fetcher.clone(),
        [poem_one(3), Identifier::from("poem-one/wrong-file-name.txt")],
    )
    .with_label("F")
    .with_observer(console("F"))
    .with_completion(Completion::Always);
    observe(chain.run(), |err, _| {
        if let Some(err) = err {
            log::debug!("F settled with {}", err);
        }
    })
    .await;
}

// ============================================================================
// Batches
// ============================================================================

async fn batches(fetcher: &Arc<dyn Fetch>, failing: &[u8]) {
    println!("\n=== Two A. two stanzas in any order, done when both are done ===");
    FanOut::new(fetcher.clone(), poem_two().into_iter().take(2))
        .with_label("Two A")
        .with_observer(console("Two A"))
        .run()
        .await;

    println!("\n=== Two B. every stanza in any order ===");
    FanOut::new(fetcher.clone(), poem_two())
        .with_label("Two B")
        .with_observer(console("Two B"))
        .run()
        .await;

    println!("\n=== Two C. every stanza in order ===");
    OrderedIter::new(fetcher.clone(), poem_two())
        .with_label("Two C")
        .with_observer(console("Two C"))
        .run()
        .await;

    let faulty: Arc<dyn Fetch> = Arc::new(FaultInjector::new(
        Arc::clone(fetcher),
        failing.iter().map(|&n| poem_two()[usize::from(n) - 1].clone()),
    ));

    println!("\n=== Two D. in order, stopping at the first error ===");
    let report = OrderedIter::new(faulty.clone(), poem_two())
        .with_label("Two D")
        .with_policy(FailurePolicy::FailFast)
        .with_observer(console("Two D"))
        .run()
        .await;
    print_report(&report);

    println!("\n=== Two D'. in order, logging errors and carrying on ===");
    let report = OrderedIter::new(faulty, poem_two())
        .with_label("Two D'")
        .with_policy(FailurePolicy::FailTolerant)
        .with_observer(console("Two D'"))
        .run()
        .await;
    print_report(&report);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let args = Args::parse();
    let root = args.root();
    println!("=== Fetchflow poems, reading from {} ===", root.display());

    let fetcher: Arc<dyn Fetch> = Arc::new(FileFetcher::new(&root));
    single_reads(&fetcher).await;
    chains(&fetcher).await;
    batches(&fetcher, &args.failing).await;

    println!("\n=== All runs completed ===");
}
