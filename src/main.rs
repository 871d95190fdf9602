use std::fmt::Write as _;
use std::io;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use instrumentation::{
    diag_info, diag_trace, diag_warn, Instrumentation, InstrumentationConfig, LogLevel, LogOutput,
    ObjectId, TracingOutput, WriterOutput,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "instrument", about = "Exercise the diagnostics core under a chosen configuration")]
struct Cli {
    #[command(flatten)]
    flags: Flags,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Flags {
    /// Show informational messages and timers.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Show debug messages whose category starts with CATEGORY ("" for all).
    #[arg(long, global = true, value_name = "CATEGORY")]
    debug: Option<String>,
    /// Show trace messages up to depth N.
    #[arg(long, global = true, value_name = "N")]
    trace: Option<String>,
    /// Enable object tracking and verification checks.
    #[arg(long, global = true)]
    verify: bool,
    /// Omit the elapsed-milliseconds prefix on each line.
    #[arg(long, global = true)]
    no_elapsed: bool,
    /// Route diagnostics through the tracing subscriber instead of stderr.
    #[arg(long, global = true)]
    via_tracing: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and release a synthetic set of tracked objects under timers.
    Demo {
        /// Number of postings to build.
        #[arg(long, default_value_t = 1_000)]
        postings: usize,
        /// Postings left tracked at shutdown.
        #[arg(long, default_value_t = 0)]
        leak: usize,
        /// Print the memory report to stdout before shutdown.
        #[arg(long)]
        report: bool,
        /// Include construction history in the report.
        #[arg(long)]
        all: bool,
    },
    /// List every level and whether it is currently shown.
    Levels,
}

#[derive(Debug)]
#[allow(dead_code)]
struct Amount {
    quantity: i64,
    commodity: u32,
}

#[derive(Debug)]
#[allow(dead_code)]
struct Posting {
    account: String,
    amount: Box<Amount>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = InstrumentationConfig::from_flags(
        cli.flags.verbose,
        cli.flags.debug.as_deref(),
        cli.flags.trace.as_deref(),
        cli.flags.verify,
    )
    .context("invalid diagnostics flags")?
    .with_elapsed_prefix(!cli.flags.no_elapsed);

    let output: Box<dyn LogOutput> = if cli.flags.via_tracing {
        Box::new(TracingOutput::new())
    } else {
        Box::new(WriterOutput::stderr())
    };
    let instr = Instrumentation::start(config, Some(output));

    match cli.command {
        Commands::Demo {
            postings,
            leak,
            report,
            all,
        } => run_demo(&instr, postings, leak, report, all)?,
        Commands::Levels => print_levels(&instr),
    }

    let summary = instr.shutdown();
    if !summary.is_clean() {
        println!(
            "outstanding at shutdown: {} objects ({} bytes), {} timers",
            summary.outstanding_objects,
            summary.outstanding_bytes,
            summary.unfinished_timers.len()
        );
    }
    Ok(())
}

fn run_demo(instr: &Instrumentation, count: usize, leak: usize, report: bool, all: bool) -> Result<()> {
    instr.info_start("demo", |buf| buf.push_str("Synthetic workload"));
    let journal = instr.category("journal");

    journal.start("build", |buf| {
        let _ = write!(buf, "Built {} postings:", count);
    });
    let mut postings: Vec<Box<Posting>> = Vec::with_capacity(count);
    for i in 0..count {
        let posting = Box::new(Posting {
            account: format!("Expenses:Item{}", i % 17),
            amount: Box::new(Amount {
                quantity: i as i64 * 100,
                commodity: (i % 3) as u32,
            }),
        });
        instr
            .track::<Posting>(ObjectId::of(&*posting), "account, amount")
            .with_context(|| format!("tracking posting {}", i))?;
        instr
            .track::<Amount>(ObjectId::of(&*posting.amount), "quantity, commodity")
            .with_context(|| format!("tracking amount of posting {}", i))?;
        diag_trace!(instr, 2, "built posting {} in {}", i, posting.account);
        postings.push(posting);
    }
    journal.finish("build");

    instr.debug_start("balance", "journal.balance", |buf| buf.push_str("Balanced journal"));
    let total: i64 = postings.iter().map(|p| p.amount.quantity).sum();
    instr.debug_finish("balance", "journal.balance");
    diag_info!(instr, "{} postings totalling {}", postings.len(), total);

    let keep = leak.min(postings.len());
    if keep > 0 {
        diag_warn!(instr, "leaving {} postings tracked at shutdown", keep);
    }
    for posting in postings.drain(keep..) {
        instr.untrack::<Amount>(ObjectId::of(&*posting.amount));
        instr.untrack::<Posting>(ObjectId::of(&*posting));
    }

    if report {
        instr
            .write_memory_report(&mut io::stdout(), all)
            .context("failed to write memory report")?;
    }
    instr.info_finish("demo");
    Ok(())
}

fn print_levels(instr: &Instrumentation) {
    for level in LogLevel::ALL_LEVELS {
        println!(
            "{:<10} [{}]\t{}",
            format!("{:?}", level),
            level.label(),
            if instr.is_enabled(level) { "shown" } else { "hidden" }
        );
    }
}
