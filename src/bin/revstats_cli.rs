//! Binary entry point for the `revstats` command-line tool.

use std::error::Error;

use clap::{Parser, Subcommand, ValueEnum};
use revstats::fs::memory::InMemoryFs;
use revstats::{query, EngineOptions, Stats};

#[derive(Parser, Debug)]
#[command(
    name = "revstats",
    version,
    about = "Revision-file statistics engine for Subversion-style repositories",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for the statistics report"
    )]
    format: OutputFormat,

    #[arg(long, global = true, help = "Suppress the progress line")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Collect statistics over a repository")]
    Stats {
        #[arg(
            long,
            help = "Run against the crate's built-in synthetic repository rather than a real one"
        )]
        demo: bool,

        #[arg(
            long,
            default_value_t = 64,
            help = "Capacity of the largest-changes list in the report"
        )]
        largest_changes: usize,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    revstats::logging::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Stats { demo, largest_changes } => {
            if !demo {
                return Err("this build only ships the in-memory demo backend; link revstats \
                     into your own FsBackend implementation to point it at a real repository, \
                     or pass --demo to try it against the built-in sample"
                    .into());
            }

            let fs = InMemoryFs::demo();
            let options = EngineOptions {
                largest_changes_capacity: largest_changes,
                ..EngineOptions::default()
            };

            let mut progress = |revision: revstats::fs::Revnum| -> revstats::Result<()> {
                if !cli.quiet {
                    eprintln!("... read through revision {revision}");
                }
                Ok(())
            };
            let stats = query::get_stats(&fs, options, Some(&mut progress), None)?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Text => print_stats_text(&stats),
            }
        }
    }
    Ok(())
}

fn print_stats_text(stats: &Stats) {
    const LABEL_WIDTH: usize = 28;

    print_section(
        "Revisions",
        LABEL_WIDTH,
        vec![
            ("revision_count", format_count(stats.revision_count)),
            ("total_size", format_bytes(stats.total_size)),
            ("change_count", format_count(stats.change_count)),
            ("change_len", format_bytes(stats.change_len)),
        ],
    );

    print_section(
        "Node-revisions",
        LABEL_WIDTH,
        vec![
            ("dir_noderev_count", format_count(stats.dir_noderev_count)),
            ("dir_noderev_size", format_bytes(stats.dir_noderev_size)),
            ("file_noderev_count", format_count(stats.file_noderev_count)),
            ("file_noderev_size", format_bytes(stats.file_noderev_size)),
        ],
    );

    print_section(
        "Representations (packed footprint)",
        LABEL_WIDTH,
        vec![
            ("total_count", format_count(stats.total_rep_pack_stats.count)),
            (
                "total_packed_size",
                format_bytes(stats.total_rep_pack_stats.packed_size),
            ),
            (
                "total_expanded_size",
                format_bytes(stats.total_rep_pack_stats.expanded_size),
            ),
            (
                "total_header_overhead",
                format_bytes(stats.total_rep_pack_stats.header_overhead),
            ),
            ("unused_count", format_count(stats.unused_rep_pack_stats.count)),
        ],
    );

    print_section(
        "Representations (dedup detail)",
        LABEL_WIDTH,
        vec![
            ("unique_count", format_count(stats.total_rep_stats.unique.count)),
            ("shared_count", format_count(stats.total_rep_stats.shared.count)),
            ("references", format_count(stats.total_rep_stats.references)),
            (
                "logical_expanded_size",
                format_bytes(stats.total_rep_stats.expanded_size),
            ),
        ],
    );

    let largest: Vec<_> = stats
        .largest_changes
        .changes
        .iter()
        .filter(|entry| entry.size > 0)
        .take(10)
        .collect();
    if !largest.is_empty() {
        println!("Largest changes");
        for entry in &largest {
            println!(
                "  r{:<8} {:>12} {}",
                entry.revision,
                format_bytes(entry.size),
                entry.path
            );
        }
        println!();
    }
}

fn print_section(title: &str, label_width: usize, rows: Vec<(&'static str, String)>) {
    println!("{title}");
    for (label, value) in rows {
        println!("  {:<width$} {}", label, value, width = label_width);
    }
    println!();
}

fn format_count(value: u64) -> String {
    value.to_string()
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{value:.1} {} ({bytes} B)", UNITS[unit])
    }
}
