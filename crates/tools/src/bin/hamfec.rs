//! hamfec - text transmission over a noisy channel with Hamming(22,16) and repetition
//!
//! Sends a message through the configured link and reports how much of it
//! survived.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use hamfec_frame::hamming::{CODEWORD_BITS, DATA_BITS};
use hamfec_tools::{
    init_logging, ChannelModel, GlobalConfig, Palette, Pipeline, PipelineReport, SimConfig,
};

/// hamfec link simulator
#[derive(Parser)]
#[command(name = "hamfec")]
#[command(about = "Hamming(22,16) SECDED with 2x repetition over a noisy channel")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message through the channel and report the damage
    Run(RunArgs),
    /// Write the default configuration to a file
    Config(ConfigArgs),
    /// Show code parameters
    Info,
}

#[derive(Parser, Clone)]
struct RunArgs {
    /// Message to send; prompted for when absent
    #[arg(short, long)]
    message: Option<String>,

    /// Noise variance sigma^2; prompted for when absent
    #[arg(long)]
    variance: Option<f64>,

    /// Seed for the noise source
    #[arg(long)]
    seed: Option<u64>,

    /// Channel model
    #[arg(long, value_enum)]
    channel: Option<ChannelModel>,

    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Clone)]
struct ConfigArgs {
    /// Output file (.toml or .json)
    #[arg(short, long, default_value = "hamfec.toml")]
    output: PathBuf,
}

fn prompt(label: &str) -> Result<String> {
    println!("{}", Palette::for_stdout().good(label));
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };

    let message = match args.message {
        Some(message) => message,
        None => prompt("Enter the message to be sent:")?,
    };

    if let Some(variance) = args.variance {
        config.variance = variance;
    } else if args.config.is_none() {
        config.variance = prompt("Enter the value of variance σ^2:")?
            .trim()
            .parse::<f64>()
            .context("Variance must be a number")?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(channel) = args.channel {
        config.channel = channel;
    }

    debug!("Simulation config: {:?}", config);
    info!(
        "Sending {} characters over {:?} channel, sigma {:.3}",
        message.chars().count(),
        config.channel,
        config.sigma()
    );

    let start = Instant::now();
    let mut channel = config.build_channel()?;
    let report = Pipeline::new().run(&message, channel.as_mut())?;
    let elapsed = start.elapsed();

    let palette = Palette::for_stdout();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, palette);
    }
    println!(
        "Execution time: {}",
        palette.timing(format!("{:.2} seconds", elapsed.as_secs_f64()))
    );

    Ok(())
}

fn print_report(report: &PipelineReport, palette: Palette) {
    println!("Recovered message: {}", palette.good(&report.recovered));
    println!("Message size: {}", palette.note(report.message_len()));
    println!(
        "Error rate: {}",
        palette.bad(format!("{:.2}%", report.error_rate_percent()))
    );
    println!("Total errors: {}", palette.bad(report.errors));
    println!(
        "Blocks: {} per copy (copy A: {} corrected, {} uncorrectable; copy B: {} corrected, {} uncorrectable)",
        report.blocks,
        report.copy_a.corrected_errors,
        report.copy_a.uncorrectable_blocks,
        report.copy_b.corrected_errors,
        report.copy_b.uncorrectable_blocks
    );
}

fn show_info() -> Result<()> {
    let config = SimConfig::default();
    let code = config.code()?;

    println!("\n=== hamfec ===");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));

    println!("\n=== Outer code ===");
    println!("  • Extended Hamming({},{}) SECDED", CODEWORD_BITS, DATA_BITS);
    println!("  • Parity slots 0 (overall), 1, 2, 4, 8, 16");
    println!("  • Every codeword sent twice, best decode kept");

    println!("\n=== Inner code (coded channel) ===");
    println!(
        "  • Convolutional, rate 1/{}, K={}, {} states",
        code.outputs(),
        code.constraint_length(),
        code.num_states()
    );
    println!("  • Generators: {}", config.generators.join(", "));
    println!(
        "  • Soft-decision Viterbi, decision depth {}, {}-bit quantization",
        config.decision_depth, config.quant_level
    );

    println!("\n=== Example Usage ===");
    println!("  Run:    hamfec run -m \"Hello World\" --variance 0.5 --seed 1");
    println!("  Config: hamfec config -o sim.toml");
    println!("  Replay: hamfec run -m \"Hello\" -c sim.toml --json");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    info!("hamfec starting");

    match cli.command {
        Commands::Run(args) => run(args)?,

        Commands::Config(args) => {
            SimConfig::default().save_to_file(&args.output)?;
            println!("✓ Default configuration written to {:?}", args.output);
        }

        Commands::Info => show_info()?,
    }

    Ok(())
}
