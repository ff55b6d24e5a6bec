use std::io::{self, ErrorKind};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use syl_gen_core::Error;
use syl_gen_core::io::clean_file;
use syl_gen_core::model::cancellation::CancellationToken;
use syl_gen_core::model::composer::{DEFAULT_MAX_LEN, DEFAULT_MIN_LEN};
use syl_gen_core::model::generation_input::{GenerationInput, GenerationMode};
use syl_gen_core::model::generator::{run, RunOutcome};
use syl_gen_core::model::pool_set::PoolSet;
use syl_gen_core::model::segmenter::CaseMode;

/// Generate new names by recombining the syllables of example names.
#[derive(Parser, Debug)]
#[command(name = "syl-gen", version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Generate names from a corpus file (one name per line)
	Generate(GenerateArgs),
	/// Clean a raw name list into a corpus file
	Clean(CleanArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
	/// Corpus file, one name per line
	corpus: PathBuf,

	/// Number of names to generate (0 = until interrupted)
	#[arg(short = 'n', long, default_value_t = 0)]
	count: usize,

	/// Minimum length of generated names
	#[arg(short = 'm', long = "min", default_value_t = DEFAULT_MIN_LEN)]
	min_len: usize,

	/// Maximum length of generated names
	#[arg(short = 'x', long = "max", default_value_t = DEFAULT_MAX_LEN)]
	max_len: usize,

	/// Random seed for reproducible output
	#[arg(short, long)]
	seed: Option<u64>,

	/// Dump the prefix/middle/suffix pools before generating
	#[arg(short, long)]
	debug: bool,

	/// Keep the corpus casing instead of lower-casing segments
	#[arg(long)]
	keep_case: bool,

	/// Reuse (or write) a binary pool cache next to the corpus
	#[arg(long)]
	cache: bool,
}

#[derive(Args, Debug)]
struct CleanArgs {
	/// Raw list to clean
	input: PathBuf,

	/// Destination corpus file (overwritten)
	output: PathBuf,

	/// Drop the first line of the input
	#[arg(long)]
	skip_header: bool,
}

impl GenerateArgs {
	/// Turns the command line into a validated `GenerationInput`.
	fn generation_input(&self) -> anyhow::Result<GenerationInput> {
		let mut input = GenerationInput::new();
		input.count = self.count;
		input.seed = self.seed;
		input.debug = self.debug;
		input.case_mode = if self.keep_case { CaseMode::Preserve } else { CaseMode::Fold };
		input.set_bounds(self.min_len, self.max_len)?;
		Ok(input)
	}
}

/// Spawns a runtime whose only job is to turn Ctrl-C into a cancellation.
///
/// The listener is registered before this returns. The runtime must stay
/// alive for as long as the handler is needed.
fn install_interrupt_handler(cancel: CancellationToken) -> anyhow::Result<tokio::runtime::Runtime> {
	let runtime = tokio::runtime::Builder::new_multi_thread()
		.worker_threads(1)
		.enable_all()
		.build()
		.context("failed to start the signal runtime")?;

	// The first poll registers the listener
	let mut interrupt = Box::pin(tokio::signal::ctrl_c());
	let early = runtime.block_on(async {
		tokio::select! {
			biased;
			result = &mut interrupt => Some(result),
			() = std::future::ready(()) => None,
		}
	});

	match early {
		Some(result) => on_interrupt(result, &cancel),
		None => {
			runtime.spawn(async move { on_interrupt(interrupt.await, &cancel) });
		}
	}

	Ok(runtime)
}

fn on_interrupt(result: io::Result<()>, cancel: &CancellationToken) {
	match result {
		Ok(()) => {
			info!("interrupt received, stopping generation");
			cancel.cancel();
		}
		Err(e) => warn!("unable to listen for Ctrl-C: {e}"),
	}
}

fn generate(args: &GenerateArgs) -> anyhow::Result<()> {
	if !args.corpus.is_file() {
		bail!("cannot read file '{}'", args.corpus.display());
	}

	let input = args.generation_input()?;
	let pools = PoolSet::from_file(&args.corpus, input.case_mode, args.cache)
		.with_context(|| format!("failed to build pools from '{}'", args.corpus.display()))?;

	let cancel = CancellationToken::new();
	let _signal_runtime = match input.mode() {
		GenerationMode::Unbounded => {
			let runtime = install_interrupt_handler(cancel.clone())?;
			eprintln!("(Generating forever, press Ctrl-C to stop)\n");
			Some(runtime)
		}
		GenerationMode::Finite(_) => None,
	};

	let stdout = io::stdout();
	let mut out = stdout.lock();
	match run(&pools, &input, &cancel, &mut out) {
		Ok(RunOutcome::Completed { written }) => {
			info!("generated {written} names");
			Ok(())
		}
		Ok(RunOutcome::Cancelled { written }) => {
			info!("generated {written} names before interruption");
			eprintln!("\n\nExiting. Goodbye!");
			Ok(())
		}
		// Output closed by the reader (e.g. piped into `head`)
		Err(Error::Io(e)) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
		Err(e) => Err(e.into()),
	}
}

fn clean(args: &CleanArgs) -> anyhow::Result<()> {
	let written = clean_file(&args.input, &args.output, args.skip_header)
		.with_context(|| format!("failed to clean '{}'", args.input.display()))?;
	println!("Cleaned {} names into {}", written, args.output.display());
	Ok(())
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let cli = Cli::parse();
	match &cli.command {
		Command::Generate(args) => generate(args),
		Command::Clean(args) => clean(args),
	}
}
