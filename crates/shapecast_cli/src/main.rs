#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "shapecast", about = "Structural cast inspection tools")]
struct Cli {
	/// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List and describe record shapes from a shape file.
	Shapes(cmd::shapes::Args),
	/// Cast a JSON document to a declared type.
	Cast(cmd::cast::Args),
}

fn main() {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> shapecast::cast::Result<()> {
	match command {
		Commands::Shapes(args) => cmd::shapes::run(args),
		Commands::Cast(args) => cmd::cast::run(args),
	}
}

fn setup_tracing(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(match verbose {
			0 => "warn",
			1 => "shapecast=debug,warn",
			_ => "shapecast=trace,debug",
		})
	});

	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).try_init();
}
