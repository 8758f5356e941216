use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use scout_domain::{ConversationTurn, RetrievedSnippet};
use scout_engine::SearchEngine;

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Decide whether the question needs an external search.
	Decide(QuestionArgs),
	/// Decide, plan and run the external search.
	Search(QuestionArgs),
}

#[derive(Debug, clap::Args)]
pub struct QuestionArgs {
	#[arg(long, short = 'q')]
	pub question: String,
	/// JSON file with `retrieval` snippets and conversation `history`.
	#[arg(long, value_name = "FILE")]
	pub context: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Context {
	#[serde(default)]
	pub retrieval: Vec<RetrievedSnippet>,
	#[serde(default)]
	pub history: Vec<ConversationTurn>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = scout_config::load(&args.config)?;
	init_tracing(&config)?;
	tracing::info!(config = %args.config.display(), "Configuration loaded.");
	let engine = SearchEngine::new(config);

	let report = match &args.command {
		Command::Decide(question_args) => {
			let context = load_context(question_args.context.as_deref())?;
			let decision = engine
				.decide_search_strategy(
					&question_args.question,
					&context.retrieval,
					&context.history,
				)
				.await?;

			serde_json::json!({ "decision": decision, "system_stats": engine.system_stats() })
		},
		Command::Search(question_args) => {
			let context = load_context(question_args.context.as_deref())?;
			let outcome = engine
				.execute_complete_search(
					&question_args.question,
					&context.retrieval,
					&context.history,
				)
				.await?;

			serde_json::json!({ "outcome": outcome, "system_stats": engine.system_stats() })
		},
	};

	println!("{}", serde_json::to_string_pretty(&report)?);
	Ok(())
}

pub fn parse_context(raw: &str) -> color_eyre::Result<Context> {
	let context: Context = serde_json::from_str(raw).wrap_err("Context file is not valid JSON.")?;

	if context.retrieval.iter().any(|snippet| snippet.content.trim().is_empty()) {
		return Err(eyre::eyre!("Context retrieval snippets must have non-empty content."));
	}

	Ok(context)
}

fn load_context(path: Option<&Path>) -> color_eyre::Result<Context> {
	let Some(path) = path else {
		return Ok(Context::default());
	};
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read context file at {}.", path.display()))?;

	parse_context(&raw)
}

fn init_tracing(config: &scout_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}
