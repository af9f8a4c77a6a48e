/*
 * Project::Tarot, a simple LSTM implementation with GUI
 * Copyright (C) 2025 Athaariq A. Ramadhani <foss@athaariq.my.id>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Command-line front end: forecast a CSV file or a synthetic symbol and print the result as JSON.

use anyhow::{anyhow, Context, Result};
use burn::config::Config;
use clap::Parser;
use std::{fs::File, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tarot_forecast_lib::{
	forecast_with_cancel, write_table_csv, CancelToken, ForecastConfig, ForecastRequest, ModelKind,
};

/// Forecast a price history with a linear trend or an LSTM network
///
/// # Example
///
/// ```bash
/// tarot-forecast --csv prices.csv --horizon 30 --model lstm --output table.csv
/// ```
#[derive(Parser, Debug)]
#[command(name = "tarot-forecast", version, about)]
struct Cli {
	/// CSV file with a header row and `YYYY-MM-DD,price` rows
	#[arg(long)]
	csv: Option<PathBuf>,

	/// Symbol to synthesize a history for when no CSV is given
	#[arg(long, short = 's')]
	symbol: Option<String>,

	/// Days to forecast past the last observation
	#[arg(long, short = 'd', default_value = "7")]
	horizon: usize,

	/// `linear`, `sequence` or `lstm`
	#[arg(long, short = 'm', default_value = "sequence")]
	model: ModelKind,

	/// Forecast configuration file (JSON format)
	#[arg(long, short = 'c', env = "TAROT_CONFIG_PATH")]
	config: Option<PathBuf>,

	/// Write the forecast table to this CSV file
	#[arg(long, short = 'o')]
	output: Option<PathBuf>,

	/// Pretty-print the JSON result
	#[arg(long, default_value = "false")]
	pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(EnvFilter::from_default_env().add_directive("tarot_forecast_lib=info".parse()?))
		.init();

	let cli = Cli::parse();

	let config = match &cli.config {
		Some(path) => ForecastConfig::load(path)
			.map_err(|err| anyhow!("cannot load config {}: {:?}", path.display(), err))?,
		None => ForecastConfig::default(),
	};

	let csv = match &cli.csv {
		Some(path) => Some(
			std::fs::read_to_string(path)
				.with_context(|| format!("cannot read {}", path.display()))?,
		),
		None => None,
	};

	let request = ForecastRequest {
		csv,
		symbol: cli.symbol.clone(),
		horizon_days: cli.horizon,
		model: cli.model,
	};

	let cancel = CancelToken::new();
	let interrupt = {
		let cancel = cancel.clone();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				warn!("interrupted, cancelling training");
				cancel.cancel();
			}
		})
	};

	let outcome = forecast_with_cancel(request, &config, cancel).await;
	interrupt.abort();
	let outcome = outcome?;

	for notice in outcome.notices.iter() {
		warn!(title = %notice.title, "{}", notice.message);
	}

	if let Some(path) = &cli.output {
		let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
		write_table_csv(&outcome.result, file)?;
		info!(path = %path.display(), "wrote forecast table");
	}

	let json = if cli.pretty {
		serde_json::to_string_pretty(&outcome)?
	} else {
		serde_json::to_string(&outcome)?
	};
	println!("{}", json);

	Ok(())
}
