#![recursion_limit = "256"]

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

//! Price history forecasting.
//!
//! A request flows through ingestion, min-max normalization and windowing
//! into either a least-squares trend or an LSTM network, and comes back as a
//! [`ForecastOutcome`] holding the chart series, the table rows and every
//! error that was absorbed on the way.

use tracing::{info, warn};

mod typedef;
pub use typedef::*;

mod data;
mod evaluate;
mod linear;
mod preprocess;
mod train;

pub use data::command::ingest;
pub use data::typedef::{Ingested, SAMPLE_SYMBOL};
pub use evaluate::command::*;
pub use evaluate::typedef::*;
pub use linear::command::*;
pub use linear::typedef::{LinearModel, LINEAR_MIN_POINTS};
pub use preprocess::command::*;
pub use preprocess::typedef::*;
pub use train::command::{fit_sequence, spawn_training, TrainingHandle};
pub use train::model::{LstmNetwork, LstmNetworkConfig};
pub use train::typedef::{CancelToken, IterativePoint, SequenceFit, TrainingConfig, TrainingReport};

/// Runs one forecast request to completion.
pub async fn forecast(
	request: ForecastRequest,
	config: &ForecastConfig,
) -> Result<ForecastOutcome, ForecastError> {
	forecast_with_cancel(request, config, CancelToken::new()).await
}

/// Like [`forecast`], but `cancel` can stop the sequence fit, which then falls
/// back to the linear trend.
///
/// Unusable input text is replaced by a synthetic series and any failure of the
/// sequence model falls back to the linear trend; both are listed in
/// `notices`. Only invalid parameters and failures of the linear model itself
/// are returned as errors.
pub async fn forecast_with_cancel(
	request: ForecastRequest,
	config: &ForecastConfig,
	cancel: CancelToken,
) -> Result<ForecastOutcome, ForecastError> {
	validate(&request, config)?;

	let min_points = match request.model {
		ModelKind::Linear => LINEAR_MIN_POINTS,
		ModelKind::Sequence => config.window_length + 1,
	};

	let mut notices = Vec::<ErrorInfo>::new();
	let Ingested {
		series,
		source,
		rejected,
	} = ingest(
		request.csv.as_deref(),
		request.symbol.as_deref(),
		min_points,
	)?;
	if let Some(err) = rejected.as_ref() {
		notices.push(ErrorInfo::from(err));
	}

	info!(
		points = series.len(),
		horizon_days = request.horizon_days,
		model = %request.model,
		"forecasting"
	);

	if request.model == ModelKind::Sequence {
		match sequence_path(&series, request.horizon_days, config, cancel).await {
			Ok((result, report)) => {
				return Ok(outcome(
					result,
					source,
					notices,
					Some(report),
				))
			}
			Err(err) => {
				warn!(error = %err, "sequence model unusable, falling back to linear trend");
				notices.push(ErrorInfo::from(&err));
			}
		}
	}

	let result = linear_path(&series, request.horizon_days, config)?;
	Ok(outcome(result, source, notices, None))
}

fn validate(request: &ForecastRequest, config: &ForecastConfig) -> Result<(), ForecastError> {
	if request.horizon_days == 0 || request.horizon_days > config.max_horizon {
		return Err(ForecastError::InvalidParameter {
			name: "horizon_days",
			reason: format!(
				"{} is outside 1..={}",
				request.horizon_days, config.max_horizon
			),
		});
	}

	if !(config.train_fraction > 0f64 && config.train_fraction < 1f64) {
		return Err(ForecastError::InvalidParameter {
			name: "train_fraction",
			reason: format!("{} is outside (0, 1)", config.train_fraction),
		});
	}

	if config.window_length == 0 {
		return Err(ForecastError::InvalidParameter {
			name: "window_length",
			reason: String::from("must be at least 1"),
		});
	}

	if !config.band_growth.is_finite() || config.band_growth < 0f64 {
		return Err(ForecastError::InvalidParameter {
			name: "band_growth",
			reason: format!("{} is not a finite non-negative number", config.band_growth),
		});
	}

	if config.training.epochs == 0 {
		return Err(ForecastError::InvalidParameter {
			name: "epochs",
			reason: String::from("must be at least 1"),
		});
	}

	if !(0f64..=1f64).contains(&config.band_quantile) {
		return Err(ForecastError::InvalidParameter {
			name: "band_quantile",
			reason: format!("{} is outside [0, 1]", config.band_quantile),
		});
	}

	Ok(())
}

fn linear_path(
	series: &Series,
	horizon_days: usize,
	config: &ForecastConfig,
) -> Result<ForecastResult, ForecastError> {
	let model = fit_linear(&series.prices())?;
	let output = ModelOutput {
		fitted: model.fitted(),
		forecast: forecast_linear(&model, horizon_days),
	};

	Ok(assemble(
		series,
		None,
		&output,
		None,
		ModelKind::Linear,
		config,
	))
}

async fn sequence_path(
	series: &Series,
	horizon_days: usize,
	config: &ForecastConfig,
	cancel: CancelToken,
) -> Result<(ForecastResult, TrainingReport), ForecastError> {
	let prices = series.prices();
	let param = fit_normalizer(&prices)?;
	let normalized = normalize(&param, &prices);
	let windows = build_windows(&normalized, config.window_length)?;
	let (training, testing) = split_windows(&windows, config.train_fraction);
	let train_count = training.len();

	let handle = spawn_training(
		training.to_vec(),
		testing.to_vec(),
		config.training.clone(),
		cancel,
	);
	let fit = handle.join().await?;

	let sequence = sequence_output(
		&fit,
		&normalized,
		&windows,
		train_count,
		horizon_days,
		config,
	);

	let mut report = fit.report;
	report.residual_spread = param.unscale_width(sequence.base_spread);

	let result = assemble(
		series,
		Some(&param),
		&sequence.output,
		Some(&sequence.segments),
		ModelKind::Sequence,
		config,
	);

	Ok((result, report))
}

fn outcome(
	result: ForecastResult,
	source: SeriesSource,
	notices: Vec<ErrorInfo>,
	training: Option<TrainingReport>,
) -> ForecastOutcome {
	let (high_peak, low_peak) = forecast_peaks(&result);

	ForecastOutcome {
		model_used: result.model,
		result,
		source,
		notices,
		training,
		high_peak,
		low_peak,
	}
}
