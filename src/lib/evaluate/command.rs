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

use std::io::Write;
use tracing::debug;

use super::helper::*;
use super::typedef::*;
use crate::preprocess::typedef::{NormalParam, Window};
use crate::train::typedef::SequenceFit;
use crate::typedef::{BandPoint, ForecastConfig, ModelKind, Series};

/// Autoregressive forecast of `horizon_days` normalized values from the last window.
pub fn forecast_sequence(fit: &SequenceFit, seed_window: &[f64], horizon_days: usize) -> Vec<f64> {
	rollout(&fit.model, seed_window, horizon_days)
}

/// Builds in-sample and forecast bands for a trained sequence model.
///
/// `windows` must be every window of `normalized` in order, with the first
/// `train_count` of them used for training. The band base is the configured
/// quantile of absolute residuals on the remaining testing windows and widens
/// by `band_growth` per forecast step.
pub fn sequence_output(
	fit: &SequenceFit,
	normalized: &[f64],
	windows: &[Window],
	train_count: usize,
	horizon_days: usize,
	config: &ForecastConfig,
) -> SequenceOutput {
	let window_length = normalized.len() - windows.len();
	let one_step = predict_windows(&fit.model, windows);

	let residuals = one_step
		.iter()
		.zip(windows.iter())
		.skip(train_count)
		.map(|(predicted, window)| predicted - window.label)
		.collect::<Vec<_>>();
	let base_spread = residual_quantile(&residuals, config.band_quantile);

	// Warm-up points have no window behind them and echo the actual value
	let fitted = normalized
		.iter()
		.take(window_length)
		.map(|actual| BandPoint::around(*actual, 0f64))
		.chain(
			one_step
				.iter()
				.map(|predicted| BandPoint::around(*predicted, base_spread)),
		)
		.collect::<Vec<_>>();

	let seed_window = &normalized[normalized.len() - window_length..];
	let forecast = forecast_sequence(fit, seed_window, horizon_days)
		.into_iter()
		.enumerate()
		.map(|(h, predicted)| {
			BandPoint::around(predicted, base_spread * (1f64 + config.band_growth * h as f64))
		})
		.collect::<Vec<_>>();

	debug!(base_spread, residuals = residuals.len(), "built sequence bands");

	SequenceOutput {
		output: ModelOutput { fitted, forecast },
		segments: Segments {
			train: window_length..window_length + train_count,
			test: window_length + train_count..normalized.len(),
		},
		base_spread,
	}
}

/// Merges the observed series with model output into the result shown to the user.
///
/// With `param` the bands are taken as normalized and mapped back to prices.
pub fn assemble(
	series: &Series,
	param: Option<&NormalParam>,
	output: &ModelOutput,
	segments: Option<&Segments>,
	model: ModelKind,
	config: &ForecastConfig,
) -> ForecastResult {
	let observed = series.len();
	let horizon_days = output.forecast.len();

	let bands = output
		.fitted
		.iter()
		.chain(output.forecast.iter())
		.map(|band| match param {
			Some(param) => BandPoint {
				predicted: param.unscale(band.predicted),
				lower: param.unscale(band.lower),
				upper: param.unscale(band.upper),
			},
			None => *band,
		})
		.collect::<Vec<_>>();

	let labels = series
		.dates()
		.into_iter()
		.chain(
			series
				.last_date()
				.map(|last| future_dates(last, horizon_days))
				.unwrap_or_default(),
		)
		.collect::<Vec<_>>();

	let actual = series
		.prices()
		.into_iter()
		.map(Some)
		.chain(std::iter::repeat(None).take(horizon_days))
		.collect::<Vec<_>>();

	let in_segment = |range: Option<&std::ops::Range<usize>>| {
		actual
			.iter()
			.enumerate()
			.map(|(i, each)| match range {
				Some(range) if range.contains(&i) => *each,
				_ => None,
			})
			.collect::<Vec<_>>()
	};
	let training = in_segment(segments.map(|found| &found.train));
	let testing = in_segment(segments.map(|found| &found.test));

	let first_row = observed.saturating_sub(config.table_history_rows);
	let table_rows = (first_row..labels.len().min(bands.len()))
		.map(|i| {
			let band = bands[i];
			let days_ahead = (i + 1).saturating_sub(observed);
			let change = if i > first_row {
				change_percent(bands[i - 1].predicted, band.predicted)
			} else {
				0f64
			};

			TableRow {
				date: labels[i],
				actual: actual[i],
				predicted: band.predicted,
				lower: band.lower,
				upper: band.upper,
				confidence_percent: confidence_percent(days_ahead),
				change_percent: change,
			}
		})
		.collect::<Vec<_>>();

	ForecastResult {
		model,
		labels,
		actual,
		predicted: bands.iter().map(|each| each.predicted).collect(),
		upper: bands.iter().map(|each| each.upper).collect(),
		lower: bands.iter().map(|each| each.lower).collect(),
		training,
		testing,
		table_rows,
	}
}

/// Highest and lowest predicted rows among the future days.
pub fn forecast_peaks(result: &ForecastResult) -> (Option<TableRow>, Option<TableRow>) {
	let [high_peak, low_peak] = result
		.table_rows
		.iter()
		.filter(|each| each.actual.is_none())
		.fold([Option::<&TableRow>::None; 2], |[last_max, last_min], each| {
			let max = match last_max {
				Some(found) if found.predicted >= each.predicted => found,
				_ => each,
			};
			let min = match last_min {
				Some(found) if found.predicted <= each.predicted => found,
				_ => each,
			};

			[Some(max), Some(min)]
		});

	(high_peak.cloned(), low_peak.cloned())
}

/// Writes the table rows as CSV, prices rounded to cents.
pub fn write_table_csv<W: Write>(
	result: &ForecastResult,
	destination: W,
) -> Result<(), csv::Error> {
	let mut writer = csv::Writer::from_writer(destination);

	writer.write_record([
		"Date",
		"Actual",
		"Predicted",
		"Lower",
		"Upper",
		"Confidence",
		"Change",
	])?;

	for each in result.table_rows.iter() {
		writer.write_record([
			each.date.to_string(),
			each.actual
				.map(|found| format!("{:.2}", found))
				.unwrap_or_default(),
			format!("{:.2}", each.predicted),
			format!("{:.2}", each.lower),
			format!("{:.2}", each.upper),
			each.confidence_percent.to_string(),
			format!("{:.2}", each.change_percent),
		])?;
	}

	writer.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linear::command::{fit_linear, forecast_linear};
	use crate::preprocess::command::{build_windows, fit_normalizer, normalize, split_windows};
	use crate::train::command::{fit_sequence, tests::tiny_config};
	use crate::train::typedef::CancelToken;
	use crate::typedef::ObservedPoint;
	use chrono::NaiveDate;

	fn series_of(prices: &[f64]) -> Series {
		let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
		let points = prices
			.iter()
			.enumerate()
			.map(|(i, price)| ObservedPoint {
				date: start + chrono::Days::new(i as u64),
				price: *price,
			})
			.collect();

		Series::new(points).unwrap()
	}

	fn linear_result(prices: &[f64], horizon_days: usize) -> ForecastResult {
		let series = series_of(prices);
		let model = fit_linear(&series.prices()).unwrap();
		let output = ModelOutput {
			fitted: model.fitted(),
			forecast: forecast_linear(&model, horizon_days),
		};

		assemble(
			&series,
			None,
			&output,
			None,
			ModelKind::Linear,
			&ForecastConfig::default(),
		)
	}

	#[test]
	fn labels_extend_past_history() {
		let result = linear_result(&[100.0, 102.0, 99.0], 2);

		assert_eq!(result.labels.len(), 5);
		assert_eq!(result.actual[2], Some(99.0));
		assert_eq!(result.actual[3], None);
		assert_eq!(result.predicted.len(), 5);
		assert_eq!(
			result.labels[3],
			NaiveDate::from_ymd_opt(2023, 1, 4).unwrap()
		);
	}

	#[test]
	fn table_rows_carry_confidence_and_change() {
		let result = linear_result(&[100.0, 101.0, 103.0, 104.0, 106.0, 107.0, 109.0], 3);
		let rows = &result.table_rows;

		// five historical rows plus three forecast rows
		assert_eq!(rows.len(), 8);
		assert_eq!(rows[0].change_percent, 0.0);
		assert_eq!(rows[4].confidence_percent, 95);
		assert_eq!(rows[5].confidence_percent, 93);
		assert_eq!(rows[7].confidence_percent, 89);

		let expected = (rows[6].predicted - rows[5].predicted) / rows[5].predicted * 100f64;
		assert!((rows[6].change_percent - expected).abs() < 1e-12);
	}

	#[test]
	fn peaks_come_from_forecast_rows() {
		let result = linear_result(&[100.0, 98.0, 97.0, 95.0], 4);
		let (high, low) = forecast_peaks(&result);

		assert_eq!(high.unwrap().date, result.labels[4]);
		assert_eq!(low.unwrap().date, result.labels[7]);
	}

	#[test]
	fn csv_export_has_header_and_rows() {
		let result = linear_result(&[100.0, 102.0, 99.0], 1);
		let mut buffer = Vec::<u8>::new();
		write_table_csv(&result, &mut buffer).unwrap();

		let text = String::from_utf8(buffer).unwrap();
		let lines = text.lines().collect::<Vec<_>>();

		assert_eq!(lines[0], "Date,Actual,Predicted,Lower,Upper,Confidence,Change");
		assert_eq!(lines.len(), 1 + result.table_rows.len());
		assert!(lines[1].starts_with("2023-01-01,100.00,"));
		assert!(lines.last().unwrap().starts_with("2023-01-04,,"));
	}

	#[test]
	fn sequence_output_unscales_and_widens() {
		let prices = (0..30)
			.map(|i| 100f64 + 10f64 * (i as f64 / 3f64).sin())
			.collect::<Vec<_>>();
		let series = series_of(&prices);
		let param = fit_normalizer(&prices).unwrap();
		let normalized = normalize(&param, &prices);
		let windows = build_windows(&normalized, 5).unwrap();
		let (training, testing) = split_windows(&windows, 0.8);
		let fit = fit_sequence(training, testing, &tiny_config(), &CancelToken::new()).unwrap();

		let config = ForecastConfig::default();
		let sequence = sequence_output(&fit, &normalized, &windows, training.len(), 4, &config);
		assert_eq!(sequence.output.fitted.len(), prices.len());
		assert_eq!(sequence.output.forecast.len(), 4);
		assert_eq!(sequence.segments.test.end, prices.len());

		let widths = sequence
			.output
			.forecast
			.iter()
			.map(|each| each.upper - each.predicted)
			.collect::<Vec<_>>();
		widths
			.windows(2)
			.for_each(|pair| assert!(pair[1] >= pair[0] - 1e-12));

		let result = assemble(
			&series,
			Some(&param),
			&sequence.output,
			Some(&sequence.segments),
			ModelKind::Sequence,
			&config,
		);
		assert!((result.predicted[0] - prices[0]).abs() < 1e-9);
		assert_eq!(result.upper[0], result.lower[0]);
		assert_eq!(result.training[4], None);
		assert_eq!(result.training[5], Some(prices[5]));
		assert_eq!(result.testing[29], Some(prices[29]));
	}

	#[test]
	fn zero_horizon_leaves_history_untouched() {
		let prices = (0..30)
			.map(|i| 50f64 + (i as f64 / 2f64).cos())
			.collect::<Vec<_>>();
		let param = fit_normalizer(&prices).unwrap();
		let normalized = normalize(&param, &prices);
		let windows = build_windows(&normalized, 5).unwrap();
		let (training, testing) = split_windows(&windows, 0.8);
		let fit = fit_sequence(training, testing, &tiny_config(), &CancelToken::new()).unwrap();

		assert!(forecast_sequence(&fit, &normalized[25..], 0).is_empty());

		let config = ForecastConfig::default();
		let empty = sequence_output(&fit, &normalized, &windows, training.len(), 0, &config);
		let longer = sequence_output(&fit, &normalized, &windows, training.len(), 3, &config);
		assert!(empty.output.forecast.is_empty());
		assert_eq!(empty.output.fitted, longer.output.fitted);
	}
}
