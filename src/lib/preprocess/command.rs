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

use super::typedef::*;
use crate::typedef::ForecastError;

pub fn fit_normalizer(prices: &[f64]) -> Result<NormalParam, ForecastError> {
	if prices.is_empty() {
		return Err(ForecastError::InsufficientData {
			required: 1,
			actual: 0,
		});
	}

	let (min, max) = prices
		.iter()
		.fold((f64::MAX, f64::MIN), |(min, max), each| {
			(min.min(*each), max.max(*each))
		});

	Ok(NormalParam { min, max })
}

pub fn normalize(param: &NormalParam, prices: &[f64]) -> Vec<f64> {
	prices.iter().map(|each| param.scale(*each)).collect()
}

pub fn denormalize(param: &NormalParam, values: &[f64]) -> Vec<f64> {
	values.iter().map(|each| param.unscale(*each)).collect()
}

/// Slides a window of `window_length` over the series, one step at a time.
pub fn build_windows(
	normalized: &[f64],
	window_length: usize,
) -> Result<Vec<Window>, ForecastError> {
	if window_length == 0 {
		return Err(ForecastError::InvalidParameter {
			name: "window_length",
			reason: String::from("must be at least 1"),
		});
	}

	if normalized.len() <= window_length {
		return Err(ForecastError::InsufficientData {
			required: window_length + 1,
			actual: normalized.len(),
		});
	}

	let windows = normalized
		.windows(window_length + 1)
		.map(|slice| Window {
			inputs: slice[..window_length].to_vec(),
			label: slice[window_length],
		})
		.collect();

	Ok(windows)
}

/// Chronological split: the first `floor(n * train_fraction)` windows train, the rest test.
/// Order is never shuffled.
pub fn split_windows(windows: &[Window], train_fraction: f64) -> (&[Window], &[Window]) {
	let fraction = train_fraction.clamp(0f64, 1f64);
	let cut = ((windows.len() as f64 * fraction).floor() as usize).min(windows.len());

	windows.split_at(cut)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trip_restores_prices() {
		let prices = vec![101.5, 99.25, 130.0, 87.75, 100.0];
		let param = fit_normalizer(&prices).unwrap();
		let normalized = normalize(&param, &prices);

		assert!(normalized.iter().all(|each| (0f64..=1f64).contains(each)));
		denormalize(&param, &normalized)
			.iter()
			.zip(&prices)
			.for_each(|(restored, original)| assert!((restored - original).abs() < 1e-9));
	}

	#[test]
	fn constant_series_maps_to_half() {
		let prices = vec![42.0; 4];
		let param = fit_normalizer(&prices).unwrap();
		let normalized = normalize(&param, &prices);

		assert_eq!(normalized, vec![0.5; 4]);
		assert_eq!(denormalize(&param, &normalized), prices);
	}

	#[test]
	fn empty_series_cannot_be_fitted() {
		assert!(matches!(
			fit_normalizer(&[]),
			Err(ForecastError::InsufficientData { .. })
		));
	}

	#[test]
	fn windows_pair_inputs_with_next_value() {
		let series = [0.0, 0.1, 0.2, 0.3, 0.4];
		let windows = build_windows(&series, 3).unwrap();

		assert_eq!(windows.len(), 2);
		assert_eq!(windows[0].inputs, vec![0.0, 0.1, 0.2]);
		assert_eq!(windows[0].label, 0.3);
		assert_eq!(windows[1].label, 0.4);
	}

	#[test]
	fn windows_need_more_points_than_length() {
		assert_eq!(
			build_windows(&[0.0, 1.0, 0.5], 3),
			Err(ForecastError::InsufficientData {
				required: 4,
				actual: 3
			})
		);
		assert!(matches!(
			build_windows(&[0.0, 1.0], 0),
			Err(ForecastError::InvalidParameter { .. })
		));
	}

	#[test]
	fn split_is_chronological_and_complete() {
		let series = (0..40).map(|i| i as f64 / 40f64).collect::<Vec<_>>();
		let windows = build_windows(&series, 5).unwrap();
		let (training, testing) = split_windows(&windows, 0.8);

		assert_eq!(training.len() + testing.len(), windows.len());
		assert_eq!(training.len(), (windows.len() as f64 * 0.8).floor() as usize);

		let last_train = training.last().unwrap().label;
		assert!(testing.iter().all(|each| each.label > last_train));
	}
}
