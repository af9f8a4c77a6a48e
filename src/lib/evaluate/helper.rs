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

use burn::{
	backend::ndarray::NdArrayDevice,
	tensor::{Tensor, TensorData},
};
use chrono::{Days, NaiveDate};

use crate::preprocess::typedef::Window;
use crate::train::helper::windows_to_tensors;
use crate::train::model::LstmNetwork;
use crate::train::typedef::InferBackend;

const MAX_CONFIDENCE: u32 = 95;
const MIN_CONFIDENCE: u32 = 50;

/// One-step predictions for every window, batched through a single forward pass.
pub(super) fn predict_windows(model: &LstmNetwork<InferBackend>, windows: &[Window]) -> Vec<f64> {
	if windows.is_empty() {
		return Vec::new();
	}

	let device = NdArrayDevice::Cpu;
	let (inputs, _) = windows_to_tensors::<InferBackend>(windows, &device);

	let data = model.forward(inputs).into_data();
	data.iter::<f64>().collect()
}

/// Feeds every prediction back as the newest input, dropping the oldest one.
///
/// Errors compound with each step; nothing corrects the fed-back values.
pub(super) fn rollout(
	model: &LstmNetwork<InferBackend>,
	seed: &[f64],
	horizon_days: usize,
) -> Vec<f64> {
	if horizon_days == 0 || seed.is_empty() {
		return Vec::new();
	}

	let device = NdArrayDevice::Cpu;
	let length = seed.len();

	// We will shift the sequence and modify its end element in this tensor
	let mut tensor = Tensor::<InferBackend, 3>::from_data(
		TensorData::new(
			seed.iter().map(|each| *each as f32).collect::<Vec<_>>(),
			[1, length, 1],
		),
		&device,
	);

	let future_tensors = (0..horizon_days)
		.map(|_| {
			let predicted = model.forward(tensor.clone());
			let newest = predicted.clone().reshape([1, 1, 1]);

			tensor = if length > 1 {
				Tensor::cat(vec![tensor.clone().narrow(1, 1, length - 1), newest], 1)
			} else {
				newest
			};

			predicted.flatten::<1>(0, 1)
		})
		.collect::<Vec<_>>();

	let data = Tensor::cat(future_tensors, 0).into_data();
	data.iter::<f64>().collect()
}

/// Empirical `quantile` of absolute residuals; no distribution is assumed.
pub(super) fn residual_quantile(residuals: &[f64], quantile: f64) -> f64 {
	if residuals.is_empty() {
		return 0f64;
	}

	let mut magnitudes = residuals.iter().map(|each| each.abs()).collect::<Vec<_>>();
	magnitudes.sort_by(|a, b| a.total_cmp(b));

	let rank = (quantile.clamp(0f64, 1f64) * magnitudes.len() as f64).ceil() as usize;
	magnitudes[rank.clamp(1, magnitudes.len()) - 1]
}

pub(super) fn confidence_percent(days_ahead: usize) -> u32 {
	let penalty = u32::try_from(days_ahead.saturating_mul(2)).unwrap_or(u32::MAX);
	MAX_CONFIDENCE.saturating_sub(penalty).max(MIN_CONFIDENCE)
}

pub(super) fn change_percent(previous: f64, current: f64) -> f64 {
	if previous == 0f64 {
		0f64
	} else {
		(current - previous) / previous * 100f64
	}
}

/// Consecutive calendar days after `last`, weekends included.
pub(super) fn future_dates(last: NaiveDate, horizon_days: usize) -> Vec<NaiveDate> {
	(1..=horizon_days as u64)
		.filter_map(|offset| last.checked_add_days(Days::new(offset)))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::train::command::{
		fit_sequence,
		tests::{tiny_config, wave_windows},
	};
	use crate::train::model::LstmNetworkConfig;
	use crate::train::typedef::CancelToken;

	#[test]
	fn inference_ignores_dropout() {
		let (training, testing) = wave_windows();
		let mut config = tiny_config();
		config.model = LstmNetworkConfig::new()
			.with_hidden_size(4)
			.with_num_layers(2)
			.with_dropout(0.5);
		let fit = fit_sequence(&training, &testing, &config, &CancelToken::new()).unwrap();

		assert_eq!(
			predict_windows(&fit.model, &testing),
			predict_windows(&fit.model, &testing)
		);

		let seed = &testing[0].inputs;
		let first = rollout(&fit.model, seed, 6);
		assert_eq!(first.len(), 6);
		assert_eq!(first, rollout(&fit.model, seed, 6));
	}

	#[test]
	fn confidence_decreases_to_floor() {
		assert_eq!(confidence_percent(0), 95);
		assert_eq!(confidence_percent(1), 93);
		assert_eq!(confidence_percent(10), 75);
		assert_eq!(confidence_percent(40), 50);
		assert_eq!(confidence_percent(usize::MAX), 50);
	}

	#[test]
	fn quantile_picks_from_sorted_magnitudes() {
		let residuals = [-0.4, 0.1, 0.2, -0.3];

		assert_eq!(residual_quantile(&residuals, 0.5), 0.2);
		assert_eq!(residual_quantile(&residuals, 0.95), 0.4);
		assert_eq!(residual_quantile(&residuals, 0.0), 0.1);
		assert_eq!(residual_quantile(&[], 0.95), 0.0);
	}

	#[test]
	fn future_dates_follow_calendar() {
		let last = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
		let dates = future_dates(last, 3);

		assert_eq!(
			dates,
			vec![
				NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
				NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
				NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
			]
		);
	}

	#[test]
	fn change_of_zero_base_is_zero() {
		assert_eq!(change_percent(0.0, 5.0), 0.0);
		assert!((change_percent(100.0, 102.0) - 2.0).abs() < 1e-12);
	}
}
