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

use tracing::debug;

use super::typedef::*;
use crate::typedef::{BandPoint, ForecastError};

/// Ordinary least squares of price against the integer time index.
pub fn fit_linear(prices: &[f64]) -> Result<LinearModel, ForecastError> {
	if prices.len() < LINEAR_MIN_POINTS {
		return Err(ForecastError::InsufficientData {
			required: LINEAR_MIN_POINTS,
			actual: prices.len(),
		});
	}

	let n = prices.len() as f64;
	let sum_t: f64 = (0..prices.len()).map(|i| i as f64).sum();
	let sum_y: f64 = prices.iter().sum();
	let sum_t2: f64 = (0..prices.len()).map(|i| (i * i) as f64).sum();
	let sum_ty: f64 = prices.iter().enumerate().map(|(i, y)| i as f64 * y).sum();

	// Never zero for two or more distinct indices
	let denominator = n * sum_t2 - sum_t * sum_t;
	let slope = (n * sum_ty - sum_t * sum_y) / denominator;
	let intercept = (sum_y - slope * sum_t) / n;

	let mean_y = sum_y / n;
	let ss_tot: f64 = prices.iter().map(|y| (y - mean_y).powi(2)).sum();
	let ss_res: f64 = prices
		.iter()
		.enumerate()
		.map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
		.sum();

	let residual_std_dev = if prices.len() > LINEAR_MIN_POINTS {
		(ss_res / (n - 2f64)).sqrt()
	} else {
		0f64
	};
	let r_squared = if ss_tot > 1e-10 {
		1f64 - ss_res / ss_tot
	} else {
		1f64
	};

	debug!(slope, intercept, residual_std_dev, r_squared, "fitted linear trend");

	Ok(LinearModel {
		slope,
		intercept,
		residual_std_dev,
		r_squared,
		n_observations: prices.len(),
	})
}

impl LinearModel {
	pub fn predict_at(&self, t: f64) -> f64 {
		self.intercept + self.slope * t
	}

	/// Band half-width `h` steps past the last observation; `h = 0` is the in-sample width.
	pub fn half_width(&self, h: usize) -> f64 {
		let n = self.n_observations.max(1) as f64;
		Z_95 * self.residual_std_dev * (1f64 + h as f64 / n).sqrt()
	}

	/// Fitted values over the observed indices, for overlaying on the actuals.
	pub fn fitted(&self) -> Vec<BandPoint> {
		(0..self.n_observations)
			.map(|i| BandPoint::around(self.predict_at(i as f64), self.half_width(0)))
			.collect()
	}
}

/// Extends the trend `horizon_days` steps past the last observation.
pub fn forecast_linear(model: &LinearModel, horizon_days: usize) -> Vec<BandPoint> {
	(0..horizon_days)
		.map(|h| {
			let t = (model.n_observations + h) as f64;
			BandPoint::around(model.predict_at(t), model.half_width(h))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recovers_exact_trend() {
		let prices = [10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
		let model = fit_linear(&prices).unwrap();

		assert!((model.slope - 2.0).abs() < 1e-10);
		assert!((model.intercept - 10.0).abs() < 1e-10);
		assert!(model.residual_std_dev.abs() < 1e-10);

		let forecast = forecast_linear(&model, 3);
		assert!((forecast[0].predicted - 22.0).abs() < 1e-9);
		assert!((forecast[2].predicted - 26.0).abs() < 1e-9);
	}

	#[test]
	fn band_widens_with_horizon() {
		let prices = [100.0, 103.0, 99.0, 105.0, 102.0, 108.0, 104.0];
		let model = fit_linear(&prices).unwrap();
		let forecast = forecast_linear(&model, 30);

		assert!(model.residual_std_dev > 0f64);
		forecast.windows(2).for_each(|pair| {
			assert!(pair[1].upper - pair[1].predicted >= pair[0].upper - pair[0].predicted);
		});
		forecast
			.iter()
			.for_each(|each| assert!(each.lower <= each.predicted && each.predicted <= each.upper));
	}

	#[test]
	fn fitted_values_cover_history() {
		let prices = [100.0, 102.0, 99.0];
		let model = fit_linear(&prices).unwrap();
		let fitted = model.fitted();

		assert_eq!(fitted.len(), 3);
		assert!((model.slope + 0.5).abs() < 1e-10);
		assert!((fitted[0].predicted - 100.0 - 5f64 / 6f64).abs() < 1e-9);
	}

	#[test]
	fn single_point_is_insufficient() {
		assert_eq!(
			fit_linear(&[1.0]),
			Err(ForecastError::InsufficientData {
				required: 2,
				actual: 1
			})
		);
	}

	#[test]
	fn zero_horizon_is_empty() {
		let model = fit_linear(&[1.0, 2.0]).unwrap();
		assert!(forecast_linear(&model, 0).is_empty());
	}
}
