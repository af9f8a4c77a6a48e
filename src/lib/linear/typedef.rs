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

use serde::Serialize;

/// Two-sided 95% quantile of the standard normal distribution.
pub(crate) const Z_95: f64 = 1.96;

/// Fewest observations an ordinary least squares line can be drawn through.
pub const LINEAR_MIN_POINTS: usize = 2;

/// `price = intercept + slope * t` where `t` is the zero-based observation index.
#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinearModel {
	pub slope: f64,
	pub intercept: f64,
	pub residual_std_dev: f64,
	pub r_squared: f64,
	pub n_observations: usize,
}
