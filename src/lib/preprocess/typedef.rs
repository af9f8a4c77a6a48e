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

/// Min-max bounds of one series, owned by a single forecasting run.
#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct NormalParam {
	pub min: f64,
	pub max: f64,
}

impl NormalParam {
	fn span(&self) -> f64 {
		self.max - self.min
	}

	/// Maps a price into `[0, 1]`; a constant series maps to `0.5`.
	pub fn scale(&self, price: f64) -> f64 {
		let span = self.span();
		if span > 0f64 {
			(price - self.min) / span
		} else {
			0.5
		}
	}

	pub fn unscale(&self, value: f64) -> f64 {
		value * self.span() + self.min
	}

	/// Converts a width measured in normalized units back into price units.
	pub fn unscale_width(&self, width: f64) -> f64 {
		width * self.span()
	}
}

/// `inputs` are consecutive normalized prices, `label` is the one right after.
#[derive(Default, Serialize, Clone, Debug, PartialEq)]
pub struct Window {
	pub inputs: Vec<f64>,
	pub label: f64,
}
