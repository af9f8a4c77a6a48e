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

use strum_macros::{EnumIter, EnumString};

use crate::typedef::{ForecastError, Series, SeriesSource};

/// Trading days in a synthetic series.
pub(crate) const SYNTHETIC_LENGTH: usize = 100;

/// Symbol used for the demo series when nothing usable was supplied.
pub const SAMPLE_SYMBOL: &str = "SAMPLE";

/// Symbols with a hand-tuned synthetic profile.
#[derive(PartialEq, Eq, EnumIter, EnumString, Clone, Copy, Debug)]
#[strum(ascii_case_insensitive)]
pub(crate) enum KnownSymbol {
	AAPL,
	MSFT,
	GOOGL,
	AMZN,
	TSLA,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SymbolProfile {
	pub start_price: f64,
	/// Mean of the daily log-return.
	pub drift: f64,
	/// Standard deviation of the daily log-return.
	pub volatility: f64,
}

impl KnownSymbol {
	pub fn profile(self) -> SymbolProfile {
		let (start_price, drift, volatility) = match self {
			KnownSymbol::AAPL => (150.0, 0.0008, 0.018),
			KnownSymbol::MSFT => (250.0, 0.0007, 0.016),
			KnownSymbol::GOOGL => (100.0, 0.0006, 0.020),
			KnownSymbol::AMZN => (95.0, 0.0007, 0.022),
			KnownSymbol::TSLA => (200.0, 0.0010, 0.035),
		};

		SymbolProfile {
			start_price,
			drift,
			volatility,
		}
	}
}

impl Default for SymbolProfile {
	fn default() -> Self {
		Self {
			start_price: 100.0,
			drift: 0.0005,
			volatility: 0.02,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ingested {
	pub series: Series,
	pub source: SeriesSource,
	/// Why the supplied input was replaced by a synthetic series, if it was.
	pub rejected: Option<ForecastError>,
}
