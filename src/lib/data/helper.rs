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

use chrono::{Datelike, Days, NaiveDate, Weekday};
use csv::StringRecord;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::str::FromStr;

use super::typedef::*;
use crate::typedef::{ForecastError, ObservedPoint, Series};

const DATE_FORMAT: &str = "%Y-%m-%d";

// Preferred price headers, most specific first
const PRICE_HEADERS: [&str; 3] = ["close", "adj close", "price"];

pub(super) fn parse_csv(raw: &str) -> Vec<ObservedPoint> {
	let mut reader = csv::ReaderBuilder::new()
		.has_headers(true)
		.flexible(true)
		.trim(csv::Trim::All)
		.from_reader(raw.as_bytes());

	let (date_index, price_index) = match reader.headers() {
		Ok(headers) => locate_columns(headers),
		Err(_) => return Vec::new(),
	};

	let points = reader
		.records()
		.filter_map(|record| parse_row(&record.ok()?, date_index, price_index))
		.collect::<Vec<_>>();

	into_ordered(points)
}

fn locate_columns(headers: &StringRecord) -> (usize, usize) {
	let find = |name: &str| {
		headers
			.iter()
			.position(|each| each.eq_ignore_ascii_case(name))
	};

	let date_index = find("date").unwrap_or(0);
	let price_index = PRICE_HEADERS
		.iter()
		.find_map(|name| find(*name))
		.filter(|found| *found != date_index)
		.unwrap_or(if date_index == 1 { 0 } else { 1 });

	(date_index, price_index)
}

fn parse_row(
	record: &StringRecord,
	date_index: usize,
	price_index: usize,
) -> Option<ObservedPoint> {
	let date = NaiveDate::parse_from_str(record.get(date_index)?, DATE_FORMAT).ok()?;
	let price = record.get(price_index)?.parse::<f64>().ok()?;

	if !price.is_finite() || price <= 0f64 {
		return None;
	}

	Some(ObservedPoint { date, price })
}

/// Sorts by date and keeps the first row of every duplicated date.
fn into_ordered(mut points: Vec<ObservedPoint>) -> Vec<ObservedPoint> {
	points.sort_by_key(|each| each.date);
	points.dedup_by_key(|each| each.date);
	points
}

pub(super) fn normalize_symbol(symbol: &str) -> String {
	symbol.trim().to_uppercase()
}

/// FNV-1a, stable across platforms and toolchains unlike `DefaultHasher`.
pub(super) fn symbol_seed(symbol: &str) -> u64 {
	symbol.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
		(hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
	})
}

pub(super) fn profile_for(symbol: &str) -> SymbolProfile {
	KnownSymbol::from_str(symbol)
		.map(KnownSymbol::profile)
		.unwrap_or_default()
}

/// Geometric random walk over weekdays, reproducible per symbol.
pub(super) fn synthesize(symbol: &str) -> Result<Series, ForecastError> {
	let symbol = normalize_symbol(symbol);
	random_walk(&symbol, profile_for(&symbol))
}

fn random_walk(symbol: &str, profile: SymbolProfile) -> Result<Series, ForecastError> {
	if !profile.start_price.is_finite()
		|| profile.start_price <= 0f64
		|| !profile.drift.is_finite()
	{
		return Err(ForecastError::InvalidParameter {
			name: "profile",
			reason: format!(
				"{} needs a positive start price and a finite drift",
				symbol
			),
		});
	}

	let log_returns = Normal::new(profile.drift, profile.volatility).map_err(|err| {
		ForecastError::InvalidParameter {
			name: "volatility",
			reason: format!("{} for {}", err, symbol),
		}
	})?;
	let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));

	let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default();
	let mut price = profile.start_price;
	let mut points = Vec::<ObservedPoint>::with_capacity(SYNTHETIC_LENGTH);

	while points.len() < SYNTHETIC_LENGTH {
		if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
			points.push(ObservedPoint { date, price });
			price *= log_returns.sample(&mut rng).exp();
		}

		date = date + Days::new(1);
	}

	Ok(Series::from_ordered(points))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_csv_skips_unparsable_rows() {
		let raw = "Date,Close\n2023-01-01,100\nnot-a-date,5\n2023-01-02,abc\n2023-01-03,-4\n2023-01-04,101.5\n";
		let points = parse_csv(raw);

		assert_eq!(points.len(), 2);
		assert_eq!(points[1].price, 101.5);
	}

	#[test]
	fn parse_csv_prefers_close_column() {
		let raw = "Date,Open,High,Low,Close,Volume\n2023-01-02,1,2,0.5,1.5,900\n2023-01-03,1.5,2,1,1.8,800\n";
		let points = parse_csv(raw);

		assert_eq!(
			points.iter().map(|each| each.price).collect::<Vec<_>>(),
			vec![1.5, 1.8]
		);
	}

	#[test]
	fn parse_csv_orders_and_deduplicates_dates() {
		let raw = "Date,Close\n2023-01-03,3\n2023-01-01,1\n2023-01-03,9\n2023-01-02,2\n";
		let points = parse_csv(raw);

		assert_eq!(
			points.iter().map(|each| each.price).collect::<Vec<_>>(),
			vec![1.0, 2.0, 3.0]
		);
	}

	#[test]
	fn garbage_yields_no_points() {
		assert!(parse_csv("garbage\n\n").is_empty());
		assert!(parse_csv("").is_empty());
	}

	#[test]
	fn synthetic_series_is_reproducible() {
		let first = synthesize("AAPL").unwrap();
		let second = synthesize(" aapl ").unwrap();

		assert_eq!(first, second);
		assert_eq!(first.len(), SYNTHETIC_LENGTH);
		assert_ne!(first, synthesize("TSLA").unwrap());
	}

	#[test]
	fn synthetic_series_skips_weekends() {
		let series = synthesize("MSFT").unwrap();

		assert!(series
			.points()
			.iter()
			.all(|each| !matches!(each.date.weekday(), Weekday::Sat | Weekday::Sun)));
		assert!(series.points().iter().all(|each| each.price > 0f64));
		assert_eq!(series.points()[0].price, KnownSymbol::MSFT.profile().start_price);
	}

	#[test]
	fn every_known_symbol_has_a_sane_profile() {
		use strum::IntoEnumIterator;

		KnownSymbol::iter().for_each(|symbol| {
			let profile = symbol.profile();
			assert!(profile.start_price > 0f64);
			assert!(profile.volatility > 0f64 && profile.volatility < 0.1);
			assert_eq!(profile_for(&format!("{:?}", symbol)), profile);
		});
	}

	#[test]
	fn broken_profile_is_rejected() {
		let negative = SymbolProfile {
			volatility: -0.01,
			..SymbolProfile::default()
		};
		let worthless = SymbolProfile {
			start_price: 0f64,
			..SymbolProfile::default()
		};

		assert!(matches!(
			random_walk("BROKEN", negative),
			Err(ForecastError::InvalidParameter {
				name: "volatility",
				..
			})
		));
		assert!(matches!(
			random_walk("BROKEN", worthless),
			Err(ForecastError::InvalidParameter { name: "profile", .. })
		));
	}

	#[test]
	fn unknown_symbol_uses_generic_profile() {
		assert_eq!(profile_for("ZZZZ"), SymbolProfile::default());
		assert_eq!(profile_for("googl"), KnownSymbol::GOOGL.profile());
	}
}
