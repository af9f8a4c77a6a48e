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

use tracing::{debug, warn};

use super::helper::*;
use super::typedef::*;
use crate::typedef::{ForecastError, Series, SeriesSource};

/// Turns raw CSV text or a symbol into a series of at least `min_points` points.
///
/// Text that is present but unusable is replaced by a synthetic series and
/// the [`ForecastError::MalformedInput`] is kept in [`Ingested::rejected`], so
/// the caller can finish the request and tell the user which path was taken.
/// Blank text counts as absent. An error is returned only when no series can
/// be produced at all.
pub fn ingest(
	raw: Option<&str>,
	symbol: Option<&str>,
	min_points: usize,
) -> Result<Ingested, ForecastError> {
	let symbol = symbol
		.map(normalize_symbol)
		.filter(|found| !found.is_empty());
	let raw = raw.filter(|found| !found.trim().is_empty());

	let error = match (raw, &symbol) {
		(Some(text), _) => match parse_text(text, min_points) {
			Ok(series) => {
				debug!(points = series.len(), "parsed CSV price history");
				return Ok(Ingested {
					series,
					source: SeriesSource::Csv,
					rejected: None,
				});
			}
			Err(err) => err,
		},
		(None, Some(symbol)) => {
			debug!(symbol = symbol.as_str(), "synthesizing price history");
			return Ok(Ingested {
				series: synthesize(symbol)?,
				source: SeriesSource::Synthetic {
					symbol: symbol.clone(),
				},
				rejected: None,
			});
		}
		(None, None) => ForecastError::MalformedInput {
			reason: String::from("neither price history nor symbol was supplied"),
		},
	};

	let fallback_symbol = symbol.unwrap_or_else(|| String::from(SAMPLE_SYMBOL));
	warn!(
		error = %error,
		symbol = fallback_symbol.as_str(),
		"falling back to synthetic price history"
	);

	Ok(Ingested {
		series: synthesize(&fallback_symbol)?,
		source: SeriesSource::Fallback {
			symbol: fallback_symbol,
		},
		rejected: Some(error),
	})
}

fn parse_text(text: &str, min_points: usize) -> Result<Series, ForecastError> {
	let points = parse_csv(text);
	if points.len() < min_points {
		return Err(ForecastError::MalformedInput {
			reason: format!(
				"{} valid `YYYY-MM-DD,price` rows found, at least {} needed",
				points.len(),
				min_points
			),
		});
	}

	Series::new(points)
}

#[cfg(test)]
mod tests {
	use super::*;

	const SHORT_CSV: &str = "Date,Close\n2023-01-01,100\n2023-01-02,102\n2023-01-03,99";

	#[test]
	fn csv_with_enough_rows_is_accepted() {
		let ingested = ingest(Some(SHORT_CSV), None, 2).unwrap();

		assert_eq!(ingested.source, SeriesSource::Csv);
		assert_eq!(ingested.rejected, None);
		assert_eq!(ingested.series.prices(), vec![100.0, 102.0, 99.0]);
	}

	#[test]
	fn csv_below_minimum_falls_back() {
		let ingested = ingest(Some(SHORT_CSV), Some("msft"), 61).unwrap();

		assert!(matches!(
			ingested.rejected,
			Some(ForecastError::MalformedInput { .. })
		));
		assert_eq!(
			ingested.source,
			SeriesSource::Fallback {
				symbol: String::from("MSFT")
			}
		);
		assert_eq!(ingested.series.len(), SYNTHETIC_LENGTH);
	}

	#[test]
	fn garbage_reports_error_with_sample_fallback() {
		let ingested = ingest(Some("garbage\n\n"), None, 2).unwrap();

		assert!(matches!(
			ingested.rejected,
			Some(ForecastError::MalformedInput { .. })
		));
		assert!(!ingested.series.is_empty());
		assert_eq!(
			ingested.source,
			SeriesSource::Fallback {
				symbol: String::from(SAMPLE_SYMBOL)
			}
		);
	}

	#[test]
	fn blank_text_with_symbol_is_synthetic_and_deterministic() {
		let first = ingest(Some(""), Some("AAPL"), 61).unwrap();
		let second = ingest(Some(""), Some("AAPL"), 61).unwrap();

		assert_eq!(first, second);
		assert_eq!(first.rejected, None);
		assert_eq!(
			first.source,
			SeriesSource::Synthetic {
				symbol: String::from("AAPL")
			}
		);
	}

	#[test]
	fn nothing_supplied_is_reported() {
		let ingested = ingest(None, Some("   "), 2).unwrap();

		assert!(matches!(
			ingested.rejected,
			Some(ForecastError::MalformedInput { .. })
		));
	}
}
