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

use burn::config::Config;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::evaluate::typedef::{ForecastResult, TableRow};
use crate::train::typedef::{TrainingConfig, TrainingReport};

/// Everything that can go wrong between ingestion and assembly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
	/// Raw text could not be turned into a usable series.
	#[error("Malformed input: {reason}")]
	MalformedInput { reason: String },

	/// Fewer points or windows than a stage needs.
	#[error("Insufficient data: {required} required, {actual} available")]
	InsufficientData { required: usize, actual: usize },

	/// Loss stopped being finite while fitting the sequence model.
	#[error("Training diverged at epoch {epoch}, window {window}: loss is not finite")]
	TrainingDiverged { epoch: usize, window: usize },

	#[error("Training was cancelled before it finished")]
	TrainingCancelled,

	#[error("Invalid parameter `{name}`: {reason}")]
	InvalidParameter { name: &'static str, reason: String },

	/// The training worker panicked or could not be joined.
	#[error("Training worker failed: {message}")]
	TrainingFailed { message: String },
}

#[derive(Default, Serialize, Clone, Debug, PartialEq)]
pub struct ErrorInfo {
	pub title: Cow<'static, str>,
	pub message: String,
}

impl From<&ForecastError> for ErrorInfo {
	fn from(err: &ForecastError) -> Self {
		let title = match err {
			ForecastError::MalformedInput { .. } => "Malformed Input",
			ForecastError::InsufficientData { .. } => "Insufficient Data",
			ForecastError::TrainingDiverged { .. } => "Training Diverged",
			ForecastError::TrainingCancelled => "Training Cancelled",
			ForecastError::InvalidParameter { .. } => "Invalid Parameter",
			ForecastError::TrainingFailed { .. } => "Training Failed",
		};

		ErrorInfo {
			title: Cow::Borrowed(title),
			message: err.to_string(),
		}
	}
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ObservedPoint {
	pub date: NaiveDate,
	pub price: f64,
}

/// Price history ordered by strictly increasing date.
#[derive(Default, Serialize, Clone, Debug, PartialEq)]
pub struct Series {
	points: Vec<ObservedPoint>,
}

impl Series {
	pub fn new(points: Vec<ObservedPoint>) -> Result<Self, ForecastError> {
		if let Some(bad) = points
			.iter()
			.find(|each| !each.price.is_finite() || each.price <= 0f64)
		{
			return Err(ForecastError::MalformedInput {
				reason: format!("price {} on {} is not a positive number", bad.price, bad.date),
			});
		}

		if let Some(pair) = points.windows(2).find(|pair| pair[1].date <= pair[0].date) {
			return Err(ForecastError::MalformedInput {
				reason: format!("date {} does not come after {}", pair[1].date, pair[0].date),
			});
		}

		Ok(Self { points })
	}

	/// For producers that already guarantee ordering and positive prices.
	pub(crate) fn from_ordered(points: Vec<ObservedPoint>) -> Self {
		debug_assert!(points.windows(2).all(|pair| pair[0].date < pair[1].date));
		Self { points }
	}

	pub fn points(&self) -> &[ObservedPoint] {
		&self.points
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	pub fn prices(&self) -> Vec<f64> {
		self.points.iter().map(|each| each.price).collect()
	}

	pub fn dates(&self) -> Vec<NaiveDate> {
		self.points.iter().map(|each| each.date).collect()
	}

	pub fn last_date(&self) -> Option<NaiveDate> {
		self.points.last().map(|each| each.date)
	}
}

#[derive(Default, PartialEq, Eq, Deserialize, Serialize, Clone, Copy, Debug, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ModelKind {
	#[strum(to_string = "linear")]
	Linear,
	#[default]
	#[serde(alias = "lstm")]
	#[strum(to_string = "sequence", serialize = "lstm")]
	Sequence,
}

/// A point forecast with its confidence band, in whatever unit the producing model works in.
#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct BandPoint {
	pub predicted: f64,
	pub lower: f64,
	pub upper: f64,
}

impl BandPoint {
	pub fn around(predicted: f64, half_width: f64) -> Self {
		Self {
			predicted,
			lower: predicted - half_width,
			upper: predicted + half_width,
		}
	}
}

#[derive(Config)]
pub struct ForecastConfig {
	pub training: TrainingConfig,

	#[config(default = 60)]
	pub window_length: usize,

	#[config(default = 0.8)]
	pub train_fraction: f64,

	#[config(default = 365)]
	pub max_horizon: usize,

	/// Relative widening of the sequence band per forecast day.
	#[config(default = 0.05)]
	pub band_growth: f64,

	/// Quantile of absolute test residuals used as the sequence band base.
	#[config(default = 0.95)]
	pub band_quantile: f64,

	/// Historical rows shown in the table ahead of the forecast rows.
	#[config(default = 5)]
	pub table_history_rows: usize,
}

impl Default for ForecastConfig {
	fn default() -> Self {
		Self::new(TrainingConfig::default())
	}
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
	pub csv: Option<String>,
	pub symbol: Option<String>,
	pub horizon_days: usize,
	#[serde(default)]
	pub model: ModelKind,
}

impl Default for ForecastRequest {
	fn default() -> Self {
		Self {
			csv: None,
			symbol: None,
			horizon_days: 7,
			model: ModelKind::default(),
		}
	}
}

/// Where the series that was actually forecast came from.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SeriesSource {
	Csv,
	Synthetic { symbol: String },
	/// Synthetic series substituted after the supplied text was rejected.
	Fallback { symbol: String },
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ForecastOutcome {
	pub result: ForecastResult,
	pub model_used: ModelKind,
	pub source: SeriesSource,
	pub notices: Vec<ErrorInfo>,
	pub training: Option<TrainingReport>,
	pub high_peak: Option<TableRow>,
	pub low_peak: Option<TableRow>,
}
