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

use chrono::NaiveDate;
use serde::Serialize;
use std::ops::Range;

use crate::typedef::{BandPoint, ModelKind};

/// One line of the detailed forecast table.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
	pub date: NaiveDate,
	pub actual: Option<f64>,
	pub predicted: f64,
	pub lower: f64,
	pub upper: f64,
	pub confidence_percent: u32,
	pub change_percent: f64,
}

/// The complete answer to one forecast request, aligned on `labels`.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
	pub model: ModelKind,
	pub labels: Vec<NaiveDate>,
	pub actual: Vec<Option<f64>>,
	pub predicted: Vec<f64>,
	pub upper: Vec<f64>,
	pub lower: Vec<f64>,
	/// Actual prices predicted by training windows, absent elsewhere.
	pub training: Vec<Option<f64>>,
	/// Actual prices predicted by testing windows, absent elsewhere.
	pub testing: Vec<Option<f64>>,
	pub table_rows: Vec<TableRow>,
}

/// Raw model output before denormalization: one band per observed point, then one per future day.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ModelOutput {
	pub fitted: Vec<BandPoint>,
	pub forecast: Vec<BandPoint>,
}

/// Observation indices whose values served as training and testing labels.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Segments {
	pub train: Range<usize>,
	pub test: Range<usize>,
}

/// Sequence model output plus the band base it was built with, in normalized units.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct SequenceOutput {
	pub output: ModelOutput,
	pub segments: Segments,
	pub base_spread: f64,
}
