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
	backend::{Autodiff, NdArray},
	grad_clipping::GradientClippingConfig,
	optim::AdamConfig,
	tensor::{backend::AutodiffBackend, Tensor},
};
use serde::Serialize;
use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc,
};

use super::model::*;

pub(crate) type TrainBackend = Autodiff<NdArray>;
pub(crate) type InferBackend = NdArray;

#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IterativePoint {
	pub epoch: u32,
	pub train_loss: f32,
	pub test_loss: f32,
}

/// Loss curve and sizes of one sequence fit.
#[derive(Default, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
	pub loss_points: Vec<IterativePoint>,
	pub end_epoch: u32,
	pub train_windows: usize,
	pub test_windows: usize,
	/// Mean squared error on the testing windows after the last epoch.
	pub final_test_loss: f32,
	/// Base half-width of the forecast band, in price units.
	pub residual_spread: f64,
}

#[derive(burn::config::Config)]
pub struct TrainingConfig {
	pub model: LstmNetworkConfig,
	pub optimizer: AdamConfig,

	#[config(default = 1e-3)]
	pub lr: f64,

	#[config(default = 25)]
	pub epochs: u32,

	/// Fewest training windows a fit is attempted with.
	#[config(default = 2)]
	pub min_windows: usize,

	/// Backend seed for weight init and dropout; random when unset.
	pub seed: Option<u64>,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self::new(
			LstmNetworkConfig::new(),
			AdamConfig::new().with_grad_clipping(Some(GradientClippingConfig::Norm(1.0))),
		)
	}
}

/// Shared flag the training loop polls before every window.
#[derive(Default, Clone, Debug)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// A trained network detached from autodiff, ready for read-only inference.
#[derive(Debug)]
pub struct SequenceFit {
	pub model: LstmNetwork<InferBackend>,
	pub report: TrainingReport,
}

pub(super) struct TrainInput<B: AutodiffBackend> {
	pub train_windows: Vec<(Tensor<B, 3>, Tensor<B, 2>)>,
	pub valid_tensor: Tensor<B::InnerBackend, 3>,
	pub valid_target_tensor: Tensor<B::InnerBackend, 2>,
}
