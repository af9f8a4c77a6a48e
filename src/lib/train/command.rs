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
	module::AutodiffModule,
	tensor::backend::Backend,
};
use tokio::task::JoinHandle;
use tracing::info;

use super::helper::*;
use super::typedef::*;
use crate::preprocess::typedef::Window;
use crate::typedef::ForecastError;

/// Fits a fresh network on `training` in chronological order, scoring `testing` after every epoch.
///
/// The weights are created inside this call and handed back only on success,
/// so a cancelled or diverged fit never leaks a partially trained model.
pub fn fit_sequence(
	training: &[Window],
	testing: &[Window],
	config: &TrainingConfig,
	cancel: &CancelToken,
) -> Result<SequenceFit, ForecastError> {
	if config.epochs == 0 {
		return Err(ForecastError::InvalidParameter {
			name: "epochs",
			reason: String::from("must be at least 1"),
		});
	}

	let required = config.min_windows.max(1);
	if training.len() < required {
		return Err(ForecastError::InsufficientData {
			required,
			actual: training.len(),
		});
	}

	if testing.is_empty() {
		return Err(ForecastError::InsufficientData {
			required: 1,
			actual: 0,
		});
	}

	let device = NdArrayDevice::Cpu;

	let random_seed: u64 = config.seed.unwrap_or_else(rand::random);
	TrainBackend::seed(random_seed);

	let input = send_windows_to_device::<TrainBackend>(training, testing, &device);
	let (model, report) = train_new_model(input, config, cancel, &device)?;

	info!(
		epochs = report.end_epoch,
		train_windows = report.train_windows,
		test_windows = report.test_windows,
		final_test_loss = report.final_test_loss,
		"sequence model trained"
	);

	Ok(SequenceFit {
		model: model.valid(),
		report,
	})
}

/// A fit running on the blocking pool.
///
/// Dropping the handle before the fit finishes cancels the worker.
pub struct TrainingHandle {
	cancel: CancelToken,
	join: JoinHandle<Result<SequenceFit, ForecastError>>,
}

impl TrainingHandle {
	/// Asks the worker to stop before its next window.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	pub fn cancel_token(&self) -> CancelToken {
		self.cancel.clone()
	}

	pub async fn join(mut self) -> Result<SequenceFit, ForecastError> {
		match (&mut self.join).await {
			Ok(result) => result,
			Err(err) => Err(ForecastError::TrainingFailed {
				message: err.to_string(),
			}),
		}
	}
}

impl Drop for TrainingHandle {
	fn drop(&mut self) {
		if !self.join.is_finished() {
			self.cancel.cancel();
		}
	}
}

/// Moves the windows onto a dedicated worker so the caller's task is never blocked.
///
/// Must be called from within a tokio runtime.
pub fn spawn_training(
	training: Vec<Window>,
	testing: Vec<Window>,
	config: TrainingConfig,
	cancel: CancelToken,
) -> TrainingHandle {
	let worker_cancel = cancel.clone();
	let join = tokio::task::spawn_blocking(move || {
		fit_sequence(&training, &testing, &config, &worker_cancel)
	});

	TrainingHandle { cancel, join }
}
