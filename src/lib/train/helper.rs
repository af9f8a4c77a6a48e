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
	module::AutodiffModule,
	nn::loss::{MseLoss, Reduction::Mean},
	optim::{GradientsParams, Optimizer},
	tensor::{
		backend::{AutodiffBackend, Backend},
		ElementConversion, Tensor, TensorData,
	},
};
use tracing::debug;

use super::model::*;
use super::typedef::*;
use crate::preprocess::typedef::Window;
use crate::typedef::ForecastError;

/// Stacks windows into `[count, length, 1]` inputs and `[count, 1]` labels.
pub(crate) fn windows_to_tensors<B: Backend>(
	windows: &[Window],
	device: &B::Device,
) -> (Tensor<B, 3>, Tensor<B, 2>) {
	let count = windows.len();
	let length = windows.first().map(|found| found.inputs.len()).unwrap_or(0);

	let inputs = windows
		.iter()
		.flat_map(|each| each.inputs.iter().map(|value| *value as f32))
		.collect::<Vec<_>>();
	let labels = windows
		.iter()
		.map(|each| each.label as f32)
		.collect::<Vec<_>>();

	(
		Tensor::from_data(TensorData::new(inputs, [count, length, 1]), device),
		Tensor::from_data(TensorData::new(labels, [count, 1]), device),
	)
}

pub(super) fn send_windows_to_device<B: AutodiffBackend>(
	training: &[Window],
	testing: &[Window],
	device: &B::Device,
) -> TrainInput<B> {
	// One tensor pair per window, kept in chronological order
	let train_windows = training
		.iter()
		.map(|each| windows_to_tensors::<B>(std::slice::from_ref(each), device))
		.collect::<Vec<_>>();

	let (valid_tensor, valid_target_tensor) =
		windows_to_tensors::<B::InnerBackend>(testing, device);

	TrainInput {
		train_windows,
		valid_tensor,
		valid_target_tensor,
	}
}

pub(super) fn train_new_model<B: AutodiffBackend>(
	input: TrainInput<B>,
	config: &TrainingConfig,
	cancel: &CancelToken,
	device: &B::Device,
) -> Result<(LstmNetwork<B>, TrainingReport), ForecastError> {
	let mut model = config.model.init::<B>(device);
	let mut optim = config.optimizer.init::<B, LstmNetwork<B>>();
	let mut report = TrainingReport {
		end_epoch: config.epochs,
		train_windows: input.train_windows.len(),
		test_windows: input.valid_target_tensor.dims()[0],
		..Default::default()
	};

	for epoch in 1u32..=config.epochs {
		let mut train_loss = 0f32;

		// Training phase, one update per window
		for (index, (window, target)) in input.train_windows.iter().enumerate() {
			if cancel.is_cancelled() {
				return Err(ForecastError::TrainingCancelled);
			}

			let output = model.forward(window.clone());
			let loss = MseLoss::new().forward(output, target.clone(), Mean);

			let value = loss.clone().into_scalar().elem::<f32>();
			if !value.is_finite() {
				return Err(ForecastError::TrainingDiverged {
					epoch: epoch as usize,
					window: index,
				});
			}
			train_loss += value;

			let grads = loss.backward();
			let grads = GradientsParams::from_grads(grads, &model);
			model = optim.step(config.lr, model, grads);
		}

		// Validation phase, no weight update
		let test_loss = {
			let model = model.valid();
			let output = model.forward(input.valid_tensor.clone());
			MseLoss::new()
				.forward(output, input.valid_target_tensor.clone(), Mean)
				.into_scalar()
				.elem::<f32>()
		};

		if !test_loss.is_finite() {
			return Err(ForecastError::TrainingDiverged {
				epoch: epoch as usize,
				window: report.train_windows,
			});
		}

		let new_point = IterativePoint {
			epoch,
			train_loss: train_loss / report.train_windows.max(1) as f32,
			test_loss,
		};
		debug!(
			epoch,
			train_loss = new_point.train_loss,
			test_loss,
			"finished epoch"
		);

		report.loss_points.push(new_point);
		report.final_test_loss = test_loss;
	}

	Ok((model, report))
}
