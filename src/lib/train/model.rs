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
	nn::{Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig},
	prelude::*,
};

#[derive(Config, Debug)]
pub struct LstmNetworkConfig {
	#[config(default = 1)]
	pub input_size: usize,

	#[config(default = 32)]
	pub hidden_size: usize,

	#[config(default = 2)]
	pub num_layers: usize,

	/// Fraction of hidden units zeroed after every layer while training.
	#[config(default = 0.2)]
	pub dropout: f64,
}

/// Stacked LSTM layers, each owning its input, forget, output and cell gates,
/// followed by a linear head reading the last hidden state.
#[derive(Module, Debug)]
pub struct LstmNetwork<B: Backend> {
	layers: Vec<Lstm<B>>,
	dropout: Dropout,
	output: Linear<B>,
}

impl LstmNetworkConfig {
	pub fn init<B: Backend>(&self, device: &B::Device) -> LstmNetwork<B> {
		let layers = (0..self.num_layers.max(1))
			.map(|index| {
				let d_input = if index == 0 {
					self.input_size
				} else {
					self.hidden_size
				};

				LstmConfig::new(d_input, self.hidden_size, true).init(device)
			})
			.collect();

		LstmNetwork {
			layers,
			dropout: DropoutConfig::new(self.dropout).init(),
			output: LinearConfig::new(self.hidden_size, 1).init(device),
		}
	}
}

impl<B: Backend> LstmNetwork<B> {
	/// Maps `[batch, sequence, feature]` to `[batch, 1]`.
	///
	/// Hidden and cell states start from zero on every call. Dropout is only
	/// active on an autodiff backend, so inference through `valid()` is deterministic.
	pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
		let mut sequence = input;
		for layer in self.layers.iter() {
			let (hidden, _state) = layer.forward(sequence, None);
			sequence = self.dropout.forward(hidden);
		}

		let [batch, length, hidden] = sequence.dims();
		let last = sequence.narrow(1, length - 1, 1).reshape([batch, hidden]);

		self.output.forward(last)
	}
}
