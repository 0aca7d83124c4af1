// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of Parity.

// Parity is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// Parity is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with Parity.  If not, see <http://www.gnu.org/licenses/>.

// Packed fixed-width (key, value) records in ascending key order, one
// contiguous buffer per dict. No pointers, no per-record headers.

mod dict;
mod error;
mod search;
pub mod serialize;
pub mod set_ops;

pub use dict::Dict;
pub use error::{Error, Result};
pub use serialize::{deserialize, serialize};
pub use set_ops::{intersection, merge};
