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

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	BadArgument(String),
	Corrupt(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::BadArgument(msg) => write!(f, "bad argument: {}", msg),
			Error::Corrupt(msg) => write!(f, "corrupt blob: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl Error {
	pub(crate) fn bad_argument<S: Into<String>>(msg: S) -> Error {
		Error::BadArgument(msg.into())
	}

	pub(crate) fn corrupt<S: Into<String>>(msg: S) -> Error {
		Error::Corrupt(msg.into())
	}
}
