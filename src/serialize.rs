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

// Blob layout: [key_size: u64 LE][value_size: u64 LE][buf].

use std::convert::TryInto;

use crate::dict::Dict;
use crate::error::{Error, Result};

const HEADER_SIZE: usize = 16;

pub fn serialize(dict: &Dict) -> Vec<u8> {
	let mut out = Vec::with_capacity(HEADER_SIZE + dict.buf.len());
	out.extend_from_slice(&(dict.key_size as u64).to_le_bytes());
	out.extend_from_slice(&(dict.value_size as u64).to_le_bytes());
	out.extend_from_slice(&dict.buf);
	out
}

// Sortedness of the embedded buffer is not re-verified; caller's
// responsibility, same as from_buf.
pub fn deserialize(blob: &[u8]) -> Result<Dict> {
	if blob.len() < HEADER_SIZE {
		return Err(Error::corrupt(format!("blob shorter than the {}-byte header", HEADER_SIZE)));
	}
	let key_size = u64::from_le_bytes(blob[0..8].try_into().unwrap()) as usize;
	let value_size = u64::from_le_bytes(blob[8..16].try_into().unwrap()) as usize;
	if key_size == 0 || value_size == 0 {
		return Err(Error::corrupt("declared key_size/value_size must be positive"));
	}
	let buf = blob[HEADER_SIZE..].to_vec();
	let block_size = key_size + value_size;
	if buf.len() % block_size != 0 {
		return Err(Error::corrupt(format!(
			"buffer length {} is not a multiple of declared block size {}",
			buf.len(),
			block_size,
		)));
	}
	log::trace!(target: "packed_dict", "deserialize: {} bytes, block_size {}", buf.len(), block_size);
	Ok(Dict { key_size, value_size, buf })
}
