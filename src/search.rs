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

use crate::dict::Dict;

// Index at which `key` already lives, or where it would need to be
// spliced in to keep `dict` sorted. Always in [0, dict.num_keys()].
pub fn rank(dict: &Dict, key: &[u8]) -> usize {
	rank_from(dict, 0, dict.num_keys(), key)
}

// Same as rank, but narrowed to [lo, hi). intersection() calls this with
// the previous pass's result as lo.
pub fn rank_from(dict: &Dict, mut lo: usize, mut hi: usize, key: &[u8]) -> usize {
	while lo < hi {
		let mid = lo + (hi - lo) / 2;
		match dict.key_at(mid).cmp(key) {
			std::cmp::Ordering::Greater => hi = mid,
			std::cmp::Ordering::Less => lo = mid + 1,
			std::cmp::Ordering::Equal => return mid,
		}
	}
	lo
}
