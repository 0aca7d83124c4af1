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
use crate::error::{Error, Result};
use crate::search::rank_from;

// Overlays `small` onto `big`: every key in `big` survives unless `small`
// also has it, in which case `small`'s value wins. Single linear walk over
// `small`, splicing each record into the remaining tail of `big` via a
// moving index, same technique bulk_insert uses against loose pairs.
pub fn merge(small: &Dict, big: &Dict) -> Result<Dict> {
	if (small.key_size(), small.value_size()) != (big.key_size(), big.value_size()) {
		return Err(Error::bad_argument("merge: dicts have different (key_size, value_size)"));
	}
	let block_size = big.block_size();
	let n_big = big.num_keys();
	let n_small = small.num_keys();
	let mut buf = Vec::with_capacity(big.buf.len() + small.buf.len());
	let mut i = 0;
	for s in 0..n_small {
		let k = small.key_at(s);
		while i < n_big && big.key_at(i) < k {
			buf.extend_from_slice(&big.buf[i * block_size..(i + 1) * block_size]);
			i += 1;
		}
		if i < n_big && big.key_at(i) == k {
			i += 1;
		}
		buf.extend_from_slice(k);
		buf.extend_from_slice(small.value_at(s));
	}
	buf.extend_from_slice(&big.buf[i * block_size..]);
	log::debug!(target: "packed_dict", "merge: {} small records over {} big records", n_small, n_big);
	Ok(Dict { key_size: big.key_size, value_size: big.value_size, buf })
}

// SvS (Small-vs-Small): sort inputs by size ascending, treat the smallest
// as the candidate set, and for each remaining input filter the candidate
// down to keys it also contains. Candidate shrinks monotonically; each
// lookup resumes from the previous pass's rank instead of rescanning.
pub fn intersection(dicts: &[&Dict]) -> Result<Dict> {
	if dicts.len() < 2 {
		return Err(Error::bad_argument("intersection: need at least two dicts"));
	}
	let block_size = dicts[0].block_size();
	for d in &dicts[1..] {
		if d.block_size() != block_size {
			return Err(Error::bad_argument("intersection: dicts have different (key_size, value_size)"));
		}
	}

	let mut order: Vec<usize> = (0..dicts.len()).collect();
	order.sort_by_key(|&i| dicts[i].size());
	log::trace!(target: "packed_dict", "intersection: pass order by size {:?}", order.iter().map(|&i| dicts[i].size()).collect::<Vec<_>>());

	let candidate = dicts[order[0]];

	// First pass: walk the candidate in packed form, filter against the
	// next-smallest input. Survivors come out in ascending key order already.
	let probe = dicts[order[1]];
	let mut prev_rank = 0usize;
	let mut survivors: Vec<(&[u8], &[u8])> = Vec::new();
	for i in 0..candidate.num_keys() {
		let k = candidate.key_at(i);
		let r = rank_from(probe, prev_rank, probe.num_keys(), k);
		prev_rank = r;
		if r < probe.num_keys() && probe.key_at(r) == k {
			survivors.push((k, candidate.value_at(i)));
		}
	}

	// Subsequent passes operate on the list form so we never rebuild a
	// packed buffer most of whose records are about to be discarded.
	for &idx in &order[2..] {
		let probe = dicts[idx];
		let mut prev_rank = 0usize;
		let mut next = Vec::with_capacity(survivors.len());
		for (k, v) in survivors {
			let r = rank_from(probe, prev_rank, probe.num_keys(), k);
			prev_rank = r;
			if r < probe.num_keys() && probe.key_at(r) == k {
				next.push((k, v));
			}
		}
		survivors = next;
		if survivors.is_empty() {
			break;
		}
	}

	log::debug!(target: "packed_dict", "intersection: {} surviving keys", survivors.len());
	let empty = Dict::new(candidate.key_size, candidate.value_size)?;
	Dict::from_orddict(&empty, &survivors)
}
