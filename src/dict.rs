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

// Mutating methods take `&self` and return a new `Dict`; the buffer is
// never mutated in place.

use crate::error::{Error, Result};
use crate::search::rank;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dict {
	pub(crate) key_size: usize,
	pub(crate) value_size: usize,
	pub(crate) buf: Vec<u8>,
}

impl Dict {
	pub fn new(key_size: usize, value_size: usize) -> Result<Dict> {
		Self::from_buf(key_size, value_size, Vec::new())
	}

	// Caller asserts `buf` is already sorted and packed under the declared
	// widths; only the structural invariants are checked here.
	pub fn from_buf(key_size: usize, value_size: usize, buf: Vec<u8>) -> Result<Dict> {
		if key_size == 0 {
			return Err(Error::bad_argument("key_size must be positive"));
		}
		if value_size == 0 {
			return Err(Error::bad_argument("value_size must be positive"));
		}
		let block_size = key_size + value_size;
		if buf.len() % block_size != 0 {
			return Err(Error::bad_argument(format!(
				"buffer length {} is not a multiple of block size {}",
				buf.len(),
				block_size,
			)));
		}
		Ok(Dict { key_size, value_size, buf })
	}

	pub fn key_size(&self) -> usize {
		self.key_size
	}

	pub fn value_size(&self) -> usize {
		self.value_size
	}

	pub fn block_size(&self) -> usize {
		self.key_size + self.value_size
	}

	pub fn num_keys(&self) -> usize {
		self.buf.len() / self.block_size()
	}

	pub fn size(&self) -> usize {
		self.buf.len()
	}

	pub fn expected_size(&self, n: usize) -> usize {
		n * self.block_size()
	}

	pub fn compact(&self) -> Dict {
		Dict { key_size: self.key_size, value_size: self.value_size, buf: self.buf.clone() }
	}

	pub(crate) fn key_at(&self, i: usize) -> &[u8] {
		let start = i * self.block_size();
		&self.buf[start..start + self.key_size]
	}

	pub(crate) fn value_at(&self, i: usize) -> &[u8] {
		let start = i * self.block_size() + self.key_size;
		&self.buf[start..start + self.value_size]
	}

	pub(crate) fn at(&self, i: usize) -> Option<(&[u8], &[u8])> {
		if i >= self.num_keys() {
			None
		} else {
			Some((self.key_at(i), self.value_at(i)))
		}
	}

	fn check_key(&self, k: &[u8]) -> Result<()> {
		if k.len() != self.key_size {
			return Err(Error::bad_argument(format!(
				"key length {} does not match declared key_size {}",
				k.len(),
				self.key_size,
			)));
		}
		Ok(())
	}

	fn check_value(&self, v: &[u8]) -> Result<()> {
		if v.len() != self.value_size {
			return Err(Error::bad_argument(format!(
				"value length {} does not match declared value_size {}",
				v.len(),
				self.value_size,
			)));
		}
		Ok(())
	}

	fn splice_record(&self, i: usize, k: &[u8], v: &[u8]) -> Dict {
		let block_size = self.block_size();
		let mut buf = Vec::with_capacity(self.buf.len() + block_size);
		let offset = i * block_size;
		buf.extend_from_slice(&self.buf[..offset]);
		buf.extend_from_slice(k);
		buf.extend_from_slice(v);
		buf.extend_from_slice(&self.buf[offset..]);
		Dict { key_size: self.key_size, value_size: self.value_size, buf }
	}

	fn replace_value_at(&self, i: usize, v: &[u8]) -> Dict {
		let block_size = self.block_size();
		let mut buf = self.buf.clone();
		let start = i * block_size + self.key_size;
		buf[start..start + self.value_size].copy_from_slice(v);
		Dict { key_size: self.key_size, value_size: self.value_size, buf }
	}

	fn remove_at(&self, i: usize) -> Dict {
		let block_size = self.block_size();
		let mut buf = Vec::with_capacity(self.buf.len() - block_size);
		let offset = i * block_size;
		buf.extend_from_slice(&self.buf[..offset]);
		buf.extend_from_slice(&self.buf[offset + block_size..]);
		Dict { key_size: self.key_size, value_size: self.value_size, buf }
	}

	// -- point ops --------------------------------------------------

	pub fn find(&self, k: &[u8]) -> Result<Option<&[u8]>> {
		self.check_key(k)?;
		let i = rank(self, k);
		if i < self.num_keys() && self.key_at(i) == k {
			log::trace!(target: "packed_dict", "find: hit at rank {}", i);
			Ok(Some(self.value_at(i)))
		} else {
			Ok(None)
		}
	}

	pub fn find_many(&self, ks: &[&[u8]]) -> Result<Vec<Option<Vec<u8>>>> {
		ks.iter().map(|k| self.find(k).map(|v| v.map(|v| v.to_vec()))).collect()
	}

	pub fn insert(&self, k: &[u8], v: &[u8]) -> Result<Dict> {
		self.check_key(k)?;
		self.check_value(v)?;
		let i = rank(self, k);
		if i < self.num_keys() && self.key_at(i) == k {
			log::trace!(target: "packed_dict", "insert: overwrite at rank {}", i);
			Ok(self.replace_value_at(i, v))
		} else {
			log::trace!(target: "packed_dict", "insert: splice at rank {}", i);
			Ok(self.splice_record(i, k, v))
		}
	}

	// Combines find+insert in a single rank computation. Returns `self`
	// unchanged when `f` produces the same bytes already stored.
	pub fn update<F>(&self, k: &[u8], initial: &[u8], f: F) -> Result<Dict>
	where
		F: FnOnce(&[u8]) -> Vec<u8>,
	{
		self.check_key(k)?;
		self.check_value(initial)?;
		let i = rank(self, k);
		if i < self.num_keys() && self.key_at(i) == k {
			let current = self.value_at(i);
			let updated = f(current);
			self.check_value(&updated)?;
			if updated == current {
				return Ok(self.clone());
			}
			Ok(self.replace_value_at(i, &updated))
		} else {
			Ok(self.splice_record(i, k, initial))
		}
	}

	pub fn delete(&self, k: &[u8]) -> Result<Dict> {
		self.check_key(k)?;
		let i = rank(self, k);
		if i < self.num_keys() && self.key_at(i) == k {
			log::trace!(target: "packed_dict", "delete: removing rank {}", i);
			Ok(self.remove_at(i))
		} else {
			Err(Error::bad_argument("delete: key not present"))
		}
	}

	pub fn cas(&self, k: &[u8], expected: Option<&[u8]>, v: &[u8]) -> Result<Dict> {
		let current = self.find(k)?;
		if current == expected {
			self.insert(k, v)
		} else {
			Err(Error::bad_argument("cas: expected value did not match"))
		}
	}

	// Skips the binary search; misuse (non-increasing key) corrupts sort order.
	pub fn append(&self, k: &[u8], v: &[u8]) -> Result<Dict> {
		self.check_key(k)?;
		self.check_value(v)?;
		if let Some(last) = self.last() {
			if k <= last.0 {
				return Err(Error::bad_argument("append: key not strictly greater than last key"));
			}
		}
		let mut buf = self.buf.clone();
		buf.extend_from_slice(k);
		buf.extend_from_slice(v);
		Ok(Dict { key_size: self.key_size, value_size: self.value_size, buf })
	}

	pub fn first(&self) -> Option<(&[u8], &[u8])> {
		self.at(0)
	}

	pub fn last(&self) -> Option<(&[u8], &[u8])> {
		let n = self.num_keys();
		if n == 0 {
			None
		} else {
			self.at(n - 1)
		}
	}

	pub fn next(&self, k: &[u8]) -> Result<Option<(&[u8], &[u8])>> {
		self.next_nth(k, 1)
	}

	// Converts to a rank lookup by probing for k + 1. At the maximum
	// representable key this overflows; treated as no successor.
	pub fn next_nth(&self, k: &[u8], n: usize) -> Result<Option<(&[u8], &[u8])>> {
		self.check_key(k)?;
		if n == 0 {
			return Err(Error::bad_argument("next_nth: n must be >= 1"));
		}
		let successor = match increment_key(k) {
			Some(k) => k,
			None => return Ok(None),
		};
		let i = rank(self, &successor) + n - 1;
		Ok(self.at(i))
	}

	// -- bulk ops ----------------------------------------------------

	// `pairs` must already be sorted ascending; not verified, unsorted
	// input yields an unspecified output ordering.
	pub fn bulk_insert(&self, pairs: &[(&[u8], &[u8])]) -> Result<Dict> {
		for (k, v) in pairs {
			self.check_key(k)?;
			self.check_value(v)?;
		}
		let block_size = self.block_size();
		let n = self.num_keys();
		let mut buf = Vec::with_capacity(self.buf.len() + pairs.len() * block_size);
		let mut i = 0;
		for (k, v) in pairs {
			while i < n && self.key_at(i) < *k {
				buf.extend_from_slice(&self.buf[i * block_size..(i + 1) * block_size]);
				i += 1;
			}
			if i < n && self.key_at(i) == *k {
				i += 1;
			}
			buf.extend_from_slice(k);
			buf.extend_from_slice(v);
		}
		buf.extend_from_slice(&self.buf[i * block_size..]);
		log::debug!(target: "packed_dict", "bulk_insert: merged {} pairs into {} existing records", pairs.len(), n);
		Ok(Dict { key_size: self.key_size, value_size: self.value_size, buf })
	}

	// `empty` must itself be empty; this only borrows its declared widths.
	pub fn from_orddict(empty: &Dict, pairs: &[(&[u8], &[u8])]) -> Result<Dict> {
		if empty.num_keys() != 0 {
			return Err(Error::bad_argument("from_orddict: dict must be empty"));
		}
		let mut buf = Vec::with_capacity(pairs.len() * empty.block_size());
		for (k, v) in pairs {
			if k.len() != empty.key_size {
				return Err(Error::bad_argument(format!(
					"key length {} does not match declared key_size {}",
					k.len(),
					empty.key_size,
				)));
			}
			if v.len() != empty.value_size {
				return Err(Error::bad_argument(format!(
					"value length {} does not match declared value_size {}",
					v.len(),
					empty.value_size,
				)));
			}
			buf.extend_from_slice(k);
			buf.extend_from_slice(v);
		}
		Ok(Dict { key_size: empty.key_size, value_size: empty.value_size, buf })
	}

	// -- traversal -----------------------------------------------------

	// Returns `acc` unchanged when the dict is empty (the fold identity).
	pub fn foldl<T, F>(&self, mut acc: T, mut f: F) -> T
	where
		F: FnMut(&[u8], &[u8], T) -> T,
	{
		for i in 0..self.num_keys() {
			acc = f(self.key_at(i), self.value_at(i), acc);
		}
		acc
	}

	pub fn to_orddict(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
		self.foldl(Vec::with_capacity(self.num_keys()), |k, v, mut acc| {
			acc.push((k.to_vec(), v.to_vec()));
			acc
		})
	}
}

// Returns `None` on overflow (all bytes already 0xff).
pub(crate) fn increment_key(k: &[u8]) -> Option<Vec<u8>> {
	let mut out = k.to_vec();
	for byte in out.iter_mut().rev() {
		if *byte == 0xff {
			*byte = 0;
		} else {
			*byte += 1;
			return Some(out);
		}
	}
	None
}

#[cfg(test)]
mod test {
	use super::*;
	use std::convert::TryInto;

	fn k(n: u64) -> Vec<u8> {
		n.to_be_bytes().to_vec()
	}

	fn dict_from(pairs: &[(u64, u8)]) -> Dict {
		let mut d = Dict::new(8, 1).unwrap();
		for (key, val) in pairs {
			d = d.insert(&k(*key), &[*val]).unwrap();
		}
		d
	}

	#[test]
	fn new_rejects_zero_widths() {
		assert!(Dict::new(0, 1).is_err());
		assert!(Dict::new(1, 0).is_err());
	}

	#[test]
	fn from_buf_rejects_misaligned_length() {
		assert!(Dict::from_buf(8, 1, vec![0u8; 5]).is_err());
	}

	#[test]
	fn overwrite_scenario() {
		let d = Dict::new(8, 1).unwrap();
		let d = d.insert(&k(2), &[0x02]).unwrap();
		let d = d.insert(&k(2), &[0x04]).unwrap();
		assert_eq!(d.find(&k(2)).unwrap(), Some(&[0x04][..]));
		assert_eq!(d.num_keys(), 1);
	}

	#[test]
	fn ordered_build_scenario() {
		let d = Dict::new(8, 1).unwrap();
		let d = d.insert(&k(2), &[2]).unwrap();
		let d = d.insert(&k(4), &[4]).unwrap();
		let d = d.insert(&k(1), &[1]).unwrap();
		let d = d.insert(&k(3), &[3]).unwrap();
		let mut expected = Vec::new();
		for (key, val) in [(1u64, 1u8), (2, 2), (3, 3), (4, 4)] {
			expected.extend_from_slice(&k(key));
			expected.push(val);
		}
		assert_eq!(d.buf, expected);
	}

	#[test]
	fn next_scenario() {
		let d = dict_from(&[(2, 20), (3, 30)]);
		assert_eq!(d.next(&k(0)).unwrap().map(|(k, _)| k.to_vec()), Some(k(2)));
		assert_eq!(d.next(&k(1)).unwrap().map(|(k, _)| k.to_vec()), Some(k(2)));
		assert_eq!(d.next(&k(2)).unwrap().map(|(k, _)| k.to_vec()), Some(k(3)));
		assert_eq!(d.next(&k(3)).unwrap(), None);
	}

	#[test]
	fn next_nth_scenario() {
		let d = dict_from(&[(2, 20), (3, 30)]);
		assert_eq!(d.next_nth(&k(0), 1).unwrap().map(|(k, _)| k.to_vec()), Some(k(2)));
		assert_eq!(d.next_nth(&k(0), 2).unwrap().map(|(k, _)| k.to_vec()), Some(k(3)));
		assert_eq!(d.next_nth(&k(2), 1).unwrap().map(|(k, _)| k.to_vec()), Some(k(3)));
		assert_eq!(d.next_nth(&k(2), 2).unwrap(), None);
	}

	#[test]
	fn bulk_merge_scenario() {
		let d = dict_from(&[(1, 1), (10, 10), (12, 12)]);
		let zero = k(0);
		let five = k(5);
		let ten = k(10);
		let eleven = k(11);
		let pairs: Vec<(&[u8], &[u8])> =
			vec![(&zero[..], &[0][..]), (&five[..], &[5][..]), (&ten[..], &[11][..]), (&eleven[..], &[11][..])];
		let d = d.bulk_insert(&pairs).unwrap();
		let keys: Vec<u64> = d.to_orddict().iter().map(|(k, _)| u64::from_be_bytes(k[..].try_into().unwrap())).collect();
		assert_eq!(keys, vec![0, 1, 5, 10, 11, 12]);
		assert_eq!(d.find(&k(10)).unwrap(), Some(&[11][..]));
	}

	#[test]
	fn bulk_insert_matches_repeated_insert() {
		// bulk_insert over a batch must equal folding insert over the same pairs one at a time.
		env_logger::try_init().ok();
		use rand::Rng;
		let mut rng = rand::thread_rng();
		let mut keys: Vec<u64> = (0..40).map(|_| rng.gen_range(0..1000)).collect();
		keys.sort_unstable();
		keys.dedup();
		let pairs_data: Vec<(Vec<u8>, Vec<u8>)> = keys.iter().map(|&n| (k(n), vec![(n % 256) as u8])).collect();
		let pairs: Vec<(&[u8], &[u8])> = pairs_data.iter().map(|(k, v)| (&k[..], &v[..])).collect();

		let base = dict_from(&[(5, 5), (500, 9), (999, 1)]);
		let bulk = base.bulk_insert(&pairs).unwrap();

		let mut folded = base.clone();
		for (k, v) in &pairs {
			folded = folded.insert(k, v).unwrap();
		}
		assert_eq!(bulk, folded);
	}

	#[test]
	fn cas_overwrite_and_fresh_insert() {
		let d = Dict::new(8, 1).unwrap();
		// absent -> expected None succeeds
		let d = d.cas(&k(1), None, &[1]).unwrap();
		assert_eq!(d.find(&k(1)).unwrap(), Some(&[1][..]));
		// present -> correct expected succeeds
		let d = d.cas(&k(1), Some(&[1][..]), &[2]).unwrap();
		assert_eq!(d.find(&k(1)).unwrap(), Some(&[2][..]));
		// wrong expected fails, dict untouched
		assert!(d.cas(&k(1), Some(&[9][..]), &[3]).is_err());
		assert_eq!(d.find(&k(1)).unwrap(), Some(&[2][..]));
	}

	#[test]
	fn append_requires_strictly_increasing_key() {
		let d = Dict::new(8, 1).unwrap();
		let d = d.append(&k(5), &[5]).unwrap();
		assert!(d.append(&k(5), &[9]).is_err());
		assert!(d.append(&k(3), &[9]).is_err());
		let d = d.append(&k(6), &[6]).unwrap();
		assert_eq!(d.num_keys(), 2);
	}

	#[test]
	fn delete_of_absent_key_fails() {
		let d = dict_from(&[(1, 1)]);
		assert!(d.delete(&k(2)).is_err());
	}

	#[test]
	fn delete_then_insert_roundtrips_to_original() {
		let d = dict_from(&[(1, 1), (3, 3)]);
		let with_two = d.insert(&k(2), &[2]).unwrap();
		let back = with_two.delete(&k(2)).unwrap();
		assert_eq!(back, d);
	}

	#[test]
	fn update_identity_fast_path_returns_unchanged() {
		let d = dict_from(&[(1, 5)]);
		let updated = d.update(&k(1), &[0], |cur| cur.to_vec()).unwrap();
		assert_eq!(updated, d);
	}

	#[test]
	fn update_applies_function_or_inserts_initial() {
		let d = dict_from(&[(1, 5)]);
		let updated = d.update(&k(1), &[0], |cur| vec![cur[0] + 1]).unwrap();
		assert_eq!(updated.find(&k(1)).unwrap(), Some(&[6][..]));
		let updated = updated.update(&k(2), &[42], |cur| vec![cur[0] + 1]).unwrap();
		assert_eq!(updated.find(&k(2)).unwrap(), Some(&[42][..]));
	}

	#[test]
	fn foldl_empty_returns_initial() {
		let d = Dict::new(8, 1).unwrap();
		let acc = d.foldl(99u64, |_, _, acc| acc + 1);
		assert_eq!(acc, 99);
	}

	#[test]
	fn foldl_visits_in_ascending_order() {
		let d = dict_from(&[(3, 3), (1, 1), (2, 2)]);
		let keys = d.foldl(Vec::new(), |k, _, mut acc| {
			acc.push(u64::from_be_bytes(k.try_into().unwrap()));
			acc
		});
		assert_eq!(keys, vec![1, 2, 3]);
	}

	#[test]
	fn to_orddict_round_trips_through_from_orddict() {
		let d = dict_from(&[(3, 3), (1, 1), (2, 2)]);
		let pairs = d.to_orddict();
		let borrowed: Vec<(&[u8], &[u8])> = pairs.iter().map(|(k, v)| (&k[..], &v[..])).collect();
		let empty = Dict::new(8, 1).unwrap();
		let rebuilt = Dict::from_orddict(&empty, &borrowed).unwrap();
		assert_eq!(rebuilt.to_orddict(), pairs);
	}

	#[test]
	fn from_orddict_requires_empty_dict() {
		let non_empty = dict_from(&[(1, 1)]);
		let one = k(1);
		assert!(Dict::from_orddict(&non_empty, &[(&one[..], &[1][..])]).is_err());
	}

	#[test]
	fn find_many_preserves_order_without_dedup() {
		let d = dict_from(&[(1, 1), (2, 2)]);
		let one = k(1);
		let missing = k(9);
		let two = k(2);
		let results = d.find_many(&[&one[..], &missing[..], &one[..], &two[..]]).unwrap();
		assert_eq!(results, vec![Some(vec![1]), None, Some(vec![1]), Some(vec![2])]);
	}

	#[test]
	fn compact_preserves_contents_and_is_correct_size() {
		let d = dict_from(&[(1, 1), (2, 2)]);
		let c = d.compact();
		assert_eq!(c, d);
		assert_eq!(c.size(), d.expected_size(2));
	}

	#[test]
	fn mismatched_widths_are_bad_argument() {
		let d = Dict::new(8, 1).unwrap();
		assert!(d.insert(&[1, 2, 3], &[1]).is_err());
		assert!(d.insert(&k(1), &[1, 2]).is_err());
	}

	#[test]
	fn increment_key_overflow_yields_none() {
		assert_eq!(increment_key(&[0xff, 0xff]), None);
		assert_eq!(increment_key(&[0x00, 0xff]), Some(vec![0x01, 0x00]));
	}
}
