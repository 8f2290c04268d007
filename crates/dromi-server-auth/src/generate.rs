// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Random identifier and slug generation.

use bip39::Language;
use rand::seq::SliceRandom;
use rand::Rng;

/// Alphabet for public ids. Omits the lookalikes `0`, `I`, `L`, `O`, `i`, `l` and `o`.
pub const PUBLIC_ID_ALPHABET: &str = "123456789ABCDEFGHJKMNPQRSTUVWXYZabcdefghjkmnopqrstuvwxyz";

/// Length of a public id.
pub const PUBLIC_ID_LENGTH: usize = 21;

/// Number of words in a generated slug.
pub const PASSPHRASE_WORDS: usize = 4;

/// Generate a 21-character public id over [`PUBLIC_ID_ALPHABET`].
pub fn generate_public_id() -> String {
	let alphabet = PUBLIC_ID_ALPHABET.as_bytes();
	let mut rng = rand::thread_rng();
	(0..PUBLIC_ID_LENGTH)
		.map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
		.collect()
}

/// Generate a time-ordered UUID v7 string.
pub fn generate_ordered_id() -> String {
	uuid7::uuid7().to_string()
}

/// Generate a human-readable slug such as `orbit-lemon-trade-fossil`.
///
/// Words come from the BIP-39 English list, lowercase, joined by `-`.
pub fn generate_passphrase(words: usize) -> String {
	let wordlist = Language::English.word_list();
	let mut rng = rand::thread_rng();
	(0..words)
		.filter_map(|_| wordlist.choose(&mut rng).copied())
		.collect::<Vec<_>>()
		.join("-")
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn public_id_has_fixed_length() {
		assert_eq!(generate_public_id().len(), PUBLIC_ID_LENGTH);
	}

	#[test]
	fn public_ids_differ() {
		assert_ne!(generate_public_id(), generate_public_id());
	}

	#[test]
	fn ordered_id_is_uuid_v7() {
		let id = generate_ordered_id();
		assert_eq!(id.len(), 36);
		assert_eq!(id.chars().nth(14), Some('7'));
	}

	#[test]
	fn passphrase_has_four_lowercase_words() {
		let slug = generate_passphrase(PASSPHRASE_WORDS);
		let parts: Vec<&str> = slug.split('-').collect();
		assert_eq!(parts.len(), PASSPHRASE_WORDS);
		for part in parts {
			assert!(!part.is_empty());
			assert!(part.chars().all(|c| c.is_ascii_lowercase()));
		}
	}

	proptest! {
		#[test]
		fn passphrase_word_count_matches_request(words in 1usize..10) {
			let slug = generate_passphrase(words);
			prop_assert_eq!(slug.split('-').count(), words);
		}
	}
}
