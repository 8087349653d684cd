//! The 64-bit digest used by repositories created with the original tool.
//!
//! The construction is SHA-1's compression function with three deviations
//! that existing `meta<id>` files depend on:
//!
//! - each `update` call is cut into 512-byte chunks and only the first 64
//!   bytes of a chunk enter the message schedule (short chunks are zero-padded);
//! - bytes are read as signed 8-bit values and sign-extended into the words;
//! - there is no length padding, and the 160-bit state is packed into a `u64`
//!   by overlapping 12-bit shifts, discarding most of it.
//!
//! Collisions are easy. Use it only to read and extend legacy repositories.

use boo_types::Fingerprint;

use crate::hasher::Fingerprinter;

const CHUNK_BYTES: usize = 512;
const BLOCK_BYTES: usize = 64;
const SCHEDULE_WORDS: usize = 80;

const INITIAL_STATE: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

/// Running state of the legacy digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacySha {
    state: [u32; 5],
}

impl Default for LegacySha {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacySha {
    pub fn new() -> Self {
        Self {
            state: INITIAL_STATE,
        }
    }

    /// The packed 64-bit value.
    pub fn value(&self) -> u64 {
        let [h0, h1, h2, h3, h4] = self.state.map(u64::from);
        (h0 << 48) | (h1 << 36) | (h2 << 24) | (h3 << 12) | h4
    }

    fn compress(&mut self, chunk: &[u8]) {
        let mut block = [0u8; BLOCK_BYTES];
        let n = chunk.len().min(BLOCK_BYTES);
        block[..n].copy_from_slice(&chunk[..n]);

        let mut w = [0u32; SCHEDULE_WORDS];
        for (i, word) in block.chunks_exact(4).enumerate() {
            w[i] = word.iter().fold(0u32, |acc, &b| {
                (acc << 8).wrapping_add(b as i8 as i32 as u32)
            });
        }
        for i in 16..SCHEDULE_WORDS {
            w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
        }

        let [mut a, mut b, mut c, mut d, mut e] = self.state;
        for (i, &wi) in w.iter().enumerate() {
            let (f, k) = match i {
                0..=19 => ((b & c) | (!b & d), 0x5A827999),
                20..=39 => (b ^ c ^ d, 0x6ED9EBA1),
                40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1BBCDC),
                _ => (b ^ c ^ d, 0xCA62C1D6),
            };
            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(wi);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        for (h, v) in self.state.iter_mut().zip([a, b, c, d, e]) {
            *h = h.wrapping_add(v);
        }
    }
}

impl Fingerprinter for LegacySha {
    fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(CHUNK_BYTES) {
            self.compress(chunk);
        }
    }

    fn digest(&self) -> Fingerprint {
        Fingerprint::Legacy(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(parts: &[&[u8]]) -> u64 {
        let mut sha = LegacySha::new();
        for part in parts {
            sha.update(part);
        }
        sha.value()
    }

    // Digests recorded by existing legacy repositories.
    #[test]
    fn matches_original_outputs() {
        assert_eq!(digest_of(&[b""]), 18436536070315696624);
        assert_eq!(digest_of(&[b"hello"]), 17546024129407874841);
        assert_eq!(digest_of(&[b"world"]), 7854137011571505454);
        assert_eq!(digest_of(&[b"abc"]), 17724988318689396920);
        assert_eq!(digest_of(&[&[b'a'; 600]]), 17256562284696319044);
        assert_eq!(digest_of(&[b"hello", b"world"]), 18230390967355044988);
    }

    #[test]
    fn high_bytes_are_sign_extended() {
        assert_eq!(digest_of(&[b"\xff\x80zz"]), 13258543186252387986);
    }

    #[test]
    fn only_first_64_bytes_of_a_chunk_count() {
        let mut tail_differs = vec![b'a'; 64];
        tail_differs.extend_from_slice(b"bbbbbb");
        assert_eq!(digest_of(&[&[b'a'; 70]]), 17005539416258559421);
        assert_eq!(digest_of(&[&tail_differs]), 17005539416258559421);
    }

    #[test]
    fn empty_update_leaves_initial_state() {
        let sha = LegacySha::new();
        assert_eq!(sha.value(), digest_of(&[]));
        assert_eq!(digest_of(&[b"", b""]), sha.value());
    }

    #[test]
    fn digest_does_not_consume_state() {
        let mut sha = LegacySha::new();
        sha.update(b"hello");
        let first = sha.digest();
        assert_eq!(sha.digest(), first);
        assert_eq!(first.to_string(), "17546024129407874841");
    }
}
