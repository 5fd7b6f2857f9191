//! Random scramble generation.

use cube_types::{Face, MoveToken};
use rand::Rng;

/// Number of tokens in a default shuffle.
pub const DEFAULT_SHUFFLE_LENGTH: usize = 12;

/// The twelve primitive tokens a shuffle draws from.
const SHUFFLE_POOL: [Face; 6] = [
	Face::Front,
	Face::Back,
	Face::Up,
	Face::Down,
	Face::Left,
	Face::Right,
];

/// Draws `len` primitive tokens uniformly using the given generator.
pub fn random_shuffle_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<MoveToken> {
	(0..len)
		.map(|_| {
			let face = SHUFFLE_POOL[rng.gen_range(0..SHUFFLE_POOL.len())];
			if rng.gen_bool(0.5) {
				MoveToken::clockwise(face)
			} else {
				MoveToken::counter_clockwise(face)
			}
		})
		.collect()
}

/// Draws `len` primitive tokens from the thread-local generator.
pub fn random_shuffle(len: usize) -> Vec<MoveToken> {
	random_shuffle_with(&mut rand::thread_rng(), len)
}
