pub mod perft;
pub mod prng;

pub use perft::{perft, perft_test};
pub use prng::PRNG;
