pub mod display;
pub mod filter;
pub mod pool;
pub mod random;

pub use display::{DisplayMode, KanaMode, VocabMode};
pub use pool::{DrawError, SessionPool};
pub use random::RandomSource;
