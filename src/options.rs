/// Bounds applied while decoding a container and searching for rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Hard cap on the number of chunks read from one container.
    pub max_chunks: usize,
    /// Budget for the lock-step elimination of ring candidates. The budget
    /// is spent before each round, so at most `disambiguation_rounds - 1`
    /// rounds run and values below 2 never resolve a ring.
    pub disambiguation_rounds: usize,
}

impl DecodeOptions {
    pub const DEFAULT_MAX_CHUNKS: usize = 1000;
    pub const DEFAULT_DISAMBIGUATION_ROUNDS: usize = 10;

    pub fn new(max_chunks: usize, disambiguation_rounds: usize) -> Self {
        Self {
            max_chunks,
            disambiguation_rounds,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_chunks: Self::DEFAULT_MAX_CHUNKS,
            disambiguation_rounds: Self::DEFAULT_DISAMBIGUATION_ROUNDS,
        }
    }
}
