// Topic model backend: capability traits plus the bundled LDA scorer and
// token dictionary.

pub mod dictionary;
pub mod lda;
pub mod traits;
