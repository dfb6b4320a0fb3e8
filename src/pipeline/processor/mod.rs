pub mod normalizer;

pub use normalizer::TransactionNormalizer;
