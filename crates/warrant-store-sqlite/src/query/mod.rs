//! SQL composition for justification reads.

pub mod args;
pub mod filter;
pub mod limited;
pub mod projection;
pub mod sort;
