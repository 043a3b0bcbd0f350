pub mod filter;
pub mod scan;
