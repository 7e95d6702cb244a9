//! SWAPI data access: URL canonicalization, cached retrieval, speculative
//! prefetch and relational resolution.

pub mod gateway;
pub mod prefetch;
pub mod resolver;
pub mod transport;
pub mod types;
pub mod url;

#[cfg(test)]
pub mod testing;
