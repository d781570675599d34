//! Core data structures: physical array layouts, samples and batches, and
//! the catalog of named data products a pipeline run can hold.

pub mod arrays;
pub mod products;
pub mod sample;

#[cfg(test)]
mod tests;
