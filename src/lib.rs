//! Near-duplicate image detection.
//!
//! Every image in a directory gets a 64-bit difference hash. Images whose
//! hashes are within a small Hamming distance of an already kept image are
//! treated as copies of it, and only the best copy (by resolution or by file
//! size) ends up in the output directory.

pub mod core;
