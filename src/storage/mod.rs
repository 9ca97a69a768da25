//! Storage backends for embedding vectors.

pub mod vector;
