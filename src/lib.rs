pub mod bump;
pub mod changelog;
pub mod cli;
pub mod commit;
pub mod config;
pub mod git;
pub mod linker;
pub mod message;
pub mod normalizer;
pub mod patterns;
pub mod pipeline;
pub mod repository;
pub mod splitter;
pub mod types;
