pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod frame;
pub mod init;
pub mod signal;
pub mod tools;
