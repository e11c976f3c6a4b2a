//! Drill engine for Japanese kana, words and phrases. The terminal UI in
//! `main.rs` is a thin shell over these modules.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod session;
pub mod speech;
pub mod store;
