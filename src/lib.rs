//! Upload a table, classify its columns, preview the retained data and chart
//! one numerical column per stock.
//!
//! The UI (see the `stock-grapher` binary) drives a [`state::Session`] with one
//! [`state::Event`] per user action; everything below it is plain data in,
//! plain data out.

pub mod config;
pub mod data;
pub mod state;
