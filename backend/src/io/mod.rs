//! # IO Module
//!
//! Transport adapters. The only one is the JSON REST API in [`rest`].

pub mod rest;
