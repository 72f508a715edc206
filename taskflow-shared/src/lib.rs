#![cfg_attr(not(test), forbid(unsafe_code))]

//! Shared models, filters, validation rules, and configuration for the
//! `TaskFlow` client crates.

pub mod config;
pub mod filters;
pub mod models;
pub mod validation;
