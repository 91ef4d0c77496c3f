//! Platform-independent core library for vitals-rs
//!
//! This crate contains all logic of the heart-rate / SpO2 monitoring
//! dashboard that does not depend on a particular host: bounded reading
//! history, the statistics engine, status classification, prediction
//! banding, raw-record normalization, the real-time database event-stream
//! decoder, feed subscription bookkeeping, and the dashboard pages.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles for embedded
//! displays as well as desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod feed;
pub mod ingest;
pub mod metrics;
pub mod monitor;
pub mod pages;
pub mod predictions;
pub mod reading;
pub mod stats;
pub mod storage;
pub mod ui;
