// Palisade: a content-moderation decision pipeline.
//
// This is the library root. Each module corresponds to a major subsystem:
// scoring (toxicity assessment with provider fallback), moderation (state
// machine, gate, appeals, read-side queries), db (SQLite persistence with
// an append-only audit log), and web (the HTTP surface).

pub mod config;
pub mod db;
pub mod error;
pub mod moderation;
pub mod scoring;
pub mod web;
