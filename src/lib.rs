//! # Gap Radar
//!
//! Market-gap analysis for business ideas.
//!
//! A free-text query is scored against a fixed catalog of job-to-be-done
//! opportunities. The matching records give context to a language model,
//! which classifies the query into market gaps, a revenue/competition
//! heatmap and a competitive landscape. When the model is unavailable or
//! answers with something undecodable, every part of the result is
//! synthesized from the catalog instead, so an analysis always completes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌────────────┐
//! │   Catalog   │──▶│  Relevance  │──▶│  Analyzer  │◀── completion API
//! │ (6 records) │   │   scoring   │   │ + fallback │
//! └─────────────┘   └─────────────┘   └─────┬──────┘
//!                                           │
//!                      ┌────────────────────┼──────────────┐
//!                      ▼                    ▼              ▼
//!                 ┌──────────┐       ┌──────────┐    ┌──────────┐
//!                 │   CLI    │       │   HTTP   │    │  Report  │
//!                 │  (gapr)  │       │  (axum)  │    │  (HTML)  │
//!                 └──────────┘       └──────────┘    └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`catalog`] | Built-in opportunity records |
//! | [`relevance`] | Query tokenization and relevance scoring |
//! | [`heatmap`] | Heatmap point normalization |
//! | [`gaps`] | Gap synthesis and fallback analyses |
//! | [`decode`] | Tolerant decoding of completion responses |
//! | [`completion`] | Completion provider abstraction |
//! | [`prompts`] | Prompt builders |
//! | [`planning`] | MVP proposal and roadmap defaults |
//! | [`analysis`] | The analysis service |
//! | [`debounce`] | Debounced suggestion requests |
//! | [`report`] | HTML report export |
//! | [`auth`] | Hosted auth client |
//! | [`session`] | Signed-in session state |
//! | [`server`] | HTTP API |
//! | [`cli`] | `gapr` command implementations |

pub mod analysis;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod debounce;
pub mod decode;
pub mod gaps;
pub mod heatmap;
pub mod models;
pub mod planning;
pub mod prompts;
pub mod relevance;
pub mod report;
pub mod server;
pub mod session;
