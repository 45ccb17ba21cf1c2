//! ferret library
//!
//! Provider registry, uniform search dispatch and result normalization for
//! AnswerHub, GitHub and Slack, plus the CLI that drives them.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod opener;
pub mod search;
pub mod ui;
