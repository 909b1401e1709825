//! Yarn Link terminal chat client.
//!
//! The library holds everything except terminal setup, so the request
//! lifecycle can be driven from tests with a fake [`api::Transport`].

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod events;
pub mod models;
pub mod ui;
