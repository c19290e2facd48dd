//! # Treasurehunt - Venue Treasure Hunt Engine
//!
//! Treasurehunt drives a location-by-location treasure hunt: players register
//! with an event code, unlock a fixed sequence of venue locations by scanning
//! each location's QR code, take a selfie there and answer a trivia question.
//!
//! ## Features
//!
//! - **Single Game Store**: One state aggregate mutated only through typed actions
//!   and a pure reducer.
//! - **Sequential Unlocking**: Exactly one location is open at a time, derived from
//!   the completed list.
//! - **Quiz Cooldown**: A wrong answer locks the quiz for a configurable period
//!   (3 hours by default).
//! - **Camera and Scanning**: Single-stream camera management and a cancellable QR
//!   scan loop on Tokio.
//! - **Notifications**: Auto-expiring toasts with early dismissal.
//! - **Achievements**: Progress badges evaluated on read.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treasurehunt::config::Config;
//! use treasurehunt::hunt::HuntSession;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut session = HuntSession::new(config);
//!     session.navigate("/");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`hunt`] - Game store, unlock policy, progress, camera, scanner and session
//! - [`config`] - Configuration management
//! - [`validation`] - Registration input validation
//! - [`logutil`] - Log sanitizing helpers
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HuntSession   │ ← Views, guards, toasts
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   GameStore     │ ← Reducer, unlock policy, progress
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Camera/Scanner  │ ← Device boundary
//! └─────────────────┘
//! ```

pub mod config;
pub mod hunt;
pub mod logutil;
pub mod validation;
