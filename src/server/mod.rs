//! Capacity API server.
//!
//! ## Overview
//!
//! A stateless axum server exposing a handful of fixed JSON endpoints and
//! serving the pre-built React app from the static directory.
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────┐
//! │  Client  │ ───────> │  app.rs   (Router, CORS, TraceLayer, serve)  │
//! │  (React) │ <─────── │    ├─ api.rs     /api/health, /api/data,     │
//! └──────────┘          │    │             /api/navigation             │
//!                       │    └─ assets.rs  static files + SPA fallback │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Every request is independent; the only shared state is an immutable
//! `Arc<AppState>`.

pub mod api;
pub mod app;
pub mod assets;
pub mod models;

pub use app::{ServerConfig, build_app, build_router, start_server};
