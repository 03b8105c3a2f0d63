// Server-side integration layer behind the web UI:
// - App configuration and daemon wiring
// - Entry-point service composing the builders, client and usage logger
// - Best-effort usage logging
// - HTTP surface

pub mod config;
pub mod http_server;
pub mod service;
pub mod usage_log;
