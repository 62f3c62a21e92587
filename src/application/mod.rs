// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers; does no I/O of its own and
// knows nothing about HTTP status codes.
//
//   config.rs           — ServeConfig, all load-time settings
//   lifecycle.rs        — startup load / explicit reload, the
//                         single writer of ServiceState
//   predict_use_case.rs — validate → infer → normalise → record

// Load-time configuration
pub mod config;

// Model loading lifecycle (Starting → Ready | Degraded)
pub mod lifecycle;

// The /predict workflow
pub mod predict_use_case;
