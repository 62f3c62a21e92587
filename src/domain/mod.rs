// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the service
// works with: a feature vector in, a species label out, and
// the process-wide readiness state in between.
//
// Rules for this layer:
//   - NO axum / reqwest / tokio types
//   - NO file I/O or network calls
//   - Only structs, enums, traits and their invariants
//
// The model itself is opaque here — it is just something that
// implements `Classifier`. How it is stored, fetched and
// deserialised lives in Layers 5 and 6.

// Four-value input vector and its invariants
pub mod features;

// Raw model output and the fixed species lookup table
pub mod label;

// Readiness / liveness flags and the installed model slot
pub mod state;

// One structured record per prediction attempt
pub mod event;

// Typed failures shared across layers
pub mod errors;

// Seams to the external collaborators (model, storage, telemetry)
pub mod traits;
