// ============================================================
// Layer 4 — Request Data
// ============================================================
// Turns raw request bytes into a validated FeatureVector.
//
//   POST /predict body (bytes)
//       │
//       ▼
//   serde_json::Value   → is it JSON at all? is it an object?
//       │
//       ▼
//   per-field coercion  → number, or a string holding a number
//       │
//       ▼
//   FeatureVector       → four finite values, fixed order
//
// Every field is checked before reporting, so a caller who got
// two fields wrong hears about both in one 422 response.

/// Parses and validates /predict request bodies
pub mod validator;
