// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything that knows what a model artifact looks like and
// how to call it lives here. Other layers only see the
// `Classifier` trait from Layer 3.
//
//   model.rs      — artifact JSON format, shape validation and
//                   the Classifier implementation for each model
//                   family
//
//   inferencer.rs — invokes a Classifier for one feature vector,
//                   turning errors *and panics* into PredictError
//                   and taking the first (only) result

/// Exported model artifact format and its Classifier impl
pub mod model;

/// Single-vector inference with panic isolation
pub mod inferencer;
