// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the outside world:
//
//   artifact_loader.rs — cache-first model loading; falls back to
//                        remote storage and writes the cache
//
//   object_store.rs    — ObjectStore implementations (GCS JSON
//                        API over HTTPS, or a local directory
//                        mirror for file:// endpoints)
//
//   credentials.rs     — reads the bearer token used to talk to
//                        remote storage
//
//   telemetry.rs       — EventSink that turns prediction events
//                        into structured tracing events
//
// The application layer only sees the traits from Layer 3
// (ModelSource, EventSink), so each of these can be swapped
// without touching the request path.

/// Cache-first artifact loading
pub mod artifact_loader;

/// Remote and mirrored blob storage
pub mod object_store;

/// Storage bearer-token file
pub mod credentials;

/// Prediction event sinks
pub mod telemetry;
