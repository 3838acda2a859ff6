// Legacy API client modules
//
// Hand-written client for the controller's legacy (non-OpenAPI) endpoints.
// Covers the stat/ and rest/ reads unipoll polls, all wrapped in the
// standard `{ meta: { rc, msg }, data: [...] }` envelope.

pub mod client;
pub mod clients;
pub mod devices;
pub mod events;
pub mod models;
pub mod session;
pub mod system;
pub mod wlans;

pub use client::LegacyClient;
