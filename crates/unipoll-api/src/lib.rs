// unipoll-api: async client for the controller's legacy REST API
//
// Transport, authentication and the `{ meta, data }` envelope live here.
// Nothing in this crate caches; `unipoll-core` decides when to call it.

pub mod auth;
pub mod error;
pub mod legacy;
pub mod transport;

pub use auth::{ControllerPlatform, Credentials};
pub use error::Error;
pub use legacy::LegacyClient;
pub use transport::{TlsMode, TransportConfig};
