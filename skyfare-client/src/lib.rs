pub mod client;
pub mod error;
pub mod session;

pub use client::{ApiClient, SearchForm, DEFAULT_API_URL};
pub use error::{ClientError, ClientResult};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
