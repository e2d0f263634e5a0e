//! Bearer token lifecycle: storage, expiry checks and the request
//! interceptor that keeps every outbound call authenticated.

pub mod store;
pub mod token;
pub mod transport;

pub use store::{InMemoryTokenStore, TokenStore};
pub use token::is_token_valid;
pub use transport::{AuthenticatedTransport, Credentials};
