//! Session establishment: token cache, validation and the browser
//! authorization-code flow.

pub mod callback;
pub mod error;
pub mod exchange;
pub mod manager;
pub mod store;
pub mod token;
pub mod validator;

pub use callback::{CallbackPayload, CallbackServer};
pub use error::AuthError;
pub use exchange::{authorize_url, CodeExchanger};
pub use manager::{AuthNotice, AuthNotifier, AuthorizationManager};
pub use store::{FileTokenStore, TokenStore};
pub use token::{AuthorizationCode, PersistedSession, Session, SessionToken};
pub use validator::TokenValidator;
