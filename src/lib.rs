//! # imovlocal-client
//!
//! Client-side core engines for the ImovLocal real-estate classifieds
//! frontend: the advertising banner display engine and the property
//! create/edit form controller, plus the typed REST boundary they share.
//!
//! Rendering, routing, and auth screens live in the host application; this
//! crate owns the stateful logic underneath them. Each banner slot and each
//! form instance owns its state exclusively — the only shared value is the
//! [`net::ApiClient`], which is immutable per call and cheap to clone.

pub mod banner;
pub mod config;
pub mod form;
pub mod model;
pub mod net;
pub mod session;

pub use banner::BannerEngine;
pub use config::{ClientConfig, CurrencyLocale};
pub use form::PropertyForm;
pub use net::ApiClient;
pub use session::{SessionContext, SessionStore};
