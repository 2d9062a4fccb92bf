//! HTTP request handlers.

pub mod health;
pub mod redirect;

pub use health::health_check;
pub use redirect::follow_slug;
