pub mod client;
pub mod config;
pub mod core;
pub mod logging;
pub mod session;
pub mod view;

// Re-export commonly used types
pub use client::{ApiClient, ApiError};
pub use core::{DatasetId, Payload, PreviewResult, ProfileResult};
pub use session::{Session, SessionSnapshot};
pub use view::{preview_view, profile_view, PreviewView, ProfileView};
