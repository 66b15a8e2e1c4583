pub mod config;
pub mod error;
pub mod geometry;
pub mod model;

pub use config::ImageParams;
pub use error::ExtractError;
pub use geometry::Rect;
