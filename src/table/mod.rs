pub mod builder;

pub use builder::TableBuilder;
