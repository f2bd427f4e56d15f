pub mod catalog;
pub mod directory;

pub use catalog::CatalogPort;
pub use directory::DirectoryPort;
