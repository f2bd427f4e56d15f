pub mod local;

pub use local::SwapsLocalClient;
