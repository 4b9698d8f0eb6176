pub mod filesystem;

pub use filesystem::MediaStore;
