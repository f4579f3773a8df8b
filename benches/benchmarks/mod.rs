pub mod assembly;
pub mod lanczos;
