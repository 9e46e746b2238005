pub mod client;
pub mod image;
pub mod imagen;
pub mod types;

pub use client::GeminiHttpClient;
pub use image::GeminiImageClient;
pub use imagen::ImagenClient;
