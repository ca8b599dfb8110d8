//! GPU resources and their views.

mod buffer;
mod sampler;
mod texture;

pub use buffer::{Buffer, BufferView, MappedRange};
pub use sampler::Sampler;
pub use texture::{Texture, TextureView};

pub(crate) use texture::validate_texture_create_info;
