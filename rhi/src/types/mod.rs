//! Value types and create infos of the RHI.
//!
//! Create infos are immutable descriptions consumed once by a
//! [`Device`](crate::Device) factory and never referenced afterwards.

mod binding;
mod buffer;
mod command;
mod common;
mod format;
mod pipeline;
mod sampler;
mod surface;
mod texture;

pub use binding::*;
pub use buffer::*;
pub use command::*;
pub use common::*;
pub use format::*;
pub use pipeline::*;
pub use sampler::*;
pub use surface::*;
pub use texture::*;
