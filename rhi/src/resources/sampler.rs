//! Texture sampler.

use std::fmt;

use crate::backend::BackendObject;
use crate::types::{ObjectId, SamplerCreateInfo};

/// A texture sampler.
///
/// Created by [`Device::create_sampler`](crate::Device::create_sampler).
pub struct Sampler {
    id: ObjectId,
    info: SamplerCreateInfo,
    raw: Box<dyn BackendObject>,
}

impl Sampler {
    pub(crate) fn new(raw: Box<dyn BackendObject>, info: SamplerCreateInfo) -> Self {
        Self {
            id: ObjectId::next(),
            info,
            raw,
        }
    }

    /// Get the sampler identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the create info the sampler was created with.
    pub fn create_info(&self) -> &SamplerCreateInfo {
        &self.info
    }

    /// Whether this is a comparison sampler.
    pub fn is_comparison(&self) -> bool {
        self.info.compare.is_some()
    }

    /// Destroy the sampler.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("id", &self.id)
            .field("label", &self.info.label)
            .finish()
    }
}

static_assertions::assert_impl_all!(Sampler: Send, Sync);
