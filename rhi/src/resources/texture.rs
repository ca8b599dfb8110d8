//! GPU texture and texture view.

use std::fmt;

use crate::backend::{BackendObject, TextureBackend};
use crate::error::{RhiError, RhiResult};
use crate::types::{
    Extent3d, ObjectId, PixelFormat, TextureCreateInfo, TextureDimension,
    TextureSubResourceCopyFootprint, TextureSubResourceInfo, TextureUsage, TextureViewCreateInfo,
    TextureViewDimension, TextureViewType, TextureAspect,
};

const VALID_SAMPLE_COUNTS: [u32; 5] = [1, 2, 4, 8, 16];

pub(crate) fn validate_texture_create_info(info: &TextureCreateInfo) -> RhiResult<()> {
    if info.extent.is_empty() {
        return Err(RhiError::InvalidParameter(format!(
            "texture {:?} has an empty extent {:?}",
            info.label, info.extent
        )));
    }
    if info.dimension == TextureDimension::D1 && info.extent.height != 1 {
        return Err(RhiError::InvalidParameter(format!(
            "1D texture {:?} must have height 1, got {}",
            info.label, info.extent.height
        )));
    }

    let max_mips = info.max_mip_levels();
    if info.mip_levels == 0 || info.mip_levels > max_mips {
        return Err(RhiError::InvalidParameter(format!(
            "texture {:?} requests {} mip levels, extent allows 1..={max_mips}",
            info.label, info.mip_levels
        )));
    }

    if !VALID_SAMPLE_COUNTS.contains(&info.samples) {
        return Err(RhiError::InvalidParameter(format!(
            "texture {:?} has invalid sample count {}",
            info.label, info.samples
        )));
    }
    if info.samples > 1 && (info.dimension != TextureDimension::D2 || info.mip_levels != 1) {
        return Err(RhiError::InvalidParameter(format!(
            "multisampled texture {:?} must be 2D with a single mip level",
            info.label
        )));
    }

    if info.usages.contains(TextureUsage::DEPTH_STENCIL_ATTACHMENT) && !info.format.is_depth() {
        return Err(RhiError::UnsupportedFormat(info.format));
    }
    if info.usages.contains(TextureUsage::RENDER_ATTACHMENT) && info.format.is_depth() {
        return Err(RhiError::UnsupportedFormat(info.format));
    }

    Ok(())
}

/// A GPU texture resource.
///
/// Created by [`Device::create_texture`](crate::Device::create_texture), or
/// owned by a [`SwapChain`](crate::SwapChain) and lent out by reference.
pub struct Texture {
    id: ObjectId,
    info: TextureCreateInfo,
    raw: Box<dyn TextureBackend>,
}

impl Texture {
    pub(crate) fn new(raw: Box<dyn TextureBackend>, info: TextureCreateInfo) -> Self {
        Self {
            id: ObjectId::next(),
            info,
            raw,
        }
    }

    /// Get the texture identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the create info the texture was created with.
    pub fn create_info(&self) -> &TextureCreateInfo {
        &self.info
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.info.label.as_deref()
    }

    /// Get the texel format.
    pub fn format(&self) -> PixelFormat {
        self.info.format
    }

    /// Get the extent of mip level 0.
    pub fn extent(&self) -> Extent3d {
        self.info.extent
    }

    /// Get the mip level count.
    pub fn mip_levels(&self) -> u32 {
        self.info.mip_levels
    }

    /// Get the array layer count.
    pub fn array_layer_count(&self) -> u32 {
        self.info.array_layer_count()
    }

    /// Layout of one sub-resource in a linear buffer, as used by
    /// buffer/texture copies.
    ///
    /// # Panics
    ///
    /// Panics if the mip level or array layer does not exist in the texture.
    pub fn copy_footprint(
        &self,
        sub_resource: TextureSubResourceInfo,
    ) -> TextureSubResourceCopyFootprint {
        assert!(
            sub_resource.mip_level < self.info.mip_levels,
            "Texture::copy_footprint: mip level {} exceeds the {} mip levels of texture {:?}",
            sub_resource.mip_level,
            self.info.mip_levels,
            self.info.label
        );
        assert!(
            sub_resource.array_layer < self.info.array_layer_count(),
            "Texture::copy_footprint: array layer {} exceeds the {} layers of texture {:?}",
            sub_resource.array_layer,
            self.info.array_layer_count(),
            self.info.label
        );

        let mut extent = self
            .info
            .extent
            .mip_level_size(sub_resource.mip_level, self.info.dimension);
        if self.info.dimension != TextureDimension::D3 {
            extent.depth = 1;
        }

        let bytes_per_pixel = match sub_resource.aspect {
            TextureAspect::Stencil => 1,
            _ => self.info.format.bytes_per_pixel(),
        };
        let align = TextureSubResourceCopyFootprint::ROW_PITCH_ALIGNMENT;
        let row_pitch =
            (u64::from(extent.width) * u64::from(bytes_per_pixel)).div_ceil(align) * align;
        let slice_pitch = row_pitch * u64::from(extent.height);

        TextureSubResourceCopyFootprint {
            extent,
            bytes_per_pixel,
            row_pitch,
            slice_pitch,
            total_bytes: slice_pitch * u64::from(extent.depth),
        }
    }

    /// Create a view over a mip/array range of the texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the range exceeds the texture, the view dimension
    /// or aspect is incompatible with the texture, or the texture usage does
    /// not allow the view type.
    pub fn create_view(&self, info: &TextureViewCreateInfo) -> RhiResult<TextureView> {
        self.validate_view(info)?;

        let raw = self.raw.create_view(info)?;
        log::trace!(
            "Texture: created {:?} {:?} view of {:?} ({}), mips {}+{}, layers {}+{}",
            info.view_type,
            info.dimension,
            self.info.label,
            self.id,
            info.base_mip_level,
            info.mip_level_count,
            info.base_array_layer,
            info.array_layer_count
        );

        Ok(TextureView {
            id: ObjectId::next(),
            texture_id: self.id,
            info: *info,
            format: self.info.format,
            extent: self
                .info
                .extent
                .mip_level_size(info.base_mip_level, self.info.dimension),
            samples: self.info.samples,
            raw,
        })
    }

    fn validate_view(&self, info: &TextureViewCreateInfo) -> RhiResult<()> {
        let label = &self.info.label;

        if info.mip_level_count == 0 {
            return Err(RhiError::ViewOutOfRange(format!(
                "view of texture {label:?} covers zero mip levels"
            )));
        }
        let mip_end = info.base_mip_level.checked_add(info.mip_level_count);
        if mip_end.is_none_or(|end| end > self.info.mip_levels) {
            return Err(RhiError::ViewOutOfRange(format!(
                "mip range {}+{} exceeds the {} mip levels of texture {label:?}",
                info.base_mip_level, info.mip_level_count, self.info.mip_levels
            )));
        }

        let layers = self.info.array_layer_count();
        if info.array_layer_count == 0 {
            return Err(RhiError::ViewOutOfRange(format!(
                "view of texture {label:?} covers zero array layers"
            )));
        }
        let layer_end = info.base_array_layer.checked_add(info.array_layer_count);
        if layer_end.is_none_or(|end| end > layers) {
            return Err(RhiError::ViewOutOfRange(format!(
                "layer range {}+{} exceeds the {layers} array layers of texture {label:?}",
                info.base_array_layer, info.array_layer_count
            )));
        }

        let compatible = match (self.info.dimension, info.dimension) {
            (TextureDimension::D1, TextureViewDimension::D1) => info.array_layer_count == 1,
            (TextureDimension::D2, TextureViewDimension::D2) => info.array_layer_count == 1,
            (TextureDimension::D2, TextureViewDimension::D2Array) => true,
            (TextureDimension::D2, TextureViewDimension::Cube) => {
                info.array_layer_count == 6 && self.info.extent.width == self.info.extent.height
            }
            (TextureDimension::D2, TextureViewDimension::CubeArray) => {
                info.array_layer_count % 6 == 0
                    && self.info.extent.width == self.info.extent.height
            }
            (TextureDimension::D3, TextureViewDimension::D3) => true,
            _ => false,
        };
        if !compatible {
            return Err(RhiError::IncompatibleView(format!(
                "{:?} view with {} layer(s) is incompatible with {:?} texture {label:?} ({}x{})",
                info.dimension,
                info.array_layer_count,
                self.info.dimension,
                self.info.extent.width,
                self.info.extent.height
            )));
        }

        if !info.aspect.is_present_in(self.info.format) {
            return Err(RhiError::IncompatibleView(format!(
                "{:?} aspect does not exist in format {:?} of texture {label:?}",
                info.aspect, self.info.format
            )));
        }

        let required = info.view_type.required_usage();
        if !self.info.usages.contains(required) {
            return Err(RhiError::IncompatibleView(format!(
                "{:?} view requires {:?} usage, texture {label:?} has {:?}",
                info.view_type, required, self.info.usages
            )));
        }

        let attachment = matches!(
            info.view_type,
            TextureViewType::ColorAttachment | TextureViewType::DepthStencil
        );
        if attachment && info.mip_level_count != 1 {
            return Err(RhiError::IncompatibleView(format!(
                "attachment view of texture {label:?} must cover exactly one mip level"
            )));
        }

        Ok(())
    }

    /// Destroy the texture.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn TextureBackend {
        self.raw.as_ref()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        log::trace!("Texture: destroyed {:?} ({})", self.info.label, self.id);
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("label", &self.info.label)
            .field("dimension", &self.info.dimension)
            .field("extent", &self.info.extent)
            .field("format", &self.info.format)
            .finish()
    }
}

/// A mip/array range of a [`Texture`].
///
/// The view does not own the texture and must not outlive it.
pub struct TextureView {
    id: ObjectId,
    texture_id: ObjectId,
    info: TextureViewCreateInfo,
    format: PixelFormat,
    extent: Extent3d,
    samples: u32,
    raw: Box<dyn BackendObject>,
}

impl TextureView {
    /// Get the view identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Identity of the viewed texture.
    pub fn texture_id(&self) -> ObjectId {
        self.texture_id
    }

    /// Get the create info the view was created with.
    pub fn create_info(&self) -> &TextureViewCreateInfo {
        &self.info
    }

    /// How the view is used.
    pub fn view_type(&self) -> TextureViewType {
        self.info.view_type
    }

    /// Format of the viewed texture.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Extent of the first mip level in the view.
    pub fn extent(&self) -> Extent3d {
        self.extent
    }

    /// Sample count of the viewed texture.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Destroy the view.
    pub fn destroy(self) {
        drop(self);
    }

    pub(crate) fn raw(&self) -> &dyn BackendObject {
        self.raw.as_ref()
    }
}

impl fmt::Debug for TextureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureView")
            .field("id", &self.id)
            .field("texture_id", &self.texture_id)
            .field("info", &self.info)
            .finish()
    }
}

static_assertions::assert_impl_all!(Texture: Send, Sync);
static_assertions::assert_impl_all!(TextureView: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use crate::RhiError;
    use crate::test_support::dummy_device;
    use crate::types::{
        PixelFormat, TextureAspect, TextureCreateInfo, TextureSubResourceInfo, TextureUsage,
        TextureViewCreateInfo, TextureViewDimension, TextureViewType,
    };

    fn sampled_view(dimension: TextureViewDimension) -> TextureViewCreateInfo {
        TextureViewCreateInfo::new(TextureViewType::TextureBinding, dimension)
    }

    #[test]
    fn test_create_texture_validation() {
        let device = dummy_device();

        let sampled = TextureUsage::TEXTURE_BINDING;
        let empty = TextureCreateInfo::new_2d(0, 16, PixelFormat::Rgba8Unorm, sampled);
        assert!(matches!(device.create_texture(&empty), Err(RhiError::InvalidParameter(_))));

        let too_many_mips =
            TextureCreateInfo::new_2d(16, 16, PixelFormat::Rgba8Unorm, sampled).with_mip_levels(6);
        assert!(device.create_texture(&too_many_mips).is_err());

        let attachment = TextureUsage::RENDER_ATTACHMENT;
        let bad_samples =
            TextureCreateInfo::new_2d(16, 16, PixelFormat::Rgba8Unorm, attachment).with_samples(3);
        assert!(device.create_texture(&bad_samples).is_err());

        let depth_as_color = TextureCreateInfo::new_2d(16, 16, PixelFormat::D32Float, attachment);
        assert_eq!(
            device.create_texture(&depth_as_color).err(),
            Some(RhiError::UnsupportedFormat(PixelFormat::D32Float))
        );

        let ok =
            TextureCreateInfo::new_2d(16, 16, PixelFormat::Rgba8Unorm, sampled).with_mip_levels(5);
        let texture = device.create_texture(&ok).unwrap();
        assert_eq!(texture.create_info(), &ok);
    }

    #[test]
    fn test_mip_range_out_of_bounds() {
        let device = dummy_device();
        let texture = device
            .create_texture(
                &TextureCreateInfo::new_2d(
                    64,
                    64,
                    PixelFormat::Rgba8Unorm,
                    TextureUsage::TEXTURE_BINDING,
                )
                .with_mip_levels(4),
            )
            .unwrap();
        let mips = |base, count| sampled_view(TextureViewDimension::D2).with_mip_range(base, count);

        assert!(texture.create_view(&mips(0, 4)).is_ok());
        assert!(texture.create_view(&mips(3, 1)).is_ok());

        for (base, count) in [(0, 5), (3, 2), (4, 1), (0, 0)] {
            let result = texture.create_view(&mips(base, count));
            assert!(
                matches!(result, Err(RhiError::ViewOutOfRange(_))),
                "mip range {base}+{count} should fail"
            );
        }
    }

    #[test]
    fn test_cube_view_requires_six_layers() {
        let device = dummy_device();
        let cube = device
            .create_texture(&TextureCreateInfo::new_cube(
                32,
                PixelFormat::Rgba16Float,
                TextureUsage::TEXTURE_BINDING,
            ))
            .unwrap();
        assert!(cube
            .create_view(&sampled_view(TextureViewDimension::Cube).with_array_range(0, 6))
            .is_ok());
        assert!(matches!(
            cube.create_view(&sampled_view(TextureViewDimension::Cube).with_array_range(0, 3)),
            Err(RhiError::IncompatibleView(_))
        ));
        assert!(matches!(
            cube.create_view(&sampled_view(TextureViewDimension::D3)),
            Err(RhiError::IncompatibleView(_))
        ));
        assert!(cube
            .create_view(&sampled_view(TextureViewDimension::D2).with_array_range(5, 1))
            .is_ok());
        assert!(matches!(
            cube.create_view(&sampled_view(TextureViewDimension::D2Array).with_array_range(4, 3)),
            Err(RhiError::ViewOutOfRange(_))
        ));
    }

    #[test]
    fn test_view_aspect_and_usage() {
        let device = dummy_device();
        let depth = device
            .create_texture(&TextureCreateInfo::new_2d(
                128,
                128,
                PixelFormat::D24UnormS8Uint,
                TextureUsage::DEPTH_STENCIL_ATTACHMENT,
            ))
            .unwrap();

        let view_info =
            TextureViewCreateInfo::new(TextureViewType::DepthStencil, TextureViewDimension::D2)
                .with_aspect(TextureAspect::DepthStencil);
        assert!(depth.create_view(&view_info).is_ok());

        let color_aspect = view_info.with_aspect(TextureAspect::Color);
        assert!(matches!(depth.create_view(&color_aspect), Err(RhiError::IncompatibleView(_))));

        let sampled =
            TextureViewCreateInfo::new(TextureViewType::TextureBinding, TextureViewDimension::D2)
                .with_aspect(TextureAspect::Depth);
        assert!(matches!(depth.create_view(&sampled), Err(RhiError::IncompatibleView(_))));
    }

    #[test]
    fn test_copy_footprint() {
        let device = dummy_device();
        let texture = device
            .create_texture(
                &TextureCreateInfo::new_2d(100, 50, PixelFormat::Rgba8Unorm, TextureUsage::COPY_DST)
                    .with_mip_levels(2)
                    .with_array_layers(4),
            )
            .unwrap();

        let footprint = texture.copy_footprint(TextureSubResourceInfo::default());
        assert_eq!(footprint.bytes_per_pixel, 4);
        assert_eq!(footprint.row_pitch, 512);
        assert_eq!(footprint.slice_pitch, 512 * 50);
        assert_eq!(footprint.total_bytes, 512 * 50);

        let mip1 = texture.copy_footprint(TextureSubResourceInfo::new(1, 3, TextureAspect::Color));
        assert_eq!(mip1.extent.width, 50);
        assert_eq!(mip1.extent.height, 25);
        assert_eq!(mip1.row_pitch, 256);
    }

    #[test]
    #[should_panic(expected = "mip level 40 exceeds the 2 mip levels")]
    fn test_copy_footprint_rejects_missing_mip() {
        let device = dummy_device();
        let texture = device
            .create_texture(
                &TextureCreateInfo::new_2d(64, 64, PixelFormat::Rgba8Unorm, TextureUsage::COPY_DST)
                    .with_mip_levels(2),
            )
            .unwrap();
        texture.copy_footprint(TextureSubResourceInfo::new(40, 0, TextureAspect::Color));
    }
}
