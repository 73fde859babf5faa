use crate::{
    foundation::{
        core::Resolution,
        error::{SpriteError, SpriteResult},
        math::unpremultiply_rgba8_in_place,
    },
    render::frame::FrameRgba,
};

/// Square premultiplied RGBA8 raster reused across frames.
///
/// A surface is exclusively borrowed by whichever run draws into it; the compositor clears and
/// redraws it on every sample instead of allocating a fresh buffer.
pub struct Surface {
    size: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("size", &self.size).finish()
    }
}

impl Surface {
    /// Acquire a surface with side length `resolution`.
    pub fn new(resolution: Resolution) -> SpriteResult<Self> {
        Self::with_side(resolution.px())
    }

    /// Acquire a surface of any non-zero side that fits the rasterizer.
    pub fn with_side(px: u32) -> SpriteResult<Self> {
        let size: u16 = px
            .try_into()
            .map_err(|_| SpriteError::validation("surface side exceeds u16"))?;
        if size == 0 {
            return Err(SpriteError::validation("surface side must be non-zero"));
        }
        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::new(size, size),
            ctx: None,
        })
    }

    pub fn size(&self) -> u32 {
        u32::from(self.size)
    }

    /// Overwrite every pixel with a premultiplied RGBA8 value.
    pub fn clear(&mut self, premul_rgba: [u8; 4]) {
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul_rgba);
        }
    }

    /// Premultiplied pixel bytes, row-major.
    pub fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy the current contents out as a straight-alpha frame.
    pub fn read_back(&self) -> SpriteResult<FrameRgba> {
        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        FrameRgba::new(self.size(), self.size(), data)
    }

    /// Record draw calls with `f` and rasterize them, replacing the current contents.
    pub(crate) fn paint<R>(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> SpriteResult<R>,
    ) -> SpriteResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == self.size && ctx.height() == self.size => ctx,
            _ => vello_cpu::RenderContext::new(self.size, self.size),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = Some(ctx);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
