//! Two-layer pivot compositor.
//!
//! The lower layer squashes about its bottom-centre; the upper layer rotates about one of two
//! pivots chosen by the pose. Together with the sign of the rotation this yields one continuous
//! raise-then-insert gesture from a single phase.

use crate::{
    animation::pose::PoseDescriptor,
    assets::decode::{LayerImage, LayerPair},
    foundation::{
        core::{Affine, Point, Rgba8, Vec2},
        error::SpriteResult,
    },
    render::surface::Surface,
};

/// Horizontal stretch applied to the lower layer per unit of compression.
const LOWER_STRETCH_PER_COMPRESSION: f64 = 0.2;

/// Pivot about which the upper layer rotates for `pose` on a `size`-pixel canvas.
pub fn upper_pivot(size: u32, pose: &PoseDescriptor) -> Point {
    let x = if pose.is_raising_layer {
        (size * 3 / 7) as f64
    } else {
        (size * 2 / 7) as f64
    };
    let y = f64::from(size - size * 2 / 9) + pose.vertical_offset;
    Point::new(x, y)
}

/// Canvas-space transform for the lower layer's `size × size` draw rectangle.
pub fn lower_layer_transform(size: u32, pose: &PoseDescriptor) -> Affine {
    let size = f64::from(size);
    let anchor = Vec2::new(size / 2.0, size);
    let sx = 1.0 + pose.compression * LOWER_STRETCH_PER_COMPRESSION;
    let sy = 1.0 - pose.compression;

    Affine::translate(anchor)
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate(-anchor)
        * Affine::translate(Vec2::new(0.0, pose.vertical_offset))
}

/// Canvas-space transform for the upper layer's `size × size` draw rectangle.
pub fn upper_layer_transform(size: u32, pose: &PoseDescriptor) -> Affine {
    let pivot = upper_pivot(size, pose).to_vec2();
    let (angle, dy) = if pose.is_raising_layer {
        (pose.rotation, pose.vertical_offset)
    } else {
        (
            pose.insertion_rotation,
            pose.vertical_offset + pose.insertion_offset,
        )
    };

    Affine::translate(pivot)
        * Affine::rotate(angle)
        * Affine::translate(-pivot)
        * Affine::translate(Vec2::new(0.0, dy))
}

/// Fill `surface` with `bg` and draw the lower layer, then the upper layer, for `pose`.
///
/// Only `surface` is touched. For identical inputs the resulting pixels are bitwise identical.
pub fn composite_frame(
    surface: &mut Surface,
    layers: &LayerPair,
    pose: &PoseDescriptor,
    bg: Rgba8,
) -> SpriteResult<()> {
    let size = surface.size();
    let extent = f64::from(size);

    surface.paint(|ctx| {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, extent, extent));

        draw_layer(ctx, &layers.lower, lower_layer_transform(size, pose), extent);
        draw_layer(ctx, &layers.upper, upper_layer_transform(size, pose), extent);
        Ok(())
    })
}

fn draw_layer(
    ctx: &mut vello_cpu::RenderContext,
    layer: &LayerImage,
    placement: Affine,
    extent: f64,
) {
    let (w, h) = (f64::from(layer.width()), f64::from(layer.height()));
    // Stretch the source onto the full `extent × extent` rectangle before placement.
    let fit = Affine::scale_non_uniform(extent / w, extent / h);

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(placement * fit));
    ctx.set_paint(layer.paint());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
