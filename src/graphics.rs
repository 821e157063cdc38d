//! embedded-graphics draw target over a layer painter
use core::convert::Infallible;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    pixelcolor::Rgb888,
    primitives::Rectangle,
    Pixel,
};

use crate::blit::{Blitter, Region};
use crate::framebuffer::Color;
use crate::raster::Painter;

// Single pixels take the accessor path, solid areas the blitter. Everything
// is clipped to the layer, so the wrap-around of raw coordinates never
// shows up through this interface.
impl<B: Blitter + ?Sized> DrawTarget for Painter<'_, '_, B> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let size = self.size();
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x as u32 >= size.width || y as u32 >= size.height {
                continue;
            }
            self.draw_pixel(x as u32, y as u32, Color::from(color));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }

        let region = Region::within(
            self.surface().width(),
            area.top_left.x as u32,
            area.top_left.y as u32,
            area.size.width,
            area.size.height,
        );
        let result = self.fill_region(region, Color::from(color));
        self.absorb("fill_solid", result);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Painter::clear(self, Color::from(color));
        Ok(())
    }
}

impl<B: Blitter + ?Sized> OriginDimensions for Painter<'_, '_, B> {
    fn size(&self) -> Size {
        Size::new(self.surface().width(), self.surface().height())
    }
}
