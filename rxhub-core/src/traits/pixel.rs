//! Pixel-strip buffer
//!
//! The core only changes what the strip should show. Pushing the buffer to
//! the LEDs is left to the implementation and happens outside interrupt
//! context, after [`PixelBuffer::request_flush`].

/// Local framebuffer of the BIN pixel strip
///
/// LED numbers are 1-indexed as on the wire; out-of-range numbers are
/// ignored by implementations.
pub trait PixelBuffer {
    /// Turn every LED off
    fn clear_all(&mut self);

    /// Turn one LED on, leaving the others as they are
    fn set_one(&mut self, led: u8);

    /// Turn one LED on and the previously exclusive LED off
    fn set_exclusive(&mut self, led: u8);

    /// Turn exactly the listed LEDs on
    fn set_mask_and_clear_others(&mut self, leds: &[u8]);

    /// Ask for the buffer to be written out at the next opportunity
    fn request_flush(&mut self);
}

impl<T: PixelBuffer + ?Sized> PixelBuffer for &mut T {
    fn clear_all(&mut self) {
        (**self).clear_all()
    }

    fn set_one(&mut self, led: u8) {
        (**self).set_one(led)
    }

    fn set_exclusive(&mut self, led: u8) {
        (**self).set_exclusive(led)
    }

    fn set_mask_and_clear_others(&mut self, leds: &[u8]) {
        (**self).set_mask_and_clear_others(leds)
    }

    fn request_flush(&mut self) {
        (**self).request_flush()
    }
}
