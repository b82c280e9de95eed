//! Pixel-strip framebuffer
//!
//! Holds what the BIN strip should show. Interrupt handlers only change the
//! buffer and ask for a flush; the main loop pushes it to the strip with
//! [`Framebuffer::flush_if_pending`].

use rxhub_core::scheduler::elapsed;
use rxhub_core::traits::PixelBuffer;
use smart_leds::RGB8;

/// Colour of a lit LED
pub const LED_ON: RGB8 = RGB8 { r: 0xFF, g: 0, b: 0 };

/// Colour of a dark LED
pub const LED_OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Sink for a full strip image
pub trait StripWriter {
    type Error;

    /// Take one complete frame of colours, first LED first
    fn write(&mut self, pixels: &[RGB8]) -> Result<(), Self::Error>;
}

/// Framebuffer for `N` LEDs, numbered 1..=N
pub struct Framebuffer<const N: usize> {
    pixels: [RGB8; N],
    dirty: bool,
    flush_pending: bool,
    exclusive: Option<u8>,
    last_flush: Option<u32>,
    min_flush_ticks: u32,
}

impl<const N: usize> Default for Framebuffer<N> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<const N: usize> Framebuffer<N> {
    /// Create a dark framebuffer
    ///
    /// `min_flush_ticks` spaces physical writes; 0 writes on every flush.
    pub const fn new(min_flush_ticks: u32) -> Self {
        Self {
            pixels: [LED_OFF; N],
            dirty: false,
            flush_pending: false,
            exclusive: None,
            last_flush: None,
            min_flush_ticks,
        }
    }

    /// Blank the strip and schedule the first write
    pub fn init(&mut self) {
        self.clear_all();
        self.flush_pending = true;
    }

    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// True when the 1-indexed `led` is lit
    pub fn is_lit(&self, led: u8) -> bool {
        Self::index(led).is_some_and(|i| self.pixels[i] != LED_OFF)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_flush_pending(&self) -> bool {
        self.flush_pending
    }

    fn index(led: u8) -> Option<usize> {
        (led as usize).checked_sub(1).filter(|i| *i < N)
    }

    fn set(&mut self, led: u8, color: RGB8) {
        if let Some(i) = Self::index(led) {
            if self.pixels[i] != color {
                self.pixels[i] = color;
                self.dirty = true;
            }
        }
    }

    /// Write the buffer out if a flush was requested and something changed
    ///
    /// The write runs inside a critical section so no interrupt can change
    /// the buffer halfway through. Returns `Ok(true)` when a write happened.
    pub fn flush_if_pending<W: StripWriter>(
        &mut self,
        now: u32,
        writer: &mut W,
    ) -> Result<bool, W::Error> {
        if !self.flush_pending {
            return Ok(false);
        }
        if !self.dirty {
            self.flush_pending = false;
            return Ok(false);
        }
        if let Some(last) = self.last_flush {
            if elapsed(now, last) < self.min_flush_ticks as i32 {
                return Ok(false);
            }
        }

        critical_section::with(|_| writer.write(&self.pixels))?;
        self.dirty = false;
        self.flush_pending = false;
        self.last_flush = Some(now);
        Ok(true)
    }
}

impl<const N: usize> PixelBuffer for Framebuffer<N> {
    fn clear_all(&mut self) {
        for led in self.pixels.iter_mut() {
            *led = LED_OFF;
        }
        self.dirty = true;
        self.exclusive = None;
    }

    fn set_one(&mut self, led: u8) {
        self.set(led, LED_ON);
    }

    fn set_exclusive(&mut self, led: u8) {
        if let Some(previous) = self.exclusive {
            if previous != led {
                self.set(previous, LED_OFF);
            }
        }
        if Self::index(led).is_some() {
            self.set(led, LED_ON);
            self.exclusive = Some(led);
        }
    }

    fn set_mask_and_clear_others(&mut self, leds: &[u8]) {
        self.clear_all();
        for &led in leds {
            self.set(led, LED_ON);
        }
    }

    fn request_flush(&mut self) {
        self.flush_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        writes: usize,
        last: [RGB8; 8],
    }

    impl StripWriter for Recorder {
        type Error = ();

        fn write(&mut self, pixels: &[RGB8]) -> Result<(), ()> {
            self.writes += 1;
            self.last.copy_from_slice(pixels);
            Ok(())
        }
    }

    struct Broken;

    impl StripWriter for Broken {
        type Error = u8;

        fn write(&mut self, _pixels: &[RGB8]) -> Result<(), u8> {
            Err(7)
        }
    }

    #[test]
    fn test_set_one_is_one_indexed() {
        let mut fb: Framebuffer<8> = Framebuffer::new(0);
        fb.set_one(1);
        fb.set_one(8);
        fb.set_one(0);
        fb.set_one(9);
        assert_eq!(fb.pixels()[0], LED_ON);
        assert_eq!(fb.pixels()[7], LED_ON);
        assert_eq!(fb.pixels().iter().filter(|p| **p == LED_ON).count(), 2);
    }

    #[test]
    fn test_exclusive_turns_previous_off() {
        let mut fb: Framebuffer<8> = Framebuffer::new(0);
        fb.set_one(2);
        fb.set_exclusive(3);
        fb.set_exclusive(5);
        assert!(fb.is_lit(2));
        assert!(!fb.is_lit(3));
        assert!(fb.is_lit(5));

        // Out-of-range request still turns the previous LED off
        fb.set_exclusive(40);
        assert!(!fb.is_lit(5));
        fb.set_exclusive(5);
        assert!(fb.is_lit(5));
    }

    #[test]
    fn test_mask_clears_others() {
        let mut fb: Framebuffer<8> = Framebuffer::new(0);
        fb.set_one(1);
        fb.set_mask_and_clear_others(&[4, 6]);
        assert!(!fb.is_lit(1));
        assert!(fb.is_lit(4));
        assert!(fb.is_lit(6));
    }

    #[test]
    fn test_flush_needs_request_and_change() {
        let mut fb: Framebuffer<8> = Framebuffer::new(0);
        let mut out = Recorder::default();

        fb.set_one(3);
        assert_eq!(fb.flush_if_pending(0, &mut out), Ok(false));

        fb.request_flush();
        assert_eq!(fb.flush_if_pending(0, &mut out), Ok(true));
        assert_eq!(out.last[2], LED_ON);
        assert!(!fb.is_dirty());

        // Nothing changed since the last write
        fb.request_flush();
        assert_eq!(fb.flush_if_pending(1, &mut out), Ok(false));
        assert!(!fb.is_flush_pending());
        assert_eq!(out.writes, 1);
    }

    #[test]
    fn test_flush_throttle() {
        let mut fb: Framebuffer<8> = Framebuffer::new(3);
        let mut out = Recorder::default();

        fb.set_one(1);
        fb.request_flush();
        assert_eq!(fb.flush_if_pending(10, &mut out), Ok(true));

        fb.set_one(2);
        fb.request_flush();
        assert_eq!(fb.flush_if_pending(12, &mut out), Ok(false));
        assert!(fb.is_flush_pending());
        assert_eq!(fb.flush_if_pending(13, &mut out), Ok(true));
        assert_eq!(out.writes, 2);
    }

    #[test]
    fn test_failed_write_keeps_request() {
        let mut fb: Framebuffer<8> = Framebuffer::new(0);
        fb.init();
        assert_eq!(fb.flush_if_pending(0, &mut Broken), Err(7));
        assert!(fb.is_dirty());
        assert!(fb.is_flush_pending());
    }
}
