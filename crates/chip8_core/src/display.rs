use crate::globals::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Maps screen coordinates to a byte index and bit mask
/// within the framebuffer region, most significant bit first.
#[inline(always)]
pub fn bit_pos(x: usize, y: usize) -> (usize, u8) {
    let px = y * SCREEN_WIDTH + x;
    (px / 8, 0x80 >> (px % 8))
}

/// Mutable view over the framebuffer region of machine memory.
///
/// Pixel coordinates must already lie within the 64x32 screen,
/// no reduction is performed here.
pub struct Framebuffer<'a> {
    buffer: &'a mut [u8],
}

impl<'a> Framebuffer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Framebuffer { buffer }
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (i, mask) = bit_pos(x, y);
        self.buffer[i] & mask != 0
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let (i, mask) = bit_pos(x, y);
        if on {
            self.buffer[i] |= mask;
        } else {
            self.buffer[i] &= !mask;
        }
    }

    /// XOR-composites an 8 pixel wide sprite at (x, y), clipping rows and
    /// columns that fall outside the screen. Returns the collision flag.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, &byte) in sprite.iter().enumerate() {
            let py = y + row;
            if py >= SCREEN_HEIGHT {
                break;
            }
            for col in 0..8 {
                let px = x + col;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if byte & (0x80 >> col) == 0 {
                    continue;
                }
                if self.pixel(px, py) {
                    collision = true;
                    self.set_pixel(px, py, false);
                } else {
                    self.set_pixel(px, py, true);
                }
            }
        }
        collision
    }
}
