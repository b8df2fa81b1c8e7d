pub const RAM_SIZE: usize = 4096;
pub const STACK_SIZE: usize = 16;
pub const REG_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;

pub const PROG_START: u16 = 0x200;
pub const STACK_OFFSET: usize = 0xEA0;
pub const SCREEN_OFFSET: usize = 0xF00;
pub const PROG_CAPACITY: usize = STACK_OFFSET - PROG_START as usize;

pub const GLYPH_SIZE: usize = 5;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT / 8;
