use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    display::{bit_pos, Framebuffer},
    errors::ChipError,
    font::FONT_SET,
    globals::{
        GLYPH_SIZE, KEY_COUNT, PROG_CAPACITY, PROG_START, RAM_SIZE, REG_COUNT, SCREEN_HEIGHT,
        SCREEN_OFFSET, SCREEN_WIDTH, STACK_OFFSET, STACK_SIZE,
    },
    utils::{u16_from_three, u8_from_two},
};

/// Outcome of a single instruction step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Running,
    /// The input-wait latch is set; nothing is fetched until the host
    /// resolves it with [`Cpu::complete_key_wait`].
    WaitingKey,
    /// The program counter has moved past the end of the loaded program.
    Ended,
}

pub struct Cpu {
    memory: [u8; RAM_SIZE],
    program_len: u16,
    v: [u8; REG_COUNT],
    pc: u16,
    i: u16,
    sp: u8,
    delay_timer: u8,
    sound_timer: u8,
    keys: [bool; KEY_COUNT],
    wait_reg: Option<u8>,
    rng: SmallRng,
    redraw: bool,
}

impl Cpu {
    /// Builds a machine with `program` loaded at 0x200 and the font
    /// glyphs at the bottom of memory.
    pub fn new(program: &[u8]) -> Result<Self, ChipError> {
        if program.len() > PROG_CAPACITY {
            return Err(ChipError::OutOfMemory(program.len()));
        }
        let mut cpu = Cpu {
            memory: [0; RAM_SIZE],
            program_len: program.len() as u16,
            v: [0; REG_COUNT],
            pc: PROG_START,
            i: 0,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; KEY_COUNT],
            wait_reg: None,
            rng: SmallRng::seed_from_u64(0),
            redraw: false,
        };
        cpu.memory[..FONT_SET.len()].copy_from_slice(&FONT_SET);
        let start = PROG_START as usize;
        cpu.memory[start..start + program.len()].copy_from_slice(program);
        Ok(cpu)
    }

    /// Reseeds the random source; seeding is the host's concern.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (i, mask) = bit_pos(x % SCREEN_WIDTH, y % SCREEN_HEIGHT);
        self.memory[SCREEN_OFFSET + i] & mask != 0
    }

    pub fn display_buffer(&self) -> &[u8] {
        &self.memory[SCREEN_OFFSET..]
    }

    /// Checks and clears the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        if self.redraw {
            self.redraw = false;
            return true;
        }
        false
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keys[(key & 0xF) as usize] = pressed;
    }

    pub fn waiting_for_key(&self) -> bool {
        self.wait_reg.is_some()
    }

    /// Writes the observed key into the latch's target register and
    /// clears the latch so stepping resumes.
    pub fn complete_key_wait(&mut self, key: u8) {
        if let Some(reg) = self.wait_reg.take() {
            self.v[reg as usize] = key & 0xF;
        }
    }

    /// Decrements both countdown timers; the host calls this at its own
    /// cadence, conventionally once per display frame.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// Executes one instruction. While the input-wait latch is set, or once
    /// the program counter has run past the program, nothing is fetched.
    pub fn step(&mut self) -> Step {
        if self.wait_reg.is_some() {
            return Step::WaitingKey;
        }
        if self.pc >= PROG_START + self.program_len {
            return Step::Ended;
        }
        let op = self.fetch();
        self.pc = self.pc.wrapping_add(2);
        match op {
            (0, 0, 0xE, 0) => {
                self.framebuffer().clear();
                self.redraw = true;
            }
            (0, 0, 0xE, 0xE) => self.pc = self.pop_stack(),
            // machine subroutine call, taken as a plain jump
            (0, n0, n1, n2) => self.pc = u16_from_three(n0, n1, n2),
            (1, n0, n1, n2) => self.pc = u16_from_three(n0, n1, n2),
            (2, n0, n1, n2) => {
                self.push_stack(self.pc);
                self.pc = u16_from_three(n0, n1, n2);
            }
            (3, x, n0, n1) => {
                if self.v[x as usize] == u8_from_two(n0, n1) {
                    self.skip();
                }
            }
            (4, x, n0, n1) => {
                if self.v[x as usize] != u8_from_two(n0, n1) {
                    self.skip();
                }
            }
            (5, x, y, _) => {
                if self.v[x as usize] == self.v[y as usize] {
                    self.skip();
                }
            }
            (6, x, n0, n1) => self.v[x as usize] = u8_from_two(n0, n1),
            (7, x, n0, n1) => {
                let x = x as usize;
                self.v[x] = self.v[x].wrapping_add(u8_from_two(n0, n1));
            }
            (8, x, y, op) => self.alu(x as usize, y as usize, op),
            (9, x, y, _) => {
                if self.v[x as usize] != self.v[y as usize] {
                    self.skip();
                }
            }
            (0xA, n0, n1, n2) => self.i = u16_from_three(n0, n1, n2),
            (0xB, n0, n1, n2) => {
                self.pc = u16_from_three(n0, n1, n2).wrapping_add(self.v[0] as u16);
            }
            (0xC, x, n0, n1) => {
                self.v[x as usize] = self.rng.gen::<u8>() & u8_from_two(n0, n1);
            }
            (0xD, x, y, n) => self.draw(x as usize, y as usize, n as usize),
            (0xE, x, c, d) => {
                let key = (self.v[x as usize] & 0xF) as usize;
                let pressed = self.keys[key];
                match (c, d) {
                    (9, 0xE) => {
                        if pressed {
                            self.skip();
                        }
                    }
                    (0xA, 1) => {
                        if !pressed {
                            self.skip();
                        }
                    }
                    _ => (),
                }
                // checking a held key consumes the press
                if pressed {
                    self.keys[key] = false;
                }
            }
            (0xF, x, 0, 7) => self.v[x as usize] = self.delay_timer,
            (0xF, x, 0, 0xA) => self.wait_reg = Some(x),
            (0xF, x, 1, 5) => self.delay_timer = self.v[x as usize],
            (0xF, x, 1, 8) => self.sound_timer = self.v[x as usize],
            (0xF, x, 1, 0xE) => self.i = self.i.wrapping_add(self.v[x as usize] as u16),
            (0xF, x, 2, 9) => self.i = GLYPH_SIZE as u16 * self.v[x as usize] as u16,
            (0xF, x, 3, 3) => {
                let val = self.v[x as usize];
                self.write_byte(self.i, val / 100);
                self.write_byte(self.i.wrapping_add(1), val / 10 % 10);
                self.write_byte(self.i.wrapping_add(2), val % 10);
            }
            (0xF, x, 5, 5) => {
                for off in 0..=x as u16 {
                    self.write_byte(self.i.wrapping_add(off), self.v[off as usize]);
                }
                self.i = self.i.wrapping_add(x as u16 + 1);
            }
            (0xF, x, 6, 5) => {
                for off in 0..=x as u16 {
                    self.v[off as usize] = self.read_byte(self.i.wrapping_add(off));
                }
                self.i = self.i.wrapping_add(x as u16 + 1);
            }
            // anything unrecognized degrades to a no-op
            _ => (),
        };
        Step::Running
    }

    fn fetch(&self) -> (u8, u8, u8, u8) {
        let hi = self.read_byte(self.pc);
        let lo = self.read_byte(self.pc.wrapping_add(1));
        (hi >> 4, hi & 0x0F, lo >> 4, lo & 0x0F)
    }

    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    // addresses wrap at the 4 KiB boundary
    fn read_byte(&self, addr: u16) -> u8 {
        self.memory[addr as usize % RAM_SIZE]
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        self.memory[addr as usize % RAM_SIZE] = val;
    }

    fn alu(&mut self, x: usize, y: usize, op: u8) {
        match op {
            0 => self.v[x] = self.v[y],
            1 => self.v[x] |= self.v[y],
            2 => self.v[x] &= self.v[y],
            3 => self.v[x] ^= self.v[y],
            4 => {
                let sum = self.v[x] as u16 + self.v[y] as u16;
                self.v[x] = sum as u8;
                self.v[0xF] = if sum > 0xFF { 1 } else { 0 };
            }
            5 => {
                self.v[0xF] = if self.v[x] < self.v[y] { 0 } else { 1 };
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
            }
            6 => {
                self.v[0xF] = self.v[y] & 0x01;
                self.v[y] >>= 1;
                self.v[x] = self.v[y];
            }
            7 => {
                self.v[0xF] = if self.v[y] < self.v[x] { 0 } else { 1 };
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
            }
            0xE => {
                self.v[0xF] = self.v[y] >> 7;
                self.v[y] <<= 1;
                self.v[x] = self.v[y];
            }
            _ => (),
        }
    }

    fn draw(&mut self, x: usize, y: usize, lines: usize) {
        let start_x = self.v[x] as usize % SCREEN_WIDTH;
        let start_y = self.v[y] as usize % SCREEN_HEIGHT;
        // sprite rows may alias any region of memory, including the screen,
        // so snapshot them before blitting
        let mut rows = [0u8; 16];
        for (off, row) in rows[..lines].iter_mut().enumerate() {
            *row = self.read_byte(self.i.wrapping_add(off as u16));
        }
        let collision = self
            .framebuffer()
            .draw_sprite(start_x, start_y, &rows[..lines]);
        self.v[0xF] = collision as u8;
        self.redraw = true;
    }

    fn framebuffer(&mut self) -> Framebuffer<'_> {
        Framebuffer::new(&mut self.memory[SCREEN_OFFSET..])
    }

    fn push_stack(&mut self, val: u16) {
        let addr = STACK_OFFSET + 2 * (self.sp as usize % STACK_SIZE);
        self.memory[addr..addr + 2].copy_from_slice(&val.to_be_bytes());
        self.sp = self.sp.wrapping_add(1);
    }

    fn pop_stack(&mut self) -> u16 {
        self.sp = self.sp.wrapping_sub(1);
        let addr = STACK_OFFSET + 2 * (self.sp as usize % STACK_SIZE);
        u16::from_be_bytes([self.memory[addr], self.memory[addr + 1]])
    }
}
