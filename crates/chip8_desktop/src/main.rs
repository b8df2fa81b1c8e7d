use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use log::info;
use minifb::{Key, Window, WindowOptions};

use chip8_core::{
    globals::{SCREEN_HEIGHT, SCREEN_WIDTH},
    Cpu, Step,
};

mod audio;

const SCALING: usize = 8;
const W: usize = SCALING * SCREEN_WIDTH;
const H: usize = SCALING * SCREEN_HEIGHT;
const STEPS_PER_FRAME: usize = 10;
const FPS: usize = 60;

// hex pad keys 0-F mapped onto the left side of a QWERTY layout
const KEYMAP: [Key; 16] = [
    Key::X,
    Key::Key1,
    Key::Key2,
    Key::Key3,
    Key::Q,
    Key::W,
    Key::E,
    Key::A,
    Key::S,
    Key::D,
    Key::Z,
    Key::C,
    Key::Key4,
    Key::R,
    Key::F,
    Key::V,
];

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: chip8_desktop <program.ch8>")?;
    let rom = std::fs::read(&path).with_context(|| format!("reading {}", path))?;
    info!("loaded {} ({} bytes)", path, rom.len());

    let mut cpu = Cpu::new(&rom)?;
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    cpu.seed_rng(seed);

    let mut window = Window::new("CHIP-8", W, H, WindowOptions::default())
        .map_err(|e| anyhow!("opening window: {}", e))?;
    window.set_target_fps(FPS);

    let mut device = audio::get_device();
    let mut frame = vec![0u32; W * H];
    let mut ended = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        poll_keys(&window, &mut cpu);

        for _ in 0..STEPS_PER_FRAME {
            match cpu.step() {
                Step::Running => (),
                Step::WaitingKey => break,
                Step::Ended => {
                    if !ended {
                        info!("program ended");
                        ended = true;
                    }
                    break;
                }
            }
        }

        cpu.tick_timers();
        if let Some(device) = device.as_mut() {
            if cpu.sound_active() {
                device.beep();
            } else {
                device.stop();
            }
        }

        if cpu.take_redraw() {
            read_buffer(&mut frame, &cpu);
        }
        window
            .update_with_buffer(&frame, W, H)
            .map_err(|e| anyhow!("updating window: {}", e))?;
    }
    Ok(())
}

fn poll_keys(window: &Window, cpu: &mut Cpu) {
    for (chip_key, key) in KEYMAP.iter().enumerate() {
        if window.is_key_down(*key) {
            cpu.set_key(chip_key as u8, true);
        } else if window.is_key_released(*key) {
            cpu.set_key(chip_key as u8, false);
        }
    }
    if cpu.waiting_for_key() {
        if let Some(chip_key) = KEYMAP.iter().position(|k| window.is_key_down(*k)) {
            cpu.complete_key_wait(chip_key as u8);
        }
    }
}

fn read_buffer(buffer: &mut [u32], cpu: &Cpu) {
    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let val = if cpu.pixel(x, y) { 0x00FF_FFFF } else { 0 };
            for sy in 0..SCALING {
                for sx in 0..SCALING {
                    let dy = y * SCALING + sy;
                    let dx = x * SCALING + sx;
                    buffer[dy * W + dx] = val;
                }
            }
        }
    }
}
