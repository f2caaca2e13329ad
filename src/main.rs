// 16 8-bit data registers named V0 to VF
// I -> address register (12 bits)
//
// Delay timer & Sound timer: count down at 60 times / s until 0
// Beep when sound timer is non-zero
//
// Separately:
// CPU: 500 times per second by default
// Timers & Display: 60 times per second
use std::{fs, path::PathBuf, time::Instant};

use anyhow::Context;
use chip8vm::{memory::PROGRAM_START, prelude::*};
use clap::Parser;
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;

use window::WindowHost;

mod sound;
mod window;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Trace every executed instruction
    #[arg(short, long)]
    debug: bool,

    /// Instructions per second, 0 runs unthrottled
    #[arg(long, default_value_t = chip8vm::config::DEFAULT_CPU_FREQUENCY.0)]
    ips: u64,

    /// Timer ticks and frames per second
    #[arg(long, default_value_t = chip8vm::config::DEFAULT_REFRESH_RATE.0)]
    fps: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("initialising logger")?;

    let rom = fs::read(&args.rom)
        .with_context(|| format!("reading ROM {}", args.rom.display()))?;

    let config = Config {
        cpu_frequency: Hz(args.ips),
        refresh_rate: Hz(args.fps),
        debug: args.debug,
    };

    let mut emu = Emulator::new(&config);
    emu.load_program(&rom)
        .with_context(|| format!("loading ROM {}", args.rom.display()))?;
    debug!("program:\n{}", emu.mem.dump(PROGRAM_START, rom.len())?);

    let mut host = WindowHost::new("chip8vm - ESC to exit").context("opening window")?;
    Scheduler::new(&config, Instant::now()).run(&mut emu, &mut host)?;

    debug!("display on exit:\n{}", emu.dump_display()?);
    debug!("stack on exit:\n{}", emu.dump_stack()?);
    Ok(())
}
