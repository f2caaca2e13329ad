//! Run loop.
//!
//! Instructions and timer/render updates run on two independent cadences.
//! Every iteration first drains host input, then checks each deadline.
use std::{
    thread,
    time::{Duration, Instant},
};

use log::{debug, info};

use crate::{
    config::Config,
    display::DisplayBuffer,
    emulator::{Emulator, Flow},
    error::Chip8Result,
    keyboard::Keypad,
    timer::Cadence,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    Continue,
    /// Stop the run loop. Machine state is simply dropped.
    Quit,
}

/// Hooks to provide the IO devices of the machine.
pub trait Host {
    /// Drains pending input events without blocking, writing key state
    /// into the keypad, and reports whether the session should end.
    fn poll(&mut self, keypad: &mut Keypad) -> HostSignal;

    /// Presents the display buffer. Called once per refresh tick.
    fn present(&mut self, display: &DisplayBuffer) -> Chip8Result<()>;

    /// Turns the buzzer on or off. Only called when the state changes.
    fn buzz(&mut self, _on: bool) {}
}

pub struct Scheduler {
    cpu: Cadence,
    refresh: Cadence,
    buzzing: bool,
    cycles: u64,
}

impl Scheduler {
    pub fn new(config: &Config, now: Instant) -> Self {
        Self {
            cpu: Cadence::new(config.cpu_frequency, now),
            refresh: Cadence::new(config.refresh_rate, now),
            buzzing: false,
            cycles: 0,
        }
    }

    /// Instructions executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// One iteration of the run loop, against the given instant.
    pub fn step(
        &mut self,
        now: Instant,
        emu: &mut Emulator,
        host: &mut impl Host,
    ) -> Chip8Result<HostSignal> {
        if host.poll(emu.keypad_mut()) == HostSignal::Quit {
            return Ok(HostSignal::Quit);
        }

        if self.cpu.due(now) {
            // key waits simply retry on the next cycle
            if emu.cycle() != Flow::KeyWait {
                self.cycles += 1;
            }
        }

        if self.refresh.due(now) {
            emu.tick_timers();

            let buzzing = emu.sound_active();
            if buzzing != self.buzzing {
                self.buzzing = buzzing;
                host.buzz(buzzing);
            }

            host.present(emu.display())?;
        }

        Ok(HostSignal::Continue)
    }

    /// Time until the nearest deadline.
    fn idle_time(&self, now: Instant) -> Duration {
        self.cpu.remaining(now).min(self.refresh.remaining(now))
    }

    /// Runs until the host asks to quit.
    pub fn run(&mut self, emu: &mut Emulator, host: &mut impl Host) -> Chip8Result<()> {
        info!(
            "running at {:?} per instruction, {:?} per frame",
            self.cpu.interval(),
            self.refresh.interval()
        );

        let start = Instant::now();
        self.cpu.reset(start);
        self.refresh.reset(start);

        while self.step(Instant::now(), emu, host)? == HostSignal::Continue {
            let idle = self.idle_time(Instant::now());
            if !idle.is_zero() {
                thread::sleep(idle);
            }
        }

        if self.buzzing {
            self.buzzing = false;
            host.buzz(false);
        }

        debug!("stopped after {} instructions", self.cycles);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Hz;

    #[derive(Default)]
    struct FakeHost {
        polls: usize,
        quit_on_poll: Option<usize>,
        press_on_poll: Option<(usize, u8)>,
        frames: usize,
        buzzes: Vec<bool>,
    }

    impl Host for FakeHost {
        fn poll(&mut self, keypad: &mut Keypad) -> HostSignal {
            self.polls += 1;
            if let Some((poll, key)) = self.press_on_poll {
                if poll == self.polls {
                    keypad.set_pressed(key, true);
                }
            }
            if self.quit_on_poll == Some(self.polls) {
                HostSignal::Quit
            } else {
                HostSignal::Continue
            }
        }

        fn present(&mut self, _display: &DisplayBuffer) -> Chip8Result<()> {
            self.frames += 1;
            Ok(())
        }

        fn buzz(&mut self, on: bool) {
            self.buzzes.push(on);
        }
    }

    fn setup(program: &[u8]) -> (Scheduler, Emulator, Instant) {
        let config = Config::default();
        let mut emu = Emulator::with_seed(&config, 1);
        emu.load_program(program).unwrap();
        let start = Instant::now();
        (Scheduler::new(&config, start), emu, start)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ADD V1, 01 repeated
    const COUNTER: [u8; 16] = [
        0x71, 0x01, 0x71, 0x01, 0x71, 0x01, 0x71, 0x01, 0x71, 0x01, 0x71, 0x01, 0x71, 0x01, 0x71,
        0x01,
    ];

    #[test]
    fn test_instruction_cadence() {
        let (mut sched, mut emu, start) = setup(&COUNTER);
        let mut host = FakeHost::default();

        sched.step(start + ms(1), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 0);

        sched.step(start + ms(2), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 1);

        // one instruction per due deadline, even when the loop spins
        sched.step(start + ms(2), &mut emu, &mut host).unwrap();
        sched.step(start + ms(3), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 1);

        sched.step(start + ms(4), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 2);
        assert_eq!(sched.cycles(), 2);
        assert_eq!(host.frames, 0);
    }

    #[test]
    fn test_stall_is_not_caught_up() {
        let (mut sched, mut emu, start) = setup(&COUNTER);
        let mut host = FakeHost::default();

        sched.step(start + ms(100), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 1);
        assert_eq!(host.frames, 1);
    }

    #[test]
    fn test_refresh_ticks_timers_and_presents() {
        #[rustfmt::skip]
        let (mut sched, mut emu, start) = setup(&[
            0x61, 0x03, // LD V1, 03
            0xF1, 0x15, // LD DT, V1
            0x12, 0x04, // JP 204
        ]);
        let mut host = FakeHost::default();

        sched.step(start + ms(2), &mut emu, &mut host).unwrap();
        sched.step(start + ms(4), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.delay.get(), 3);
        assert_eq!(host.frames, 0);

        sched.step(start + ms(17), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.delay.get(), 2);
        assert_eq!(host.frames, 1);

        sched.step(start + ms(30), &mut emu, &mut host).unwrap();
        assert_eq!(host.frames, 1);

        sched.step(start + ms(34), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.delay.get(), 1);
        assert_eq!(host.frames, 2);
    }

    #[test]
    fn test_buzz_follows_sound_timer() {
        #[rustfmt::skip]
        let (mut sched, mut emu, start) = setup(&[
            0x61, 0x02, // LD V1, 02
            0xF1, 0x18, // LD ST, V1
            0x12, 0x04, // JP 204
        ]);
        let mut host = FakeHost::default();

        sched.step(start + ms(2), &mut emu, &mut host).unwrap();
        sched.step(start + ms(4), &mut emu, &mut host).unwrap();
        // 2 -> 1, still sounding
        sched.step(start + ms(17), &mut emu, &mut host).unwrap();
        assert_eq!(host.buzzes, vec![true]);
        // 1 -> 0
        sched.step(start + ms(34), &mut emu, &mut host).unwrap();
        assert_eq!(host.buzzes, vec![true, false]);
        sched.step(start + ms(51), &mut emu, &mut host).unwrap();
        assert_eq!(host.buzzes, vec![true, false]);
    }

    #[test]
    fn test_input_drained_before_execution() {
        let (mut sched, mut emu, start) = setup(&[0xF1, 0x0A]);
        let mut host = FakeHost {
            press_on_poll: Some((2, 0x7)),
            ..Default::default()
        };

        sched.step(start + ms(2), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.pc.0, 0x200);
        assert_eq!(sched.cycles(), 0);

        sched.step(start + ms(4), &mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 0x7);
        assert_eq!(emu.regs.pc.0, 0x202);
    }

    #[test]
    fn test_key_wait_keeps_timers_and_frames_running() {
        #[rustfmt::skip]
        let (mut sched, mut emu, start) = setup(&[
            0x61, 0x03, // LD V1, 03
            0xF1, 0x15, // LD DT, V1
            0xF2, 0x0A, // LD V2, K
        ]);
        let mut host = FakeHost::default();

        sched.step(start + ms(2), &mut emu, &mut host).unwrap();
        sched.step(start + ms(4), &mut emu, &mut host).unwrap();
        assert_eq!(sched.cycles(), 2);
        assert_eq!(emu.regs.delay.get(), 3);

        sched.step(start + ms(17), &mut emu, &mut host).unwrap();
        assert_eq!(host.frames, 1);
        assert_eq!(emu.regs.delay.get(), 2);

        sched.step(start + ms(34), &mut emu, &mut host).unwrap();
        assert_eq!(host.frames, 2);
        assert_eq!(emu.regs.delay.get(), 1);

        assert_eq!(sched.cycles(), 2);
        assert_eq!(emu.regs.pc.0, 0x204);
        assert_eq!(emu.regs.get(0x2), 0);
    }

    #[test]
    fn test_quit_stops_before_execution() {
        let (mut sched, mut emu, start) = setup(&COUNTER);
        let mut host = FakeHost {
            quit_on_poll: Some(1),
            ..Default::default()
        };

        let signal = sched.step(start + ms(20), &mut emu, &mut host).unwrap();
        assert_eq!(signal, HostSignal::Quit);
        assert_eq!(emu.regs.get(0x1), 0);
        assert_eq!(host.frames, 0);
    }

    #[test]
    fn test_run_unthrottled_until_quit() {
        let config = Config {
            cpu_frequency: Hz(0),
            refresh_rate: Hz(0),
            debug: false,
        };
        let mut emu = Emulator::with_seed(&config, 1);
        emu.load_program(&COUNTER).unwrap();
        let mut sched = Scheduler::new(&config, Instant::now());
        let mut host = FakeHost {
            quit_on_poll: Some(4),
            ..Default::default()
        };

        sched.run(&mut emu, &mut host).unwrap();
        assert_eq!(emu.regs.get(0x1), 3);
        assert_eq!(host.frames, 3);
        assert_eq!(sched.cycles(), 3);
    }
}
