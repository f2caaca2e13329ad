use crate::timer::Hz;

pub const DEFAULT_CPU_FREQUENCY: Hz = Hz(500);
pub const DEFAULT_REFRESH_RATE: Hz = Hz(60);

/// Machine configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Instructions executed per second. `Hz(0)` runs unthrottled.
    pub cpu_frequency: Hz,
    /// Timer decrements and frame presentations per second.
    pub refresh_rate: Hz,
    /// Trace every executed instruction at debug level.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_frequency: DEFAULT_CPU_FREQUENCY,
            refresh_rate: DEFAULT_REFRESH_RATE,
            debug: false,
        }
    }
}
