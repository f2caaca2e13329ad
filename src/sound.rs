use log::debug;
#[cfg(feature = "audio")]
use log::warn;

/// Buzzer that sounds while the sound timer is non-zero.
///
/// Without the `audio` feature, or without an output device, state changes
/// are only logged.
pub struct Buzzer {
    #[cfg(feature = "audio")]
    stream: Option<cpal::Stream>,
    on: bool,
}

impl Buzzer {
    pub fn new() -> Self {
        #[cfg(feature = "audio")]
        let stream = match tone::open() {
            Ok(stream) => Some(stream),
            Err(err) => {
                warn!("audio disabled: {err}");
                None
            }
        };

        Self {
            #[cfg(feature = "audio")]
            stream,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        self.on = on;
        debug!("buzzer {}", if on { "on" } else { "off" });
        self.output(on);
    }

    #[cfg(feature = "audio")]
    fn output(&self, on: bool) {
        if let Some(stream) = &self.stream {
            if let Err(err) = tone::toggle(stream, on) {
                warn!("buzzer: {err}");
            }
        }
    }

    #[cfg(not(feature = "audio"))]
    fn output(&self, _on: bool) {}
}

#[cfg(feature = "audio")]
mod tone {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, Sample, SizedSample};
    use log::warn;

    use chip8vm::error::{Chip8Error, Chip8Result};

    const TONE_HZ: f32 = 440.0;
    const VOLUME: f32 = 0.2;

    fn host_err(err: impl std::fmt::Display) -> Chip8Error {
        Chip8Error::Host(err.to_string())
    }

    /// Builds a paused sine stream on the default output device.
    pub fn open() -> Chip8Result<cpal::Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Chip8Error::Host("no output device available".to_string()))?;
        let supported_config = device.default_output_config().map_err(host_err)?;
        let sample_format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();

        let stream = match sample_format {
            cpal::SampleFormat::I8 => build::<i8>(&device, &config),
            cpal::SampleFormat::I16 => build::<i16>(&device, &config),
            cpal::SampleFormat::I32 => build::<i32>(&device, &config),
            cpal::SampleFormat::I64 => build::<i64>(&device, &config),
            cpal::SampleFormat::U8 => build::<u8>(&device, &config),
            cpal::SampleFormat::U16 => build::<u16>(&device, &config),
            cpal::SampleFormat::U32 => build::<u32>(&device, &config),
            cpal::SampleFormat::U64 => build::<u64>(&device, &config),
            cpal::SampleFormat::F32 => build::<f32>(&device, &config),
            cpal::SampleFormat::F64 => build::<f64>(&device, &config),
            sample_format => Err(host_err(format!(
                "unsupported sample format '{sample_format}'"
            ))),
        }?;

        stream.pause().map_err(host_err)?;
        Ok(stream)
    }

    pub fn toggle(stream: &cpal::Stream, on: bool) -> Chip8Result<()> {
        if on {
            stream.play().map_err(host_err)
        } else {
            stream.pause().map_err(host_err)
        }
    }

    fn build<T>(device: &cpal::Device, config: &cpal::StreamConfig) -> Chip8Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            sample_clock = (sample_clock + 1.0) % sample_rate;
            (sample_clock * TONE_HZ * 2.0 * std::f32::consts::PI / sample_rate).sin() * VOLUME
        };

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    write_data(data, channels, &mut next_value)
                },
                |err| warn!("an error occurred on stream: {err}"),
                None,
            )
            .map_err(host_err)
    }

    fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
    where
        T: Sample + FromSample<f32>,
    {
        for frame in output.chunks_mut(channels) {
            let value: T = T::from_sample(next_sample());
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }
}
