use crate::analyzer::BlockAssembler;
use crate::config::MonitorConfig;
use crate::engine::DetectionEngine;
use anyhow::{Context, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use log::{info, warn};

/// Holds the live capture stream. Dropping it stops capture and releases the
/// audio device on every exit path.
pub struct AudioStream {
    _stream: cpal::Stream,
    device_name: String,
}

impl AudioStream {
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Open the default input device and start feeding the engine one fixed-size
/// block at a time. Any failure here is fatal at startup; stream faults after
/// startup are logged and capture continues.
pub fn start_capture(config: &MonitorConfig, engine: DetectionEngine) -> anyhow::Result<AudioStream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("no audio input device available")?;
    let device_name = device.name().unwrap_or_else(|_| "unknown device".to_string());
    info!("Capturing from {device_name}");

    let supported_config = device
        .default_input_config()
        .context("no default input config for device")?;
    let sample_format = supported_config.sample_format();
    let mut stream_config: cpal::StreamConfig = supported_config.into();
    stream_config.sample_rate = cpal::SampleRate(config.sample_rate);

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, config, engine)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, config, engine)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, config, engine)?,
        other => return Err(anyhow!("unsupported sample format {other:?}")),
    };

    stream.play().context("failed to start audio stream")?;

    Ok(AudioStream {
        _stream: stream,
        device_name,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    config: &MonitorConfig,
    mut engine: DetectionEngine,
) -> anyhow::Result<cpal::Stream>
where
    T: Sample + FromSample<f32> + cpal::SizedSample,
    f32: FromSample<T>,
{
    let channels = stream_config.channels as usize;
    let mut assembler = BlockAssembler::new(config.block_len());

    let stream = device
        .build_input_stream(
            stream_config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|&s| s.to_sample()).collect();
                assembler.push(&samples, channels, |block| {
                    engine.process_block(block);
                });
            },
            // Overruns/underruns are non-fatal; the next blocks still arrive
            |err| warn!("Audio stream fault: {err}"),
            None,
        )
        .context("failed to build input stream")?;

    Ok(stream)
}
