use super::{AudioInput, InterleavedScratch, TriggerEngine};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, FromSample, Sample, SizedSample, Stream, StreamConfig,
};

/// Frames reserved up front for the callback scratch buffers
///
/// Callbacks up to this size never allocate. A larger device buffer grows the
/// scratch once on its first callback and reuses it from then on.
const SCRATCH_FRAMES: usize = 16384;

/// Capture from the default input device into a [`TriggerEngine`]
pub struct CpalInput {
    stream: Option<Stream>,
    device: Option<Device>,
    config: Option<StreamConfig>,
    sample_format: Option<cpal::SampleFormat>,
    sample_rate: f32,
    is_active: bool,
}

impl CpalInput {
    pub fn new() -> Self {
        Self {
            stream: None,
            device: None,
            config: None,
            sample_format: None,
            sample_rate: 44100.0,
            is_active: false,
        }
    }

    /// Number of channels the device delivers
    pub fn channels(&self) -> usize {
        self.config.as_ref().map_or(0, |c| c.channels as usize)
    }

    /// Create the capture stream feeding `engine`
    pub fn create_stream_with_engine(&mut self, engine: TriggerEngine) -> Result<(), anyhow::Error> {
        let device = self.device.as_ref().ok_or_else(|| anyhow::anyhow!("Device not initialized"))?;
        let config = self.config.as_ref().ok_or_else(|| anyhow::anyhow!("Config not initialized"))?;
        let sample_format = self
            .sample_format
            .ok_or_else(|| anyhow::anyhow!("Sample format not initialized"))?;

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::make_stream::<i8>(device, config, engine)?,
            cpal::SampleFormat::I16 => Self::make_stream::<i16>(device, config, engine)?,
            cpal::SampleFormat::I32 => Self::make_stream::<i32>(device, config, engine)?,
            cpal::SampleFormat::I64 => Self::make_stream::<i64>(device, config, engine)?,
            cpal::SampleFormat::U8 => Self::make_stream::<u8>(device, config, engine)?,
            cpal::SampleFormat::U16 => Self::make_stream::<u16>(device, config, engine)?,
            cpal::SampleFormat::U32 => Self::make_stream::<u32>(device, config, engine)?,
            cpal::SampleFormat::U64 => Self::make_stream::<u64>(device, config, engine)?,
            cpal::SampleFormat::F32 => Self::make_stream::<f32>(device, config, engine)?,
            cpal::SampleFormat::F64 => Self::make_stream::<f64>(device, config, engine)?,
            sample_format => return Err(anyhow::anyhow!("Unsupported sample format '{}'", sample_format)),
        };

        self.stream = Some(stream);
        Ok(())
    }

    /// Setup the CPAL host and input device
    fn setup_host_device(&mut self) -> Result<(), anyhow::Error> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("Default input device is not available"))?;

        log::info!("Input device: {}", device.name()?);

        let config = device.default_input_config()?;
        log::debug!("Default input config: {:?}", config);

        self.sample_rate = config.sample_rate().0 as f32;
        self.sample_format = Some(config.sample_format());
        self.device = Some(device);
        self.config = Some(config.into());

        Ok(())
    }

    /// Create a typed stream for the given sample format
    fn make_stream<T>(
        device: &Device,
        config: &StreamConfig,
        engine: TriggerEngine,
    ) -> Result<Stream, anyhow::Error>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let num_channels = config.channels as usize;
        let err_fn = |err| log::error!("Error on input stream: {}", err);

        let mut converted: Vec<f32> = Vec::with_capacity(SCRATCH_FRAMES * num_channels);
        let mut scratch = InterleavedScratch::with_capacity(SCRATCH_FRAMES);

        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                converted.clear();
                converted.extend(data.iter().map(|&s| f32::from_sample(s)));
                engine.process_interleaved(&converted, num_channels, None, &mut scratch);
            },
            err_fn,
            None,
        )?;

        Ok(stream)
    }
}

impl Default for CpalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioInput for CpalInput {
    fn initialize(&mut self, sample_rate: f32) -> Result<(), anyhow::Error> {
        self.sample_rate = sample_rate;
        self.setup_host_device()?;
        if (self.sample_rate - sample_rate).abs() > f32::EPSILON {
            log::info!(
                "Device runs at {} Hz instead of the requested {} Hz",
                self.sample_rate,
                sample_rate
            );
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), anyhow::Error> {
        if let Some(stream) = &self.stream {
            stream.play()?;
            self.is_active = true;
            log::info!("Input stream started at sample rate: {}", self.sample_rate);
        } else {
            return Err(anyhow::anyhow!("Stream not created. Call create_stream_with_engine first."));
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<(), anyhow::Error> {
        if let Some(stream) = &self.stream {
            stream.pause()?;
            self.is_active = false;
            log::info!("Input stream stopped");
        }

        Ok(())
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}
