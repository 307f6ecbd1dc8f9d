//! Offline rendering of a WAV file through the kick trigger

use std::path::Path;

use anyhow::Context;

use crate::trigger::{KickTrigger, TriggerParams};

/// Default frames per processing block
pub const DEFAULT_BLOCK_LEN: usize = 512;

/// Summary of one offline render
#[derive(Clone, Debug, PartialEq)]
pub struct BounceReport {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    /// Onsets detected per channel
    pub onsets: Vec<u64>,
}

/// Render `input` through a fresh trigger instance into a 32-bit float WAV
///
/// Every file channel gets its own trigger channel with the same parameters.
pub fn bounce_file(
    input: &Path,
    output: &Path,
    params: &TriggerParams,
    block_len: usize,
) -> anyhow::Result<BounceReport> {
    let mut reader = hound::WavReader::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    log::info!(
        "bouncing {} ({} Hz, {} channel(s), {} frames)",
        input.display(),
        spec.sample_rate,
        channels,
        interleaved.len() / channels.max(1)
    );

    let (rendered, report) = render_interleaved(&interleaved, channels, spec.sample_rate, params, block_len)?;

    let out_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(output, out_spec)
        .with_context(|| format!("cannot create {}", output.display()))?;
    for sample in rendered {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    log::info!("wrote {} with onsets per channel {:?}", output.display(), report.onsets);
    Ok(report)
}

/// Render an interleaved buffer through a fresh trigger instance
pub fn render_interleaved(
    interleaved: &[f32],
    channels: usize,
    sample_rate: u32,
    params: &TriggerParams,
    block_len: usize,
) -> anyhow::Result<(Vec<f32>, BounceReport)> {
    let mut trigger = KickTrigger::new(sample_rate as f32, channels)?;
    trigger.activate();

    let frames = interleaved.len() / channels;
    let block_len = block_len.max(1);
    let mut input = vec![0.0f32; block_len];
    let mut output = vec![0.0f32; block_len];
    let mut rendered = vec![0.0f32; frames * channels];

    for start in (0..frames).step_by(block_len) {
        let len = block_len.min(frames - start);
        for channel in 0..channels {
            for (i, slot) in input[..len].iter_mut().enumerate() {
                *slot = interleaved[(start + i) * channels + channel];
            }
            trigger.process(channel, params, &input[..len], &mut output[..len]);
            for (i, sample) in output[..len].iter().enumerate() {
                rendered[(start + i) * channels + channel] = *sample;
            }
        }
    }

    let onsets = (0..channels)
        .map(|c| trigger.channel(c).map_or(0, |state| state.onsets))
        .collect();

    Ok((
        rendered,
        BounceReport {
            sample_rate,
            channels,
            frames,
            onsets,
        },
    ))
}
