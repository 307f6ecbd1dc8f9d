//! Command line front end: describe the plugin, bounce WAV files through the
//! trigger, or watch onsets on a live input.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kicktrigger::plugin::{self, PortDirection, PortKind};
use kicktrigger::TriggerParams;

#[derive(Parser)]
#[command(name = "kicktrigger", about = "Kick drum trigger: gate, click and tone re-synthesis")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print plugin descriptors and their ports
    Describe,

    /// Render a WAV file through the trigger
    #[cfg(feature = "bounce")]
    Bounce {
        input: PathBuf,
        output: PathBuf,
        /// Frames per processing block
        #[arg(long, default_value_t = kicktrigger::bounce::DEFAULT_BLOCK_LEN)]
        block_len: usize,
        #[command(flatten)]
        params: ParamArgs,
    },

    /// Capture from the default input device and log onsets
    #[cfg(feature = "native")]
    Monitor {
        /// Preferred sample rate
        #[arg(long, default_value_t = 44100.0)]
        sample_rate: f32,
        /// Stop after this many seconds; runs until interrupted when omitted
        #[arg(long)]
        seconds: Option<f32>,
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    Tight,
    Boomy,
    Passthrough,
}

/// Preset plus per-parameter overrides
#[derive(Args)]
struct ParamArgs {
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,
    #[arg(long)]
    trigger_threshold: Option<f32>,
    #[arg(long)]
    release_threshold: Option<f32>,
    #[arg(long)]
    release_delay: Option<f32>,
    #[arg(long)]
    click_level: Option<f32>,
    #[arg(long)]
    click_delay: Option<f32>,
    #[arg(long)]
    click_release: Option<f32>,
    #[arg(long)]
    triggered_level: Option<f32>,
    #[arg(long)]
    standby_level: Option<f32>,
    #[arg(long)]
    input_trigger_release: Option<f32>,
    #[arg(long)]
    block_size: Option<f32>,
    #[arg(long)]
    synth_amplitude: Option<f32>,
    #[arg(long)]
    synth_gain: Option<f32>,
    #[arg(long)]
    synth_freq_start: Option<f32>,
    #[arg(long)]
    synth_freq_body: Option<f32>,
    #[arg(long)]
    synth_freq_tail: Option<f32>,
    #[arg(long)]
    synth_time_attack: Option<f32>,
    #[arg(long)]
    synth_time_body: Option<f32>,
    #[arg(long)]
    synth_time_tail: Option<f32>,
    #[arg(long)]
    output_gain: Option<f32>,
}

impl ParamArgs {
    fn resolve(&self) -> TriggerParams {
        let mut params = match self.preset {
            Preset::Default => TriggerParams::default(),
            Preset::Tight => TriggerParams::tight(),
            Preset::Boomy => TriggerParams::boomy(),
            Preset::Passthrough => TriggerParams::passthrough(),
        };

        let overrides = [
            (self.trigger_threshold, &mut params.trigger_threshold),
            (self.release_threshold, &mut params.release_threshold),
            (self.release_delay, &mut params.release_delay),
            (self.click_level, &mut params.click_level),
            (self.click_delay, &mut params.click_delay),
            (self.click_release, &mut params.click_release),
            (self.triggered_level, &mut params.triggered_level),
            (self.standby_level, &mut params.standby_level),
            (self.input_trigger_release, &mut params.input_trigger_release),
            (self.block_size, &mut params.block_size),
            (self.synth_amplitude, &mut params.synth_amplitude),
            (self.synth_gain, &mut params.synth_gain),
            (self.synth_freq_start, &mut params.synth_freq_start),
            (self.synth_freq_body, &mut params.synth_freq_body),
            (self.synth_freq_tail, &mut params.synth_freq_tail),
            (self.synth_time_attack, &mut params.synth_time_attack),
            (self.synth_time_body, &mut params.synth_time_body),
            (self.synth_time_tail, &mut params.synth_time_tail),
            (self.output_gain, &mut params.output_gain),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }

        params
    }
}

fn describe() {
    for descriptor in plugin::descriptors() {
        println!(
            "{} [{}] id {} by {}, {} ports",
            descriptor.name,
            descriptor.label,
            descriptor.unique_id,
            descriptor.maker,
            descriptor.port_count()
        );
        for (index, port) in descriptor.ports.iter().enumerate() {
            let direction = match port.direction {
                PortDirection::Input => "in ",
                PortDirection::Output => "out",
            };
            let kind = match port.kind {
                PortKind::Control => "control",
                PortKind::Audio => "audio  ",
            };
            let default = port
                .hint
                .default
                .map(|d| format!(" default {}", d))
                .unwrap_or_default();
            println!("  {:3} {} {} {}{}", index, direction, kind, port.name, default);
        }
    }
}

#[cfg(feature = "native")]
fn monitor(sample_rate: f32, seconds: Option<f32>, params: TriggerParams) -> anyhow::Result<()> {
    use kicktrigger::platform::{AudioInput, CpalInput, TriggerEngine};
    use std::time::{Duration, Instant};

    let mut input = CpalInput::new();
    input.initialize(sample_rate)?;

    let engine = TriggerEngine::new(input.sample_rate(), input.channels(), params)?;
    input.create_stream_with_engine(engine.clone())?;
    input.start()?;

    let started = Instant::now();
    let mut seen = engine.onsets();
    loop {
        std::thread::sleep(Duration::from_millis(50));

        let onsets = engine.onsets();
        let status = engine.status();
        for (channel, (now, before)) in onsets.iter().zip(seen.iter()).enumerate() {
            if now > before {
                let ratio = status.get(channel).map_or(0.0, |s| s.trigger_ratio);
                log::info!(
                    "channel {}: onset #{} (peak {:.2}x threshold)",
                    channel,
                    now,
                    ratio
                );
            }
        }
        seen = onsets;

        if seconds.map_or(false, |limit| started.elapsed().as_secs_f32() >= limit) {
            break;
        }
    }

    input.stop()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    kicktrigger::utils::init_logger(cli.verbose);

    match cli.command {
        Command::Describe => describe(),

        #[cfg(feature = "bounce")]
        Command::Bounce {
            input,
            output,
            block_len,
            params,
        } => {
            let report = kicktrigger::bounce::bounce_file(&input, &output, &params.resolve(), block_len)?;
            println!(
                "{} frames at {} Hz, onsets per channel: {:?}",
                report.frames, report.sample_rate, report.onsets
            );
        }

        #[cfg(feature = "native")]
        Command::Monitor {
            sample_rate,
            seconds,
            params,
        } => monitor(sample_rate, seconds, params.resolve())?,
    }

    Ok(())
}
