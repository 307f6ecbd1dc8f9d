// Integration tests for offline WAV rendering
#![cfg(feature = "bounce")]

use kicktrigger::bounce::bounce_file;
use kicktrigger::TriggerParams;

fn write_pcm16(path: &std::path::Path, channels: u16, frames: &[Vec<i16>]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for frame in frames {
        for &sample in frame {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_bounce_stereo_pcm_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("kicks.wav");
    let output = dir.path().join("triggered.wav");

    // Left: kicks at 0.1 s and 0.5 s, right: low hum below threshold
    let frames: Vec<Vec<i16>> = (0..44100)
        .map(|i| {
            let left = if (4410..4420).contains(&i) || (22050..22060).contains(&i) {
                i16::MAX
            } else {
                0
            };
            let right = (3000.0 * ((i as f32) * 0.01).sin()) as i16;
            vec![left, right]
        })
        .collect();
    write_pcm16(&input, 2, &frames);

    let report = bounce_file(&input, &output, &TriggerParams::default(), 512).unwrap();
    assert_eq!(report.sample_rate, 44100);
    assert_eq!(report.channels, 2);
    assert_eq!(report.frames, 44100);
    assert_eq!(report.onsets, vec![2, 0]);

    let mut reader = hound::WavReader::open(&output).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.channels, 2);

    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 44100 * 2);
    // Standby level 0 mutes the hum on the right channel
    assert!(samples.iter().skip(1).step_by(2).all(|&s| s == 0.0));
    assert!(samples.iter().step_by(2).any(|&s| s.abs() > 0.5));
}

#[test]
fn test_bounce_missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = bounce_file(
        &dir.path().join("absent.wav"),
        &dir.path().join("out.wav"),
        &TriggerParams::default(),
        256,
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("absent.wav"));
}
