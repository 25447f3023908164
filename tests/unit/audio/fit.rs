use super::*;

fn settings(sample_rate: u32) -> AudioSettings {
    AudioSettings {
        sample_rate,
        ..AudioSettings::default()
    }
}

fn ramp(frames: usize) -> AudioPcm {
    let mut interleaved_f32 = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let v = i as f32 / 100.0;
        interleaved_f32.push(v);
        interleaved_f32.push(-v);
    }
    AudioPcm {
        sample_rate: 100,
        channels: 2,
        interleaved_f32,
    }
}

#[test]
fn long_track_is_trimmed_to_video_length() {
    let fitted = fit_to_duration(&ramp(100), 0.5, &settings(100)).unwrap();
    assert_eq!(fitted.frames(), 50);
    assert_eq!(fitted.interleaved_f32[0], 0.0);
    assert!((fitted.interleaved_f32[98] - 0.49).abs() < 1e-6);
    assert!((fitted.interleaved_f32[99] + 0.49).abs() < 1e-6);
}

#[test]
fn short_track_loops_without_gaps() {
    let fitted = fit_to_duration(&ramp(30), 1.0, &settings(100)).unwrap();
    assert_eq!(fitted.frames(), 100);
    let left: Vec<f32> = fitted.interleaved_f32.iter().step_by(2).copied().collect();
    assert!((left[29] - 0.29).abs() < 1e-6);
    assert_eq!(left[30], 0.0);
    assert!((left[61] - 0.01).abs() < 1e-6);
    let zeros: Vec<usize> = (0..left.len()).filter(|i| left[*i] == 0.0).collect();
    assert_eq!(zeros, vec![0, 30, 60, 90]);
}

#[test]
fn mono_is_duplicated_to_stereo() {
    let mono = AudioPcm {
        sample_rate: 10,
        channels: 1,
        interleaved_f32: vec![0.5; 10],
    };
    let fitted = fit_to_duration(&mono, 2.0, &settings(10)).unwrap();
    assert_eq!(fitted.channels, 2);
    assert_eq!(fitted.frames(), 20);
    assert!(fitted.interleaved_f32.iter().all(|v| *v == 0.5));
}

#[test]
fn playback_rate_resamples_source() {
    let cfg = AudioSettings {
        playback_rate: 2.0,
        ..settings(100)
    };
    let fitted = fit_to_duration(&ramp(100), 0.25, &cfg).unwrap();
    assert_eq!(fitted.frames(), 25);
    assert!((fitted.interleaved_f32[2 * 10] - 0.2).abs() < 1e-6);
}

#[test]
fn volume_and_fade_out_scale_samples() {
    let flat = AudioPcm {
        sample_rate: 10,
        channels: 2,
        interleaved_f32: vec![0.8; 20],
    };
    let cfg = AudioSettings {
        volume: 0.5,
        fade_out_secs: 0.5,
        ..settings(10)
    };
    let fitted = fit_to_duration(&flat, 1.0, &cfg).unwrap();
    assert!((fitted.interleaved_f32[0] - 0.4).abs() < 1e-6);
    let last = fitted.interleaved_f32[fitted.interleaved_f32.len() - 1];
    assert_eq!(last, 0.0);
    assert!(fitted.interleaved_f32[14] < 0.4);
}

#[test]
fn empty_source_or_zero_length_yields_nothing() {
    assert!(fit_to_duration(&AudioPcm::silence(48_000, 2, 0), 3.0, &settings(48_000)).is_none());
    assert!(fit_to_duration(&ramp(10), 0.0, &settings(100)).is_none());
}

#[test]
fn temp_file_holds_raw_samples_and_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let pcm = ramp(4);
    let path = write_f32le_temp(&pcm, dir.path()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, pcm.to_f32le_bytes());
    let kept = path.to_path_buf();
    drop(path);
    assert!(!kept.exists());
}
