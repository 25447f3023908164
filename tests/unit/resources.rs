use super::*;

fn frame(w: u32, h: u32, fill: u8) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: vec![fill; (w * h * 4) as usize],
        premultiplied: true,
    }
}

fn manager(max_resident: usize, dir: &std::path::Path) -> ResourceManager {
    ResourceManager::new(ResourceLimits {
        max_resident_keyframes: max_resident,
        spill_dir: Some(dir.to_path_buf()),
    })
}

#[test]
fn leases_track_live_and_peak_bytes() {
    let rm = ResourceManager::new(ResourceLimits::default());
    let a = rm.lease(100);
    let b = rm.lease(50);
    assert_eq!(rm.stats().live_bytes, 150);
    assert_eq!(rm.stats().live_leases, 2);
    drop(a);
    assert_eq!(rm.stats().live_bytes, 50);
    drop(b);
    let st = rm.stats();
    assert_eq!(st.live_bytes, 0);
    assert_eq!(st.live_leases, 0);
    assert_eq!(st.peak_bytes, 150);
}

#[test]
fn keyframes_beyond_budget_are_spilled_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let rm = manager(1, dir.path());

    let first = rm.admit_keyframe(frame(4, 2, 7)).unwrap();
    let second = rm.admit_keyframe(frame(4, 2, 9)).unwrap();
    assert!(first.is_resident());
    assert!(!second.is_resident());
    assert_eq!(second.dimensions(), (4, 2));
    assert_eq!(second.frame().unwrap().data, vec![9u8; 32]);

    let st = rm.stats();
    assert_eq!(st.resident_keyframes, 1);
    assert_eq!(st.spilled_keyframes, 1);
    assert_eq!(st.live_bytes, 32);
}

#[test]
fn dropping_keyframes_releases_memory_and_spill_files() {
    let dir = tempfile::tempdir().unwrap();
    let rm = manager(1, dir.path());

    let resident = rm.admit_keyframe(frame(2, 2, 1)).unwrap();
    let spilled = rm.admit_keyframe(frame(2, 2, 2)).unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    drop(spilled);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    drop(resident);
    let st = rm.stats();
    assert_eq!(st.live_bytes, 0);
    assert_eq!(st.resident_keyframes, 0);

    // The freed slot is reusable.
    assert!(rm.admit_keyframe(frame(2, 2, 3)).unwrap().is_resident());
}

#[test]
fn peak_residency_is_bounded_by_budget() {
    let dir = tempfile::tempdir().unwrap();
    let rm = manager(2, dir.path());
    let frames: Vec<_> = (0..6)
        .map(|i| rm.admit_keyframe(frame(2, 2, i)).unwrap())
        .collect();
    assert_eq!(frames.iter().filter(|k| k.is_resident()).count(), 2);
    assert_eq!(rm.stats().peak_resident_keyframes, 2);
    assert_eq!(rm.stats().peak_bytes, 2 * 16);
}
