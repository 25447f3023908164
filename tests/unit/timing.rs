use super::*;
use crate::foundation::error::ReelError;

fn secs(n: usize) -> Vec<f64> {
    allocate(n).unwrap().iter().map(|d| d.seconds).collect()
}

#[test]
fn table_values_are_exact() {
    assert_eq!(secs(1), vec![6.0]);
    assert_eq!(secs(2), vec![3.0, 3.0]);
    assert_eq!(secs(3), vec![2.5, 3.0, 3.0]);
    assert_eq!(secs(4), vec![2.5, 3.0, 3.0, 3.0]);
}

#[test]
fn zero_frames_is_a_validation_error() {
    let err = allocate(0).unwrap_err();
    assert!(matches!(
        err,
        ReelError::Validation(ValidationError::InvalidFrameCount(0))
    ));
}

#[test]
fn every_allocation_has_n_positive_entries() {
    for n in 1..=40 {
        let d = secs(n);
        assert_eq!(d.len(), n);
        assert!(d.iter().all(|s| *s > 0.0));
        assert_eq!(d.iter().sum::<f64>(), total_secs(n));
    }
}

#[test]
fn three_frames_total_eight_and_a_half_seconds() {
    assert_eq!(total_secs(3), 8.5);
    assert_eq!(total_secs(0), 0.0);
}
