//! Threaded evaluation of large broadcasts.
//!
//! Run with: cargo test --features parallel --test parallel
#![cfg(feature = "parallel")]

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use dense_array::{DenseArray, Scalar};
use metadata_arrays::{broadcast2, map1, metadata, MetadataArray, MIN_THREAD_LENGTH};

#[test]
fn test_large_broadcast_runs_on_rayon_workers() {
    let n = MIN_THREAD_LENGTH + 17;
    let w = MetadataArray::new((0..n as u64).collect::<Vec<_>>(), metadata!(big = true));

    let off_pool = AtomicUsize::new(0);
    let out = broadcast2(&w, &Scalar(3u64), |x, y| {
        if rayon::current_thread_index().is_none() {
            off_pool.fetch_add(1, Ordering::Relaxed);
        }
        x * y
    })
    .unwrap();

    assert_eq!(off_pool.into_inner(), 0);
    let r = out.result().data();
    assert_eq!(r.len(), n);
    assert!(r.iter().enumerate().all(|(i, &v)| v == i as u64 * 3));
}

#[test]
fn test_small_broadcast_stays_on_caller() {
    let w = MetadataArray::new(vec![1.0f64, 2.0, 3.0], metadata!(small = true));

    let on_pool = AtomicUsize::new(0);
    let out = map1(&w, |x| {
        if rayon::current_thread_index().is_some() {
            on_pool.fetch_add(1, Ordering::Relaxed);
        }
        x * 0.5
    })
    .unwrap();

    assert_eq!(on_pool.into_inner(), 0);
    assert_relative_eq!(out.result().data()[2], 1.5);
}

#[test]
fn test_parallel_outer_product_order() {
    // 256 x 256 exceeds the threshold; column-major placement must survive.
    let m = 256usize;
    let col: Vec<f64> = (0..m).map(|i| i as f64).collect();
    let row = DenseArray::from_vec((0..m).map(|j| (j * 1000) as f64).collect(), &[1, m]).unwrap();
    assert!(m * m > MIN_THREAD_LENGTH);

    let w = MetadataArray::new(col, metadata!(axis = "rows"));
    let out = broadcast2(&w, &row, |x, y| x + y).unwrap();
    let r = out.result();
    assert_eq!(r.dims(), &[m, m]);
    for (i, j) in [(0, 0), (1, 0), (0, 1), (255, 3), (17, 255)] {
        assert_relative_eq!(*r.get(&[i, j]).unwrap(), (i + j * 1000) as f64);
    }
}
