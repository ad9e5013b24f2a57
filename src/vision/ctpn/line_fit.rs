// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Least-squares line fitting over a chain's box edges

use super::error::{DetectionError, Result};

/// Fit `y = a*x + b` through `(xs[i], ys[i])` and evaluate it at `x1` and `x2`
///
/// When every x is identical the slope is undefined; both outputs are then
/// the first sample's y rather than an average.
pub fn fit_y(xs: &[f32], ys: &[f32], x1: f32, x2: f32) -> Result<(f32, f32)> {
    if xs.len() != ys.len() {
        return Err(DetectionError::malformed(format!(
            "line fit needs matching samples, got {} x and {} y",
            xs.len(),
            ys.len()
        )));
    }
    let (first_x, first_y) = match (xs.first(), ys.first()) {
        (Some(&x), Some(&y)) => (x, y),
        _ => return Err(DetectionError::malformed("line fit needs at least one sample")),
    };

    if xs.iter().all(|&x| x == first_x) {
        return Ok((first_y, first_y));
    }

    // accumulate in f64 around the mean to keep wide images stable
    let n = xs.len() as f64;
    let mean_x = xs.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
    let mean_y = ys.iter().map(|&y| f64::from(y)).sum::<f64>() / n;

    let (sxy, sxx) = xs
        .iter()
        .zip(ys)
        .fold((0.0_f64, 0.0_f64), |(sxy, sxx), (&x, &y)| {
            let dx = f64::from(x) - mean_x;
            (sxy + dx * (f64::from(y) - mean_y), sxx + dx * dx)
        });

    if sxx == 0.0 {
        return Ok((first_y, first_y));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let eval = |x: f32| (slope * f64::from(x) + intercept) as f32;

    Ok((eval(x1), eval(x2)))
}
