/// Restricts `value` to the spectrum `[min, max]`.
///
/// The lower bound is applied before the upper bound, so when `min > max`
/// the result is always `max`. A NaN `value` is passed through untouched.
///
///  clamp(50, 100, 20) yields 50
///  clamp(50, 100, 75) yields 75
///  clamp(50, 100, 120) yields 100
pub fn clamp(min: f64, max: f64, value: f64) -> f64 {
    let mut x = value;
    if x < min {
        x = min;
    }
    if x > max {
        x = max;
    }

    x
}

/// Linear interpolation: the number at `percentage` along `[min, max]`.
/// Not clamped, a percentage outside 0..1 extrapolates past the spectrum.
pub fn lerp(min: f64, max: f64, percentage: f64) -> f64 {
    min * (1.0 - percentage) + max * percentage
}

/// Inverse of `lerp`: where `value` falls on `[min, max]` as a fraction.
///
/// Returns 0 for a zero width spectrum. The result is NOT clamped to 0..1,
/// callers that need a bounded fraction clamp the input first.
pub fn invlerp(min: f64, max: f64, value: f64) -> f64 {
    if min != max {
        (value - min) / (max - min)
    } else {
        0_f64
    }
}

/// Maps `value` from the first spectrum onto the same relative spot of the second.
///
///  range(10, 100, 2000, 20000, 50) yields 10000
pub fn range(min1: f64, max1: f64, min2: f64, max2: f64, value: f64) -> f64 {
    lerp(min2, max2, invlerp(min1, max1, value))
}

/// A closed interval used as a mapping domain or target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spectrum {
    pub min: f64,
    pub max: f64,
}

impl Spectrum {
    pub fn new(min: f64, max: f64) -> Spectrum {
        Spectrum { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        clamp(self.min, self.max, value)
    }

    pub fn lerp(&self, percentage: f64) -> f64 {
        lerp(self.min, self.max, percentage)
    }

    pub fn invlerp(&self, value: f64) -> f64 {
        invlerp(self.min, self.max, value)
    }

    pub fn map_to(&self, target: &Spectrum, value: f64) -> f64 {
        range(self.min, self.max, target.min, target.max, value)
    }
}

#[cfg(test)]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
