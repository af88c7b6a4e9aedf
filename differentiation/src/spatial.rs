//! Distance helpers for spatial competition

/// Shortest distance between two positions on a circle of unit circumference
///
/// Positions are in [0, 1). The distance is the shorter of the two arcs.
///
/// # Examples
///
/// ```
/// use differentiation::spatial::circular_distance;
///
/// assert_eq!(circular_distance(0.25, 0.25), 0.0);
/// assert!((circular_distance(0.0, 0.5) - 0.5).abs() < 1e-12);
///
/// // Wrap-around: 0.05 to 0.95 is 0.1 the short way
/// assert!((circular_distance(0.05, 0.95) - 0.1).abs() < 1e-12);
/// ```
pub fn circular_distance(pos1: f64, pos2: f64) -> f64 {
    let diff = (pos1 - pos2).abs();
    diff.min(1.0 - diff)
}

/// ∫ |x - location| dx over [from, to]
///
/// Total travel distance of a unit-density segment of consumers all buying
/// from a firm at `location`. Empty or reversed segments contribute nothing.
pub fn distance_integral(from: f64, to: f64, location: f64) -> f64 {
    if to <= from {
        return 0.0;
    }
    // Antiderivative of |x - location| is (x - location)·|x - location| / 2
    let primitive = |x: f64| {
        let offset = x - location;
        0.5 * offset * offset.abs()
    };
    primitive(to) - primitive(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_distance_symmetry() {
        assert_eq!(circular_distance(0.1, 0.4), circular_distance(0.4, 0.1));
    }

    #[test]
    fn test_circular_distance_never_exceeds_half() {
        for i in 0..20 {
            let a = i as f64 / 20.0;
            for j in 0..20 {
                let b = j as f64 / 20.0;
                let d = circular_distance(a, b);
                assert!((0.0..=0.5).contains(&d), "distance {} out of range", d);
            }
        }
    }

    #[test]
    fn test_distance_integral_around_firm() {
        // Firm in the middle of [0, 1]: two triangles of area 1/8
        assert!((distance_integral(0.0, 1.0, 0.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_distance_integral_firm_outside_segment() {
        // Everyone on [0, 0.2] travels to 0.5: ∫ (0.5 - x) dx = 0.08
        assert!((distance_integral(0.0, 0.2, 0.5) - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_distance_integral_empty_segment() {
        assert_eq!(distance_integral(0.6, 0.4, 0.5), 0.0);
    }
}
