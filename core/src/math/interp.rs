pub struct InterpHelper;

impl InterpHelper {
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        value.max(min).min(max)
    }

    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Evaluates a three-stop gradient at `t` in `[0, 1]`. Stops are
    /// `(position, value)` pairs sorted by position; `t` outside the stop
    /// range clamps to the nearest stop.
    pub fn gradient(stops: &[(f32, f32)], t: f32) -> f32 {
        match stops {
            [] => 0.0,
            [only] => only.1,
            _ => {
                if t <= stops[0].0 {
                    return stops[0].1;
                }
                for pair in stops.windows(2) {
                    let (p0, v0) = pair[0];
                    let (p1, v1) = pair[1];
                    if t <= p1 {
                        let span = (p1 - p0).max(f32::EPSILON);
                        return Self::lerp(v0, v1, (t - p0) / span);
                    }
                }
                stops[stops.len() - 1].1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds_both_sides() {
        assert_eq!(InterpHelper::clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(InterpHelper::clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(InterpHelper::clamp(5.0, 0.0, 10.0), 5.0);
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [(0.0, 0.6), (0.5, 0.3), (1.0, 0.0)];
        assert_eq!(InterpHelper::gradient(&stops, 0.0), 0.6);
        assert!((InterpHelper::gradient(&stops, 0.25) - 0.45).abs() < 1e-6);
        assert_eq!(InterpHelper::gradient(&stops, 1.0), 0.0);
    }

    #[test]
    fn gradient_clamps_outside_stop_range() {
        let stops = [(0.0, 1.0), (1.0, 0.0)];
        assert_eq!(InterpHelper::gradient(&stops, -1.0), 1.0);
        assert_eq!(InterpHelper::gradient(&stops, 2.0), 0.0);
    }
}
