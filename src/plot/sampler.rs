//! Walking a domain to produce plot samples.

use super::expr::Function;

/// Function body marking a conceptual question without a graph.
pub const CONCEPTUAL_BODY: &str = "null";

/// Samples are rounded to this many significant digits.
pub const SIGNIFICANT_DIGITS: usize = 10;

/// Upper bound on samples for a single graph.
pub const MAX_SAMPLES: usize = 100_000;

/// One point of a sampled graph. `y` is `None` where the function is
/// undefined, which the renderer draws as a break in the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: Option<f64>,
}

impl Sample {
    pub fn is_gap(&self) -> bool {
        self.y.is_none()
    }

    /// The `{"x":..,"y":..}` answer encoding of this point, if defined.
    pub fn encode(&self) -> Option<String> {
        let y = self.y?;
        Some(encode_point(self.x, y))
    }
}

/// Serialize a point the way click-on-graph answers are stored.
pub fn encode_point(x: f64, y: f64) -> String {
    format!("{{\"x\":{},\"y\":{}}}", format_number(x), format_number(y))
}

/// Shortest round-trip form, written the way browsers print numbers: plain
/// decimals without a trailing `.0` for exponents in `-6..21`, otherwise
/// exponent notation such as `1e-7` or `1e+21`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    match exponent.parse::<i32>() {
        Ok(exponent) if (-6..21).contains(&exponent) => format!("{}", value),
        Ok(exponent) if exponent >= 0 => format!("{}e+{}", mantissa, exponent),
        Ok(exponent) => format!("{}e{}", mantissa, exponent),
        Err(_) => scientific,
    }
}

/// Round to [`SIGNIFICANT_DIGITS`] significant digits.
pub fn round_significant(value: f64) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    if !value.is_finite() {
        return value;
    }
    let text = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let rounded = text.parse::<f64>().unwrap_or(value);
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Number of iterations needed to cover `[min, max]` at `step`, or `None`
/// when the domain or step cannot be sampled.
pub fn sample_count(min: f64, max: f64, step: f64) -> Option<usize> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || min > max {
        return None;
    }
    let span = ((max - min) / step).ceil();
    if !span.is_finite() || span >= MAX_SAMPLES as f64 {
        return None;
    }
    Some(span as usize + 1)
}

/// Sample `f` over `domain` at `step`, inclusive of both ends where the step
/// lands on them. Returns an empty list for an unusable domain or step.
pub fn sample<F>(domain: [f64; 2], step: f64, f: F) -> Vec<Sample>
where
    F: Fn(f64) -> Option<f64>,
{
    let [min, max] = domain;
    let Some(count) = sample_count(min, max, step) else {
        return Vec::new();
    };
    let tolerance = step * 1e-9;

    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let x = min + i as f64 * step;
        if x > max + tolerance {
            break;
        }
        let x = x.min(max);
        let y = f(x).filter(|y| y.is_finite()).map(round_significant);
        samples.push(Sample {
            x: round_significant(x),
            y,
        });
    }
    samples
}

/// Sample a textual function body. Conceptual questions yield no samples.
pub fn sample_body(body: &str, domain: [f64; 2], step: f64) -> Vec<Sample> {
    if is_conceptual(body) {
        return Vec::new();
    }
    let function = Function::compile(body);
    sample(domain, step, |x| function.eval(x))
}

pub fn is_conceptual(body: &str) -> bool {
    body.trim() == CONCEPTUAL_BODY
}

/// Index of the defined sample closest to `x`.
pub fn nearest_defined(samples: &[Sample], x: f64) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_gap())
        .min_by(|(_, a), (_, b)| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
        .map(|(index, _)| index)
}

/// Next defined sample after (or before) `from`, skipping gaps.
pub fn step_defined(samples: &[Sample], from: usize, forward: bool) -> Option<usize> {
    if forward {
        samples
            .iter()
            .enumerate()
            .skip(from + 1)
            .find(|(_, s)| !s.is_gap())
            .map(|(index, _)| index)
    } else {
        samples[..from.min(samples.len())]
            .iter()
            .rposition(|s| !s.is_gap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xs(samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| s.x).collect()
    }

    #[test]
    fn test_reciprocal_has_gap_at_zero() {
        let samples = sample_body("1/x", [-1.0, 1.0], 0.5);

        assert_eq!(xs(&samples), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(samples[2].y, None);
        assert_eq!(samples[0].y, Some(-1.0));
        assert_eq!(samples[1].y, Some(-2.0));
        assert_eq!(samples[3].y, Some(2.0));
        assert_eq!(samples[4].y, Some(1.0));
    }

    #[test]
    fn test_bounds_hold_for_awkward_steps() {
        let cases = [
            ([0.0, 1.0], 0.1),
            ([0.0, 1.0], 0.3),
            ([-3.0, 3.0], 0.7),
            ([-10.0, 10.0], 0.01),
            ([2.0, 2.0], 0.5),
            ([-1.0, 5.0], 6.5),
        ];

        for (domain, step) in cases {
            let samples = sample(domain, step, |x| Some(x));
            let [a, b] = domain;
            let first = samples.first().unwrap().x;
            let last = samples.last().unwrap().x;
            assert_eq!(first, a, "first x for {:?} step {}", domain, step);
            assert!(last <= b, "last {} > {} for step {}", last, b, step);
            assert!(last > b - step, "last {} too small for step {}", last, step);
        }
    }

    #[test]
    fn test_tenth_steps_reach_the_end_exactly() {
        let samples = sample([0.0, 1.0], 0.1, |x| Some(x * x));
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[3].x, 0.3);
        assert_eq!(samples[3].y, Some(0.09));
        assert_eq!(samples[10].x, 1.0);
    }

    #[test]
    fn test_conceptual_body_has_no_samples() {
        assert!(sample_body("null", [-5.0, 5.0], 0.1).is_empty());
        assert!(sample_body(" null ", [0.0, 0.0], 1.0).is_empty());
    }

    #[test]
    fn test_unusable_domains_yield_nothing() {
        assert!(sample([1.0, 0.0], 0.5, |x| Some(x)).is_empty());
        assert!(sample([0.0, 1.0], 0.0, |x| Some(x)).is_empty());
        assert!(sample([0.0, 1.0], -0.1, |x| Some(x)).is_empty());
        assert!(sample([0.0, f64::INFINITY], 1.0, |x| Some(x)).is_empty());
        assert!(sample([0.0, 1.0], 1e-9, |x| Some(x)).is_empty());
    }

    #[test]
    fn test_malformed_body_samples_as_all_gaps() {
        let samples = sample_body("x +", [0.0, 2.0], 1.0);
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(Sample::is_gap));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_significant(0.1 + 0.2), 0.3);
        assert_eq!(round_significant(1.23456789012345), 1.23456789);
        assert_eq!(round_significant(-0.0), 0.0);
        assert_eq!(round_significant(123456789012.0), 123456789000.0);
    }

    #[test]
    fn test_encoding_matches_stored_answers() {
        assert_eq!(encode_point(2.0, 4.0), r#"{"x":2,"y":4}"#);
        assert_eq!(encode_point(-0.5, 0.25), r#"{"x":-0.5,"y":0.25}"#);
        assert_eq!(encode_point(-0.0, 1.0), r#"{"x":0,"y":1}"#);
        let gap = Sample { x: 0.0, y: None };
        assert_eq!(gap.encode(), None);
    }

    #[test]
    fn test_tiny_and_huge_numbers_use_exponents() {
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-4.10206857e-10), "-4.10206857e-10");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(-0.0000015), "-0.0000015");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(2.5e300), "2.5e+300");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(123.456), "123.456");
    }

    #[test]
    fn test_near_zero_sample_encodes_with_exponent() {
        let samples = sample_body("Math.sin(x)", [0.0, 3.141592654], 3.141592654);
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[1].encode().as_deref(),
            Some(r#"{"x":3.141592654,"y":-4.10206857e-10}"#)
        );
    }

    #[test]
    fn test_cursor_skips_gaps() {
        let samples = sample_body("1/x", [-1.0, 1.0], 0.5);

        assert_eq!(nearest_defined(&samples, 0.0), Some(1));
        assert_eq!(step_defined(&samples, 1, true), Some(3));
        assert_eq!(step_defined(&samples, 3, false), Some(1));
        assert_eq!(step_defined(&samples, 4, true), None);
        assert_eq!(step_defined(&samples, 0, false), None);
    }
}
