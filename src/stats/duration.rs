const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Render a nanosecond count the way Go's `time.Duration` prints itself,
/// e.g. `"5m10s"`, `"1.5ms"`, `"0s"`.
pub fn format_duration(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }

    let value = nanos.unsigned_abs();

    let body = if value < NANOS_PER_SEC {
        let (unit, precision) = if value < NANOS_PER_MICRO {
            ("ns", 0)
        } else if value < NANOS_PER_MILLI {
            ("µs", 3)
        } else {
            ("ms", 6)
        };
        let (whole, fraction) = split_fraction(value, precision);
        format!("{whole}{fraction}{unit}")
    } else {
        let (secs, fraction) = split_fraction(value, 9);
        let minutes = secs / 60;
        let hours = minutes / 60;

        match (hours, minutes) {
            (0, 0) => format!("{secs}{fraction}s"),
            (0, _) => format!("{}m{}{fraction}s", minutes, secs % 60),
            _ => format!("{}h{}m{}{fraction}s", hours, minutes % 60, secs % 60),
        }
    };

    if nanos < 0 {
        format!("-{body}")
    } else {
        body
    }
}

/// Split `value` into its integer part and a `.ddd` suffix with `precision`
/// decimal digits, trailing zeros removed.
fn split_fraction(value: u64, precision: u32) -> (u64, String) {
    if precision == 0 {
        return (value, String::new());
    }

    let scale = 10u64.pow(precision);
    let fraction = value % scale;
    if fraction == 0 {
        return (value / scale, String::new());
    }

    let digits = format!("{:0width$}", fraction, width = precision as usize);
    (value / scale, format!(".{}", digits.trim_end_matches('0')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_second_units() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(200), "200ns");
        assert_eq!(format_duration(1_500), "1.5µs");
        assert_eq!(format_duration(1_000_000), "1ms");
        assert_eq!(format_duration(2_250_000), "2.25ms");
        assert_eq!(format_duration(999_999_999), "999.999999ms");
    }

    #[test]
    fn test_seconds_minutes_hours() {
        assert_eq!(format_duration(2_500_000_000), "2.5s");
        assert_eq!(format_duration(310 * NANOS_PER_SEC as i64), "5m10s");
        assert_eq!(format_duration(3_600 * NANOS_PER_SEC as i64), "1h0m0s");
        assert_eq!(
            format_duration(3_723 * NANOS_PER_SEC as i64 + 500_000_000),
            "1h2m3.5s"
        );
    }

    #[test]
    fn test_negative_and_extremes() {
        assert_eq!(format_duration(-1_500), "-1.5µs");
        assert_eq!(format_duration(i64::MAX), "2562047h47m16.854775807s");
        assert_eq!(format_duration(i64::MIN), "-2562047h47m16.854775808s");
    }
}
