/// Format a count with K/M/G suffixes: "1.2M"
pub fn fmt_count(n: u64) -> String {
    if n >= 1_000_000_000 { format!("{:.1}G", n as f64 / 1_000_000_000.0) }
    else if n >= 1_000_000 { format!("{:.1}M", n as f64 / 1_000_000.0) }
    else if n >= 10_000    { format!("{:.1}K", n as f64 / 1_000.0) }
    else { format!("{}", n) }
}

/// Format an average with two decimals: "5012.37"
pub fn fmt_avg(v: f64) -> String {
    format!("{:.2}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_count() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(9_999), "9999");
        assert_eq!(fmt_count(12_500), "12.5K");
        assert_eq!(fmt_count(3_400_000), "3.4M");
        assert_eq!(fmt_count(2_000_000_000), "2.0G");
    }

    #[test]
    fn test_fmt_avg() {
        assert_eq!(fmt_avg(25.0), "25.00");
        assert_eq!(fmt_avg(-1.004), "-1.00");
    }
}
