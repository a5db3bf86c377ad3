/// Locale seam for every number the plot prints.
pub trait NumberFormatter {
    /// Formats `value` with at least `min_fraction` and at most
    /// `max_fraction` fractional digits.
    fn format(&self, value: f64, min_fraction: u32, max_fraction: u32) -> String;
}

/// Plain decimal formatting without digit grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFormatter {
    decimal_separator: char,
}

impl Default for DecimalFormatter {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
        }
    }
}

impl DecimalFormatter {
    #[must_use]
    pub const fn with_separator(decimal_separator: char) -> Self {
        Self { decimal_separator }
    }

    #[must_use]
    pub const fn decimal_separator(self) -> char {
        self.decimal_separator
    }
}

impl NumberFormatter for DecimalFormatter {
    fn format(&self, value: f64, min_fraction: u32, max_fraction: u32) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let max_fraction = max_fraction.max(min_fraction) as usize;
        let mut text = format!("{value:.max_fraction$}");

        if let Some(dot) = text.find('.') {
            let keep = dot + 1 + min_fraction as usize;
            while text.len() > keep && text.ends_with('0') {
                text.pop();
            }
            if text.ends_with('.') {
                text.pop();
            }
        }

        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text.remove(0);
        }
        if self.decimal_separator != '.' {
            text = text.replace('.', &self.decimal_separator.to_string());
        }
        text
    }
}

/// Largest positive exponent written out as a power of ten.
pub const EXPONENT_PLAIN_MAX: i32 = 5;
/// Smallest negative exponent written out as a decimal fraction.
pub const EXPONENT_PLAIN_MIN: i32 = -3;

/// Caption appended to axis text for a display exponent, e.g. ` x 1000`.
#[must_use]
pub fn exponent_caption(exponent: i32) -> String {
    match exponent {
        0 => String::new(),
        1..=EXPONENT_PLAIN_MAX => format!(" x 1{}", "0".repeat(exponent as usize)),
        EXPONENT_PLAIN_MIN..=-1 => {
            format!(" x 0.{}1", "0".repeat((-exponent - 1) as usize))
        }
        _ => format!(" x 1E{exponent}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_to_fraction_bounds() {
        let f = DecimalFormatter::default();
        assert_eq!(f.format(1.5, 0, 3), "1.5");
        assert_eq!(f.format(2.0, 0, 3), "2");
        assert_eq!(f.format(2.0, 2, 3), "2.00");
        assert_eq!(f.format(1.23456, 0, 2), "1.23");
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        let f = DecimalFormatter::default();
        assert_eq!(f.format(-0.0001, 0, 2), "0");
        assert_eq!(f.format(-0.0, 1, 1), "0.0");
    }

    #[test]
    fn separator_is_configurable() {
        let f = DecimalFormatter::with_separator(',');
        assert_eq!(f.format(-12.25, 0, 2), "-12,25");
    }

    #[test]
    fn exponent_captions() {
        assert_eq!(exponent_caption(0), "");
        assert_eq!(exponent_caption(3), " x 1000");
        assert_eq!(exponent_caption(-2), " x 0.01");
        assert_eq!(exponent_caption(6), " x 1E6");
        assert_eq!(exponent_caption(-4), " x 1E-4");
    }
}
