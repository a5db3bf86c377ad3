use crate::core::number_format::NumberFormatter;
use crate::core::scale::ScaleState;
use crate::core::series::Series;
use crate::render::DrawingBackend;

const ELLIPSIS: &str = "...";

/// Formats a value with one digit more than the axis labels show.
pub(super) fn format_value(formatter: &dyn NumberFormatter, scale: &ScaleState, value: f64) -> String {
    let fraction = fraction_digits_for(scale) + 1;
    formatter.format(value, fraction, fraction)
}

/// Axis tick label, already in display units.
pub(super) fn format_tick(formatter: &dyn NumberFormatter, scale: &ScaleState, value: f64) -> String {
    let fraction = scale.fraction_digits();
    formatter.format(value, fraction, fraction)
}

/// Value with the series unit, or the switch label on categorical axes.
pub(super) fn format_value_unit(
    formatter: &dyn NumberFormatter,
    series: &Series,
    value: f64,
) -> String {
    if series.y_scale().is_categorical() {
        let index = value.round();
        if index < 0.0 {
            return String::new();
        }
        return series
            .label(index as usize)
            .map(str::to_owned)
            .unwrap_or_default();
    }
    let mut text = format_value(formatter, series.y_scale(), value);
    text.push_str(&unit_suffix(series));
    text
}

/// `" [unit]"`, or nothing for an explicitly empty unit.
pub(super) fn unit_suffix(series: &Series) -> String {
    match series.raw_unit() {
        Some("") => String::new(),
        _ => format!(" [{}]", series.unit()),
    }
}

/// Cuts `text` so it fits into `width` pixels, marking the cut with `...`.
pub(super) fn trim_text<B: DrawingBackend>(backend: &B, text: &str, width: i32) -> String {
    if backend.text_extent(text).x <= width {
        return text.to_owned();
    }
    let available = width - backend.text_extent(ELLIPSIS).x;
    let mut trimmed = text.to_owned();
    while !trimmed.is_empty() && backend.text_extent(&trimmed).x > available {
        trimmed.pop();
    }
    trimmed.push_str(ELLIPSIS);
    trimmed
}

fn fraction_digits_for(scale: &ScaleState) -> u32 {
    let digits = i64::from(scale.fraction_digits()) - i64::from(scale.display_exponent());
    u32::try_from(digits.max(0)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::number_format::DecimalFormatter;
    use crate::core::scale::ScaleRequest;
    use crate::core::types::Rgb;
    use crate::render::RecordingBackend;

    #[test]
    fn trim_keeps_short_text() {
        let backend = RecordingBackend::new();
        assert_eq!(trim_text(&backend, "abc", 100), "abc");
    }

    #[test]
    fn trim_cuts_long_text_with_ellipsis() {
        let backend = RecordingBackend::new().with_char_size(10, 10);
        let trimmed = trim_text(&backend, "temperature", 60);
        assert_eq!(trimmed, "tem...");
        assert!(backend.text_extent(&trimmed).x <= 60);
    }

    #[test]
    fn value_unit_uses_bracketed_unit() {
        let mut series = Series::new(8, Rgb::new(0, 0, 0)).expect("series");
        series.set_unit(Some("V".to_owned()));
        series
            .y_scale_mut()
            .compute(ScaleRequest::new(0.0, 10.0, 6));
        let text = format_value_unit(&DecimalFormatter::default(), &series, 2.5);
        assert_eq!(text, "2.5 [V]");

        series.set_unit(Some(String::new()));
        let text = format_value_unit(&DecimalFormatter::default(), &series, 2.5);
        assert_eq!(text, "2.5");
    }

    #[test]
    fn categorical_value_prints_label() {
        let mut series = Series::new(8, Rgb::new(0, 0, 0)).expect("series");
        series.append_categorical(0.0, "on");
        series.append_categorical(1.0, "off");
        let formatter = DecimalFormatter::default();
        assert_eq!(format_value_unit(&formatter, &series, 0.0), "on");
        assert_eq!(format_value_unit(&formatter, &series, 1.2), "off");
        assert_eq!(format_value_unit(&formatter, &series, 7.0), "");
    }
}
