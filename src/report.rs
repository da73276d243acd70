//! Presentation of engine results. Nothing in here computes analytics; it
//! only formats what the engine returns.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::engine::MeasureEfficiency;
use crate::error::{Error, QueryError};

/// Renders `value` with `digits` significant digits in fixed-point notation.
pub fn format_significant(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", digits.saturating_sub(1), 0.0);
    }
    let magnitude = value.abs().log10().floor() as i64;
    let mut decimals = (digits as i64 - 1 - magnitude).max(0) as usize;

    // Rounding can carry into a new leading digit (9.96 -> 10.0).
    let rounded: f64 = format!("{:.*}", decimals, value).parse().unwrap_or(value);
    if rounded != 0.0 && rounded.abs().log10().floor() as i64 > magnitude {
        decimals = decimals.saturating_sub(1);
    }
    format!("{:.*}", decimals, value)
}

pub fn format_recovery(country: &str, outcome: &Result<f64, QueryError>) -> String {
    match outcome {
        Ok(ratio) => format!(
            "Ratio of recovered cases/total cases in {} = {}",
            country,
            format_significant(*ratio, 2)
        ),
        Err(err) => err.to_string(),
    }
}

pub fn format_death_rate(outcome: &Result<f64, QueryError>) -> String {
    match outcome {
        Ok(rate) => format!("Average Death Rate: {}", format_significant(*rate, 6)),
        Err(err) => err.to_string(),
    }
}

/// One line per measure, in ranking order.
pub fn format_efficiency(entries: &[MeasureEfficiency]) -> String {
    if entries.is_empty() {
        return "There are no measures to rank".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let value = match &entry.efficiency {
                Ok(ratio) => format_significant(*ratio, 4),
                Err(err) => format!("undefined ({})", err),
            };
            format!(
                "{}. {} (adopted {} times): {}",
                i + 1,
                entry.measure,
                entry.adoptions,
                value
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bar chart of the defined efficiencies. Entries with an undefined
/// efficiency are left out.
pub fn render_efficiency_chart(entries: &[MeasureEfficiency], output_file: &Path) -> Result<(), Error> {
    let bars: Vec<(&str, f64)> = entries
        .iter()
        .filter_map(|e| e.efficiency.as_ref().ok().map(|r| (e.measure.as_str(), *r)))
        .collect();
    if bars.is_empty() {
        return Err(Error::Chart("no measure has a defined efficiency".to_string()));
    }

    draw_bars(&bars, output_file).map_err(|e| Error::Chart(e.to_string()))?;
    info!(path = %output_file.display(), bars = bars.len(), "efficiency chart saved");
    Ok(())
}

fn draw_bars(bars: &[(&str, f64)], output_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(output_file, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_value = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.2 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption("Efficiency of the Most Adopted Measures", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..bars.len() as i32, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .y_desc("Recovered / total cases")
        .x_desc("Measure")
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 15))
        .x_label_formatter(&|x| {
            bars.get(*x as usize)
                .map(|(name, _)| name.to_string())
                .unwrap_or_default()
        })
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        Rectangle::new(
            [(i as i32, 0.0), (i as i32 + 1, *value)],
            ShapeStyle {
                color: RGBAColor(110, 48, 75, 1f64),
                filled: true,
                stroke_width: 0,
            },
        )
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_significant() {
        assert_eq!(format_significant(0.5, 2), "0.50");
        assert_eq!(format_significant(0.123456, 2), "0.12");
        assert_eq!(format_significant(10.0, 6), "10.0000");
        assert_eq!(format_significant(1234.4, 2), "1234");
        assert_eq!(format_significant(0.0, 2), "0.0");
    }

    #[test]
    fn test_format_significant_rounding_carry() {
        assert_eq!(format_significant(9.96, 2), "10");
        assert_eq!(format_significant(0.0996, 2), "0.10");
        assert_eq!(format_significant(9.999996, 6), "10.0000");
    }

    #[test]
    fn test_format_recovery_failure_is_the_error_message() {
        let line = format_recovery("Noland", &Err(QueryError::NotFound("Noland".into())));
        assert_eq!(line, "There is no country named 'Noland'");
    }

    #[test]
    fn test_format_efficiency_lists_in_order() {
        let entries = vec![
            MeasureEfficiency {
                measure: "lockdown".into(),
                adoptions: 3,
                efficiency: Ok(0.5),
            },
            MeasureEfficiency {
                measure: "masks".into(),
                adoptions: 2,
                efficiency: Err(QueryError::Undefined("adopters of 'masks' have no total cases".into())),
            },
        ];
        let text = format_efficiency(&entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1. lockdown (adopted 3 times): 0.5000");
        assert!(lines[1].starts_with("2. masks (adopted 2 times): undefined"));
    }

    #[test]
    fn test_chart_needs_a_defined_entry() {
        let entries = vec![MeasureEfficiency {
            measure: "masks".into(),
            adoptions: 1,
            efficiency: Err(QueryError::Undefined("x".into())),
        }];
        let err = render_efficiency_chart(&entries, Path::new("unused.png")).unwrap_err();
        assert!(matches!(err, Error::Chart(_)));
    }
}
