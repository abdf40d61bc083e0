//! Terminal rendering of service responses

use crate::api::PredictionResponse;

/// Width of the longest bar in the importance chart
pub const CHART_WIDTH: usize = 40;

const BAR: char = '█';

pub fn prediction_message(response: &PredictionResponse) -> String {
    format!(
        "The patient is likely {} with a probability of {:.2}",
        response.prediction, response.pred_prob
    )
}

/// Horizontal bar chart of attribution values, scaled to the largest one
pub fn importance_chart(values: &[(&str, f64)], width: usize) -> String {
    let label_width = values.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let max = values.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let mut out = String::from("Feature Importance\n");
    out.push_str(&"=".repeat(label_width + width + 12));
    out.push('\n');

    for (name, value) in values {
        let len = if max > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        let bar: String = std::iter::repeat(BAR).take(len).collect();

        out.push_str(&format!(
            "{:<label$} | {:<width$} {:.4}\n",
            name,
            bar,
            value,
            label = label_width,
            width = width
        ));
    }

    out
}
