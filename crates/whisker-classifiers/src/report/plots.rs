use plotly::common::{Line, Mode};
use plotly::layout::{Axis, BarMode, Layout};
use plotly::{Histogram, Plot, Scatter};

use crate::error::{ClassifierError, Result};

/// Plot the recorded training cost against the iteration it was taken at.
pub fn plot_learning_curve(costs: &[f64], cost_interval: usize) -> Plot {
    let iterations: Vec<f64> = (0..costs.len())
        .map(|i| (i * cost_interval) as f64)
        .collect();

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(iterations, costs.to_vec())
            .name("Training cost")
            .mode(Mode::LinesMarkers)
            .line(Line::new().color("rgba(31, 119, 180, 1.0)")),
    );
    plot.set_layout(
        Layout::new()
            .title("Learning Curve")
            .x_axis(Axis::new().title(format!("Iteration (every {})", cost_interval)))
            .y_axis(Axis::new().title("Cost")),
    );
    plot
}

/// Overlayed histograms of predicted probabilities for each true class.
pub fn plot_probability_histogram(probabilities: &[f64], labels: &[u8], title: &str) -> Result<Plot> {
    if probabilities.len() != labels.len() {
        return Err(ClassifierError::shape_mismatch(labels.len(), probabilities.len()));
    }

    let mut positives = Vec::new();
    let mut negatives = Vec::new();
    for (&p, &label) in probabilities.iter().zip(labels.iter()) {
        match label {
            1 => positives.push(p),
            0 => negatives.push(p),
            other => {
                return Err(ClassifierError::InvalidInput(format!(
                    "labels must be 0 or 1, got {}",
                    other
                )))
            }
        }
    }

    let layout = Layout::new()
        .title(title)
        .bar_mode(BarMode::Overlay)
        .x_axis(Axis::new().title("P(positive)"))
        .y_axis(Axis::new().title("Count"));

    let mut plot = Plot::new();
    plot.add_trace(Histogram::new(positives).name("Positive").opacity(0.6));
    plot.add_trace(Histogram::new(negatives).name("Negative").opacity(0.6));
    plot.set_layout(layout);
    Ok(plot)
}
