//! Plotly figures built from the aggregate views.
//!
//! Every builder is a pure function of an aggregated view and a [`Style`]; the
//! resulting [`Figure`] serializes to the `{"data": [...], "layout": {...}}`
//! object that `Plotly.newPlot` and `Plotly.react` accept.

use serde::Serialize;
use serde_json::{json, Value};

use crate::stats::{Ranked, Views};

pub const PRIMARY: &str = "#1f77b4";

pub const BACKGROUND: &str = "#f0f0f0";
pub const TEXT: &str = "#333333";
pub const ACCENT: &str = "#003f5c";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: &'static str,
    pub opacity: f64,
    pub height: Option<u32>,
}

impl Style {
    pub const fn new(color: &'static str, opacity: f64) -> Style {
        Style {
            color,
            opacity,
            height: None,
        }
    }

    pub const fn with_height(self, height: u32) -> Style {
        Style {
            height: Some(height),
            ..self
        }
    }
}

pub const BAR: Style = Style::new(PRIMARY, 0.7);
pub const FADED_BAR: Style = Style::new(PRIMARY, 0.5);
pub const SIZE_HISTOGRAM: Style = Style::new(PRIMARY, 0.7).with_height(300);
const MAP_HEIGHT: u32 = 730;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Figure(Value);

impl Figure {
    fn new(trace: Value, mut layout: Value, style: Style) -> Figure {
        if let Some(height) = style.height {
            layout["height"] = json!(height);
        }
        Figure(json!({ "data": [trace], "layout": layout }))
    }
}

#[cfg(test)]
impl Figure {
    pub fn trace(&self) -> &Value {
        &self.0["data"][0]
    }

    pub fn layout(&self) -> &Value {
        &self.0["layout"]
    }
}

fn axis_layout(title: &str, x_title: &str, y_title: &str) -> Value {
    json!({
        "title": { "text": title },
        "xaxis": { "title": { "text": x_title } },
        "yaxis": { "title": { "text": y_title } },
        "bargap": 0.1,
    })
}

fn split<T: Clone>(view: &Ranked<T>) -> (Vec<&str>, Vec<T>) {
    view.iter()
        .map(|(label, value)| (label.as_str(), value.clone()))
        .unzip()
}

pub fn bar<T: Clone + Serialize>(
    title: &str,
    x_title: &str,
    y_title: &str,
    view: &Ranked<T>,
    style: Style,
) -> Figure {
    let (labels, values) = split(view);
    let trace = json!({
        "type": "bar",
        "x": labels,
        "y": values,
        "marker": { "color": style.color },
        "opacity": style.opacity,
    });
    Figure::new(trace, axis_layout(title, x_title, y_title), style)
}

/// Distribution of raw numeric samples; Plotly does the binning.
pub fn histogram(title: &str, x_title: &str, samples: &[f64], style: Style) -> Figure {
    let trace = json!({
        "type": "histogram",
        "x": samples,
        "marker": { "color": style.color },
        "opacity": style.opacity,
    });
    Figure::new(trace, axis_layout(title, x_title, "count"), style)
}

/// Histogram over categories that were already counted, kept in view order.
pub fn category_histogram(
    title: &str,
    x_title: &str,
    view: &Ranked<usize>,
    style: Style,
) -> Figure {
    let (labels, counts) = split(view);
    let trace = json!({
        "type": "histogram",
        "histfunc": "sum",
        "x": labels,
        "y": counts,
        "marker": { "color": style.color },
        "opacity": style.opacity,
    });
    let mut layout = axis_layout(title, x_title, "Count");
    layout["xaxis"]["categoryorder"] = json!("array");
    layout["xaxis"]["categoryarray"] = json!(labels);
    Figure::new(trace, layout, style)
}

pub fn choropleth(title: &str, view: &Ranked<usize>) -> Figure {
    let (countries, counts) = split(view);
    let trace = json!({
        "type": "choropleth",
        "locations": countries,
        "locationmode": "country names",
        "z": counts,
        "colorscale": "Blues",
        "colorbar": { "title": { "text": "Boxer Count" } },
    });
    let layout = json!({
        "margin": { "r": 0, "t": 50, "l": 0, "b": 0 },
        "geo": {
            "projection": { "type": "natural earth" },
            "showcoastlines": true,
            "coastlinecolor": ACCENT,
            "showland": true,
            "landcolor": BACKGROUND,
        },
        "title": {
            "text": title,
            "y": 0.95,
            "x": 0.45,
            "font": { "color": TEXT },
        },
    });
    Figure::new(trace, layout, Style::new(PRIMARY, 1.0).with_height(MAP_HEIGHT))
}

/// The six figures that never change after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticFigures {
    pub choropleth: Figure,
    pub ko_by_group: Figure,
    pub zodiac: Figure,
    pub nationalities: Figure,
    pub height: Figure,
    pub reach: Figure,
}

impl StaticFigures {
    pub fn build(views: &Views) -> StaticFigures {
        StaticFigures {
            choropleth: choropleth("Boxer Nationalities", &views.countries),
            ko_by_group: bar(
                "Average KO Percentage by Sex and Weight Class",
                "sex_weight_class",
                "ko_percentage",
                &views.ko_by_group,
                BAR,
            ),
            zodiac: category_histogram(
                "Zodiac Signs Distribution",
                "Zodiac Sign",
                &views.signs,
                BAR,
            ),
            nationalities: bar(
                "Top 10 Nationalities",
                "Nationality",
                "Count",
                &views.nationalities,
                FADED_BAR,
            ),
            height: histogram(
                "Height Distribution Across All Weight Classes and Sexes",
                "Height_cm",
                &views.distributions.heights,
                SIZE_HISTOGRAM,
            ),
            reach: histogram(
                "Reach Distribution Across All Weight Classes and Sexes",
                "Reach_cm",
                &views.distributions.reaches,
                SIZE_HISTOGRAM,
            ),
        }
    }
}
