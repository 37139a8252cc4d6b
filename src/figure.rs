//! Builds plotly.js figures from a record table.

use geo::{Centroid, MultiPoint, Point};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::{
    config::MapSettings,
    error::{Error, Result},
    plot::PlotType,
    records::{Record, HOVER_COLUMNS},
};

const MARKER_COLOR: &str = "#636efa";

/// A single rendered map, serialized as `{"data": [...], "layout": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    #[serde(skip)]
    pub plot: PlotType,
    pub data: Vec<Value>,
    pub layout: Value,
}

impl Figure {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn create_map(table: &[Record], plot: PlotType, settings: &MapSettings) -> Result<Figure> {
    let kind = match plot {
        PlotType::Scatter => json!({
            "type": "scattermapbox",
            "mode": "markers",
            "marker": { "color": MARKER_COLOR },
        }),
        PlotType::Density => json!({
            "type": "densitymapbox",
            "coloraxis": "coloraxis",
        }),
        PlotType::Lines => json!({
            "type": "scattergeo",
            "mode": "lines",
            "line": { "color": MARKER_COLOR, "dash": "solid" },
        }),
        PlotType::All => return Err(Error::UnknownPlotType(plot.to_string())),
    };
    let mut trace = hover_fields(table);
    if let Value::Object(kind) = kind {
        trace.extend(kind);
    }

    let mut layout = json!({
        "width": settings.width,
        "height": settings.height,
        "margin": { "t": 60 },
        "legend": { "tracegroupgap": 0 },
    });
    let subplot = match plot {
        PlotType::Lines => (
            "geo",
            json!({
                "projection": { "type": "orthographic" },
                "domain": { "x": [0.0, 1.0], "y": [0.0, 1.0] },
            }),
        ),
        _ => {
            let mut mapbox = json!({
                "style": settings.style,
                "zoom": settings.zoom,
                "domain": { "x": [0.0, 1.0], "y": [0.0, 1.0] },
            });
            if let Some(center) = center(table) {
                mapbox["center"] = json!({ "lat": center.y(), "lon": center.x() });
            }
            ("mapbox", mapbox)
        }
    };
    layout[subplot.0] = subplot.1;
    if plot == PlotType::Density {
        layout["coloraxis"] = json!({ "colorscale": "Plasma" });
    }

    debug!(%plot, points = table.len(), "built figure");
    Ok(Figure {
        plot,
        data: vec![Value::Object(trace)],
        layout,
    })
}

/// Mean position of the records with both coordinates, used as the initial map center.
fn center(table: &[Record]) -> Option<Point> {
    let points: MultiPoint = table
        .iter()
        .filter_map(Record::position)
        .map(|(lat, lon)| Point::new(lon, lat))
        .collect();
    points.centroid()
}

/// Coordinates plus the `id`-keyed hover metadata shared by every plot type.
/// Blank coordinates become `null`, which plotly.js skips.
fn hover_fields(table: &[Record]) -> Map<String, Value> {
    let lat: Vec<_> = table.iter().map(|r| r.latitude).collect();
    let lon: Vec<_> = table.iter().map(|r| r.longitude).collect();
    let ids: Vec<_> = table.iter().map(|r| r.id.as_str()).collect();
    let customdata: Vec<_> = table.iter().map(Record::hover_data).collect();

    let mut template = String::from("<b>%{hovertext}</b><br><br>latitude=%{lat}<br>longitude=%{lon}");
    for (i, column) in HOVER_COLUMNS.iter().enumerate() {
        template.push_str(&format!("<br>{column}=%{{customdata[{i}]}}"));
    }
    template.push_str("<extra></extra>");

    let mut fields = Map::new();
    fields.insert("lat".into(), json!(lat));
    fields.insert("lon".into(), json!(lon));
    fields.insert("hovertext".into(), json!(ids));
    fields.insert("customdata".into(), json!(customdata));
    fields.insert("hovertemplate".into(), template.into());
    fields.insert("name".into(), "".into());
    fields.insert("showlegend".into(), false.into());
    fields
}
