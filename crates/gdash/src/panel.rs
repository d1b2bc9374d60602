//! the panel document model
//!
//! A [Panel] is the common envelope ([CommonPanel]) plus exactly one kind specific payload
//! ([PanelKind]). In json both are one flat object and the `type` key selects the kind.
//! Kinds that are not modeled decode into [PanelKind::Other] and keep their payload as is.
use crate::error::Error;
use crate::output::Format;
use crate::panels::{
    bar_gauge::BarGaugePanel, gauge::GaugePanel, graph::GraphPanel, heatmap::HeatmapPanel,
    logs::LogsPanel, row::RowPanel, stat::StatPanel, table::TablePanel, text::TextPanel,
    time_series::TimeSeriesPanel,
};
use crate::target::{Datasource, Target};
use crate::transform::Transformation;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub common: CommonPanel,
    pub kind: PanelKind,
}

/// Fields every panel kind shares
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Datasource>,
    pub grid_pos: GridPos,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub transparent: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<Transformation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPos {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Graph(GraphPanel),
    Table(TablePanel),
    Text(TextPanel),
    Stat(StatPanel),
    Gauge(GaugePanel),
    BarGauge(BarGaugePanel),
    Row(RowPanel),
    Heatmap(HeatmapPanel),
    TimeSeries(TimeSeriesPanel),
    Logs(LogsPanel),
    /// A panel kind without a model; every key but `type` is kept verbatim, the envelope
    /// included
    Other {
        kind: String,
        payload: BTreeMap<String, Value>,
    },
}

impl PanelKind {
    /// The `type` discriminator
    pub fn type_name(&self) -> &str {
        match self {
            PanelKind::Graph(_) => "graph",
            PanelKind::Table(_) => "table",
            PanelKind::Text(_) => "text",
            PanelKind::Stat(_) => "stat",
            PanelKind::Gauge(_) => "gauge",
            PanelKind::BarGauge(_) => "bargauge",
            PanelKind::Row(_) => "row",
            PanelKind::Heatmap(_) => "heatmap",
            PanelKind::TimeSeries(_) => "timeseries",
            PanelKind::Logs(_) => "logs",
            PanelKind::Other { kind, .. } => kind,
        }
    }

    fn from_object(kind: &str, object: BTreeMap<String, Value>) -> serde_json::Result<Self> {
        let value = || Value::Object(object.clone().into_iter().collect());

        let decoded = match kind {
            "graph" => PanelKind::Graph(serde_json::from_value(value())?),
            "table" => PanelKind::Table(serde_json::from_value(value())?),
            "text" => PanelKind::Text(serde_json::from_value(value())?),
            "stat" => PanelKind::Stat(serde_json::from_value(value())?),
            "gauge" => PanelKind::Gauge(serde_json::from_value(value())?),
            "bargauge" => PanelKind::BarGauge(serde_json::from_value(value())?),
            "row" => PanelKind::Row(serde_json::from_value(value())?),
            "heatmap" => PanelKind::Heatmap(serde_json::from_value(value())?),
            "timeseries" => PanelKind::TimeSeries(serde_json::from_value(value())?),
            "logs" => PanelKind::Logs(serde_json::from_value(value())?),
            _ => {
                let payload = object.into_iter().filter(|(key, _)| key != "type").collect();

                PanelKind::Other {
                    kind: kind.to_string(),
                    payload,
                }
            }
        };

        Ok(decoded)
    }

    fn to_object(&self) -> serde_json::Result<BTreeMap<String, Value>> {
        match self {
            PanelKind::Graph(payload) => to_object(payload),
            PanelKind::Table(payload) => to_object(payload),
            PanelKind::Text(payload) => to_object(payload),
            PanelKind::Stat(payload) => to_object(payload),
            PanelKind::Gauge(payload) => to_object(payload),
            PanelKind::BarGauge(payload) => to_object(payload),
            PanelKind::Row(payload) => to_object(payload),
            PanelKind::Heatmap(payload) => to_object(payload),
            PanelKind::TimeSeries(payload) => to_object(payload),
            PanelKind::Logs(payload) => to_object(payload),
            PanelKind::Other { payload, .. } => Ok(payload.clone()),
        }
    }
}

fn to_object<T: Serialize>(value: &T) -> serde_json::Result<BTreeMap<String, Value>> {
    use serde::ser::Error as _;

    match serde_json::to_value(value)? {
        Value::Object(object) => Ok(object.into_iter().collect()),
        other => Err(serde_json::Error::custom(format!(
            "panel payload must be an object, not {other}"
        ))),
    }
}

impl Panel {
    pub fn new(common: CommonPanel, kind: PanelKind) -> Self {
        Self { common, kind }
    }

    pub fn title(&self) -> &str {
        &self.common.title
    }

    /// The flat json object; keys are sorted
    ///
    /// Unmodeled kinds keep their envelope as decoded. Only an `id` or `gridPos` assigned
    /// since then is written over it.
    pub fn to_object(&self) -> serde_json::Result<BTreeMap<String, Value>> {
        let mut object = self.kind.to_object()?;
        match &self.kind {
            PanelKind::Other { payload, .. } => {
                let decoded_id = payload.get("id").and_then(Value::as_u64);
                if let Some(id) = self.common.id.filter(|id| decoded_id != Some(u64::from(*id))) {
                    object.insert("id".to_string(), id.into());
                }

                let decoded_grid_pos = payload
                    .get("gridPos")
                    .and_then(|grid_pos| GridPos::deserialize(grid_pos).ok())
                    .unwrap_or_default();
                if self.common.grid_pos != decoded_grid_pos {
                    object.insert(
                        "gridPos".to_string(),
                        serde_json::to_value(self.common.grid_pos)?,
                    );
                }
            }
            _ => object.extend(to_object(&self.common)?),
        }
        object.insert(
            "type".to_string(),
            Value::String(self.kind.type_name().to_string()),
        );
        Ok(object)
    }

    pub fn from_object(object: BTreeMap<String, Value>) -> serde_json::Result<Self> {
        use serde::de::Error as _;

        let Some(kind) = object.get("type").and_then(Value::as_str).map(str::to_string) else {
            return Err(serde_json::Error::custom("panel has no type"));
        };

        let common = serde_json::from_value(Value::Object(object.clone().into_iter().collect()))?;
        let kind = PanelKind::from_object(&kind, object)?;
        Ok(Self { common, kind })
    }
}

impl Serialize for Panel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error as _;

        self.to_object()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Panel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;

        let object = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Panel::from_object(object).map_err(D::Error::custom)
    }
}

/// Just enough of the envelope to name a panel in diagnostics
#[derive(Deserialize, Default)]
struct Probe {
    #[serde(default)]
    title: String,
    #[serde(default, rename = "type")]
    kind: String,
}

/// Decode a panel from its json source
pub fn decode(bytes: &[u8]) -> Result<Panel, Error> {
    let probe: Probe = serde_json::from_slice(bytes).unwrap_or_default();
    tracing::trace!(title = %probe.title, kind = %probe.kind, "decoding panel");

    serde_json::from_slice(bytes).map_err(|source| Error::Decode {
        title: probe.title,
        kind: probe.kind,
        source,
    })
}

/// Encode a panel as json
pub fn encode(panel: &Panel, format: Format) -> Result<Vec<u8>, Error> {
    format.to_vec(panel).map_err(|source| Error::Encode {
        title: panel.title().to_string(),
        source,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unknown_kinds_round_trip() {
        let raw = json!({
            "type": "piechart",
            "title": "Share",
            "gridPos": { "h": 4, "w": 6, "x": 0, "y": 0 },
            "options": { "pieType": "donut", "legend": { "values": ["percent"] } },
            "pluginVersion": "10.0.0"
        });

        let panel: Panel = serde_json::from_value(raw.clone()).unwrap();
        let PanelKind::Other { kind, payload } = &panel.kind else {
            panic!("expected open payload, got {:?}", panel.kind);
        };
        assert_eq!(kind, "piechart");
        assert_eq!(
            payload.keys().collect::<Vec<_>>(),
            vec!["gridPos", "options", "pluginVersion", "title"]
        );

        assert_eq!(serde_json::to_value(&panel).unwrap(), raw);
    }

    #[test]
    fn unknown_kinds_keep_their_envelope() {
        let raw = json!({
            "type": "piechart",
            "title": "x",
            "transparent": false,
            "targets": [],
            "options": {}
        });
        let panel: Panel = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&panel).unwrap(), raw);

        let raw = json!({
            "type": "piechart",
            "title": "Share",
            "targets": [{
                "datasource": { "type": "prometheus", "uid": "prom" },
                "expr": "sum(up)",
                "refId": "A"
            }]
        });
        let panel: Panel = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&panel).unwrap(), raw);
    }

    #[test]
    fn unknown_kinds_take_assigned_id_and_position() {
        let mut panel: Panel = serde_json::from_value(json!({
            "type": "piechart",
            "title": "Share",
            "gridPos": { "h": 5, "w": 12 },
            "transparent": false
        }))
        .unwrap();
        panel.common.id = Some(7);
        panel.common.grid_pos.y = 3;

        assert_eq!(
            serde_json::to_value(&panel).unwrap(),
            json!({
                "type": "piechart",
                "title": "Share",
                "id": 7,
                "gridPos": { "h": 5, "w": 12, "x": 0, "y": 3 },
                "transparent": false
            })
        );
    }

    #[test]
    fn keys_are_sorted() {
        let panel: Panel = serde_json::from_value(json!({
            "type": "news",
            "zeta": 1,
            "alpha": 2,
            "title": "x"
        }))
        .unwrap();

        let compact = String::from_utf8(encode(&panel, Format::Compact).unwrap()).unwrap();
        insta::assert_snapshot!(compact, @r#"{"alpha":2,"title":"x","type":"news","zeta":1}"#);
    }

    #[test]
    fn known_kinds_round_trip() {
        let raw = json!({
            "type": "text",
            "title": "Readme",
            "id": 3,
            "gridPos": { "h": 3, "w": 24, "x": 0, "y": 9 },
            "options": { "mode": "markdown", "content": "# hello" }
        });

        let panel = decode(raw.to_string().as_bytes()).unwrap();
        assert!(matches!(panel.kind, PanelKind::Text(_)));
        assert_eq!(panel.common.id, Some(3));
        assert_eq!(panel.common.grid_pos, GridPos { h: 3, w: 24, x: 0, y: 9 });

        let encoded = encode(&panel, Format::Pretty).unwrap();
        assert_eq!(decode(&encoded).unwrap(), panel);
        assert_eq!(serde_json::from_slice::<Value>(&encoded).unwrap(), raw);
    }

    #[test]
    fn decode_errors_name_the_panel() {
        let err = decode(br#"{"type": "stat", "title": "Requests", "options": {"reduceOptions": {"calcs": "mean"}}}"#)
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with(r#"unable to decode panel (title: "Requests", type: "stat")"#),
            "{err}"
        );

        let err = decode(br#"{"title": "Untyped"}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { ref title, .. } if title == "Untyped"));

        let err = decode(b"not json").unwrap_err();
        assert!(matches!(err, Error::Decode { ref kind, .. } if kind.is_empty()));
    }

    #[test]
    fn rows_nest_panels() {
        let raw = json!({
            "type": "row",
            "title": "Details",
            "collapsed": true,
            "gridPos": { "h": 1, "w": 24, "x": 0, "y": 0 },
            "panels": [
                { "type": "text", "title": "inner", "gridPos": { "h": 1, "w": 1, "x": 0, "y": 0 }, "options": { "mode": "html", "content": "" } }
            ]
        });

        let panel: Panel = serde_json::from_value(raw.clone()).unwrap();
        let PanelKind::Row(row) = &panel.kind else {
            panic!("expected row");
        };
        assert_eq!(row.panels.len(), 1);
        assert_eq!(serde_json::to_value(&panel).unwrap(), raw);
    }
}
