//! panel kinds
//!
//! One module per kind, each holding the kind's settings (built-in defaults and overrides),
//! its json payload and the translation between them. [build] reads a `panel` block and
//! resolves it against the provider defaults.
pub mod bar_gauge;
pub mod gauge;
pub mod graph;
pub mod heatmap;
pub mod logs;
pub mod row;
pub mod stat;
pub mod table;
pub mod text;
pub mod time_series;

use crate::defaults::ProviderDefaults;
use crate::error::Error;
use crate::field_config::{FieldOverrides, FieldSettings};
use crate::overlay::{resolve, settings, Overlay, ReadBlock};
use crate::panel::{CommonPanel, GridPos, Panel};
use crate::scope::{hcl_enum, Scope};
use crate::target::{self, Datasource, DatasourceRef};
use crate::transform;
use serde::{Deserialize, Serialize};

/// Panel kinds as written in `panel "<kind>" "<name>"` labels
pub const KINDS: &[&str] = &[
    "bar_gauge",
    "gauge",
    "stat",
    "graph",
    "time_series",
    "heatmap",
    "logs",
    "table",
    "text",
    "row",
];

hcl_enum! {
    /// Calculation reducing a series to a single value
    pub enum Reducer {
        LastNotNull = "last_not_null" => "lastNotNull",
        Last = "last" => "last",
        FirstNotNull = "first_not_null" => "firstNotNull",
        First = "first" => "first",
        Min = "min" => "min",
        Max = "max" => "max",
        Mean = "mean" => "mean",
        Median = "median" => "median",
        Sum = "sum" => "sum",
        Count = "count" => "count",
        Range = "range" => "range",
        Delta = "delta" => "delta",
        Diff = "diff" => "diff",
        Changes = "changes" => "changes",
        DistinctCount = "distinct_count" => "distinctCount",
        StdDev = "std_dev" => "stdDev",
        Variance = "variance" => "variance",
    }
}

hcl_enum! {
    pub enum Orientation {
        Auto = "auto" => "auto",
        Horizontal = "horizontal" => "horizontal",
        Vertical = "vertical" => "vertical",
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReduceOptions {
    pub values: bool,
    pub calcs: Vec<String>,
    pub fields: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ReduceOptions {
    pub fn new(calculation: Reducer, fields: &str, all_values: bool, limit: Option<u32>) -> Self {
        Self {
            values: all_values,
            calcs: vec![calculation.wire_name().to_string()],
            fields: fields.to_string(),
            limit: limit.filter(|_| all_values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_size: Option<u32>,
}

settings! {
    /// Envelope settings every panel kind shares
    pub struct PanelSettings / PanelOverrides {
        width: u32 = 12,
        height: u32 = 8,
        transparent: bool = false,
    }
}

impl PanelSettings {
    /// Built-in envelope of a kind; rows span the full width one unit high
    pub fn baseline(kind: &str) -> Self {
        match kind {
            "row" => Self {
                width: 24,
                height: 1,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

/// The configuration layers a panel kind resolves its settings from
pub struct Layers<'s, 'a> {
    pub defaults: &'s ProviderDefaults,
    options: Option<Scope<'a>>,
    field: Option<Scope<'a>>,
}

impl<'s, 'a> Layers<'s, 'a> {
    pub fn new(
        defaults: &'s ProviderDefaults,
        options: Option<Scope<'a>>,
        field: Option<Scope<'a>>,
    ) -> Self {
        Self {
            defaults,
            options,
            field,
        }
    }

    /// Built-in defaults, then the provider layer, then the panel's `options` block
    pub fn options<T, O>(&self, baseline: T, provider: &O) -> Result<T, Error>
    where
        O: Overlay<T> + ReadBlock,
    {
        let panel = O::read_block(self.options.clone())?;
        Ok(resolve(baseline, &[provider, &panel]))
    }

    /// Field configuration: `baseline`, then the provider `field` block, then the panel's
    pub fn field(&self, baseline: FieldSettings) -> Result<FieldSettings, Error> {
        let panel = FieldOverrides::read_block(self.field.clone())?;
        Ok(resolve(baseline, &[&self.defaults.field, &panel]))
    }
}

const ENVELOPE_ATTRIBUTES: &[&str] = &[
    "title",
    "description",
    "width",
    "height",
    "transparent",
    "span",
    "options",
];

const QUERY_BLOCKS: &[&str] = &["datasource", "target", "transform", "field"];

/// Whether a kind shows query results (and thus takes targets, field config, transformations)
fn queries(kind: &str) -> bool {
    !matches!(kind, "text" | "row")
}

/// Build the panel declared by a `panel "<kind>" "<name>"` block
#[tracing::instrument(level = "debug", skip(panel, defaults), fields(path = panel.path()))]
pub fn build(kind: &str, panel: &Scope<'_>, defaults: &ProviderDefaults) -> Result<Panel, Error> {
    let mut known = ENVELOPE_ATTRIBUTES.to_vec();
    if queries(kind) {
        known.extend_from_slice(QUERY_BLOCKS);
    }
    panel.deny_unknown(&known)?;

    let layers = Layers::new(defaults, panel.block("options")?, panel.block("field")?);
    let payload = match kind {
        "bar_gauge" => bar_gauge::build(&layers)?,
        "gauge" => gauge::build(&layers)?,
        "stat" => stat::build(&layers)?,
        "graph" => graph::build(&layers)?,
        "time_series" => time_series::build(&layers)?,
        "heatmap" => heatmap::build(&layers)?,
        "logs" => logs::build(&layers)?,
        "table" => table::build(&layers)?,
        "text" => text::build(&layers)?,
        "row" => row::build(&layers)?,
        _ => {
            return Err(Error::invalid(
                panel.path(),
                format!("unknown panel kind, expected one of {}", KINDS.join(", ")),
            ))
        }
    };

    let envelope = resolve(
        PanelSettings::baseline(kind),
        &[&defaults.panel, &PanelOverrides::read(panel)?],
    );

    let (targets, transformations, explicit) = if queries(kind) {
        let explicit = match panel.block("datasource")? {
            Some(datasource) => {
                datasource.deny_unknown(&["uid", "type"])?;
                Some(DatasourceRef::new(
                    datasource.required::<String>("uid")?,
                    datasource.required::<String>("type")?,
                ))
            }
            None => None,
        };

        (
            target::read_targets(panel)?,
            transform::read_transformations(panel)?,
            explicit,
        )
    } else {
        (Vec::new(), Vec::new(), None)
    };

    let common = CommonPanel {
        id: None,
        title: panel.optional("title")?.unwrap_or_default(),
        description: panel.optional("description")?,
        datasource: target::panel_datasource(explicit, &targets).map(Datasource::Ref),
        grid_pos: GridPos {
            h: envelope.height,
            w: envelope.width,
            x: 0,
            y: 0,
        },
        span: panel.optional("span")?,
        transparent: envelope.transparent,
        targets,
        transformations,
    };

    tracing::debug!(kind = payload.type_name(), title = %common.title, "panel built");
    Ok(Panel::new(common, payload))
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) fn build_panel(
        kind: &str,
        source: &str,
        defaults: &ProviderDefaults,
    ) -> Result<Panel, Error> {
        let body = hcl::parse(source).expect("body must parse");
        let context = hcl::eval::Context::new();
        build(kind, &Scope::new("panel.test", &body, &context), defaults)
    }

    #[test]
    fn envelope() {
        let panel = build_panel(
            "stat",
            r#"
            title = "Requests"
            description = "per second"
            width = 6
            span = 3
            transparent = true
            target {
              prometheus {
                uid = "prom"
                expr = "sum(rate(requests_total[1m]))"
              }
            }
            "#,
            &ProviderDefaults::default(),
        )
        .unwrap();

        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(value["title"], json!("Requests"));
        assert_eq!(value["description"], json!("per second"));
        assert_eq!(value["gridPos"], json!({ "h": 8, "w": 6, "x": 0, "y": 0 }));
        assert_eq!(value["span"], json!(3));
        assert_eq!(value["transparent"], json!(true));
        assert_eq!(value["datasource"], json!({ "uid": "prom", "type": "prometheus" }));
        assert_eq!(value["type"], json!("stat"));
        assert_eq!(value["targets"][0]["refId"], json!("A"));
    }

    #[test]
    fn provider_panel_defaults_apply() {
        let body = hcl::parse("panel {\n  width = 24\n  height = 4\n}").unwrap();
        let context = hcl::eval::Context::new();
        let defaults = ProviderDefaults::read(Some(Scope::new("defaults", &body, &context))).unwrap();

        let panel = build_panel("text", r#"height = 6"#, &defaults).unwrap();
        assert_eq!(panel.common.grid_pos, GridPos { h: 6, w: 24, x: 0, y: 0 });
    }

    #[test]
    fn text_panels_take_no_queries() {
        let err = build_panel(
            "text",
            r#"
            target {
              prometheus {
                uid = "prom"
                expr = "up"
              }
            }
            "#,
            &ProviderDefaults::default(),
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "panel.test.target: unsupported attribute or block"
        );
    }

    #[test]
    fn explicit_datasource_wins() {
        let panel = build_panel(
            "time_series",
            r#"
            datasource {
              uid = "mixed"
              type = "datasource"
            }
            target {
              prometheus {
                uid = "prom"
                expr = "up"
              }
            }
            "#,
            &ProviderDefaults::default(),
        )
        .unwrap();

        assert_eq!(
            panel.common.datasource,
            Some(Datasource::Ref(DatasourceRef::new("mixed", "datasource")))
        );
    }

    #[test]
    fn unknown_kind() {
        let err = build_panel("pie", "", &ProviderDefaults::default()).unwrap_err();
        assert!(err.to_string().starts_with("panel.test: unknown panel kind"));
    }

    #[test]
    fn reduce_limit_only_with_all_values() {
        let options = ReduceOptions::new(Reducer::Mean, "", false, Some(5));
        assert_eq!(options.limit, None);

        let options = ReduceOptions::new(Reducer::Mean, "/cpu/", true, Some(5));
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            json!({ "values": true, "calcs": ["mean"], "fields": "/cpu/", "limit": 5 })
        );
    }
}
