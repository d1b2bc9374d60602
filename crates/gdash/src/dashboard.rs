//! dashboard assembly
//!
//! A `dashboard` block lists its panels in `row` blocks. Every row holds panel json (usually
//! `panel.<kind>.<name>.json` references, hand written json works as well). The panels are
//! decoded, positioned on the grid, numbered and wrapped with the dashboard settings.
use crate::defaults::ProviderDefaults;
use crate::error::Error;
use crate::layout::{self, EmptyRows, Size};
use crate::overlay::{resolve, settings, ReadBlock};
use crate::panel::{self, Panel, PanelKind};
use crate::scope::{hcl_enum, Scope};
use serde::{Deserialize, Serialize};

/// Version of the dashboard json model that is emitted
pub const SCHEMA_VERSION: u32 = 36;

hcl_enum! {
    pub enum Style {
        Dark = "dark" => "dark",
        Light = "light" => "light",
    }
}

hcl_enum! {
    /// Sharing of crosshair and tooltip between panels
    pub enum GraphTooltip {
        Default = "default" => "0",
        SharedCrosshair = "shared_crosshair" => "1",
        SharedTooltip = "shared_tooltip" => "2",
    }
}

impl GraphTooltip {
    fn code(self) -> u8 {
        match self {
            GraphTooltip::Default => 0,
            GraphTooltip::SharedCrosshair => 1,
            GraphTooltip::SharedTooltip => 2,
        }
    }
}

hcl_enum! {
    /// What part of a template variable is hidden
    pub enum Hide {
        Nothing = "nothing" => "0",
        Label = "label" => "1",
        Variable = "variable" => "2",
    }
}

impl Hide {
    fn code(self) -> u8 {
        match self {
            Hide::Nothing => 0,
            Hide::Label => 1,
            Hide::Variable => 2,
        }
    }
}

settings! {
    pub struct DashboardSettings / DashboardOverrides {
        tags: Vec<String> = Vec::new(),
        timezone: String = "browser".to_string(),
        refresh: Option<String> = None,
        editable: bool = true,
        style: Style = Style::Dark,
        graph_tooltip: GraphTooltip = GraphTooltip::Default,
        time_from: String = "now-6h".to_string(),
        time_to: String = "now".to_string(),
        empty_rows: EmptyRows = EmptyRows::Gutter,
    }
}

/// The dashboard json model; fields are declared in key order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub editable: bool,
    pub graph_tooltip: u8,
    pub panels: Vec<Panel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    pub schema_version: u32,
    pub style: String,
    pub tags: Vec<String>,
    pub templating: Templating,
    pub time: TimeRange,
    pub timezone: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Templating {
    pub list: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Variable {
    Custom(CustomVariable),
    Constant(ConstantVariable),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<VariableOption>,
    pub hide: u8,
    pub include_all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub multi: bool,
    pub name: String,
    pub options: Vec<VariableOption>,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantVariable {
    pub hide: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub name: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableOption {
    pub selected: bool,
    pub text: String,
    pub value: String,
}

const ALL_VALUE: &str = "$__all";

impl VariableOption {
    fn new(text: &str, value: &str, selected: bool) -> Self {
        Self {
            selected,
            text: text.to_string(),
            value: value.to_string(),
        }
    }
}

/// `variable "<name>" { label = .. hide = .. custom { .. } | constant { .. } }`
fn read_variable(name: &str, variable: &Scope<'_>) -> Result<Variable, Error> {
    variable.deny_unknown(&["label", "hide", "custom", "constant"])?;
    let label = variable.optional("label")?;
    let hide: Option<Hide> = variable.optional("hide")?;

    let (kind, definition) = one_variable_kind(variable)?;
    let read = match kind {
        "custom" => {
            definition.deny_unknown(&["values", "current", "multi", "include_all"])?;
            let values: Vec<String> = definition.required("values")?;
            let include_all = definition.optional("include_all")?.unwrap_or(false);
            let current: Option<String> = definition
                .optional("current")?
                .or_else(|| values.first().cloned());

            let mut options = Vec::with_capacity(values.len() + 1);
            if include_all {
                options.push(VariableOption::new(
                    "All",
                    ALL_VALUE,
                    current.as_deref() == Some(ALL_VALUE),
                ));
            }
            options.extend(values.iter().map(|value| {
                VariableOption::new(value, value, current.as_deref() == Some(value.as_str()))
            }));

            Variable::Custom(CustomVariable {
                current: options.iter().find(|option| option.selected).cloned(),
                hide: hide.unwrap_or(Hide::Nothing).code(),
                include_all,
                label,
                multi: definition.optional("multi")?.unwrap_or(false),
                name: name.to_string(),
                options,
                query: values.join(","),
            })
        }
        _ => {
            definition.deny_unknown(&["value"])?;
            Variable::Constant(ConstantVariable {
                hide: hide.unwrap_or(Hide::Variable).code(),
                label,
                name: name.to_string(),
                query: definition.required("value")?,
            })
        }
    };

    Ok(read)
}

/// `custom` or `constant`; unlike targets the variable block also carries attributes
fn one_variable_kind<'a>(variable: &Scope<'a>) -> Result<(&'static str, Scope<'a>), Error> {
    match (variable.block("custom")?, variable.block("constant")?) {
        (Some(custom), None) => Ok(("custom", custom)),
        (None, Some(constant)) => Ok(("constant", constant)),
        (Some(_), Some(_)) => Err(Error::invalid(
            variable.path(),
            "only one of custom, constant may be set",
        )),
        (None, None) => Err(Error::invalid(
            variable.path(),
            "one of custom, constant must be set",
        )),
    }
}

/// Decode the panels of every `row` block
fn read_rows(dashboard: &Scope<'_>) -> Result<Vec<Vec<Panel>>, Error> {
    dashboard
        .blocks("row")
        .map(|row| -> Result<Vec<Panel>, Error> {
            row.deny_unknown(&["panels"])?;
            let sources: Vec<String> = row.optional("panels")?.unwrap_or_default();
            sources
                .iter()
                .map(|source| panel::decode(source.as_bytes()))
                .collect()
        })
        .collect()
}

/// Number panels (and the panels nested in rows) depth first, starting at `next`
fn assign_ids(panels: &mut [Panel], next: &mut u32) {
    for panel in panels {
        panel.common.id = Some(*next);
        *next += 1;

        if let PanelKind::Row(row) = &mut panel.kind {
            assign_ids(&mut row.panels, next);
        }
    }
}

/// Build the dashboard declared by a `dashboard "<name>"` block
#[tracing::instrument(level = "debug", skip(dashboard, defaults), fields(path = dashboard.path()))]
pub fn build(
    name: &str,
    dashboard: &Scope<'_>,
    defaults: &ProviderDefaults,
) -> Result<Dashboard, Error> {
    let mut known = vec!["title", "uid", "variable", "row"];
    known.extend_from_slice(DashboardOverrides::KEYS);
    dashboard.deny_unknown(&known)?;

    let settings = resolve(
        DashboardSettings::default(),
        &[&defaults.dashboard, &DashboardOverrides::read(dashboard)?],
    );

    let variables = dashboard
        .labeled_blocks("variable")?
        .iter()
        .map(|(name, variable)| read_variable(name, variable))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = read_rows(dashboard)?;
    let sizes: Vec<Vec<Size>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|panel| Size {
                    width: panel.common.grid_pos.w,
                    height: panel.common.grid_pos.h,
                })
                .collect()
        })
        .collect();

    let positions = layout::arrange(&sizes, settings.empty_rows);
    for (row, positions) in rows.iter_mut().zip(positions) {
        for (panel, position) in row.iter_mut().zip(positions) {
            panel.common.grid_pos.x = position.x;
            panel.common.grid_pos.y = position.y;
        }
    }

    let mut panels: Vec<Panel> = rows.into_iter().flatten().collect();
    assign_ids(&mut panels, &mut 1);
    tracing::debug!(panels = panels.len(), variables = variables.len(), "dashboard assembled");

    Ok(Dashboard {
        editable: settings.editable,
        graph_tooltip: settings.graph_tooltip.code(),
        panels,
        refresh: settings.refresh,
        schema_version: SCHEMA_VERSION,
        style: settings.style.wire_name().to_string(),
        tags: settings.tags,
        templating: Templating { list: variables },
        time: TimeRange {
            from: settings.time_from,
            to: settings.time_to,
        },
        timezone: settings.timezone,
        title: dashboard
            .optional("title")?
            .unwrap_or_else(|| name.to_string()),
        uid: dashboard.optional("uid")?,
    })
}
