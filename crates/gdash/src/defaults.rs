//! the provider level `defaults` block
//!
//! ```hcl
//! defaults {
//!   panel     { height = 6 }
//!   field     { unit = "short" }
//!   dashboard { timezone = "utc" }
//!   stat      { graph_mode = "none" }
//! }
//! ```
//!
//! Read once per workspace and passed by reference to every render.
use crate::dashboard::DashboardOverrides;
use crate::error::Error;
use crate::field_config::FieldOverrides;
use crate::overlay::ReadBlock;
use crate::panels::{
    bar_gauge::BarGaugeOverrides, gauge::GaugeOverrides, graph::GraphOverrides,
    heatmap::HeatmapOverrides, logs::LogsOverrides, row::RowOverrides, stat::StatOverrides,
    table::TableOverrides, text::TextOverrides, time_series::TimeSeriesOverrides, PanelOverrides,
    KINDS,
};
use crate::scope::Scope;

/// Fallback values for every panel and dashboard of a workspace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderDefaults {
    pub panel: PanelOverrides,
    pub field: FieldOverrides,
    pub dashboard: DashboardOverrides,
    pub bar_gauge: BarGaugeOverrides,
    pub gauge: GaugeOverrides,
    pub stat: StatOverrides,
    pub graph: GraphOverrides,
    pub time_series: TimeSeriesOverrides,
    pub heatmap: HeatmapOverrides,
    pub logs: LogsOverrides,
    pub table: TableOverrides,
    pub text: TextOverrides,
    pub row: RowOverrides,
}

impl ProviderDefaults {
    /// Read the body of a `defaults` block; without one every layer is empty
    pub fn read(defaults: Option<Scope<'_>>) -> Result<Self, Error> {
        let Some(defaults) = defaults else {
            return Ok(Self::default());
        };

        let mut known = vec!["panel", "field", "dashboard"];
        known.extend_from_slice(KINDS);
        defaults.deny_unknown(&known)?;

        Ok(Self {
            panel: PanelOverrides::read_block(defaults.block("panel")?)?,
            field: FieldOverrides::read_block(defaults.block("field")?)?,
            dashboard: DashboardOverrides::read_block(defaults.block("dashboard")?)?,
            bar_gauge: BarGaugeOverrides::read_block(defaults.block("bar_gauge")?)?,
            gauge: GaugeOverrides::read_block(defaults.block("gauge")?)?,
            stat: StatOverrides::read_block(defaults.block("stat")?)?,
            graph: GraphOverrides::read_block(defaults.block("graph")?)?,
            time_series: TimeSeriesOverrides::read_block(defaults.block("time_series")?)?,
            heatmap: HeatmapOverrides::read_block(defaults.block("heatmap")?)?,
            logs: LogsOverrides::read_block(defaults.block("logs")?)?,
            table: TableOverrides::read_block(defaults.block("table")?)?,
            text: TextOverrides::read_block(defaults.block("text")?)?,
            row: RowOverrides::read_block(defaults.block("row")?)?,
        })
    }
}
