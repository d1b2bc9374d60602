//! the legacy graph panel
use super::Layers;
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum NullPointMode {
        Null = "null" => "null",
        Connected = "connected" => "connected",
        NullAsZero = "null_as_zero" => "null as zero",
    }
}

hcl_enum! {
    pub enum TooltipSort {
        None = "none" => "0",
        Ascending = "ascending" => "1",
        Descending = "descending" => "2",
    }
}

impl TooltipSort {
    fn code(self) -> u8 {
        match self {
            TooltipSort::None => 0,
            TooltipSort::Ascending => 1,
            TooltipSort::Descending => 2,
        }
    }
}

settings! {
    pub struct GraphSettings / GraphOverrides {
        lines: bool = true,
        line_width: u32 = 1,
        fill: u32 = 1,
        points: bool = false,
        point_radius: u32 = 2,
        bars: bool = false,
        stack: bool = false,
        percentage: bool = false,
        null_point_mode: NullPointMode = NullPointMode::Null,
        legend: bool = true,
        legend_as_table: bool = false,
        legend_right: bool = false,
        tooltip_shared: bool = true,
        tooltip_sort: TooltipSort = TooltipSort::None,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphPanel {
    pub lines: bool,
    #[serde(rename = "linewidth")]
    pub line_width: u32,
    pub fill: u32,
    pub points: bool,
    #[serde(rename = "pointradius")]
    pub point_radius: u32,
    pub bars: bool,
    pub stack: bool,
    pub percentage: bool,
    pub null_point_mode: String,
    pub legend: GraphLegend,
    pub tooltip: GraphTooltip,
    pub field_config: FieldConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphLegend {
    pub show: bool,
    pub align_as_table: bool,
    pub right_side: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphTooltip {
    pub shared: bool,
    pub sort: u8,
    pub value_type: String,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(GraphSettings::default(), &layers.defaults.graph)?;
    let field = layers.field(FieldSettings::palette())?;

    Ok(PanelKind::Graph(GraphPanel {
        lines: settings.lines,
        line_width: settings.line_width,
        fill: settings.fill,
        points: settings.points,
        point_radius: settings.point_radius,
        bars: settings.bars,
        stack: settings.stack,
        percentage: settings.percentage,
        null_point_mode: settings.null_point_mode.wire_name().to_string(),
        legend: GraphLegend {
            show: settings.legend,
            align_as_table: settings.legend_as_table,
            right_side: settings.legend_right,
        },
        tooltip: GraphTooltip {
            shared: settings.tooltip_shared,
            sort: settings.tooltip_sort.code(),
            value_type: "individual".to_string(),
        },
        field_config: field_config::build(&field, None),
    }))
}
