use super::{Layers, Reducer};
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum DrawStyle {
        Line = "line" => "line",
        Bars = "bars" => "bars",
        Points = "points" => "points",
    }
}

hcl_enum! {
    pub enum LineInterpolation {
        Linear = "linear" => "linear",
        Smooth = "smooth" => "smooth",
        StepBefore = "step_before" => "stepBefore",
        StepAfter = "step_after" => "stepAfter",
    }
}

hcl_enum! {
    pub enum GradientMode {
        None = "none" => "none",
        Opacity = "opacity" => "opacity",
        Hue = "hue" => "hue",
        Scheme = "scheme" => "scheme",
    }
}

hcl_enum! {
    pub enum ShowPoints {
        Auto = "auto" => "auto",
        Always = "always" => "always",
        Never = "never" => "never",
    }
}

hcl_enum! {
    pub enum Stacking {
        None = "none" => "none",
        Normal = "normal" => "normal",
        Percent = "percent" => "percent",
    }
}

hcl_enum! {
    pub enum AxisPlacement {
        Auto = "auto" => "auto",
        Left = "left" => "left",
        Right = "right" => "right",
        Hidden = "hidden" => "hidden",
    }
}

hcl_enum! {
    pub enum LegendMode {
        List = "list" => "list",
        Table = "table" => "table",
        Hidden = "hidden" => "hidden",
    }
}

hcl_enum! {
    pub enum LegendPlacement {
        Bottom = "bottom" => "bottom",
        Right = "right" => "right",
    }
}

hcl_enum! {
    pub enum TooltipMode {
        Single = "single" => "single",
        Multi = "multi" => "multi",
        None = "none" => "none",
    }
}

hcl_enum! {
    pub enum TooltipSort {
        None = "none" => "none",
        Ascending = "ascending" => "asc",
        Descending = "descending" => "desc",
    }
}

settings! {
    pub struct TimeSeriesSettings / TimeSeriesOverrides {
        draw_style: DrawStyle = DrawStyle::Line,
        line_interpolation: LineInterpolation = LineInterpolation::Linear,
        line_width: u32 = 1,
        fill_opacity: u32 = 0,
        gradient_mode: GradientMode = GradientMode::None,
        show_points: ShowPoints = ShowPoints::Auto,
        point_size: u32 = 5,
        span_nulls: bool = false,
        stacking: Stacking = Stacking::None,
        axis_placement: AxisPlacement = AxisPlacement::Auto,
        axis_label: Option<String> = None,
        legend_mode: LegendMode = LegendMode::List,
        legend_placement: LegendPlacement = LegendPlacement::Bottom,
        legend_calculations: Vec<Reducer> = Vec::new(),
        tooltip_mode: TooltipMode = TooltipMode::Single,
        tooltip_sort: TooltipSort = TooltipSort::None,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeSeriesPanel {
    pub options: TimeSeriesOptions,
    pub field_config: FieldConfig<TimeSeriesFieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeSeriesOptions {
    pub legend: Legend,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Legend {
    pub display_mode: String,
    pub placement: String,
    pub show_legend: bool,
    pub calcs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tooltip {
    pub mode: String,
    pub sort: String,
}

/// `fieldConfig.defaults.custom` of time series panels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeSeriesFieldConfig {
    pub draw_style: String,
    pub line_interpolation: String,
    pub line_width: u32,
    pub fill_opacity: u32,
    pub gradient_mode: String,
    pub show_points: String,
    pub point_size: u32,
    pub span_nulls: bool,
    pub stacking: StackingConfig,
    pub axis_placement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackingConfig {
    pub mode: String,
    pub group: String,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(TimeSeriesSettings::default(), &layers.defaults.time_series)?;
    let field = layers.field(FieldSettings::palette())?;

    let options = TimeSeriesOptions {
        legend: Legend {
            display_mode: settings.legend_mode.wire_name().to_string(),
            placement: settings.legend_placement.wire_name().to_string(),
            show_legend: settings.legend_mode != LegendMode::Hidden,
            calcs: settings
                .legend_calculations
                .iter()
                .map(|calc| calc.wire_name().to_string())
                .collect(),
        },
        tooltip: Tooltip {
            mode: settings.tooltip_mode.wire_name().to_string(),
            sort: settings.tooltip_sort.wire_name().to_string(),
        },
    };

    let custom = TimeSeriesFieldConfig {
        draw_style: settings.draw_style.wire_name().to_string(),
        line_interpolation: settings.line_interpolation.wire_name().to_string(),
        line_width: settings.line_width,
        fill_opacity: settings.fill_opacity,
        gradient_mode: settings.gradient_mode.wire_name().to_string(),
        show_points: settings.show_points.wire_name().to_string(),
        point_size: settings.point_size,
        span_nulls: settings.span_nulls,
        stacking: StackingConfig {
            mode: settings.stacking.wire_name().to_string(),
            group: "A".to_string(),
        },
        axis_placement: settings.axis_placement.wire_name().to_string(),
        axis_label: settings.axis_label,
    };

    Ok(PanelKind::TimeSeries(TimeSeriesPanel {
        options,
        field_config: field_config::build(&field, Some(custom)),
    }))
}
