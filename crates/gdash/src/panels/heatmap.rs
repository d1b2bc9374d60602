use super::Layers;
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum HeatmapColorMode {
        Scheme = "scheme" => "scheme",
        Opacity = "opacity" => "opacity",
    }
}

hcl_enum! {
    pub enum ColorScale {
        Exponential = "exponential" => "exponential",
        Linear = "linear" => "linear",
    }
}

hcl_enum! {
    pub enum ShowValue {
        Auto = "auto" => "auto",
        Always = "always" => "always",
        Never = "never" => "never",
    }
}

hcl_enum! {
    pub enum YAxisPlacement {
        Left = "left" => "left",
        Right = "right" => "right",
        Hidden = "hidden" => "hidden",
    }
}

settings! {
    pub struct HeatmapSettings / HeatmapOverrides {
        calculate: bool = false,
        color_mode: HeatmapColorMode = HeatmapColorMode::Scheme,
        color_scheme: String = "Oranges".to_string(),
        color_fill: String = "dark-orange".to_string(),
        color_scale: ColorScale = ColorScale::Exponential,
        color_steps: u32 = 64,
        cell_gap: u32 = 1,
        show_value: ShowValue = ShowValue::Auto,
        y_axis_placement: YAxisPlacement = YAxisPlacement::Left,
        y_axis_unit: Option<String> = None,
        legend: bool = true,
        tooltip: bool = true,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapPanel {
    pub options: HeatmapOptions,
    pub field_config: FieldConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapOptions {
    pub calculate: bool,
    pub color: HeatmapColor,
    pub cell_gap: u32,
    pub show_value: String,
    pub y_axis: YAxis,
    pub legend: Toggle,
    pub tooltip: Toggle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapColor {
    pub mode: String,
    pub scheme: String,
    pub fill: String,
    pub scale: String,
    pub exponent: f64,
    pub steps: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YAxis {
    pub axis_placement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggle {
    pub show: bool,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(HeatmapSettings::default(), &layers.defaults.heatmap)?;
    let field = layers.field(FieldSettings::default())?;

    let options = HeatmapOptions {
        calculate: settings.calculate,
        color: HeatmapColor {
            mode: settings.color_mode.wire_name().to_string(),
            scheme: settings.color_scheme,
            fill: settings.color_fill,
            scale: settings.color_scale.wire_name().to_string(),
            exponent: 0.5,
            steps: settings.color_steps,
        },
        cell_gap: settings.cell_gap,
        show_value: settings.show_value.wire_name().to_string(),
        y_axis: YAxis {
            axis_placement: settings.y_axis_placement.wire_name().to_string(),
            unit: settings.y_axis_unit,
        },
        legend: Toggle {
            show: settings.legend,
        },
        tooltip: Toggle {
            show: settings.tooltip,
        },
    };

    Ok(PanelKind::Heatmap(HeatmapPanel {
        options,
        field_config: field_config::build(&field, None),
    }))
}
