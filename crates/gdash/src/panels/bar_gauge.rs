use super::{Layers, Orientation, ReduceOptions, Reducer, TextSize};
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum DisplayMode {
        Gradient = "gradient" => "gradient",
        Lcd = "lcd" => "lcd",
        Basic = "basic" => "basic",
    }
}

settings! {
    pub struct BarGaugeSettings / BarGaugeOverrides {
        orientation: Orientation = Orientation::Auto,
        display_mode: DisplayMode = DisplayMode::Gradient,
        show_unfilled: bool = true,
        min_viz_width: u32 = 0,
        min_viz_height: u32 = 10,
        calculation: Reducer = Reducer::LastNotNull,
        fields: String = String::new(),
        all_values: bool = false,
        limit: Option<u32> = None,
        title_size: Option<u32> = None,
        value_size: Option<u32> = None,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarGaugePanel {
    pub options: BarGaugeOptions,
    pub field_config: FieldConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarGaugeOptions {
    pub orientation: String,
    pub display_mode: String,
    pub show_unfilled: bool,
    pub min_viz_width: u32,
    pub min_viz_height: u32,
    pub reduce_options: ReduceOptions,
    pub text: TextSize,
}

impl From<&BarGaugeSettings> for BarGaugeOptions {
    fn from(settings: &BarGaugeSettings) -> Self {
        Self {
            orientation: settings.orientation.wire_name().to_string(),
            display_mode: settings.display_mode.wire_name().to_string(),
            show_unfilled: settings.show_unfilled,
            min_viz_width: settings.min_viz_width,
            min_viz_height: settings.min_viz_height,
            reduce_options: ReduceOptions::new(
                settings.calculation,
                &settings.fields,
                settings.all_values,
                settings.limit,
            ),
            text: TextSize {
                title_size: settings.title_size,
                value_size: settings.value_size,
            },
        }
    }
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(BarGaugeSettings::default(), &layers.defaults.bar_gauge)?;
    let field = layers.field(FieldSettings::default())?;

    Ok(PanelKind::BarGauge(BarGaugePanel {
        options: BarGaugeOptions::from(&settings),
        field_config: field_config::build(&field, None),
    }))
}
