use super::{Layers, Orientation, ReduceOptions, Reducer, TextSize};
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use serde::{Deserialize, Serialize};

settings! {
    pub struct GaugeSettings / GaugeOverrides {
        orientation: Orientation = Orientation::Auto,
        show_threshold_labels: bool = false,
        show_threshold_markers: bool = true,
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
pub struct GaugePanel {
    pub options: GaugeOptions,
    pub field_config: FieldConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaugeOptions {
    pub orientation: String,
    pub show_threshold_labels: bool,
    pub show_threshold_markers: bool,
    pub reduce_options: ReduceOptions,
    pub text: TextSize,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(GaugeSettings::default(), &layers.defaults.gauge)?;
    let field = layers.field(FieldSettings::default())?;

    let options = GaugeOptions {
        orientation: settings.orientation.wire_name().to_string(),
        show_threshold_labels: settings.show_threshold_labels,
        show_threshold_markers: settings.show_threshold_markers,
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
    };

    Ok(PanelKind::Gauge(GaugePanel {
        options,
        field_config: field_config::build(&field, None),
    }))
}
