use super::{Layers, Orientation, ReduceOptions, Reducer, TextSize};
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    /// What the threshold color is applied to
    pub enum StatColorMode {
        Value = "value" => "value",
        Background = "background" => "background",
        None = "none" => "none",
    }
}

hcl_enum! {
    pub enum GraphMode {
        None = "none" => "none",
        Area = "area" => "area",
    }
}

hcl_enum! {
    pub enum JustifyMode {
        Auto = "auto" => "auto",
        Center = "center" => "center",
    }
}

hcl_enum! {
    pub enum TextMode {
        Auto = "auto" => "auto",
        Value = "value" => "value",
        ValueAndName = "value_and_name" => "value_and_name",
        Name = "name" => "name",
        None = "none" => "none",
    }
}

settings! {
    pub struct StatSettings / StatOverrides {
        orientation: Orientation = Orientation::Auto,
        color_mode: StatColorMode = StatColorMode::Value,
        graph_mode: GraphMode = GraphMode::Area,
        justify_mode: JustifyMode = JustifyMode::Auto,
        text_mode: TextMode = TextMode::Auto,
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
pub struct StatPanel {
    pub options: StatOptions,
    pub field_config: FieldConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatOptions {
    pub orientation: String,
    pub color_mode: String,
    pub graph_mode: String,
    pub justify_mode: String,
    pub text_mode: String,
    pub reduce_options: ReduceOptions,
    pub text: TextSize,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(StatSettings::default(), &layers.defaults.stat)?;
    let field = layers.field(FieldSettings::default())?;

    let options = StatOptions {
        orientation: settings.orientation.wire_name().to_string(),
        color_mode: settings.color_mode.wire_name().to_string(),
        graph_mode: settings.graph_mode.wire_name().to_string(),
        justify_mode: settings.justify_mode.wire_name().to_string(),
        text_mode: settings.text_mode.wire_name().to_string(),
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

    Ok(PanelKind::Stat(StatPanel {
        options,
        field_config: field_config::build(&field, None),
    }))
}

#[cfg(test)]
mod test {
    use crate::defaults::ProviderDefaults;
    use crate::panels::test::build_panel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn options_and_mappings() {
        let panel = build_panel(
            "stat",
            r#"
            options {
              color_mode = "background"
              graph_mode = "none"
              text_mode = "value_and_name"
            }
            field {
              no_value = "down"
              mappings {
                value {
                  value = "1"
                  text = "UP"
                  color = "green"
                }
                special {
                  match = "null"
                  text = "N/A"
                }
              }
            }
            "#,
            &ProviderDefaults::default(),
        )
        .unwrap();

        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(
            value["options"],
            json!({
                "orientation": "auto",
                "colorMode": "background",
                "graphMode": "none",
                "justifyMode": "auto",
                "textMode": "value_and_name",
                "reduceOptions": { "values": false, "calcs": ["lastNotNull"], "fields": "" },
                "text": {}
            })
        );
        assert_eq!(value["fieldConfig"]["defaults"]["noValue"], json!("down"));
        assert_eq!(
            value["fieldConfig"]["defaults"]["mappings"],
            json!([
                { "type": "value", "options": { "1": { "text": "UP", "color": "green", "index": 0 } } },
                { "type": "special", "options": { "match": "null", "result": { "text": "N/A", "index": 1 } } }
            ])
        );
    }
}
