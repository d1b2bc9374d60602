use super::{Layers, Reducer};
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum CellHeight {
        Small = "small" => "sm",
        Medium = "medium" => "md",
        Large = "large" => "lg",
    }
}

hcl_enum! {
    pub enum Align {
        Auto = "auto" => "auto",
        Left = "left" => "left",
        Center = "center" => "center",
        Right = "right" => "right",
    }
}

hcl_enum! {
    /// How cell values are drawn
    pub enum CellType {
        Auto = "auto" => "auto",
        ColorText = "color_text" => "color-text",
        ColorBackground = "color_background" => "color-background",
        Gauge = "gauge" => "gauge",
        Json = "json" => "json-view",
    }
}

settings! {
    pub struct TableSettings / TableOverrides {
        show_header: bool = true,
        cell_height: CellHeight = CellHeight::Small,
        show_footer: bool = false,
        footer_calculation: Reducer = Reducer::Sum,
        footer_fields: String = String::new(),
        sort_by: Option<String> = None,
        sort_descending: bool = false,
        align: Align = Align::Auto,
        cell_type: CellType = CellType::Auto,
        filterable: bool = false,
        inspect: bool = false,
        column_width: Option<u32> = None,
        min_column_width: Option<u32> = None,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TablePanel {
    pub options: TableOptions,
    pub field_config: FieldConfig<TableFieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    pub show_header: bool,
    pub cell_height: String,
    pub footer: TableFooter,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<SortBy>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableFooter {
    pub show: bool,
    pub reducer: Vec<String>,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortBy {
    pub display_name: String,
    pub desc: bool,
}

/// `fieldConfig.defaults.custom` of table panels
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableFieldConfig {
    pub align: String,
    pub cell_options: CellOptions,
    pub filterable: bool,
    pub inspect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CellOptions {
    #[serde(rename = "type")]
    pub kind: String,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(TableSettings::default(), &layers.defaults.table)?;
    let field = layers.field(FieldSettings::default())?;

    let options = TableOptions {
        show_header: settings.show_header,
        cell_height: settings.cell_height.wire_name().to_string(),
        footer: TableFooter {
            show: settings.show_footer,
            reducer: vec![settings.footer_calculation.wire_name().to_string()],
            fields: settings.footer_fields.clone(),
        },
        sort_by: settings
            .sort_by
            .iter()
            .map(|column| SortBy {
                display_name: column.clone(),
                desc: settings.sort_descending,
            })
            .collect(),
    };

    let custom = TableFieldConfig {
        align: settings.align.wire_name().to_string(),
        cell_options: CellOptions {
            kind: settings.cell_type.wire_name().to_string(),
        },
        filterable: settings.filterable,
        inspect: settings.inspect,
        width: settings.column_width,
        min_width: settings.min_column_width,
    };

    Ok(PanelKind::Table(TablePanel {
        options,
        field_config: field_config::build(&field, Some(custom)),
    }))
}

#[cfg(test)]
mod test {
    use crate::defaults::ProviderDefaults;
    use crate::panels::test::build_panel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn sorting_and_cells() {
        let panel = build_panel(
            "table",
            r#"
            options {
              sort_by = "value"
              sort_descending = true
              cell_type = "color_background"
              column_width = 120
            }
            transform {
              series_to_rows {}
            }
            "#,
            &ProviderDefaults::default(),
        )
        .unwrap();

        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(value["type"], json!("table"));
        assert_eq!(
            value["options"],
            json!({
                "showHeader": true,
                "cellHeight": "sm",
                "footer": { "show": false, "reducer": ["sum"], "fields": "" },
                "sortBy": [{ "displayName": "value", "desc": true }]
            })
        );
        assert_eq!(
            value["fieldConfig"]["defaults"]["custom"],
            json!({
                "align": "auto",
                "cellOptions": { "type": "color-background" },
                "filterable": false,
                "inspect": false,
                "width": 120
            })
        );
        assert_eq!(value["transformations"], json!([{ "id": "seriesToRows", "options": {} }]));
    }
}
