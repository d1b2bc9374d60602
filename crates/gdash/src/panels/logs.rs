use super::Layers;
use crate::error::Error;
use crate::field_config::{self, FieldConfig, FieldSettings};
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum Deduplication {
        None = "none" => "none",
        Exact = "exact" => "exact",
        Numbers = "numbers" => "numbers",
        Signature = "signature" => "signature",
    }
}

hcl_enum! {
    pub enum SortOrder {
        NewestFirst = "newest_first" => "Descending",
        OldestFirst = "oldest_first" => "Ascending",
    }
}

settings! {
    pub struct LogsSettings / LogsOverrides {
        show_time: bool = false,
        show_labels: bool = false,
        show_common_labels: bool = false,
        wrap_lines: bool = false,
        prettify_json: bool = false,
        enable_details: bool = true,
        deduplication: Deduplication = Deduplication::None,
        order: SortOrder = SortOrder::NewestFirst,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogsPanel {
    pub options: LogsOptions,
    pub field_config: FieldConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogsOptions {
    pub show_time: bool,
    pub show_labels: bool,
    pub show_common_labels: bool,
    pub wrap_log_message: bool,
    pub prettify_log_message: bool,
    pub enable_log_details: bool,
    pub dedup_strategy: String,
    pub sort_order: String,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(LogsSettings::default(), &layers.defaults.logs)?;
    let field = layers.field(FieldSettings::default())?;

    let options = LogsOptions {
        show_time: settings.show_time,
        show_labels: settings.show_labels,
        show_common_labels: settings.show_common_labels,
        wrap_log_message: settings.wrap_lines,
        prettify_log_message: settings.prettify_json,
        enable_log_details: settings.enable_details,
        dedup_strategy: settings.deduplication.wire_name().to_string(),
        sort_order: settings.order.wire_name().to_string(),
    };

    Ok(PanelKind::Logs(LogsPanel {
        options,
        field_config: field_config::build(&field, None),
    }))
}
