use super::Layers;
use crate::error::Error;
use crate::overlay::settings;
use crate::panel::{Panel, PanelKind};
use serde::{Deserialize, Serialize};

settings! {
    pub struct RowSettings / RowOverrides {
        collapsed: bool = false,
    }
}

/// A collapsible section header; collapsed rows carry the panels they hide
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RowPanel {
    pub collapsed: bool,
    pub panels: Vec<Panel>,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(RowSettings::default(), &layers.defaults.row)?;

    Ok(PanelKind::Row(RowPanel {
        collapsed: settings.collapsed,
        panels: Vec::new(),
    }))
}

#[cfg(test)]
mod test {
    use crate::defaults::ProviderDefaults;
    use crate::panels::test::build_panel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collapsed_row() {
        let panel = build_panel(
            "row",
            r#"
            title = "Details"
            height = 1
            width = 24
            options {
              collapsed = true
            }
            "#,
            &ProviderDefaults::default(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&panel).unwrap(),
            json!({
                "type": "row",
                "title": "Details",
                "collapsed": true,
                "panels": [],
                "gridPos": { "h": 1, "w": 24, "x": 0, "y": 0 }
            })
        );
    }

    #[test]
    fn rows_default_to_full_width_headers() {
        let panel = build_panel("row", r#"title = "Details""#, &ProviderDefaults::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&panel).unwrap()["gridPos"],
            json!({ "h": 1, "w": 24, "x": 0, "y": 0 })
        );

        let panel = build_panel("text", r#"title = "Notes""#, &ProviderDefaults::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&panel).unwrap()["gridPos"],
            json!({ "h": 8, "w": 12, "x": 0, "y": 0 })
        );
    }
}
