use super::Layers;
use crate::error::Error;
use crate::overlay::settings;
use crate::panel::PanelKind;
use crate::scope::hcl_enum;
use serde::{Deserialize, Serialize};

hcl_enum! {
    pub enum TextMode {
        Markdown = "markdown" => "markdown",
        Html = "html" => "html",
        Code = "code" => "code",
    }
}

settings! {
    pub struct TextSettings / TextOverrides {
        mode: TextMode = TextMode::Markdown,
        content: String = String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPanel {
    pub options: TextOptions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub mode: String,
    pub content: String,
}

pub fn build(layers: &Layers<'_, '_>) -> Result<PanelKind, Error> {
    let settings = layers.options(TextSettings::default(), &layers.defaults.text)?;

    Ok(PanelKind::Text(TextPanel {
        options: TextOptions {
            mode: settings.mode.wire_name().to_string(),
            content: settings.content,
        },
    }))
}

#[cfg(test)]
mod test {
    use crate::defaults::ProviderDefaults;
    use crate::panels::test::build_panel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn content_is_kept_verbatim() {
        let panel = build_panel(
            "text",
            r##"
            title = "Readme"
            options {
              content = "# Runbook\nSee the wiki."
            }
            "##,
            &ProviderDefaults::default(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&panel).unwrap(),
            json!({
                "type": "text",
                "title": "Readme",
                "gridPos": { "h": 8, "w": 12, "x": 0, "y": 0 },
                "options": { "mode": "markdown", "content": "# Runbook\nSee the wiki." }
            })
        );
    }
}
