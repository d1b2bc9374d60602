//! addressable panels and dashboards of a set of [HclDocuments]
//!
//! [Workspace] checks the top level structure of the documents and indexes every block by its
//! [Address]. [Provider] reads the `defaults` block once and renders addresses on demand.
use crate::dashboard::{self, Dashboard};
use crate::defaults::ProviderDefaults;
use crate::documents::HclDocuments;
use crate::error::Error;
use crate::output::{Format, Rendered};
use crate::panel::{self, Panel};
use crate::panels::{self, KINDS};
use crate::scope::Scope;
use hcl::eval::Context;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Name of a renderable block, `panel.<kind>.<name>` or `dashboard.<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Panel { kind: String, name: String },
    Dashboard { name: String },
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Panel { kind, name } => write!(f, "panel.{kind}.{name}"),
            Address::Dashboard { name } => write!(f, "dashboard.{name}"),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            ["panel", kind, name] if !kind.is_empty() && !name.is_empty() => Ok(Address::Panel {
                kind: kind.to_string(),
                name: name.to_string(),
            }),
            ["dashboard", name] if !name.is_empty() => Ok(Address::Dashboard {
                name: name.to_string(),
            }),
            _ => Err(Error::UnknownAddress(s.to_string())),
        }
    }
}

/// Structurally valid documents with their blocks indexed by address
#[derive(Debug)]
pub struct Workspace {
    documents: HclDocuments,
    /// index of the `defaults` block
    defaults: Option<usize>,
    /// (kind, name) to block index, in declaration order
    panels: IndexMap<(String, String), usize>,
    /// name to block index, in declaration order
    dashboards: IndexMap<String, usize>,
}

impl Workspace {
    pub fn new(documents: HclDocuments) -> Result<Self, ParseErrors> {
        let mut e = ParseErrors::new();
        let mut defaults = None;
        let mut panels = IndexMap::new();
        let mut dashboards = IndexMap::new();

        for location in documents.stray_attributes() {
            e.log(Issue::RootAttribute(location));
        }

        for (index, block) in documents.blocks() {
            let labels: Vec<&str> = block.labels.iter().map(|label| label.as_str()).collect();

            match (block.identifier.as_str(), labels.as_slice()) {
                ("defaults", []) => {
                    if let Some(existing) = defaults {
                        e.log(Issue::DuplicateDefaults {
                            existing: documents.describe_block(existing),
                            new: documents.describe_block(index),
                        });
                        continue;
                    }
                    defaults = Some(index);
                }
                ("defaults", _) => e.log(Issue::DefaultsLabeled(documents.describe_block(index))),
                ("panel", [kind, name]) => {
                    if !KINDS.contains(kind) {
                        e.log(Issue::UnknownPanelKind(documents.describe_block(index)));
                        continue;
                    }

                    let key = (kind.to_string(), name.to_string());
                    if let Some(existing) = panels.get(&key) {
                        e.log(Issue::PanelCollision {
                            existing: documents.describe_block(*existing),
                            new: documents.describe_block(index),
                        });
                        continue;
                    }
                    panels.insert(key, index);
                }
                ("panel", _) => e.log(Issue::PanelLabels(documents.describe_block(index))),
                ("dashboard", [name]) => {
                    if let Some(existing) = dashboards.get(*name) {
                        e.log(Issue::DashboardCollision {
                            existing: documents.describe_block(*existing),
                            new: documents.describe_block(index),
                        });
                        continue;
                    }
                    dashboards.insert(name.to_string(), index);
                }
                ("dashboard", _) => e.log(Issue::DashboardLabels(documents.describe_block(index))),
                _ => e.log(Issue::UnknownBlockType(documents.describe_block(index))),
            }
        }

        if !e.issues.is_empty() {
            return Err(e);
        }

        tracing::debug!(
            panels = panels.len(),
            dashboards = dashboards.len(),
            defaults = defaults.is_some(),
            "workspace indexed"
        );

        Ok(Self {
            documents,
            defaults,
            panels,
            dashboards,
        })
    }

    pub fn documents(&self) -> &HclDocuments {
        &self.documents
    }

    /// Every panel, then every dashboard, in declaration order
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        let panels = self.panels.keys().map(|(kind, name)| Address::Panel {
            kind: kind.clone(),
            name: name.clone(),
        });
        let dashboards = self
            .dashboards
            .keys()
            .map(|name| Address::Dashboard { name: name.clone() });

        panels.chain(dashboards)
    }

    fn body(&self, index: usize) -> &hcl::Body {
        &self.documents.block(index).body
    }
}

#[derive(derive_new::new, Debug)]
pub struct ParseErrors {
    #[new(default)]
    issues: Vec<Issue>,
}

impl ParseErrors {
    pub fn log(&mut self, issue: Issue) {
        tracing::trace!(?issue, "issue found");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl std::error::Error for ParseErrors {}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut issues = self.issues.iter();
        if let Some(first) = issues.next() {
            write!(f, "{first}")?;
        }
        for issue in issues {
            write!(f, "\n{issue}")?;
        }
        Ok(())
    }
}

/// Structural problem of the top level blocks, located by block (and source file)
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Issue {
    #[error("{0}: attributes are not supported at the top level")]
    RootAttribute(String),
    #[error("{0}: unknown block type, expected defaults, panel or dashboard")]
    UnknownBlockType(String),
    #[error("{0}: defaults block takes no labels")]
    DefaultsLabeled(String),
    #[error("{new}: defaults already declared at {existing}")]
    DuplicateDefaults { existing: String, new: String },
    #[error("{0}: panel block requires a kind and a name label")]
    PanelLabels(String),
    #[error("{0}: unknown panel kind")]
    UnknownPanelKind(String),
    #[error("{new}: panel already declared at {existing}")]
    PanelCollision { existing: String, new: String },
    #[error("{0}: dashboard block requires a name label")]
    DashboardLabels(String),
    #[error("{new}: dashboard already declared at {existing}")]
    DashboardCollision { existing: String, new: String },
}

/// Renders the addresses of a [Workspace]
///
/// Rendering is a function of the block and the provider defaults only, nothing is cached.
#[derive(Debug)]
pub struct Provider<'w> {
    workspace: &'w Workspace,
    defaults: ProviderDefaults,
}

impl<'w> Provider<'w> {
    /// Read the provider defaults of the workspace
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn configure(workspace: &'w Workspace) -> Result<Self, Error> {
        let context = Context::new();
        let defaults = match workspace.defaults {
            Some(index) => ProviderDefaults::read(Some(Scope::new(
                "defaults",
                workspace.body(index),
                &context,
            )))?,
            None => ProviderDefaults::default(),
        };

        Ok(Self {
            workspace,
            defaults,
        })
    }

    pub fn defaults(&self) -> &ProviderDefaults {
        &self.defaults
    }

    pub fn workspace(&self) -> &'w Workspace {
        self.workspace
    }

    pub fn panel(&self, kind: &str, name: &str) -> Result<Panel, Error> {
        let address = Address::Panel {
            kind: kind.to_string(),
            name: name.to_string(),
        };
        let Some(index) = self
            .workspace
            .panels
            .get(&(kind.to_string(), name.to_string()))
        else {
            return Err(Error::UnknownAddress(address.to_string()));
        };

        let context = Context::new();
        let scope = Scope::new(address.to_string(), self.workspace.body(*index), &context);
        panels::build(kind, &scope, &self.defaults)
    }

    pub fn dashboard(&self, name: &str) -> Result<Dashboard, Error> {
        let address = Address::Dashboard {
            name: name.to_string(),
        };
        let Some(index) = self.workspace.dashboards.get(name) else {
            return Err(Error::UnknownAddress(address.to_string()));
        };

        let mut context = Context::new();
        context.declare_var(hcl::Identifier::unchecked("panel"), self.panel_variable());

        let scope = Scope::new(address.to_string(), self.workspace.body(*index), &context);
        dashboard::build(name, &scope, &self.defaults)
    }

    /// Render the block at `address` as json
    #[tracing::instrument(level = "debug", skip(self), fields(address = %address))]
    pub fn render(&self, address: &Address, format: Format) -> Result<Rendered, Error> {
        let bytes = match address {
            Address::Panel { kind, name } => panel::encode(&self.panel(kind, name)?, format)?,
            Address::Dashboard { name } => {
                let dashboard = self.dashboard(name)?;
                format
                    .to_vec(&dashboard)
                    .map_err(|source| Error::EncodeDashboard {
                        title: dashboard.title.clone(),
                        source,
                    })?
            }
        };

        let rendered = Rendered::new(bytes);
        tracing::debug!(id = %rendered.id, "rendered");
        Ok(rendered)
    }

    /// `panel.<kind>.<name>.json` (compact) and `panel.<kind>.<name>.id` of every panel
    ///
    /// Panels that fail to render are left out, a dashboard referencing one fails to evaluate.
    fn panel_variable(&self) -> hcl::Value {
        let mut kinds: hcl::value::Map<String, hcl::Value> = hcl::value::Map::new();

        for (kind, name) in self.workspace.panels.keys() {
            let address = Address::Panel {
                kind: kind.clone(),
                name: name.clone(),
            };
            let rendered = match self.render(&address, Format::Compact) {
                Ok(rendered) => rendered,
                Err(err) => {
                    tracing::warn!(%address, error = %err, "panel unavailable to dashboards");
                    continue;
                }
            };

            let exported: hcl::value::Map<String, hcl::Value> = [
                ("json".to_string(), hcl::Value::String(rendered.json)),
                ("id".to_string(), hcl::Value::String(rendered.id)),
            ]
            .into_iter()
            .collect();

            let names = kinds
                .entry(kind.clone())
                .or_insert_with(|| hcl::Value::Object(hcl::value::Map::new()));
            if let hcl::Value::Object(names) = names {
                names.insert(name.clone(), hcl::Value::Object(exported));
            }
        }

        hcl::Value::Object(kinds)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hcl_documents;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn addresses_parse_and_display() {
        for raw in ["panel.stat.requests", "dashboard.overview"] {
            let address: Address = raw.parse().unwrap();
            assert_eq!(address.to_string(), raw);
        }

        for raw in ["panel.stat", "dashboard", "defaults", "dashboard.a.b", "panel..x"] {
            assert!(
                matches!(raw.parse::<Address>(), Err(Error::UnknownAddress(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn structural_issues_are_collected() {
        let documents = hcl_documents! {
            "a.hcl" => r#"
            version = 1
            defaults {}
            panel "stat" {}
            panel "pie" "share" {}
            "#,
            "b.hcl" => r#"
            defaults {}
            dashboard "home" {}
            dashboard "home" {}
            output "x" {}
            "#
        };

        let err = Workspace::new(documents).unwrap_err();
        assert_eq!(
            err.issues(),
            &[
                Issue::RootAttribute("version (a.hcl)".to_string()),
                Issue::PanelLabels("panel.stat (a.hcl)".to_string()),
                Issue::UnknownPanelKind("panel.pie.share (a.hcl)".to_string()),
                Issue::DuplicateDefaults {
                    existing: "defaults (a.hcl)".to_string(),
                    new: "defaults (b.hcl)".to_string(),
                },
                Issue::DashboardCollision {
                    existing: "dashboard.home (b.hcl)".to_string(),
                    new: "dashboard.home (b.hcl)".to_string(),
                },
                Issue::UnknownBlockType("output.x (b.hcl)".to_string()),
            ]
        );
        assert_eq!(
            err.to_string().lines().next(),
            Some("version (a.hcl): attributes are not supported at the top level")
        );
    }

    #[test]
    fn addresses_in_declaration_order() {
        let workspace = Workspace::new(hcl_documents! {r#"
        dashboard "home" {}
        panel "text" "b" {}
        panel "stat" "a" {}
        "#})
        .unwrap();

        let addresses: Vec<String> = workspace.addresses().map(|a| a.to_string()).collect();
        assert_eq!(
            addresses,
            vec!["panel.text.b", "panel.stat.a", "dashboard.home"]
        );
    }

    #[test]
    fn dashboards_reference_rendered_panels() {
        let workspace = Workspace::new(hcl_documents! {r#"
        defaults {
          panel {
            width = 24
            height = 4
          }
        }

        panel "text" "readme" {
          title = "Readme"
        }

        dashboard "home" {
          title = "Home ${panel.text.readme.id}"
          row {
            panels = [panel.text.readme.json, panel.text.readme.json]
          }
        }
        "#})
        .unwrap();
        let provider = Provider::configure(&workspace).unwrap();

        let panel = provider
            .render(&"panel.text.readme".parse().unwrap(), Format::Compact)
            .unwrap();
        let dashboard = provider.dashboard("home").unwrap();

        assert_eq!(dashboard.title, format!("Home {}", panel.id));
        let panels = serde_json::to_value(&dashboard.panels).unwrap();
        assert_eq!(
            panels,
            json!([
                {
                    "id": 1,
                    "type": "text",
                    "title": "Readme",
                    "gridPos": { "h": 4, "w": 24, "x": 0, "y": 0 },
                    "options": { "mode": "markdown", "content": "" }
                },
                {
                    "id": 2,
                    "type": "text",
                    "title": "Readme",
                    "gridPos": { "h": 4, "w": 24, "x": 24, "y": 0 },
                    "options": { "mode": "markdown", "content": "" }
                }
            ])
        );
    }

    #[test]
    fn unknown_addresses() {
        let workspace = Workspace::new(hcl_documents! {r#"panel "text" "readme" {}"#}).unwrap();
        let provider = Provider::configure(&workspace).unwrap();

        let err = provider.panel("stat", "readme").unwrap_err();
        assert_eq!(err.to_string(), "nothing to render at panel.stat.readme");

        let err = provider.dashboard("home").unwrap_err();
        assert_eq!(err.to_string(), "nothing to render at dashboard.home");
    }

    #[test]
    fn broken_panels_only_fail_their_dependents() {
        let workspace = Workspace::new(hcl_documents! {r#"
        panel "stat" "broken" {
          width = "wide"
        }

        panel "text" "fine" {}

        dashboard "ok" {
          row {
            panels = [panel.text.fine.json]
          }
        }

        dashboard "uses_broken" {
          row {
            panels = [panel.stat.broken.json]
          }
        }
        "#})
        .unwrap();
        let provider = Provider::configure(&workspace).unwrap();

        let err = provider.panel("stat", "broken").unwrap_err();
        assert_eq!(
            err.to_string(),
            "panel.stat.broken.width: expected non-negative whole number, found string"
        );

        assert_eq!(provider.dashboard("ok").unwrap().panels.len(), 1);
        let err = provider.dashboard("uses_broken").unwrap_err();
        assert!(matches!(err, Error::Evaluate { ref path, .. } if path == "dashboard.uses_broken.row[0].panels"));
    }

    #[test]
    fn invalid_defaults_fail_configuration() {
        let workspace = Workspace::new(hcl_documents! {r#"
        defaults {
          panel {
            width = "wide"
          }
        }
        "#})
        .unwrap();

        let err = Provider::configure(&workspace).unwrap_err();
        assert_eq!(
            err.to_string(),
            "defaults.panel[0].width: expected non-negative whole number, found string"
        );
    }
}
