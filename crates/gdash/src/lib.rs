//! # gdash - Grafana dashboards from HCL
//!
//! Panels and dashboards are declared in HCL and rendered to the json model of the Grafana
//! dashboard API. Output is deterministic: object keys are sorted and every document comes
//! with a CRC32 identity ([output::Rendered]).
//!
//! ## Introduction for developers
//!
//! ### Input
//!
//! A workspace consists of one or more HCL documents ([documents::HclDocuments]). Three kinds
//! of top level blocks are understood:
//!
//! ```hcl
//! defaults {
//!   panel { height = 6 }
//!   stat  { graph_mode = "none" }
//! }
//!
//! panel "stat" "requests" {
//!   title = "Requests"
//!   target {
//!     prometheus {
//!       uid  = "prom"
//!       expr = "sum(rate(http_requests_total[5m]))"
//!     }
//!   }
//! }
//!
//! dashboard "overview" {
//!   row {
//!     panels = [panel.stat.requests.json]
//!   }
//! }
//! ```
//!
//! [workspace::Workspace] checks the block structure (labels, collisions, unknown blocks) and
//! indexes every block by its [workspace::Address].
//!
//! ### Layered settings
//!
//! Every setting of a panel is resolved from three layers, see [overlay]:
//!
//! | **layer**           | **example**                              |
//! |---------------------|------------------------------------------|
//! | built-in default    | `orientation = "auto"`                   |
//! | provider `defaults` | `defaults { bar_gauge { .. } }`          |
//! | the panel itself    | `panel "bar_gauge" "x" { options { .. } }` |
//!
//! A later layer only wins for the attributes it actually sets; `null` counts as not set.
//!
//! ### Panels
//!
//! [panel::Panel] is the envelope shared by all kinds plus a kind specific payload
//! ([panel::PanelKind]). Kinds without a model are kept as an open payload so hand written
//! panel json of any type passes through dashboards unchanged.
//!
//! ### Dashboards
//!
//! Dashboard expressions are evaluated with every rendered panel in scope as
//! `panel.<kind>.<name>.json` and `panel.<kind>.<name>.id`. Rows of panel json are decoded,
//! positioned ([layout]) and numbered.
//!
pub mod dashboard;
pub mod defaults;
pub mod documents;
pub mod error;
pub mod field_config;
pub mod layout;
pub mod output;
pub mod overlay;
pub mod panel;
pub mod panels;
pub mod scope;
pub mod target;
pub mod transform;
pub mod workspace;
