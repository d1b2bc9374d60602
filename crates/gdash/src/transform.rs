//! transformation pipelines
//!
//! Every `transform` block of a panel holds exactly one step. Steps are rendered as
//! `{ "id": .., "options": { .. } }` in the order they are declared.
use crate::error::Error;
use crate::panels::Reducer;
use crate::scope::Scope;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub id: String,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    FilterByName {
        names: Vec<String>,
        pattern: Option<String>,
    },
    GroupBy {
        group: Vec<String>,
        aggregate: Vec<String>,
        calculations: Vec<Reducer>,
    },
    GroupingToMatrix {
        column_field: String,
        row_field: String,
        value_field: String,
        empty_value: Option<String>,
    },
    Limit {
        limit: u32,
    },
    SeriesToRows,
    SortBy {
        field: String,
        descending: bool,
    },
}

const STEPS: &[&str] = &[
    "filter_by_name",
    "group_by",
    "grouping_to_matrix",
    "limit",
    "series_to_rows",
    "sort_by",
];

impl Step {
    fn read(kind: &str, step: &Scope<'_>) -> Result<Self, Error> {
        let read = match kind {
            "filter_by_name" => {
                step.deny_unknown(&["names", "pattern"])?;
                Step::FilterByName {
                    names: step.optional("names")?.unwrap_or_default(),
                    pattern: step.optional("pattern")?,
                }
            }
            "group_by" => {
                step.deny_unknown(&["group", "aggregate", "calculations"])?;
                Step::GroupBy {
                    group: step.optional("group")?.unwrap_or_default(),
                    aggregate: step.optional("aggregate")?.unwrap_or_default(),
                    calculations: step.optional("calculations")?.unwrap_or_default(),
                }
            }
            "grouping_to_matrix" => {
                step.deny_unknown(&["column_field", "row_field", "value_field", "empty_value"])?;
                Step::GroupingToMatrix {
                    column_field: step.required("column_field")?,
                    row_field: step.required("row_field")?,
                    value_field: step.required("value_field")?,
                    empty_value: step.optional("empty_value")?,
                }
            }
            "limit" => {
                step.deny_unknown(&["limit"])?;
                Step::Limit {
                    limit: step.required("limit")?,
                }
            }
            "series_to_rows" => {
                step.deny_unknown(&[])?;
                Step::SeriesToRows
            }
            _ => {
                step.deny_unknown(&["field", "descending"])?;
                Step::SortBy {
                    field: step.required("field")?,
                    descending: step.optional("descending")?.unwrap_or(false),
                }
            }
        };

        Ok(read)
    }

    /// Grafana transformation id and options
    pub fn to_transformation(&self) -> Transformation {
        let (id, options) = match self {
            Step::FilterByName { names, pattern } => {
                let mut include = json!({ "names": names });
                if let Some(pattern) = pattern {
                    include["pattern"] = json!(pattern);
                }
                ("filterFieldsByName", json!({ "include": include }))
            }
            Step::GroupBy {
                group,
                aggregate,
                calculations,
            } => {
                let calculations: Vec<&str> =
                    calculations.iter().map(|calc| calc.wire_name()).collect();

                let mut fields = Map::new();
                for name in group {
                    fields.insert(
                        name.clone(),
                        json!({ "aggregations": [], "operation": "groupby" }),
                    );
                }
                for name in aggregate {
                    fields.insert(
                        name.clone(),
                        json!({ "aggregations": calculations, "operation": "aggregate" }),
                    );
                }
                ("groupBy", json!({ "fields": fields }))
            }
            Step::GroupingToMatrix {
                column_field,
                row_field,
                value_field,
                empty_value,
            } => {
                let mut options = json!({
                    "columnField": column_field,
                    "rowField": row_field,
                    "valueField": value_field,
                });
                if let Some(empty_value) = empty_value {
                    options["emptyValue"] = json!(empty_value);
                }
                ("groupingToMatrix", options)
            }
            Step::Limit { limit } => ("limit", json!({ "limitField": limit })),
            Step::SeriesToRows => ("seriesToRows", json!({})),
            Step::SortBy { field, descending } => (
                "sortBy",
                json!({ "fields": {}, "sort": [{ "field": field, "desc": descending }] }),
            ),
        };

        Transformation {
            id: id.to_string(),
            options: match options {
                Value::Object(options) => options,
                _ => Map::new(),
            },
            extra: BTreeMap::new(),
        }
    }
}

/// Read every `transform` block of a panel, in declaration order
pub fn read_transformations(panel: &Scope<'_>) -> Result<Vec<Transformation>, Error> {
    panel
        .blocks("transform")
        .map(|block| -> Result<Transformation, Error> {
            let (kind, step) = block.one_of(STEPS)?;
            Step::read(kind, &step).map(|step| step.to_transformation())
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transformations(source: &str) -> Result<Vec<Transformation>, Error> {
        let body = hcl::parse(source).expect("body must parse");
        let context = hcl::eval::Context::new();
        read_transformations(&Scope::new("panel", &body, &context))
    }

    #[test]
    fn pipeline_keeps_declaration_order() {
        let read = transformations(
            r#"
            transform {
              filter_by_name {
                names = ["host", "value"]
              }
            }
            transform {
              sort_by {
                field = "value"
                descending = true
              }
            }
            transform {
              limit {
                limit = 5
              }
            }
            transform {
              series_to_rows {}
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&read).unwrap(),
            json!([
                { "id": "filterFieldsByName", "options": { "include": { "names": ["host", "value"] } } },
                { "id": "sortBy", "options": { "fields": {}, "sort": [{ "field": "value", "desc": true }] } },
                { "id": "limit", "options": { "limitField": 5 } },
                { "id": "seriesToRows", "options": {} }
            ])
        );
    }

    #[test]
    fn group_by_aggregates_with_calculations() {
        let read = transformations(
            r#"
            transform {
              group_by {
                group = ["host"]
                aggregate = ["latency"]
                calculations = ["mean", "max"]
              }
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&read).unwrap(),
            json!([{
                "id": "groupBy",
                "options": {
                    "fields": {
                        "host": { "aggregations": [], "operation": "groupby" },
                        "latency": { "aggregations": ["mean", "max"], "operation": "aggregate" }
                    }
                }
            }])
        );
    }

    #[test]
    fn grouping_to_matrix() {
        let read = transformations(
            r#"
            transform {
              grouping_to_matrix {
                column_field = "time"
                row_field = "host"
                value_field = "value"
              }
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&read).unwrap(),
            json!([{
                "id": "groupingToMatrix",
                "options": { "columnField": "time", "rowField": "host", "valueField": "value" }
            }])
        );
    }

    #[test]
    fn one_step_per_block() {
        let err = transformations(
            r#"
            transform {
              limit {
                limit = 1
              }
              series_to_rows {}
            }
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("panel.transform[0]: only one of"));
    }
}
