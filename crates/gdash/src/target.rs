//! queries (`targets`) and datasource references
use crate::error::Error;
use crate::scope::Scope;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const PROMETHEUS: &str = "prometheus";
pub const CLOUDWATCH: &str = "cloudwatch";
pub const LOKI: &str = "loki";

/// Datasource of panels whose targets query different datasources
pub const MIXED_UID: &str = "-- Mixed --";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DatasourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl DatasourceRef {
    pub fn new(uid: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            kind: Some(kind.into()),
        }
    }

    pub fn mixed() -> Self {
        Self::new(MIXED_UID, "datasource")
    }
}

/// A panel's `datasource`; dashboards from older Grafana versions reference datasources by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datasource {
    Ref(DatasourceRef),
    Named(String),
}

/// One query of a panel
///
/// Decoding dispatches on `datasource.type`; queries for datasources that are not modeled are
/// kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Target {
    Prometheus(PrometheusTarget),
    CloudWatch(CloudWatchTarget),
    Loki(LokiTarget),
    Other(BTreeMap<String, serde_json::Value>),
}

impl Target {
    pub fn datasource(&self) -> Option<DatasourceRef> {
        match self {
            Target::Prometheus(target) => Some(target.datasource.clone()),
            Target::CloudWatch(target) => Some(target.datasource.clone()),
            Target::Loki(target) => Some(target.datasource.clone()),
            Target::Other(fields) => fields
                .get("datasource")
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
        }
    }

    pub fn ref_id(&self) -> Option<&str> {
        match self {
            Target::Prometheus(target) => Some(&target.ref_id),
            Target::CloudWatch(target) => Some(&target.ref_id),
            Target::Loki(target) => Some(&target.ref_id),
            Target::Other(fields) => fields.get("refId").and_then(|value| value.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;

        let fields = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let kind = fields
            .get("datasource")
            .and_then(|datasource| datasource.get("type"))
            .and_then(|kind| kind.as_str());

        let typed = |fields: BTreeMap<String, serde_json::Value>| {
            serde_json::Value::Object(fields.into_iter().collect())
        };

        let target = match kind {
            Some(PROMETHEUS) => serde_json::from_value(typed(fields)).map(Target::Prometheus),
            Some(CLOUDWATCH) => serde_json::from_value(typed(fields)).map(Target::CloudWatch),
            Some(LOKI) => serde_json::from_value(typed(fields)).map(Target::Loki),
            _ => Ok(Target::Other(fields)),
        };

        target.map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusTarget {
    pub ref_id: String,
    pub datasource: DatasourceRef,
    pub expr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub instant: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudWatchTarget {
    pub ref_id: String,
    pub datasource: DatasourceRef,
    pub namespace: String,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub match_exact: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LokiTarget {
    pub ref_id: String,
    pub datasource: DatasourceRef,
    pub expr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// `A`, `B`, .., `Z`, `AA`, `AB`, ..
pub fn ref_id(index: usize) -> String {
    let letter = |n: usize| char::from(b'A' + (n % 26) as u8);
    if index < 26 {
        letter(index).to_string()
    } else {
        format!("{}{}", ref_id(index / 26 - 1), letter(index))
    }
}

/// Read every `target` block of a panel
///
/// Each block holds exactly one datasource specific block, e.g. `target { prometheus { .. } }`.
pub fn read_targets(panel: &Scope<'_>) -> Result<Vec<Target>, Error> {
    panel
        .blocks("target")
        .enumerate()
        .map(|(index, block)| -> Result<Target, Error> {
            let (kind, query) = block.one_of(&[PROMETHEUS, CLOUDWATCH, LOKI])?;
            read_target(kind, &query, index)
        })
        .collect()
}

fn read_target(kind: &str, query: &Scope<'_>, index: usize) -> Result<Target, Error> {
    let ref_id = query.optional("ref_id")?.unwrap_or_else(|| ref_id(index));
    let datasource = DatasourceRef::new(query.required::<String>("uid")?, kind);
    let hide = query.optional("hidden")?.unwrap_or(false);

    let target = match kind {
        PROMETHEUS => {
            query.deny_unknown(&[
                "uid", "ref_id", "hidden", "expr", "legend", "interval", "format", "instant",
            ])?;
            Target::Prometheus(PrometheusTarget {
                ref_id,
                datasource,
                expr: query.required("expr")?,
                legend_format: query.optional("legend")?,
                interval: query.optional("interval")?,
                format: query.optional("format")?,
                instant: query.optional("instant")?.unwrap_or(false),
                hide,
                extra: BTreeMap::new(),
            })
        }
        CLOUDWATCH => {
            query.deny_unknown(&[
                "uid", "ref_id", "hidden", "namespace", "metric", "dimensions", "statistic",
                "period", "region", "alias", "match_exact",
            ])?;
            let dimensions: BTreeMap<String, String> =
                query.optional("dimensions")?.unwrap_or_default();
            Target::CloudWatch(CloudWatchTarget {
                ref_id,
                datasource,
                namespace: query.required("namespace")?,
                metric_name: query.required("metric")?,
                dimensions: dimensions
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect(),
                statistic: query.optional("statistic")?,
                period: query.optional("period")?,
                region: query.optional("region")?,
                alias: query.optional("alias")?,
                match_exact: query.optional("match_exact")?.unwrap_or(true),
                hide,
                extra: BTreeMap::new(),
            })
        }
        _ => {
            query.deny_unknown(&["uid", "ref_id", "hidden", "expr", "legend", "max_lines"])?;
            Target::Loki(LokiTarget {
                ref_id,
                datasource,
                expr: query.required("expr")?,
                legend_format: query.optional("legend")?,
                max_lines: query.optional("max_lines")?,
                hide,
                extra: BTreeMap::new(),
            })
        }
    };

    Ok(target)
}

/// The datasource a panel queries: the explicit one, or the one all targets share, or mixed
pub fn panel_datasource(explicit: Option<DatasourceRef>, targets: &[Target]) -> Option<DatasourceRef> {
    if explicit.is_some() {
        return explicit;
    }

    let mut datasources = targets.iter().filter_map(Target::datasource);
    let first = datasources.next()?;
    if datasources.all(|other| other == first) {
        Some(first)
    } else {
        Some(DatasourceRef::mixed())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn targets(source: &str) -> Result<Vec<Target>, Error> {
        let body = hcl::parse(source).expect("body must parse");
        let context = hcl::eval::Context::new();
        read_targets(&Scope::new("panel", &body, &context))
    }

    #[test]
    fn ref_ids() {
        assert_eq!(ref_id(0), "A");
        assert_eq!(ref_id(25), "Z");
        assert_eq!(ref_id(26), "AA");
        assert_eq!(ref_id(27), "AB");
        assert_eq!(ref_id(52), "BA");
    }

    #[test]
    fn prometheus_target() {
        let read = targets(
            r#"
            target {
              prometheus {
                uid = "prom"
                expr = "rate(http_requests_total[5m])"
                legend = "{{handler}}"
              }
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&read).unwrap(),
            json!([{
                "refId": "A",
                "datasource": { "uid": "prom", "type": "prometheus" },
                "expr": "rate(http_requests_total[5m])",
                "legendFormat": "{{handler}}",
                "instant": false
            }])
        );
    }

    #[test]
    fn cloudwatch_target() {
        let read = targets(
            r#"
            target {
              cloudwatch {
                uid = "cw"
                ref_id = "cpu"
                namespace = "AWS/EC2"
                metric = "CPUUtilization"
                dimensions = { InstanceId = "i-123" }
                statistic = "Average"
                period = 300
              }
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&read).unwrap(),
            json!([{
                "refId": "cpu",
                "datasource": { "uid": "cw", "type": "cloudwatch" },
                "namespace": "AWS/EC2",
                "metricName": "CPUUtilization",
                "dimensions": { "InstanceId": "i-123" },
                "statistic": "Average",
                "period": "300",
                "matchExact": true
            }])
        );
    }

    #[test]
    fn exactly_one_datasource_block_per_target() {
        let err = targets(
            r#"
            target {
              prometheus {
                uid = "prom"
                expr = "up"
              }
              loki {
                uid = "logs"
                expr = "{app=\"x\"}"
              }
            }
            "#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "panel.target[0]: only one of prometheus, cloudwatch, loki may be set"
        );
    }

    #[test]
    fn unknown_datasources_round_trip() {
        let raw = json!({
            "refId": "A",
            "datasource": { "uid": "x", "type": "influxdb" },
            "query": "SELECT 1"
        });

        let target: Target = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(target, Target::Other(_)));
        assert_eq!(serde_json::to_value(&target).unwrap(), raw);
    }

    #[test]
    fn unmodeled_fields_are_kept() {
        let raw = json!({
            "refId": "A",
            "datasource": { "uid": "prom", "type": "prometheus" },
            "expr": "up",
            "instant": true,
            "editorMode": "code"
        });

        let target: Target = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(target, Target::Prometheus(_)));
        assert_eq!(serde_json::to_value(&target).unwrap(), raw);
    }

    #[test]
    fn shared_or_mixed_datasource() {
        let read = targets(
            r#"
            target {
              prometheus {
                uid = "prom"
                expr = "up"
              }
            }
            target {
              prometheus {
                uid = "prom"
                expr = "down"
              }
            }
            "#,
        )
        .unwrap();
        assert_eq!(
            panel_datasource(None, &read),
            Some(DatasourceRef::new("prom", "prometheus"))
        );

        let read = targets(
            r#"
            target {
              prometheus {
                uid = "prom"
                expr = "up"
              }
            }
            target {
              loki {
                uid = "logs"
                expr = "{job=\"app\"}"
              }
            }
            "#,
        )
        .unwrap();
        assert_eq!(panel_datasource(None, &read), Some(DatasourceRef::mixed()));
        assert_eq!(panel_datasource(None, &[]), None);
    }
}
