//! field configuration shared by most panel kinds
//!
//! Unit, decimals, min/max, colors, thresholds and value mappings. Written as a `field` block
//! on a panel (and in the provider `defaults`), rendered as the `fieldConfig` object.
use crate::error::Error;
use crate::overlay::{settings, ReadBlock, Setting};
use crate::scope::{hcl_enum, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

hcl_enum! {
    pub enum ColorMode {
        Thresholds = "thresholds" => "thresholds",
        Fixed = "fixed" => "fixed",
        Shades = "shades" => "shades",
        PaletteClassic = "palette_classic" => "palette-classic",
        GreenYellowRed = "green_yellow_red" => "continuous-GrYlRd",
        RedYellowGreen = "red_yellow_green" => "continuous-RdYlGr",
        BlueYellowRed = "blue_yellow_red" => "continuous-BlYlRd",
        Blues = "blues" => "continuous-blues",
    }
}

hcl_enum! {
    pub enum ThresholdsMode {
        Absolute = "absolute" => "absolute",
        Percentage = "percentage" => "percentage",
    }
}

hcl_enum! {
    pub enum SpecialValue {
        Null = "null" => "null",
        NaN = "nan" => "nan",
        NullNaN = "null_nan" => "null+nan",
        True = "true" => "true",
        False = "false" => "false",
        Empty = "empty" => "empty",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdStep {
    pub color: String,
    pub value: serde_json::Number,
}

settings! {
    /// Color bands; the base color applies below the first step
    pub struct Thresholds / ThresholdsOverrides {
        mode: ThresholdsMode = ThresholdsMode::Absolute,
        base_color: String = "green".to_string(),
        steps: Vec<ThresholdStep> = vec![ThresholdStep {
            color: "red".to_string(),
            value: 80.into(),
        }] => read_steps,
    }
}

/// A declared value mapping, in the order it was written
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    Value {
        value: String,
        display: MappingDisplay,
    },
    Range {
        from: Option<serde_json::Number>,
        to: Option<serde_json::Number>,
        display: MappingDisplay,
    },
    Regex {
        pattern: String,
        display: MappingDisplay,
    },
    Special {
        matches: SpecialValue,
        display: MappingDisplay,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingDisplay {
    pub text: Option<String>,
    pub color: Option<String>,
}

settings! {
    /// Resolved field configuration
    pub struct FieldSettings / FieldOverrides {
        unit: String = String::new(),
        decimals: Option<u32> = None,
        min: Option<serde_json::Number> = None,
        max: Option<serde_json::Number> = None,
        no_value: Option<String> = None,
        color_mode: ColorMode = ColorMode::Thresholds,
        fixed_color: Option<String> = None,
        thresholds: Thresholds [ThresholdsOverrides] = Thresholds::default() => read_thresholds,
        mappings: Vec<Mapping> = Vec::new() => read_mappings,
    }
}

impl FieldSettings {
    /// Baseline for panels that color series from a palette instead of thresholds
    pub fn palette() -> Self {
        Self {
            color_mode: ColorMode::PaletteClassic,
            ..Self::default()
        }
    }
}

/// `thresholds { mode = .. base_color = .. step { color = .. value = .. } }`
///
/// Each attribute merges with lower layers on its own. Steps replace the lower list as a whole.
fn read_thresholds(scope: &Scope<'_>, key: &str) -> Result<ThresholdsOverrides, Error> {
    let Some(block) = scope.block(key)? else {
        return Ok(ThresholdsOverrides::default());
    };
    block.deny_unknown(&["mode", "base_color", "step"])?;
    ThresholdsOverrides::read(&block)
}

/// Steps are written as repeated `step` blocks; none at all leaves the lower steps in place
fn read_steps(scope: &Scope<'_>, _key: &str) -> Result<Setting<Vec<ThresholdStep>>, Error> {
    let steps = scope
        .blocks("step")
        .map(|step| -> Result<ThresholdStep, Error> {
            step.deny_unknown(&["color", "value"])?;
            Ok(ThresholdStep {
                color: step.required("color")?,
                value: step.required("value")?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    if steps.is_empty() {
        return Ok(Setting::Unset);
    }
    Ok(Setting::Value(steps))
}

/// `mappings { value { .. } range { .. } regex { .. } special { .. } }`
///
/// Mappings keep the order they are written in, across kinds.
fn read_mappings(scope: &Scope<'_>, key: &str) -> Result<Setting<Vec<Mapping>>, Error> {
    let Some(block) = scope.block(key)? else {
        return Ok(Setting::Unset);
    };
    block.deny_unknown(&["value", "range", "regex", "special"])?;

    let mut mappings = Vec::new();
    for (kind, entry) in block.all_blocks() {
        let display = MappingDisplay {
            text: entry.optional("text")?,
            color: entry.optional("color")?,
        };

        let mapping = match kind {
            "value" => {
                entry.deny_unknown(&["value", "text", "color"])?;
                Mapping::Value {
                    value: entry.required("value")?,
                    display,
                }
            }
            "range" => {
                entry.deny_unknown(&["from", "to", "text", "color"])?;
                Mapping::Range {
                    from: entry.optional("from")?,
                    to: entry.optional("to")?,
                    display,
                }
            }
            "regex" => {
                entry.deny_unknown(&["pattern", "text", "color"])?;
                Mapping::Regex {
                    pattern: entry.required("pattern")?,
                    display,
                }
            }
            _ => {
                entry.deny_unknown(&["match", "text", "color"])?;
                Mapping::Special {
                    matches: entry.required("match")?,
                    display,
                }
            }
        };

        mappings.push(mapping);
    }

    Ok(Setting::Value(mappings))
}

/// `fieldConfig` of the Grafana json model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig<C = serde_json::Value> {
    pub defaults: FieldDefaults<C>,
    pub overrides: Vec<serde_json::Value>,
}

impl<C> Default for FieldConfig<C> {
    fn default() -> Self {
        Self {
            defaults: FieldDefaults::default(),
            overrides: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDefaults<C = serde_json::Value> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdsJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<ValueMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<C>,
}

impl<C> Default for FieldDefaults<C> {
    fn default() -> Self {
        Self {
            unit: None,
            decimals: None,
            min: None,
            max: None,
            no_value: None,
            color: None,
            thresholds: None,
            mappings: Vec::new(),
            custom: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldColor {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsJson {
    pub mode: String,
    pub steps: Vec<StepJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepJson {
    pub color: String,
    pub value: Option<serde_json::Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum ValueMapping {
    Value(BTreeMap<String, MappingResult>),
    Range(RangeOptions),
    Regex(RegexOptions),
    Special(SpecialOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeOptions {
    pub from: Option<serde_json::Number>,
    pub to: Option<serde_json::Number>,
    pub result: MappingResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexOptions {
    pub pattern: String,
    pub result: MappingResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialOptions {
    #[serde(rename = "match")]
    pub matches: String,
    pub result: MappingResult,
}

/// Threshold steps as rendered: the base tier (value `null`) followed by the declared steps
///
/// Steps are emitted in declaration order, callers are expected to write them ascending.
pub fn threshold_steps(thresholds: &Thresholds) -> Vec<StepJson> {
    let base = StepJson {
        color: thresholds.base_color.clone(),
        value: None,
    };

    std::iter::once(base)
        .chain(thresholds.steps.iter().map(|step| StepJson {
            color: step.color.clone(),
            value: Some(step.value.clone()),
        }))
        .collect()
}

/// Mapping records with their display index
pub fn value_mappings(mappings: &[Mapping]) -> Vec<ValueMapping> {
    mappings
        .iter()
        .zip(0..)
        .map(|(mapping, index)| {
            let result = |display: &MappingDisplay| MappingResult {
                text: display.text.clone(),
                color: display.color.clone(),
                index,
            };

            match mapping {
                Mapping::Value { value, display } => {
                    ValueMapping::Value(BTreeMap::from([(value.clone(), result(display))]))
                }
                Mapping::Range { from, to, display } => ValueMapping::Range(RangeOptions {
                    from: from.clone(),
                    to: to.clone(),
                    result: result(display),
                }),
                Mapping::Regex { pattern, display } => ValueMapping::Regex(RegexOptions {
                    pattern: pattern.clone(),
                    result: result(display),
                }),
                Mapping::Special { matches, display } => ValueMapping::Special(SpecialOptions {
                    matches: matches.wire_name().to_string(),
                    result: result(display),
                }),
            }
        })
        .collect()
}

/// Render resolved settings (and the panel kind's `custom` section) as `fieldConfig`
pub fn build<C>(settings: &FieldSettings, custom: Option<C>) -> FieldConfig<C> {
    let fixed_color = match settings.color_mode {
        ColorMode::Fixed | ColorMode::Shades => settings.fixed_color.clone(),
        _ => None,
    };

    FieldConfig {
        defaults: FieldDefaults {
            unit: Some(settings.unit.clone()).filter(|unit| !unit.is_empty()),
            decimals: settings.decimals,
            min: settings.min.clone(),
            max: settings.max.clone(),
            no_value: settings.no_value.clone(),
            color: Some(FieldColor {
                mode: settings.color_mode.wire_name().to_string(),
                fixed_color,
            }),
            thresholds: Some(ThresholdsJson {
                mode: settings.thresholds.mode.wire_name().to_string(),
                steps: threshold_steps(&settings.thresholds),
            }),
            mappings: value_mappings(&settings.mappings),
            custom,
        },
        overrides: Vec::new(),
    }
}
