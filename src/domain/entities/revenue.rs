use crate::domain::value_objects::money::parse_amount;
use serde::{Deserialize, Deserializer, Serialize};

/// Lead count as reported by the tracker, passed through unchanged.
///
/// Binom returns counts as strings ("5") but older exports use integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Leads {
    Count(i64),
    Label(String),
}

impl Leads {
    pub fn is_zero(&self) -> bool {
        match self {
            Leads::Count(n) => *n == 0,
            Leads::Label(s) => {
                let s = s.trim();
                s.is_empty() || s.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
            }
        }
    }
}

impl Default for Leads {
    fn default() -> Self {
        Leads::Label("0".to_string())
    }
}

impl std::fmt::Display for Leads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leads::Count(n) => write!(f, "{}", n),
            Leads::Label(s) => f.write_str(s),
        }
    }
}

/// One campaign row of the tracker report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default_leads")]
    pub leads: Leads,
    #[serde(default, deserialize_with = "amount_from_any")]
    pub revenue: f64,
}

impl RevenueRecord {
    /// Rows with neither revenue nor leads carry no information
    pub fn is_empty(&self) -> bool {
        self.revenue == 0.0 && self.leads.is_zero()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_leads<'de, D>(deserializer: D) -> Result<Leads, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Leads>::deserialize(deserializer)?.unwrap_or_default())
}

fn amount_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(0.0),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {}", n))),
        Some(serde_json::Value::String(s)) => parse_amount(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {:?}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid amount: {}",
            other
        ))),
    }
}
