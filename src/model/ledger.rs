use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// Transaction as returned by the ledger API. Unknown fields are ignored and
/// missing or null collections decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub inputs: Vec<RawInput>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outputs: Vec<RawOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(default)]
    pub previous_outpoint_hash: Option<String>,
    #[serde(default, deserialize_with = "index_from_number_or_string")]
    pub previous_outpoint_index: Option<u32>,
    #[serde(default)]
    pub previous_outpoint_address: Option<String>,
    #[serde(default)]
    pub previous_outpoint_amount: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub script_public_key_address: Option<String>,
}

impl RawTransaction {
    /// Output at `index`, matched on the explicit index field first and on
    /// position otherwise.
    pub fn output_at(
        &self,
        index: u32,
    ) -> Option<&RawOutput> {
        self.outputs
            .iter()
            .find(|output| output.index == Some(index))
            .or_else(|| self.outputs.get(index as usize).filter(|output| output.index.is_none()))
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn index_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Index {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Index>::deserialize(deserializer)? {
        Some(Index::Number(n)) => Some(n),
        Some(Index::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
