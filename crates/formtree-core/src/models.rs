pub mod answer;
pub mod calculation;
pub mod data_type;
pub mod form;
pub mod item;
pub mod unit;

use serde::{Deserialize, Deserializer};

/// LHC-Forms documents write `null` for absent lists; treat it as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
