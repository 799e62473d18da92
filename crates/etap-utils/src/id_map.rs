pub trait ItemId {
    type IdType;

    fn id(&self) -> Self::IdType;
}

/// Serde adapter for id-keyed ordered maps that are written as plain
/// sequences in the config documents. The key is taken from the item
/// itself, so the document never repeats it.
#[allow(clippy::module_inception)]
pub mod id_map {
    use super::ItemId;
    use serde::Serialize;
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::Serializer;

    pub fn serialize<'a, S, T: ItemId + Serialize + 'a, I: IntoIterator<Item = (&'a T::IdType, &'a T)>>(
        map: I,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.into_iter().map(|(_, v)| v))
    }

    pub fn deserialize<'de, D, T: ItemId + Deserialize<'de>, O: FromIterator<(T::IdType, T)>>(
        deserializer: D,
    ) -> Result<O, D::Error>
    where
        D: Deserializer<'de>,
    {
        let elements = Vec::<T>::deserialize(deserializer)?;
        Ok(elements.into_iter().map(|v| (v.id(), v)).collect())
    }
}
