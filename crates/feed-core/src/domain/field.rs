use serde::{Deserialize, Deserializer};

/// Presence marker for partially supplied payloads.
///
/// `Absent` means the caller did not mention the field at all; `Present`
/// carries whatever was supplied, including an explicit `null` when `T` is an
/// `Option`. Pair with `#[serde(default)]` on the containing struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Present(value) => Field::Present(f(value)),
            Field::Absent => Field::Absent,
        }
    }

    /// Overwrite `target` when the field was supplied.
    pub fn apply_to(self, target: &mut T) {
        if let Field::Present(value) = self {
            *target = value;
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        name: Field<String>,
        #[serde(default)]
        note: Field<Option<String>>,
    }

    #[test]
    fn test_missing_and_null_are_distinct() {
        let absent: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.name, Field::Absent);
        assert_eq!(absent.note, Field::Absent);

        let cleared: Sample = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(cleared.note, Field::Present(None));

        let set: Sample = serde_json::from_str(r#"{"name": "", "note": "x"}"#).unwrap();
        assert_eq!(set.name, Field::Present(String::new()));
        assert_eq!(set.note, Field::Present(Some("x".to_string())));
    }

    #[test]
    fn test_apply_to_only_overwrites_present() {
        let mut title = "before".to_string();
        Field::Absent.apply_to(&mut title);
        assert_eq!(title, "before");
        Field::Present("after".to_string()).apply_to(&mut title);
        assert_eq!(title, "after");
    }
}
