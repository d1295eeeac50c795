use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An optional query argument as supplied by the caller.
///
/// `Unset` (absent or `null`) and `Disabled` (an explicit `false`) are kept
/// apart at the input boundary but collapse to the same "ignore this filter"
/// outcome in [`FilterArg::into_option`]. Blank values (empty string, empty
/// list) collapse the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterArg<T> {
    #[default]
    Unset,
    Disabled,
    Value(T),
}

pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for Vec<String> {
    fn is_blank(&self) -> bool {
        self.iter().all(|value| value.is_blank())
    }
}

impl<T: Blank> FilterArg<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            FilterArg::Value(value) if !value.is_blank() => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for FilterArg<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FilterArg::Value(value),
            None => FilterArg::Unset,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FilterArg<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Flag(bool),
            Value(T),
        }

        match Option::<Raw<T>>::deserialize(deserializer)? {
            None => Ok(FilterArg::Unset),
            Some(Raw::Flag(false)) => Ok(FilterArg::Disabled),
            Some(Raw::Flag(true)) => Err(D::Error::custom(
                "`true` is not a filter value; use false to disable the filter or supply a value",
            )),
            Some(Raw::Value(value)) => Ok(FilterArg::Value(value)),
        }
    }
}

/// Deserializes a list-valued filter. A single string is read as a one-item
/// list.
pub fn deserialize_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<FilterArg<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match FilterArg::<OneOrMany>::deserialize(deserializer)? {
        FilterArg::Unset => FilterArg::Unset,
        FilterArg::Disabled => FilterArg::Disabled,
        FilterArg::Value(OneOrMany::One(value)) => FilterArg::Value(vec![value]),
        FilterArg::Value(OneOrMany::Many(values)) => FilterArg::Value(values),
    })
}

impl<T: Serialize> Serialize for FilterArg<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterArg::Unset => serializer.serialize_none(),
            FilterArg::Disabled => serializer.serialize_bool(false),
            FilterArg::Value(value) => value.serialize(serializer),
        }
    }
}

/// Which of the two parallel file stores a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repository {
    Harmonized,
    Legacy,
}

impl Repository {
    pub fn from_legacy(legacy: bool) -> Self {
        if legacy {
            Repository::Legacy
        } else {
            Repository::Harmonized
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, Repository::Legacy)
    }

    pub fn path_prefix(self) -> &'static str {
        match self {
            Repository::Harmonized => "",
            Repository::Legacy => "/legacy",
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repository::Harmonized => write!(f, "harmonized"),
            Repository::Legacy => write!(f, "legacy"),
        }
    }
}

/// Coarse classification of a data category. Field expansion and barcode
/// extraction both dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryClass {
    ProteinExpression,
    ClinicalOrBiospecimen,
    Other,
}

impl CategoryClass {
    pub fn of(category: &str) -> Self {
        match category {
            "Protein expression" => CategoryClass::ProteinExpression,
            "Clinical" | "Biospecimen" => CategoryClass::ClinicalOrBiospecimen,
            _ => CategoryClass::Other,
        }
    }
}

/// Non-fatal conditions raised while running a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    IgnoredPlatform {
        platform: String,
    },
    UnmatchedExperimentalStrategy {
        requested: Vec<String>,
        valid: Vec<String>,
    },
    DuplicateCase {
        cases: Vec<String>,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::IgnoredPlatform { platform } => write!(
                f,
                "platform filter {platform} only applies to the legacy repository and was ignored"
            ),
            Notice::UnmatchedExperimentalStrategy { requested, valid } => write!(
                f,
                "experimental strategy {} does not match any result; possible values: {}",
                requested.join(", "),
                valid.join(", ")
            ),
            Notice::DuplicateCase { cases } => write!(
                f,
                "more than one file for the same case ({}); please verify the query results manually",
                cases.join(", ")
            ),
        }
    }
}
