// ABOUTME: CaseRecord and its table row types, serialized with the portal's Devanagari labels.
// ABOUTME: Rows fill positionally from table cells; missing cells and empty tables become blank placeholders.

use std::fmt;

use nyaya_records::Tree;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value used for every field of a placeholder row.
pub const BLANK: &str = "";

pub const CASE_DETAILS_KEY: &str = "मुद्दाको विवरण";
pub const RELATED_CASES_KEY: &str = "लगाब मुद्दाहरुको विवरण";
pub const HEARING_DATES_KEY: &str = "तारेख विवरण";
pub const STATUS_HISTORY_KEY: &str = "मुद्दाको स्थितीको बिस्तृत विवरण";
pub const SESSION_DETAILS_KEY: &str = "पेशी को विवरण";

/// A row type read positionally from a secondary table.
pub trait TableRow: Sized {
    /// Persisted labels, in column order.
    const FIELDS: &'static [&'static str];

    /// Builds a row from cell texts. Missing trailing cells become [`BLANK`]; extra cells are ignored.
    fn from_cells(cells: &[String]) -> Self;

    /// Field values in column order.
    fn values(&self) -> Vec<&str>;

    /// The all-blank row substituted for a table without data rows.
    fn placeholder() -> Self {
        Self::from_cells(&[])
    }

    fn to_tree(&self) -> Tree {
        Tree::Object(
            Self::FIELDS
                .iter()
                .zip(self.values())
                .map(|(label, value)| (label.to_string(), Tree::string(value)))
                .collect(),
        )
    }
}

macro_rules! table_row {
    ($(#[$meta:meta])* $name:ident { $($field:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            $(
                #[serde(rename = $label, default)]
                pub $field: String,
            )+
        }

        impl TableRow for $name {
            const FIELDS: &'static [&'static str] = &[$($label),+];

            fn from_cells(cells: &[String]) -> Self {
                let mut cells = cells.iter();
                Self {
                    $($field: cells.next().cloned().unwrap_or_else(|| BLANK.to_string()),)+
                }
            }

            fn values(&self) -> Vec<&str> {
                vec![$(self.$field.as_str()),+]
            }
        }
    };
}

table_row! {
    /// A case administratively linked to the primary case (लगाब).
    RelatedCase {
        registration_number => "दर्ता नँ",
        registration_date => "दर्ता मिती",
        case_type => "मुद्दा",
        plaintiffs => "वादीहरु",
        defendants => "प्रतिवादीहरु",
        current_status => "हालको स्थिती",
    }
}

table_row! {
    /// A scheduled appearance date (तारेख).
    HearingDate {
        hearing_date => "तारेख मिती",
        description => "विवरण",
        hearing_kind => "तारेखको किसिम",
        misc => "अन्य",
    }
}

table_row! {
    /// One entry of the case status log (स्थिती).
    StatusEntry {
        date => "मिती",
        description => "विवरण",
        status => "स्थिती",
    }
}

table_row! {
    /// A bench session for the case (पेशी).
    SessionDetail {
        hearing_date => "सुनवाइ मिती",
        judges => "न्यायाधीशहरू",
        case_status => "मुद्दाको स्थिती",
        order_or_verdict_kind => "आदेश /फैसलाको किसिम",
    }
}

/// Label/value pairs from the primary table, in page order. Keys are unique; a repeated
/// label replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseDetails {
    entries: Vec<(String, String)>,
}

impl CaseDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for CaseDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CaseDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DetailsVisitor;

        impl<'de> Visitor<'de> for DetailsVisitor {
            type Value = CaseDetails;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of label to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut details = CaseDetails::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    details.insert(k, v);
                }
                Ok(details)
            }
        }

        deserializer.deserialize_map(DetailsVisitor)
    }
}

/// Everything extracted from one case's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "मुद्दाको विवरण")]
    pub case_details: CaseDetails,
    #[serde(rename = "लगाब मुद्दाहरुको विवरण")]
    pub related_cases: Vec<RelatedCase>,
    #[serde(rename = "तारेख विवरण")]
    pub hearing_dates: Vec<HearingDate>,
    #[serde(rename = "मुद्दाको स्थितीको बिस्तृत विवरण")]
    pub status_history: Vec<StatusEntry>,
    #[serde(rename = "पेशी को विवरण")]
    pub session_details: Vec<SessionDetail>,
}

impl CaseRecord {
    /// Converts the record into a [`Tree`] with the same shape as its JSON form.
    pub fn to_tree(&self) -> Tree {
        let details = Tree::Object(
            self.case_details
                .iter()
                .map(|(k, v)| (k.to_string(), Tree::string(v)))
                .collect(),
        );
        Tree::Object(vec![
            (CASE_DETAILS_KEY.to_string(), details),
            (RELATED_CASES_KEY.to_string(), rows_to_tree(&self.related_cases)),
            (HEARING_DATES_KEY.to_string(), rows_to_tree(&self.hearing_dates)),
            (STATUS_HISTORY_KEY.to_string(), rows_to_tree(&self.status_history)),
            (SESSION_DETAILS_KEY.to_string(), rows_to_tree(&self.session_details)),
        ])
    }
}

fn rows_to_tree<R: TableRow>(rows: &[R]) -> Tree {
    Tree::Array(rows.iter().map(TableRow::to_tree).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_from_cells_fills_missing_with_blank() {
        let row = RelatedCase::from_cells(&["०८०-CR-००१".to_string(), "२०८०।०१।०२".to_string()]);
        assert_eq!(row.registration_number, "०८०-CR-००१");
        assert_eq!(row.registration_date, "२०८०।०१।०२");
        assert_eq!(row.case_type, BLANK);
        assert_eq!(row.current_status, BLANK);
    }

    #[test]
    fn test_from_cells_ignores_extra_cells() {
        let cells: Vec<String> = (0..6).map(|i| i.to_string()).collect();
        let row = StatusEntry::from_cells(&cells);
        assert_eq!(row.values(), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_placeholder_is_all_blank() {
        assert!(SessionDetail::placeholder().values().iter().all(|v| *v == BLANK));
        assert_eq!(HearingDate::placeholder().values().len(), HearingDate::FIELDS.len());
    }

    #[test]
    fn test_serde_and_tree_forms_agree() {
        let mut details = CaseDetails::new();
        details.insert("मुद्दा नं", "080-CR-0096");
        details.insert("दर्ता मिती", "२०८०।०४।१९");
        let record = CaseRecord {
            case_details: details,
            related_cases: vec![RelatedCase::placeholder()],
            hearing_dates: vec![HearingDate::from_cells(&["a".into(), "b".into()])],
            status_history: vec![StatusEntry::placeholder()],
            session_details: vec![SessionDetail::placeholder()],
        };

        let via_serde = serde_json::to_value(&record).unwrap();
        let via_tree = Value::from(record.to_tree());
        assert_eq!(via_serde, via_tree);
        assert_eq!(
            serde_json::to_string(&via_serde).unwrap(),
            serde_json::to_string(&via_tree).unwrap()
        );

        let back: CaseRecord = serde_json::from_value(via_serde).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_case_details_keeps_order_and_replaces() {
        let mut details = CaseDetails::new();
        details.insert("ख", "1");
        details.insert("क", "2");
        details.insert("ख", "3");
        assert_eq!(
            serde_json::to_value(&details).unwrap(),
            json!({"ख": "3", "क": "2"})
        );
        assert_eq!(details.get("ख"), Some("3"));
        assert_eq!(details.len(), 2);
    }
}
