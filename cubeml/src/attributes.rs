//! Free-form attributes.

/// Attributes of a cube or coordinate.
///
/// Equality is independent of insertion order.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Attribute names that are reserved for the metadata they describe.
pub const RESERVED_ATTRIBUTE_NAMES: &[&str] = &[
    "standard_name",
    "long_name",
    "var_name",
    "units",
    "bounds",
    "axis",
    "calendar",
    "leap_month",
    "leap_year",
    "month_lengths",
    "coordinates",
    "grid_mapping",
    "climatology",
    "cell_methods",
    "formula_terms",
    "compress",
    "missing_value",
    "add_offset",
    "scale_factor",
    "valid_max",
    "valid_min",
    "valid_range",
    "_FillValue",
];

/// The first reserved attribute name in `attributes`.
pub(crate) fn find_reserved(attributes: &Attributes) -> Option<&str> {
    attributes
        .keys()
        .map(String::as_str)
        .find(|key| RESERVED_ATTRIBUTE_NAMES.contains(key))
}

/// The attributes serialised as JSON with sorted keys.
pub(crate) fn to_sorted_json(attributes: &Attributes) -> String {
    let sorted: std::collections::BTreeMap<_, _> = attributes.iter().collect();
    serde_json::to_string(&sorted).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_reserved_and_sorted() {
        let mut attributes = Attributes::new();
        attributes.insert("source".to_string(), "model".into());
        attributes.insert("count".to_string(), 2.into());
        assert_eq!(find_reserved(&attributes), None);
        assert_eq!(to_sorted_json(&attributes), r#"{"count":2,"source":"model"}"#);

        attributes.insert("units".to_string(), "K".into());
        assert_eq!(find_reserved(&attributes), Some("units"));
    }

    #[test]
    fn attributes_equality_ignores_order() {
        let mut a = Attributes::new();
        a.insert("x".to_string(), 1.into());
        a.insert("y".to_string(), 2.into());
        let mut b = Attributes::new();
        b.insert("y".to_string(), 2.into());
        b.insert("x".to_string(), 1.into());
        assert_eq!(a, b);
    }
}
