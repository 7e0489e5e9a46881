use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sea_orm::Value;
use serde::Deserialize;

use crate::errors::ServiceError;

/// Sizes the catalog recognizes. A size filter outside this set is bound as
/// SQL NULL, so the comparison matches nothing instead of erroring.
pub const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

/// A single filter value. Untagged, so JSON booleans, numbers and strings
/// all deserialize directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterScalar {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FilterScalar {
    /// Falsy values (`false`, `0`, `""`) mean "filter not set".
    fn is_unset(&self) -> bool {
        match self {
            FilterScalar::Flag(b) => !*b,
            FilterScalar::Number(n) => *n == 0.0,
            FilterScalar::Text(s) => s.is_empty(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            FilterScalar::Flag(b) => b.to_string(),
            FilterScalar::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            FilterScalar::Text(s) => s.clone(),
        }
    }
}

/// Either one scalar or a list of alternatives. A list produces a
/// parenthesized OR group, so any listed value matches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(FilterScalar),
    Many(Vec<FilterScalar>),
}

impl FilterValue {
    fn is_unset(&self) -> bool {
        match self {
            FilterValue::One(scalar) => scalar.is_unset(),
            FilterValue::Many(list) => list.is_empty(),
        }
    }
}

struct FilterSpec {
    name: &'static str,
    clause: &'static str,
    bind: fn(&FilterScalar) -> Result<Value, ServiceError>,
}

/// Table mapping filter names to SQL fragments. Adding a filter means
/// adding a row here.
const FILTERS: &[FilterSpec] = &[
    FilterSpec {
        name: "name",
        clause: "i.item_name LIKE ?",
        bind: pattern_param,
    },
    FilterSpec {
        name: "category",
        clause: "i.category = ?",
        bind: text_param,
    },
    FilterSpec {
        name: "size",
        clause: "v.size = ?",
        bind: size_param,
    },
    FilterSpec {
        name: "color",
        clause: "LOWER(v.color) = ?",
        bind: lowercase_param,
    },
    FilterSpec {
        name: "minprice",
        clause: "? <= v.price",
        bind: price_param,
    },
    FilterSpec {
        name: "maxprice",
        clause: "v.price <= ?",
        bind: price_param,
    },
    FilterSpec {
        name: "instock",
        clause: "SIGN(v.stock) = ?",
        bind: sign_param,
    },
];

fn pattern_param(scalar: &FilterScalar) -> Result<Value, ServiceError> {
    Ok(format!("%{}%", scalar.as_text()).into())
}

fn text_param(scalar: &FilterScalar) -> Result<Value, ServiceError> {
    Ok(scalar.as_text().into())
}

fn size_param(scalar: &FilterScalar) -> Result<Value, ServiceError> {
    let text = scalar.as_text();
    if SIZES.contains(&text.as_str()) {
        Ok(text.into())
    } else {
        // unrecognized size: bind NULL so the clause matches no row
        Ok(Value::String(None))
    }
}

fn lowercase_param(scalar: &FilterScalar) -> Result<Value, ServiceError> {
    Ok(scalar.as_text().to_lowercase().into())
}

fn price_param(scalar: &FilterScalar) -> Result<Value, ServiceError> {
    let decimal = match scalar {
        FilterScalar::Flag(b) => Decimal::from(*b as i64),
        FilterScalar::Number(n) => Decimal::try_from(*n)
            .map_err(|_| ServiceError::InvalidInput(format!("invalid price bound: {n}")))?,
        FilterScalar::Text(s) => s
            .parse::<Decimal>()
            .map_err(|_| ServiceError::InvalidInput(format!("invalid price bound: {s}")))?,
    };
    Ok(decimal.into())
}

fn sign_param(_scalar: &FilterScalar) -> Result<Value, ServiceError> {
    // only truthy values reach here, and truthy means "in stock"
    Ok(1i32.into())
}

const BASE_QUERY: &str = "SELECT v.item_id, v.variant_id, i.item_name, i.category, \
     v.size, v.color, v.price, v.weight, \
     COALESCE(v.variant_image, i.item_image) AS image_id \
     FROM variant_catalog v \
     INNER JOIN item_catalog i ON i.item_id = v.item_id \
     WHERE 1=1";

/// Builds the catalog search statement from a filter map.
///
/// Unknown filter names are rejected before anything else, including for
/// values that would otherwise be skipped as unset. Filters combine with
/// AND; a list value expands to an OR group over its alternatives.
pub fn build_search_sql(
    filters: &BTreeMap<String, FilterValue>,
) -> Result<(String, Vec<Value>), ServiceError> {
    let mut sql = String::from(BASE_QUERY);
    let mut params: Vec<Value> = Vec::new();

    for (name, value) in filters {
        let spec = FILTERS
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ServiceError::InvalidInput(format!("unknown search filter: {name}")))?;

        if value.is_unset() {
            continue;
        }

        match value {
            FilterValue::One(scalar) => {
                sql.push_str(" AND ");
                sql.push_str(spec.clause);
                params.push((spec.bind)(scalar)?);
            }
            FilterValue::Many(list) => {
                sql.push_str(" AND (");
                for (i, scalar) in list.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" OR ");
                    }
                    sql.push_str(spec.clause);
                    params.push((spec.bind)(scalar)?);
                }
                sql.push(')');
            }
        }
    }

    sql.push_str(" ORDER BY v.item_id, v.variant_id");
    Ok((sql, params))
}
