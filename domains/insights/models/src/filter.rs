use std::{collections::HashMap, fmt};

use insights_errors::InsightsError;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Event name or action id an entity refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Name(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self { Self::Number(id) }
}

impl From<&str> for EntityId {
    fn from(name: &str) -> Self { Self::Name(name.to_string()) }
}

impl From<String> for EntityId {
    fn from(name: String) -> Self { Self::Name(name) }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    #[default]
    Events,
    Actions,
}

/// A property filter, e.g. `$browser = Chrome`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Property {
    #[builder(setter(into))]
    pub key: String,
    #[builder(setter(into))]
    pub value: serde_json::Value,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub property_type: Option<String>,
}

impl Property {
    pub fn new(
        key: impl Into<String>, value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operator: None,
            property_type: None,
        }
    }

    fn sort_key(&self) -> (String, String, String, String) {
        (
            self.key.clone(),
            self.value.to_string(),
            self.operator.clone().unwrap_or_default(),
            self.property_type.clone().unwrap_or_default(),
        )
    }
}

/// A series in a trends query: an event or an action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Entity {
    #[builder(setter(into))]
    pub id: EntityId,
    #[builder(default)]
    #[serde(rename = "type", default)]
    pub entity_type: EntityType,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub math: Option<String>,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

impl Entity {
    pub fn event(name: impl Into<String>) -> Self {
        Self::builder().id(EntityId::Name(name.into())).build()
    }

    pub fn action(id: i64) -> Self {
        Self::builder()
            .id(id)
            .entity_type(EntityType::Actions)
            .build()
    }

    /// `(order, id, math)`, with ties broken on the entity's full JSON.
    /// Properties must already be canonical.
    fn sort_key(&self) -> (u32, String, String, String) {
        (
            self.order.unwrap_or(u32::MAX),
            self.id.to_string(),
            self.math.clone().unwrap_or_default(),
            serde_json::to_string(self).unwrap_or_default(),
        )
    }
}

/// Trends query filter.
///
/// Built either directly or from request query parameters. Two filters
/// that describe the same query produce the same
/// [`Filter::to_canonical_json`] output, whatever order their entities
/// and properties were added in.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder,
)]
#[serde(default)]
pub struct Filter {
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Entity>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Entity>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown_type: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shown_as: Option<String>,
    #[builder(default)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub compare: bool,
}

impl Filter {
    /// Parse a filter from request query parameters.
    ///
    /// `events`, `actions` and `properties` carry JSON. `properties` may
    /// be a list of property objects or a plain `{key: value}` map.
    pub fn from_query_params(
        params: &HashMap<String, String>,
    ) -> Result<Self, InsightsError> {
        let scalar = |name: &str| {
            params
                .get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let events = parse_entities(params, "events", EntityType::Events)?;
        let actions = parse_entities(params, "actions", EntityType::Actions)?;
        let properties = parse_properties(params)?;

        Ok(Self {
            date_from: scalar("date_from"),
            date_to: scalar("date_to"),
            events,
            actions,
            properties,
            interval: scalar("interval"),
            display: scalar("display"),
            breakdown: scalar("breakdown"),
            breakdown_type: scalar("breakdown_type"),
            shown_as: scalar("shown_as"),
            compare: scalar("compare")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        })
    }

    /// All series, events first, in canonical order
    pub fn entities(&self) -> Vec<Entity> {
        let canonical = self.canonicalized();
        canonical
            .events
            .into_iter()
            .chain(canonical.actions)
            .collect()
    }

    /// A copy with every order-insensitive list sorted.
    pub fn canonicalized(&self) -> Self {
        let mut filter = self.clone();

        canonicalize_properties(&mut filter.properties);
        for entity in filter.events.iter_mut().chain(filter.actions.iter_mut())
        {
            canonicalize_properties(&mut entity.properties);
        }
        filter.events.sort_by_cached_key(Entity::sort_key);
        filter.actions.sort_by_cached_key(Entity::sort_key);

        filter
    }

    /// Deterministic JSON text for this filter. Fields keep declaration
    /// order, absent fields are left out and object keys inside property
    /// values come out sorted.
    pub fn to_canonical_json(&self) -> Result<String, InsightsError> {
        serde_json::to_string(&self.canonicalized())
            .map_err(|e| InsightsError::Serialization(e.to_string()))
    }
}

fn canonicalize_properties(properties: &mut [Property]) {
    for property in properties.iter_mut() {
        property.value = sorted_value(&property.value);
    }
    properties.sort_by_cached_key(Property::sort_key);
}

/// Rebuilds objects with their keys inserted in sorted order, so the
/// output does not depend on whether serde_json preserves insertion
/// order.
fn sorted_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            serde_json::Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), sorted_value(&fields[key])))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sorted_value).collect())
        }
        other => other.clone(),
    }
}

fn parse_entities(
    params: &HashMap<String, String>, name: &str, entity_type: EntityType,
) -> Result<Vec<Entity>, InsightsError> {
    let Some(raw) = params.get(name).filter(|raw| !raw.trim().is_empty())
    else {
        return Ok(Vec::new());
    };

    let mut entities: Vec<Entity> = serde_json::from_str(raw)
        .map_err(|e| InsightsError::invalid_filter(name, e))?;
    for entity in &mut entities {
        entity.entity_type = entity_type;
    }
    Ok(entities)
}

fn parse_properties(
    params: &HashMap<String, String>,
) -> Result<Vec<Property>, InsightsError> {
    let Some(raw) = params
        .get("properties")
        .filter(|raw| !raw.trim().is_empty())
    else {
        return Ok(Vec::new());
    };

    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| InsightsError::invalid_filter("properties", e))?;

    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value)
                .map_err(|e| InsightsError::invalid_filter("properties", e))
        }
        serde_json::Value::Object(fields) => {
            Ok(fields
                .into_iter()
                .map(|(key, value)| Property::new(key, value))
                .collect())
        }
        other => {
            Err(InsightsError::invalid_filter(
                "properties",
                format!("expected a list or an object, got {other}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_json_ignores_property_order() {
        let a = Filter::builder()
            .date_from("-7d")
            .properties(vec![
                Property::new("$browser", "Chrome"),
                Property::new("$os", "Mac OS X"),
            ])
            .build();
        let b = Filter::builder()
            .properties(vec![
                Property::new("$os", "Mac OS X"),
                Property::new("$browser", "Chrome"),
            ])
            .date_from("-7d")
            .build();

        assert_eq!(
            a.to_canonical_json().unwrap(),
            b.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn test_canonical_json_ignores_nested_object_key_order() {
        let a = Filter::builder()
            .properties(vec![Property::new(
                "plan",
                json!({"tier": "pro", "seats": 5}),
            )])
            .build();
        let b: Filter = serde_json::from_str(
            r#"{"properties":[{"key":"plan","value":{"seats":5,"tier":"pro"}}]}"#,
        )
        .unwrap();

        assert_eq!(
            a.to_canonical_json().unwrap(),
            b.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn test_canonical_json_orders_entities() {
        let a = Filter::builder()
            .events(vec![Entity::event("signup"), Entity::event("pageview")])
            .build();
        let b = Filter::builder()
            .events(vec![Entity::event("pageview"), Entity::event("signup")])
            .build();

        assert_eq!(
            a.to_canonical_json().unwrap(),
            b.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn test_canonical_json_orders_same_event_by_properties() {
        let chrome = Entity::builder()
            .id("pageview")
            .properties(vec![Property::new("$browser", "Chrome")])
            .build();
        let safari = Entity::builder()
            .id("pageview")
            .properties(vec![Property::new("$browser", "Safari")])
            .build();

        let a = Filter::builder()
            .events(vec![chrome.clone(), safari.clone()])
            .build();
        let b = Filter::builder().events(vec![safari, chrome]).build();

        assert_eq!(
            a.to_canonical_json().unwrap(),
            b.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn test_canonical_json_orders_numeric_and_named_ids() {
        let numeric = Entity::builder().id(4_i64).build();
        let named = Entity::builder().id("4").build();

        let a = Filter::builder()
            .events(vec![numeric.clone(), named.clone()])
            .build();
        let b = Filter::builder().events(vec![named, numeric]).build();

        assert_eq!(
            a.to_canonical_json().unwrap(),
            b.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn test_explicit_order_wins_over_id() {
        let filter = Filter::builder()
            .events(vec![
                Entity::builder().id("zeta").order(0).build(),
                Entity::builder().id("alpha").order(1).build(),
            ])
            .build();

        let ids: Vec<String> = filter
            .entities()
            .iter()
            .map(|entity| entity.id.to_string())
            .collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_canonical_json_omits_absent_fields() {
        let filter = Filter::builder().date_from("-7d").build();
        assert_eq!(
            filter.to_canonical_json().unwrap(),
            r#"{"date_from":"-7d"}"#
        );
    }

    #[test]
    fn test_different_filters_differ() {
        let week = Filter::builder().date_from("-7d").build();
        let month = Filter::builder().date_from("-30d").build();

        assert_ne!(
            week.to_canonical_json().unwrap(),
            month.to_canonical_json().unwrap()
        );
    }

    #[test]
    fn test_from_query_params() {
        let filter = Filter::from_query_params(&params(&[
            ("date_from", "-7d"),
            ("events", r#"[{"id": "pageview", "math": "dau"}]"#),
            ("actions", r#"[{"id": 4}]"#),
            ("properties", r#"{"$browser": "Chrome"}"#),
            ("interval", "day"),
            ("compare", "true"),
            ("display", ""),
        ]))
        .unwrap();

        assert_eq!(filter.date_from.as_deref(), Some("-7d"));
        assert_eq!(filter.events.len(), 1);
        assert_eq!(filter.events[0].id, EntityId::from("pageview"));
        assert_eq!(filter.events[0].math.as_deref(), Some("dau"));
        assert_eq!(filter.actions[0].id, EntityId::Number(4));
        assert_eq!(filter.actions[0].entity_type, EntityType::Actions);
        assert_eq!(filter.properties, vec![Property::new(
            "$browser", "Chrome"
        )]);
        assert_eq!(filter.interval.as_deref(), Some("day"));
        assert!(filter.compare);
        assert_eq!(filter.display, None);
    }

    #[test]
    fn test_from_query_params_property_list() {
        let filter = Filter::from_query_params(&params(&[(
            "properties",
            r#"[{"key": "$os", "value": "Linux", "operator": "exact", "type": "person"}]"#,
        )]))
        .unwrap();

        assert_eq!(
            filter.properties,
            vec![
                Property::builder()
                    .key("$os")
                    .value("Linux")
                    .operator("exact")
                    .property_type("person")
                    .build()
            ]
        );
    }

    #[test]
    fn test_from_query_params_rejects_malformed_events() {
        let err = Filter::from_query_params(&params(&[("events", "[{")]))
            .unwrap_err();
        assert!(matches!(
            err,
            InsightsError::InvalidFilter { ref param, .. } if param == "events"
        ));
    }

    #[test]
    fn test_from_query_params_rejects_scalar_properties() {
        let err = Filter::from_query_params(&params(&[("properties", "3")]))
            .unwrap_err();
        assert!(matches!(err, InsightsError::InvalidFilter { .. }));
    }

    #[test]
    fn test_query_params_and_builder_agree() {
        let parsed = Filter::from_query_params(&params(&[
            ("events", r#"[{"id": "pageview"}]"#),
            ("date_from", "-7d"),
        ]))
        .unwrap();
        let built = Filter::builder()
            .date_from("-7d")
            .events(vec![Entity::event("pageview")])
            .build();

        assert_eq!(
            parsed.to_canonical_json().unwrap(),
            built.to_canonical_json().unwrap()
        );
    }
}
