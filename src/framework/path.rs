//! # Path Builder
//!
//! Turns an [`AssociationDescriptor`] plus the owning record into a resource URI.
//! Pure: no I/O, no mutation.
//!
//! 1. An explicit path template (literal or computed) is interpolated: every
//!    `:identifier` token is replaced by the attribute of the same name.
//! 2. Otherwise the URI is derived from the relation kind:
//!
//! | Kind        | Shape                                   |
//! |-------------|-----------------------------------------|
//! | OneToMany   | `{owner_base}/{id}/{relation_plural}`   |
//! | OneToOne    | `{owner_base}/{id}/{relation_singular}` |
//! | ManyToOne   | `/{relation_plural}/{foreign_key}`      |
//!
//! A missing value yields [`ResourceError::UnresolvedToken`], which callers read as
//! "not fetchable yet".

use crate::framework::association::{AssociationDescriptor, RelationKind};
use crate::framework::error::ResourceError;
use crate::framework::inflect::{pluralize, singularize};
use crate::framework::model::ModelType;
use crate::framework::record::{value_to_segment, Record};

/// Builds the URI for `descriptor` on a `record` of type `owner`.
pub fn resolve(
    descriptor: &AssociationDescriptor,
    owner: &ModelType,
    record: &Record,
) -> Result<String, ResourceError> {
    descriptor.validate()?;

    if let Some(template) = descriptor.path_template() {
        return interpolate(&template.render(record), record);
    }

    match descriptor.kind() {
        RelationKind::OneToMany => {
            let id = required(record, "id")?;
            Ok(format!(
                "{}/{id}/{}",
                owner.base_uri(),
                pluralize(descriptor.name())
            ))
        }
        RelationKind::OneToOne => {
            let id = required(record, "id")?;
            Ok(format!(
                "{}/{id}/{}",
                owner.base_uri(),
                singularize(descriptor.name())
            ))
        }
        RelationKind::ManyToOne => {
            let key = required(record, &descriptor.foreign_key_attribute())?;
            Ok(format!("/{}/{key}", pluralize(descriptor.name())))
        }
    }
}

/// True when [`resolve`] would succeed; other errors still propagate.
pub fn is_resolvable(
    descriptor: &AssociationDescriptor,
    owner: &ModelType,
    record: &Record,
) -> Result<bool, ResourceError> {
    match resolve(descriptor, owner, record) {
        Ok(_) => Ok(true),
        Err(e) if e.is_unresolved() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Replaces each `:identifier` in `template` with the matching attribute.
pub fn interpolate(template: &str, record: &Record) -> Result<String, ResourceError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(colon) = rest.find(':') {
        out.push_str(&rest[..colon]);
        let after = &rest[colon + 1..];
        let len = token_len(after);
        if len == 0 {
            out.push(':');
            rest = after;
            continue;
        }
        out.push_str(&required(record, &after[..len])?);
        rest = &after[len..];
    }
    out.push_str(rest);
    Ok(out)
}

fn token_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn required(record: &Record, name: &str) -> Result<String, ResourceError> {
    record
        .attribute(name)
        .and_then(value_to_segment)
        .ok_or_else(|| ResourceError::UnresolvedToken {
            token: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::association::PathTemplate;
    use serde_json::{json, Value};

    fn car(value: Value) -> Record {
        Record::from_attributes(value.as_object().cloned().unwrap())
    }

    fn car_type() -> ModelType {
        ModelType::new("car")
    }

    #[test]
    fn test_derived_shapes() {
        let owner = car_type();
        let record = car(json!({"id": 7, "brand_id": 2}));

        let wheels = AssociationDescriptor::has_many("wheels", "wheel");
        let engine = AssociationDescriptor::has_one("engine", "engine");
        let brand = AssociationDescriptor::belongs_to("brand", "brand");

        assert_eq!(resolve(&wheels, &owner, &record).unwrap(), "/cars/7/wheels");
        assert_eq!(resolve(&engine, &owner, &record).unwrap(), "/cars/7/engine");
        assert_eq!(resolve(&brand, &owner, &record).unwrap(), "/brands/2");
    }

    #[test]
    fn test_derived_shape_uses_owner_endpoint() {
        let owner = ModelType::new("car").with_uri("/garage/cars");
        let record = car(json!({"id": "abc"}));
        let wheels = AssociationDescriptor::has_many("wheel", "wheel");

        assert_eq!(
            resolve(&wheels, &owner, &record).unwrap(),
            "/garage/cars/abc/wheels"
        );
    }

    #[test]
    fn test_explicit_template_replaces_id_for_every_kind() {
        let owner = car_type();
        let record = car(json!({"id": 7}));

        for descriptor in [
            AssociationDescriptor::has_many("wheels", "wheel"),
            AssociationDescriptor::has_one("engine", "engine"),
            AssociationDescriptor::belongs_to("brand", "brand"),
        ] {
            let descriptor = descriptor.path("/fleet/:id/items");
            assert_eq!(
                resolve(&descriptor, &owner, &record).unwrap(),
                "/fleet/7/items"
            );
        }
    }

    #[test]
    fn test_computed_template() {
        let owner = car_type();
        let record = car(json!({"id": 7, "region": "eu"}));
        let descriptor = AssociationDescriptor::has_many("dealers", "dealer").path(
            PathTemplate::computed(|record| {
                if record.attribute("region").is_some() {
                    "/regions/:region/dealers".to_string()
                } else {
                    "/dealers".to_string()
                }
            }),
        );

        assert_eq!(
            resolve(&descriptor, &owner, &record).unwrap(),
            "/regions/eu/dealers"
        );
    }

    #[test]
    fn test_missing_values_are_unresolved() {
        let owner = car_type();
        let record = car(json!({"name": "no id yet", "brand_id": null}));

        let wheels = AssociationDescriptor::has_many("wheels", "wheel");
        let brand = AssociationDescriptor::belongs_to("brand", "brand");
        let templated = AssociationDescriptor::has_one("engine", "engine").path("/engines/:serial");

        for descriptor in [&wheels, &brand, &templated] {
            let err = resolve(descriptor, &owner, &record).unwrap_err();
            assert!(err.is_unresolved(), "unexpected error: {err}");
            assert!(!is_resolvable(descriptor, &owner, &record).unwrap());
        }
    }

    #[test]
    fn test_foreign_key_on_wrong_kind_fails() {
        let owner = car_type();
        let record = car(json!({"id": 7}));
        let descriptor = AssociationDescriptor::has_one("engine", "engine").foreign_key("engine_id");

        let err = resolve(&descriptor, &owner, &record).unwrap_err();
        assert!(matches!(err, ResourceError::MissingForeignKey { .. }));
        assert!(is_resolvable(&descriptor, &owner, &record).is_err());
    }

    #[test]
    fn test_foreign_key_and_path_on_many_to_one() {
        let owner = car_type();
        let record = car(json!({"id": 7, "maker_id": 9}));

        let keyed = AssociationDescriptor::belongs_to("brand", "brand").foreign_key("maker_id");
        assert_eq!(resolve(&keyed, &owner, &record).unwrap(), "/brands/9");

        let pathed = keyed.clone().path("/makers/:maker_id/profile");
        assert_eq!(
            resolve(&pathed, &owner, &record).unwrap(),
            "/makers/9/profile"
        );
    }

    #[test]
    fn test_interpolation_keeps_bare_colons() {
        let record = car(json!({"id": 1, "slug": "mini"}));
        assert_eq!(
            interpolate("/cars/:slug/times/12:30/:id", &record).unwrap(),
            "/cars/mini/times/12:30/1"
        );
    }
}
