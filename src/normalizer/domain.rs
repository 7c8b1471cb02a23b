use super::ValueNormalizer;
use crate::context::Context;
use crate::domain::{Comparison, Domain};
use crate::error::DbalError;
use crate::schema::{ModelMetadata, Schema};
use crate::value::Value;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Turns criteria into the positional domain parameter of a search query
#[derive(Debug, Clone)]
pub struct CriteriaNormalizer {
    schema: Arc<Schema>,
    values: ValueNormalizer,
}

impl CriteriaNormalizer {
    pub fn new(schema: Arc<Schema>, values: ValueNormalizer) -> Self {
        Self { schema, values }
    }

    /// Normalize `criteria` into the search parameter list.
    ///
    /// Comparison values are converted through the type of the (possibly
    /// dotted) field they target. The shape of the result depends on the
    /// criteria:
    ///
    /// - none or empty: `[[]]`
    /// - a single comparison: `[[[field, op, value]]]`
    /// - a composite: `[[op, ...]]`
    pub fn normalize(
        &self,
        model: &ModelMetadata,
        criteria: Option<&Domain>,
        context: &Context,
    ) -> Result<Vec<JsonValue>, DbalError> {
        let Some(domain) = criteria.filter(|domain| !domain.is_empty()) else {
            return Ok(vec![json!([])]);
        };
        let normalized = domain.try_map(&mut |cmp: &Comparison| self.normalize_comparison(model, cmp, context))?;
        Ok(match normalized {
            Domain::Comparison(cmp) => vec![json!([cmp.to_array()])],
            composite => vec![composite.to_array()],
        })
    }

    fn normalize_comparison(
        &self,
        model: &ModelMetadata,
        cmp: &Comparison,
        context: &Context,
    ) -> Result<Comparison, DbalError> {
        let field = self.schema.get_field(&model.name, cmp.field())?;
        let wire = self.values.normalize_field_value(&field, cmp.value(), context)?;
        Ok(cmp.with_value(Value::from(wire)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{and_x, eq, in_, like, not_x, or_x};
    use crate::schema::{MemoryCache, SchemaError};
    use crate::test_helpers::partner_fixture;
    use crate::types::TypeConverter;

    fn setup() -> (CriteriaNormalizer, Arc<ModelMetadata>) {
        let schema = Arc::new(Schema::new(
            Arc::new(partner_fixture()),
            Arc::new(MemoryCache::new()),
            "dbal",
        ));
        let model = schema.get_model("res.partner").unwrap();
        let normalizer = CriteriaNormalizer::new(schema, ValueNormalizer::new(Arc::new(TypeConverter::default())));
        (normalizer, model)
    }

    #[test]
    fn test_empty_criteria() {
        let (normalizer, model) = setup();
        assert_eq!(normalizer.normalize(&model, None, &Context::new()).unwrap(), vec![json!([])]);
        let empty = Domain::from(and_x(Vec::<Domain>::new()));
        assert_eq!(
            normalizer.normalize(&model, Some(&empty), &Context::new()).unwrap(),
            vec![json!([])]
        );
    }

    #[test]
    fn test_single_comparison_is_wrapped_twice() {
        let (normalizer, model) = setup();
        let domain = Domain::from(eq("active", true));
        assert_eq!(
            normalizer.normalize(&model, Some(&domain), &Context::new()).unwrap(),
            vec![json!([["active", "=", true]])]
        );
    }

    #[test]
    fn test_composite_values_are_typed() {
        let (normalizer, model) = setup();
        let domain = Domain::from(or_x([
            Domain::from(eq("color", "3")),
            Domain::from(not_x([like("name", " Ac% ", true, false)])),
            Domain::from(in_("country_id", 1)),
        ]));
        assert_eq!(
            normalizer.normalize(&model, Some(&domain), &Context::new()).unwrap(),
            vec![json!([
                "|",
                "|",
                ["color", "=", 3],
                "!",
                ["name", "=ilike", "Ac%"],
                ["country_id", "in", [1]]
            ])]
        );
    }

    #[test]
    fn test_dotted_fields_use_target_type() {
        let (normalizer, model) = setup();
        let domain = Domain::from(eq("country_id.code", " BE "));
        assert_eq!(
            normalizer.normalize(&model, Some(&domain), &Context::new()).unwrap(),
            vec![json!([["country_id.code", "=", "BE"]])]
        );
    }

    #[test]
    fn test_unknown_field_fails() {
        let (normalizer, model) = setup();
        let domain = Domain::from(eq("missing", 1));
        let err = normalizer.normalize(&model, Some(&domain), &Context::new()).unwrap_err();
        assert!(matches!(err, DbalError::Schema(SchemaError::FieldNotFound { .. })));
    }
}
