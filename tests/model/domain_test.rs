#[cfg(test)]
mod tests {
    use domainql::error::{DomainError, ErrorKind};
    use domainql::expr::{ContextResolution, Expr};
    use domainql::model::{AttributeKind, Domain, DomainRegistry, Relation};
    use domainql::types::{DomainType, ExpressionType, Operator, ScalarType, SourceType};

    fn shop() -> DomainRegistry {
        let mut registry = DomainRegistry::new();
        registry.register(
            Domain::new("customer")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("name", ScalarType::String),
        );
        registry.register(
            Domain::new("order")
                .with_table("orders")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("customer_id", ScalarType::Integer)
                .with_attribute("total", ScalarType::Decimal),
        );
        registry
    }

    fn attr(registry: &DomainRegistry, domain: &str, name: &str) -> Expr {
        Expr::attribute(
            registry
                .domain(domain)
                .unwrap()
                .attribute(name)
                .unwrap()
                .clone(),
        )
    }

    #[test]
    fn test_attributes_are_owned_by_their_domain() {
        let registry = shop();
        let order = registry.domain("order").unwrap();
        assert_eq!(order.table(), "orders");

        let total = order.attribute("total").unwrap();
        assert_eq!(total.domain().as_str(), "order");
        assert_eq!(total.expr_type(), ExpressionType::Scalar(ScalarType::Decimal));
        assert!(!total.is_reference());

        let names: Vec<_> = order.attributes().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["customer_id", "id", "total"]);
    }

    #[test]
    fn test_unknown_lookups() {
        let registry = shop();
        let err = registry.domain("invoice").unwrap_err();
        assert_eq!(err, DomainError::UnknownDomain("invoice".into()));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = registry.domain("order").unwrap().attribute("discount").unwrap_err();
        assert_eq!(err, DomainError::unknown_attribute("order", "discount"));
        assert!(err.to_string().contains("discount"));
        assert!(err.to_string().contains("order"));
    }

    #[test]
    fn test_reference_evaluates_to_target_domain() {
        let mut registry = shop();
        let reference = registry
            .add_reference("order", "placed_by", "customer_id", "customer", "id")
            .unwrap();

        assert_eq!(
            reference.expr_type(),
            ExpressionType::Domain(DomainType::new("customer".into()))
        );
        let target = reference.as_reference().unwrap();
        assert_eq!(target.target().as_str(), "customer");
        assert_eq!(target.target_table(), "customer");

        let condition = target.join_condition();
        assert_eq!(condition.expr_type(), ExpressionType::BOOLEAN);
        match condition.source() {
            Some(SourceType::CrossDomain(cross)) => {
                assert!(cross.pairs(&"order".into(), &"customer".into()));
            }
            other => panic!("unexpected source {:?}", other),
        }

        // The reference is visible through the registry.
        assert!(registry
            .domain("order")
            .unwrap()
            .attribute("placed_by")
            .unwrap()
            .is_reference());
    }

    #[test]
    fn test_self_reference_tags_both_sides() {
        let mut employee = Domain::new("employee")
            .with_attribute("id", ScalarType::Integer)
            .with_attribute("manager_id", ScalarType::Integer);
        let manager = employee
            .add_self_reference("manager", "manager_id", "id")
            .unwrap();

        let condition = manager.as_reference().unwrap().join_condition();
        match condition {
            Expr::Binary(binary) => {
                let sides: Vec<_> = [binary.left(), binary.right()]
                    .into_iter()
                    .map(|side| match side {
                        Expr::Attribute(access) => access.context(),
                        other => panic!("unexpected operand {:?}", other),
                    })
                    .collect();
                assert_eq!(
                    sides,
                    vec![ContextResolution::Left, ContextResolution::Right]
                );
            }
            other => panic!("unexpected condition {:?}", other),
        }
        assert_eq!(
            condition.source(),
            Some(SourceType::domain("employee".into()))
        );
    }

    #[test]
    fn test_join_condition_must_be_boolean() {
        let registry = shop();
        let not_boolean = Expr::binary(
            attr(&registry, "order", "customer_id"),
            Operator::Plus,
            attr(&registry, "customer", "id"),
        )
        .unwrap();

        let mut order = registry.domain("order").unwrap().clone();
        let err = order
            .add_reference_with_condition("customer", "customer".into(), "customer", not_boolean)
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch(_)));
    }

    #[test]
    fn test_join_condition_must_pair_both_domains() {
        let registry = shop();
        let one_sided = Expr::binary(
            attr(&registry, "order", "customer_id"),
            Operator::Equals,
            Expr::literal(1),
        )
        .unwrap();

        let mut order = registry.domain("order").unwrap().clone();
        let err = order
            .add_reference_with_condition("customer", "customer".into(), "customer", one_sided)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidJoinCondition { .. }));
        assert_eq!(err.kind(), ErrorKind::StructuralInvalid);
        assert!(!order.has_attribute("customer"));
    }

    #[test]
    fn test_calculated_attribute() {
        let mut registry = shop();
        let total = attr(&registry, "order", "total");
        let with_tax = Expr::binary(total, Operator::Multiply, Expr::literal(1.2)).unwrap();
        let foreign = attr(&registry, "customer", "name");

        let order = registry.domain_mut("order").unwrap();
        let gross = order.add_calculated_attribute("gross", with_tax).unwrap();
        assert_eq!(gross.expr_type(), ExpressionType::Scalar(ScalarType::Decimal));
        assert!(matches!(gross.kind(), AttributeKind::Plain { .. }));

        let err = order
            .add_calculated_attribute("customer_name", foreign)
            .unwrap_err();
        assert!(matches!(err, DomainError::IncompatibleSources(_)));
    }

    #[test]
    fn test_relations() {
        let mut registry = shop();
        let condition = Expr::binary(
            attr(&registry, "order", "customer_id"),
            Operator::Equals,
            attr(&registry, "customer", "id"),
        )
        .unwrap();
        let relation = Relation::new("order".into(), "customer".into(), condition.clone()).unwrap();
        registry.register_relation(relation).unwrap();

        assert_eq!(registry.relations().len(), 1);
        assert_eq!(registry.relations_for_domain("customer").len(), 1);
        assert!(registry.relations_for_domain("invoice").is_empty());

        let dangling = Relation::new("order".into(), "invoice".into(), condition);
        assert!(dangling.is_err());
    }

    #[test]
    fn test_registry_json() {
        let mut registry = shop();
        registry
            .add_reference("order", "customer", "customer_id", "customer", "id")
            .unwrap();

        let json = registry.to_json();
        let domains = json["domains"].as_array().unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0]["name"], "customer");
        assert_eq!(domains[1]["table"], "orders");

        let attributes = domains[1]["attributes"].as_array().unwrap();
        let reference = attributes
            .iter()
            .find(|a| a["name"] == "customer")
            .unwrap();
        assert_eq!(reference["target"], "customer");
        let total = attributes.iter().find(|a| a["name"] == "total").unwrap();
        assert_eq!(total["type"], "DECIMAL");
        assert_eq!(total["column"], "total");
    }
}
