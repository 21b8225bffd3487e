#[cfg(test)]
mod tests {
    use domainql::error::DomainError;
    use domainql::expr::{Expr, ExpressionBuilder as E};
    use domainql::model::{resolve_path, Domain, DomainRegistry, Query, QueryBuilder};
    use domainql::types::{ExpressionType, ScalarType, SourceType};

    /// country <- city <- address <- person -> company -> address
    fn registry() -> DomainRegistry {
        let mut registry = DomainRegistry::new();
        registry.register(
            Domain::new("country")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("name", ScalarType::String),
        );
        registry.register(
            Domain::new("city")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("name", ScalarType::String)
                .with_attribute("country_id", ScalarType::Integer),
        );
        registry.register(
            Domain::new("address")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("street", ScalarType::String)
                .with_attribute("city_id", ScalarType::Integer),
        );
        registry.register(
            Domain::new("company")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("name", ScalarType::String)
                .with_attribute("address_id", ScalarType::Integer),
        );
        registry.register(
            Domain::new("person")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("first_name", ScalarType::String)
                .with_attribute("salary", ScalarType::Integer)
                .with_attribute("company_id", ScalarType::Integer),
        );
        registry
            .add_reference("city", "country", "country_id", "country", "id")
            .unwrap();
        registry
            .add_reference("address", "city", "city_id", "city", "id")
            .unwrap();
        registry
            .add_reference("company", "address", "address_id", "address", "id")
            .unwrap();
        registry
            .add_reference("person", "works_for", "company_id", "company", "id")
            .unwrap();
        registry
    }

    #[test]
    fn test_deep_path_keeps_root_scope() {
        let registry = registry();
        let person = registry.domain("person").unwrap();

        let expr = resolve_path(&registry, person, "works_for.address.city.country.name").unwrap();
        assert_eq!(expr.navigation_depth(), 4);
        assert_eq!(expr.expr_type(), ExpressionType::Scalar(ScalarType::String));
        assert_eq!(expr.source(), Some(SourceType::domain("person".into())));

        match expr.terminal() {
            Expr::Attribute(access) => assert_eq!(access.attribute().domain().as_str(), "country"),
            other => panic!("unexpected terminal {:?}", other),
        }
    }

    #[test]
    fn test_path_ending_in_reference_is_domain_typed() {
        let registry = registry();
        let person = registry.domain("person").unwrap();
        let expr = resolve_path(&registry, person, "works_for.address").unwrap();
        assert!(expr.expr_type().is_domain());
    }

    #[test]
    fn test_path_errors_name_the_segment() {
        let registry = registry();
        let person = registry.domain("person").unwrap();

        let err = resolve_path(&registry, person, "works_for.address.zip").unwrap_err();
        assert_eq!(err, DomainError::unknown_attribute("address", "zip"));

        let err = resolve_path(&registry, person, "works_for.name.length").unwrap_err();
        assert_eq!(
            err,
            DomainError::NotAReference {
                domain: "company".into(),
                attribute: "name".into(),
            }
        );

        let err = resolve_path(&registry, person, "").unwrap_err();
        assert!(matches!(err, DomainError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_projections_keep_declaration_order() {
        let registry = registry();
        let query = QueryBuilder::from(&registry, "people", "person")
            .select_as("name", "first_name")
            .select_as("employer", "works_for.name")
            .select_expr("headcount", E::count_all())
            .build()
            .unwrap();

        let aliases: Vec<_> = query.projections().iter().map(|p| p.alias()).collect();
        assert_eq!(aliases, vec!["name", "employer", "headcount"]);
        assert!(query.projections()[2].is_aggregate());
        assert_eq!(query.source_domain().as_str(), "person");
    }

    #[test]
    fn test_realiasing_replaces_in_place() {
        let registry = registry();
        let query = QueryBuilder::from(&registry, "people", "person")
            .select_as("label", "first_name")
            .select_as("employer", "works_for.name")
            .select_as("label", "works_for.address.street")
            .build()
            .unwrap();

        assert_eq!(query.projections().len(), 2);
        assert_eq!(query.projections()[0].alias(), "label");
        assert_eq!(query.projections()[0].expr().navigation_depth(), 2);
    }

    #[test]
    fn test_query_as_domain() {
        let registry = registry();
        let query = QueryBuilder::from(&registry, "payroll", "person")
            .select_as("employer", "works_for.name")
            .select_expr("total", E::sum(E::attr("salary")))
            .build()
            .unwrap();

        let domain = query.as_domain();
        assert_eq!(domain.name(), "payroll");
        assert_eq!(
            domain.attribute("employer").unwrap().expr_type(),
            ExpressionType::Scalar(ScalarType::String)
        );
        assert_eq!(
            domain.attribute("total").unwrap().expr_type(),
            ExpressionType::Aggregate(ScalarType::Decimal)
        );
    }

    #[test]
    fn test_filters_are_anded() {
        let registry = registry();
        let query = QueryBuilder::from(&registry, "q", "person")
            .where_(E::gt_value("salary", 50000))
            .where_(E::eq_value("works_for.name", "KMSF"))
            .build()
            .unwrap();

        match query.filter() {
            Some(Expr::Binary(binary)) => {
                assert_eq!(binary.op(), domainql::types::Operator::And);
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_filter_must_be_boolean() {
        let registry = registry();
        let err = QueryBuilder::from(&registry, "q", "person")
            .where_(E::plus(E::attr("salary"), E::literal(1)))
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::TypeMismatch(_)));
    }

    #[test]
    fn test_projection_from_foreign_domain_is_rejected() {
        let registry = registry();
        let company = registry.domain("company").unwrap();
        let foreign = resolve_path(&registry, company, "name").unwrap();

        let mut query = Query::new("q", registry.domain("person").unwrap());
        let err = query.add_projection("company_name", foreign).unwrap_err();
        assert!(matches!(err, DomainError::InvalidProjection { .. }));
        assert!(query.projections().is_empty());
    }

    #[test]
    fn test_constant_projection_is_allowed() {
        let registry = registry();
        let query = QueryBuilder::from(&registry, "q", "person")
            .select_expr("one", E::literal(1))
            .build()
            .unwrap();
        assert_eq!(query.projections()[0].expr().source(), None);
    }

    #[test]
    fn test_unregistered_source_domain() {
        let registry = registry();
        let adhoc = Domain::new("person")
            .with_table("people_v2")
            .with_attribute("first_name", ScalarType::String);
        let query = QueryBuilder::over(&registry, "q", &adhoc)
            .select("first_name")
            .build()
            .unwrap();
        assert_eq!(query.source_table(), "people_v2");
    }
}
