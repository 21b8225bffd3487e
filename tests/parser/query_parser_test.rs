#[cfg(test)]
mod tests {
    use domainql::error::DomainError;
    use domainql::expr::Expr;
    use domainql::model::{Domain, DomainRegistry};
    use domainql::parser::{ParseError, QueryParser};
    use domainql::sql::generate_sql;
    use domainql::types::{AggregateFunction, ExpressionType, Operator, ScalarType};
    use serde_json::json;

    fn registry() -> DomainRegistry {
        let mut registry = DomainRegistry::new();
        registry.register(
            Domain::new("company")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("name", ScalarType::String),
        );
        registry.register(
            Domain::new("person")
                .with_attribute("first_name", ScalarType::String)
                .with_attribute("salary", ScalarType::Integer)
                .with_attribute("company_id", ScalarType::Integer),
        );
        registry
            .add_reference("person", "works_for", "company_id", "company", "id")
            .unwrap();
        registry
    }

    fn salary_filter(operator: &str) -> serde_json::Value {
        json!({
            "name": "q",
            "from": "person",
            "where": {
                "type": "binary",
                "operator": operator,
                "left": { "type": "attribute", "path": "salary" },
                "right": { "type": "literal", "value": 50000 }
            }
        })
    }

    #[test]
    fn test_parse_and_generate() {
        let registry = registry();
        let json = r#"{
            "name": "wellPaid",
            "from": "person",
            "select": [
                { "alias": "employee", "expression": { "type": "attribute", "path": "first_name" } },
                { "alias": "employer", "expression": { "type": "attribute", "path": "works_for.name" } }
            ],
            "where": {
                "type": "binary",
                "operator": "GREATER_THAN",
                "left": { "type": "attribute", "path": "salary" },
                "right": { "type": "literal", "value": 50000 }
            }
        }"#;

        let query = QueryParser::new(&registry).parse_query(json).unwrap();
        assert_eq!(query.name(), "wellPaid");
        assert_eq!(
            generate_sql(&query).unwrap(),
            "SELECT person.first_name AS employee, works_for.name AS employer \
             FROM person JOIN company AS works_for ON (person.company_id = works_for.id) \
             WHERE (person.salary > 50000)"
        );
    }

    #[test]
    fn test_comparison_operators() {
        let registry = registry();
        let parser = QueryParser::new(&registry);
        let cases = [
            ("EQUALS", Operator::Equals),
            ("NOT_EQUALS", Operator::NotEquals),
            ("GREATER_THAN", Operator::GreaterThan),
            ("GREATER_THAN_OR_EQUALS", Operator::GreaterThanOrEquals),
            ("LESS_THAN", Operator::LessThan),
            ("LESS_THAN_OR_EQUALS", Operator::LessThanOrEquals),
            ("LIKE", Operator::Like),
            ("IN", Operator::In),
        ];

        for (name, operator) in cases {
            let query = parser.parse_value(salary_filter(name)).unwrap();
            match query.filter() {
                Some(Expr::Binary(binary)) => assert_eq!(binary.op(), operator, "{}", name),
                other => panic!("unexpected filter for {}: {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_logical_operators() {
        let registry = registry();
        let parser = QueryParser::new(&registry);
        for name in ["AND", "OR"] {
            let query = parser
                .parse_value(json!({
                    "name": "q",
                    "from": "person",
                    "where": {
                        "type": "binary",
                        "operator": name,
                        "left": {
                            "type": "binary",
                            "operator": "EQUALS",
                            "left": { "type": "attribute", "path": "first_name" },
                            "right": { "type": "literal", "value": "Ann" }
                        },
                        "right": {
                            "type": "binary",
                            "operator": "EQUALS",
                            "left": { "type": "attribute", "path": "works_for.name" },
                            "right": { "type": "literal", "value": "KMSF" }
                        }
                    }
                }))
                .unwrap();
            let sql = generate_sql(&query).unwrap();
            assert!(sql.contains(&format!(
                "WHERE ((person.first_name = 'Ann') {} (works_for.name = 'KMSF'))",
                name
            )));
        }
    }

    #[test]
    fn test_arithmetic_operators() {
        let registry = registry();
        let parser = QueryParser::new(&registry);
        let cases = [
            ("PLUS", "+", json!(1), ScalarType::Integer),
            ("MINUS", "-", json!(1), ScalarType::Integer),
            ("MULTIPLY", "*", json!(1.5), ScalarType::Decimal),
            ("DIVIDE", "/", json!(12), ScalarType::Integer),
        ];

        for (name, symbol, value, ty) in cases {
            let query = parser
                .parse_value(json!({
                    "name": "q",
                    "from": "person",
                    "select": [{
                        "alias": "adjusted",
                        "expression": {
                            "type": "binary",
                            "operator": name,
                            "left": { "type": "attribute", "path": "salary" },
                            "right": { "type": "literal", "value": value }
                        }
                    }]
                }))
                .unwrap();
            let projection = &query.projections()[0];
            assert_eq!(projection.expr().expr_type(), ExpressionType::Scalar(ty));
            assert_eq!(
                generate_sql(&query).unwrap(),
                format!(
                    "SELECT (person.salary {} {}) AS adjusted FROM person",
                    symbol, value
                )
            );
        }
    }

    #[test]
    fn test_aggregates() {
        let registry = registry();
        let query = QueryParser::new(&registry)
            .parse_value(json!({
                "name": "q",
                "from": "person",
                "select": [
                    { "alias": "employer", "expression": { "type": "attribute", "path": "works_for.name" } },
                    { "alias": "headcount", "expression": { "type": "aggregate", "function": "COUNT" } },
                    {
                        "alias": "average",
                        "expression": {
                            "type": "aggregate",
                            "function": "AVG",
                            "operand": { "type": "attribute", "path": "salary" }
                        }
                    }
                ]
            }))
            .unwrap();

        match query.projections()[1].expr() {
            Expr::Aggregate(aggregate) => {
                assert_eq!(aggregate.function(), AggregateFunction::Count);
                assert!(aggregate.operand().is_none());
            }
            other => panic!("unexpected projection {:?}", other),
        }
        assert_eq!(
            generate_sql(&query).unwrap(),
            "SELECT works_for.name AS employer, COUNT(*) AS headcount, AVG(person.salary) AS average \
             FROM person JOIN company AS works_for ON (person.company_id = works_for.id) \
             GROUP BY works_for.name"
        );
    }

    #[test]
    fn test_aggregate_other_than_count_needs_operand() {
        let registry = registry();
        let err = QueryParser::new(&registry)
            .parse_value(json!({
                "name": "q",
                "from": "person",
                "select": [{ "alias": "s", "expression": { "type": "aggregate", "function": "SUM" } }]
            }))
            .unwrap_err();
        assert!(matches!(err, ParseError::Domain(DomainError::TypeMismatch(_))));
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let registry = registry();
        let parser = QueryParser::new(&registry);

        let err = parser.parse_value(salary_filter("BETWEEN")).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));

        let err = parser
            .parse_value(json!({
                "name": "q",
                "from": "person",
                "select": [{ "alias": "m", "expression": { "type": "aggregate", "function": "MEDIAN" } }]
            }))
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));

        let err = parser
            .parse_value(json!({
                "name": "q",
                "from": "person",
                "select": [{ "alias": "x", "expression": { "type": "window", "path": "salary" } }]
            }))
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_untyped_literals_are_rejected() {
        let registry = registry();
        let parser = QueryParser::new(&registry);
        for value in [json!(null), json!([1]), json!({"a": 1})] {
            let err = parser
                .parse_value(json!({
                    "name": "q",
                    "from": "person",
                    "select": [{ "alias": "x", "expression": { "type": "literal", "value": value } }]
                }))
                .unwrap_err();
            assert!(matches!(
                err,
                ParseError::Domain(DomainError::UnsupportedLiteral(_))
            ));
        }
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let registry = registry();
        let query = QueryParser::new(&registry)
            .parse_value(json!({
                "name": "q",
                "from": "person",
                "description": "extra",
                "select": [{
                    "alias": "employee",
                    "comment": "ignored",
                    "expression": { "type": "attribute", "path": "first_name", "hint": 3 }
                }]
            }))
            .unwrap();
        assert_eq!(query.projections().len(), 1);
    }

    #[test]
    fn test_model_errors_surface() {
        let registry = registry();
        let parser = QueryParser::new(&registry);

        let err = parser
            .parse_query(r#"{ "name": "q", "from": "invoice" }"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::Domain(DomainError::UnknownDomain(_))));

        let err = parser
            .parse_query(
                r#"{ "name": "q", "from": "person",
                     "select": [{ "alias": "x", "expression": { "type": "attribute", "path": "works_for.ceo" } }] }"#,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Attribute 'ceo' not found in domain 'company'");

        let err = parser.parse_query("{ not json").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }
}
