#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use domainql::model::{Attribute, Domain, DomainRegistry};
    use domainql::sql::{DomainPath, JoinContext};
    use domainql::types::ScalarType;

    fn registry() -> DomainRegistry {
        let mut registry = DomainRegistry::new();
        registry.register(
            Domain::new("employee")
                .with_attribute("id", ScalarType::Integer)
                .with_attribute("manager_id", ScalarType::Integer)
                .with_attribute("mentor_id", ScalarType::Integer)
                .with_attribute("buddy_id", ScalarType::Integer),
        );
        registry
            .add_reference("employee", "manager", "manager_id", "employee", "id")
            .unwrap();
        registry
            .add_reference("employee", "mentor", "mentor_id", "employee", "id")
            .unwrap();
        registry
            .add_reference("employee", "employee", "buddy_id", "employee", "id")
            .unwrap();
        registry
            .add_reference("employee", "manager_1", "buddy_id", "employee", "id")
            .unwrap();
        registry
    }

    fn hop(registry: &DomainRegistry, from: &Rc<DomainPath>, name: &str) -> Rc<DomainPath> {
        let reference: Arc<Attribute> = registry
            .domain("employee")
            .unwrap()
            .attribute(name)
            .unwrap()
            .clone();
        DomainPath::child(from, reference).unwrap()
    }

    #[test]
    fn test_root_is_bound_to_domain_name() {
        let mut joins = JoinContext::new();
        assert!(joins.is_empty());

        let root = DomainPath::root("employee".into(), "staff");
        assert_eq!(joins.get_or_create_alias(&root), "employee");
        assert!(root.is_root());
        assert_eq!(root.table(), "staff");
    }

    #[test]
    fn test_independent_builds_share_one_binding() {
        let registry = registry();
        let mut joins = JoinContext::new();
        let root = DomainPath::root("employee".into(), "employee");
        joins.get_or_create_alias(&root);

        let a = hop(&registry, &hop(&registry, &root, "manager"), "mentor");
        let b = hop(&registry, &hop(&registry, &root, "manager"), "mentor");
        assert_eq!(a, b);

        let first = joins.get_or_create_alias(&a);
        let second = joins.get_or_create_alias(&b);
        assert_eq!(first, second);
        assert_eq!(joins.len(), 2);

        // The intermediate hop was never registered on its own.
        assert_eq!(joins.alias(&hop(&registry, &root, "manager")), None);
    }

    #[test]
    fn test_reference_named_like_root_is_suffixed() {
        let registry = registry();
        let mut joins = JoinContext::new();
        let root = DomainPath::root("employee".into(), "employee");
        joins.get_or_create_alias(&root);

        let buddy = hop(&registry, &root, "employee");
        assert_eq!(joins.get_or_create_alias(&buddy), "employee_1");
    }

    #[test]
    fn test_suffix_counter_is_shared_across_bases() {
        let registry = registry();
        let mut joins = JoinContext::new();
        let root = DomainPath::root("employee".into(), "employee");
        joins.get_or_create_alias(&root);

        let manager = hop(&registry, &root, "manager");
        let mentor = hop(&registry, &root, "mentor");
        assert_eq!(joins.get_or_create_alias(&manager), "manager");
        assert_eq!(joins.get_or_create_alias(&mentor), "mentor");
        assert_eq!(
            joins.get_or_create_alias(&hop(&registry, &manager, "manager")),
            "manager_1"
        );
        assert_eq!(
            joins.get_or_create_alias(&hop(&registry, &mentor, "mentor")),
            "mentor_2"
        );
    }

    #[test]
    fn test_suffixed_alias_never_collides_with_existing_one() {
        let registry = registry();
        let mut joins = JoinContext::new();
        let root = DomainPath::root("employee".into(), "employee");
        joins.get_or_create_alias(&root);

        let manager = hop(&registry, &root, "manager");
        joins.get_or_create_alias(&manager);
        assert_eq!(
            joins.get_or_create_alias(&hop(&registry, &manager, "manager")),
            "manager_1"
        );

        // A reference literally named `manager_1` must not reuse that alias.
        let literal = hop(&registry, &root, "manager_1");
        assert_eq!(joins.get_or_create_alias(&literal), "manager_1_2");

        let mut aliases: Vec<_> = joins.iter().map(|(_, alias)| alias.to_string()).collect();
        let total = aliases.len();
        aliases.sort();
        aliases.dedup();
        assert_eq!(aliases.len(), total);
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = registry();
        let mut joins = JoinContext::new();
        let root = DomainPath::root("employee".into(), "employee");
        joins.get_or_create_alias(&root);
        joins.get_or_create_alias(&hop(&registry, &root, "mentor"));
        joins.get_or_create_alias(&hop(&registry, &root, "manager"));
        joins.get_or_create_alias(&hop(&registry, &root, "mentor"));

        let (path, alias) = joins.get(1).unwrap();
        assert_eq!(alias, "mentor");
        assert_eq!(path.depth(), 1);
        assert_eq!(joins.get(2).map(|(_, alias)| alias), Some("manager"));
        assert!(joins.get(3).is_none());
    }
}
