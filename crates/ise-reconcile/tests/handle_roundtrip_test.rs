use ise_reconcile::ResourceHandle;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn identity_fields() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z_]{1,16}", ".{1,24}", 1..5)
}

proptest! {
    #[test]
    fn parse_inverts_join(fields in identity_fields()) {
        let handle = ResourceHandle::new(fields.clone()).unwrap();
        let parsed = ResourceHandle::parse(&handle.join()).unwrap();
        prop_assert_eq!(parsed.fields(), &fields);
    }

    #[test]
    fn delimiters_in_values_survive(name in "[a-z]{0,4}[;=%][a-z;=%]{0,8}") {
        let fields = BTreeMap::from([
            ("id".to_string(), "abc123".to_string()),
            ("name".to_string(), name),
        ]);
        let handle = ResourceHandle::new(fields.clone()).unwrap();
        let joined = handle.join();
        prop_assert_eq!(joined.matches(';').count(), 1);
        let parsed = ResourceHandle::parse(&joined).unwrap();
        prop_assert_eq!(parsed.fields(), &fields);
    }
}
