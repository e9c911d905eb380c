//! Property-based tests for the wrapper algebra, naming and policy.
//!
//! These check laws that must hold for any input rather than for a fixed
//! corpus:
//! 1. Full unwrapping is idempotent and flattening round-trips
//! 2. Names are deterministic and injective within a role
//! 3. Generation selection is monotone in `generate_all`

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use schemagen::GeneratorConfig;
use schemagen::ir::{Directive, DirectiveSet, TypeRef, Value};
use schemagen::naming::{NameRole, Namer, NamingKey};
use schemagen::policy::{GENERATE, REPRESENTATION, REPRESENTATION_TYPE, RESOLVER, should_generate};
use schemagen::wrapping::{base_name, layers, rewrap, unwrap_full};

// -- Strategies --

/// A schema type name: one capitalized word
fn type_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-z]{0,8}").expect("valid regex")
}

/// A well-formed type reference: non-null never wraps non-null
fn type_ref_strategy() -> impl Strategy<Value = TypeRef> {
    (
        type_name_strategy(),
        any::<bool>(),
        prop::collection::vec(any::<bool>(), 0..4),
    )
        .prop_map(|(name, base_non_null, lists)| {
            let mut ty = TypeRef::named(name);
            if base_non_null {
                ty = ty.non_null();
            }
            for non_null in lists {
                ty = ty.list();
                if non_null {
                    ty = ty.non_null();
                }
            }
            ty
        })
}

fn directives(generate: bool, resolver: bool, represented: bool) -> DirectiveSet {
    let mut set = DirectiveSet::default();
    if generate {
        set.insert(Directive::new(GENERATE));
    }
    if resolver {
        set.insert(Directive::new(RESOLVER));
    }
    if represented {
        set.insert(
            Directive::new(REPRESENTATION).with_argument(REPRESENTATION_TYPE, Value::string("ext::Type")),
        );
    }
    set
}

// -- Properties --

proptest! {
    #[test]
    fn unwrap_full_is_idempotent(ty in type_ref_strategy()) {
        let once = unwrap_full(&ty);
        prop_assert_eq!(unwrap_full(once), once);
        prop_assert!(matches!(once, TypeRef::Named(_)));
        prop_assert_eq!(once, &TypeRef::named(base_name(&ty)));
    }

    #[test]
    fn layers_round_trip(ty in type_ref_strategy()) {
        let flat = layers(&ty);
        prop_assert_eq!(rewrap(&flat), Some(ty.clone()));
        prop_assert_eq!(flat.iter().filter(|l| !l.is_modifier()).count(), 1);
    }

    #[test]
    fn naming_is_deterministic(
        container in type_name_strategy(),
        field in type_name_strategy(),
        prefix in prop::option::of("[A-Z]{1,3}"),
    ) {
        let mut config = GeneratorConfig::new();
        if let Some(prefix) = prefix {
            config = config.name_prefix(prefix);
        }
        let key = NamingKey::for_field(NameRole::FieldResolver, container, field);

        let first = Namer::new(&config).name(&key).unwrap();
        let second = Namer::new(&config).name(&key).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(Namer::new(&config).compose(&key), first);
    }

    #[test]
    fn naming_is_injective_within_a_role(
        a in (type_name_strategy(), type_name_strategy()),
        b in (type_name_strategy(), type_name_strategy()),
    ) {
        prop_assume!(a != b);
        let namer = Namer::new(&GeneratorConfig::new());

        let first = namer.name(&NamingKey::for_field(NameRole::FieldResolver, &a.0, &a.1)).unwrap();
        let second = namer.name(&NamingKey::for_field(NameRole::FieldResolver, &b.0, &b.1)).unwrap();
        prop_assert_ne!(first, second);
    }

    #[test]
    fn generate_all_only_widens_selection(
        generate in any::<bool>(),
        resolver in any::<bool>(),
        represented in any::<bool>(),
    ) {
        let set = directives(generate, resolver, represented);
        let without = should_generate("Node", &set, false).unwrap();
        let with = should_generate("Node", &set, true).unwrap();

        prop_assert!(!without || with);
        prop_assert_eq!(with, !represented);
        if represented {
            prop_assert!(!without);
        }
    }
}
