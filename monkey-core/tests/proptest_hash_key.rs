// monkey-core - Property-based tests for hash-key consistency
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for the hash-key contract: equal hashable values
//! must produce equal keys, and keys carry the variant tag so equal bit
//! patterns from different variants never collide.

use monkey_core::Object;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn equal_integers_have_equal_keys(n in any::<i64>()) {
        let a = Object::Integer(n);
        let b = Object::Integer(n);
        prop_assert_eq!(a.hash_key(), b.hash_key());
    }

    #[test]
    fn integer_key_is_bit_pattern(n in any::<i64>()) {
        let key = Object::Integer(n).hash_key().unwrap();
        prop_assert_eq!(key.value, n as u64);
    }

    #[test]
    fn equal_strings_have_equal_keys(s in ".*") {
        let a = Object::string(s.clone());
        let b = Object::string(s);
        prop_assert_eq!(a.hash_key(), b.hash_key());
    }

    #[test]
    fn string_and_integer_keys_never_collide(n in any::<i64>(), s in ".*") {
        let int_key = Object::Integer(n).hash_key().unwrap();
        let string_key = Object::string(s).hash_key().unwrap();
        prop_assert_ne!(int_key, string_key);
    }

    #[test]
    fn hash_values_survive_round_trip(n in -1000i64..1000) {
        // Insert under an integer key, read it back through the same key.
        let program = format!("let h = {{{}: 99}}; h[{}]", n, n);
        let result = {
            use monkey_core::{eval_program, Env};
            let mut parser = monkey_parser::Parser::from_source(&program);
            let parsed = parser.parse_program();
            prop_assert!(parser.errors().is_empty());
            eval_program(&parsed, &Env::new())
        };
        prop_assert_eq!(result, Object::Integer(99));
    }
}
