//! Property Tests for Feature Assembly
//!
//! Validation and one-hot behaviour over arbitrary inputs.

#[cfg(test)]
mod property_tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::logic::features::{
        layout::{CONTINUOUS_COUNT, CONTINUOUS_FIELDS},
        FeatureRecord, ModelInput, RawInput, Species,
    };

    fn arbitrary_species() -> impl Strategy<Value = Species> {
        prop_oneof![Just(Species::Cat), Just(Species::Dog)]
    }

    fn finite_values() -> impl Strategy<Value = [f64; CONTINUOUS_COUNT]> {
        prop::collection::vec(-1.0e6f64..1.0e6, CONTINUOUS_COUNT)
            .prop_map(|v| std::array::from_fn(|i| v[i]))
    }

    proptest! {
        #[test]
        fn prop_missing_fields_named_exactly(
            values in finite_values(),
            absent in prop::sample::subsequence(CONTINUOUS_FIELDS.to_vec(), 1..=CONTINUOUS_COUNT),
            species in arbitrary_species(),
        ) {
            let mut raw = RawInput::from_values(values);
            for name in &absent {
                raw.clear(name);
            }

            let err = FeatureRecord::validate(&raw, species).unwrap_err();
            let reported: BTreeSet<String> = err.fields.into_iter().collect();
            let expected: BTreeSet<String> =
                absent.iter().map(|name| name.to_string()).collect();
            prop_assert_eq!(reported, expected);
        }

        #[test]
        fn prop_complete_input_always_validates(
            values in finite_values(),
            species in arbitrary_species(),
        ) {
            let record = FeatureRecord::validate(&RawInput::from_values(values), species);
            prop_assert!(record.is_ok());
            let record = record.unwrap();
            prop_assert_eq!(record.continuous(), &values);
        }

        #[test]
        fn prop_species_flags_exactly_one(
            values in finite_values(),
            species in arbitrary_species(),
        ) {
            let input = ModelInput::from_record(&FeatureRecord::new(values, species));
            let cat = input.get_by_name("species_is_cat").unwrap();
            let dog = input.get_by_name("species_is_dog").unwrap();
            prop_assert_eq!(cat + dog, 1.0);
            prop_assert!(cat == 0.0 || cat == 1.0);
        }
    }
}
