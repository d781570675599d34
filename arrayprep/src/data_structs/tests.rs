mod array_tests {
    use rstest::rstest;

    use crate::data_structs::arrays::ArrayType;
    use crate::error::PipelineError;

    #[rstest]
    #[case::scanner_450k(622_000, ArrayType::Hm450k)]
    #[case::scanner_450k_upper(623_000, ArrayType::Hm450k)]
    #[case::manifest_450k(485_578, ArrayType::Hm450k)]
    #[case::scanner_epic(1_051_815, ArrayType::Epic)]
    #[case::manifest_epic(865_919, ArrayType::Epic)]
    #[case::epic_plus(1_055_583, ArrayType::EpicPlus)]
    fn test_resolution(
        #[case] probe_count: usize,
        #[case] expected: ArrayType,
    ) {
        assert_eq!(ArrayType::from_probe_count(probe_count).unwrap(), expected);
    }

    #[test]
    fn test_unsupported_27k_named() {
        let err = ArrayType::from_probe_count(55_000).unwrap_err();
        match err {
            PipelineError::UnsupportedArray { name } => {
                assert!(name.contains("27k"))
            },
            other => panic!("expected UnsupportedArray, got {:?}", other),
        }
    }

    #[rstest]
    #[case(0)]
    #[case(100)]
    #[case(53_999)]
    #[case(56_001)]
    #[case(483_999)]
    #[case(487_001)]
    #[case(621_999)]
    #[case(623_001)]
    #[case(862_999)]
    #[case(867_001)]
    #[case(1_049_999)]
    #[case(1_053_001)]
    #[case(1_055_582)]
    #[case(1_055_584)]
    #[case(2_000_000)]
    fn test_unknown_counts(#[case] probe_count: usize) {
        let err = ArrayType::from_probe_count(probe_count).unwrap_err();
        match err {
            PipelineError::UnknownArray { probe_count: reported } => {
                assert_eq!(reported, probe_count)
            },
            other => panic!("expected UnknownArray, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(ArrayType::Hm450k.num_probes(), Some(485_578));
        assert_eq!(ArrayType::Hm450k.num_controls(), Some(850));
        assert_eq!(ArrayType::Epic.num_probes(), Some(865_919));
        assert_eq!(ArrayType::Epic.num_controls(), Some(635));
        assert_eq!(ArrayType::EpicPlus.num_probes(), Some(868_699));
        assert_eq!(ArrayType::EpicPlus.num_controls(), Some(635));
        // The custom layout has no fixed shape and no failure either.
        assert_eq!(ArrayType::Custom.num_probes(), None);
        assert_eq!(ArrayType::Custom.num_controls(), None);
    }

    #[test]
    fn test_epic_scenario() {
        let resolved = ArrayType::from_probe_count(865_919).unwrap();
        assert_eq!(resolved, ArrayType::Epic);
        assert_eq!(resolved.num_probes(), Some(865_919));
        assert_eq!(resolved.num_controls(), Some(635));
    }

    #[test]
    fn test_names_roundtrip() {
        for array_type in [
            ArrayType::Custom,
            ArrayType::Hm450k,
            ArrayType::Epic,
            ArrayType::EpicPlus,
        ] {
            assert_eq!(
                ArrayType::from_name(array_type.as_str()),
                Some(array_type)
            );
        }
        assert_eq!(ArrayType::from_name("EPIC"), Some(ArrayType::Epic));
        assert_eq!(ArrayType::from_name("27k"), None);
    }
}

mod product_tests {
    use crate::data_structs::products::ProductKind;
    use crate::pipeline::registry::StepKind;

    #[test]
    fn test_catalog_names() {
        for kind in ProductKind::ALL {
            assert_eq!(ProductKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ProductKind::from_name("nonexistent"), None);
    }

    #[test]
    fn test_seeded_products_have_no_producer() {
        for kind in ProductKind::ALL {
            if kind.is_seeded() {
                assert_eq!(StepKind::producer_of(kind), None);
            }
            else {
                assert!(
                    StepKind::producer_of(kind).is_some(),
                    "product '{}' has no producing step",
                    kind
                );
            }
        }
    }

    #[test]
    fn test_each_product_has_one_producer() {
        for kind in ProductKind::ALL {
            let producers = StepKind::ALL
                .iter()
                .filter(|step| step.produces().contains(&kind))
                .count();
            if kind.is_seeded() {
                assert_eq!(producers, 0);
            }
            else {
                assert_eq!(producers, 1, "product '{}'", kind);
            }
        }
    }

    #[test]
    fn test_ladder_orders_raw_to_dye() {
        let ladder = ProductKind::intensity_ladder();
        assert_eq!(ladder[0], [
            ProductKind::MethValues,
            ProductKind::UnmethValues
        ]);
        assert_eq!(ladder[3], [
            ProductKind::DyeMethValues,
            ProductKind::DyeUnmethValues
        ]);
        for pair in ladder {
            assert!(pair.iter().all(ProductKind::is_matrix));
        }
    }
}

mod sample_tests {
    use polars::prelude::*;

    use crate::data_structs::arrays::ArrayType;
    use crate::data_structs::sample::{
        Sample,
        SampleBatch,
    };
    use crate::error::PipelineError;

    fn sample(
        id: &str,
        len: usize,
    ) -> Sample {
        let values: Vec<f64> = (0..len).map(|value| value as f64).collect();
        Sample::new(
            id.to_string(),
            "R01C01".to_string(),
            None,
            Series::new("grn".into(), &values),
            Series::new("red".into(), &values),
            Sample::empty_controls(),
        )
    }

    fn probe_ids(len: usize) -> Series {
        let ids: Vec<String> = (0..len).map(|idx| format!("cg{:06}", idx)).collect();
        Series::new("probe_id".into(), ids)
    }

    #[test]
    fn test_override_skips_resolution() {
        // Twenty probes match no physical layout, the override keeps it valid.
        let batch = SampleBatch::try_new(
            probe_ids(20),
            vec![sample("1001", 20)],
            DataFrame::empty(),
            Some(ArrayType::Custom),
        )
        .unwrap();
        assert_eq!(batch.array_type(), ArrayType::Custom);
        assert_eq!(batch.n_samples(), 1);
    }

    #[test]
    fn test_unknown_count_without_override() {
        let err = SampleBatch::try_new(
            probe_ids(20),
            vec![sample("1001", 20)],
            DataFrame::empty(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownArray {
            probe_count: 20
        }));
    }

    #[test]
    fn test_channel_length_mismatch() {
        let err = SampleBatch::try_new(
            probe_ids(20),
            vec![sample("1001", 19)],
            DataFrame::empty(),
            Some(ArrayType::Custom),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Ingest { .. }));
    }

    #[test]
    fn test_identifier_format() {
        assert_eq!(sample("9247377085", 5).identifier(), "9247377085_R01C01");
    }
}
