//! Configuration Unit Tests.
//!
//! Verifies defaults, JSON parsing with partial input, algorithm aliases,
//! write-drain thresholds, and validation errors.

use memsched_core::common::ConfigError;
use memsched_core::config::{Config, SchedAlgo};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.num_procs, 16);
    assert_eq!(config.memory.channel_bits, 1);
    assert_eq!(config.memory.bank_bits, 3);
    assert_eq!(config.memory.writeq_max, 64);
    assert_eq!(config.sched.algo, SchedAlgo::Bliss);
    assert_eq!(config.sched.wb_algo, SchedAlgo::FrFcfs);
    assert_eq!(config.sched.shuffle_cycles, 10_000);
    assert_eq!(config.sched.row_hit_cap, 4);
    assert!(!config.sched.omniscient);
    assert!(!config.sched.same_sched_algo);
    assert!(!config.sched.channel_level);
}

#[test]
fn empty_json_equals_defaults() {
    let config = Config::from_json("{}").expect("empty object is valid");
    let default = Config::default();
    assert_eq!(config.num_procs, default.num_procs);
    assert_eq!(config.memory.t_cas, default.memory.t_cas);
    assert_eq!(config.sched.shuffle_cycles, default.sched.shuffle_cycles);
}

// ══════════════════════════════════════════════════════════
// 2. Parsing
// ══════════════════════════════════════════════════════════

#[test]
fn partial_sections_keep_other_defaults() {
    let json = r#"{ "memory": { "writeq_max": 8 }, "sched": { "row_hit_cap": 2 } }"#;
    let config = Config::from_json(json).expect("valid config");
    assert_eq!(config.memory.writeq_max, 8);
    assert_eq!(config.memory.readq_max_per_bank, 64);
    assert_eq!(config.sched.row_hit_cap, 2);
    assert_eq!(config.sched.shuffle_cycles, 10_000);
}

#[rstest]
#[case("Fcfs", SchedAlgo::Fcfs)]
#[case("FCFS", SchedAlgo::Fcfs)]
#[case("FrFcfs", SchedAlgo::FrFcfs)]
#[case("FR-FCFS", SchedAlgo::FrFcfs)]
#[case("FRFCFS", SchedAlgo::FrFcfs)]
#[case("Bliss", SchedAlgo::Bliss)]
#[case("BLISS", SchedAlgo::Bliss)]
fn algorithm_names(#[case] name: &str, #[case] expected: SchedAlgo) {
    let json = format!(r#"{{ "sched": {{ "algo": "{name}", "wb_algo": "{name}" }} }}"#);
    let config = Config::from_json(&json).expect("known algorithm");
    assert_eq!(config.sched.algo, expected);
    assert_eq!(config.sched.wb_algo, expected);
}

#[test]
fn unknown_algorithm_is_a_parse_error() {
    let err = Config::from_json(r#"{ "sched": { "algo": "Lottery" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Config::from_json("{ num_procs: ").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
    assert!(err.to_string().starts_with("failed to parse configuration"));
}

// ══════════════════════════════════════════════════════════
// 3. Write-drain thresholds
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(64, 0.8, 0.5, 52, 32)]
#[case(8, 0.8, 0.5, 7, 4)]
#[case(1, 0.8, 0.5, 1, 0)]
#[case(10, 1.0, 1.0, 10, 9)]
#[case(10, 0.0, 0.0, 1, 0)]
fn drain_thresholds(
    #[case] writeq_max: usize,
    #[case] high: f64,
    #[case] low: f64,
    #[case] expected_high: usize,
    #[case] expected_low: usize,
) {
    let mut config = Config::default();
    config.memory.writeq_max = writeq_max;
    config.memory.wb_high_watermark = high;
    config.memory.wb_low_watermark = low;
    assert!(config.validate().is_ok());
    assert_eq!(config.memory.wb_high_threshold(), expected_high);
    assert_eq!(config.memory.wb_low_threshold(), expected_low);
    assert!(config.memory.wb_low_threshold() < config.memory.wb_high_threshold());
}

// ══════════════════════════════════════════════════════════
// 4. Validation
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(r#"{ "num_procs": 0 }"#, "num_procs")]
#[case(r#"{ "memory": { "writeq_max": 0 } }"#, "memory.writeq_max")]
#[case(r#"{ "memory": { "readq_max_per_bank": 0 } }"#, "memory.readq_max_per_bank")]
#[case(r#"{ "memory": { "wb_high_watermark": 1.5 } }"#, "memory.wb_high_watermark")]
#[case(r#"{ "memory": { "wb_high_watermark": 0.4, "wb_low_watermark": 0.6 } }"#, "memory.wb_low_watermark")]
#[case(r#"{ "memory": { "channel_bits": 30, "col_bits": 40 } }"#, "memory")]
#[case(r#"{ "memory": { "channel_bits": 4294967295 } }"#, "memory")]
#[case(r#"{ "memory": { "channel_bits": 30, "bank_bits": 20 } }"#, "memory")]
#[case(r#"{ "memory": { "channel_bits": 8, "rank_bits": 4, "bank_bits": 5 } }"#, "memory")]
#[case(r#"{ "sched": { "shuffle_cycles": 0 } }"#, "sched.shuffle_cycles")]
#[case(r#"{ "sched": { "row_hit_cap": 0 } }"#, "sched.row_hit_cap")]
fn invalid_values_name_their_field(#[case] json: &str, #[case] expected: &str) {
    match Config::from_json(json) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected invalid `{expected}`, got {other:?}"),
    }
}
