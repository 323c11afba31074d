use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;

use hyperparam_report::stats::{max, mean, median, ratio};
use hyperparam_report::{
    format_stat, group_runs, render_json, render_tsv, summarize, CellStats, HyperparamTable,
    RunOutput, RunRecord, Satisfaction,
};

fn completed(hyperparams: &str, program: &str, satisfaction: f64, codelets: f64) -> RunRecord {
    RunRecord {
        output: RunOutput::Completed(json!("output text")),
        satisfaction: Satisfaction::Scored(satisfaction),
        codelets_run: Some(codelets),
        ..RunRecord::new(hyperparams, program)
    }
}

fn timed_out(hyperparams: &str, program: &str, satisfaction: f64, codelets: f64) -> RunRecord {
    RunRecord {
        output: RunOutput::TimedOut,
        ..completed(hyperparams, program, satisfaction, codelets)
    }
}

fn unscored(hyperparams: &str, program: &str) -> RunRecord {
    RunRecord {
        output: RunOutput::TimedOut,
        ..RunRecord::new(hyperparams, program)
    }
}

#[test]
fn empty_aggregates_are_nan() {
    assert!(mean(&[]).is_nan());
    assert!(median(&[]).is_nan());
    assert!(max(&[]).is_nan());
    assert!(ratio(0, 0).is_nan());
}

#[test]
fn median_averages_middle_pair() {
    assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < 1e-12);
    assert!((median(&[5.0, 1.0, 3.0]) - 3.0).abs() < 1e-12);
}

#[test]
fn nan_propagates_through_aggregates() {
    let values = [1.0, f64::NAN, 3.0];
    assert!(mean(&values).is_nan());
    assert!(median(&values).is_nan());
    assert!(max(&values).is_nan());
}

#[test]
fn single_program_statistics_propagate_through_summary() {
    let runs = vec![
        completed("hp", "prog", 2.0, 10.0),
        completed("hp", "prog", 4.0, 20.0),
        completed("hp", "prog", 6.0, 30.0),
    ];

    let table = HyperparamTable::from_runs(&runs);
    let cell = table.cell("hp", "prog").expect("cell");
    assert_eq!(cell.mean_satisfaction, 4.0);
    assert_eq!(cell.median_satisfaction, 4.0);
    assert_eq!(cell.max_satisfaction, 6.0);
    assert_eq!(cell.mean_run_length, 20.0);
    assert_eq!(cell.median_run_length, 20.0);
    assert_eq!(cell.timeout_rate, 0.0);
    assert_eq!(cell.non_null_satisfaction, vec![2.0, 4.0, 6.0]);

    let summaries = summarize(&table);
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.hyperparams_id, "hp");
    assert_eq!(summary.mean_satisfaction, 4.0);
    assert_eq!(summary.median_satisfaction, 4.0);
    assert_eq!(summary.mean_max_satisfaction, 6.0);
    assert_eq!(summary.median_max_satisfaction, 6.0);
    assert_eq!(summary.mean_run_length, 20.0);
    assert_eq!(summary.median_run_length, 20.0);
    assert_eq!(summary.mean_timeout_rate, 0.0);
    assert_eq!(summary.median_timeout_rate, 0.0);
    assert_eq!(summary.mean_non_null_satisfaction, 4.0);
    assert_eq!(summary.median_non_null_satisfaction, 4.0);
    assert_eq!(summary.program_count, 1);

    assert_eq!(render_tsv(&summaries), "hp\t4\t4\t6\t6\t20\t20\t0\t0\t4\t4\n");
}

#[test]
fn pooled_satisfaction_weighs_runs_not_programs() {
    let runs = vec![
        completed("hp", "p1", 1.0, 10.0),
        completed("hp", "p1", 2.0, 10.0),
        completed("hp", "p2", 3.0, 10.0),
    ];

    let summaries = summarize(&HyperparamTable::from_runs(&runs));
    let summary = &summaries[0];

    assert!((summary.mean_non_null_satisfaction - 2.0).abs() < 1e-12);
    assert!((summary.median_non_null_satisfaction - 2.0).abs() < 1e-12);
    // per-program means are 1.5 and 3.0, each program counting once
    assert!((summary.mean_satisfaction - 2.25).abs() < 1e-12);
}

#[test]
fn median_fields_take_median_of_program_medians() {
    let runs = vec![
        completed("hp", "p1", 1.0, 5.0),
        completed("hp", "p1", 9.0, 15.0),
        completed("hp", "p2", 2.0, 100.0),
        completed("hp", "p3", 7.0, 1.0),
    ];

    let summary = &summarize(&HyperparamTable::from_runs(&runs))[0];

    // program medians 5, 2, 7
    assert_eq!(summary.median_satisfaction, 5.0);
    // program maxima 9, 2, 7
    assert_eq!(summary.median_max_satisfaction, 7.0);
    assert_eq!(summary.mean_max_satisfaction, 6.0);
    // program run length medians 10, 100, 1
    assert_eq!(summary.median_run_length, 10.0);
}

#[test]
fn all_timeouts_still_produce_satisfaction_stats() {
    let runs = vec![
        timed_out("hp", "prog", 0.2, 100.0),
        timed_out("hp", "prog", 0.4, 300.0),
    ];

    let cell = CellStats::from_runs(&runs);
    assert_eq!(cell.timeout_rate, 1.0);
    assert!(cell.non_null_satisfaction.is_empty());
    assert!((cell.mean_satisfaction - 0.3).abs() < 1e-12);
    assert_eq!(cell.max_satisfaction, 0.4);
    assert_eq!(cell.mean_run_length, 200.0);

    let summary = &summarize(&HyperparamTable::from_runs(&runs))[0];
    assert_eq!(summary.mean_timeout_rate, 1.0);
    assert!(summary.mean_non_null_satisfaction.is_nan());
    assert!(summary.median_non_null_satisfaction.is_nan());
}

#[test]
fn unscored_runs_yield_undefined_cell() {
    let runs = vec![unscored("hp", "prog"), unscored("hp", "prog")];

    let cell = CellStats::from_runs(&runs);
    assert_eq!(cell.sample_count, 0);
    assert!(cell.mean_satisfaction.is_nan());
    assert!(cell.median_satisfaction.is_nan());
    assert!(cell.max_satisfaction.is_nan());
    assert!(cell.mean_run_length.is_nan());
    assert!(cell.median_run_length.is_nan());
    assert!(cell.timeout_rate.is_nan());
    assert!(cell.non_null_satisfaction.is_empty());

    let summaries = summarize(&HyperparamTable::from_runs(&runs));
    assert_eq!(
        render_tsv(&summaries),
        "hp\tNaN\tNaN\tNaN\tNaN\tNaN\tNaN\tNaN\tNaN\tNaN\tNaN\n"
    );
}

#[test]
fn unscored_runs_are_excluded_from_every_statistic() {
    let mut runs = vec![
        completed("hp", "prog", 3.0, 30.0),
        timed_out("hp", "prog", 1.0, 10.0),
    ];
    let mut noisy = runs.clone();
    noisy.push(unscored("hp", "prog"));
    noisy.push(RunRecord {
        output: RunOutput::Completed(json!(42)),
        codelets_run: Some(1_000_000.0),
        ..RunRecord::new("hp", "prog")
    });

    let clean_cell = CellStats::from_runs(&runs);
    let noisy_cell = CellStats::from_runs(&noisy);
    assert_eq!(clean_cell, noisy_cell);
    assert_eq!(noisy_cell.timeout_rate, 0.5);
    assert_eq!(noisy_cell.non_null_satisfaction, vec![3.0]);

    runs.push(unscored("hp", "other"));
    let summary = &summarize(&HyperparamTable::from_runs(&runs))[0];
    assert_eq!(summary.mean_non_null_satisfaction, 3.0);
    assert_eq!(summary.program_count, 2);
}

#[test]
fn unreported_output_is_not_a_timeout() {
    let runs = vec![RunRecord {
        satisfaction: Satisfaction::Scored(0.5),
        codelets_run: Some(40.0),
        ..RunRecord::new("hp", "prog")
    }];

    let cell = CellStats::from_runs(&runs);
    assert_eq!(cell.timeout_rate, 0.0);
    assert_eq!(cell.non_null_satisfaction, vec![0.5]);
}

#[test]
fn missing_run_length_is_skipped() {
    let runs = vec![
        completed("hp", "prog", 1.0, 10.0),
        RunRecord {
            codelets_run: None,
            ..completed("hp", "prog", 3.0, 0.0)
        },
    ];

    let cell = CellStats::from_runs(&runs);
    assert_eq!(cell.mean_satisfaction, 2.0);
    assert_eq!(cell.mean_run_length, 10.0);
    assert_eq!(cell.median_run_length, 10.0);
}

#[test]
fn groups_keep_first_seen_order() {
    let runs = vec![
        completed("b", "y", 1.0, 1.0),
        completed("a", "x", 1.0, 1.0),
        completed("b", "x", 1.0, 1.0),
        completed("a", "x", 2.0, 1.0),
    ];

    let groups = group_runs(&runs);
    let configs: Vec<&str> = groups.keys().copied().collect();
    assert_eq!(configs, vec!["b", "a"]);
    let programs: Vec<&str> = groups["b"].keys().copied().collect();
    assert_eq!(programs, vec!["y", "x"]);
    assert_eq!(groups["a"]["x"].len(), 2);

    let ids: Vec<String> = summarize(&HyperparamTable::from_runs(&runs))
        .into_iter()
        .map(|summary| summary.hyperparams_id)
        .collect();
    assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
}

#[test]
fn timeout_rate_is_bounded_for_generated_runs() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut runs = Vec::new();
    for _ in 0..500 {
        let hyperparams = format!("hp{}", rng.gen_range(0..4));
        let program = format!("prog{}", rng.gen_range(0..5));
        let mut record = RunRecord::new(hyperparams, program);
        if rng.gen::<f64>() < 0.8 {
            record.satisfaction = Satisfaction::Scored(rng.gen::<f64>());
            record.codelets_run = Some(rng.gen_range(100..5000) as f64);
        }
        record.output = if rng.gen::<f64>() < 0.3 {
            RunOutput::TimedOut
        } else {
            RunOutput::Completed(json!("text"))
        };
        record.seed = Some(rng.gen::<u64>().into());
        runs.push(record);
    }

    let table = HyperparamTable::from_runs(&runs);
    for (hyperparams, cells) in table.iter() {
        for (program, cell) in cells {
            let scored: Vec<&RunRecord> = runs
                .iter()
                .filter(|run| {
                    run.hyperparams_id == hyperparams
                        && &run.program_id == program
                        && run.satisfaction.is_present()
                })
                .collect();
            if scored.is_empty() {
                assert!(cell.timeout_rate.is_nan());
                continue;
            }
            let timeouts = scored.iter().filter(|run| run.output.is_timeout()).count();
            assert!((0.0..=1.0).contains(&cell.timeout_rate));
            assert_eq!(cell.timeout_rate, timeouts as f64 / scored.len() as f64);
            assert_eq!(cell.non_null_satisfaction.len(), scored.len() - timeouts);
        }
    }

    let first = render_tsv(&summarize(&table));
    let second = render_tsv(&summarize(&HyperparamTable::from_runs(&runs)));
    assert_eq!(first, second);
}

#[test]
fn format_stat_uses_shortest_decimal() {
    assert_eq!(format_stat(4.0), "4");
    assert_eq!(format_stat(2.5), "2.5");
    assert_eq!(format_stat(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(format_stat(f64::NAN), "NaN");
}

#[test]
fn null_satisfaction_stays_in_the_group() {
    let runs = vec![
        completed("hp", "prog", 2.0, 10.0),
        RunRecord {
            satisfaction: Satisfaction::Null,
            ..timed_out("hp", "prog", 0.0, 30.0)
        },
    ];

    let cell = CellStats::from_runs(&runs);
    assert_eq!(cell.sample_count, 2);
    assert_eq!(cell.timeout_rate, 0.5);
    assert_eq!(cell.non_null_satisfaction, vec![2.0]);
    assert!(cell.mean_satisfaction.is_nan());
    assert!(cell.max_satisfaction.is_nan());
    assert_eq!(cell.mean_run_length, 20.0);
}

#[test]
fn json_report_renders_undefined_as_null() {
    let runs = vec![unscored("hp", "prog")];
    let doc = render_json(&summarize(&HyperparamTable::from_runs(&runs))).expect("json");
    let rows: serde_json::Value = serde_json::from_str(&doc).expect("parse");
    assert_eq!(rows[0]["hyperparams_id"], "hp");
    assert!(rows[0]["mean_satisfaction"].is_null());
    assert_eq!(rows[0]["program_count"], 1);
}
