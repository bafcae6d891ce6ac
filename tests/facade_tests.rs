//! Assertion facade tests: checks, free-form reporting and bookkeeping.
//!
//! Facades here report into a `RecordingCase`, so failures are expected
//! output and never fail the surrounding test.

use once_cell::sync::Lazy;
use regex::Regex;
use std::rc::Rc;
use testy::{Facade, RecordingCase, TestCase};

static ENTRY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^facade_tests\.rs:\d+: ").expect("valid pattern"));

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn matches(pattern: &str, text: &str) -> bool {
    Regex::new(pattern).expect("valid pattern").is_match(text)
}

fn is_entry(entry: &str, line: u32, message: &str) -> bool {
    entry.starts_with(&format!("facade_tests.rs:{line}: {message}"))
}

#[derive(Debug, PartialEq)]
struct Pair {
    x: f32,
    y: f32,
}

#[cfg(test)]
mod check_tests {
    use super::*;

    #[test]
    fn passing_checks_record_nothing() {
        init_logging();
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        test.true_(true);
        test.false_(false);
        test.equal(1, 1);
        test.equal("foo", "foo");
        test.unequal(1, 2);

        assert_eq!(test.fail_count(), 0);
        assert!(!test.failed());
        assert!(test.output().is_empty());
        assert!(!case.failed());
    }

    #[test]
    fn failing_checks_report_at_call_lines() {
        init_logging();
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        let first = line!() + 1;
        test.true_(false);
        test.false_(true);
        test.equal(1, 2);
        test.unequal("foo", "foo");
        test.unequal(true, true);

        assert_eq!(test.fail_count(), 5);
        let output = test.output();
        assert_eq!(output.len(), 5);

        assert!(is_entry(&output[0], first, "Expression was not true"));
        assert!(is_entry(&output[1], first + 1, "Expression was not false"));
        assert!(is_entry(&output[2], first + 2, "Values were not equal"));
        assert!(matches(r"(?m)^\s+Got: 1 \(i32\)$", &output[2]), "{}", output[2]);
        assert!(matches(r"(?m)^\s+Wanted: 2 \(i32\)$", &output[2]), "{}", output[2]);
        assert!(is_entry(&output[3], first + 3, "Values were not unequal"));
        assert!(matches(r#"(?m)^\s+Got: "foo"$"#, &output[3]), "{}", output[3]);
        assert!(is_entry(&output[4], first + 4, "Values were not unequal"));
        assert!(matches(r"(?m)^\s+Got: true$", &output[4]), "{}", output[4]);
    }

    #[test]
    fn failures_are_forwarded_to_the_case() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        let line = line!() + 1;
        test.true_(1 + 1 == 3);

        let reports = case.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].site.line(), line);
        assert!(reports[0].site.file().ends_with("facade_tests.rs"));
        assert_eq!(reports[0].message, "Expression was not true");
    }

    #[test]
    fn references_compare_by_pointee() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        test.equal(&Pair { x: 1.0, y: 1.0 }, &Pair { x: 1.0, y: 1.0 });
        test.equal(Box::new(3), Box::new(3));
        test.equal(Rc::new("shared"), Rc::new("shared"));
        assert_eq!(test.fail_count(), 0);

        test.equal(&Pair { x: 1.0, y: 1.0 }, &Pair { x: 1.1, y: 1.0 });
        assert_eq!(test.fail_count(), 1);
        let output = test.output();
        let got = r"(?m)^\s+Got: Pair \{ x: 1\.0, y: 1\.0 \} \(&.*Pair\)$";
        let wanted = r"(?m)^\s+Wanted: Pair \{ x: 1\.1, y: 1\.0 \} \(&.*Pair\)$";
        assert!(matches(got, &output[0]), "{}", output[0]);
        assert!(matches(wanted, &output[0]), "{}", output[0]);
    }

    #[test]
    fn mixed_type_equality_reports_both_type_names() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        test.equal(String::from("foo\tbar"), "foo\tbaz");

        let output = test.output();
        let got = r#"(?m)^\s+Got: "foo\\tbar" \(alloc::string::String\)$"#;
        let wanted = r#"(?m)^\s+Wanted: "foo\\tbaz" \(&str\)$"#;
        assert!(matches(got, &output[0]), "{}", output[0]);
        assert!(matches(wanted, &output[0]), "{}", output[0]);
    }

    #[test]
    fn each_failure_adds_exactly_one() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);
        let mut last = test.fail_count();

        for (got, want) in [(1, 1), (1, 2), (3, 3), (4, 5), (6, 7)] {
            test.equal(got, want);
            let now = test.fail_count();
            assert_eq!(now - last, usize::from(got != want));
            last = now;
        }
        assert_eq!(test.fail_count(), 3);
    }
}

#[cfg(test)]
mod reporting_tests {
    use super::*;

    #[test]
    fn fail_marks_facade_and_case() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);
        assert_eq!(test.fail_count(), 0);

        test.fail();

        assert!(test.failed());
        assert!(case.failed());
        assert_eq!(test.fail_count(), 1);
        assert!(test.output().is_empty());
        assert!(case.reports().is_empty());
    }

    #[test]
    fn error_joins_parts_with_spaces() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        test.error(&[&"one", &"two"]);

        assert!(test.failed());
        assert!(case.failed());
        let output = test.output();
        assert!(ENTRY_PREFIX.is_match(&output[0]), "{}", output[0]);
        assert!(output[0].ends_with(": one two"), "{}", output[0]);
    }

    #[test]
    fn errorf_formats_positionally() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        test.errorf(format_args!("{} {}", "three", 4));

        assert!(test.failed());
        assert!(case.failed());
        let output = test.output();
        assert!(ENTRY_PREFIX.is_match(&output[0]), "{}", output[0]);
        assert!(output[0].ends_with(": three 4"), "{}", output[0]);
    }

    #[test]
    fn log_buffers_without_failing() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        let line = line!() + 1;
        test.log(&[&"one", &"two"]);
        test.logf(format_args!("{} {}", "three", 4));

        assert!(!test.failed());
        assert!(!case.failed());
        assert_eq!(
            test.output(),
            vec![
                format!("facade_tests.rs:{line}: one two"),
                format!("facade_tests.rs:{}: three 4", line + 1),
            ]
        );
    }

    #[test]
    fn failed_reflects_failures_injected_on_the_case() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);

        case.fail();

        assert!(test.failed());
        assert_eq!(test.fail_count(), 0);
    }

    #[test]
    fn output_is_a_snapshot() {
        let case = RecordingCase::new();
        let test = Facade::new(&case);
        test.log(&[&"before"]);

        let snapshot = test.output();
        test.error(&[&"after"]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(test.output().len(), 2);
    }
}
