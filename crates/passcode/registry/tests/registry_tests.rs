//! Tests for the passcode registry
//!
//! Tests cover:
//! - Creation and expiry
//! - Renewal semantics
//! - Eviction timers and their cancellation
//! - Read-only operations
//! - Degenerate inputs
//! - Wall-clock operation on tokio

use chrono::TimeDelta;
use multiauth_core::sim::ManualTime;
use multiauth_core::{PasscodeId, Scheduler};
use multiauth_passcode::*;
use std::sync::Arc;

fn manual_registry() -> (Arc<ManualTime>, PasscodeRegistry) {
    let time = Arc::new(ManualTime::new());
    let registry = PasscodeRegistry::new(time.clone(), time.clone());
    (time, registry)
}

fn ms(value: i64) -> TimeDelta {
    TimeDelta::milliseconds(value)
}

fn remaining(registry: &PasscodeRegistry, code: &str) -> Option<i64> {
    registry
        .list_active()
        .into_iter()
        .find(|p| p.identifier.as_str() == code)
        .map(|p| p.remaining_ms)
}

mod creation_tests {
    use super::*;

    #[test]
    fn test_new_code_is_valid_until_duration_elapses() {
        let (time, registry) = manual_registry();

        assert!(!registry.create_or_renew("1234", ms(1000)), "Fresh code should report created");
        assert!(registry.is_valid("1234"));

        time.advance_ms(500);
        assert!(registry.is_valid("1234"));

        time.advance_ms(600);
        assert!(!registry.is_valid("1234"), "Code should expire after its duration");
        assert!(remaining(&registry, "1234").is_none(), "Expired code should be evicted");
    }

    #[test]
    fn test_unknown_code_is_invalid() {
        let (_time, registry) = manual_registry();
        assert!(!registry.is_valid("0000"));
    }

    #[test]
    fn test_numeric_and_string_codes_share_an_entry() {
        let (_time, registry) = manual_registry();

        assert!(!registry.create_or_renew(1234u32, ms(1000)));
        assert!(registry.is_valid("1234"));
        assert!(registry.create_or_renew("1234", ms(1000)), "Same code as string should renew");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_small_integer_codes() {
        let (_time, registry) = manual_registry();

        assert!(!registry.create_or_renew(5u8, ms(1000)));
        assert!(registry.create_or_renew(5i8, ms(1000)));
        assert!(registry.is_valid("5"));
    }

    #[test]
    fn test_independent_codes() {
        let (time, registry) = manual_registry();

        registry.create_or_renew("1", ms(1000));
        registry.create_or_renew("2", ms(3000));

        time.advance_ms(1500);
        assert!(!registry.is_valid("1"));
        assert!(registry.is_valid("2"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_independent_registries() {
        let (_t1, first) = manual_registry();
        let (_t2, second) = manual_registry();

        first.create_or_renew("555", ms(1000));
        assert!(first.is_valid("555"));
        assert!(!second.is_valid("555"));
    }
}

mod renewal_tests {
    use super::*;

    #[test]
    fn test_immediate_renewal_returns_true() {
        let (_time, registry) = manual_registry();

        assert!(!registry.create_or_renew("9", ms(1000)));
        assert!(registry.create_or_renew("9", ms(1000)));
    }

    #[test]
    fn test_renewal_resets_remaining_time() {
        let (time, registry) = manual_registry();

        registry.create_or_renew("9", ms(1000));
        time.advance_ms(700);
        assert_eq!(remaining(&registry, "9"), Some(300));

        assert!(registry.create_or_renew("9", ms(1000)));
        assert_eq!(remaining(&registry, "9"), Some(1000), "Expiry should be reset, not stacked");
    }

    #[test]
    fn test_renewal_can_shorten_expiry() {
        let (time, registry) = manual_registry();

        registry.create_or_renew("9", ms(10_000));
        assert!(registry.create_or_renew("9", ms(100)));

        time.advance_ms(100);
        assert!(!registry.is_valid("9"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_renewed_code_survives_original_expiry() {
        let (time, registry) = manual_registry();

        assert!(!registry.create_or_renew("42", ms(5000)));
        time.advance_ms(1000);
        assert!(registry.create_or_renew("42", ms(5000)));

        // Original 5000ms mark, 4000ms after renewal.
        time.advance_ms(4000);
        assert!(registry.is_valid("42"), "Original eviction must not remove the renewed code");
        assert_eq!(remaining(&registry, "42"), Some(1000));

        time.advance_ms(1000);
        assert!(!registry.is_valid("42"));
        assert!(registry.list_active().is_empty());
    }

    #[test]
    fn test_code_reissued_after_expiry_reports_created() {
        let (time, registry) = manual_registry();

        registry.create_or_renew("77", ms(1000));
        time.advance_ms(2000);
        assert!(!registry.create_or_renew("77", ms(1000)));
        assert!(registry.is_valid("77"));
    }
}

mod eviction_tests {
    use super::*;

    #[test]
    fn test_single_pending_timer_per_code() {
        let (time, registry) = manual_registry();

        for _ in 0..5 {
            registry.create_or_renew("1", ms(1000));
            time.advance_ms(100);
        }
        assert_eq!(time.pending(), 1);

        let entry = registry.get("1").unwrap();
        assert_eq!(time.pending_due_times(), vec![entry.expires_at()]);
    }

    #[test]
    fn test_eviction_clears_pending_timer() {
        let (time, registry) = manual_registry();

        registry.create_or_renew("1", ms(1000));
        time.advance_ms(1000);
        assert_eq!(time.pending(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expired_unevicted_entry_is_overwritten_as_new() {
        // A scheduler that never fires stands in for an eviction delayed
        // indefinitely by a busy executor.
        struct NeverFires;

        impl Scheduler for NeverFires {
            fn schedule_once(
                &self,
                _delay: std::time::Duration,
                _task: multiauth_core::ScheduledTask,
            ) -> multiauth_core::TimerHandle {
                multiauth_core::TimerHandle::from_raw(0)
            }

            fn cancel(&self, _handle: multiauth_core::TimerHandle) {}

            fn pending(&self) -> usize {
                0
            }
        }

        let time = Arc::new(ManualTime::new());
        let registry = PasscodeRegistry::new(time.clone(), Arc::new(NeverFires));

        registry.create_or_renew("8", ms(1000));
        time.advance_ms(1500);

        assert!(!registry.is_valid("8"));
        assert_eq!(registry.list_active(), vec![ActivePasscode {
            identifier: PasscodeId::from("8"),
            remaining_ms: 0,
        }]);

        assert!(!registry.create_or_renew("8", ms(1000)), "Expired entry should be replaced, not renewed");
        assert!(registry.is_valid("8"));
    }
}

mod read_tests {
    use super::*;

    #[test]
    fn test_empty_registry_lists_nothing() {
        let (_time, registry) = manual_registry();
        assert!(registry.list_active().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reads_do_not_mutate() {
        let (time, registry) = manual_registry();
        registry.create_or_renew("3", ms(1000));
        let before = registry.get("3").unwrap();

        for _ in 0..10 {
            assert!(registry.is_valid("3"));
            assert!(!registry.is_valid("4"));
            registry.list_active();
        }

        let after = registry.get("3").unwrap();
        assert_eq!(before.expires_at(), after.expires_at());
        assert_eq!(before.eviction(), after.eviction());
        assert_eq!(registry.len(), 1);
        assert_eq!(time.pending(), 1);
    }

    #[test]
    fn test_remaining_decreases_monotonically() {
        let (time, registry) = manual_registry();
        registry.create_or_renew("3", ms(1000));

        let mut last = remaining(&registry, "3").unwrap();
        for _ in 0..9 {
            time.advance_ms(100);
            let now = remaining(&registry, "3").unwrap();
            assert!(now < last);
            last = now;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let (time, registry) = manual_registry();
        registry.create_or_renew("1", ms(1000));

        let snapshot = registry.list_active();
        registry.create_or_renew("2", ms(1000));
        time.advance_ms(500);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].remaining_ms, 1000);
    }

    #[test]
    fn test_listing_for_display() {
        let (_time, registry) = manual_registry();
        registry.create_or_renew("slow", ms(3000));
        registry.create_or_renew("fast", ms(1000));
        registry.create_or_renew("mid", ms(2000));

        let sorted = display::soonest_first(registry.list_active());
        let codes: Vec<&str> = sorted.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(codes, vec!["fast", "mid", "slow"]);
    }
}

mod degenerate_input_tests {
    use super::*;

    #[test]
    fn test_zero_duration_is_expired_immediately() {
        let (time, registry) = manual_registry();

        assert!(!registry.create_or_renew("0", ms(0)));
        assert!(!registry.is_valid("0"));
        assert_eq!(remaining(&registry, "0"), Some(0));

        time.advance_ms(0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_negative_duration_is_expired_immediately() {
        let (time, registry) = manual_registry();

        assert!(!registry.create_or_renew("0", ms(-5000)));
        assert!(!registry.is_valid("0"));
        assert_eq!(remaining(&registry, "0"), Some(0));

        time.advance_ms(0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_renewal_with_non_positive_duration_expires_code() {
        let (_time, registry) = manual_registry();

        registry.create_or_renew("1", ms(1000));
        assert!(registry.create_or_renew("1", ms(0)));
        assert!(!registry.is_valid("1"));
    }

    #[test]
    fn test_huge_duration_does_not_panic() {
        let (time, registry) = manual_registry();

        assert!(!registry.create_or_renew("1", TimeDelta::MAX));
        time.advance_ms(1_000_000);
        assert!(registry.is_valid("1"));
    }

    #[test]
    fn test_empty_identifier_is_accepted() {
        let (_time, registry) = manual_registry();

        assert!(!registry.create_or_renew("", ms(1000)));
        assert!(registry.is_valid(""));
    }
}

mod system_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_requires_runtime() {
        assert!(PasscodeRegistry::system().is_err());
    }

    #[tokio::test]
    async fn test_wall_clock_expiry() {
        let registry = PasscodeRegistry::system().expect("Should build on tokio runtime");

        assert!(!registry.create_or_renew("1234", ms(100)));
        assert!(registry.is_valid("1234"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!registry.is_valid("1234"));
        assert!(registry.is_empty(), "Tokio timer should have evicted the code");
    }

    #[tokio::test]
    async fn test_wall_clock_renewal_survives_original_timer() {
        let registry = PasscodeRegistry::system().expect("Should build on tokio runtime");

        registry.create_or_renew("42", ms(1000));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(registry.create_or_renew("42", ms(10_000)));

        // Past the original expiry, well before the renewed one.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(registry.is_valid("42"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_renewals_keep_one_entry() {
        let registry = Arc::new(PasscodeRegistry::system().expect("Should build on tokio runtime"));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    registry.create_or_renew("shared", ms(60_000));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.is_valid("shared"));
    }
}
