//! Property tests for session bookkeeping, timers and SI generation

mod support;

use common::types::Rnti;
use layers::mac::SchedUeCfg;
use layers::rrc::{RrcMacInterface, RrcNrConfig, RrcState, RrcTimersConfig, SibSchedInfo};
use layers::LayerError;
use nr_asn1 as asn1;
use proptest::prelude::*;
use std::collections::BTreeSet;
use support::{teardown_calls, TestStack};

const MSG3_TIMEOUT_MS: u32 = 20;

fn short_timer_cfg() -> RrcNrConfig {
    RrcNrConfig {
        is_standalone: true,
        timers: RrcTimersConfig { msg3_rx_timeout_ms: MSG3_TIMEOUT_MS, ..Default::default() },
        ..Default::default()
    }
}

/// Msg3 deadline far beyond any generated sequence
fn long_msg3_cfg() -> RrcNrConfig {
    RrcNrConfig {
        is_standalone: true,
        timers: RrcTimersConfig { msg3_rx_timeout_ms: 100_000, ..Default::default() },
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy)]
enum SessionOp {
    Create(Rnti),
    Destroy(Rnti),
}

/// A session operation on a small RNTI pool, followed by a gap in ms
fn session_op() -> impl Strategy<Value = (SessionOp, u32)> {
    let rnti = (0x4601u16..0x4608).prop_map(Rnti);
    let op = prop_oneof![
        2 => rnti.clone().prop_map(SessionOp::Create),
        1 => rnti.prop_map(SessionOp::Destroy),
    ];
    (op, 0u32..5)
}

/// State, timer duration and elapsed time of a live session
fn session_snapshot(s: &TestStack, rnti: Rnti) -> Option<(RrcState, u32, u32, bool)> {
    let ue = s.rrc.user(rnti)?;
    let timer = ue.activity_timer();
    let sched = s.rrc.task_sched();
    Some((ue.state(), sched.duration(timer), sched.time_elapsed(timer), sched.is_running(timer)))
}

fn si_periodicity() -> impl Strategy<Value = u32> {
    prop::sample::select(vec![8u32, 16, 32, 64, 128, 256, 512])
}

/// SIB2 and SIB3 spread over one or two SI messages
fn sib_mapping() -> impl Strategy<Value = Vec<SibSchedInfo>> {
    (any::<bool>(), any::<bool>(), si_periodicity(), si_periodicity()).prop_map(
        |(split, sib3_first, p1, p2)| {
            let (a, b) = if sib3_first { (3, 2) } else { (2, 3) };
            if split {
                vec![
                    SibSchedInfo { si_periodicity_rf: p1, sib_types: vec![a] },
                    SibSchedInfo { si_periodicity_rf: p2, sib_types: vec![b] },
                ]
            } else {
                vec![SibSchedInfo { si_periodicity_rf: p1, sib_types: vec![a, b] }]
            }
        },
    )
}

proptest! {
    #[test]
    fn prop_one_context_per_rnti(ops in prop::collection::vec(session_op(), 1..60)) {
        let mut s = TestStack::new(long_msg3_cfg());
        let mut live = BTreeSet::new();

        for (op, gap) in ops {
            match op {
                SessionOp::Create(rnti) if live.contains(&rnti) => {
                    let before = session_snapshot(&s, rnti);
                    let result = s.rrc.create_session(rnti, &SchedUeCfg::default());
                    prop_assert_eq!(result, Err(LayerError::DuplicateSession(rnti)));
                    prop_assert_eq!(session_snapshot(&s, rnti), before);
                }
                SessionOp::Create(rnti) => {
                    prop_assert_eq!(s.rrc.create_session(rnti, &SchedUeCfg::default()), Ok(()));
                    live.insert(rnti);
                }
                SessionOp::Destroy(rnti) => {
                    s.rrc.destroy_session(rnti);
                    live.remove(&rnti);
                }
            }
            s.tick_ms(gap);

            prop_assert_eq!(s.rrc.nof_users(), live.len());
            for &rnti in &live {
                prop_assert!(s.rrc.user(rnti).is_some());
            }
        }
    }

    #[test]
    fn prop_teardown_order(
        rntis in prop::collection::btree_set(0x4601u16..0x4640, 1..10),
        nof_destroyed in 0usize..10,
    ) {
        let mut s = TestStack::sa();
        let rntis: Vec<Rnti> = rntis.into_iter().map(Rnti).collect();
        for &rnti in &rntis {
            s.rrc.create_session(rnti, &SchedUeCfg::default()).unwrap();
        }

        // Some sessions go away one by one, the rest with the RRC
        for &rnti in rntis.iter().take(nof_destroyed) {
            s.rrc.destroy_session(rnti);
        }
        s.rrc.stop();

        let calls = s.calls();
        for &rnti in &rntis {
            prop_assert_eq!(teardown_calls(&calls, rnti), vec!["mac", "rlc", "pdcp"]);
        }
        prop_assert_eq!(s.rrc.nof_users(), 0);
    }

    #[test]
    fn prop_activity_keeps_session_alive(gaps in prop::collection::vec(0u32..MSG3_TIMEOUT_MS, 0..20)) {
        let mut s = TestStack::new(short_timer_cfg());
        let rnti = Rnti(0x4601);
        s.rrc.create_session(rnti, &SchedUeCfg::default()).unwrap();

        for gap in gaps {
            s.tick_ms(gap);
            prop_assert!(s.rrc.user(rnti).is_some());
            // Restarting twice is the same as restarting once
            s.rrc.mark_active(rnti);
            s.rrc.mark_active(rnti);
            let timer = s.rrc.user(rnti).unwrap().activity_timer();
            prop_assert_eq!(s.rrc.task_sched().time_elapsed(timer), 0);
            prop_assert!(s.rrc.task_sched().is_running(timer));
        }

        s.tick_ms(MSG3_TIMEOUT_MS - 1);
        prop_assert!(s.rrc.user(rnti).is_some());
        s.tick_ms(1);
        prop_assert!(s.rrc.user(rnti).is_none());
    }

    #[test]
    fn prop_si_messages_follow_mapping(mapping in sib_mapping()) {
        let cfg = RrcNrConfig { is_standalone: true, sib_sched_info: mapping.clone(), ..Default::default() };
        let s = TestStack::new(cfg);
        let cell = s.rrc.cell().unwrap();
        prop_assert_eq!(cell.sib_buffer.len(), 1 + mapping.len());

        for (k, entry) in mapping.iter().enumerate() {
            let msg: asn1::BcchDlSchMsg = asn1::unpack(&s.rrc.read_system_info(k + 1).unwrap()).unwrap();
            let asn1::BcchDlSchMsg::C1(asn1::BcchDlSchC1::SystemInformation(si)) = msg else {
                return Err(TestCaseError::fail("SI message expected"));
            };
            let carried: BTreeSet<asn1::SibType> = si.sib_type_and_info.iter().map(|sib| sib.sib_type()).collect();
            let mapped: BTreeSet<asn1::SibType> = entry
                .sib_types
                .iter()
                .filter_map(|&n| asn1::SibType::from_number(n))
                .collect();
            prop_assert_eq!(carried, mapped);
        }

        let sched = s.calls();
        let Some(support::Call::MacCellConfig(cells)) = sched.first() else {
            return Err(TestCaseError::fail("cell configuration expected"));
        };
        for (k, entry) in mapping.iter().enumerate() {
            prop_assert_eq!(cells[0].sibs[k + 1].period_rf, entry.si_periodicity_rf);
        }
    }
}
