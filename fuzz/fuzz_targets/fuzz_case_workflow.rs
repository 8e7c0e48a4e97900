#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use reunite_nullables::{NullCaseStore, NullClock, NullNotifier};
use reunite_store::CaseStore;
use reunite_types::{
    Caller, Evidence, Identity, Outcome, PetSnapshot, VerificationMethod,
};
use reunite_verification::{CaseWorkflow, NewCase, StateMachine, WorkflowLimits};

#[derive(Debug, Arbitrary)]
enum Who {
    Finder,
    Claimant,
    Admin,
    Stranger,
}

#[derive(Debug, Arbitrary)]
enum Step {
    Evidence { chip: String },
    Decide { approve: bool, reason: String },
    Dispute { reason: String },
    Rule { approve: bool, reason: String },
    Message { body: String },
    Read { offset: u16, count: Option<u16> },
    Tick { secs: u8 },
}

fn caller(who: &Who) -> Caller {
    match who {
        Who::Finder => Caller::user(Identity::new("Fay", "fay@example.org")),
        Who::Claimant => Caller::user(Identity::new("Cal", "cal@example.org")),
        Who::Admin => Caller::admin(Identity::new("Ada", "ada@example.org")),
        Who::Stranger => Caller::user(Identity::new("Eve", "eve@example.org")),
    }
}

fn outcome(approve: bool) -> Outcome {
    if approve {
        Outcome::Verified
    } else {
        Outcome::Rejected
    }
}

// Drive a case with arbitrary calls from arbitrary callers. Status may only
// move along the transition table, failed calls must leave the case as it
// was, and nothing may panic.
fuzz_target!(|steps: Vec<(Who, Step)>| {
    let store = Arc::new(NullCaseStore::new());
    let clock = Arc::new(NullClock::new(1));
    let wf = CaseWorkflow::new(
        store.clone(),
        clock.clone(),
        Arc::new(NullNotifier::new()),
        WorkflowLimits::default(),
    );
    let finder = caller(&Who::Finder);
    let Ok(id) = wf.create_case(
        &finder,
        NewCase {
            pet: PetSnapshot {
                name: "Rex".into(),
                species: "dog".into(),
                image: None,
                description: String::new(),
                last_known_location: None,
            },
            finder: finder.identity.clone(),
            claimant: caller(&Who::Claimant).identity,
            verification_method: VerificationMethod::Microchip,
        },
    ) else {
        return;
    };

    let mut successes = 0u64;
    for (who, step) in steps.iter().take(64) {
        let c = caller(who);
        let before = store.get(&id).expect("case exists");
        let mutated = match step {
            Step::Evidence { chip } => wf
                .submit_evidence(&c, &id, Evidence::Microchip { chip_number: chip.clone() })
                .is_ok(),
            Step::Decide { approve, reason } => {
                wf.decide(&c, &id, outcome(*approve), reason).is_ok()
            }
            Step::Dispute { reason } => wf.open_dispute(&c, &id, reason).is_ok(),
            Step::Rule { approve, reason } => {
                wf.rule_dispute(&c, &id, outcome(*approve), reason).is_ok()
            }
            Step::Message { body } => wf.post_message(&c, &id, body).is_ok(),
            Step::Read { offset, count } => {
                if let Ok(page) =
                    wf.read_messages(&c, &id, *offset as usize, count.map(|n| n as usize))
                {
                    assert!(page.messages.len() <= page.total);
                }
                false
            }
            Step::Tick { secs } => {
                clock.advance(*secs as u64);
                false
            }
        };
        let after = store.get(&id).expect("case exists");

        if mutated {
            successes += 1;
            if after.status != before.status {
                assert!(StateMachine.is_legal(before.status, after.status));
            }
            assert!(after.updated_at >= before.updated_at);
        } else {
            assert_eq!(after, before);
        }
        assert!(after.chat_history.starts_with(&before.chat_history));
    }

    let case = store.get(&id).expect("case exists");
    assert_eq!(case.version, successes + 1);
    assert!(case.created_at <= case.updated_at);
});
