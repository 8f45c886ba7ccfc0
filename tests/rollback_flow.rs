//! Rollback scenarios driven through the system facade

use parkeon::error::Error;
use parkeon::request::RequestState;
use parkeon::system::SystemConfig;
use parkeon::ParkingSystem;

fn allocated_system() -> (ParkingSystem, String) {
    let mut system = ParkingSystem::with_default_topology().expect("Failed to build system");
    let request_id = system
        .create_request("V1000", "Z1")
        .expect("Failed to create request");
    let outcome = system.process_next_request().expect("process");
    assert!(outcome.allocated());
    (system, request_id)
}

#[test]
fn test_rollback_allocation_frees_the_slot() {
    let (mut system, request_id) = allocated_system();
    assert_eq!(system.status().available_slots, 9);
    assert_eq!(system.rollback_log().len(), 1);

    system.rollback_last().expect("rollback");

    assert_eq!(system.status().available_slots, 10);
    assert_eq!(
        system.request(&request_id).expect("request").state(),
        RequestState::Cancelled
    );
    assert!(system.rollback_log().is_empty());
    println!("✓ Allocation rollback freed the slot and cancelled {}", request_id);
}

#[test]
fn test_rollback_cancellation_restores_the_allocation() {
    let (mut system, request_id) = allocated_system();

    system.cancel_request(&request_id).expect("cancel");
    assert_eq!(system.status().available_slots, 10);

    // Undo the cancellation: same slot, same holder, same state
    system.rollback_last().expect("rollback");

    let request = system.request(&request_id).expect("request");
    assert_eq!(request.state(), RequestState::Allocated);
    let slot_ref = request.slot_ref().expect("slot restored").clone();
    assert_eq!(system.status().available_slots, 9);

    let slot = system
        .hierarchy()
        .slot(&slot_ref.zone_id, &slot_ref.slot_id)
        .expect("slot exists");
    assert_eq!(slot.vehicle_id(), Some("V1000"));
    println!("✓ Cancellation rollback re-occupied {}", slot_ref);
}

#[test]
fn test_rollback_transition_rewinds_state_only() {
    let (mut system, request_id) = allocated_system();
    system.mark_occupied(&request_id).expect("occupy");

    system.rollback_last().expect("rollback");

    // Back to ALLOCATED, but the slot stays held
    assert_eq!(
        system.request(&request_id).expect("request").state(),
        RequestState::Allocated
    );
    assert_eq!(system.status().available_slots, 9);
    println!("✓ Transition rollback rewound the state without touching the slot");
}

#[test]
fn test_rollbacks_unwind_in_lifo_order() {
    let (mut system, request_id) = allocated_system();
    system.mark_occupied(&request_id).expect("occupy");
    assert_eq!(system.rollback_log().len(), 2);

    // Most recent first: the occupy transition, then the allocation
    system.rollback_last().expect("first rollback");
    assert_eq!(
        system.request(&request_id).expect("request").state(),
        RequestState::Allocated
    );

    system.rollback_last().expect("second rollback");
    assert_eq!(
        system.request(&request_id).expect("request").state(),
        RequestState::Cancelled
    );
    assert_eq!(system.status().available_slots, 10);

    let err = system.rollback_last().unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    println!("✓ Two records unwound newest-first, third rollback rejected");
}

#[test]
fn test_history_bound_evicts_oldest_record() {
    let config = SystemConfig {
        rollback_capacity: 2,
        ..SystemConfig::default()
    };
    let mut system = ParkingSystem::new(config);
    system.seed_default_topology().expect("seed");

    let request_id = system.create_request("V1000", "Z1").expect("create");
    system.process_next_request().expect("process");
    system.mark_occupied(&request_id).expect("occupy");
    system.mark_released(&request_id).expect("release");

    // Three operations happened but only the newest two are kept
    assert_eq!(system.rollback_log().len(), 2);

    // Transition undos rewind the state only; the released slot stays free
    system.rollback_last().expect("undo release");
    assert_eq!(
        system.request(&request_id).expect("request").state(),
        RequestState::Occupied
    );
    assert_eq!(system.status().available_slots, 10);

    system.rollback_last().expect("undo occupy");
    assert_eq!(
        system.request(&request_id).expect("request").state(),
        RequestState::Allocated
    );

    // The allocation record itself was evicted and can no longer be undone
    assert!(system.rollback_log().is_empty());
    let err = system.rollback_last().unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    println!("✓ History bound kept the newest two records only");
}

#[test]
fn test_rollback_last_k_clamps_and_validates() {
    let (mut system, _) = allocated_system();
    let second = system.create_request("V1001", "Z2").expect("create");
    system.process_next_request().expect("process");
    assert_eq!(system.rollback_log().len(), 2);

    let err = system.rollback_last_k(0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    // k larger than the history just drains it
    system.rollback_last_k(10).expect("rollback all");
    assert!(system.rollback_log().is_empty());
    assert_eq!(system.status().available_slots, 10);
    assert_eq!(
        system.request(&second).expect("request").state(),
        RequestState::Cancelled
    );
    println!("✓ rollback_last_k clamped to history depth and drained it");
}
