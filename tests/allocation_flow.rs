//! End-to-end allocation scenarios on the default three-zone topology

use parkeon::request::RequestState;
use parkeon::ParkingSystem;

#[test]
fn test_first_allocation_lands_in_requested_zone() {
    let mut system = ParkingSystem::with_default_topology().expect("Failed to build system");

    // Default topology: Z1 (5 slots), Z2 (2 slots), Z3 (3 slots)
    let status = system.status();
    assert_eq!(status.zone_count, 3);
    assert_eq!(status.total_slots, 10);
    assert_eq!(status.available_slots, 10);
    println!("✓ Default topology seeded: {} slots", status.total_slots);

    let vehicle_id = system
        .register_vehicle("Sedan", None, None, Some("Z1"))
        .expect("Failed to register vehicle");
    assert_eq!(vehicle_id, "V1000");

    let request_id = system
        .create_request(&vehicle_id, "Z1")
        .expect("Failed to create request");
    assert_eq!(request_id, "R1000");

    let outcome = system.process_next_request().expect("Failed to process");
    assert!(outcome.allocated(), "Slot should be allocated");
    let placement = outcome.placement.expect("placement");
    assert_eq!(placement.zone_id, "Z1");
    assert!(!placement.cross_zone, "In-zone request must not spill");
    println!("✓ {} allocated to {}", request_id, placement.slot_id);

    let request = system.request(&request_id).expect("request exists");
    assert_eq!(request.state(), RequestState::Allocated);
    assert!(request.slot_ref().is_some());
    assert_eq!(system.status().available_slots, 9);
}

#[test]
fn test_queue_preserves_fifo_order() {
    let mut system = ParkingSystem::with_default_topology().expect("Failed to build system");

    for (vehicle, zone) in [("V1", "Z1"), ("V2", "Z2"), ("V3", "Z3")] {
        system
            .create_request(vehicle, zone)
            .expect("Failed to create request");
    }
    assert_eq!(system.queue().len(), 3);

    // Requests come back out in creation order
    let first = system.process_next_request().expect("process");
    let second = system.process_next_request().expect("process");
    let third = system.process_next_request().expect("process");
    assert_eq!(first.request_id, "R1000");
    assert_eq!(second.request_id, "R1001");
    assert_eq!(third.request_id, "R1002");
    assert!(system.queue().is_empty());
    println!("✓ Three requests processed in FIFO order");
}

#[test]
fn test_full_zone_spills_cross_zone() {
    let mut system = ParkingSystem::with_default_topology().expect("Failed to build system");

    // Z2 holds exactly two slots; the third Z2 request must spill
    for vehicle in ["V1", "V2", "V3"] {
        system
            .create_request(vehicle, "Z2")
            .expect("Failed to create request");
    }

    let first = system.process_next_request().expect("process");
    let second = system.process_next_request().expect("process");
    assert_eq!(first.placement.expect("placement").zone_id, "Z2");
    assert_eq!(second.placement.expect("placement").zone_id, "Z2");

    let third = system.process_next_request().expect("process");
    let placement = third.placement.expect("cross-zone placement");
    assert_ne!(placement.zone_id, "Z2", "Z2 is full, slot must be elsewhere");
    assert!(placement.cross_zone);
    println!(
        "✓ Overflow request spilled to {}/{}",
        placement.zone_id, placement.slot_id
    );

    let request = system.request(&third.request_id).expect("request");
    assert!(request.is_cross_zone());
    assert_eq!(system.analytics().cross_zone_allocations, 1);
}

#[test]
fn test_saturated_system_leaves_request_queued_for_retry() {
    let mut system = ParkingSystem::with_default_topology().expect("Failed to build system");

    // Ten requests saturate all ten slots regardless of the target zone
    for i in 0..10 {
        let vehicle = format!("V{}", i);
        system
            .create_request(&vehicle, "Z1")
            .expect("Failed to create request");
        let outcome = system.process_next_request().expect("process");
        assert!(outcome.allocated(), "Slot {} should allocate", i);
    }
    assert_eq!(system.status().available_slots, 0);
    println!("✓ All 10 slots allocated");

    // The eleventh request is not an error; it simply stays REQUESTED
    let stranded = system
        .create_request("V10", "Z1")
        .expect("Failed to create request");
    let outcome = system.process_next_request().expect("process");
    assert_eq!(outcome.request_id, stranded);
    assert!(!outcome.allocated());
    assert!(outcome.placement.is_none());
    assert_eq!(
        system.request(&stranded).expect("request").state(),
        RequestState::Requested
    );
    println!("✓ Saturated system left {} in REQUESTED", stranded);

    // Freeing one slot makes a direct retry succeed
    system.mark_occupied("R1000").expect("occupy");
    system.mark_released("R1000").expect("release");
    assert_eq!(system.status().available_slots, 1);

    let placement = system.allocate_request(&stranded).expect("retry succeeds");
    assert_eq!(placement.slot_id, "Z1-A1-S1");
    assert_eq!(
        system.request(&stranded).expect("request").state(),
        RequestState::Allocated
    );
    println!("✓ Retry after release allocated the freed slot");
}
