//! Tests for the Hospital aggregate: event dispatch, metric accounting, and
//! the recoverable-anomaly taxonomy.

use hospital_replay_core_rs::{
    Disease, EventRecord, Hospital, HospitalConfig, HospitalError,
};
use std::collections::HashMap;

/// Standard configuration with the bed distribution overridden per disease
/// (in A..F order).
fn config_with_beds(beds: [usize; 6]) -> HospitalConfig {
    let mut config = HospitalConfig::default();
    for (ward, &count) in config.wards.iter_mut().zip(beds.iter()) {
        ward.beds = count;
    }
    config
}

fn hospital_with_beds(beds: [usize; 6]) -> Hospital {
    Hospital::new(&config_with_beds(beds)).unwrap()
}

#[test]
fn exact_match_admission_counts_treated_only() {
    let mut hospital = hospital_with_beds([1, 1, 1, 1, 1, 1]);

    hospital
        .apply(&EventRecord::arrival(0.0, 1, Disease::A, Disease::A))
        .unwrap();

    assert_eq!(hospital.num_admitted(), 1);
    assert_eq!(hospital.metrics().treated(Disease::A), 1);
    assert!(hospital.metrics().urgency_history().is_empty());
    assert!(hospital.metrics().acceptance_history().is_empty());

    let patient = hospital.patient(1).unwrap();
    assert_eq!(patient.disease(), Disease::A);
    assert_eq!(patient.bed().unwrap().ward, Disease::A);
}

#[test]
fn overflow_placement_discounts_urgency_by_relocation_tolerance() {
    // Ward A carries urgency 7.0 and tolerance 0.05 toward B in the standard
    // configuration.
    let mut hospital = hospital_with_beds([1, 1, 1, 1, 1, 1]);

    hospital
        .apply(&EventRecord::arrival(0.0, 1, Disease::A, Disease::B))
        .unwrap();

    assert_eq!(hospital.metrics().treated(Disease::A), 1);
    assert_eq!(hospital.metrics().treated(Disease::B), 0);

    let urgency = hospital.metrics().urgency_history();
    assert_eq!(urgency.len(), 1);
    assert_eq!(urgency[0].disease, Disease::A);
    assert!((urgency[0].urgency - 6.65).abs() < 1e-9);

    let acceptance = hospital.metrics().acceptance_history();
    assert_eq!(acceptance.len(), 1);
    assert_eq!(acceptance[0].disease, Disease::B);
    assert!(acceptance[0].accepted);

    // Housed in B, but still a disease-A patient.
    let patient = hospital.patient(1).unwrap();
    assert_eq!(patient.disease(), Disease::A);
    assert_eq!(patient.bed().unwrap().ward, Disease::B);
}

#[test]
fn rejection_records_full_urgency_and_touches_no_beds() {
    let mut hospital = hospital_with_beds([1, 1, 1, 1, 1, 1]);

    hospital
        .apply(&EventRecord::rejection(2.0, 1, Disease::C))
        .unwrap();

    assert_eq!(hospital.num_admitted(), 0);
    assert_eq!(hospital.metrics().rejected(Disease::C), 1);
    assert_eq!(hospital.metrics().treated(Disease::C), 0);

    let urgency = hospital.metrics().urgency_history();
    assert_eq!(urgency.len(), 1);
    assert_eq!(urgency[0].time, 2.0);
    assert_eq!(urgency[0].urgency, 2.0); // ward C urgency, undiscounted

    let acceptance = hospital.metrics().acceptance_history();
    assert_eq!(acceptance.len(), 1);
    assert!(!acceptance[0].accepted);

    for status in hospital.ward_status() {
        assert_eq!(status.occupied, 0);
    }
}

#[test]
fn discharge_frees_the_bed_and_removes_from_roster() {
    let mut hospital = hospital_with_beds([2, 1, 1, 1, 1, 1]);

    hospital
        .apply(&EventRecord::arrival(0.0, 1, Disease::A, Disease::A))
        .unwrap();
    let bed = hospital.patient(1).unwrap().bed().unwrap();

    hospital
        .apply(&EventRecord::discharge(5.0, 1, Disease::A))
        .unwrap();

    assert_eq!(hospital.num_admitted(), 0);
    let ward = hospital.get_ward(Disease::A).unwrap();
    assert_eq!(ward.occupied(), 0);
    assert!(ward.beds()[bed.index].is_free());
    // Treated count is a running total, not current occupancy.
    assert_eq!(hospital.metrics().treated(Disease::A), 1);
}

#[test]
fn dangling_discharge_is_reported_and_mutates_nothing() {
    let mut hospital = hospital_with_beds([1, 1, 1, 1, 1, 1]);

    let err = hospital
        .apply(&EventRecord::discharge(1.0, 99, Disease::A))
        .unwrap_err();

    assert_eq!(
        err,
        HospitalError::DanglingDischarge {
            time: 1.0,
            patient_id: 99
        }
    );
    assert_eq!(hospital.num_admitted(), 0);
}

#[test]
fn full_ward_arrival_is_a_capacity_inconsistency() {
    let mut hospital = hospital_with_beds([1, 1, 1, 1, 1, 1]);

    hospital
        .apply(&EventRecord::arrival(0.0, 1, Disease::A, Disease::A))
        .unwrap();
    let err = hospital
        .apply(&EventRecord::arrival(0.5, 2, Disease::A, Disease::A))
        .unwrap_err();

    assert_eq!(
        err,
        HospitalError::CapacityInconsistency {
            time: 0.5,
            patient_id: 2,
            ward: Disease::A
        }
    );
    // The failed arrival moved nothing: no roster entry, no treated count.
    assert_eq!(hospital.num_admitted(), 1);
    assert_eq!(hospital.metrics().treated(Disease::A), 1);
    assert!(hospital.patient(2).is_none());
    assert_eq!(hospital.get_ward(Disease::A).unwrap().occupied(), 1);
}

#[test]
fn duplicate_admission_is_reported() {
    let mut hospital = hospital_with_beds([2, 1, 1, 1, 1, 1]);

    hospital
        .apply(&EventRecord::arrival(0.0, 1, Disease::A, Disease::A))
        .unwrap();
    let err = hospital
        .apply(&EventRecord::arrival(1.0, 1, Disease::A, Disease::A))
        .unwrap_err();

    assert_eq!(
        err,
        HospitalError::DuplicateAdmission {
            time: 1.0,
            patient_id: 1
        }
    );
    assert_eq!(hospital.num_admitted(), 1);
    assert_eq!(hospital.get_ward(Disease::A).unwrap().occupied(), 1);
}

#[test]
fn grow_and_shrink_keep_back_references_linked() {
    let mut hospital = hospital_with_beds([4, 1, 1, 1, 1, 1]);
    for id in 1..=2 {
        hospital
            .apply(&EventRecord::arrival(0.0, id, Disease::A, Disease::A))
            .unwrap();
    }

    hospital
        .update_bed_distribution(&HashMap::from([(Disease::A, 2)]))
        .unwrap();

    let ward = hospital.get_ward(Disease::A).unwrap();
    assert_eq!(ward.capacity(), 2);
    assert_eq!(ward.occupied(), 2);

    // Slot indices may have been compacted; every roster entry must point at
    // the slot that names it back.
    for (index, patient_id) in ward.occupants() {
        let bed = hospital.patient(patient_id).unwrap().bed().unwrap();
        assert_eq!(bed.ward, Disease::A);
        assert_eq!(bed.index, index);
    }

    hospital
        .update_bed_distribution(&HashMap::from([(Disease::A, 6)]))
        .unwrap();
    assert_eq!(hospital.get_ward(Disease::A).unwrap().capacity(), 6);
    assert_eq!(hospital.get_ward(Disease::A).unwrap().occupied(), 2);
}

#[test]
fn shrink_below_occupancy_is_refused_per_ward() {
    let mut hospital = hospital_with_beds([2, 2, 1, 1, 1, 1]);
    for id in 1..=2 {
        hospital
            .apply(&EventRecord::arrival(0.0, id, Disease::A, Disease::A))
            .unwrap();
    }

    // A's shrink must be refused; B's is independent and goes through.
    let refusals = hospital
        .update_bed_distribution(&HashMap::from([(Disease::A, 1), (Disease::B, 1)]))
        .unwrap_err();

    assert_eq!(refusals.len(), 1);
    assert!(matches!(
        refusals[0],
        HospitalError::Ward {
            ward: Disease::A,
            ..
        }
    ));
    assert_eq!(hospital.get_ward(Disease::A).unwrap().capacity(), 2);
    assert_eq!(hospital.get_ward(Disease::A).unwrap().occupied(), 2);
    assert_eq!(hospital.get_ward(Disease::B).unwrap().capacity(), 1);
}

#[test]
fn reset_restores_the_configured_empty_state() {
    let mut hospital = hospital_with_beds([2, 1, 1, 1, 1, 1]);
    hospital
        .apply(&EventRecord::arrival(0.0, 1, Disease::A, Disease::B))
        .unwrap();
    hospital
        .apply(&EventRecord::rejection(1.0, 2, Disease::D))
        .unwrap();

    hospital.reset();

    assert_eq!(hospital.num_admitted(), 0);
    for status in hospital.ward_status() {
        assert_eq!(status.occupied, 0);
    }
    assert!(hospital.metrics().urgency_history().is_empty());
    assert!(hospital.metrics().acceptance_history().is_empty());
    for disease in Disease::ALL {
        assert_eq!(hospital.metrics().treated(disease), 0);
        assert_eq!(hospital.metrics().rejected(disease), 0);
    }
}

#[test]
fn ward_status_reports_in_disease_order() {
    let hospital = hospital_with_beds([6, 5, 4, 3, 2, 1]);
    let status = hospital.ward_status();

    let diseases: Vec<Disease> = status.iter().map(|s| s.disease).collect();
    assert_eq!(diseases, Disease::ALL.to_vec());
    let capacities: Vec<usize> = status.iter().map(|s| s.capacity).collect();
    assert_eq!(capacities, vec![6, 5, 4, 3, 2, 1]);
}
