
use rl_domain::{InstanceSpec, Spec};
use rl_persistence::pg::spec_store;

#[test]
fn repeated_instance_spec_attributes_share_one_row() {
    let Some(result) = test_support::with_pool(|pool| {
        let mut conn = pool.get().expect("checkout connection");
        let spec = Spec::Instance(InstanceSpec { instance_type: "v1-standard-1".to_string(), state: "ACTIVE".to_string() });

        let first = spec_store::get_or_create(&mut conn, &spec).expect("first get_or_create");
        let second = spec_store::get_or_create(&mut conn, &spec).expect("second get_or_create");
        (first, second)
    }) else {
        eprintln!("skip (no DATABASE_URL)");
        return;
    };

    assert_eq!(result.0, result.1, "identical spec attributes must resolve to the same spec id");
}

#[test]
fn distinct_instance_spec_state_gets_a_distinct_row() {
    let Some(result) = test_support::with_pool(|pool| {
        let mut conn = pool.get().expect("checkout connection");
        let active = Spec::Instance(InstanceSpec { instance_type: "v1-standard-2".to_string(), state: "ACTIVE".to_string() });
        let error = Spec::Instance(InstanceSpec { instance_type: "v1-standard-2".to_string(), state: "ERROR".to_string() });

        let id_active = spec_store::get_or_create(&mut conn, &active).expect("active spec");
        let id_error = spec_store::get_or_create(&mut conn, &error).expect("error spec");
        (id_active, id_error)
    }) else {
        eprintln!("skip (no DATABASE_URL)");
        return;
    };

    assert_ne!(result.0, result.1);
}
