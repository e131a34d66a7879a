use super::*;
use rt_core::SequentialIdGen;

#[test]
fn new_generates_an_address_under_the_given_host() {
    let id_gen = SequentialIdGen::new("inst");
    let instance = Instance::new("myapp", "example-host", &id_gen);
    assert_eq!(instance.slug, "myapp");
    assert_eq!(instance.id, "inst-1");
    assert_eq!(instance.address.to_string(), "happy://example-host/inst-1");
}

#[test]
fn successive_instances_get_distinct_ids() {
    let id_gen = SequentialIdGen::new("inst");
    let a = Instance::new("myapp", "h", &id_gen);
    let b = Instance::new("myapp", "h", &id_gen);
    assert_ne!(a.id, b.id);
}

#[test]
#[serial_test::serial(rt_init_env)]
fn local_host_prefers_hostname_env() {
    std::env::set_var("HOSTNAME", "box-7");
    std::env::remove_var("COMPUTERNAME");
    assert_eq!(local_host(), "box-7");
    std::env::remove_var("HOSTNAME");
}

#[test]
#[serial_test::serial(rt_init_env)]
fn local_host_falls_back_to_localhost() {
    std::env::remove_var("HOSTNAME");
    std::env::remove_var("COMPUTERNAME");
    assert_eq!(local_host(), "localhost");
}
