mod fake_service;
mod scenarios;

use nci_probe::set_debug_enabled;

fn main() {
    set_debug_enabled(true);
    scenarios::run_all();
    println!("probe_test all scenarios passed");
}
