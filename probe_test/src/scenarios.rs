mod endpoints;
mod live;
mod stride;

pub fn run_all() {
    run("stride-roundtrip", stride::scenario_stride_roundtrip);
    run("stride-undefined-tail", stride::scenario_stride_undefined_tail);
    run("stride-disagreement", stride::scenario_stride_disagreement);
    run("ee-filtering", endpoints::scenario_ee_filtering);
    run("ee-stride-cache", endpoints::scenario_ee_stride_cache);
    run("ee-bookkeeping", endpoints::scenario_ee_bookkeeping);
    run("maps-live", live::scenario_maps_live);
    run("maps-base-address", live::scenario_maps_base_address);
}

fn run(name: &str, scenario: fn()) {
    println!("scenario: {name}");
    scenario();
}
