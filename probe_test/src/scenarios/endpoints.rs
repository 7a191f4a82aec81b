// EE 注册表场景：合成服务驱动枚举、过滤、步长缓存与启停簿记
use crate::fake_service::{FakeEe, FakeNfaService};
use nci_probe::{
    EE_INTERFACE_PROPRIETARY, EE_STATUS_ACTIVE, EE_STATUS_INACTIVE, EeRegistry, NfaStatus,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

fn registry_over(
    service: FakeNfaService,
) -> (
    Rc<RefCell<FakeNfaService>>,
    EeRegistry<impl FnMut(&mut u8, &mut [u8]) -> NfaStatus>,
) {
    let service = Rc::new(RefCell::new(service));
    let handle = service.clone();
    let registry = EeRegistry::new(move |requested: &mut u8, buf: &mut [u8]| {
        handle.borrow_mut().get_info(requested, buf)
    });
    (service, registry)
}

pub fn scenario_ee_filtering() {
    let records = vec![
        FakeEe {
            handle: 0x4c0,
            status: EE_STATUS_ACTIVE,
            interfaces: vec![0x00, EE_INTERFACE_PROPRIETARY],
        },
        FakeEe {
            handle: 0x4c1,
            status: EE_STATUS_INACTIVE,
            interfaces: vec![EE_INTERFACE_PROPRIETARY],
        },
        FakeEe {
            handle: 0x4c2,
            status: EE_STATUS_ACTIVE,
            interfaces: vec![0x00],
        },
    ];
    let (_, mut registry) = registry_over(FakeNfaService::new(44, records));

    let active = registry.find_active_ees().expect("enumeration");
    assert_eq!(active, BTreeSet::from([0x4c0]));
}

pub fn scenario_ee_stride_cache() {
    let records = vec![
        FakeEe {
            handle: 0x4c0,
            status: EE_STATUS_ACTIVE,
            interfaces: vec![EE_INTERFACE_PROPRIETARY],
        },
        FakeEe {
            handle: 0x4c1,
            status: EE_STATUS_ACTIVE,
            interfaces: vec![EE_INTERFACE_PROPRIETARY],
        },
    ];
    let (service, mut registry) = registry_over(FakeNfaService::new(52, records));

    let first = registry.find_active_ees().expect("first enumeration");
    let calls_first = service.borrow().calls;
    let second = registry.find_active_ees().expect("second enumeration");
    let calls_second = service.borrow().calls - calls_first;

    assert_eq!(first, second);
    // 第二轮不再探测：只有计数与取数两次调用
    assert_eq!(calls_second, 2);
}

pub fn scenario_ee_bookkeeping() {
    let (_, mut registry) = registry_over(FakeNfaService::new(32, Vec::new()));

    registry.mark_deactivated(0x4c0);
    assert!(registry.deactivated_ees().contains(&0x4c0));
    registry.mark_activated(0x4c0);
    assert!(registry.deactivated_ees().is_empty());
}
