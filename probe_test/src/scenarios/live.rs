// 在当前进程上驱动真实的模块映射
use nci_probe::{ModuleMap, SEG_READ_FLAG, find_nfc_library};

static LIVE_MARKER: u32 = 0x6e63_6970;

pub fn scenario_maps_live() {
    let maps = ModuleMap::build().expect("module map build");
    assert!(!maps.loaded_libraries().is_empty());

    let address = std::ptr::addr_of!(LIVE_MARKER) as usize;
    let hit = maps
        .lookup_range(address, std::mem::size_of::<u32>())
        .expect("own static should be mapped");
    assert!(hit.range.perms & SEG_READ_FLAG != 0);

    // 测试宿主通常没有加载 NFC 栈，这里只验证查找路径本身
    let _ = find_nfc_library(&maps);
}

pub fn scenario_maps_base_address() {
    let maps = ModuleMap::build().expect("module map build");
    // 空后缀匹配任意模块；首个带 ELF 魔数的可读段应当存在（至少是自身映像）
    let base = maps.base_address("").expect("an image head should be found");
    assert!(maps.lookup_range(base, 4).is_some());
}
