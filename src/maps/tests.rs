// 模块映射的单元测试：地址运算用合成快照，魔数校验用真实内存
use super::{
    ELFMAG, LibraryData, ModuleMap, RangeData, SEG_EXEC_FLAG, SEG_READ_FLAG, SEG_WRITE_FLAG,
};

fn synthetic_map() -> ModuleMap {
    ModuleMap::from_libraries(vec![
        LibraryData {
            base: 0x1000,
            label: "/system/lib64/libA.so".to_string(),
            ranges: vec![RangeData {
                start: 0x1000,
                end: 0x2000,
                perms: SEG_READ_FLAG | SEG_EXEC_FLAG,
            }],
        },
        LibraryData {
            base: 0x3000,
            label: "/system/lib64/libB.so".to_string(),
            ranges: vec![RangeData {
                start: 0x3000,
                end: 0x4000,
                perms: SEG_READ_FLAG | SEG_WRITE_FLAG,
            }],
        },
    ])
}

#[test]
fn lookup_hits_containing_range() {
    let map = synthetic_map();
    let hit = map.lookup_range(0x1500, 0).expect("address should resolve");
    assert_eq!(hit.library.label, "/system/lib64/libA.so");
    assert_eq!(hit.range.start, 0x1000);
}

#[test]
fn lookup_one_past_end_misses() {
    let map = synthetic_map();
    assert!(map.lookup_range(0x2000, 0).is_none());
    assert!(map.lookup_range(0x0fff, 0).is_none());
    assert!(map.lookup_range(0x2800, 0).is_none());
}

#[test]
fn lookup_requires_full_containment() {
    let map = synthetic_map();
    assert!(map.lookup_range(0x1ff0, 0x10).is_some());
    assert!(map.lookup_range(0x1ff0, 0x11).is_none());
}

#[test]
fn lookup_first_match_in_insertion_order() {
    // 重叠段不在预期内，但出现时必须按插入顺序取首个命中
    let map = ModuleMap::from_libraries(vec![
        LibraryData {
            base: 0x1000,
            label: "first".to_string(),
            ranges: vec![RangeData {
                start: 0x1000,
                end: 0x3000,
                perms: SEG_READ_FLAG,
            }],
        },
        LibraryData {
            base: 0x2000,
            label: "second".to_string(),
            ranges: vec![RangeData {
                start: 0x2000,
                end: 0x4000,
                perms: SEG_READ_FLAG,
            }],
        },
    ]);

    let hit = map.lookup_range(0x2500, 0).expect("address should resolve");
    assert_eq!(hit.library.label, "first");
}

#[test]
fn loaded_libraries_lists_distinct_labels() {
    let map = synthetic_map();
    let labels = map.loaded_libraries();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains("/system/lib64/libA.so"));
    assert!(labels.contains("/system/lib64/libB.so"));
}

fn single_range_map(label: &str, image: &[u8], perms: u32) -> ModuleMap {
    let start = image.as_ptr() as usize;
    ModuleMap::from_libraries(vec![LibraryData {
        base: start,
        label: label.to_string(),
        ranges: vec![RangeData {
            start,
            end: start + image.len(),
            perms,
        }],
    }])
}

#[test]
fn base_address_accepts_elf_image_head() {
    let image: [u8; 8] = [ELFMAG[0], ELFMAG[1], ELFMAG[2], ELFMAG[3], 2, 1, 1, 0];
    let map = single_range_map("/vendor/lib64/libnfc-nci.so", &image, SEG_READ_FLAG);
    assert_eq!(map.base_address("libnfc-nci.so"), Some(image.as_ptr() as usize));
    assert_eq!(map.base_address("libnfc_nci.so"), None);
}

#[test]
fn base_address_rejects_non_elf_data() {
    let image: [u8; 8] = [0; 8];
    let map = single_range_map("/vendor/lib64/libnfc-nci.so", &image, SEG_READ_FLAG);
    assert_eq!(map.base_address("libnfc-nci.so"), None);
}

#[test]
fn base_address_requires_read_permission() {
    let image: [u8; 8] = [ELFMAG[0], ELFMAG[1], ELFMAG[2], ELFMAG[3], 2, 1, 1, 0];
    let map = single_range_map("/vendor/lib64/libnfc-nci.so", &image, SEG_EXEC_FLAG);
    assert_eq!(map.base_address("libnfc-nci.so"), None);
}

#[test]
fn base_address_requires_room_for_magic() {
    let image: [u8; 2] = [ELFMAG[0], ELFMAG[1]];
    let map = single_range_map("/vendor/lib64/libnfc-nci.so", &image, SEG_READ_FLAG);
    assert_eq!(map.base_address("libnfc-nci.so"), None);
}

#[test]
fn base_address_skips_data_only_mapping_of_same_module() {
    // 同一模块先出现纯数据段，再出现映像头段；应跳过前者
    let data: [u8; 8] = [0; 8];
    let image: [u8; 8] = [ELFMAG[0], ELFMAG[1], ELFMAG[2], ELFMAG[3], 2, 1, 1, 0];
    let data_start = data.as_ptr() as usize;
    let image_start = image.as_ptr() as usize;
    let map = ModuleMap::from_libraries(vec![LibraryData {
        base: data_start,
        label: "/vendor/lib64/libnfc-nci.so".to_string(),
        ranges: vec![
            RangeData {
                start: data_start,
                end: data_start + data.len(),
                perms: SEG_READ_FLAG | SEG_WRITE_FLAG,
            },
            RangeData {
                start: image_start,
                end: image_start + image.len(),
                perms: SEG_READ_FLAG,
            },
        ],
    }]);

    assert_eq!(map.base_address("libnfc-nci.so"), Some(image_start));
}

static LIVE_MARKER: u32 = 0x6e63_6970;

#[test]
fn live_build_covers_own_static_data() {
    let map = ModuleMap::build().expect("module map should build");
    assert!(!map.loaded_libraries().is_empty());

    let address = std::ptr::addr_of!(LIVE_MARKER) as usize;
    let hit = map
        .lookup_range(address, std::mem::size_of::<u32>())
        .expect("own static should be inside a mapped segment");
    assert!(hit.range.perms & SEG_READ_FLAG != 0);
    assert!(hit.range.start < hit.range.end);
}
