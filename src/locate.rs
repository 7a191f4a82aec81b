// 在已加载模块中定位目标 NFC 协议栈库
use crate::maps::ModuleMap;
use once_cell::sync::Lazy;
use regex::Regex;

// 各厂商对 NFC 栈库的命名不一致（libnfc-nci.so、libnfc_nci.so、带厂商
// 后缀的变体），统一用正则在全部已加载模块里筛选
static NFC_LIB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|/)libnfc[-_][^/]*\.so$").expect("nfc library pattern"));

// 返回首个匹配给定正则的模块标签
pub fn find_library(maps: &ModuleMap, pattern: &Regex) -> Option<String> {
    maps.loaded_libraries()
        .into_iter()
        .find(|label| pattern.is_match(label))
}

// 定位 NFC 栈库；未加载时返回 None
pub fn find_nfc_library(maps: &ModuleMap) -> Option<String> {
    find_library(maps, &NFC_LIB_RE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::{LibraryData, RangeData, SEG_READ_FLAG};

    #[test]
    fn pattern_matches_vendor_name_variants() {
        for label in [
            "/system/lib64/libnfc-nci.so",
            "/vendor/lib64/libnfc_nci.so",
            "/system/vendor/lib64/libnfc-nci-nxp.so",
        ] {
            assert!(NFC_LIB_RE.is_match(label), "should match {label}");
        }

        for label in [
            "/system/lib64/libc.so",
            "/system/lib64/libnfc-nci.so.bak",
            "/data/libnfc-nci.so/other.so",
        ] {
            assert!(!NFC_LIB_RE.is_match(label), "should not match {label}");
        }
    }

    #[test]
    fn finds_nfc_library_in_map() {
        let maps = ModuleMap::from_libraries(vec![
            LibraryData {
                base: 0x1000,
                label: "/system/lib64/libc.so".to_string(),
                ranges: vec![RangeData {
                    start: 0x1000,
                    end: 0x2000,
                    perms: SEG_READ_FLAG,
                }],
            },
            LibraryData {
                base: 0x3000,
                label: "/system/lib64/libnfc-nci.so".to_string(),
                ranges: vec![RangeData {
                    start: 0x3000,
                    end: 0x4000,
                    perms: SEG_READ_FLAG,
                }],
            },
        ]);

        assert_eq!(
            find_nfc_library(&maps),
            Some("/system/lib64/libnfc-nci.so".to_string())
        );
    }

    #[test]
    fn absent_library_returns_none() {
        let maps = ModuleMap::from_libraries(Vec::new());
        assert_eq!(find_nfc_library(&maps), None);
    }
}
