// 进程模块内存映射：一次性扫描全部已加载模块的 LOAD 段，提供双向查询
//
// 快照构建后只读；模块发生动态加载/卸载后快照过期，需要调用方显式重建
use crate::errno::Errno;
use crate::log;
use std::collections::BTreeSet;
use std::ffi::{CStr, c_void};
use std::slice;

// 段权限位，取自 ELF program header 的 p_flags
pub const SEG_EXEC_FLAG: u32 = 0x1;
pub const SEG_WRITE_FLAG: u32 = 0x2;
pub const SEG_READ_FLAG: u32 = 0x4;

// ELF 映像魔数，用于确认段首确实是映像头而非同名模块的纯数据映射
const ELFMAG: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const SELFMAG: usize = 4;

// 单个 LOAD 段的地址范围，构造后不可变
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeData {
    pub start: usize,
    pub end: usize,
    pub perms: u32,
}

// 一个已加载模块及其全部段；主可执行映像的标签为空字符串
#[derive(Clone, Debug)]
pub struct LibraryData {
    pub base: usize,
    pub label: String,
    pub ranges: Vec<RangeData>,
}

// 地址查询结果：命中的模块与段
#[derive(Clone, Copy)]
pub struct LookupResult<'a> {
    pub library: &'a LibraryData,
    pub range: &'a RangeData,
}

pub struct ModuleMap {
    // 按首次出现顺序保存，查询按此顺序首个命中即返回
    libraries: Vec<LibraryData>,
}

impl ModuleMap {
    // 单趟遍历 dl_iterate_phdr 构建快照；失败时不保留部分结果
    pub fn build() -> Result<Self, Errno> {
        unsafe extern "C" fn iterate_cb(
            info: *mut libc::dl_phdr_info,
            _size: libc::size_t,
            data: *mut c_void,
        ) -> libc::c_int {
            if info.is_null() || data.is_null() {
                return 1;
            }
            let info = unsafe { &*info };
            let libraries = unsafe { &mut *(data as *mut Vec<LibraryData>) };

            if info.dlpi_name.is_null() || info.dlpi_phdr.is_null() {
                return 0;
            }
            let Ok(label) = unsafe { CStr::from_ptr(info.dlpi_name) }.to_str() else {
                return 0;
            };

            // 同名条目合并进首个出现的模块
            let index = match libraries.iter().position(|library| library.label == label) {
                Some(index) => index,
                None => {
                    libraries.push(LibraryData {
                        base: info.dlpi_addr as usize,
                        label: label.to_string(),
                        ranges: Vec::new(),
                    });
                    libraries.len() - 1
                }
            };

            let phdrs = unsafe { slice::from_raw_parts(info.dlpi_phdr, info.dlpi_phnum as usize) };
            for phdr in phdrs {
                if phdr.p_type != libc::PT_LOAD || phdr.p_memsz == 0 {
                    continue;
                }
                let start = (info.dlpi_addr as usize).wrapping_add(phdr.p_vaddr as usize);
                libraries[index].ranges.push(RangeData {
                    start,
                    end: start.wrapping_add(phdr.p_memsz as usize),
                    perms: phdr.p_flags,
                });
            }
            0
        }

        let mut libraries = Vec::<LibraryData>::new();
        let rv = unsafe {
            libc::dl_iterate_phdr(Some(iterate_cb), &mut libraries as *mut _ as *mut c_void)
        };
        if rv != 0 {
            log::error(format_args!("dl_iterate_phdr failed rv={rv}"));
            return Err(Errno::EnumFailed);
        }

        log::debug(format_args!(
            "module map built libraries={}",
            libraries.len()
        ));
        Ok(Self { libraries })
    }

    #[cfg(test)]
    pub(crate) fn from_libraries(libraries: Vec<LibraryData>) -> Self {
        Self { libraries }
    }

    // 所有已加载模块的标签集合
    pub fn loaded_libraries(&self) -> BTreeSet<String> {
        self.libraries
            .iter()
            .map(|library| library.label.clone())
            .collect()
    }

    // 按标签后缀查找映像基址
    // 段必须可读、至少 4 字节且以 ELF 魔数开头，才认定为映像头
    pub fn base_address(&self, label_suffix: &str) -> Option<usize> {
        for library in &self.libraries {
            if !library.label.ends_with(label_suffix) {
                continue;
            }
            for range in &library.ranges {
                if range.perms & SEG_READ_FLAG == 0 {
                    continue;
                }
                if range.end.saturating_sub(range.start) < SELFMAG {
                    continue;
                }
                let head = unsafe { slice::from_raw_parts(range.start as *const u8, SELFMAG) };
                if head == ELFMAG {
                    return Some(range.start);
                }
            }
        }
        None
    }

    // 线性扫描，返回首个完全包含 [address, address+size) 的段
    // 段尾后一个位置不算命中，size 为 0 时同样如此
    pub fn lookup_range(&self, address: usize, size: usize) -> Option<LookupResult<'_>> {
        for library in &self.libraries {
            for range in &library.ranges {
                if address >= range.start
                    && address < range.end
                    && address.saturating_add(size) <= range.end
                {
                    return Some(LookupResult { library, range });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests;
