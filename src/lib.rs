#![allow(dead_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

#[cfg(all(
    not(any(target_os = "android", target_os = "linux")),
    not(any(clippy, test, doc))
))]
compile_error!("nci_probe supports Android and Linux only (use cargo clippy/test/doc on host for development)");

#[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
compile_error!("nci_probe supports only 64-bit architectures: aarch64 and x86_64");

// 进程级探测上下文
mod context;
// EE 记录解析与启停簿记
mod ee;
// 错误码定义
mod errno;
// NFC 栈库定位
mod locate;
// 日志输出，Android 使用 logcat
mod log;
// 进程模块内存映射
mod maps;
// 记录步长黑盒探测
mod probe;
// 版本信息
mod version;

pub use context::ProbeContext;
pub use ee::{
    EE_INTERFACE_PROPRIETARY, EE_STATUS_ACTIVE, EE_STATUS_INACTIVE, EST_MAX_RECORD_SIZE, EeInfo,
    EeQuery, EeRegistry, NFA_STATUS_FAILED, NFA_STATUS_OK, NfaStatus,
};
pub use errno::Errno;
pub use locate::{find_library, find_nfc_library};
pub use log::set_debug_enabled;
pub use maps::{
    LibraryData, LookupResult, ModuleMap, RangeData, SEG_EXEC_FLAG, SEG_READ_FLAG, SEG_WRITE_FLAG,
};
pub use probe::StrideProber;
pub use version::{version, version_str, version_str_full};
