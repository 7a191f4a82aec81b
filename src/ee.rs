// EE 注册表：把不透明的每端点记录解析成结构化描述，并维护启停簿记
//
// 记录布局在构建期不可知，步长由 StrideProber 在首次枚举时在线测得并
// 缓存；目标记录类型的形状在进程生命期内不会变化，缓存永不失效
use crate::errno::Errno;
use crate::log;
use crate::probe::StrideProber;
use std::collections::BTreeSet;

// NFA 调用状态码
pub type NfaStatus = u8;
pub const NFA_STATUS_OK: NfaStatus = 0x00;
pub const NFA_STATUS_FAILED: NfaStatus = 0x03;

// EE 状态码与接口码
pub const EE_STATUS_ACTIVE: u8 = 0x00;
pub const EE_STATUS_INACTIVE: u8 = 0x01;
// NCI 私有接口区间起点；配置补丁只需要静默带私有接口的端点
pub const EE_INTERFACE_PROPRIETARY: u8 = 0x80;

// 记录内字段偏移，为对目标服务记录的实测结果，随 NFC 栈版本变化，
// 并非协议保证；集中放在这里，换目标版本时只改这一处
const OFF_HANDLE: usize = 0;
const OFF_STATUS: usize = 2;
const OFF_IF_COUNT: usize = 3;
const OFF_IF_LIST: usize = 4;
// 自记录末尾起的反向偏移
const TAIL_LA_PROTOCOL: usize = 3;
const TAIL_LB_PROTOCOL: usize = 2;
const TAIL_LF_PROTOCOL: usize = 1;
// 记录至少要容纳头部字段和末尾协议字段
const MIN_RECORD_LEN: usize = OFF_IF_LIST + TAIL_LA_PROTOCOL;

// 步长探测的保守上限，取远大于任何已知记录布局的值
pub const EST_MAX_RECORD_SIZE: usize = 10_000;
// 单次查询可请求的协议上限条数
const MAX_REQUEST_RECORDS: u8 = u8::MAX;

// 查询能力由外部注入，测试时可替换为确定性的合成实现
pub trait EeQuery {
    // 写入至多 requested 条记录并回填实际条数，返回调用状态
    fn get_info(&mut self, requested: &mut u8, buf: &mut [u8]) -> NfaStatus;
}

impl<F> EeQuery for F
where
    F: FnMut(&mut u8, &mut [u8]) -> NfaStatus,
{
    fn get_info(&mut self, requested: &mut u8, buf: &mut [u8]) -> NfaStatus {
        self(requested, buf)
    }
}

// 解析后的端点描述，每次枚举即时生成，不做持久化
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EeInfo {
    pub handle: u16,
    pub status: u8,
    pub interfaces: Vec<u8>,
    pub la_protocol: u8,
    pub lb_protocol: u8,
    pub lf_protocol: u8,
}

impl EeInfo {
    // 非停用且带私有接口的端点才是配置补丁需要静默的对象
    pub fn is_patch_target(&self) -> bool {
        self.status != EE_STATUS_INACTIVE && self.interfaces.contains(&EE_INTERFACE_PROPRIETARY)
    }
}

pub struct EeRegistry<Q: EeQuery> {
    query: Q,
    // 首次成功探测后缓存
    stride: Option<usize>,
    // 已显式停用且尚未重新激活的端点
    deactivated: BTreeSet<u16>,
}

impl<Q: EeQuery> EeRegistry<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            stride: None,
            deactivated: BTreeSet::new(),
        }
    }

    // 以协议上限请求一次，返回服务实际报告的端点数
    pub fn count_ees(&mut self) -> Result<usize, Errno> {
        let mut buf = vec![0u8; MAX_REQUEST_RECORDS as usize * self.approx_stride()];
        let mut num = MAX_REQUEST_RECORDS;
        let status = self.query.get_info(&mut num, &mut buf);
        if status != NFA_STATUS_OK {
            log::warn(format_args!("ee count query failed status={status:#04x}"));
            return Err(Errno::QueryFailed);
        }
        Ok(num as usize)
    }

    // 枚举服务当前上报的全部端点记录
    // 任何一步失败都放弃整次枚举，不返回部分解析结果
    pub fn enumerate_ees(&mut self) -> Result<Vec<EeInfo>, Errno> {
        let count = self.count_ees()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let stride = self.resolve_stride(count)?;
        let mut buf = vec![0u8; stride * count];
        let mut num = count as u8;
        let status = self.query.get_info(&mut num, &mut buf);
        if status != NFA_STATUS_OK {
            log::warn(format_args!("ee info query failed status={status:#04x}"));
            return Err(Errno::QueryFailed);
        }

        let mut result = Vec::new();
        for record in buf.chunks_exact(stride).take(num as usize) {
            result.push(parse_ee_record(record)?);
        }
        Ok(result)
    }

    // 当前活跃且带私有接口的端点句柄集合
    pub fn find_active_ees(&mut self) -> Result<BTreeSet<u16>, Errno> {
        let mut result = BTreeSet::new();
        for info in self.enumerate_ees()? {
            if info.is_patch_target() {
                result.insert(info.handle);
            }
        }
        Ok(result)
    }

    // 已显式停用且尚未重新激活的端点
    pub fn deactivated_ees(&self) -> &BTreeSet<u16> {
        &self.deactivated
    }

    // 纯簿记，无 I/O：控制调用由编排层发出，成功后再调用这里记录状态
    pub fn mark_deactivated(&mut self, handle: u16) {
        self.deactivated.insert(handle);
    }

    pub fn mark_activated(&mut self, handle: u16) {
        self.deactivated.remove(&handle);
    }

    // 已缓存的步长，否则退回保守估计
    fn approx_stride(&self) -> usize {
        self.stride.unwrap_or(EST_MAX_RECORD_SIZE)
    }

    // 惰性解析步长：未缓存且记录数足够两元素探测时才运行探测器
    fn resolve_stride(&mut self, count: usize) -> Result<usize, Errno> {
        if let Some(stride) = self.stride {
            return Ok(stride);
        }
        // 单条记录无法做两元素正向探测，用保守估计定缓冲区大小，但不缓存
        if count <= 1 {
            return Ok(self.approx_stride());
        }

        let query = &mut self.query;
        let mut prober = StrideProber::new(|requested, chunk: &mut [u8]| {
            let mut num = requested;
            query.get_info(&mut num, chunk) == NFA_STATUS_OK && num == requested
        });
        let stride = prober.detect_stride(EST_MAX_RECORD_SIZE)?;

        log::debug(format_args!("ee record stride cached stride={stride}"));
        self.stride = Some(stride);
        Ok(stride)
    }
}

// 按实测偏移解析单条记录；字段越界视为记录损坏
fn parse_ee_record(record: &[u8]) -> Result<EeInfo, Errno> {
    if record.len() < MIN_RECORD_LEN {
        log::warn(format_args!("ee record too short len={}", record.len()));
        return Err(Errno::BadRecord);
    }

    let handle = u16::from_le_bytes([record[OFF_HANDLE], record[OFF_HANDLE + 1]]);
    let status = record[OFF_STATUS];
    let if_count = record[OFF_IF_COUNT] as usize;
    let Some(interfaces) = record.get(OFF_IF_LIST..OFF_IF_LIST + if_count) else {
        log::warn(format_args!(
            "ee record interface list out of bounds handle={handle:#06x} count={if_count}"
        ));
        return Err(Errno::BadRecord);
    };

    let len = record.len();
    Ok(EeInfo {
        handle,
        status,
        interfaces: interfaces.to_vec(),
        la_protocol: record[len - TAIL_LA_PROTOCOL],
        lb_protocol: record[len - TAIL_LB_PROTOCOL],
        lf_protocol: record[len - TAIL_LF_PROTOCOL],
    })
}
