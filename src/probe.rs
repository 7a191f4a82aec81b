// 黑盒记录步长探测：仅凭一个填充回调推断同构记录数组的元素字节距
//
// 服务写出的记录尾部可能留有未初始化字节，直接从 0 偏移正向探测会把
// 已定义区当成整条记录。因此分两阶段：先以 1 条记录反向定位服务确定
// 写入的尾边界，再以 2 条记录从该边界正向找到第二条记录的起始覆盖点，
// 即真实步长
use crate::errno::Errno;
use crate::log;
use std::collections::BTreeMap;

// 2 字节标记模式，探测前铺满缓冲区；任何未被服务触碰的字节保持标记值
const PATTERNS: [u16; 3] = [0xDEAD, 0xBEEF, 0x1337];
const NUM_PATTERNS: usize = PATTERNS.len();

pub struct StrideProber<F> {
    fill: F,
    chunk: Vec<u8>,
}

impl<F> StrideProber<F>
where
    F: FnMut(u8, &mut [u8]) -> bool,
{
    // fill 回调：向缓冲区写入指定条数的记录，返回是否成功
    pub fn new(fill: F) -> Self {
        Self {
            fill,
            chunk: Vec::new(),
        }
    }

    // 探测记录步长；est_max 必须为偶数且不小于真实记录尺寸
    // 任一阶段三个模式无严格多数一致即失败，调用方应视布局为未知
    pub fn detect_stride(&mut self, est_max: usize) -> Result<usize, Errno> {
        if est_max == 0 || est_max % 2 != 0 {
            log::warn(format_args!("invalid stride estimate est_max={est_max}"));
            return Err(Errno::InvalidArg);
        }

        // 第一阶段：反向定位服务确定写入的最后一个字节
        log::debug(format_args!(
            "detecting defined record size est_max={est_max}"
        ));
        self.chunk.resize(est_max, 0);
        let mut results = [0usize; NUM_PATTERNS];
        for (slot, pattern) in results.iter_mut().zip(PATTERNS) {
            *slot = self.probe_backward(pattern);
        }
        let Some(defined) = agree_results(&results) else {
            log::warn(format_args!("no majority for defined record size"));
            return Err(Errno::ProbeDisagree);
        };

        // 第二阶段：从尾边界之后正向定位第二条记录的起点
        log::debug(format_args!("detecting record stride defined={defined}"));
        self.chunk.resize(est_max * 2, 0);
        for (slot, pattern) in results.iter_mut().zip(PATTERNS) {
            *slot = self.probe_forward(pattern, defined);
        }
        let Some(stride) = agree_results(&results) else {
            log::warn(format_args!("no majority for record stride"));
            return Err(Errno::ProbeDisagree);
        };

        log::debug(format_args!("record stride detected stride={stride}"));
        Ok(stride)
    }

    // 饱和填充后读入 1 条记录，从缓冲区末尾反向找首个非标记字节
    fn probe_backward(&mut self, pattern: u16) -> usize {
        self.saturate(pattern);
        if !(self.fill)(1, &mut self.chunk) {
            return 0;
        }
        self.scan(0, pattern, true)
    }

    // 饱和填充后读入 2 条记录，从尾边界之后正向找首个非标记字节
    fn probe_forward(&mut self, pattern: u16, defined: usize) -> usize {
        self.saturate(pattern);
        if !(self.fill)(2, &mut self.chunk) {
            return 0;
        }
        self.scan(defined + 1, pattern, false)
    }

    // 以 2 字节周期将标记模式铺满缓冲区
    fn saturate(&mut self, pattern: u16) {
        let marker = pattern.to_le_bytes();
        for (index, byte) in self.chunk.iter_mut().enumerate() {
            *byte = marker[index % marker.len()];
        }
    }

    // 从 offset 起按方向扫描，返回首个与标记不符的下标；全部相符返回 0
    fn scan(&self, offset: usize, pattern: u16, backwards: bool) -> usize {
        let marker = pattern.to_le_bytes();
        let len = self.chunk.len();

        for i in offset..len {
            let j = if backwards { len - i - 1 } else { i };
            if self.chunk[j] != marker[j % marker.len()] {
                return j;
            }
        }

        0
    }
}

// 多数表决：仅当某个非零结果获得严格过半票数时采纳
// 0 是单模式探测失败的哨兵值，永远不能当选
fn agree_results(results: &[usize; NUM_PATTERNS]) -> Option<usize> {
    let mut frequency = BTreeMap::<usize, usize>::new();
    for &result in results {
        log::debug(format_args!("probe result value={result}"));
        *frequency.entry(result).or_insert(0) += 1;
    }

    let (&value, &votes) = frequency.iter().max_by_key(|(_, votes)| **votes)?;
    if value == 0 || votes * 2 <= NUM_PATTERNS {
        return None;
    }

    log::debug(format_args!("probe agreed value={value} votes={votes}"));
    Some(value)
}
