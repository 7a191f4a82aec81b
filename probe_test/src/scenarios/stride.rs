// 步长探测场景：合成填充回调驱动公开的探测 API
use nci_probe::{Errno, StrideProber};

const RECORD_BYTE: u8 = 0x5A;

fn fill_records(record_len: usize, defined: usize) -> impl FnMut(u8, &mut [u8]) -> bool {
    move |requested, buf| {
        for index in 0..requested as usize {
            let base = index * record_len;
            if base + defined > buf.len() {
                return false;
            }
            for offset in 0..defined {
                buf[base + offset] = RECORD_BYTE;
            }
        }
        true
    }
}

pub fn scenario_stride_roundtrip() {
    let mut prober = StrideProber::new(fill_records(40, 40));
    assert_eq!(prober.detect_stride(256), Ok(40));
}

pub fn scenario_stride_undefined_tail() {
    // 服务不初始化每条记录的最后 3 字节，探测仍须得出完整步长
    let mut prober = StrideProber::new(fill_records(40, 37));
    assert_eq!(prober.detect_stride(256), Ok(40));
}

pub fn scenario_stride_disagreement() {
    // 写入长度随调用漂移，任何模式间都无法达成多数
    let mut call = 0usize;
    let mut prober = StrideProber::new(move |_requested, buf: &mut [u8]| {
        call += 1;
        let defined = 16 + call * 2;
        for offset in 0..defined {
            buf[offset] = RECORD_BYTE;
        }
        true
    });
    assert_eq!(prober.detect_stride(256), Err(Errno::ProbeDisagree));
}
