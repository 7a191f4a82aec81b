// 可脚本化的合成 NFA 服务：按固定步长写出 EE 记录，只触碰自己定义的
// 字段，缓冲区其余字节保持原样
use nci_probe::{NFA_STATUS_OK, NfaStatus};

pub struct FakeEe {
    pub handle: u16,
    pub status: u8,
    pub interfaces: Vec<u8>,
}

pub struct FakeNfaService {
    pub records: Vec<FakeEe>,
    pub stride: usize,
    pub calls: usize,
}

impl FakeNfaService {
    pub fn new(stride: usize, records: Vec<FakeEe>) -> Self {
        Self {
            records,
            stride,
            calls: 0,
        }
    }

    pub fn get_info(&mut self, requested: &mut u8, buf: &mut [u8]) -> NfaStatus {
        self.calls += 1;

        let written = (*requested as usize).min(self.records.len());
        for (index, record) in self.records.iter().take(written).enumerate() {
            let base = index * self.stride;
            buf[base..base + 2].copy_from_slice(&record.handle.to_le_bytes());
            buf[base + 2] = record.status;
            buf[base + 3] = record.interfaces.len() as u8;
            for (offset, &code) in record.interfaces.iter().enumerate() {
                buf[base + 4 + offset] = code;
            }
            let end = base + self.stride;
            buf[end - 3..end].copy_from_slice(&[0x04, 0x05, 0x06]);
        }

        *requested = written as u8;
        NFA_STATUS_OK
    }
}
